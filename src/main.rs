// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use the_fixtureguard::config::{load_and_validate_suite, OptionOverrides, Options};
use the_fixtureguard::suite::{build_suite, run_suite, SuiteSummary};

#[derive(Parser, Debug)]
#[command(
    name = "fixtureguard",
    version,
    about = "Run a fixture suite with deferred type-check failures"
)]
struct Cli {
    /// Suite definition (YAML)
    suite: PathBuf,
    /// Options file with a [fixtureguard] table (TOML)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Type-check fixtures and fail the sites that use a failing one
    #[arg(long)]
    check_fixtures: bool,
    /// Type-check the sites' own parameters
    #[arg(long)]
    check_sites: bool,
    /// Type-check generator fixtures too
    #[arg(long)]
    check_generators: bool,
    /// Inspect every fixture a site depends on, not only the ones it names
    #[arg(long)]
    closure: bool,
    /// Report only the first failing fixture per site
    #[arg(long)]
    first_failure_only: bool,
    /// Comma-separated fixtures never to check
    #[arg(long)]
    exempt: Option<String>,
}

impl Cli {
    fn overrides(&self) -> OptionOverrides {
        OptionOverrides {
            check_fixtures: self.check_fixtures,
            check_sites: self.check_sites,
            check_generators: self.check_generators,
            closure_scope: self.closure,
            first_failure_only: self.first_failure_only,
            exempt: self.exempt.clone(),
        }
    }
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let options = match &cli.config {
        Some(path) => Options::load(path)?,
        None => Options::default(),
    }
    .merge(&cli.overrides());

    let config = load_and_validate_suite(&cli.suite)
        .with_context(|| format!("failed to load {}", cli.suite.display()))?;
    let suite = build_suite(&config)?;

    println!("🧪 {}", cli.suite.display());
    println!("{}", "═".repeat(60));
    let summary = run_suite(suite, options);
    print_summary(&summary);

    Ok(if summary.success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_summary(summary: &SuiteSummary) {
    for result in &summary.results {
        let marker = if result.as_expected() { "✅" } else { "❌" };
        println!("{} {:<14} {}", marker, result.label(), result.site);
        if let Some(detail) = result.detail() {
            for line in detail.lines() {
                println!("      {}", line);
            }
        }
    }
    for error in &summary.teardown_errors {
        println!("❌ TEARDOWN       {}", error);
    }

    println!("{}", "─".repeat(60));
    println!(
        "{} passed, {} failed, {} unexpected, {} errors in {:.2?}",
        summary.passed(),
        summary.failed(),
        summary.unexpected(),
        summary.errored(),
        summary.duration
    );
}
