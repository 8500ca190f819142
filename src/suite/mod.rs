// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Turning a YAML suite definition into a runnable graph, and running it.

mod builder;
mod runner;

pub use builder::{build_suite, PlannedSite, Suite};
pub use runner::{run_suite, SiteResult, SuiteSummary};
