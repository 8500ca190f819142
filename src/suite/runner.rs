// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::{Expectation, Options};
use crate::engine::{Session, SiteReport};
use crate::errors::{EvaluationError, TeardownError};
use crate::observability::messages::engine::SuiteCompleted;
use crate::observability::messages::StructuredLog;
use crate::suite::Suite;

/// The outcome of one site against its declared expectation.
#[derive(Debug)]
pub struct SiteResult {
    pub site: String,
    pub expect: Expectation,
    pub outcome: Result<SiteReport, EvaluationError>,
}

impl SiteResult {
    pub fn as_expected(&self) -> bool {
        match &self.outcome {
            Ok(report) => report.passed() == (self.expect == Expectation::Pass),
            Err(_) => false,
        }
    }

    pub fn label(&self) -> &'static str {
        match (&self.outcome, self.expect) {
            (Ok(report), Expectation::Pass) if report.passed() => "PASSED",
            (Ok(_), Expectation::Pass) => "FAILED",
            (Ok(report), Expectation::Fail) if report.passed() => "XPASS(strict)",
            (Ok(_), Expectation::Fail) => "XFAIL",
            (Err(_), _) => "ERROR",
        }
    }

    /// Diagnostic text for anything other than a plain pass.
    pub fn detail(&self) -> Option<String> {
        match &self.outcome {
            Ok(report) => report.diagnostic(),
            Err(error) => Some(error.to_string()),
        }
    }
}

#[derive(Debug)]
pub struct SuiteSummary {
    pub results: Vec<SiteResult>,
    pub teardown_errors: Vec<TeardownError>,
    pub duration: Duration,
}

impl SuiteSummary {
    pub fn passed(&self) -> usize {
        self.count(|r| matches!(&r.outcome, Ok(report) if report.passed()))
    }

    pub fn failed(&self) -> usize {
        self.count(|r| matches!(&r.outcome, Ok(report) if !report.passed()))
    }

    pub fn unexpected(&self) -> usize {
        self.count(|r| r.outcome.is_ok() && !r.as_expected())
    }

    pub fn errored(&self) -> usize {
        self.count(|r| r.outcome.is_err())
    }

    /// Every site met its expectation and teardown was clean.
    pub fn success(&self) -> bool {
        self.unexpected() == 0 && self.errored() == 0 && self.teardown_errors.is_empty()
    }

    fn count(&self, predicate: impl Fn(&SiteResult) -> bool) -> usize {
        self.results.iter().filter(|r| predicate(r)).count()
    }
}

/// Run every site of `suite` in declaration order within one session, then
/// tear the session down.
pub fn run_suite(suite: Suite, options: Options) -> SuiteSummary {
    let started = Instant::now();
    let checker = Arc::new(suite.checker());
    let mut session = Session::new(suite.registry, options, checker);

    let results: Vec<SiteResult> = suite
        .sites
        .iter()
        .map(|planned| SiteResult {
            site: planned.site.name().to_string(),
            expect: planned.expect,
            outcome: session.call_site(&planned.site),
        })
        .collect();
    let teardown_errors = session.teardown();

    let summary = SuiteSummary {
        results,
        teardown_errors,
        duration: started.elapsed(),
    };
    SuiteCompleted {
        passed: summary.passed(),
        failed: summary.failed(),
        unexpected: summary.unexpected(),
        errored: summary.errored(),
        duration: summary.duration,
    }
    .log();
    summary
}
