// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for session lifecycle events and suite summaries.

use std::fmt::{Display, Formatter};
use std::time::Duration;

use crate::observability::messages::StructuredLog;

/// Session created.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_fixtureguard::observability::messages::engine::SessionStarted;
///
/// let msg = SessionStarted {
///     node_count: 5,
///     check_fixtures: true,
///     check_sites: false,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct SessionStarted {
    pub node_count: usize,
    pub check_fixtures: bool,
    pub check_sites: bool,
}

impl Display for SessionStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting session: {} nodes, check_fixtures={}, check_sites={}",
            self.node_count, self.check_fixtures, self.check_sites
        )
    }
}

impl StructuredLog for SessionStarted {
    fn log(&self) {
        tracing::info!(
            node_count = self.node_count,
            check_fixtures = self.check_fixtures,
            check_sites = self.check_sites,
            "{}", self
        );
    }
}

/// Generators finalised at the end of a session.
///
/// # Log Level
/// `info!` - Important operational event
pub struct TeardownCompleted {
    pub finalized: usize,
    pub errors: usize,
}

impl Display for TeardownCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Teardown finalised {} generators with {} errors",
            self.finalized, self.errors
        )
    }
}

impl StructuredLog for TeardownCompleted {
    fn log(&self) {
        tracing::info!(finalized = self.finalized, errors = self.errors, "{}", self);
    }
}

/// Suite run finished.
///
/// # Log Level
/// `info!` - Important operational event
pub struct SuiteCompleted {
    pub passed: usize,
    pub failed: usize,
    pub unexpected: usize,
    pub errored: usize,
    pub duration: Duration,
}

impl Display for SuiteCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Suite finished in {:?}: {} passed, {} failed, {} unexpected, {} errors",
            self.duration, self.passed, self.failed, self.unexpected, self.errored
        )
    }
}

impl StructuredLog for SuiteCompleted {
    fn log(&self) {
        tracing::info!(
            passed = self.passed,
            failed = self.failed,
            unexpected = self.unexpected,
            errored = self.errored,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }
}
