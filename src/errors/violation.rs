// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The structured contract violation raised by a decoration capability.
//!
//! A `Violation` is the only error kind the wrapper factory intercepts. Producers
//! return `anyhow::Result`, so a violation travels as an `anyhow::Error` and is
//! recognised by downcasting; every other error is an ordinary defect and is
//! propagated untouched.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;
use thiserror::Error;

/// The moment at which a violation was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// While building the checked producer (the contract itself is unusable)
    Decoration,
    /// While invoking the checked producer (the produced or received value is wrong)
    Call,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Decoration => write!(f, "decoration-time"),
            Phase::Call => write!(f, "call-time"),
        }
    }
}

#[derive(Debug, Error)]
#[error("{message}")]
pub struct Violation {
    phase: Phase,
    message: String,
    trace: Option<String>,
    backtrace: Option<String>,
}

impl Violation {
    pub fn decoration(message: impl Into<String>) -> Self {
        Self::new(Phase::Decoration, message.into())
    }

    pub fn call(message: impl Into<String>) -> Self {
        Self::new(Phase::Call, message.into())
    }

    /// Attach the trace shown in diagnostics, e.g. one owned by a foreign checker.
    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = Some(trace.into());
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn trace(&self) -> Option<&str> {
        self.trace.as_deref()
    }

    /// The full thread backtrace at construction, when `RUST_BACKTRACE` or
    /// `RUST_LIB_BACKTRACE` enable capture. Never part of a diagnostic.
    pub fn backtrace(&self) -> Option<&str> {
        self.backtrace.as_deref()
    }

    fn new(phase: Phase, message: String) -> Self {
        let backtrace = Backtrace::capture();
        let backtrace = match backtrace.status() {
            BacktraceStatus::Captured => Some(backtrace.to_string()),
            _ => None,
        };
        Self {
            phase,
            message,
            trace: None,
            backtrace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_survives_anyhow_round_trip() {
        let err: anyhow::Error = Violation::call("expected int").into();
        let violation = err.downcast_ref::<Violation>().expect("should downcast");
        assert_eq!(violation.phase(), Phase::Call);
        assert_eq!(violation.message(), "expected int");
    }

    #[test]
    fn test_context_does_not_hide_violation() {
        let err = anyhow::Error::from(Violation::decoration("bad hint")).context("while wrapping");
        assert!(err.downcast_ref::<Violation>().is_some());
        assert_eq!(format!("{:#}", err), "while wrapping: bad hint");
    }

    #[test]
    fn test_trace_is_only_set_explicitly() {
        let violation = Violation::call("expected int");
        assert!(violation.trace().is_none());

        let record = crate::engine::FailureRecord::from_violation("b", Phase::Call, violation);
        assert_eq!(record.describe("Fixture"), "Fixture \"b\" failed type-checking: expected int");
    }

    #[test]
    fn test_with_trace_overrides_capture() {
        let violation = Violation::call("x").with_trace("frame 0");
        assert_eq!(violation.trace(), Some("frame 0"));
        assert_eq!(Phase::Decoration.to_string(), "decoration-time");
    }
}
