// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::errors::{Phase, Violation};
use crate::graph::Value;

/// The memoized outcome of evaluating a node.
#[derive(Debug, Clone)]
pub enum CachedResult {
    Value(Value),
    Failure(FailureRecord),
}

impl CachedResult {
    pub fn is_failure(&self) -> bool {
        matches!(self, CachedResult::Failure(_))
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            CachedResult::Value(value) => Some(value),
            CachedResult::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&FailureRecord> {
        match self {
            CachedResult::Value(_) => None,
            CachedResult::Failure(failure) => Some(failure),
        }
    }
}

/// A captured contract violation and where it came from.
#[derive(Debug, Clone)]
pub struct FailureRecord {
    origin: String,
    phase: Phase,
    message: String,
    trace: Option<String>,
    error: Arc<anyhow::Error>,
}

impl FailureRecord {
    /// Capture `error` if it is a [`Violation`]; otherwise hand it back untouched.
    ///
    /// `phase` is the capture point, which is what the record reports even if a
    /// decorator labelled its violation differently.
    pub fn capture(
        origin: impl Into<String>,
        phase: Phase,
        error: anyhow::Error,
    ) -> Result<Self, anyhow::Error> {
        let trace = match error.downcast_ref::<Violation>() {
            Some(violation) => violation.trace().map(str::to_string),
            None => return Err(error),
        };
        Ok(Self {
            origin: origin.into(),
            phase,
            message: format!("{:#}", error),
            trace,
            error: Arc::new(error),
        })
    }

    pub fn from_violation(origin: impl Into<String>, phase: Phase, violation: Violation) -> Self {
        let trace = violation.trace().map(str::to_string);
        let message = violation.message().to_string();
        Self {
            origin: origin.into(),
            phase,
            message,
            trace,
            error: Arc::new(violation.into()),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
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

    /// The raw error, for inspection or re-raising.
    pub fn error(&self) -> &anyhow::Error {
        &self.error
    }

    /// `<noun> "<origin>" failed type-checking: <message>` plus the trace, if any.
    pub fn describe(&self, noun: &str) -> String {
        let mut text = format!(
            "{} \"{}\" failed type-checking: {}",
            noun, self.origin, self.message
        );
        if let Some(trace) = &self.trace {
            text.push('\n');
            text.push_str(trace);
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_only_takes_violations() {
        let violation: anyhow::Error = Violation::call("expected int").into();
        let record = FailureRecord::capture("b", Phase::Call, violation).unwrap();
        assert_eq!(record.origin(), "b");
        assert_eq!(record.message(), "expected int");
        assert!(record.error().downcast_ref::<Violation>().is_some());

        let defect = anyhow::anyhow!("disk on fire");
        let returned = FailureRecord::capture("b", Phase::Call, defect).unwrap_err();
        assert_eq!(returned.to_string(), "disk on fire");
    }

    #[test]
    fn test_capture_keeps_context_chain() {
        let err = anyhow::Error::from(Violation::call("expected int")).context("fixture setup");
        let record = FailureRecord::capture("b", Phase::Call, err).unwrap();
        assert_eq!(record.message(), "fixture setup: expected int");
    }

    #[test]
    fn test_describe_appends_trace() {
        let record = FailureRecord::from_violation(
            "b",
            Phase::Decoration,
            Violation::decoration("bad hint").with_trace("  at b()"),
        );
        assert_eq!(
            record.describe("Fixture"),
            "Fixture \"b\" failed type-checking: bad hint\n  at b()"
        );
        assert_eq!(record.phase(), Phase::Decoration);
    }

    #[test]
    fn test_cached_result_accessors() {
        let value = CachedResult::Value(serde_json::json!(42));
        assert!(!value.is_failure());
        assert_eq!(value.value(), Some(&serde_json::json!(42)));
        assert!(value.failure().is_none());
    }
}
