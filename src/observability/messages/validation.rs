// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for suite loading and validation.

use std::fmt::{Display, Formatter};

use crate::errors::ValidationError;
use crate::observability::messages::StructuredLog;

/// One validation problem found in a suite definition.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use the_fixtureguard::errors::ValidationError;
/// use the_fixtureguard::observability::messages::validation::SuiteValidationFailed;
///
/// let error = ValidationError::CyclicDependency {
///     cycle: vec!["a".to_string(), "b".to_string(), "a".to_string()],
/// };
/// let msg = SuiteValidationFailed { error: &error };
///
/// assert_eq!(msg.to_string(), "Suite validation failed: Cyclic dependency detected: a -> b -> a");
/// ```
pub struct SuiteValidationFailed<'a> {
    pub error: &'a ValidationError,
}

impl Display for SuiteValidationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Suite validation failed: {}", self.error)
    }
}

impl StructuredLog for SuiteValidationFailed<'_> {
    fn log(&self) {
        let kind = match self.error {
            ValidationError::CyclicDependency { .. } => "cyclic_dependency",
            ValidationError::UnresolvedDependency { .. } => "unresolved_dependency",
            ValidationError::DuplicateName { .. } => "duplicate_name",
        };
        tracing::error!(kind, "{}", self);
    }
}

/// Suite definition loaded and validated.
///
/// # Log Level
/// `info!` - Important operational event
pub struct SuiteLoaded<'a> {
    pub path: &'a str,
    pub fixture_count: usize,
    pub site_count: usize,
}

impl Display for SuiteLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded suite '{}': {} fixtures, {} sites",
            self.path, self.fixture_count, self.site_count
        )
    }
}

impl StructuredLog for SuiteLoaded<'_> {
    fn log(&self) {
        tracing::info!(
            path = self.path,
            fixture_count = self.fixture_count,
            site_count = self.site_count,
            "{}", self
        );
    }
}
