// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during suite graph validation
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A circular dependency was detected between fixtures
    CyclicDependency {
        /// The cycle path showing the circular dependency
        cycle: Vec<String>,
    },
    /// A fixture or site references a fixture that doesn't exist
    UnresolvedDependency {
        /// The fixture or site that has the unresolved dependency
        requirer: String,
        /// The dependency that couldn't be resolved
        missing_dependency: String,
    },
    /// Two fixtures (or two sites) share a name
    DuplicateName {
        /// The duplicate name
        name: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::CyclicDependency { cycle } => {
                write!(f, "Cyclic dependency detected: {}", cycle.join(" -> "))
            }
            ValidationError::UnresolvedDependency {
                requirer,
                missing_dependency,
            } => {
                write!(
                    f,
                    "'{}' depends on fixture '{}' which does not exist",
                    requirer, missing_dependency
                )
            }
            ValidationError::DuplicateName { name } => {
                write!(f, "Duplicate name: '{}'", name)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Errors raised while loading options files and suite definitions.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid suite definition: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid options file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("'{owner}' has an unusable body: {reason}")]
    Body { owner: String, reason: String },

    #[error("suite failed validation: {}", join_validation(.0))]
    Invalid(Vec<ValidationError>),
}

fn join_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
