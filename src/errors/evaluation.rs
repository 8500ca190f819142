// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors that escape evaluation. Contract violations never appear here: they are
//! captured into `CachedResult::Failure` by the wrapper factory.

use std::sync::Arc;
use thiserror::Error;

/// Errors raised while evaluating nodes or calling sites.
///
/// Cloneable because an ordinary producer failure is remembered for the rest of
/// the run and handed back to every later requester of the same node.
#[derive(Debug, Clone, Error)]
pub enum EvaluationError {
    #[error("node '{0}' is not registered")]
    UnknownNode(String),

    #[error("'{requirer}' requires '{dependency}' which is not registered")]
    UnresolvedDependency { requirer: String, dependency: String },

    #[error("dependency cycle detected: {}", path.join(" -> "))]
    Cycle { path: Vec<String> },

    #[error("node '{node}' raised: {error:#}")]
    Producer {
        node: String,
        error: Arc<anyhow::Error>,
    },

    #[error("generator node '{node}' did not yield a value")]
    NoValue { node: String },

    #[error("failed to start the async runtime: {0}")]
    Runtime(Arc<std::io::Error>),

    #[error("async nodes cannot be evaluated from inside a tokio runtime; drive the session from a blocking thread")]
    NestedRuntime,
}

/// Errors raised while finalising generator nodes at the end of a session.
#[derive(Debug, Error)]
pub enum TeardownError {
    #[error("generator node '{node}' yielded more than one item")]
    MoreThanOneItem { node: String },

    #[error("generator node '{node}' failed during teardown: {error:#}")]
    Producer { node: String, error: anyhow::Error },
}
