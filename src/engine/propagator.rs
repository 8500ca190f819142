// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The failure propagator: the one place captured failures become visible.

use serde::Deserialize;

use crate::engine::{CachedResult, FailureRecord};

/// How many failing dependencies a site reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Every failing dependency, in declaration order
    #[default]
    All,
    /// Only the first failing dependency
    FirstOnly,
}

/// Which results a site inspects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropagationScope {
    /// The nodes the site names directly
    #[default]
    Direct,
    /// Those nodes and everything they transitively depend on
    Closure,
}

/// The failures that sink a site.
#[derive(Debug, Clone)]
pub struct PropagatedFailure {
    failures: Vec<FailureRecord>,
}

impl PropagatedFailure {
    pub fn failures(&self) -> &[FailureRecord] {
        &self.failures
    }

    pub fn origins(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(FailureRecord::origin)
    }

    pub fn diagnostic(&self) -> String {
        self.failures
            .iter()
            .map(|failure| failure.describe("Fixture"))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Inspect `results` in order and collect their failures.
///
/// Returns `None` when every result is a value, in which case the site runs as
/// though nothing were installed.
pub fn propagate<'a, I>(results: I, aggregation: Aggregation) -> Option<PropagatedFailure>
where
    I: IntoIterator<Item = &'a CachedResult>,
{
    let mut failures = Vec::new();
    for failure in results.into_iter().filter_map(CachedResult::failure) {
        failures.push(failure.clone());
        if aggregation == Aggregation::FirstOnly {
            break;
        }
    }
    if failures.is_empty() {
        None
    } else {
        Some(PropagatedFailure { failures })
    }
}
