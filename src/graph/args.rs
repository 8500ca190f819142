// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::anyhow;
use std::sync::Arc;

use crate::engine::CachedResult;
use crate::errors::Violation;
use crate::graph::Value;

/// Resolved dependency results handed to a producer, keyed by parameter name.
///
/// A failed dependency is passed through as-is rather than short-circuiting the
/// dependent: `get` refuses to hand out its payload, while `result` exposes the
/// failure itself. The refusal is a call-time [`Violation`], so a checked
/// dependent that touches the payload fails the same way its dependency did.
#[derive(Debug, Clone, Default)]
pub struct Args {
    entries: Vec<(String, Arc<CachedResult>)>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, result: Arc<CachedResult>) {
        self.entries.push((name.into(), result));
    }

    /// Convenience for callers holding plain values.
    pub fn from_values<I, K>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let entries = values
            .into_iter()
            .map(|(name, value)| (name.into(), Arc::new(CachedResult::Value(value))))
            .collect();
        Self { entries }
    }

    /// The payload of a successful dependency.
    pub fn get(&self, name: &str) -> anyhow::Result<&Value> {
        match self.result(name).map(Arc::as_ref) {
            Some(CachedResult::Value(value)) => Ok(value),
            Some(CachedResult::Failure(failure)) => Err(Violation::call(format!(
                "argument '{}' holds the failure of fixture '{}'",
                name,
                failure.origin()
            ))
            .into()),
            None => Err(anyhow!("no argument named '{}'", name)),
        }
    }

    pub fn result(&self, name: &str) -> Option<&Arc<CachedResult>> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, result)| result)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<CachedResult>)> {
        self.entries
            .iter()
            .map(|(name, result)| (name.as_str(), result))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
