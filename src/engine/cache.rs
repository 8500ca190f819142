// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::Arc;

use crate::engine::CachedResult;
use crate::errors::EvaluationError;
use crate::graph::NodeId;

/// Per-session memo of node outcomes. Entries are only ever added.
#[derive(Debug, Default)]
pub struct EvaluationCache {
    results: HashMap<NodeId, Arc<CachedResult>>,
    errors: HashMap<NodeId, EvaluationError>,
}

impl EvaluationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn result(&self, id: NodeId) -> Option<&Arc<CachedResult>> {
        self.results.get(&id)
    }

    pub fn error(&self, id: NodeId) -> Option<&EvaluationError> {
        self.errors.get(&id)
    }

    /// Store `result` unless `id` already has one; either way return the stored
    /// instance.
    pub fn insert(&mut self, id: NodeId, result: CachedResult) -> Arc<CachedResult> {
        self.results
            .entry(id)
            .or_insert_with(|| Arc::new(result))
            .clone()
    }

    pub(crate) fn insert_error(&mut self, id: NodeId, error: EvaluationError) {
        self.errors.entry(id).or_insert(error);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
