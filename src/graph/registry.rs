// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use crate::contract::Signature;
use crate::errors::ValidationError;
use crate::graph::{Node, NodeId, Producer};

/// Arena owning every node of a run, with exact-name resolution.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    nodes: Vec<Node>,
    by_name: HashMap<String, NodeId>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node. Names are unique.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        signature: Signature,
        producer: Producer,
    ) -> Result<NodeId, ValidationError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(ValidationError::DuplicateName { name });
        }
        let id = NodeId(self.nodes.len());
        self.by_name.insert(name.clone(), id);
        self.nodes.push(Node::new(id, name, signature, producer));
        Ok(id)
    }

    /// Map a dependency name to the node that provides it.
    pub fn resolve(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn by_name(&self, name: &str) -> Option<&Node> {
        self.resolve(name).and_then(|id| self.get(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
