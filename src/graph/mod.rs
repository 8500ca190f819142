// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The node graph: producers, their classification, and name-based wiring.

mod args;
mod node;
mod registry;

pub use args::Args;
pub use node::{
    classify, AsyncGeneratorFn, GeneratorFn, Node, NodeId, NodeKind, Producer, SyncFn, Value,
    ValueIter, ValueStream,
};
pub use registry::NodeRegistry;
