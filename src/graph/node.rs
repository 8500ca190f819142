// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use futures_util::stream::{BoxStream, Stream, StreamExt};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

use crate::contract::Signature;
use crate::engine::wrapper::Evaluator;
use crate::graph::Args;
use crate::traits::AsyncProduce;

/// Opaque payload produced by a node.
pub type Value = serde_json::Value;

/// Items of a synchronous generator.
pub type ValueIter = Box<dyn Iterator<Item = anyhow::Result<Value>> + Send>;

/// Items of an asynchronous generator.
pub type ValueStream = BoxStream<'static, anyhow::Result<Value>>;

pub type SyncFn = Arc<dyn Fn(&Args) -> anyhow::Result<Value> + Send + Sync>;
pub type GeneratorFn = Arc<dyn Fn(&Args) -> anyhow::Result<ValueIter> + Send + Sync>;
pub type AsyncGeneratorFn = Arc<dyn Fn(Args) -> anyhow::Result<ValueStream> + Send + Sync>;

/// The underlying callable of a node, tagged with its execution shape.
#[derive(Clone)]
pub enum Producer {
    Sync(SyncFn),
    SyncGenerator(GeneratorFn),
    Async(Arc<dyn AsyncProduce>),
    AsyncGenerator(AsyncGeneratorFn),
}

impl Producer {
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&Args) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Producer::Sync(Arc::new(f))
    }

    /// A generator producer. The node's value is the first item; the rest of the
    /// iterator is resumed once at session teardown.
    pub fn generator<F, I>(f: F) -> Self
    where
        F: Fn(&Args) -> anyhow::Result<I> + Send + Sync + 'static,
        I: IntoIterator<Item = anyhow::Result<Value>>,
        I::IntoIter: Send + 'static,
    {
        Producer::SyncGenerator(Arc::new(move |args: &Args| {
            let items = f(args)?;
            Ok(Box::new(items.into_iter()) as ValueIter)
        }))
    }

    pub fn asynchronous<P>(producer: P) -> Self
    where
        P: AsyncProduce + 'static,
    {
        Producer::Async(Arc::new(producer))
    }

    pub fn async_generator<F, S>(f: F) -> Self
    where
        F: Fn(Args) -> anyhow::Result<S> + Send + Sync + 'static,
        S: Stream<Item = anyhow::Result<Value>> + Send + 'static,
    {
        Producer::AsyncGenerator(Arc::new(move |args: Args| Ok(f(args)?.boxed())))
    }
}

impl fmt::Debug for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Producer::{:?}", classify(self))
    }
}

/// Execution shape of a node. Decides the wrapping strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    #[default]
    Sync,
    SyncGenerator,
    Async,
    AsyncGenerator,
}

impl NodeKind {
    pub fn is_generator(self) -> bool {
        matches!(self, NodeKind::SyncGenerator | NodeKind::AsyncGenerator)
    }

    pub fn is_async(self) -> bool {
        matches!(self, NodeKind::Async | NodeKind::AsyncGenerator)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NodeKind::Sync => "sync",
            NodeKind::SyncGenerator => "sync generator",
            NodeKind::Async => "async",
            NodeKind::AsyncGenerator => "async generator",
        };
        f.write_str(label)
    }
}

/// Classify a producer without invoking it.
///
/// Generator shapes are checked before the async shape, and plain sync is what
/// remains once every other shape has been ruled out.
pub fn classify(producer: &Producer) -> NodeKind {
    match producer {
        Producer::SyncGenerator(_) => NodeKind::SyncGenerator,
        Producer::AsyncGenerator(_) => NodeKind::AsyncGenerator,
        Producer::Async(_) => NodeKind::Async,
        Producer::Sync(_) => NodeKind::Sync,
    }
}

/// Index of a node inside its [`NodeRegistry`](crate::graph::NodeRegistry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A named unit of lazy computation.
///
/// Everything but the wrapping slot is fixed at construction. The slot is filled
/// exactly once by the wrapper factory; `wrapped` records that it happened.
#[derive(Clone)]
pub struct Node {
    id: NodeId,
    name: String,
    kind: NodeKind,
    producer: Producer,
    signature: Signature,
    wrapped: bool,
    evaluator: Option<Evaluator>,
}

impl Node {
    pub(crate) fn new(id: NodeId, name: String, signature: Signature, producer: Producer) -> Self {
        Self {
            id,
            name,
            kind: classify(&producer),
            producer,
            signature,
            wrapped: false,
            evaluator: None,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn producer(&self) -> &Producer {
        &self.producer
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Dependency names, in declaration order.
    pub fn dependencies(&self) -> impl Iterator<Item = &str> {
        self.signature.dependencies()
    }

    pub fn is_wrapped(&self) -> bool {
        self.wrapped
    }

    pub(crate) fn evaluator(&self) -> Option<&Evaluator> {
        self.evaluator.as_ref()
    }

    /// Install the evaluator. A second call is ignored.
    pub(crate) fn install(&mut self, evaluator: Evaluator) -> bool {
        if self.wrapped {
            return false;
        }
        self.evaluator = Some(evaluator);
        self.wrapped = true;
        true
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("dependencies", &self.dependencies().collect::<Vec<_>>())
            .field("wrapped", &self.wrapped)
            .finish()
    }
}
