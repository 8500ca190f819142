// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::future::Future;

use crate::graph::{Args, Value};

/// An asynchronous producer: the `Async` node shape.
///
/// Any `Fn(Args) -> impl Future<Output = anyhow::Result<Value>>` closure
/// implements this trait, so most callers never name it:
///
/// ```
/// use the_fixtureguard::graph::{Args, Producer};
///
/// let producer = Producer::asynchronous(|_args: Args| async { Ok::<_, anyhow::Error>(serde_json::json!(7)) });
/// assert!(matches!(producer, Producer::Async(_)));
/// ```
#[async_trait]
pub trait AsyncProduce: Send + Sync {
    async fn produce(&self, args: Args) -> anyhow::Result<Value>;
}

#[async_trait]
impl<F, Fut> AsyncProduce for F
where
    F: Fn(Args) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
{
    async fn produce(&self, args: Args) -> anyhow::Result<Value> {
        (self)(args).await
    }
}
