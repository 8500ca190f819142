// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use futures_util::StreamExt;
use std::sync::Arc;

use crate::contract::{Aliases, Hint, Signature};
use crate::engine::CachedResult;
use crate::errors::Violation;
use crate::graph::{classify, Args, Producer, Value, ValueIter};
use crate::traits::{AsyncProduce, Decorate};

/// Checks parameters, return values and yielded items against a [`Signature`].
///
/// Decoration fails when a hint names an unknown alias, or when a generator's
/// return hint cannot describe a sequence. Everything else is checked per call.
#[derive(Debug, Clone, Default)]
pub struct HintChecker {
    aliases: Arc<Aliases>,
}

impl HintChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_aliases(aliases: Aliases) -> Self {
        Self {
            aliases: Arc::new(aliases),
        }
    }
}

impl Decorate for HintChecker {
    fn decorate(
        &self,
        name: &str,
        signature: &Signature,
        producer: Producer,
    ) -> Result<Producer, Violation> {
        for (label, hint) in signature.hints() {
            hint.resolve(&self.aliases).map_err(|reason| {
                Violation::decoration(format!("{}() {} {}", name, label, reason))
            })?;
        }

        let kind = classify(&producer);
        let item = match (&signature.returns, kind.is_generator()) {
            (Some(returns), true) => Some(returns.item_hint(&self.aliases).ok_or_else(|| {
                Violation::decoration(format!(
                    "{} {}() return type hint {} cannot annotate a generator",
                    kind, name, returns
                ))
            })?),
            _ => None,
        };

        let contract = Arc::new(Contract {
            name: name.to_string(),
            signature: signature.clone(),
            item,
            aliases: self.aliases.clone(),
        });

        Ok(match producer {
            Producer::Sync(inner) => Producer::Sync(Arc::new(move |args: &Args| {
                contract.check_args(args)?;
                let value = inner(args)?;
                contract.check_return(&value)?;
                Ok(value)
            })),
            Producer::Async(inner) => Producer::Async(Arc::new(CheckedAsync { contract, inner })),
            Producer::SyncGenerator(inner) => Producer::SyncGenerator(Arc::new(move |args: &Args| {
                contract.check_args(args)?;
                let items = inner(args)?;
                let contract = contract.clone();
                Ok(Box::new(items.map(move |item| contract.check_item(item?))) as ValueIter)
            })),
            Producer::AsyncGenerator(inner) => Producer::AsyncGenerator(Arc::new(move |args: Args| {
                contract.check_args(&args)?;
                let items = inner(args)?;
                let contract = contract.clone();
                Ok(items
                    .map(move |item| item.and_then(|value| contract.check_item(value)))
                    .boxed())
            })),
        })
    }
}

struct CheckedAsync {
    contract: Arc<Contract>,
    inner: Arc<dyn AsyncProduce>,
}

#[async_trait]
impl AsyncProduce for CheckedAsync {
    async fn produce(&self, args: Args) -> anyhow::Result<Value> {
        self.contract.check_args(&args)?;
        let value = self.inner.produce(args).await?;
        self.contract.check_return(&value)?;
        Ok(value)
    }
}

struct Contract {
    name: String,
    signature: Signature,
    item: Option<Hint>,
    aliases: Arc<Aliases>,
}

impl Contract {
    fn check_args(&self, args: &Args) -> anyhow::Result<()> {
        for param in &self.signature.params {
            let (Some(hint), Some(result)) = (&param.hint, args.result(&param.name)) else {
                continue;
            };
            match &**result {
                CachedResult::Value(value) if hint.accepts(value, &self.aliases) => {}
                CachedResult::Value(value) => {
                    return Err(Violation::call(format!(
                        "{}() parameter '{}' = {} violates type hint {}",
                        self.name,
                        param.name,
                        preview(value),
                        hint
                    ))
                    .into());
                }
                // A captured failure only satisfies a hint that accepts anything.
                CachedResult::Failure(_) if *hint == Hint::Any => {}
                CachedResult::Failure(failure) => {
                    return Err(Violation::call(format!(
                        "{}() parameter '{}' received the failure of fixture '{}', which violates type hint {}",
                        self.name,
                        param.name,
                        failure.origin(),
                        hint
                    ))
                    .into());
                }
            }
        }
        Ok(())
    }

    fn check_return(&self, value: &Value) -> anyhow::Result<()> {
        match &self.signature.returns {
            Some(hint) if !hint.accepts(value, &self.aliases) => Err(Violation::call(format!(
                "{}() return {} violates type hint {}",
                self.name,
                preview(value),
                hint
            ))
            .into()),
            _ => Ok(()),
        }
    }

    fn check_item(&self, value: Value) -> anyhow::Result<Value> {
        match &self.item {
            Some(hint) if !hint.accepts(&value, &self.aliases) => Err(Violation::call(format!(
                "{}() yielded {}, which violates type hint {}",
                self.name,
                preview(&value),
                hint
            ))
            .into()),
            _ => Ok(value),
        }
    }
}

fn preview(value: &Value) -> String {
    const LIMIT: usize = 80;
    let rendered = value.to_string();
    if rendered.chars().count() <= LIMIT {
        return rendered;
    }
    let mut short: String = rendered.chars().take(LIMIT).collect();
    short.push_str("...");
    short
}
