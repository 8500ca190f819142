// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The wrapper factory: one [`Evaluator`] per node.
//!
//! Fixture violations are caught here and nowhere else. A decoration-time violation
//! becomes an evaluator that replays the same failure forever; a call-time
//! violation becomes the cached failure of that evaluation. Errors that are not
//! violations leave as [`EvaluationError::Producer`].

use futures_util::StreamExt;
use std::sync::Arc;

use crate::config::Options;
use crate::engine::runtime::BlockingRuntime;
use crate::engine::{CachedResult, FailureRecord};
use crate::errors::{EvaluationError, Phase, TeardownError};
use crate::graph::{Args, Node, Producer, Value, ValueIter, ValueStream};
use crate::observability::messages::node::{
    NodeBypassed, NodeWrapped, ProducerFailed, ViolationCaptured,
};
use crate::observability::messages::StructuredLog;
use crate::traits::Decorate;

/// How a node is evaluated once its dependencies are bound.
#[derive(Clone)]
pub enum Evaluator {
    /// Decoration failed; every evaluation yields this failure without running
    /// the producer.
    Captured(FailureRecord),
    /// The decorated producer; violations it raises are captured.
    Checked(Producer),
    /// The original producer, untouched; nothing is captured.
    PassThrough(Producer),
}

impl Evaluator {
    pub fn is_checked(&self) -> bool {
        !matches!(self, Evaluator::PassThrough(_))
    }

    pub(crate) fn evaluate(
        &self,
        node: &str,
        args: &Args,
        runtime: &mut BlockingRuntime,
    ) -> Result<Evaluated, EvaluationError> {
        let (producer, intercept) = match self {
            Evaluator::Captured(record) => {
                return Ok(Evaluated::plain(CachedResult::Failure(record.clone())));
            }
            Evaluator::Checked(producer) => (producer, true),
            Evaluator::PassThrough(producer) => (producer, false),
        };

        match producer {
            Producer::Sync(f) => Ok(Evaluated::plain(settle(node, intercept, f(args))?)),
            Producer::Async(p) => {
                let outcome = runtime.block_on(p.produce(args.clone()))?;
                Ok(Evaluated::plain(settle(node, intercept, outcome)?))
            }
            Producer::SyncGenerator(f) => {
                let mut items = match f(args) {
                    Ok(items) => items,
                    Err(error) => return Ok(Evaluated::plain(settle(node, intercept, Err(error))?)),
                };
                let first = items.next().ok_or_else(|| EvaluationError::NoValue {
                    node: node.to_string(),
                })?;
                Ok(Evaluated {
                    result: settle(node, intercept, first)?,
                    finalizer: Some(Finalizer::Iter(items)),
                })
            }
            Producer::AsyncGenerator(f) => {
                let mut items = match f(args.clone()) {
                    Ok(items) => items,
                    Err(error) => return Ok(Evaluated::plain(settle(node, intercept, Err(error))?)),
                };
                let first = runtime
                    .block_on(items.next())?
                    .ok_or_else(|| EvaluationError::NoValue {
                        node: node.to_string(),
                    })?;
                Ok(Evaluated {
                    result: settle(node, intercept, first)?,
                    finalizer: Some(Finalizer::Stream(items)),
                })
            }
        }
    }
}

fn settle(
    node: &str,
    intercept: bool,
    outcome: anyhow::Result<Value>,
) -> Result<CachedResult, EvaluationError> {
    let error = match outcome {
        Ok(value) => return Ok(CachedResult::Value(value)),
        Err(error) if intercept => match FailureRecord::capture(node, Phase::Call, error) {
            Ok(record) => {
                ViolationCaptured {
                    node,
                    phase: record.phase(),
                    message: record.message(),
                }
                .log();
                return Ok(CachedResult::Failure(record));
            }
            Err(error) => error,
        },
        Err(error) => error,
    };
    ProducerFailed {
        node,
        error: &error,
    }
    .log();
    Err(EvaluationError::Producer {
        node: node.to_string(),
        error: Arc::new(error),
    })
}

pub(crate) struct Evaluated {
    pub(crate) result: CachedResult,
    pub(crate) finalizer: Option<Finalizer>,
}

impl Evaluated {
    fn plain(result: CachedResult) -> Self {
        Self {
            result,
            finalizer: None,
        }
    }
}

/// The suspended remainder of a generator node, resumed once at teardown.
pub(crate) enum Finalizer {
    Iter(ValueIter),
    Stream(ValueStream),
}

impl Finalizer {
    pub(crate) fn finalize(
        self,
        node: &str,
        runtime: &mut BlockingRuntime,
    ) -> Result<(), TeardownError> {
        let next = match self {
            Finalizer::Iter(mut items) => items.next(),
            Finalizer::Stream(mut items) => {
                let next = runtime.block_on(items.next()).map_err(|e| TeardownError::Producer {
                    node: node.to_string(),
                    error: anyhow::Error::new(e),
                })?;
                next
            }
        };
        match next {
            None => Ok(()),
            Some(Ok(_)) => Err(TeardownError::MoreThanOneItem {
                node: node.to_string(),
            }),
            Some(Err(error)) => Err(TeardownError::Producer {
                node: node.to_string(),
                error,
            }),
        }
    }
}

/// Builds evaluators according to the run's [`Options`].
pub struct WrapperFactory<'a> {
    options: &'a Options,
    decorator: &'a dyn Decorate,
}

impl<'a> WrapperFactory<'a> {
    pub fn new(options: &'a Options, decorator: &'a dyn Decorate) -> Self {
        Self { options, decorator }
    }

    pub fn build(&self, node: &Node) -> Evaluator {
        if let Some(reason) = self.bypass_reason(node) {
            NodeBypassed {
                node: node.name(),
                kind: node.kind(),
                reason,
            }
            .log();
            return Evaluator::PassThrough(node.producer().clone());
        }

        match self
            .decorator
            .decorate(node.name(), node.signature(), node.producer().clone())
        {
            Ok(checked) => {
                NodeWrapped {
                    node: node.name(),
                    kind: node.kind(),
                }
                .log();
                Evaluator::Checked(checked)
            }
            Err(violation) => {
                let record = FailureRecord::from_violation(node.name(), Phase::Decoration, violation);
                ViolationCaptured {
                    node: node.name(),
                    phase: record.phase(),
                    message: record.message(),
                }
                .log();
                Evaluator::Captured(record)
            }
        }
    }

    fn bypass_reason(&self, node: &Node) -> Option<&'static str> {
        if !self.options.check_fixtures {
            Some("checking disabled")
        } else if self.options.is_exempt(node.name()) {
            Some("exempt from checking")
        } else if node.kind().is_generator() && !self.options.check_generators {
            Some("generator nodes are not checked")
        } else {
            None
        }
    }
}
