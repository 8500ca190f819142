// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! One evaluation run over a [`NodeRegistry`].
//!
//! A session owns the cache, the async runtime and the suspended generators.
//! Nodes are wrapped on first use (or eagerly through [`Session::setup_node`]),
//! evaluated at most once, and finalised by [`Session::teardown`].

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use crate::config::Options;
use crate::engine::cache::EvaluationCache;
use crate::engine::propagator::{propagate, PropagationScope};
use crate::engine::runtime::BlockingRuntime;
use crate::engine::site::{ConsumptionSite, SiteFailure, SiteOutcome, SiteReport};
use crate::engine::wrapper::{Evaluated, Finalizer, WrapperFactory};
use crate::engine::{CachedResult, FailureRecord};
use crate::errors::{EvaluationError, Phase, TeardownError};
use crate::graph::{Args, Node, NodeId, NodeRegistry, Producer, Value};
use crate::observability::messages::engine::{SessionStarted, TeardownCompleted};
use crate::observability::messages::node::{NodeEvaluated, NodeEvaluationStarted};
use crate::observability::messages::site::SiteCallStarted;
use crate::observability::messages::StructuredLog;
use crate::traits::Decorate;

pub struct Session {
    registry: NodeRegistry,
    options: Options,
    decorator: Arc<dyn Decorate>,
    cache: EvaluationCache,
    in_progress: Vec<NodeId>,
    finalizers: Vec<(NodeId, Finalizer)>,
    runtime: BlockingRuntime,
}

impl Session {
    pub fn new(registry: NodeRegistry, options: Options, decorator: Arc<dyn Decorate>) -> Self {
        SessionStarted {
            node_count: registry.len(),
            check_fixtures: options.check_fixtures,
            check_sites: options.check_sites,
        }
        .log();
        Self {
            registry,
            options,
            decorator,
            cache: EvaluationCache::new(),
            in_progress: Vec::new(),
            finalizers: Vec::new(),
            runtime: BlockingRuntime::default(),
        }
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The wrapping hook. Installs the node's evaluator once; later calls are
    /// no-ops.
    pub fn setup_node(&mut self, id: NodeId) -> Result<(), EvaluationError> {
        let node = self.node(id)?;
        if node.is_wrapped() {
            return Ok(());
        }
        let evaluator = WrapperFactory::new(&self.options, self.decorator.as_ref()).build(node);
        if let Some(node) = self.registry.get_mut(id) {
            node.install(evaluator);
        }
        Ok(())
    }

    /// Evaluate `id` and its dependencies, or return what an earlier call stored.
    pub fn get_or_evaluate(&mut self, id: NodeId) -> Result<Arc<CachedResult>, EvaluationError> {
        if let Some(result) = self.cache.result(id) {
            return Ok(result.clone());
        }
        if let Some(error) = self.cache.error(id) {
            return Err(error.clone());
        }
        if let Some(start) = self.in_progress.iter().position(|active| *active == id) {
            let path = self.in_progress[start..]
                .iter()
                .chain(std::iter::once(&id))
                .map(|active| self.name_of(*active))
                .collect();
            return Err(EvaluationError::Cycle { path });
        }

        self.in_progress.push(id);
        let outcome = self.evaluate_uncached(id);
        self.in_progress.pop();

        match outcome {
            Ok(Evaluated { result, finalizer }) => {
                if let Some(finalizer) = finalizer {
                    self.finalizers.push((id, finalizer));
                }
                Ok(self.cache.insert(id, result))
            }
            Err(error) => {
                self.cache.insert_error(id, error.clone());
                Err(error)
            }
        }
    }

    pub fn evaluate(&mut self, name: &str) -> Result<Arc<CachedResult>, EvaluationError> {
        let id = self
            .registry
            .resolve(name)
            .ok_or_else(|| EvaluationError::UnknownNode(name.to_string()))?;
        self.get_or_evaluate(id)
    }

    /// The stored result of `name`, without evaluating anything.
    pub fn cached(&self, name: &str) -> Option<Arc<CachedResult>> {
        let id = self.registry.resolve(name)?;
        self.cache.result(id).cloned()
    }

    /// The propagation hook: evaluate everything `site` requires, then either
    /// report the captured failures among them or run the site body.
    pub fn call_site(&mut self, site: &ConsumptionSite) -> Result<SiteReport, EvaluationError> {
        let message = SiteCallStarted {
            site: site.name(),
            requirement_count: site.requires().count(),
        };
        let span = message.span("call_site");
        let _guard = span.enter();
        message.log();

        let mut args = Args::new();
        let mut required = Vec::new();
        for name in site.requires() {
            let id = self.registry.resolve(name).ok_or_else(|| {
                EvaluationError::UnresolvedDependency {
                    requirer: site.name().to_string(),
                    dependency: name.to_string(),
                }
            })?;
            args.push(name, self.get_or_evaluate(id)?);
            required.push(id);
        }

        let report = match self.propagated_failure(&required)? {
            Some(failure) => SiteReport::new(site.name(), SiteOutcome::Failed(failure)),
            None => SiteReport::new(site.name(), self.run_body(site, &args)?),
        };
        report.log();
        Ok(report)
    }

    /// Finalise generator nodes in reverse setup order, resuming each once.
    pub fn teardown(&mut self) -> Vec<TeardownError> {
        let mut errors = Vec::new();
        let mut finalized = 0;
        while let Some((id, finalizer)) = self.finalizers.pop() {
            let name = self.name_of(id);
            if let Err(error) = finalizer.finalize(&name, &mut self.runtime) {
                tracing::warn!(node = %name, "{}", error);
                errors.push(error);
            }
            finalized += 1;
        }
        TeardownCompleted {
            finalized,
            errors: errors.len(),
        }
        .log();
        errors
    }

    fn evaluate_uncached(&mut self, id: NodeId) -> Result<Evaluated, EvaluationError> {
        let node = self.node(id)?;
        let name = node.name().to_string();
        let kind = node.kind();
        let dependencies: Vec<String> = node.dependencies().map(str::to_string).collect();

        let message = NodeEvaluationStarted {
            node: &name,
            kind,
            dependency_count: dependencies.len(),
        };
        let span = message.span("evaluate");
        let _guard = span.enter();
        message.log();

        let mut args = Args::with_capacity(dependencies.len());
        for dependency in dependencies {
            let dependency_id = self.registry.resolve(&dependency).ok_or_else(|| {
                EvaluationError::UnresolvedDependency {
                    requirer: name.clone(),
                    dependency: dependency.clone(),
                }
            })?;
            let result = self.get_or_evaluate(dependency_id)?;
            args.push(dependency, result);
        }

        self.setup_node(id)?;
        let evaluator = self
            .node(id)?
            .evaluator()
            .cloned()
            .ok_or_else(|| EvaluationError::UnknownNode(name.clone()))?;

        let started = Instant::now();
        let evaluated = evaluator.evaluate(&name, &args, &mut self.runtime)?;
        NodeEvaluated {
            node: &name,
            failed: evaluated.result.is_failure(),
            duration: started.elapsed(),
        }
        .log();
        Ok(evaluated)
    }

    fn propagated_failure(&mut self, required: &[NodeId]) -> Result<Option<SiteFailure>, EvaluationError> {
        if !self.options.check_fixtures {
            return Ok(None);
        }
        let inspected = match self.options.scope {
            PropagationScope::Direct => {
                let mut seen = HashSet::new();
                required.iter().copied().filter(|id| seen.insert(*id)).collect()
            }
            PropagationScope::Closure => self.closure_of(required),
        };
        let mut results = Vec::with_capacity(inspected.len());
        for id in inspected {
            results.push(self.get_or_evaluate(id)?);
        }
        Ok(propagate(results.iter().map(Arc::as_ref), self.options.aggregation)
            .map(SiteFailure::Propagated))
    }

    /// `roots` followed by everything they transitively depend on, each once.
    fn closure_of(&self, roots: &[NodeId]) -> Vec<NodeId> {
        let mut seen: HashSet<NodeId> = roots.iter().copied().collect();
        let mut ordered: Vec<NodeId> = Vec::new();
        for root in roots {
            if !ordered.contains(root) {
                ordered.push(*root);
            }
        }
        let mut next = 0;
        while next < ordered.len() {
            if let Some(node) = self.registry.get(ordered[next]) {
                for dependency in node.dependencies() {
                    if let Some(id) = self.registry.resolve(dependency) {
                        if seen.insert(id) {
                            ordered.push(id);
                        }
                    }
                }
            }
            next += 1;
        }
        ordered
    }

    fn run_body(&mut self, site: &ConsumptionSite, args: &Args) -> Result<SiteOutcome, EvaluationError> {
        let Some(body) = site.body().cloned() else {
            return Ok(SiteOutcome::Passed);
        };
        let producer = Producer::sync(move |args: &Args| {
            body(args)?;
            Ok(Value::Null)
        });

        let producer = if self.options.check_sites {
            match self.decorator.decorate(site.name(), site.signature(), producer) {
                Ok(checked) => checked,
                Err(violation) => {
                    let record = FailureRecord::from_violation(site.name(), Phase::Decoration, violation);
                    return Ok(SiteOutcome::Failed(SiteFailure::OwnViolation(record)));
                }
            }
        } else {
            producer
        };

        let Producer::Sync(call) = producer else {
            return Err(EvaluationError::Producer {
                node: site.name().to_string(),
                error: Arc::new(anyhow::anyhow!("site decorator changed the call shape")),
            });
        };
        let error = match call(args) {
            Ok(_) => return Ok(SiteOutcome::Passed),
            Err(error) => error,
        };
        if !self.options.check_sites {
            return Ok(SiteOutcome::Failed(SiteFailure::Body {
                message: format!("{:#}", error),
            }));
        }
        Ok(match FailureRecord::capture(site.name(), Phase::Call, error) {
            Ok(record) => SiteOutcome::Failed(SiteFailure::OwnViolation(record)),
            Err(error) => SiteOutcome::Failed(SiteFailure::Body {
                message: format!("{:#}", error),
            }),
        })
    }

    fn node(&self, id: NodeId) -> Result<&Node, EvaluationError> {
        self.registry
            .get(id)
            .ok_or_else(|| EvaluationError::UnknownNode(format!("#{}", id.index())))
    }

    fn name_of(&self, id: NodeId) -> String {
        self.registry
            .get(id)
            .map(|node| node.name().to_string())
            .unwrap_or_else(|| format!("#{}", id.index()))
    }
}
