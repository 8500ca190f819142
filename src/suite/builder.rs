// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{anyhow, bail, ensure};
use futures_util::stream;
use std::collections::BTreeMap;

use crate::config::consts::PATCHING_NODE;
use crate::config::{Expectation, FixtureConfig, SiteConfig, SuiteConfig};
use crate::contract::{Aliases, HintChecker, Signature};
use crate::engine::ConsumptionSite;
use crate::errors::ConfigError;
use crate::graph::{Args, NodeKind, NodeRegistry, Producer, Value};

/// A suite ready to run: the fixture graph plus its sites in declaration order.
#[derive(Debug, Clone)]
pub struct Suite {
    pub registry: NodeRegistry,
    pub sites: Vec<PlannedSite>,
    pub aliases: Aliases,
}

impl Suite {
    /// The decorator for this suite's hints.
    pub fn checker(&self) -> HintChecker {
        HintChecker::with_aliases(self.aliases.clone())
    }
}

#[derive(Debug, Clone)]
pub struct PlannedSite {
    pub site: ConsumptionSite,
    pub expect: Expectation,
}

/// What a configured fixture does when called.
#[derive(Debug, Clone)]
enum FixtureBody {
    Value(Value),
    Forward(String),
    Yields(Vec<Value>),
    Raise(String),
}

impl FixtureBody {
    fn from_config(fixture: &FixtureConfig) -> Result<Self, ConfigError> {
        let reject = |reason: String| ConfigError::Body {
            owner: fixture.name.clone(),
            reason,
        };

        let mut bodies = Vec::new();
        if let Some(value) = &fixture.value {
            bodies.push(FixtureBody::Value(value.clone()));
        }
        if let Some(target) = &fixture.forward {
            bodies.push(FixtureBody::Forward(target.clone()));
        }
        if let Some(items) = &fixture.yields {
            bodies.push(FixtureBody::Yields(items.clone()));
        }
        if let Some(message) = &fixture.raise {
            bodies.push(FixtureBody::Raise(message.clone()));
        }

        let body = match bodies.len() {
            0 => return Err(reject("set one of value, forward, yields or raise".to_string())),
            1 => bodies.remove(0),
            _ => return Err(reject("value, forward, yields and raise are mutually exclusive".to_string())),
        };

        let problem = match (&body, fixture.kind.is_generator()) {
            (FixtureBody::Yields(_), false) => Some(format!("{} fixtures cannot yield", fixture.kind)),
            (FixtureBody::Value(_) | FixtureBody::Forward(_), true) => {
                Some(format!("{} fixtures must use yields", fixture.kind))
            }
            (FixtureBody::Forward(target), _) if !fixture.params.iter().any(|p| &p.name == target) => {
                Some(format!("forward target '{}' is not a parameter", target))
            }
            _ => None,
        };
        match problem {
            Some(reason) => Err(reject(reason)),
            None => Ok(body),
        }
    }

    fn produce(&self, args: &Args) -> anyhow::Result<Value> {
        match self {
            FixtureBody::Value(value) => Ok(value.clone()),
            FixtureBody::Forward(target) => Ok(args.get(target)?.clone()),
            FixtureBody::Raise(message) => Err(anyhow!("{}", message)),
            FixtureBody::Yields(_) => bail!("generator body called as a plain fixture"),
        }
    }

    fn items(&self) -> anyhow::Result<Vec<anyhow::Result<Value>>> {
        match self {
            FixtureBody::Yields(items) => Ok(items.iter().cloned().map(Ok).collect()),
            FixtureBody::Raise(message) => Err(anyhow!("{}", message)),
            _ => bail!("plain body called as a generator"),
        }
    }

    fn into_producer(self, kind: NodeKind) -> Producer {
        match kind {
            NodeKind::Sync => Producer::sync(move |args| self.produce(args)),
            NodeKind::Async => Producer::asynchronous(move |args: Args| {
                let body = self.clone();
                async move {
                    tokio::task::yield_now().await;
                    body.produce(&args)
                }
            }),
            NodeKind::SyncGenerator => Producer::generator(move |_| self.items()),
            NodeKind::AsyncGenerator => {
                Producer::async_generator(move |_args: Args| Ok(stream::iter(self.items()?)))
            }
        }
    }
}

/// Build the fixture graph and sites of a validated suite.
///
/// The patching fixture is provided when a suite uses it without declaring it.
pub fn build_suite(config: &SuiteConfig) -> Result<Suite, ConfigError> {
    let mut registry = NodeRegistry::new();

    for fixture in &config.fixtures {
        let producer = FixtureBody::from_config(fixture)?.into_producer(fixture.kind);
        let signature = Signature {
            params: fixture.params.clone(),
            returns: fixture.returns.clone(),
        };
        registry
            .register(fixture.name.clone(), signature, producer)
            .map_err(|e| ConfigError::Invalid(vec![e]))?;
    }

    if registry.resolve(PATCHING_NODE).is_none() && uses_patching_node(config) {
        registry
            .register(PATCHING_NODE, Signature::new(), Producer::sync(|_| Ok(Value::Null)))
            .map_err(|e| ConfigError::Invalid(vec![e]))?;
    }

    let sites = config
        .sites
        .iter()
        .map(plan_site)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Suite {
        registry,
        sites,
        aliases: config.aliases.clone(),
    })
}

fn uses_patching_node(config: &SuiteConfig) -> bool {
    config
        .fixtures
        .iter()
        .flat_map(|f| &f.params)
        .chain(config.sites.iter().flat_map(|s| &s.params))
        .any(|p| p.name == PATCHING_NODE)
}

fn plan_site(config: &SiteConfig) -> Result<PlannedSite, ConfigError> {
    if let Some(unknown) = config
        .asserts
        .keys()
        .find(|name| !config.params.iter().any(|p| &&p.name == name))
    {
        return Err(ConfigError::Body {
            owner: config.name.clone(),
            reason: format!("asserts on '{}', which is not a parameter", unknown),
        });
    }

    let asserts: BTreeMap<String, Value> = config.asserts.clone();
    let raise = config.raise.clone();
    let signature = Signature {
        params: config.params.clone(),
        returns: None,
    };
    let site = ConsumptionSite::with_signature(config.name.clone(), signature).with_body(move |args| {
        if let Some(message) = &raise {
            bail!("{}", message);
        }
        for (name, expected) in &asserts {
            let actual = args.get(name)?;
            ensure!(actual == expected, "{} is {}, expected {}", name, actual, expected);
        }
        Ok(())
    });

    Ok(PlannedSite {
        site,
        expect: config.expect,
    })
}
