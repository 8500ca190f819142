// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::contract::{Aliases, Hint, Param};
use crate::errors::ConfigError;
use crate::graph::{NodeKind, Value};
use crate::observability::messages::validation::{SuiteLoaded, SuiteValidationFailed};
use crate::observability::messages::StructuredLog;

/// A suite definition: fixtures, the sites that consume them, and the hint
/// aliases both may use.
///
/// # Example
/// ```yaml
/// aliases:
///   Port: int
/// fixtures:
///   - name: port
///     returns: Port
///     value: 8080
///   - name: url
///     params: [{ name: port, hint: Port }]
///     returns: str
///     value: "http://localhost:8080"
/// sites:
///   - name: test_url
///     params: [url]
///     asserts:
///       url: "http://localhost:8080"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SuiteConfig {
    #[serde(default)]
    pub aliases: Aliases,
    #[serde(default)]
    pub fixtures: Vec<FixtureConfig>,
    #[serde(default)]
    pub sites: Vec<SiteConfig>,
}

/// One fixture. Exactly one body is expected: `value`, `forward`, `yields`
/// (generator kinds only) or `raise`.
///
/// # Fields
/// * `kind` - Execution shape, `sync` when omitted
/// * `params` - Dependencies, optionally hinted
/// * `returns` - Return hint; for generators it describes the sequence
/// * `value` - Constant returned on every call
/// * `forward` - Name of a parameter whose value is returned as-is
/// * `yields` - Items of a generator fixture
/// * `raise` - Message of an ordinary error raised instead of returning
#[derive(Debug, Clone, Deserialize)]
pub struct FixtureConfig {
    pub name: String,
    #[serde(default)]
    pub kind: NodeKind,
    #[serde(default)]
    pub params: Vec<Param>,
    pub returns: Option<Hint>,
    pub value: Option<Value>,
    pub forward: Option<String>,
    pub yields: Option<Vec<Value>>,
    pub raise: Option<String>,
}

/// One consumption site.
///
/// `asserts` maps parameter names to the value the body expects; a mismatch
/// fails the site. `raise` makes the body fail unconditionally.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    pub name: String,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default)]
    pub expect: Expectation,
    #[serde(default)]
    pub asserts: BTreeMap<String, Value>,
    pub raise: Option<String>,
}

/// Declared outcome of a site. `fail` is strict: an unexpected pass is reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    #[default]
    Pass,
    Fail,
}

/// Parse a suite definition from YAML text.
pub fn parse_suite(content: &str) -> Result<SuiteConfig, ConfigError> {
    Ok(serde_yaml::from_str(content)?)
}

/// Load a suite definition from a YAML file
pub fn load_suite<P: AsRef<Path>>(path: P) -> Result<SuiteConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_suite(&content)
}

/// Load a suite definition and validate its dependency graph.
///
/// Every validation problem is logged and returned together, not just the first.
pub fn load_and_validate_suite<P: AsRef<Path>>(path: P) -> Result<SuiteConfig, ConfigError> {
    let suite = load_suite(path.as_ref())?;

    if let Err(errors) = crate::config::validate_suite(&suite) {
        for error in &errors {
            SuiteValidationFailed { error }.log();
        }
        return Err(ConfigError::Invalid(errors));
    }

    SuiteLoaded {
        path: &path.as_ref().display().to_string(),
        fixture_count: suite.fixtures.len(),
        site_count: suite.sites.len(),
    }
    .log();
    Ok(suite)
}
