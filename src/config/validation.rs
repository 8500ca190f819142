// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Suite validation for graph integrity.
//!
//! Checks run in a fixed order so that later checks can rely on earlier ones:
//!
//! 1. **Uniqueness**: fixture names are unique, and so are site names
//! 2. **References**: every fixture and site parameter names a declared fixture
//!    (or the built-in patching fixture)
//! 3. **Cycles**: DFS over fixture dependencies with a recursion stack
//!
//! Cycle detection needs a structurally valid graph, so it only runs when the
//! first two checks pass. Within a check, every problem is reported.
//!
//! # Example
//! ```rust
//! use the_fixtureguard::config::{parse_suite, validate_suite};
//! use the_fixtureguard::errors::ValidationError;
//!
//! let suite = parse_suite(r#"
//! fixtures:
//!   - name: a
//!     params: [b]
//!     value: 1
//!   - name: b
//!     params: [a]
//!     value: 2
//! "#).unwrap();
//!
//! let errors = validate_suite(&suite).unwrap_err();
//! assert_eq!(
//!     errors,
//!     vec![ValidationError::CyclicDependency {
//!         cycle: vec!["a".to_string(), "b".to_string(), "a".to_string()],
//!     }]
//! );
//! ```

use std::collections::{HashMap, HashSet};

use crate::config::consts::PATCHING_NODE;
use crate::config::SuiteConfig;
use crate::errors::ValidationError;

/// Validates a suite's fixture graph and site requirements.
///
/// # Returns
///
/// * `Ok(())` - The suite can be built and run
/// * `Err(Vec<ValidationError>)` - Every problem found
pub fn validate_suite(suite: &SuiteConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(duplicate_errors) = validate_unique_names(suite) {
        errors.extend(duplicate_errors);
    }

    if let Err(unresolved_errors) = validate_references(suite) {
        errors.extend(unresolved_errors);
    }

    if errors.is_empty() {
        if let Err(cycle_errors) = validate_acyclic_graph(suite) {
            errors.extend(cycle_errors);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Fixture names key dependency resolution; site names key reporting. A
/// fixture and a site may share a name.
fn validate_unique_names(suite: &SuiteConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut seen = HashSet::new();
    for fixture in &suite.fixtures {
        if !seen.insert(fixture.name.as_str()) {
            errors.push(ValidationError::DuplicateName {
                name: fixture.name.clone(),
            });
        }
    }

    let mut seen = HashSet::new();
    for site in &suite.sites {
        if !seen.insert(site.name.as_str()) {
            errors.push(ValidationError::DuplicateName {
                name: site.name.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Every parameter must name a declared fixture. The patching fixture is
/// always available.
fn validate_references(suite: &SuiteConfig) -> Result<(), Vec<ValidationError>> {
    let mut known: HashSet<&str> = suite.fixtures.iter().map(|f| f.name.as_str()).collect();
    known.insert(PATCHING_NODE);

    let requirements = suite
        .fixtures
        .iter()
        .map(|f| (&f.name, &f.params))
        .chain(suite.sites.iter().map(|s| (&s.name, &s.params)));

    let mut errors = Vec::new();
    for (requirer, params) in requirements {
        for param in params {
            if !known.contains(param.name.as_str()) {
                errors.push(ValidationError::UnresolvedDependency {
                    requirer: requirer.clone(),
                    missing_dependency: param.name.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates that the fixture graph is acyclic.
///
/// Uses DFS with a recursion stack ("three colours"): a node on the current
/// path is gray, a finished node is black. Reaching a gray node closes a
/// cycle, which is reported as the path segment from that node back to itself,
/// e.g. `b -> c -> d -> b`.
///
/// Fixtures are visited in declaration order so the reported cycle is stable.
fn validate_acyclic_graph(suite: &SuiteConfig) -> Result<(), Vec<ValidationError>> {
    // fixture -> the fixtures it depends on
    let graph: HashMap<&str, Vec<&str>> = suite
        .fixtures
        .iter()
        .map(|f| {
            (
                f.name.as_str(),
                f.params.iter().map(|p| p.name.as_str()).collect(),
            )
        })
        .collect();

    let mut visited = HashSet::new();
    let mut rec_stack = HashSet::new();
    let mut path = Vec::new();

    for fixture in &suite.fixtures {
        if !visited.contains(fixture.name.as_str()) {
            if let Some(cycle) = dfs_cycle_detection(
                &fixture.name,
                &graph,
                &mut visited,
                &mut rec_stack,
                &mut path,
            ) {
                return Err(vec![ValidationError::CyclicDependency { cycle }]);
            }
        }
    }

    Ok(())
}

fn dfs_cycle_detection<'a>(
    node: &'a str,
    graph: &HashMap<&'a str, Vec<&'a str>>,
    visited: &mut HashSet<&'a str>,
    rec_stack: &mut HashSet<&'a str>,
    path: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    visited.insert(node);
    rec_stack.insert(node);
    path.push(node);

    if let Some(neighbors) = graph.get(node) {
        for &neighbor in neighbors {
            if !visited.contains(neighbor) {
                if let Some(cycle) = dfs_cycle_detection(neighbor, graph, visited, rec_stack, path) {
                    return Some(cycle);
                }
            } else if rec_stack.contains(neighbor) {
                let cycle_start = path.iter().position(|x| *x == neighbor).unwrap_or(0);
                let mut cycle: Vec<String> = path[cycle_start..].iter().map(|s| s.to_string()).collect();
                cycle.push(neighbor.to_string());
                return Some(cycle);
            }
        }
    }

    rec_stack.remove(node);
    path.pop();
    None
}
