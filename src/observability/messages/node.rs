// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for node wrapping and evaluation.

use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

use crate::errors::Phase;
use crate::graph::NodeKind;
use crate::observability::messages::StructuredLog;

/// Node decorated by the checking capability.
///
/// # Log Level
/// `debug!` - Diagnostic detail
pub struct NodeWrapped<'a> {
    pub node: &'a str,
    pub kind: NodeKind,
}

impl Display for NodeWrapped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Wrapped {} node '{}' with type-checking", self.kind, self.node)
    }
}

impl StructuredLog for NodeWrapped<'_> {
    fn log(&self) {
        tracing::debug!(node = self.node, kind = %self.kind, "{}", self);
    }
}

/// Node left unwrapped: checking disabled, exempt, or unsupported kind.
///
/// # Log Level
/// `debug!` - Diagnostic detail
pub struct NodeBypassed<'a> {
    pub node: &'a str,
    pub kind: NodeKind,
    pub reason: &'a str,
}

impl Display for NodeBypassed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Passing {} node '{}' through unchecked: {}",
            self.kind, self.node, self.reason
        )
    }
}

impl StructuredLog for NodeBypassed<'_> {
    fn log(&self) {
        tracing::debug!(node = self.node, kind = %self.kind, reason = self.reason, "{}", self);
    }
}

/// A contract violation was captured into a failure value.
///
/// # Log Level
/// `warn!` - Expected but noteworthy
pub struct ViolationCaptured<'a> {
    pub node: &'a str,
    pub phase: Phase,
    pub message: &'a str,
}

impl Display for ViolationCaptured<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Captured {} violation in '{}': {}",
            self.phase, self.node, self.message
        )
    }
}

impl StructuredLog for ViolationCaptured<'_> {
    fn log(&self) {
        tracing::warn!(node = self.node, phase = %self.phase, "{}", self);
    }
}

/// Node evaluation started.
///
/// # Log Level
/// `debug!` - Diagnostic detail
pub struct NodeEvaluationStarted<'a> {
    pub node: &'a str,
    pub kind: NodeKind,
    pub dependency_count: usize,
}

impl Display for NodeEvaluationStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Evaluating {} node '{}' with {} dependencies",
            self.kind, self.node, self.dependency_count
        )
    }
}

impl StructuredLog for NodeEvaluationStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            node = self.node,
            kind = %self.kind,
            dependency_count = self.dependency_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "node_evaluation",
            span_name = name,
            node = self.node,
            kind = %self.kind,
        )
    }
}

/// Node evaluated and cached.
///
/// # Log Level
/// `debug!` - Diagnostic detail
pub struct NodeEvaluated<'a> {
    pub node: &'a str,
    pub failed: bool,
    pub duration: Duration,
}

impl Display for NodeEvaluated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let outcome = if self.failed { "failure" } else { "value" };
        write!(
            f,
            "Node '{}' cached a {} in {:?}",
            self.node, outcome, self.duration
        )
    }
}

impl StructuredLog for NodeEvaluated<'_> {
    fn log(&self) {
        tracing::debug!(
            node = self.node,
            failed = self.failed,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }
}

/// Producer raised an ordinary error, which is not intercepted.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ProducerFailed<'a> {
    pub node: &'a str,
    pub error: &'a dyn Display,
}

impl Display for ProducerFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Node '{}' raised: {}", self.node, self.error)
    }
}

impl StructuredLog for ProducerFailed<'_> {
    fn log(&self) {
        tracing::error!(node = self.node, "{}", self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_texts() {
        let wrapped = NodeWrapped { node: "a", kind: NodeKind::Async };
        assert_eq!(wrapped.to_string(), "Wrapped async node 'a' with type-checking");

        let bypassed = NodeBypassed {
            node: "g",
            kind: NodeKind::SyncGenerator,
            reason: "generator nodes are not checked",
        };
        assert_eq!(
            bypassed.to_string(),
            "Passing sync generator node 'g' through unchecked: generator nodes are not checked"
        );

        let captured = ViolationCaptured {
            node: "b",
            phase: Phase::Call,
            message: "expected int",
        };
        assert_eq!(captured.to_string(), "Captured call-time violation in 'b': expected int");
    }
}
