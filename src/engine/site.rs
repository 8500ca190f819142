// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::sync::Arc;

use crate::contract::Signature;
use crate::engine::propagator::PropagatedFailure;
use crate::engine::FailureRecord;
use crate::graph::Args;
use crate::observability::messages::site::{SiteFailed, SitePassed};
use crate::observability::messages::StructuredLog;

/// The body of a consumption site. It receives the site's required results.
pub type SiteBody = Arc<dyn Fn(&Args) -> anyhow::Result<()> + Send + Sync>;

/// A consumer of nodes, e.g. a test function. Sites are not nodes: nothing
/// depends on them and their outcome is never cached.
#[derive(Clone)]
pub struct ConsumptionSite {
    name: String,
    signature: Signature,
    body: Option<SiteBody>,
}

impl ConsumptionSite {
    pub fn new<I, S>(name: impl Into<String>, requires: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let signature = requires
            .into_iter()
            .fold(Signature::new(), |signature, name| signature.param(name));
        Self::with_signature(name, signature)
    }

    /// A site whose parameters may carry hints, checked when site checking is on.
    pub fn with_signature(name: impl Into<String>, signature: Signature) -> Self {
        Self {
            name: name.into(),
            signature,
            body: None,
        }
    }

    pub fn with_body<F>(mut self, body: F) -> Self
    where
        F: Fn(&Args) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.body = Some(Arc::new(body));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Required node names, in declaration order.
    pub fn requires(&self) -> impl Iterator<Item = &str> {
        self.signature.dependencies()
    }

    pub fn body(&self) -> Option<&SiteBody> {
        self.body.as_ref()
    }
}

impl fmt::Debug for ConsumptionSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsumptionSite")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .field("body", &self.body.is_some())
            .finish()
    }
}

/// Why a site failed.
#[derive(Debug, Clone)]
pub enum SiteFailure {
    /// One or more required nodes hold a captured failure. The body never ran.
    Propagated(PropagatedFailure),
    /// The site's own signature was violated.
    OwnViolation(FailureRecord),
    /// The body returned an error that is not a contract violation.
    Body { message: String },
}

impl SiteFailure {
    pub fn cause(&self) -> &'static str {
        match self {
            SiteFailure::Propagated(_) => "fixture failure",
            SiteFailure::OwnViolation(_) => "site violation",
            SiteFailure::Body { .. } => "body error",
        }
    }
}

#[derive(Debug, Clone)]
pub enum SiteOutcome {
    Passed,
    Failed(SiteFailure),
}

/// What a host reports for one site call.
#[derive(Debug, Clone)]
pub struct SiteReport {
    site: String,
    outcome: SiteOutcome,
}

impl SiteReport {
    pub(crate) fn new(site: impl Into<String>, outcome: SiteOutcome) -> Self {
        Self {
            site: site.into(),
            outcome,
        }
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn outcome(&self) -> &SiteOutcome {
        &self.outcome
    }

    pub fn passed(&self) -> bool {
        matches!(self.outcome, SiteOutcome::Passed)
    }

    pub fn failure(&self) -> Option<&SiteFailure> {
        match &self.outcome {
            SiteOutcome::Passed => None,
            SiteOutcome::Failed(failure) => Some(failure),
        }
    }

    /// The text a host shows for a failed site.
    pub fn diagnostic(&self) -> Option<String> {
        self.failure().map(|failure| match failure {
            SiteFailure::Propagated(propagated) => propagated.diagnostic(),
            SiteFailure::OwnViolation(record) => record.describe("Test"),
            SiteFailure::Body { message } => format!("Test \"{}\" failed: {}", self.site, message),
        })
    }

    pub(crate) fn log(&self) {
        match (self.failure(), self.diagnostic()) {
            (Some(failure), Some(diagnostic)) => SiteFailed {
                site: &self.site,
                cause: failure.cause(),
                diagnostic: &diagnostic,
            }
            .log(),
            _ => SitePassed { site: &self.site }.log(),
        }
    }
}
