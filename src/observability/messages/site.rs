// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for consumption-site outcomes.

use std::fmt::{Display, Formatter};
use tracing::Span;

use crate::observability::messages::StructuredLog;

/// Site about to run.
///
/// # Log Level
/// `debug!` - Diagnostic detail
pub struct SiteCallStarted<'a> {
    pub site: &'a str,
    pub requirement_count: usize,
}

impl Display for SiteCallStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Calling site '{}' with {} required fixtures",
            self.site, self.requirement_count
        )
    }
}

impl StructuredLog for SiteCallStarted<'_> {
    fn log(&self) {
        tracing::debug!(site = self.site, requirement_count = self.requirement_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("site_call", span_name = name, site = self.site)
    }
}

/// Site passed.
///
/// # Log Level
/// `info!` - Important operational event
pub struct SitePassed<'a> {
    pub site: &'a str,
}

impl Display for SitePassed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Site '{}' passed", self.site)
    }
}

impl StructuredLog for SitePassed<'_> {
    fn log(&self) {
        tracing::info!(site = self.site, "{}", self);
    }
}

/// Site failed, either through an upstream failure or on its own.
///
/// # Log Level
/// `warn!` - Expected but noteworthy
pub struct SiteFailed<'a> {
    pub site: &'a str,
    pub cause: &'a str,
    pub diagnostic: &'a str,
}

impl Display for SiteFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Site '{}' failed ({}): {}", self.site, self.cause, self.diagnostic)
    }
}

impl StructuredLog for SiteFailed<'_> {
    fn log(&self) {
        tracing::warn!(site = self.site, cause = self.cause, "{}", self);
    }
}
