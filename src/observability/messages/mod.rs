// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! * `engine` - session lifecycle and suite summaries
//! * `node` - wrapping and evaluation of individual nodes
//! * `site` - consumption-site outcomes
//! * `validation` - suite validation errors

use tracing::Span;

pub mod engine;
pub mod node;
pub mod site;
pub mod validation;

/// A message that knows its own level and fields.
pub trait StructuredLog {
    /// Emit the message at its level, with its fields attached.
    fn log(&self);

    /// A span carrying the message's fields. Messages that never open a span
    /// keep the disabled default.
    fn span(&self, _name: &str) -> Span {
        Span::none()
    }
}
