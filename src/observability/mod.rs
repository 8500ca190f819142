// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Every log line is built from a message struct that implements `Display` for
//! the human-readable text and [`messages::StructuredLog`] for the fields, so
//! the engine never formats log strings inline.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::engine` - session lifecycle and suite summaries
//! * `messages::node` - wrapping and evaluation of individual nodes
//! * `messages::site` - consumption-site outcomes
//! * `messages::validation` - suite validation errors
//!
//! # Usage
//!
//! ```rust
//! use the_fixtureguard::observability::messages::node::NodeWrapped;
//! use the_fixtureguard::observability::messages::StructuredLog;
//! use the_fixtureguard::graph::NodeKind;
//!
//! NodeWrapped { node: "db_url", kind: NodeKind::Sync }.log();
//! ```

pub mod messages;
