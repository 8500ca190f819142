// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::contract::Signature;
use crate::errors::Violation;
use crate::graph::Producer;

/// The decoration capability: turns a producer into a checked producer.
///
/// Returning `Err` is a decoration-time violation. The returned producer reports
/// call-time violations by failing with an error that downcasts to
/// [`Violation`]; any other error it returns is treated as an ordinary defect.
/// Implementations must preserve the producer's shape (a `Sync` producer stays
/// `Sync`, and so on).
pub trait Decorate: Send + Sync {
    fn decorate(
        &self,
        name: &str,
        signature: &Signature,
        producer: Producer,
    ) -> Result<Producer, Violation>;
}
