// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! A concrete decoration capability: type hints over JSON payloads.
//!
//! The engine treats checking as opaque and only talks to the
//! [`Decorate`](crate::traits::Decorate) trait. [`HintChecker`] is the
//! implementation the suite runner and the binary use.

mod checker;
mod hint;
mod signature;

pub use checker::HintChecker;
pub use hint::{Aliases, Hint, HintParseError};
pub use signature::{Param, Signature};
