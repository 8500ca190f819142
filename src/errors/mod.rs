// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod evaluation;
mod violation;

pub use config::{ConfigError, ValidationError};
pub use evaluation::{EvaluationError, TeardownError};
pub use violation::{Phase, Violation};
