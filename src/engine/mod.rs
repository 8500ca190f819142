// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod cache;
pub mod propagator;
pub mod result;
pub(crate) mod runtime;
pub mod session;
pub mod site;
pub mod wrapper;
#[cfg(test)]
pub mod integration_tests;

pub use cache::EvaluationCache;
pub use propagator::{propagate, Aggregation, PropagatedFailure, PropagationScope};
pub use result::{CachedResult, FailureRecord};
pub use session::Session;
pub use site::{ConsumptionSite, SiteBody, SiteFailure, SiteOutcome, SiteReport};
pub use wrapper::{Evaluator, WrapperFactory};
