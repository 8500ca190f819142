// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod config;     // options + suite definitions
pub mod contract;   // type hints and the hint checker
pub mod engine;     // wrapping, memoized evaluation, propagation
pub mod errors;     // error handling
pub mod graph;      // nodes, producers and the registry
pub mod observability;
pub mod suite;      // suite building and running
pub mod traits;     // unified abstractions
