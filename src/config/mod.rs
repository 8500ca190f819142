// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod loader;
mod options;
mod validation;

pub mod consts;

pub use loader::{
    load_and_validate_suite, load_suite, parse_suite, Expectation, FixtureConfig, SiteConfig,
    SuiteConfig,
};
pub use options::{merge_bool_option, merge_list_option, OptionOverrides, Options};
pub use validation::validate_suite;
