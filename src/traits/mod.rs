// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod decorator;
pub mod producer;

pub use decorator::Decorate;
pub use producer::AsyncProduce;
