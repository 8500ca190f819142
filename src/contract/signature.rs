// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;

use crate::contract::Hint;

/// One parameter. Its name doubles as the name of the node it depends on.
///
/// Deserializes from either a bare name or a `{ name, hint }` map:
///
/// ```yaml
/// params:
///   - good_fixture
///   - { name: port, hint: int }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "ParamRepr")]
pub struct Param {
    pub name: String,
    pub hint: Option<Hint>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ParamRepr {
    Bare(String),
    Typed {
        name: String,
        #[serde(default)]
        hint: Option<Hint>,
    },
}

impl From<ParamRepr> for Param {
    fn from(repr: ParamRepr) -> Self {
        match repr {
            ParamRepr::Bare(name) => Param { name, hint: None },
            ParamRepr::Typed { name, hint } => Param { name, hint },
        }
    }
}

/// Declared parameters and return hint of a producer or site.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    pub params: Vec<Param>,
    pub returns: Option<Hint>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an unannotated parameter.
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param {
            name: name.into(),
            hint: None,
        });
        self
    }

    pub fn typed_param(mut self, name: impl Into<String>, hint: Hint) -> Self {
        self.params.push(Param {
            name: name.into(),
            hint: Some(hint),
        });
        self
    }

    pub fn returns(mut self, hint: Hint) -> Self {
        self.returns = Some(hint);
        self
    }

    pub fn dependencies(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|param| param.name.as_str())
    }

    /// Every hint with a short label saying where it appears.
    pub(crate) fn hints(&self) -> impl Iterator<Item = (String, &Hint)> {
        self.params
            .iter()
            .filter_map(|param| {
                param
                    .hint
                    .as_ref()
                    .map(|hint| (format!("parameter '{}'", param.name), hint))
            })
            .chain(self.returns.iter().map(|hint| ("return".to_string(), hint)))
    }
}
