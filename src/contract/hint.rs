// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Type hints over [`Value`](crate::graph::Value) payloads.
//!
//! Grammar:
//!
//! ```text
//! union := term ('|' term)*
//! term  := 'any' | 'int' | 'float' | 'str' | 'bool' | 'none'
//!        | ('list' | 'dict' | 'iter' | 'optional') '[' union ']'
//!        | Name
//! ```
//!
//! A `Name` refers to an alias declared alongside the hints. An alias that
//! cannot be resolved is a decoration-time problem, not a call-time one.

use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::graph::Value;

/// Named hints, e.g. `Port: int`.
pub type Aliases = BTreeMap<String, Hint>;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Hint {
    Any,
    Int,
    Float,
    Str,
    Bool,
    None,
    List(Box<Hint>),
    Dict(Box<Hint>),
    Iter(Box<Hint>),
    Optional(Box<Hint>),
    Union(Vec<Hint>),
    Named(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot parse type hint '{input}': {reason}")]
pub struct HintParseError {
    pub input: String,
    pub reason: String,
}

impl Hint {
    /// Whether `value` satisfies this hint. Unknown names accept nothing.
    pub fn accepts(&self, value: &Value, aliases: &Aliases) -> bool {
        match self {
            Hint::Any => true,
            Hint::Int => value.is_i64() || value.is_u64(),
            Hint::Float => value.is_number(),
            Hint::Str => value.is_string(),
            Hint::Bool => value.is_boolean(),
            Hint::None => value.is_null(),
            Hint::List(item) | Hint::Iter(item) => value
                .as_array()
                .map_or(false, |items| items.iter().all(|v| item.accepts(v, aliases))),
            Hint::Dict(item) => value
                .as_object()
                .map_or(false, |map| map.values().all(|v| item.accepts(v, aliases))),
            Hint::Optional(inner) => value.is_null() || inner.accepts(value, aliases),
            Hint::Union(options) => options.iter().any(|h| h.accepts(value, aliases)),
            Hint::Named(name) => aliases
                .get(name)
                .map_or(false, |hint| hint.accepts(value, aliases)),
        }
    }

    /// Check that every name used by this hint resolves, and that no alias
    /// refers back to itself.
    pub fn resolve(&self, aliases: &Aliases) -> Result<(), String> {
        self.resolve_inner(aliases, &mut HashSet::new())
    }

    fn resolve_inner<'a>(
        &'a self,
        aliases: &'a Aliases,
        visiting: &mut HashSet<&'a str>,
    ) -> Result<(), String> {
        match self {
            Hint::List(inner) | Hint::Dict(inner) | Hint::Iter(inner) | Hint::Optional(inner) => {
                inner.resolve_inner(aliases, visiting)
            }
            Hint::Union(options) => options
                .iter()
                .try_for_each(|hint| hint.resolve_inner(aliases, visiting)),
            Hint::Named(name) => {
                let target = aliases
                    .get(name)
                    .ok_or_else(|| format!("type hint '{}' is unresolvable", name))?;
                if !visiting.insert(name.as_str()) {
                    return Err(format!("type alias '{}' refers to itself", name));
                }
                let result = target.resolve_inner(aliases, visiting);
                visiting.remove(name.as_str());
                result
            }
            _ => Ok(()),
        }
    }

    /// The item hint when this hint describes something a generator may
    /// produce; `None` when it cannot annotate a generator at all.
    pub fn item_hint(&self, aliases: &Aliases) -> Option<Hint> {
        match self {
            Hint::Any => Some(Hint::Any),
            Hint::Iter(item) | Hint::List(item) => Some((**item).clone()),
            Hint::Named(name) => aliases.get(name).and_then(|hint| hint.item_hint(aliases)),
            _ => None,
        }
    }
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hint::Any => write!(f, "any"),
            Hint::Int => write!(f, "int"),
            Hint::Float => write!(f, "float"),
            Hint::Str => write!(f, "str"),
            Hint::Bool => write!(f, "bool"),
            Hint::None => write!(f, "none"),
            Hint::List(inner) => write!(f, "list[{}]", inner),
            Hint::Dict(inner) => write!(f, "dict[{}]", inner),
            Hint::Iter(inner) => write!(f, "iter[{}]", inner),
            Hint::Optional(inner) => write!(f, "optional[{}]", inner),
            Hint::Union(options) => {
                for (i, option) in options.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{}", option)?;
                }
                Ok(())
            }
            Hint::Named(name) => write!(f, "{}", name),
        }
    }
}

impl FromStr for Hint {
    type Err = HintParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut parser = Parser {
            input,
            chars: input.char_indices().peekable(),
        };
        let hint = parser.union()?;
        parser.skip_whitespace();
        match parser.chars.peek() {
            None => Ok(hint),
            Some(&(_, c)) => Err(parser.error(format!("unexpected '{}'", c))),
        }
    }
}

impl TryFrom<String> for Hint {
    type Error = HintParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

struct Parser<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl Parser<'_> {
    fn union(&mut self) -> Result<Hint, HintParseError> {
        let mut options = vec![self.term()?];
        loop {
            self.skip_whitespace();
            if self.eat('|') {
                options.push(self.term()?);
            } else {
                break;
            }
        }
        Ok(if options.len() == 1 {
            options.remove(0)
        } else {
            Hint::Union(options)
        })
    }

    fn term(&mut self) -> Result<Hint, HintParseError> {
        self.skip_whitespace();
        let ident = self.ident()?;
        let wrap: Option<fn(Box<Hint>) -> Hint> = match ident.as_str() {
            "list" => Some(Hint::List),
            "dict" => Some(Hint::Dict),
            "iter" => Some(Hint::Iter),
            "optional" => Some(Hint::Optional),
            _ => None,
        };
        if let Some(wrap) = wrap {
            self.skip_whitespace();
            if !self.eat('[') {
                return Err(self.error(format!("'{}' needs an item hint", ident)));
            }
            let inner = self.union()?;
            self.skip_whitespace();
            if !self.eat(']') {
                return Err(self.error("missing ']'".to_string()));
            }
            return Ok(wrap(Box::new(inner)));
        }
        Ok(match ident.as_str() {
            "any" => Hint::Any,
            "int" => Hint::Int,
            "float" => Hint::Float,
            "str" => Hint::Str,
            "bool" => Hint::Bool,
            "none" | "None" => Hint::None,
            _ => Hint::Named(ident),
        })
    }

    fn ident(&mut self) -> Result<String, HintParseError> {
        let mut ident = String::new();
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                ident.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        if ident.is_empty() {
            return Err(self.error("expected a hint".to_string()));
        }
        Ok(ident)
    }

    fn eat(&mut self, expected: char) -> bool {
        if matches!(self.chars.peek(), Some(&(_, c)) if c == expected) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.chars.peek(), Some(&(_, c)) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn error(&self, reason: String) -> HintParseError {
        HintParseError {
            input: self.input.to_string(),
            reason,
        }
    }
}
