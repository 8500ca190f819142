// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::config::consts::PATCHING_NODE;
use crate::engine::{Aggregation, PropagationScope};
use crate::errors::ConfigError;

/// Checking options for one run.
///
/// Loaded from the `[fixtureguard]` table of a TOML file; every field defaults to
/// off, so an empty file (or no file) disables checking entirely.
///
/// # Example
/// ```toml
/// [fixtureguard]
/// check_fixtures = true
/// check_sites = false
/// scope = "closure"
/// aggregation = "first_only"
/// exempt = ["tmp_path"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Wrap fixtures with the decoration capability and propagate their failures
    pub check_fixtures: bool,
    /// Also decorate the consumption sites themselves
    pub check_sites: bool,
    /// Decorate generator fixtures too instead of passing them through
    pub check_generators: bool,
    pub scope: PropagationScope,
    pub aggregation: Aggregation,
    /// Fixtures never wrapped, in addition to the built-in patching fixture
    pub exempt: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OptionsFile {
    #[serde(default)]
    fixtureguard: Options,
}

/// Values taken from the command line, merged over a loaded [`Options`].
#[derive(Debug, Clone, Default)]
pub struct OptionOverrides {
    pub check_fixtures: bool,
    pub check_sites: bool,
    pub check_generators: bool,
    pub closure_scope: bool,
    pub first_failure_only: bool,
    /// Comma-separated fixture names, possibly quoted
    pub exempt: Option<String>,
}

impl Options {
    /// Options with fixture checking switched on and everything else at defaults.
    pub fn enabled() -> Self {
        Self {
            check_fixtures: true,
            ..Self::default()
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: OptionsFile = toml::from_str(content)?;
        Ok(file.fixtureguard)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// A switch is on if either the file or the command line turns it on; lists
    /// are the file's entries followed by the command line's.
    pub fn merge(self, overrides: &OptionOverrides) -> Self {
        Self {
            check_fixtures: merge_bool_option(self.check_fixtures, overrides.check_fixtures),
            check_sites: merge_bool_option(self.check_sites, overrides.check_sites),
            check_generators: merge_bool_option(self.check_generators, overrides.check_generators),
            scope: if overrides.closure_scope {
                PropagationScope::Closure
            } else {
                self.scope
            },
            aggregation: if overrides.first_failure_only {
                Aggregation::FirstOnly
            } else {
                self.aggregation
            },
            exempt: merge_list_option(self.exempt, overrides.exempt.as_deref()),
        }
    }

    pub fn is_exempt(&self, name: &str) -> bool {
        name == PATCHING_NODE || self.exempt.iter().any(|exempt| exempt == name)
    }
}

pub fn merge_bool_option(from_file: bool, from_cli: bool) -> bool {
    from_file || from_cli
}

/// Extend `from_file` with the comma-delimited entries of `from_cli`, after
/// stripping one layer of surrounding quotes (`--exempt="a,b"`).
pub fn merge_list_option(mut from_file: Vec<String>, from_cli: Option<&str>) -> Vec<String> {
    if let Some(raw) = from_cli {
        let stripped = raw.trim_matches('"').trim_matches('\'');
        from_file.extend(
            stripped
                .split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(str::to_string),
        );
    }
    from_file
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_file_disables_everything() {
        let options = Options::from_toml_str("").unwrap();
        assert_eq!(options, Options::default());
        assert!(!options.check_fixtures);
    }

    #[test]
    fn test_table_is_read() {
        let options = Options::from_toml_str(
            r#"
            [fixtureguard]
            check_fixtures = true
            scope = "closure"
            aggregation = "first_only"
            exempt = ["tmp_path"]
            "#,
        )
        .unwrap();
        assert!(options.check_fixtures);
        assert_eq!(options.scope, PropagationScope::Closure);
        assert_eq!(options.aggregation, Aggregation::FirstOnly);
        assert!(options.is_exempt("tmp_path"));
        assert!(options.is_exempt("monkeypatch"));
        assert!(!options.is_exempt("good_fixture"));
    }

    #[test]
    fn test_unknown_scope_is_rejected() {
        let err = Options::from_toml_str("[fixtureguard]\nscope = \"sideways\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[fixtureguard]\ncheck_sites = true").unwrap();
        let options = Options::load(file.path()).unwrap();
        assert!(options.check_sites);
        assert!(Options::load("/definitely/not/here.toml").is_err());
    }

    #[test]
    fn test_command_line_extends_file() {
        let file = Options {
            exempt: vec!["tmp_path".to_string()],
            ..Options::default()
        };
        let merged = file.merge(&OptionOverrides {
            check_fixtures: true,
            first_failure_only: true,
            exempt: Some("\"capsys, caplog\"".to_string()),
            ..OptionOverrides::default()
        });
        assert!(merged.check_fixtures);
        assert_eq!(merged.aggregation, Aggregation::FirstOnly);
        assert_eq!(merged.scope, PropagationScope::Direct);
        assert_eq!(merged.exempt, vec!["tmp_path", "capsys", "caplog"]);
    }

    #[test]
    fn test_merge_list_option_without_cli_value() {
        assert_eq!(merge_list_option(vec!["a".to_string()], None), vec!["a"]);
        assert_eq!(merge_list_option(Vec::new(), Some("''")), Vec::<String>::new());
    }

    #[test]
    fn test_merge_bool_option_is_either() {
        assert!(merge_bool_option(true, false));
        assert!(merge_bool_option(false, true));
        assert!(!merge_bool_option(false, false));
    }
}
