//! Exclusion rules deciding which top-level files are never touched.
//!
//! Rules are declared in the `[exclude]` table of the configuration file:
//!
//! ```toml
//! [exclude]
//! include_hidden_files = true
//! filenames = ["desktop.ini"]
//! extensions = ["tmp", "part"]
//! patterns = ["~$*"]
//! regex = ['^\d{8}_backup']
//! ```
//!
//! Every rule is matched against the bare file name, since only direct children
//! of the organized directory are ever considered.
//!
//! `filenames` adds to [`DEFAULT_EXCLUDED_FILENAMES`]; the tool's own files are
//! skipped whatever the configuration lists.

use crate::config::ConfigError;
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// File names that are always skipped: the tool itself and its local config.
pub const DEFAULT_EXCLUDED_FILENAMES: &[&str] =
    &["desktidy", "desktidy.exe", ".desktidyrc.toml"];

/// Declarative exclusion rules, as read from the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Whether files starting with "." are organized. Defaults to true.
    #[serde(default = "default_include_hidden_files")]
    pub include_hidden_files: bool,

    /// Exact file names to leave in place, on top of the defaults.
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Extensions to leave in place, with or without the leading dot.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Glob patterns matched against the file name.
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Regular expressions matched against the file name.
    #[serde(default)]
    pub regex: Vec<String>,
}

fn default_include_hidden_files() -> bool {
    true
}

impl Default for ExcludeRules {
    fn default() -> Self {
        Self {
            include_hidden_files: default_include_hidden_files(),
            filenames: Vec::new(),
            extensions: Vec::new(),
            patterns: Vec::new(),
            regex: Vec::new(),
        }
    }
}

impl ExcludeRules {
    /// Compiles the rules.
    ///
    /// The default names and `always_excluded` are merged with the configured ones.
    ///
    /// # Errors
    ///
    /// Returns an error if any glob or regex pattern is invalid.
    pub fn compile(&self, always_excluded: &[&str]) -> Result<CompiledExclusions, ConfigError> {
        let patterns = self
            .patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|e| ConfigError::InvalidGlobPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let regexes = self
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut filenames: HashSet<String> = self.filenames.iter().cloned().collect();
        filenames.extend(
            DEFAULT_EXCLUDED_FILENAMES
                .iter()
                .chain(always_excluded)
                .map(|name| name.to_string()),
        );

        Ok(CompiledExclusions {
            include_hidden_files: self.include_hidden_files,
            filenames,
            extensions: self
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            patterns,
            regexes,
        })
    }
}

/// Pre-compiled exclusion rules.
#[derive(Debug, Clone)]
pub struct CompiledExclusions {
    include_hidden_files: bool,
    filenames: HashSet<String>,
    extensions: HashSet<String>,
    patterns: Vec<Pattern>,
    regexes: Vec<Regex>,
}

impl CompiledExclusions {
    /// Exclusions containing only the given file names.
    pub fn from_filenames(names: &[&str]) -> Self {
        Self {
            include_hidden_files: true,
            filenames: names.iter().map(|name| name.to_string()).collect(),
            extensions: HashSet::new(),
            patterns: Vec::new(),
            regexes: Vec::new(),
        }
    }

    /// Returns true if the file must be left where it is.
    pub fn is_excluded(&self, file_name: &str) -> bool {
        if !self.include_hidden_files && file_name.starts_with('.') {
            return true;
        }

        if self.filenames.contains(file_name) {
            return true;
        }

        if let Some((stem, ext)) = file_name.rsplit_once('.')
            && !stem.is_empty()
            && self.extensions.contains(&ext.to_lowercase())
        {
            return true;
        }

        self.patterns.iter().any(|p| p.matches(file_name))
            || self.regexes.iter().any(|r| r.is_match(file_name))
    }
}

impl Default for CompiledExclusions {
    fn default() -> Self {
        Self::from_filenames(DEFAULT_EXCLUDED_FILENAMES)
    }
}
