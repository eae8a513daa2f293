//! Optional TOML configuration.
//!
//! Every key is optional; an empty file behaves exactly like no file at all.
//!
//! ```toml
//! replace_default_categories = false
//! on_conflict = "rename"
//! log_file = "desktidy.log"
//!
//! [categories]
//! Ebooks = [".epub", "mobi"]
//! Images = [".webp"]
//!
//! [exclude]
//! filenames = ["desktop.ini"]
//! patterns = ["~$*"]
//! ```
//!
//! Categories keep the order in which they appear in the file, which matters
//! when two categories claim the same extension.

use crate::activity_log::DEFAULT_LOG_FILE;
use crate::category_map::CategoryMap;
use crate::file_mover::ConflictPolicy;
use crate::filter::{CompiledExclusions, ExcludeRules};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_FILE: &str = ".desktidyrc.toml";

/// Errors that can occur during configuration loading and compilation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    #[error("Invalid configuration in {}: {source}", .path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// IO error while reading configuration.
    #[error("IO error reading configuration {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Invalid glob pattern in the exclusion rules.
    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidGlobPattern { pattern: String, reason: String },
    /// Invalid regex pattern in the exclusion rules.
    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidRegexPattern { pattern: String, reason: String },
}

/// Organizer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizerConfig {
    /// Use only the categories of this file instead of extending the built-in ones.
    #[serde(default)]
    pub replace_default_categories: bool,

    /// Additional categories, in priority order.
    #[serde(default)]
    pub categories: IndexMap<String, Vec<String>>,

    /// Collision policy for the mover.
    #[serde(default)]
    pub on_conflict: ConflictPolicy,

    /// Log file name, created inside the organized directory.
    #[serde(default = "default_log_file")]
    pub log_file: String,

    #[serde(default)]
    pub exclude: ExcludeRules,
}

fn default_log_file() -> String {
    DEFAULT_LOG_FILE.to_string()
}

impl Default for OrganizerConfig {
    fn default() -> Self {
        Self {
            replace_default_categories: false,
            categories: IndexMap::new(),
            on_conflict: ConflictPolicy::default(),
            log_file: default_log_file(),
            exclude: ExcludeRules::default(),
        }
    }
}

impl OrganizerConfig {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.desktidyrc.toml` in the current directory
    /// 3. Look for `desktidy/config.toml` in the user's configuration directory
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly provided file is missing, or if any
    /// file found cannot be read or parsed.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.is_file() {
            return Self::load_from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("desktidy").join("config.toml");
            if user_config.is_file() {
                return Self::load_from_file(&user_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Invalid {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Category map for this configuration.
    ///
    /// Built-in and supplemental categories come first, followed by the
    /// configured ones, unless `replace_default_categories` is set. The
    /// fallback category is always present.
    pub fn category_map(&self) -> CategoryMap {
        let configured = CategoryMap::from(self.categories.clone());
        if self.replace_default_categories {
            return CategoryMap::resolve(Some(configured));
        }

        let mut map = CategoryMap::default_with_supplemental();
        map.extend(configured);
        CategoryMap::resolve(Some(map))
    }

    /// Compiles the exclusion rules. The log file is always excluded.
    ///
    /// Only the last component of `log_file` is matched, so `./tidy.log` or an
    /// absolute path inside the organized directory still protects the log.
    pub fn exclusions(&self) -> Result<CompiledExclusions, ConfigError> {
        let log_name = Path::new(&self.log_file)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.log_file.clone());
        self.exclude.compile(&[log_name.as_str()])
    }
}
