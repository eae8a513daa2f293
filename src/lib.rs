//! desktidy - tidy a desktop into category folders
//!
//! This library scans the top level of a directory, classifies each file by its
//! extension through an ordered category map, moves it into the matching
//! category folder and records every action in an append-only activity log.

pub mod activity_log;
pub mod category_map;
pub mod cli;
pub mod config;
pub mod file_mover;
pub mod file_organizer;
pub mod filter;
pub mod output;

pub use activity_log::{ActivityLog, LogLevel};
pub use category_map::{CategoryMap, FALLBACK_CATEGORY};
pub use config::{ConfigError, OrganizerConfig};
pub use file_mover::{ConflictPolicy, Mover, OrganizeError};
pub use file_organizer::{FileOrganizer, OrganizeReport};
pub use filter::{CompiledExclusions, ExcludeRules};

pub use cli::{Cli, run_cli};
