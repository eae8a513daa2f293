//! Command-line interface module for desktidy.
//!
//! With no arguments the desktop of the current user is organized with the
//! built-in and supplemental categories. Everything else is optional:
//!
//! ```text
//! desktidy [DIRECTORY] [--config PATH] [--dry-run] [--on-conflict fail|overwrite|rename]
//! ```

use crate::activity_log::ActivityLog;
use crate::config::OrganizerConfig;
use crate::file_mover::{ConflictPolicy, Mover};
use crate::file_organizer::{FileOrganizer, OrganizeReport};
use crate::output::OutputFormatter;
use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Line printed once a run has finished, whatever happened to individual files.
pub const CONFIRMATION: &str = "Your desktop has been tidied up!";

/// Folder under the home directory organized by default.
pub const DESKTOP_FOLDER: &str = "Desktop";

/// Tidy a directory by moving its files into category folders.
#[derive(Debug, Clone, Parser)]
#[command(name = "desktidy", version, about)]
pub struct Cli {
    /// Directory to organize (defaults to ~/Desktop)
    pub directory: Option<PathBuf>,

    /// Configuration file (defaults to ./.desktidyrc.toml, then the user config directory)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Show what would be moved without touching anything
    #[arg(long)]
    pub dry_run: bool,

    /// What to do when a file with the same name already exists in the destination
    #[arg(long, value_enum, value_name = "POLICY")]
    pub on_conflict: Option<ConflictPolicy>,
}

/// Outcome of [`run_cli`].
#[derive(Debug)]
pub enum RunOutcome {
    /// Files were organized. `None` when the run stopped early; the cause is in the log.
    Organized(Option<OrganizeReport>),
    /// Dry run: number of files that would have been moved.
    Previewed(usize),
}

/// `<home>/Desktop`.
pub fn default_desktop() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(DESKTOP_FOLDER))
        .ok_or_else(|| anyhow!("Home directory not found"))
}

/// Runs the CLI application.
///
/// Errors are returned only for problems that occur before the activity log is
/// open. Anything failing afterwards is logged and the run still counts as done.
pub fn run_cli(cli: &Cli) -> Result<RunOutcome> {
    let root = match &cli.directory {
        Some(dir) => dir.clone(),
        None => default_desktop()?,
    };

    let config = OrganizerConfig::load(cli.config.as_deref())
        .context("Error loading configuration")?;
    let policy = cli.on_conflict.unwrap_or(config.on_conflict);
    let exclusions = config
        .exclusions()
        .context("Error compiling exclusion rules")?;
    let organizer = FileOrganizer::new(config.category_map(), exclusions, Mover::new(policy));

    if cli.dry_run {
        return preview(&organizer, &root).map(RunOutcome::Previewed);
    }

    let mut log = ActivityLog::open(&root.join(&config.log_file))?;
    let report = match organizer.organize(&root, &mut log) {
        Ok(report) => Some(report),
        Err(e) => {
            log.error(format!("An error occurred: {}", e));
            None
        }
    };

    OutputFormatter::success(CONFIRMATION);
    Ok(RunOutcome::Organized(report))
}

fn preview(organizer: &FileOrganizer, root: &Path) -> Result<usize> {
    let outcome = organizer
        .plan(root)
        .with_context(|| format!("Error reading directory {}", root.display()))?;

    OutputFormatter::dry_run_notice(&format!("Analyzing contents of: {}", root.display()));
    if outcome.planned.is_empty() {
        OutputFormatter::dry_run_notice("No files found to organize.");
        return Ok(0);
    }

    OutputFormatter::planned_moves(&outcome.planned);
    for (path, reason) in &outcome.unreadable {
        OutputFormatter::warning(&format!("Cannot read {}: {}", path.display(), reason));
    }

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for plan in &outcome.planned {
        *counts.entry(plan.category.clone()).or_insert(0) += 1;
    }
    OutputFormatter::summary_table(&counts);
    OutputFormatter::dry_run_notice("No files were modified.");

    Ok(outcome.planned.len())
}
