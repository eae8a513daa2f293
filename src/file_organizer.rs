/// Scanning a directory and dispatching its files into category folders.
///
/// A run has three steps:
/// 1. every category folder is created under the root if missing,
/// 2. the root is listed once and each regular, non-excluded file is classified,
/// 3. each file is handed to the [`Mover`] with its destination folder.
///
/// Individual failures (a folder that cannot be created, a file that cannot be
/// moved, an entry that vanished mid-scan) are written to the activity log and
/// never stop the run.
use crate::activity_log::ActivityLog;
use crate::category_map::{CategoryMap, extension_of};
use crate::file_mover::{Mover, OrganizeError, OrganizeResult};
use crate::filter::CompiledExclusions;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// A classified file waiting to be moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMove {
    /// The file name inside the root.
    pub name: String,
    /// The full path to the file.
    pub path: PathBuf,
    /// Lowercase extension with its dot, empty when there is none.
    pub extension: String,
    /// The destination category folder name.
    pub category: String,
}

/// Result of listing and classifying a directory.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub planned: Vec<PlannedMove>,
    /// Entries whose metadata could not be read.
    pub unreadable: Vec<(PathBuf, String)>,
    /// Number of files skipped by the exclusion rules.
    pub excluded: usize,
}

/// A file that was moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub original_path: PathBuf,
    pub new_path: PathBuf,
    pub category: String,
}

/// Summary of an organization run.
#[derive(Debug, Default)]
pub struct OrganizeReport {
    pub moved: Vec<MoveRecord>,
    pub failed_moves: Vec<(PathBuf, String)>,
    pub failed_folders: Vec<(PathBuf, String)>,
    pub unreadable: Vec<(PathBuf, String)>,
    pub excluded: usize,
}

impl OrganizeReport {
    /// Returns true if nothing went wrong.
    pub fn is_complete_success(&self) -> bool {
        self.failed_moves.is_empty() && self.failed_folders.is_empty() && self.unreadable.is_empty()
    }

    /// Number of moved files per category, sorted by category name.
    pub fn moved_per_category(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.moved {
            *counts.entry(record.category.clone()).or_insert(0) += 1;
        }
        counts
    }
}

/// Creates `root/<name>` for every category name that lacks a folder.
///
/// Returns the folders that could not be created. Each outcome is logged;
/// folders that already exist are left alone without a log entry.
pub fn ensure_category_folders<'a>(
    root: &Path,
    names: impl IntoIterator<Item = &'a str>,
    log: &mut ActivityLog,
) -> Vec<(PathBuf, String)> {
    let mut failures = Vec::new();

    for name in names {
        let folder_path = root.join(name);
        match ensure_folder(&folder_path, name) {
            Ok(true) => log.info(format!("Created folder '{}'", folder_path.display())),
            Ok(false) => {}
            Err(e) => {
                log.error(e.to_string());
                failures.push((folder_path, e.to_string()));
            }
        }
    }

    failures
}

/// Returns `Ok(true)` when the folder had to be created.
fn ensure_folder(folder_path: &Path, name: &str) -> OrganizeResult<bool> {
    if !is_single_folder_name(name) {
        return Err(OrganizeError::InvalidFolderName {
            path: folder_path.to_path_buf(),
            name: name.to_string(),
        });
    }

    if folder_path.is_dir() {
        return Ok(false);
    }

    fs::create_dir_all(folder_path).map_err(|source| OrganizeError::DirectoryCreationFailed {
        path: folder_path.to_path_buf(),
        source,
    })?;
    Ok(true)
}

/// A category name must map to exactly one plain path component.
fn is_single_folder_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(part)), None) if part == name
    )
}

/// Classifies the top level of a directory and moves files into category folders.
pub struct FileOrganizer {
    categories: CategoryMap,
    exclusions: CompiledExclusions,
    mover: Mover,
}

impl FileOrganizer {
    /// The fallback category is added to `categories` when missing.
    pub fn new(categories: CategoryMap, exclusions: CompiledExclusions, mover: Mover) -> Self {
        Self {
            categories: CategoryMap::resolve(Some(categories)),
            exclusions,
            mover,
        }
    }

    /// Lists `root` once and classifies every regular, non-excluded file.
    ///
    /// Nothing on disk is modified. Entries are processed in file name order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBasePath` when `root` is not a readable directory.
    pub fn plan(&self, root: &Path) -> OrganizeResult<ScanOutcome> {
        let entries = read_snapshot(root)?;
        let mut outcome = ScanOutcome::default();

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err((path, reason)) => {
                    outcome.unreadable.push((path, reason));
                    continue;
                }
            };

            let path = entry.path();
            // Follows symlinks, so a link to a directory is skipped like the directory.
            match fs::metadata(&path) {
                Ok(metadata) if metadata.is_file() => {}
                Ok(_) => continue,
                Err(e) => {
                    outcome.unreadable.push((path, e.to_string()));
                    continue;
                }
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            if self.exclusions.is_excluded(&name) {
                outcome.excluded += 1;
                continue;
            }

            let extension = extension_of(&name);
            let category = self.categories.classify(&name).to_string();
            outcome.planned.push(PlannedMove {
                name,
                path,
                extension,
                category,
            });
        }

        Ok(outcome)
    }

    /// Organizes the top level of `root`, logging every action.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBasePath` when `root` is not a readable directory.
    /// All other failures are logged and collected in the report.
    pub fn organize(&self, root: &Path, log: &mut ActivityLog) -> OrganizeResult<OrganizeReport> {
        validate_root(root)?;

        let mut report = OrganizeReport {
            failed_folders: ensure_category_folders(root, self.categories.names(), log),
            ..Default::default()
        };

        let outcome = self.plan(root)?;
        report.excluded = outcome.excluded;
        for (path, reason) in outcome.unreadable {
            log.error(format!(
                "Failed to read entry '{}': {}",
                path.display(),
                reason
            ));
            report.unreadable.push((path, reason));
        }

        for planned in outcome.planned {
            let destination_folder = root.join(&planned.category);
            match self.mover.move_into(&planned.path, &destination_folder) {
                Ok(new_path) => {
                    log.info(format!(
                        "Moved '{}' to '{}'",
                        planned.path.display(),
                        destination_folder.display()
                    ));
                    report.moved.push(MoveRecord {
                        original_path: planned.path,
                        new_path,
                        category: planned.category,
                    });
                }
                Err(e) => {
                    log.error(e.to_string());
                    report.failed_moves.push((planned.path, e.to_string()));
                }
            }
        }

        Ok(report)
    }
}

fn validate_root(root: &Path) -> OrganizeResult<()> {
    match fs::metadata(root) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(OrganizeError::InvalidBasePath {
            path: root.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
        }),
        Err(source) => Err(OrganizeError::InvalidBasePath {
            path: root.to_path_buf(),
            source,
        }),
    }
}

type SnapshotEntry = Result<fs::DirEntry, (PathBuf, String)>;

/// Reads the whole listing up front, sorted by file name.
fn read_snapshot(root: &Path) -> OrganizeResult<Vec<SnapshotEntry>> {
    let entries = fs::read_dir(root).map_err(|source| OrganizeError::InvalidBasePath {
        path: root.to_path_buf(),
        source,
    })?;

    let mut snapshot: Vec<SnapshotEntry> = entries
        .map(|entry| entry.map_err(|e| (root.to_path_buf(), e.to_string())))
        .collect();
    snapshot.sort_by_key(|entry| match entry {
        Ok(entry) => Some(entry.file_name()),
        Err(_) => None,
    });
    Ok(snapshot)
}
