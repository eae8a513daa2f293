/// Moving files into category folders.
///
/// The [`Mover`] relocates one file into an existing destination folder, keeping
/// its file name. What happens when that name is already taken is decided by an
/// explicit [`ConflictPolicy`] instead of being left to the platform.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while preparing folders or moving files.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// Failed to create a category directory.
    #[error("Failed to create folder '{}': {source}", .path.display())]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The category name cannot be used as a single folder name.
    #[error("Failed to create folder '{}': invalid folder name '{name}'", .path.display())]
    InvalidFolderName { path: PathBuf, name: String },
    /// Failed to move a file to its category directory.
    #[error("Failed to move '{}' to '{}': {source}", .path.display(), .destination.display())]
    FileMoveFailure {
        path: PathBuf,
        destination: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The destination already holds a file of the same name.
    #[error("Failed to move '{}' to '{}': destination already exists", .path.display(), .destination.display())]
    DestinationExists { path: PathBuf, destination: PathBuf },
    /// The base directory path is invalid or doesn't exist.
    #[error("Invalid base path '{}': {source}", .path.display())]
    InvalidBasePath {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// What to do when the destination folder already contains a file with the same name.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Leave the source where it is and report an error.
    #[default]
    Fail,
    /// Replace the existing destination file.
    Overwrite,
    /// Append ` (1)`, ` (2)`, ... to the file stem until the name is free.
    Rename,
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictPolicy::Fail => write!(f, "fail"),
            ConflictPolicy::Overwrite => write!(f, "overwrite"),
            ConflictPolicy::Rename => write!(f, "rename"),
        }
    }
}

const MAX_RENAME_ATTEMPTS: u32 = 10_000;

/// Moves single files into destination folders.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mover {
    policy: ConflictPolicy,
}

impl Mover {
    pub fn new(policy: ConflictPolicy) -> Self {
        Self { policy }
    }

    /// Moves `file_path` into `destination_folder` and returns the new path.
    ///
    /// The destination folder must already exist. Files are renamed when both
    /// paths live on the same device and copied then removed otherwise.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use desktidy::file_mover::{ConflictPolicy, Mover};
    /// use std::path::Path;
    ///
    /// let mover = Mover::new(ConflictPolicy::Rename);
    /// match mover.move_into(Path::new("/tmp/desk/a.pdf"), Path::new("/tmp/desk/Documents")) {
    ///     Ok(new_path) => println!("now at {}", new_path.display()),
    ///     Err(e) => eprintln!("{}", e),
    /// }
    /// ```
    pub fn move_into(
        &self,
        file_path: &Path,
        destination_folder: &Path,
    ) -> OrganizeResult<PathBuf> {
        let file_name = file_path
            .file_name()
            .ok_or_else(|| OrganizeError::FileMoveFailure {
                path: file_path.to_path_buf(),
                destination: destination_folder.to_path_buf(),
                source: io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "file has no name component",
                ),
            })?;

        if !destination_folder.is_dir() {
            return Err(OrganizeError::FileMoveFailure {
                path: file_path.to_path_buf(),
                destination: destination_folder.to_path_buf(),
                source: io::Error::new(
                    io::ErrorKind::NotFound,
                    "destination folder does not exist",
                ),
            });
        }

        let candidate = destination_folder.join(file_name);
        let destination_path = if candidate.symlink_metadata().is_ok() {
            match self.policy {
                ConflictPolicy::Fail => {
                    return Err(OrganizeError::DestinationExists {
                        path: file_path.to_path_buf(),
                        destination: candidate,
                    });
                }
                ConflictPolicy::Overwrite => candidate,
                ConflictPolicy::Rename => find_free_name(file_path, &candidate)?,
            }
        } else {
            candidate
        };

        relocate(file_path, &destination_path).map_err(|e| OrganizeError::FileMoveFailure {
            path: file_path.to_path_buf(),
            destination: destination_path.clone(),
            source: e,
        })?;

        Ok(destination_path)
    }
}

/// Renames, falling back to copy + delete across devices.
fn relocate(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            copy_then_remove(from, to, |path| fs::remove_file(path))
        }
        Err(e) => Err(e),
    }
}

/// Copies `from` to `to`, then removes `from` with `remove_source`.
///
/// When the source cannot be removed the copy is deleted again, leaving a
/// single file in its original place.
fn copy_then_remove(
    from: &Path,
    to: &Path,
    remove_source: impl FnOnce(&Path) -> io::Result<()>,
) -> io::Result<()> {
    fs::copy(from, to)?;
    if let Err(e) = remove_source(from) {
        let _ = fs::remove_file(to);
        return Err(e);
    }
    Ok(())
}

/// Finds `stem (n).ext` next to `taken` that does not exist yet.
fn find_free_name(source: &Path, taken: &Path) -> OrganizeResult<PathBuf> {
    let parent = taken.parent().unwrap_or(Path::new("."));
    let name = taken
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (stem, ext) = split_name(&name);

    for i in 1..=MAX_RENAME_ATTEMPTS {
        let candidate = parent.join(format!("{} ({}){}", stem, i, ext));
        if candidate.symlink_metadata().is_err() {
            return Ok(candidate);
        }
    }

    Err(OrganizeError::DestinationExists {
        path: source.to_path_buf(),
        destination: taken.to_path_buf(),
    })
}

/// Splits a name into stem and extension (with dot), leading dots belonging to the stem.
fn split_name(name: &str) -> (&str, &str) {
    let lead = name.len() - name.trim_start_matches('.').len();
    match name[lead..].rfind('.') {
        Some(dot) => name.split_at(lead + dot),
        None => (name, ""),
    }
}
