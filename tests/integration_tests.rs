use desktidy::cli::{Cli, RunOutcome, run_cli};
use desktidy::file_mover::ConflictPolicy;
/// Integration tests for desktidy
///
/// These tests run the complete command against throwaway directories and
/// check where files end up and what the activity log says.
///
/// Test categories:
/// 1. Basic organization workflows
/// 2. Category map behavior
/// 3. Exclusions
/// 4. Collision policies
/// 5. Dry-run mode
/// 6. Failures and edge cases
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

/// A temporary "desktop" plus a separate directory holding the config file,
/// so that no configuration from the machine running the tests leaks in.
struct TestFixture {
    temp_dir: TempDir,
    config_dir: TempDir,
}

impl TestFixture {
    fn new() -> Self {
        let fixture = TestFixture {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
            config_dir: TempDir::new().expect("Failed to create config directory"),
        };
        fixture.write_config("");
        fixture
    }

    fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    fn config_path(&self) -> PathBuf {
        self.config_dir.path().join("config.toml")
    }

    fn write_config(&self, content: &str) {
        fs::write(self.config_path(), content).expect("Failed to write config");
    }

    fn create_file(&self, name: &str, content: &str) {
        fs::write(self.path().join(name), content).expect("Failed to create file");
    }

    fn create_files(&self, names: &[&str]) {
        for name in names {
            self.create_file(name, name);
        }
    }

    fn create_subdir(&self, name: &str) {
        fs::create_dir(self.path().join(name)).expect("Failed to create subdirectory");
    }

    fn cli(&self) -> Cli {
        Cli {
            directory: Some(self.path().to_path_buf()),
            config: Some(self.config_path()),
            dry_run: false,
            on_conflict: None,
        }
    }

    fn run(&self) -> RunOutcome {
        run_cli(&self.cli()).expect("Run should succeed")
    }

    fn run_with(&self, cli: Cli) -> RunOutcome {
        run_cli(&cli).expect("Run should succeed")
    }

    fn assert_dir_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(path.is_dir(), "Directory should exist: {}", path.display());
    }

    fn assert_file_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(path.is_file(), "File should exist: {}", path.display());
    }

    fn assert_file_not_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(!path.exists(), "File should not exist: {}", path.display());
    }

    fn read(&self, rel_path: &str) -> String {
        fs::read_to_string(self.path().join(rel_path)).expect("Failed to read file")
    }

    fn log(&self) -> String {
        self.read("desktidy.log")
    }

    /// Every path under the root, relative and sorted, the log file excluded.
    fn snapshot(&self) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        Self::walk(self.path(), self.path(), &mut paths);
        paths.retain(|p| p != Path::new("desktidy.log"));
        paths.sort();
        paths
    }

    fn walk(root: &Path, dir: &Path, paths: &mut Vec<PathBuf>) {
        for entry in fs::read_dir(dir).expect("Failed to read directory").flatten() {
            let path = entry.path();
            paths.push(path.strip_prefix(root).unwrap().to_path_buf());
            if path.is_dir() {
                Self::walk(root, &path, paths);
            }
        }
    }
}

fn report_of(outcome: RunOutcome) -> desktidy::OrganizeReport {
    match outcome {
        RunOutcome::Organized(Some(report)) => report,
        other => panic!("Expected a finished organization run, got {:?}", other),
    }
}

// ============================================================================
// Test Suite 1: Basic Organization
// ============================================================================

#[test]
fn test_organize_desktop_scenario() {
    let fixture = TestFixture::new();
    fixture.create_files(&["report.pdf", "photo.jpg", "song.mp3", "archive.zip", "notes"]);

    let report = report_of(fixture.run());

    assert!(report.is_complete_success());
    fixture.assert_file_exists("Documents/report.pdf");
    fixture.assert_file_exists("Images/photo.jpg");
    fixture.assert_file_exists("Music/song.mp3");
    fixture.assert_file_exists("Compressed/archive.zip");
    fixture.assert_file_exists("Others/notes");
    for name in ["report.pdf", "photo.jpg", "song.mp3", "archive.zip", "notes"] {
        fixture.assert_file_not_exists(name);
    }
    assert_eq!(fixture.read("Documents/report.pdf"), "report.pdf");
}

#[test]
fn test_organize_empty_directory_creates_all_folders() {
    let fixture = TestFixture::new();

    let report = report_of(fixture.run());

    assert!(report.moved.is_empty());
    for folder in [
        "Documents",
        "Images",
        "Videos",
        "Music",
        "Others",
        "Programming",
        "Spreadsheets",
        "Compressed",
    ] {
        fixture.assert_dir_exists(folder);
    }
    assert_eq!(fixture.log().matches("Created folder").count(), 8);
}

#[test]
fn test_log_records_moves() {
    let fixture = TestFixture::new();
    fixture.create_file("song.mp3", "");

    fixture.run();

    let log = fixture.log();
    let expected = format!(
        " - INFO - Moved '{}' to '{}'",
        fixture.path().join("song.mp3").display(),
        fixture.path().join("Music").display()
    );
    assert!(log.contains(&expected), "log was:\n{}", log);
}

#[test]
fn test_extension_case_is_ignored() {
    let fixture = TestFixture::new();
    fixture.create_files(&["SCAN.PDF", "Clip.Mp4"]);

    fixture.run();

    fixture.assert_file_exists("Documents/SCAN.PDF");
    fixture.assert_file_exists("Videos/Clip.Mp4");
}

#[test]
fn test_second_run_changes_nothing() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a.txt", "b.png", "c.py", "d.unknown"]);

    fixture.run();
    let after_first = fixture.snapshot();
    let report = report_of(fixture.run());

    assert!(report.moved.is_empty());
    assert_eq!(fixture.snapshot(), after_first);
}

#[test]
fn test_log_is_appended_across_runs() {
    let fixture = TestFixture::new();
    fixture.create_file("a.txt", "");
    fixture.run();
    let first = fixture.log();

    fixture.create_file("b.txt", "");
    fixture.run();
    let second = fixture.log();

    assert!(second.starts_with(&first));
    assert!(second.len() > first.len());
    fixture.assert_file_exists("desktidy.log");
}

#[test]
fn test_existing_folders_are_left_untouched() {
    let fixture = TestFixture::new();
    fixture.create_subdir("Documents");
    fixture.create_file("Documents/old.txt", "old");
    fixture.create_file("new.txt", "new");

    fixture.run();

    assert_eq!(fixture.read("Documents/old.txt"), "old");
    fixture.assert_file_exists("Documents/new.txt");
    let created_documents = format!(
        "Created folder '{}'",
        fixture.path().join("Documents").display()
    );
    assert!(!fixture.log().contains(&created_documents));
}

#[test]
fn test_subdirectories_are_not_traversed() {
    let fixture = TestFixture::new();
    fixture.create_subdir("Projects");
    fixture.create_file("Projects/inner.pdf", "");
    fixture.create_subdir("holiday.jpg");

    fixture.run();

    fixture.assert_file_exists("Projects/inner.pdf");
    fixture.assert_dir_exists("holiday.jpg");
    fixture.assert_file_not_exists("Documents/inner.pdf");
}

#[cfg(unix)]
#[test]
fn test_symlinks_follow_their_target_kind() {
    let fixture = TestFixture::new();
    let outside = TempDir::new().expect("Failed to create temp directory");
    fs::write(outside.path().join("target.pdf"), "pdf").unwrap();
    std::os::unix::fs::symlink(outside.path(), fixture.path().join("linked_dir")).unwrap();
    std::os::unix::fs::symlink(
        outside.path().join("target.pdf"),
        fixture.path().join("linked.pdf"),
    )
    .unwrap();

    fixture.run();

    assert!(fixture.path().join("linked_dir").exists());
    assert!(
        fixture
            .path()
            .join("Documents/linked.pdf")
            .symlink_metadata()
            .is_ok()
    );
    assert!(outside.path().join("target.pdf").exists());
}

// ============================================================================
// Test Suite 2: Category Map Behavior
// ============================================================================

#[test]
fn test_unmatched_files_go_to_others_even_without_others_category() {
    let fixture = TestFixture::new();
    fixture.write_config(
        r#"
        replace_default_categories = true

        [categories]
        Docs = [".pdf"]
        "#,
    );
    fixture.create_files(&["a.pdf", "b.mp3", "c"]);

    fixture.run();

    fixture.assert_file_exists("Docs/a.pdf");
    fixture.assert_file_exists("Others/b.mp3");
    fixture.assert_file_exists("Others/c");
    fixture.assert_file_not_exists("Music");
}

#[test]
fn test_duplicate_extension_first_category_wins() {
    let fixture = TestFixture::new();
    fixture.write_config(
        r#"
        replace_default_categories = true

        [categories]
        Reports = [".csv"]
        Spreadsheets = [".csv", ".xlsx"]
        "#,
    );
    fixture.create_files(&["data.csv", "book.xlsx"]);

    let report = report_of(fixture.run());

    assert!(report.failed_moves.is_empty());
    fixture.assert_file_exists("Reports/data.csv");
    fixture.assert_file_exists("Spreadsheets/book.xlsx");
}

#[test]
fn test_builtin_category_wins_over_configured_duplicate() {
    let fixture = TestFixture::new();
    fixture.write_config(
        r#"
        [categories]
        Data = [".csv", ".json"]
        "#,
    );
    fixture.create_files(&["table.csv", "dump.json"]);

    fixture.run();

    fixture.assert_file_exists("Spreadsheets/table.csv");
    fixture.assert_file_exists("Data/dump.json");
}

// ============================================================================
// Test Suite 3: Exclusions
// ============================================================================

#[test]
fn test_own_files_are_never_moved() {
    let fixture = TestFixture::new();
    fixture.create_files(&["desktidy", "desktidy.exe", ".desktidyrc.toml", "x.txt"]);
    fixture.create_file("desktidy.log", "previous run\n");

    let report = report_of(fixture.run());

    fixture.assert_file_exists("desktidy");
    fixture.assert_file_exists("desktidy.exe");
    fixture.assert_file_exists(".desktidyrc.toml");
    fixture.assert_file_exists("desktidy.log");
    fixture.assert_file_exists("Documents/x.txt");
    assert_eq!(report.excluded, 4);
    assert!(fixture.log().starts_with("previous run\n"));
}

#[test]
fn test_custom_log_file_is_excluded() {
    let fixture = TestFixture::new();
    fixture.write_config("log_file = \"tidy.txt\"\n");
    fixture.create_file("keep.txt", "");

    fixture.run();

    fixture.assert_file_exists("tidy.txt");
    fixture.assert_file_exists("Documents/keep.txt");
    assert!(fixture.read("tidy.txt").contains(" - INFO - "));
}

#[test]
fn test_log_file_with_directory_part_stays_in_place() {
    let fixture = TestFixture::new();
    fixture.write_config("log_file = \"./tidy.log\"\n");
    fixture.create_file("a.pdf", "");

    fixture.run();

    fixture.assert_file_exists("tidy.log");
    fixture.assert_file_not_exists("Others/tidy.log");
    fixture.assert_file_exists("Documents/a.pdf");
    assert!(fixture.read("tidy.log").contains(" - INFO - Moved '"));
}

#[test]
fn test_absolute_log_file_inside_root_stays_in_place() {
    let fixture = TestFixture::new();
    let log_path = fixture.path().join("tidy.log");
    fixture.write_config(&format!("log_file = {:?}\n", log_path.to_string_lossy()));
    fixture.create_file("a.pdf", "");

    fixture.run();

    fixture.assert_file_exists("tidy.log");
    fixture.assert_file_not_exists("Others/tidy.log");
    fixture.assert_file_exists("Documents/a.pdf");
}

#[test]
fn test_configured_filenames_keep_self_exclusion() {
    let fixture = TestFixture::new();
    fixture.write_config(
        r#"
        [exclude]
        filenames = ["desktop.ini"]
        "#,
    );
    fixture.create_files(&["desktop.ini", "desktidy", "desktidy.exe", "x.txt"]);

    let report = report_of(fixture.run());

    fixture.assert_file_exists("desktop.ini");
    fixture.assert_file_exists("desktidy");
    fixture.assert_file_exists("desktidy.exe");
    fixture.assert_file_exists("Documents/x.txt");
    assert_eq!(report.excluded, 3);
}

#[test]
fn test_configured_exclusions() {
    let fixture = TestFixture::new();
    fixture.write_config(
        r#"
        [exclude]
        include_hidden_files = false
        extensions = ["tmp"]
        patterns = ["~$*"]
        regex = ['^keep_']
        "#,
    );
    fixture.create_files(&[
        "download.tmp",
        "~$draft.docx",
        "keep_me.pdf",
        ".hidden",
        "move_me.pdf",
    ]);

    let report = report_of(fixture.run());

    for name in ["download.tmp", "~$draft.docx", "keep_me.pdf", ".hidden"] {
        fixture.assert_file_exists(name);
    }
    fixture.assert_file_exists("Documents/move_me.pdf");
    assert_eq!(report.moved.len(), 1);
}

#[test]
fn test_hidden_files_are_organized_by_default() {
    let fixture = TestFixture::new();
    fixture.create_files(&[".DS_Store", ".notes.txt"]);

    fixture.run();

    fixture.assert_file_exists("Others/.DS_Store");
    fixture.assert_file_exists("Documents/.notes.txt");
}

// ============================================================================
// Test Suite 4: Collision Policies
// ============================================================================

fn prepare_collision(fixture: &TestFixture) {
    fixture.create_subdir("Documents");
    fixture.create_file("Documents/a.txt", "old");
    fixture.create_file("a.txt", "new");
}

#[test]
fn test_collision_fails_by_default() {
    let fixture = TestFixture::new();
    prepare_collision(&fixture);

    let report = report_of(fixture.run());

    assert_eq!(report.failed_moves.len(), 1);
    assert_eq!(fixture.read("a.txt"), "new");
    assert_eq!(fixture.read("Documents/a.txt"), "old");
    assert!(fixture.log().contains("destination already exists"));
    assert!(fixture.log().contains(" - ERROR - Failed to move '"));
}

#[test]
fn test_collision_overwrite_from_config() {
    let fixture = TestFixture::new();
    fixture.write_config("on_conflict = \"overwrite\"\n");
    prepare_collision(&fixture);

    let report = report_of(fixture.run());

    assert!(report.is_complete_success());
    fixture.assert_file_not_exists("a.txt");
    assert_eq!(fixture.read("Documents/a.txt"), "new");
}

#[test]
fn test_collision_rename_from_flag_overrides_config() {
    let fixture = TestFixture::new();
    fixture.write_config("on_conflict = \"overwrite\"\n");
    prepare_collision(&fixture);

    let cli = Cli {
        on_conflict: Some(ConflictPolicy::Rename),
        ..fixture.cli()
    };
    fixture.run_with(cli);

    assert_eq!(fixture.read("Documents/a.txt"), "old");
    assert_eq!(fixture.read("Documents/a (1).txt"), "new");
}

// ============================================================================
// Test Suite 5: Dry Run
// ============================================================================

#[test]
fn test_dry_run_modifies_nothing() {
    let fixture = TestFixture::new();
    fixture.create_files(&["report.pdf", "photo.jpg", "notes"]);
    let before = fixture.snapshot();

    let cli = Cli {
        dry_run: true,
        ..fixture.cli()
    };
    let outcome = fixture.run_with(cli);

    assert!(matches!(outcome, RunOutcome::Previewed(3)));
    assert_eq!(fixture.snapshot(), before);
    fixture.assert_file_not_exists("desktidy.log");
    fixture.assert_file_not_exists("Documents");
}

#[test]
fn test_dry_run_on_missing_directory_fails() {
    let fixture = TestFixture::new();
    let cli = Cli {
        directory: Some(fixture.path().join("missing")),
        dry_run: true,
        ..fixture.cli()
    };

    assert!(run_cli(&cli).is_err());
}

// ============================================================================
// Test Suite 6: Failures and Edge Cases
// ============================================================================

#[test]
fn test_folder_creation_failure_is_isolated() {
    let fixture = TestFixture::new();
    fixture.write_config(
        r#"
        replace_default_categories = true

        [categories]
        Docs = [".pdf"]
        "bad/name" = [".jpg"]
        "#,
    );
    fixture.create_files(&["report.pdf", "photo.jpg"]);

    let report = report_of(fixture.run());

    assert_eq!(report.failed_folders.len(), 1);
    assert_eq!(report.failed_moves.len(), 1);
    fixture.assert_file_exists("Docs/report.pdf");
    fixture.assert_file_exists("photo.jpg");
    fixture.assert_file_not_exists("bad");

    let log = fixture.log();
    assert!(log.contains(" - ERROR - Failed to create folder '"));
    assert!(log.contains(&format!(
        " - ERROR - Failed to move '{}'",
        fixture.path().join("photo.jpg").display()
    )));
}

#[test]
fn test_folder_blocked_by_file_is_isolated() {
    let fixture = TestFixture::new();
    fixture.create_file("Music", "not a folder");
    fixture.create_files(&["song.mp3", "report.pdf"]);

    let report = report_of(fixture.run());

    assert_eq!(report.failed_folders.len(), 1);
    assert_eq!(report.failed_folders[0].0, fixture.path().join("Music"));
    fixture.assert_file_exists("song.mp3");
    fixture.assert_file_exists("Documents/report.pdf");
    // The blocking file has no extension, so it is organized like any other.
    fixture.assert_file_exists("Others/Music");

    let log = fixture.log();
    assert!(log.contains(&format!(
        " - ERROR - Failed to create folder '{}'",
        fixture.path().join("Music").display()
    )));
    assert!(log.contains(&format!(
        " - ERROR - Failed to move '{}'",
        fixture.path().join("song.mp3").display()
    )));
}

#[test]
fn test_organize_error_after_log_open_is_logged() {
    let fixture = TestFixture::new();
    let logs = TempDir::new().expect("Failed to create temp directory");
    let log_path = logs.path().join("outside.log");
    fixture.write_config(&format!("log_file = {:?}\n", log_path.to_string_lossy()));

    let cli = Cli {
        directory: Some(fixture.path().join("vanished")),
        ..fixture.cli()
    };
    let outcome = run_cli(&cli).expect("Run should still succeed");

    assert!(matches!(outcome, RunOutcome::Organized(None)));
    let log = fs::read_to_string(&log_path).expect("Failed to read log");
    assert!(log.contains(" - ERROR - An error occurred: Invalid base path"));
}

#[test]
fn test_missing_directory_without_log_location_fails() {
    let fixture = TestFixture::new();
    let cli = Cli {
        directory: Some(fixture.path().join("missing")),
        ..fixture.cli()
    };

    assert!(run_cli(&cli).is_err());
}

#[test]
fn test_invalid_config_fails_before_touching_files() {
    let fixture = TestFixture::new();
    fixture.write_config("[exclude]\npatterns = [\"[broken\"]\n");
    fixture.create_file("a.txt", "");

    assert!(run_cli(&fixture.cli()).is_err());
    fixture.assert_file_exists("a.txt");
    fixture.assert_file_not_exists("Documents");
}
