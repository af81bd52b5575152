use batchname::cli::{PatternArgs, RenameCommand, run_cli};
use batchname::config::{AppConfig, JournalSettings};
use batchname::journal::{Journal, JournalStore, process_undo_file};
use batchname::pattern::{PatternSpec, SequencePosition, validate_pattern};
use batchname::renamer::rename_files;
use batchname::{Batch, PreviewItem};
/// Integration tests for batchname
///
/// These tests simulate real-world usage scenarios, testing the complete
/// end-to-end flow from pattern to preview, rename, journal and undo.
///
/// Test categories:
/// 1. Preview workflows
/// 2. Rename and undo round trips
/// 3. Conflicts and partial failures
/// 4. Journal history and plain-text exports
/// 5. Configuration presets
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

/// A temporary working directory plus a private journal directory.
struct TestFixture {
    temp_dir: TempDir,
    journal_dir: TempDir,
}

impl TestFixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let journal_dir = TempDir::new().expect("Failed to create journal directory");
        TestFixture {
            temp_dir,
            journal_dir,
        }
    }

    fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    fn config(&self) -> AppConfig {
        AppConfig {
            journal: JournalSettings {
                directory: Some(self.journal_dir.path().to_path_buf()),
                create_by_default: true,
            },
            patterns: Vec::new(),
        }
    }

    fn store(&self) -> JournalStore {
        self.config().journal_store()
    }

    /// Create a file whose content is its own name, so moves can be traced.
    fn create_file(&self, name: &str) -> PathBuf {
        let file_path = self.path().join(name);
        let mut file = File::create(&file_path).expect("Failed to create file");
        file.write_all(name.as_bytes())
            .expect("Failed to write file content");
        file_path
    }

    fn create_files(&self, names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|name| self.create_file(name)).collect()
    }

    fn dir_arg(&self) -> Vec<String> {
        vec![self.path().to_string_lossy().into_owned()]
    }

    fn assert_file_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(
            path.exists() && path.is_file(),
            "File should exist: {}",
            path.display()
        );
    }

    fn assert_file_not_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(!path.exists(), "File should not exist: {}", path.display());
    }

    fn assert_content(&self, rel_path: &str, expected: &str) {
        let content =
            fs::read_to_string(self.path().join(rel_path)).expect("Failed to read file content");
        assert_eq!(content, expected, "Unexpected content in {}", rel_path);
    }

    fn sorted_names(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.path())
            .expect("Failed to read directory")
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

fn prefix_args(prefix: &str) -> PatternArgs {
    PatternArgs {
        prefix: Some(prefix.to_string()),
        ..Default::default()
    }
}

// ============================================================================
// Test Suite 1: Preview
// ============================================================================

#[test]
fn test_preview_does_not_touch_files() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a.txt", "b.txt"]);

    let result = run_cli(
        RenameCommand::Preview {
            paths: fixture.dir_arg(),
            dirs_as_entries: false,
            pattern: prefix_args("new_"),
        },
        &fixture.config(),
    );

    assert!(result.is_ok());
    assert_eq!(fixture.sorted_names(), vec!["a.txt", "b.txt"]);
    assert!(fixture.store().available_undo_files().is_empty());
}

#[test]
fn test_preview_rejects_invalid_regex() {
    let fixture = TestFixture::new();
    fixture.create_file("a.txt");

    let result = run_cli(
        RenameCommand::Preview {
            paths: fixture.dir_arg(),
            dirs_as_entries: false,
            pattern: PatternArgs {
                find: Some("[abc".to_string()),
                regex: true,
                ..Default::default()
            },
        },
        &fixture.config(),
    );

    let err = result.expect_err("invalid regex should be rejected");
    assert!(err.contains("Invalid regular expression"));
}

// ============================================================================
// Test Suite 2: Rename and undo round trips
// ============================================================================

#[test]
fn test_rename_then_undo_restores_everything() {
    let fixture = TestFixture::new();
    fixture.create_files(&["beach.jpg", "forest.jpg", "notes.txt"]);

    run_cli(
        RenameCommand::Rename {
            paths: fixture.dir_arg(),
            dirs_as_entries: false,
            pattern: PatternArgs {
                seq_format: Some("000".to_string()),
                seq_position: Some(SequencePosition::Prefix),
                ..Default::default()
            },
            journal: false,
            no_journal: false,
            export_legacy: None,
        },
        &fixture.config(),
    )
    .expect("rename should succeed");

    // Directory contents are taken in name order
    fixture.assert_file_exists("001beach.jpg");
    fixture.assert_file_exists("002forest.jpg");
    fixture.assert_file_exists("003notes.txt");
    fixture.assert_content("002forest.jpg", "forest.jpg");

    let history = fixture.store().available_undo_files();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].entry_count, 3);

    run_cli(RenameCommand::Undo { journal: None }, &fixture.config())
        .expect("undo should succeed");

    assert_eq!(
        fixture.sorted_names(),
        vec!["beach.jpg", "forest.jpg", "notes.txt"]
    );
    fixture.assert_content("forest.jpg", "forest.jpg");
    assert!(fixture.store().available_undo_files().is_empty());
}

#[test]
fn test_no_journal_flag_skips_journal() {
    let fixture = TestFixture::new();
    fixture.create_file("a.txt");

    run_cli(
        RenameCommand::Rename {
            paths: fixture.dir_arg(),
            dirs_as_entries: false,
            pattern: prefix_args("x_"),
            journal: false,
            no_journal: true,
            export_legacy: None,
        },
        &fixture.config(),
    )
    .expect("rename should succeed");

    fixture.assert_file_exists("x_a.txt");
    assert!(fixture.store().available_undo_files().is_empty());
}

#[test]
fn test_journal_flag_overrides_disabled_default() {
    let fixture = TestFixture::new();
    fixture.create_file("a.txt");
    let mut config = fixture.config();
    config.journal.create_by_default = false;

    run_cli(
        RenameCommand::Rename {
            paths: fixture.dir_arg(),
            dirs_as_entries: false,
            pattern: prefix_args("x_"),
            journal: true,
            no_journal: false,
            export_legacy: None,
        },
        &config,
    )
    .expect("rename should succeed");

    assert_eq!(fixture.store().available_undo_files().len(), 1);
}

#[test]
fn test_undo_without_journals_is_an_error() {
    let fixture = TestFixture::new();
    let result = run_cli(RenameCommand::Undo { journal: None }, &fixture.config());
    assert!(result.is_err());
}

#[test]
fn test_library_flow_matches_cli_flow() {
    let fixture = TestFixture::new();
    let paths = fixture.create_files(&["IMG 1.jpg", "IMG 2.jpg"]);

    let pattern = PatternSpec {
        find_text: " ".to_string(),
        replace_text: "_".to_string(),
        ..Default::default()
    };
    assert!(validate_pattern(Some(&pattern)).is_valid);

    let mut batch = Batch::new();
    assert_eq!(batch.add_paths(&paths), 2);
    let preview = batch.preview(&pattern);
    let actionable: Vec<PreviewItem> = preview
        .into_iter()
        .filter(PreviewItem::is_actionable)
        .collect();

    let outcomes = rename_files(&actionable);
    assert!(outcomes.iter().all(|o| o.success));
    assert_eq!(batch.record_outcomes(&outcomes), 2);

    let originals: Vec<PathBuf> = outcomes.iter().map(|o| o.original_path.clone()).collect();
    let renamed: Vec<PathBuf> = outcomes.iter().map(|o| o.new_path.clone()).collect();
    let journal = fixture
        .store()
        .create_undo_file(&originals, &renamed, None)
        .expect("journal should be written");

    fixture.assert_file_exists("IMG_1.jpg");
    fixture.assert_file_exists("IMG_2.jpg");

    let outcome = process_undo_file(&journal);
    assert!(outcome.success);
    assert!(outcome.journal_removed);
    assert_eq!(outcome.message, "Undone 2 of 2 items");
    fixture.assert_file_exists("IMG 1.jpg");
    fixture.assert_file_exists("IMG 2.jpg");
}

// ============================================================================
// Test Suite 3: Conflicts and partial failures
// ============================================================================

#[test]
fn test_conflicting_entries_are_not_renamed() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a-1.txt", "a_1.txt", "b.txt"]);

    run_cli(
        RenameCommand::Rename {
            paths: fixture.dir_arg(),
            dirs_as_entries: false,
            pattern: PatternArgs {
                find: Some("[-_]".to_string()),
                replace: Some("".to_string()),
                regex: true,
                ..Default::default()
            },
            journal: false,
            no_journal: false,
            export_legacy: None,
        },
        &fixture.config(),
    )
    .expect("rename should complete");

    // Both would become a1.txt, so neither moves; b.txt is unaffected
    fixture.assert_file_exists("a-1.txt");
    fixture.assert_file_exists("a_1.txt");
    fixture.assert_file_not_exists("a1.txt");
    fixture.assert_file_exists("b.txt");
    assert!(fixture.store().available_undo_files().is_empty());
}

#[test]
fn test_existing_destination_fails_only_that_entry() {
    let fixture = TestFixture::new();
    let sources = fixture.create_files(&["a.txt", "b.txt"]);
    fixture.create_file("x_b.txt");

    let args: Vec<String> = sources
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    run_cli(
        RenameCommand::Rename {
            paths: args,
            dirs_as_entries: false,
            pattern: prefix_args("x_"),
            journal: false,
            no_journal: false,
            export_legacy: None,
        },
        &fixture.config(),
    )
    .expect("rename should complete");

    fixture.assert_file_exists("x_a.txt");
    fixture.assert_file_exists("b.txt");
    fixture.assert_content("x_b.txt", "x_b.txt");

    // Only the successful rename is journaled
    let history = fixture.store().available_undo_files();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].entry_count, 1);
}

#[test]
fn test_partial_undo_keeps_journal() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a.txt", "b.txt"]);

    run_cli(
        RenameCommand::Rename {
            paths: fixture.dir_arg(),
            dirs_as_entries: false,
            pattern: prefix_args("x_"),
            journal: false,
            no_journal: false,
            export_legacy: None,
        },
        &fixture.config(),
    )
    .expect("rename should succeed");

    // Someone takes the old name of one file before the undo
    fixture.create_file("b.txt");

    let history = fixture.store().available_undo_files();
    let outcome = process_undo_file(&history[0].storage_path);

    assert!(outcome.success);
    assert_eq!(outcome.restored, 1);
    assert_eq!(outcome.failed_items.len(), 1);
    assert!(!outcome.journal_removed);
    fixture.assert_file_exists("a.txt");
    fixture.assert_file_exists("x_b.txt");
    assert!(history[0].storage_path.exists());
}

// ============================================================================
// Test Suite 4: History and plain-text exports
// ============================================================================

#[test]
fn test_history_lists_most_recent_first() {
    let fixture = TestFixture::new();
    fixture.create_file("a.txt");

    for prefix in ["1_", "2_"] {
        run_cli(
            RenameCommand::Rename {
                paths: fixture.dir_arg(),
                dirs_as_entries: false,
                pattern: prefix_args(prefix),
                journal: false,
                no_journal: false,
                export_legacy: None,
            },
            &fixture.config(),
        )
        .expect("rename should succeed");
    }
    fixture.assert_file_exists("2_1_a.txt");

    let history = fixture.store().available_undo_files();
    assert_eq!(history.len(), 2);
    assert!(history[0].operation_time >= history[1].operation_time);
    assert!(history[0].display_label.starts_with("Rename operation from "));
    assert!(run_cli(RenameCommand::History, &fixture.config()).is_ok());

    // Undoing the latest reverses only the second batch
    run_cli(RenameCommand::Undo { journal: None }, &fixture.config())
        .expect("undo should succeed");
    fixture.assert_file_exists("1_a.txt");
    assert_eq!(fixture.store().available_undo_files().len(), 1);
}

#[test]
fn test_legacy_export_can_be_replayed() {
    let fixture = TestFixture::new();
    fixture.create_file("report.txt");
    let export_dir = TempDir::new().expect("Failed to create export directory");
    let export_path = export_dir.path().join("renames.txt");

    run_cli(
        RenameCommand::Rename {
            paths: fixture.dir_arg(),
            dirs_as_entries: false,
            pattern: PatternArgs {
                suffix: Some("_final".to_string()),
                ..Default::default()
            },
            journal: false,
            no_journal: true,
            export_legacy: Some(export_path.clone()),
        },
        &fixture.config(),
    )
    .expect("rename should succeed");

    fixture.assert_file_exists("report_final.txt");
    let text = fs::read_to_string(&export_path).expect("export should be written");
    let pair_line = text
        .lines()
        .find(|line| !line.starts_with('#') && !line.trim().is_empty())
        .expect("export contains a rename");
    assert!(pair_line.contains("report_final.txt|"));

    let journal = Journal::read_from(&export_path).expect("export parses");
    assert_eq!(journal.items.len(), 1);

    run_cli(
        RenameCommand::Undo {
            journal: Some(export_path.clone()),
        },
        &fixture.config(),
    )
    .expect("undo from export should succeed");
    fixture.assert_file_exists("report.txt");
    assert!(!export_path.exists());
}

// ============================================================================
// Test Suite 5: Configuration presets
// ============================================================================

#[test]
fn test_preset_from_config_file() {
    let fixture = TestFixture::new();
    fixture.create_files(&["b.png", "a.png"]);

    let config_path = fixture.journal_dir.path().join("config.toml");
    fs::write(
        &config_path,
        format!(
            r#"
[journal]
directory = "{}"

[[patterns]]
name = "numbered"
prefix = "shot_"
use_sequence = true
sequence_format = "00"
sequence_position = "suffix"
"#,
            fixture.journal_dir.path().display().to_string().replace('\\', "/")
        ),
    )
    .expect("Failed to write config");
    let config = AppConfig::load(Some(&config_path)).expect("config loads");

    run_cli(
        RenameCommand::Rename {
            paths: fixture.dir_arg(),
            dirs_as_entries: false,
            pattern: PatternArgs {
                preset: Some("numbered".to_string()),
                seq_start: Some(10),
                ..Default::default()
            },
            journal: false,
            no_journal: false,
            export_legacy: None,
        },
        &config,
    )
    .expect("rename should succeed");

    assert_eq!(fixture.sorted_names(), vec!["shot_a10.png", "shot_b11.png"]);
    fixture.assert_content("shot_a10.png", "a.png");
    assert_eq!(config.journal_store().available_undo_files().len(), 1);
}

#[test]
fn test_unknown_preset_is_reported() {
    let fixture = TestFixture::new();
    fixture.create_file("a.txt");

    let result = run_cli(
        RenameCommand::Rename {
            paths: fixture.dir_arg(),
            dirs_as_entries: false,
            pattern: PatternArgs {
                preset: Some("missing".to_string()),
                ..Default::default()
            },
            journal: false,
            no_journal: false,
            export_legacy: None,
        },
        &fixture.config(),
    );

    assert!(result.expect_err("unknown preset").contains("missing"));
    fixture.assert_file_exists("a.txt");
}

// ============================================================================
// Test Suite 6: Unusual entries
// ============================================================================

#[test]
fn test_directories_as_entries_round_trip() {
    let fixture = TestFixture::new();
    let album = fixture.path().join("album");
    fs::create_dir(&album).expect("Failed to create directory");
    fs::write(album.join("inside.jpg"), "x").expect("Failed to write file");

    run_cli(
        RenameCommand::Rename {
            paths: vec![album.to_string_lossy().into_owned()],
            dirs_as_entries: true,
            pattern: prefix_args("2024_"),
            journal: false,
            no_journal: false,
            export_legacy: None,
        },
        &fixture.config(),
    )
    .expect("rename should succeed");

    assert!(fixture.path().join("2024_album").is_dir());
    fixture.assert_file_exists("2024_album/inside.jpg");

    run_cli(RenameCommand::Undo { journal: None }, &fixture.config())
        .expect("undo should succeed");
    assert!(album.is_dir());
    fixture.assert_file_exists("album/inside.jpg");
}

#[cfg(unix)]
#[test]
fn test_non_utf8_names_are_left_alone() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let fixture = TestFixture::new();
    let odd = fixture.path().join(OsStr::from_bytes(b"caf\xe9.txt"));
    fs::write(&odd, "odd").expect("Failed to write file");
    fixture.create_file("plain.txt");

    run_cli(
        RenameCommand::Rename {
            paths: fixture.dir_arg(),
            dirs_as_entries: false,
            pattern: prefix_args("x_"),
            journal: false,
            no_journal: false,
            export_legacy: None,
        },
        &fixture.config(),
    )
    .expect("rename should succeed");

    assert!(odd.exists(), "non UTF-8 file must keep its exact name");
    fixture.assert_file_exists("x_plain.txt");

    // The batch that did run is fully journaled
    let history = fixture.store().available_undo_files();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].entry_count, 1);
}
