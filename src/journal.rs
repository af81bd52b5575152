/// Undo journals for completed rename batches.
///
/// Every applied batch can be recorded as a [`Journal`]: the operation time and
/// the ordered `(original path, new path)` pairs of the renames that actually
/// happened. Journals live as individual files in a dedicated directory managed
/// by a [`JournalStore`], named `Undo_<yyyyMMdd_HHmmss>.undorename` so they sort
/// by creation time.
///
/// Replaying a journal moves each item back from its new path to its original
/// path. Items are handled independently: one that was moved again, deleted, or
/// whose original name has been reused is reported and skipped while the rest
/// are still restored. The journal file is removed only once every item in it
/// has been reversed.
use chrono::{DateTime, Local};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Extension of structured journal files.
pub const JOURNAL_EXTENSION: &str = "undorename";

/// Extension of the plain-text export format.
pub const LEGACY_EXTENSION: &str = "txt";

const LEGACY_HEADER_PREFIX: &str = "# Rename Undo File - Generated on: ";
const LEGACY_HEADER_HINT: &str =
    "# To use this file for manual undo, rename files back using the pairs listed below";

/// One reversible rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    /// Where the item lived before the batch.
    #[serde(alias = "OriginalPath")]
    pub original_path: PathBuf,
    /// Where the batch put it.
    #[serde(alias = "NewPath")]
    pub new_path: PathBuf,
}

/// The durable record of one rename batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Journal {
    /// When the batch was applied.
    #[serde(alias = "OperationTime")]
    pub operation_time: DateTime<Local>,
    /// Renames in the order they were performed.
    #[serde(alias = "Items", default)]
    pub items: Vec<JournalEntry>,
}

/// Metadata-only view of a journal file, used when listing.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JournalHeader {
    #[serde(alias = "OperationTime")]
    operation_time: DateTime<Local>,
    #[serde(alias = "Items", default)]
    items: Vec<IgnoredAny>,
}

impl Journal {
    /// Pairs up original and new paths.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::LengthMismatch`] if the two lists differ in length.
    pub fn from_pairs(
        original_paths: &[PathBuf],
        new_paths: &[PathBuf],
        operation_time: DateTime<Local>,
    ) -> JournalResult<Self> {
        if original_paths.len() != new_paths.len() {
            return Err(JournalError::LengthMismatch {
                originals: original_paths.len(),
                renamed: new_paths.len(),
            });
        }

        let items = original_paths
            .iter()
            .zip(new_paths)
            .map(|(original, new)| JournalEntry {
                original_path: original.clone(),
                new_path: new.clone(),
            })
            .collect();

        Ok(Self {
            operation_time,
            items,
        })
    }

    /// Base file name (without uniqueness suffix) for a journal created at `time`.
    pub fn file_stem_for(time: &DateTime<Local>) -> String {
        format!("Undo_{}", time.format("%Y%m%d_%H%M%S"))
    }

    /// Reads a journal, accepting both the structured and the plain-text format.
    ///
    /// Files with a `.txt` extension are parsed as plain text; anything else as JSON.
    pub fn read_from(path: &Path) -> JournalResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| JournalError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        let is_legacy = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(LEGACY_EXTENSION));

        if is_legacy {
            let fallback_time = file_time(path);
            Self::parse_legacy(&content, fallback_time).map_err(|reason| {
                JournalError::InvalidFormat {
                    path: path.to_path_buf(),
                    reason,
                }
            })
        } else {
            serde_json::from_str(&content).map_err(|e| JournalError::InvalidFormat {
                path: path.to_path_buf(),
                reason: format!("JSON parse error: {}", e),
            })
        }
    }

    /// Renders the plain-text export: a `#` header, a blank line, then one
    /// `newPath|originalPath` line per item.
    pub fn to_legacy_text(&self) -> String {
        let mut text = format!(
            "{}{}\n{}\n\n",
            LEGACY_HEADER_PREFIX,
            self.operation_time.to_rfc3339(),
            LEGACY_HEADER_HINT
        );
        for item in &self.items {
            text.push_str(&format!(
                "{}|{}\n",
                item.new_path.display(),
                item.original_path.display()
            ));
        }
        text
    }

    /// Parses the plain-text export.
    ///
    /// The header time is used when present and well-formed, otherwise
    /// `fallback_time`.
    pub fn parse_legacy(text: &str, fallback_time: DateTime<Local>) -> Result<Self, String> {
        let mut operation_time = fallback_time;
        let mut items = Vec::new();

        for (number, line) in text.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.starts_with('#') {
                if let Some(stamp) = line.strip_prefix(LEGACY_HEADER_PREFIX)
                    && let Ok(parsed) = DateTime::parse_from_rfc3339(stamp.trim())
                {
                    operation_time = parsed.with_timezone(&Local);
                }
                continue;
            }
            if line.trim().is_empty() {
                continue;
            }

            let (new_path, original_path) = split_pair(line).map_err(|reason| {
                format!("line {} {}", number + 1, reason)
            })?;
            items.push(JournalEntry {
                original_path: PathBuf::from(original_path),
                new_path: PathBuf::from(new_path),
            });
        }

        Ok(Self {
            operation_time,
            items,
        })
    }
}

/// Splits a `newPath|originalPath` line.
///
/// Paths may themselves contain `|`, so the separator is the one whose two
/// sides live in the same directory. A line with no such separator, or more
/// than one, is rejected.
fn split_pair(line: &str) -> Result<(&str, &str), &'static str> {
    let mut candidates = line
        .match_indices('|')
        .map(|(at, _)| (&line[..at], &line[at + 1..]))
        .filter(|(new, original)| {
            !new.is_empty()
                && !original.is_empty()
                && Path::new(new).parent() == Path::new(original).parent()
        });

    match (candidates.next(), candidates.next()) {
        (Some(pair), None) => Ok(pair),
        (None, _) => Err("is not a 'newPath|originalPath' pair"),
        (Some(_), Some(_)) => {
            Err("is ambiguous: more than one '|' separates paths in the same directory")
        }
    }
}

/// Listing entry for one stored journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalSummary {
    pub storage_path: PathBuf,
    pub operation_time: DateTime<Local>,
    /// Number of recorded renames; zero when the file could not be parsed.
    pub entry_count: usize,
    pub display_label: String,
}

/// An item that could not be reversed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoFailure {
    pub entry: JournalEntry,
    pub reason: String,
}

/// Result of replaying a journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoOutcome {
    /// True when at least one item was restored.
    pub success: bool,
    /// Summary such as `"Undone 3 of 4 items"`, or why nothing was attempted.
    pub message: String,
    /// Items that could not be reversed, in journal order.
    pub failed_items: Vec<UndoFailure>,
    /// Number of items moved back.
    pub restored: usize,
    /// Whether the journal file was removed afterwards.
    pub journal_removed: bool,
}

impl UndoOutcome {
    fn not_attempted(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            failed_items: Vec::new(),
            restored: 0,
            journal_removed: false,
        }
    }
}

/// Errors raised while writing or reading journal files.
#[derive(Debug)]
pub enum JournalError {
    /// Original and new path lists have different lengths.
    LengthMismatch { originals: usize, renamed: usize },
    /// The journal directory could not be created.
    StorageCreationFailed { path: PathBuf, source: io::Error },
    /// A journal file could not be written.
    WriteFailed { path: PathBuf, source: io::Error },
    /// A journal file could not be read.
    ReadFailed { path: PathBuf, source: io::Error },
    /// A journal file's contents are malformed.
    InvalidFormat { path: PathBuf, reason: String },
}

impl std::fmt::Display for JournalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LengthMismatch { originals, renamed } => write!(
                f,
                "Original paths and new paths must have the same count ({} vs {})",
                originals, renamed
            ),
            Self::StorageCreationFailed { path, source } => write!(
                f,
                "Failed to create undo directory {}: {}",
                path.display(),
                source
            ),
            Self::WriteFailed { path, source } => {
                write!(f, "Failed to write undo file {}: {}", path.display(), source)
            }
            Self::ReadFailed { path, source } => {
                write!(f, "Failed to read undo file {}: {}", path.display(), source)
            }
            Self::InvalidFormat { path, reason } => {
                write!(f, "Invalid undo file {}: {}", path.display(), reason)
            }
        }
    }
}

impl std::error::Error for JournalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::StorageCreationFailed { source, .. }
            | Self::WriteFailed { source, .. }
            | Self::ReadFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type for journal operations.
pub type JournalResult<T> = Result<T, JournalError>;

/// A directory holding journal files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalStore {
    directory: PathBuf,
}

impl JournalStore {
    /// Uses `directory` for storage; it is created on first write.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// `<local data dir>/batchname/UndoFiles`.
    pub fn default_directory() -> PathBuf {
        dirs::data_local_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("share")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("batchname")
            .join("UndoFiles")
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Records a completed batch and returns the journal's path.
    ///
    /// `operation_time` defaults to now.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use batchname::journal::JournalStore;
    /// use std::path::PathBuf;
    ///
    /// let store = JournalStore::new(JournalStore::default_directory());
    /// let path = store
    ///     .create_undo_file(
    ///         &[PathBuf::from("/photos/a.jpg")],
    ///         &[PathBuf::from("/photos/001.jpg")],
    ///         None,
    ///     )
    ///     .expect("journal should be written");
    /// println!("Undo with: batchname undo {}", path.display());
    /// ```
    pub fn create_undo_file(
        &self,
        original_paths: &[PathBuf],
        new_paths: &[PathBuf],
        operation_time: Option<DateTime<Local>>,
    ) -> JournalResult<PathBuf> {
        let journal = Journal::from_pairs(
            original_paths,
            new_paths,
            operation_time.unwrap_or_else(Local::now),
        )?;
        self.save(&journal)
    }

    /// Persists `journal` under a fresh name derived from its operation time.
    pub fn save(&self, journal: &Journal) -> JournalResult<PathBuf> {
        fs::create_dir_all(&self.directory).map_err(|e| JournalError::StorageCreationFailed {
            path: self.directory.clone(),
            source: e,
        })?;

        let stem = Journal::file_stem_for(&journal.operation_time);
        let mut attempt = 0u32;
        let (path, file) = loop {
            let name = if attempt == 0 {
                format!("{}.{}", stem, JOURNAL_EXTENSION)
            } else {
                format!("{}_{}.{}", stem, attempt, JOURNAL_EXTENSION)
            };
            let path = self.directory.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => break (path, file),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(JournalError::WriteFailed { path, source: e }),
            }
        };

        let mut writer = BufWriter::new(file);
        let written = serde_json::to_writer_pretty(&mut writer, journal)
            .map_err(io::Error::from)
            .and_then(|()| writer.flush());
        drop(writer);

        if let Err(e) = written {
            let _ = fs::remove_file(&path);
            return Err(JournalError::WriteFailed { path, source: e });
        }

        Ok(path)
    }

    /// Lists stored journals, most recent first.
    ///
    /// Files that cannot be parsed are still listed, with their filesystem
    /// creation time and an entry count of zero.
    pub fn available_undo_files(&self) -> Vec<JournalSummary> {
        let Ok(entries) = fs::read_dir(&self.directory) else {
            return Vec::new();
        };

        let mut summaries: Vec<JournalSummary> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .is_some_and(|ext| ext == JOURNAL_EXTENSION)
            })
            .map(summarize)
            .collect();

        summaries.sort_by(|a, b| {
            b.operation_time
                .cmp(&a.operation_time)
                .then_with(|| b.storage_path.cmp(&a.storage_path))
        });
        summaries
    }

    /// Reverses the most recent journal, if any.
    pub fn undo_latest(&self) -> Option<UndoOutcome> {
        self.available_undo_files()
            .first()
            .map(|summary| process_undo_file(&summary.storage_path))
    }
}

fn summarize(path: PathBuf) -> JournalSummary {
    let header = fs::read_to_string(&path)
        .ok()
        .and_then(|content| serde_json::from_str::<JournalHeader>(&content).ok());

    match header {
        Some(header) => {
            let count = header.items.len();
            let noun = if count == 1 { "file" } else { "files" };
            JournalSummary {
                display_label: format!(
                    "Rename operation from {} ({} {})",
                    header.operation_time.format("%Y-%m-%d %H:%M"),
                    count,
                    noun
                ),
                storage_path: path,
                operation_time: header.operation_time,
                entry_count: count,
            }
        }
        None => {
            let created = file_time(&path);
            JournalSummary {
                display_label: format!(
                    "Rename operation from {}",
                    created.format("%Y-%m-%d %H:%M")
                ),
                storage_path: path,
                operation_time: created,
                entry_count: 0,
            }
        }
    }
}

/// Creation time of a file, falling back to its modification time, then the epoch.
fn file_time(path: &Path) -> DateTime<Local> {
    let time = fs::metadata(path)
        .and_then(|m| m.created().or_else(|_| m.modified()))
        .unwrap_or(SystemTime::UNIX_EPOCH);
    DateTime::<Local>::from(time)
}

/// Reverses the journal stored at `path`.
///
/// Nothing is moved if the file is missing, unreadable or empty. Otherwise
/// every item is attempted in stored order, and the journal is deleted only if
/// all of them were restored.
pub fn process_undo_file(path: &Path) -> UndoOutcome {
    if !path.is_file() {
        return UndoOutcome::not_attempted("Undo file not found");
    }

    let journal = match Journal::read_from(path) {
        Ok(journal) => journal,
        Err(e) => return UndoOutcome::not_attempted(format!("Error processing undo file: {}", e)),
    };

    if journal.items.is_empty() {
        return UndoOutcome::not_attempted("Invalid or empty undo file");
    }

    let mut failed_items = Vec::new();
    let mut restored = 0;
    for entry in &journal.items {
        match restore_entry(entry) {
            Ok(()) => restored += 1,
            Err(reason) => failed_items.push(UndoFailure {
                entry: entry.clone(),
                reason,
            }),
        }
    }

    let journal_removed = failed_items.is_empty() && fs::remove_file(path).is_ok();

    UndoOutcome {
        success: restored > 0,
        message: format!("Undone {} of {} items", restored, journal.items.len()),
        failed_items,
        restored,
        journal_removed,
    }
}

fn restore_entry(entry: &JournalEntry) -> Result<(), String> {
    if fs::symlink_metadata(&entry.new_path).is_err() {
        return Err("The renamed file/folder no longer exists".to_string());
    }

    if fs::symlink_metadata(&entry.original_path).is_ok() {
        return Err("The original path is already occupied by another file/folder".to_string());
    }

    fs::rename(&entry.new_path, &entry.original_path).map_err(|e| format!("Error: {}", e))
}

/// Writes `journal` in the plain-text format to `path`.
pub fn export_legacy(path: &Path, journal: &Journal) -> JournalResult<()> {
    fs::write(path, journal.to_legacy_text()).map_err(|e| JournalError::WriteFailed {
        path: path.to_path_buf(),
        source: e,
    })
}
