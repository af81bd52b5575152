//! batchname - batch file renaming with previews and undo
//!
//! This library builds new file names from a declarative pattern (prefix,
//! suffix, find/replace, sequence numbers), previews the result for a whole
//! batch with duplicate detection, performs the renames one file at a time and
//! records each batch in an undo journal that can be replayed later.

pub mod batch;
pub mod cli;
pub mod config;
pub mod conflict;
pub mod file_entry;
pub mod journal;
pub mod output;
pub mod pattern;
pub mod renamer;
pub mod transform;

pub use batch::{Batch, BatchEvent};
pub use config::{AppConfig, ConfigError};
pub use conflict::{PreviewItem, detect_conflicts};
pub use file_entry::FileEntry;
pub use journal::{JournalError, JournalStore, JournalSummary, UndoOutcome, process_undo_file};
pub use pattern::{PatternSpec, SequencePosition, ValidationResult, validate_pattern};
pub use renamer::{BatchRenamer, RenameOutcome, rename_files};
pub use transform::{TransformResult, generate_new_file_name};

pub use cli::{RenameCommand, run_cli};
