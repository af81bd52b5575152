/// Applying a previewed batch to the filesystem.
///
/// Every entry is handled on its own: a failure is recorded in that entry's
/// [`RenameOutcome`] and processing moves on, so a batch can finish with any
/// mix of successes and failures and the caller always gets a full accounting.
use crate::conflict::PreviewItem;
use std::fs;
use std::path::PathBuf;

/// Result of one attempted rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameOutcome {
    /// Path before the rename.
    pub original_path: PathBuf,
    /// Path the entry was (or would have been) renamed to.
    pub new_path: PathBuf,
    /// Whether the entry ended up with its proposed name.
    pub success: bool,
    /// Why it did not; empty on success.
    pub error_message: String,
}

impl RenameOutcome {
    fn succeeded(original_path: PathBuf, new_path: PathBuf) -> Self {
        Self {
            original_path,
            new_path,
            success: true,
            error_message: String::new(),
        }
    }

    fn failed(original_path: PathBuf, new_path: PathBuf, message: impl Into<String>) -> Self {
        Self {
            original_path,
            new_path,
            success: false,
            error_message: message.into(),
        }
    }

    /// True when something actually moved on disk.
    pub fn moved(&self) -> bool {
        self.success && self.original_path != self.new_path
    }
}

/// Renames previewed entries.
pub struct BatchRenamer;

impl BatchRenamer {
    /// Renames every item in order and reports one outcome per item.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use batchname::batch::Batch;
    /// use batchname::pattern::PatternSpec;
    /// use batchname::renamer::BatchRenamer;
    /// use std::path::PathBuf;
    ///
    /// let mut batch = Batch::new();
    /// batch.add_paths(&[PathBuf::from("/photos/beach.jpg")]);
    /// let preview = batch.preview(&PatternSpec {
    ///     prefix: "2024_".to_string(),
    ///     ..Default::default()
    /// });
    ///
    /// for outcome in BatchRenamer::rename_files(&preview) {
    ///     if !outcome.success {
    ///         eprintln!("{}: {}", outcome.original_path.display(), outcome.error_message);
    ///     }
    /// }
    /// ```
    pub fn rename_files(items: &[PreviewItem]) -> Vec<RenameOutcome> {
        Self::rename_files_with_progress(items, |_| {})
    }

    /// Like [`BatchRenamer::rename_files`], calling `on_outcome` after each item.
    pub fn rename_files_with_progress<F>(items: &[PreviewItem], mut on_outcome: F) -> Vec<RenameOutcome>
    where
        F: FnMut(&RenameOutcome),
    {
        items
            .iter()
            .map(|item| {
                let outcome = Self::rename_one(item);
                on_outcome(&outcome);
                outcome
            })
            .collect()
    }

    fn rename_one(item: &PreviewItem) -> RenameOutcome {
        let original_path = item.entry.full_path.clone();
        let new_path = item.destination();

        if !item.changes_name() {
            return RenameOutcome::succeeded(original_path, new_path);
        }

        if let Some(reason) = item.block_reason() {
            return RenameOutcome::failed(original_path, new_path, reason);
        }

        // symlink_metadata also sees dangling links, which rename would replace
        if fs::symlink_metadata(&new_path).is_ok() {
            return RenameOutcome::failed(original_path, new_path, "Destination file already exists");
        }

        match fs::rename(&original_path, &new_path) {
            Ok(()) => RenameOutcome::succeeded(original_path, new_path),
            Err(e) => RenameOutcome::failed(original_path, new_path, e.to_string()),
        }
    }
}

/// Renames every item in order; see [`BatchRenamer::rename_files`].
pub fn rename_files(items: &[PreviewItem]) -> Vec<RenameOutcome> {
    BatchRenamer::rename_files(items)
}
