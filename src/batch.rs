//! The set of entries renamed together.
//!
//! A [`Batch`] is a plain ordered list of [`FileEntry`] values. It hands out
//! batch indices in admission order, recomputes previews on request and
//! notifies subscribers through explicit callbacks whenever its contents or
//! preview change.

use crate::conflict::{PreviewItem, detect_conflicts};
use crate::file_entry::FileEntry;
use crate::pattern::PatternSpec;
use crate::renamer::RenameOutcome;
use crate::transform::NameTransformer;
use std::path::{Path, PathBuf};

/// Change notifications delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    /// New entries were appended.
    EntriesAdded { count: usize },
    /// The entry at `index` was removed; later entries shifted down.
    EntryRemoved { index: usize },
    /// All entries were removed.
    Cleared,
    /// A preview was computed.
    PreviewRefreshed { errors: usize, conflicts: usize },
    /// An entry was renamed on disk and now lives at `to`.
    EntryRenamed { from: PathBuf, to: PathBuf },
}

type Listener = Box<dyn FnMut(&BatchEvent)>;

/// Ordered entries sharing one pattern.
#[derive(Default)]
pub struct Batch {
    entries: Vec<FileEntry>,
    listeners: Vec<Listener>,
}

impl Batch {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries in batch order.
    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registers a callback invoked for every [`BatchEvent`].
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&BatchEvent) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    fn notify(&mut self, event: BatchEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    /// Admits existing files or directories, in the given order.
    ///
    /// Paths that cannot be inspected or are not valid UTF-8 are skipped.
    /// Returns how many entries were added.
    pub fn add_paths<P: AsRef<Path>>(&mut self, paths: &[P]) -> usize {
        let start = self.entries.len();
        for path in paths {
            let index = self.entries.len();
            if let Ok(entry) = FileEntry::from_path(path.as_ref(), index) {
                self.entries.push(entry);
            }
        }

        let count = self.entries.len() - start;
        if count > 0 {
            self.notify(BatchEvent::EntriesAdded { count });
        }
        count
    }

    /// Appends an already-built entry, assigning it the next batch index.
    pub fn push(&mut self, mut entry: FileEntry) {
        entry.batch_index = self.entries.len();
        self.entries.push(entry);
        self.notify(BatchEvent::EntriesAdded { count: 1 });
    }

    /// Removes the entry at `index` and renumbers the rest.
    pub fn remove(&mut self, index: usize) -> Option<FileEntry> {
        if index >= self.entries.len() {
            return None;
        }
        let removed = self.entries.remove(index);
        self.reindex();
        self.notify(BatchEvent::EntryRemoved { index });
        Some(removed)
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.notify(BatchEvent::Cleared);
    }

    fn reindex(&mut self) {
        for (index, entry) in self.entries.iter_mut().enumerate() {
            entry.batch_index = index;
        }
    }

    /// Computes proposed names and conflicts for the whole batch.
    pub fn preview(&mut self, pattern: &PatternSpec) -> Vec<PreviewItem> {
        let items = preview_entries(&self.entries, pattern);
        let errors = items.iter().filter(|i| i.result.has_error).count();
        let conflicts = items.iter().filter(|i| i.conflict.is_some()).count();
        self.notify(BatchEvent::PreviewRefreshed { errors, conflicts });
        items
    }

    /// Applies successful rename outcomes to the matching entries.
    ///
    /// Returns how many entries were updated.
    pub fn record_outcomes(&mut self, outcomes: &[RenameOutcome]) -> usize {
        let mut renamed = Vec::new();
        for outcome in outcomes.iter().filter(|o| o.moved()) {
            if let Some(entry) = self
                .entries
                .iter_mut()
                .find(|e| e.full_path == outcome.original_path)
            {
                entry.mark_renamed(outcome.new_path.clone());
                renamed.push(BatchEvent::EntryRenamed {
                    from: outcome.original_path.clone(),
                    to: outcome.new_path.clone(),
                });
            }
        }

        let count = renamed.len();
        for event in renamed {
            self.notify(event);
        }
        count
    }
}

/// Transforms every entry with `pattern` and flags duplicate destinations.
pub fn preview_entries(entries: &[FileEntry], pattern: &PatternSpec) -> Vec<PreviewItem> {
    let transformer = NameTransformer::new(pattern.clone());
    let mut items: Vec<PreviewItem> = entries
        .iter()
        .map(|entry| PreviewItem::new(entry.clone(), transformer.transform(entry)))
        .collect();
    detect_conflicts(&mut items);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::SequencePosition;
    use std::cell::RefCell;
    use std::fs;
    use std::rc::Rc;
    use tempfile::TempDir;

    fn sequence_pattern() -> PatternSpec {
        PatternSpec {
            use_sequence: true,
            sequence_format: "00".to_string(),
            sequence_position: SequencePosition::Replace,
            ..Default::default()
        }
    }

    #[test]
    fn test_add_paths_skips_missing_and_assigns_indices() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let a = temp_dir.path().join("a.txt");
        let b = temp_dir.path().join("b.txt");
        fs::write(&a, "a").expect("Failed to write a");
        fs::write(&b, "b").expect("Failed to write b");

        let mut batch = Batch::new();
        let added = batch.add_paths(&[a, temp_dir.path().join("missing.txt"), b]);

        assert_eq!(added, 2);
        assert_eq!(batch.entries()[0].batch_index, 0);
        assert_eq!(batch.entries()[1].batch_index, 1);
        assert_eq!(batch.entries()[1].original_name, "b.txt");
    }

    #[test]
    fn test_remove_renumbers_entries() {
        let mut batch = Batch::new();
        batch.push(FileEntry::new("/d/a.txt", 0));
        batch.push(FileEntry::new("/d/b.txt", 0));
        batch.push(FileEntry::new("/d/c.txt", 0));

        let removed = batch.remove(0).expect("entry should exist");
        assert_eq!(removed.original_name, "a.txt");
        assert_eq!(batch.entries()[0].batch_index, 0);
        assert_eq!(batch.entries()[1].batch_index, 1);
        assert!(batch.remove(5).is_none());
    }

    #[test]
    fn test_preview_uses_batch_index_for_sequence() {
        let mut batch = Batch::new();
        batch.push(FileEntry::new("/d/x.jpg", 0));
        batch.push(FileEntry::new("/d/y.jpg", 0));

        let preview = batch.preview(&sequence_pattern());

        assert_eq!(preview[0].result.new_name, "01.jpg");
        assert_eq!(preview[1].result.new_name, "02.jpg");
        assert!(preview.iter().all(PreviewItem::is_actionable));
    }

    #[test]
    fn test_preview_flags_conflicts() {
        let mut batch = Batch::new();
        batch.push(FileEntry::new("/d/x.jpg", 0));
        batch.push(FileEntry::new("/d/y.jpg", 0));

        let pattern = PatternSpec {
            find_text: ".".to_string(),
            replace_text: "same".to_string(),
            use_regex: true,
            ..Default::default()
        };
        let preview = batch.preview(&pattern);

        assert!(preview.iter().all(|item| item.conflict.is_some()));
    }

    #[test]
    fn test_subscribers_receive_events() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);

        let mut batch = Batch::new();
        batch.subscribe(move |event| sink.borrow_mut().push(event.clone()));
        batch.push(FileEntry::new("/d/x.jpg", 0));
        batch.preview(&sequence_pattern());
        batch.clear();

        let events = events.borrow();
        assert_eq!(events[0], BatchEvent::EntriesAdded { count: 1 });
        assert_eq!(
            events[1],
            BatchEvent::PreviewRefreshed {
                errors: 0,
                conflicts: 0
            }
        );
        assert_eq!(events[2], BatchEvent::Cleared);
    }

    #[test]
    fn test_record_outcomes_updates_only_moved_entries() {
        let mut batch = Batch::new();
        batch.push(FileEntry::new("/d/a.txt", 0));
        batch.push(FileEntry::new("/d/b.txt", 0));

        let outcomes = vec![
            RenameOutcome {
                original_path: PathBuf::from("/d/a.txt"),
                new_path: PathBuf::from("/d/A1.txt"),
                success: true,
                error_message: String::new(),
            },
            RenameOutcome {
                original_path: PathBuf::from("/d/b.txt"),
                new_path: PathBuf::from("/d/B1.txt"),
                success: false,
                error_message: "Destination file already exists".to_string(),
            },
        ];

        assert_eq!(batch.record_outcomes(&outcomes), 1);
        assert_eq!(batch.entries()[0].original_name, "A1.txt");
        assert_eq!(batch.entries()[1].original_name, "b.txt");
    }
}
