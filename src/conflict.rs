//! Duplicate-destination detection across a whole batch.
//!
//! Two entries conflict when they would end up at the same full path. The check
//! is always recomputed from scratch over the complete batch; a conflict flag
//! sits beside the per-entry transform error and both block a rename.

use crate::file_entry::FileEntry;
use crate::transform::TransformResult;
use std::collections::HashMap;
use std::path::PathBuf;

/// Reason attached to every member of a colliding group.
pub const DUPLICATE_NAME_MESSAGE: &str = "Duplicate filename would be created";

/// Marks an entry whose destination collides with another entry's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictFlag {
    pub reason: String,
}

/// An entry together with its proposed name and conflict state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewItem {
    pub entry: FileEntry,
    pub result: TransformResult,
    pub conflict: Option<ConflictFlag>,
}

impl PreviewItem {
    /// Wraps a transform result; conflicts are filled in by [`detect_conflicts`].
    pub fn new(entry: FileEntry, result: TransformResult) -> Self {
        Self {
            entry,
            result,
            conflict: None,
        }
    }

    /// Full path the entry would be renamed to.
    pub fn destination(&self) -> PathBuf {
        self.entry.destination_for(&self.result.new_name)
    }

    /// Whether the proposed name differs from the current one.
    pub fn changes_name(&self) -> bool {
        self.result.new_name != self.entry.original_name
    }

    /// Whether a transform error or a conflict prevents the rename.
    pub fn is_blocked(&self) -> bool {
        self.result.has_error || self.conflict.is_some()
    }

    /// Message explaining why the entry is blocked. A conflict takes precedence.
    pub fn block_reason(&self) -> Option<&str> {
        if let Some(conflict) = &self.conflict {
            Some(&conflict.reason)
        } else if self.result.has_error {
            Some(&self.result.error_message)
        } else {
            None
        }
    }

    /// True when the entry should be handed to the renamer.
    pub fn is_actionable(&self) -> bool {
        !self.is_blocked() && self.changes_name()
    }
}

/// Flags every entry whose destination is shared with another entry.
///
/// Existing flags are cleared first. Returns the number of flagged entries.
pub fn detect_conflicts(items: &mut [PreviewItem]) -> usize {
    let mut groups: HashMap<PathBuf, Vec<usize>> = HashMap::new();
    for (index, item) in items.iter_mut().enumerate() {
        item.conflict = None;
        groups.entry(item.destination()).or_default().push(index);
    }

    let mut flagged = 0;
    for indices in groups.values().filter(|indices| indices.len() > 1) {
        for &index in indices {
            items[index].conflict = Some(ConflictFlag {
                reason: DUPLICATE_NAME_MESSAGE.to_string(),
            });
            flagged += 1;
        }
    }

    flagged
}
