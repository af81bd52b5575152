/// Files and folders admitted to a rename batch.
///
/// A `FileEntry` remembers where an item lives, its current name, and the
/// position it was given in the batch. The position drives sequence numbering
/// and nothing else.
use chrono::{DateTime, Local};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// One item of a rename batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Current full path of the item.
    pub full_path: PathBuf,
    /// Current file name, extension included.
    pub original_name: String,
    /// Size in bytes (zero for directories or when unknown).
    pub size: u64,
    /// Last modification time, informational only.
    pub last_modified: Option<DateTime<Local>>,
    /// 0-based position within the batch.
    pub batch_index: usize,
}

impl FileEntry {
    /// Creates an entry without touching the filesystem.
    ///
    /// # Examples
    ///
    /// ```
    /// use batchname::file_entry::FileEntry;
    ///
    /// let entry = FileEntry::new("/photos/beach.jpg", 3);
    /// assert_eq!(entry.original_name, "beach.jpg");
    /// assert_eq!(entry.batch_index, 3);
    /// ```
    pub fn new(full_path: impl Into<PathBuf>, batch_index: usize) -> Self {
        let full_path = full_path.into();
        let original_name = name_of(&full_path);
        Self {
            full_path,
            original_name,
            size: 0,
            last_modified: None,
            batch_index,
        }
    }

    /// Creates an entry for an existing file or directory, reading its metadata.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the path cannot be inspected, and
    /// [`io::ErrorKind::InvalidData`] if the path is not valid UTF-8. Such a
    /// name could not be rebuilt by the transformer nor recorded in a journal.
    pub fn from_path(path: &Path, batch_index: usize) -> io::Result<Self> {
        if path.to_str().is_none() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("path is not valid UTF-8: {}", path.display()),
            ));
        }
        let metadata = fs::metadata(path)?;
        let mut entry = Self::new(path, batch_index);
        entry.size = if metadata.is_file() { metadata.len() } else { 0 };
        entry.last_modified = metadata.modified().ok().map(DateTime::<Local>::from);
        Ok(entry)
    }

    /// The directory containing this entry.
    pub fn directory(&self) -> &Path {
        self.full_path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Full path this entry would have if it were called `new_name`.
    pub fn destination_for(&self, new_name: &str) -> PathBuf {
        self.directory().join(new_name)
    }

    /// Records a confirmed rename: path and name move together.
    pub fn mark_renamed(&mut self, new_path: PathBuf) {
        self.original_name = name_of(&new_path);
        self.full_path = new_path;
    }
}

fn name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
