//! Computing new names from a pattern.
//!
//! [`NameTransformer`] maps a [`FileEntry`] to its proposed new name. The result
//! depends only on the entry's current name, its batch index and the pattern,
//! so a preview can be recomputed at any time and always agrees with what a
//! rename would do.
//!
//! The stem (name without extension) goes through four steps, always in this
//! order:
//!
//! 1. prefix
//! 2. find/replace (literal or regex, every occurrence)
//! 3. sequence number (prefix, suffix or replacing the whole stem)
//! 4. suffix
//!
//! The extension is reattached unchanged and the result is checked against the
//! portable filename rules.

use crate::file_entry::FileEntry;
use crate::pattern::{PatternSpec, SequenceFormat, SequencePosition};
use regex::Regex;

/// Characters no portable filename may contain.
const RESERVED_CHARACTERS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Device names reserved regardless of extension.
const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

const INVALID_NAME_MESSAGE: &str = "Invalid characters in filename";

/// The proposed name for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformResult {
    /// Proposed name; shown even when `has_error` is set.
    pub new_name: String,
    /// Whether the name must not be applied.
    pub has_error: bool,
    /// Why; empty on success.
    pub error_message: String,
}

impl TransformResult {
    fn ok(new_name: String) -> Self {
        Self {
            new_name,
            has_error: false,
            error_message: String::new(),
        }
    }

    fn error(new_name: String, message: impl Into<String>) -> Self {
        Self {
            new_name,
            has_error: true,
            error_message: message.into(),
        }
    }
}

/// Failures while building a name, before the final validity check.
enum StepError {
    Regex(String),
    Unexpected(String),
}

/// Applies one pattern to any number of entries.
///
/// The regex and the sequence format are compiled once on construction; a
/// pattern that fails to compile still yields a transformer, and the failure
/// surfaces as a per-entry error.
pub struct NameTransformer {
    pattern: PatternSpec,
    regex: Option<Result<Regex, String>>,
    sequence_format: Option<Result<SequenceFormat, String>>,
}

impl NameTransformer {
    /// Prepares a transformer for `pattern`.
    pub fn new(pattern: PatternSpec) -> Self {
        let regex = (pattern.use_regex && pattern.find_replace_active())
            .then(|| Regex::new(&pattern.find_text).map_err(|e| e.to_string()));
        let sequence_format = pattern.use_sequence.then(|| {
            pattern
                .parse_sequence_format()
                .map_err(|e| e.to_string())
        });

        Self {
            pattern,
            regex,
            sequence_format,
        }
    }

    /// The pattern this transformer applies.
    pub fn pattern(&self) -> &PatternSpec {
        &self.pattern
    }

    /// Computes the proposed name for `file`.
    ///
    /// # Examples
    ///
    /// ```
    /// use batchname::file_entry::FileEntry;
    /// use batchname::pattern::PatternSpec;
    /// use batchname::transform::NameTransformer;
    ///
    /// let transformer = NameTransformer::new(PatternSpec {
    ///     prefix: "Pre_".to_string(),
    ///     ..Default::default()
    /// });
    /// let result = transformer.transform(&FileEntry::new("test.txt", 0));
    /// assert_eq!(result.new_name, "Pre_test.txt");
    /// assert!(!result.has_error);
    /// ```
    pub fn transform(&self, file: &FileEntry) -> TransformResult {
        match self.build_name(file) {
            Ok(new_name) => {
                if is_valid_file_name(&new_name) {
                    TransformResult::ok(new_name)
                } else {
                    TransformResult::error(new_name, INVALID_NAME_MESSAGE)
                }
            }
            Err(StepError::Regex(reason)) => TransformResult::error(
                file.original_name.clone(),
                format!("Invalid regex pattern: {}", reason),
            ),
            Err(StepError::Unexpected(reason)) => TransformResult::error(
                file.original_name.clone(),
                format!("Error generating filename: {}", reason),
            ),
        }
    }

    fn build_name(&self, file: &FileEntry) -> Result<String, StepError> {
        let pattern = &self.pattern;
        let (stem, extension) = split_extension(&file.original_name);
        let mut stem = stem.to_string();

        if !pattern.prefix.is_empty() {
            stem.insert_str(0, &pattern.prefix);
        }

        if pattern.find_replace_active() {
            stem = match &self.regex {
                Some(Ok(regex)) => regex
                    .replace_all(&stem, pattern.replace_text.as_str())
                    .into_owned(),
                Some(Err(reason)) => return Err(StepError::Regex(reason.clone())),
                None => stem.replace(&pattern.find_text, &pattern.replace_text),
            };
        }

        if let Some(format) = &self.sequence_format {
            let format = format.as_ref().map_err(|e| StepError::Unexpected(e.clone()))?;
            let value = sequence_value(
                pattern.sequence_start,
                pattern.sequence_increment,
                file.batch_index,
            )
            .ok_or_else(|| StepError::Unexpected("sequence number overflow".to_string()))?;
            let number = format.format(value);

            stem = match pattern.sequence_position {
                SequencePosition::Prefix => number + &stem,
                SequencePosition::Suffix => stem + &number,
                SequencePosition::Replace => number,
            };
        }

        if !pattern.suffix.is_empty() {
            stem.push_str(&pattern.suffix);
        }

        stem.push_str(extension);
        Ok(stem)
    }
}

/// `start + batch_index * increment`, or `None` on overflow.
pub fn sequence_value(start: i32, increment: i32, batch_index: usize) -> Option<i64> {
    let index = i64::try_from(batch_index).ok()?;
    index
        .checked_mul(i64::from(increment))?
        .checked_add(i64::from(start))
}

/// Splits a name into stem and extension at the last `.`.
///
/// The extension keeps its dot; names without a dot have an empty extension.
///
/// # Examples
///
/// ```
/// use batchname::transform::split_extension;
///
/// assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", ".gz"));
/// assert_eq!(split_extension("README"), ("README", ""));
/// ```
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(dot) => name.split_at(dot),
        None => (name, ""),
    }
}

/// Checks a name against the portable filename rules.
///
/// Rejects empty names, reserved or control characters, and reserved device
/// names (compared case-insensitively on the stem).
pub fn is_valid_file_name(name: &str) -> bool {
    if name.is_empty() {
        return false;
    }

    if name
        .chars()
        .any(|c| c.is_control() || RESERVED_CHARACTERS.contains(&c))
    {
        return false;
    }

    let (stem, _) = split_extension(name);
    !RESERVED_NAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(stem))
}

/// Computes the new name of an optional file under an optional pattern.
///
/// A missing file is an error; a missing pattern leaves the name unchanged.
pub fn generate_new_file_name(
    file: Option<&FileEntry>,
    pattern: Option<&PatternSpec>,
) -> TransformResult {
    let Some(file) = file else {
        return TransformResult::error(String::new(), "File is null");
    };

    match pattern {
        Some(pattern) => NameTransformer::new(pattern.clone()).transform(file),
        None => TransformResult::ok(file.original_name.clone()),
    }
}
