//! Naming patterns and their validation.
//!
//! A [`PatternSpec`] describes one declarative naming transformation: an
//! optional prefix and suffix, a literal or regular-expression find/replace,
//! and an optional running sequence number. Patterns are plain data so they can
//! be stored in the configuration file as presets; [`validate_pattern`] checks
//! that a pattern is well-formed and actually changes something before any
//! file is touched.
//!
//! # Examples
//!
//! ```
//! use batchname::pattern::{PatternSpec, validate_pattern};
//!
//! let pattern = PatternSpec {
//!     prefix: "IMG_".to_string(),
//!     ..Default::default()
//! };
//! assert!(validate_pattern(Some(&pattern)).is_valid);
//! assert!(!validate_pattern(Some(&PatternSpec::default())).is_valid);
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest zero-padding width a sequence format may request.
const MAX_SEQUENCE_DIGITS: usize = 64;

/// Where the formatted sequence number goes within the filename stem.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SequencePosition {
    /// Before the stem.
    #[default]
    Prefix,
    /// After the stem.
    Suffix,
    /// Replaces the whole stem.
    Replace,
}

impl fmt::Display for SequencePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SequencePosition::Prefix => "Prefix",
            SequencePosition::Suffix => "Suffix",
            SequencePosition::Replace => "Replace",
        };
        f.write_str(name)
    }
}

/// Errors raised while compiling the parts of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// The find text is not a valid regular expression.
    InvalidRegex {
        /// The expression that failed to compile.
        pattern: String,
        /// Why the regex engine rejected it.
        reason: String,
    },
    /// The sequence format token is malformed.
    InvalidSequenceFormat {
        /// The offending format token.
        format: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::InvalidRegex { reason, .. } => {
                write!(f, "Invalid regular expression: {}", reason)
            }
            PatternError::InvalidSequenceFormat { format, reason } => {
                write!(f, "Invalid sequence format: {} (format '{}')", reason, format)
            }
        }
    }
}

impl std::error::Error for PatternError {}

/// A parsed numeric padding token such as `"000"` or `"D4"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SequenceFormat {
    min_digits: usize,
}

impl SequenceFormat {
    /// Parses a format token.
    ///
    /// Accepted forms:
    /// - `""` formats the number without padding
    /// - runs of `0` and `#` placeholders; each `0` adds one digit of minimum width,
    ///   and at least one digit is always printed
    /// - `D` or `d` with an optional precision, e.g. `D4`
    ///
    /// # Examples
    ///
    /// ```
    /// use batchname::pattern::SequenceFormat;
    ///
    /// let format = SequenceFormat::parse("000").unwrap();
    /// assert_eq!(format.format(20), "020");
    /// assert_eq!(SequenceFormat::parse("D4").unwrap().format(7), "0007");
    /// assert!(SequenceFormat::parse("0x0").is_err());
    /// ```
    pub fn parse(token: &str) -> Result<Self, PatternError> {
        let invalid = |reason: String| PatternError::InvalidSequenceFormat {
            format: token.to_string(),
            reason,
        };

        if let Some(precision) = token.strip_prefix(['D', 'd']) {
            if precision.is_empty() {
                return Ok(Self { min_digits: 0 });
            }
            let digits = precision
                .parse::<usize>()
                .map_err(|_| invalid(format!("precision '{}' is not a number", precision)))?;
            if digits > MAX_SEQUENCE_DIGITS {
                return Err(invalid(format!(
                    "precision {} exceeds the maximum of {}",
                    digits, MAX_SEQUENCE_DIGITS
                )));
            }
            return Ok(Self { min_digits: digits });
        }

        let mut min_digits = 0;
        for ch in token.chars() {
            match ch {
                '0' => min_digits += 1,
                '#' => {}
                other => return Err(invalid(format!("unsupported character '{}'", other))),
            }
        }

        if min_digits > MAX_SEQUENCE_DIGITS {
            return Err(invalid(format!(
                "{} digit placeholders exceed the maximum of {}",
                min_digits, MAX_SEQUENCE_DIGITS
            )));
        }

        Ok(Self { min_digits })
    }

    /// Formats a value, zero-padding its magnitude to the minimum width.
    pub fn format(&self, value: i64) -> String {
        let padded = format!(
            "{:0>width$}",
            value.unsigned_abs(),
            width = self.min_digits
        );
        if value < 0 {
            format!("-{}", padded)
        } else {
            padded
        }
    }
}

/// One naming transformation.
///
/// Operations are applied to the filename stem in a fixed order: prefix,
/// find/replace, sequence, suffix. The extension is never touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternSpec {
    /// Text prepended to the stem.
    pub prefix: String,
    /// Text appended to the stem.
    pub suffix: String,
    /// Text (or expression, with `use_regex`) to search for in the stem.
    pub find_text: String,
    /// Replacement for every match of `find_text`.
    pub replace_text: String,
    /// Treat `find_text` as a regular expression.
    pub use_regex: bool,
    /// Insert a running sequence number.
    pub use_sequence: bool,
    /// Number given to the first entry of the batch.
    pub sequence_start: i32,
    /// Step between consecutive entries.
    pub sequence_increment: i32,
    /// Padding token, see [`SequenceFormat::parse`].
    pub sequence_format: String,
    /// Where the sequence number goes.
    pub sequence_position: SequencePosition,
}

impl Default for PatternSpec {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            suffix: String::new(),
            find_text: String::new(),
            replace_text: String::new(),
            use_regex: false,
            use_sequence: false,
            sequence_start: 1,
            sequence_increment: 1,
            sequence_format: "000".to_string(),
            sequence_position: SequencePosition::Prefix,
        }
    }
}

impl PatternSpec {
    /// Returns true if the find/replace step would run.
    pub fn find_replace_active(&self) -> bool {
        !self.find_text.is_empty() && self.find_text != self.replace_text
    }

    /// Returns true if at least one operation would change a name.
    pub fn has_effect(&self) -> bool {
        !self.prefix.is_empty()
            || !self.suffix.is_empty()
            || self.use_sequence
            || self.find_replace_active()
    }

    /// Compiles `find_text` when regex mode is on and there is something to find.
    pub fn compile_regex(&self) -> Result<Option<Regex>, PatternError> {
        if !self.use_regex || self.find_text.is_empty() {
            return Ok(None);
        }
        Regex::new(&self.find_text)
            .map(Some)
            .map_err(|e| PatternError::InvalidRegex {
                pattern: self.find_text.clone(),
                reason: e.to_string(),
            })
    }

    /// Parses `sequence_format`.
    pub fn parse_sequence_format(&self) -> Result<SequenceFormat, PatternError> {
        SequenceFormat::parse(&self.sequence_format)
    }

    /// Checks the pattern is well-formed and makes at least one change.
    pub fn validate(&self) -> ValidationResult {
        if !self.has_effect() {
            return ValidationResult::invalid("Pattern does not make any changes");
        }

        if let Err(e) = self.compile_regex() {
            return ValidationResult::invalid(e.to_string());
        }

        if self.use_sequence
            && let Err(e) = self.parse_sequence_format()
        {
            return ValidationResult::invalid(e.to_string());
        }

        ValidationResult::valid()
    }

    /// Builds a one-line, human-readable summary of the pattern.
    ///
    /// # Examples
    ///
    /// ```
    /// use batchname::pattern::PatternSpec;
    ///
    /// let pattern = PatternSpec {
    ///     prefix: "Pre_".to_string(),
    ///     suffix: "_v2".to_string(),
    ///     ..Default::default()
    /// };
    /// assert_eq!(pattern.describe(), "Prefix: 'Pre_' Suffix: '_v2'");
    /// ```
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();

        if !self.prefix.is_empty() {
            parts.push(format!("Prefix: '{}'", self.prefix));
        }
        if !self.suffix.is_empty() {
            parts.push(format!("Suffix: '{}'", self.suffix));
        }
        if self.find_replace_active() {
            let mode = if self.use_regex { " (Regex)" } else { "" };
            parts.push(format!(
                "Replace '{}' with '{}'{}",
                self.find_text, self.replace_text, mode
            ));
        }
        if self.use_sequence {
            parts.push(format!(
                "Sequence: Start={}, Increment={}, Format='{}', Position={}",
                self.sequence_start,
                self.sequence_increment,
                self.sequence_format,
                self.sequence_position
            ));
        }

        parts.join(" ")
    }
}

/// Outcome of [`validate_pattern`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// Whether the pattern may be applied.
    pub is_valid: bool,
    /// Why it may not; empty when valid.
    pub error_message: String,
}

impl ValidationResult {
    fn valid() -> Self {
        Self {
            is_valid: true,
            error_message: String::new(),
        }
    }

    fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error_message: message.into(),
        }
    }
}

/// Validates an optional pattern.
///
/// A missing pattern is reported as `"Pattern is null"`; otherwise this is
/// [`PatternSpec::validate`].
pub fn validate_pattern(pattern: Option<&PatternSpec>) -> ValidationResult {
    match pattern {
        Some(pattern) => pattern.validate(),
        None => ValidationResult::invalid("Pattern is null"),
    }
}
