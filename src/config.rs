//! User configuration.
//!
//! Settings are read from a TOML file and passed explicitly to whatever needs
//! them. The file can choose where undo journals are stored, whether a journal
//! is written after every rename by default, and a list of named pattern
//! presets.
//!
//! # Configuration File Format
//!
//! ```toml
//! [journal]
//! directory = "/home/me/.rename-undo"
//! create_by_default = true
//!
//! [[patterns]]
//! name = "photos"
//! prefix = "IMG_"
//! use_sequence = true
//! sequence_format = "0000"
//! sequence_position = "prefix"
//!
//! [[patterns]]
//! name = "no-spaces"
//! find_text = " "
//! replace_text = "_"
//! ```

use crate::journal::JournalStore;
use crate::pattern::PatternSpec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Errors that can occur while loading or querying the configuration.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    ConfigInvalid(String),
    /// IO error while reading configuration.
    IoError(String),
    /// No preset with the requested name.
    UnknownPreset {
        /// The name that was asked for.
        name: String,
        /// Names that do exist.
        available: Vec<String>,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::IoError(msg) => write!(f, "IO error reading configuration: {}", msg),
            ConfigError::UnknownPreset { name, available } => {
                if available.is_empty() {
                    write!(f, "Unknown pattern preset '{}': no presets are configured", name)
                } else {
                    write!(
                        f,
                        "Unknown pattern preset '{}' (available: {})",
                        name,
                        available.join(", ")
                    )
                }
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Undo journal settings.
    #[serde(default)]
    pub journal: JournalSettings,

    /// Saved, named patterns.
    #[serde(default)]
    pub patterns: Vec<PatternPreset>,
}

/// Where and whether undo journals are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalSettings {
    /// Journal directory; the platform data directory when unset.
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Write a journal after each rename unless told otherwise. Defaults to true.
    #[serde(default = "default_create_by_default")]
    pub create_by_default: bool,
}

fn default_create_by_default() -> bool {
    true
}

impl Default for JournalSettings {
    fn default() -> Self {
        Self {
            directory: None,
            create_by_default: default_create_by_default(),
        }
    }
}

/// A pattern saved under a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternPreset {
    pub name: String,
    #[serde(flatten)]
    pub pattern: PatternSpec,
}

impl AppConfig {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.batchnamerc.toml` in the current directory
    /// 3. Look for `~/.config/batchname/config.toml` in home directory
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but cannot
    /// be read, or if any file that is found fails to parse.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(".batchnamerc.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("batchname")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigNotFound` if file does not exist.
    /// Returns `ConfigError::ConfigInvalid` if TOML parsing fails or preset names repeat.
    /// Returns `ConfigError::IoError` if file cannot be read.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&content)
    }

    /// Parses configuration text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))?;
        config.check_presets()?;
        Ok(config)
    }

    fn check_presets(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for preset in &self.patterns {
            if preset.name.trim().is_empty() {
                return Err(ConfigError::ConfigInvalid(
                    "pattern presets must have a name".to_string(),
                ));
            }
            if !seen.insert(preset.name.as_str()) {
                return Err(ConfigError::ConfigInvalid(format!(
                    "pattern preset '{}' is defined more than once",
                    preset.name
                )));
            }
        }
        Ok(())
    }

    /// Directory where journals are kept.
    pub fn journal_directory(&self) -> PathBuf {
        self.journal
            .directory
            .clone()
            .unwrap_or_else(JournalStore::default_directory)
    }

    /// A journal store rooted at [`AppConfig::journal_directory`].
    pub fn journal_store(&self) -> JournalStore {
        JournalStore::new(self.journal_directory())
    }

    /// Looks up a preset by name.
    pub fn preset(&self, name: &str) -> Result<&PatternSpec, ConfigError> {
        self.patterns
            .iter()
            .find(|preset| preset.name == name)
            .map(|preset| &preset.pattern)
            .ok_or_else(|| ConfigError::UnknownPreset {
                name: name.to_string(),
                available: self.patterns.iter().map(|p| p.name.clone()).collect(),
            })
    }
}
