//! Command-line interface module for batchname.
//!
//! This module handles all CLI-related functionality including:
//! - Command parsing and pattern assembly from flags and presets
//! - Path collection (files, directory contents, glob patterns)
//! - Preview, rename and undo orchestration

use crate::batch::Batch;
use crate::config::{AppConfig, ConfigError};
use crate::conflict::PreviewItem;
use crate::journal::{self, Journal, process_undo_file};
use crate::output::OutputFormatter;
use crate::pattern::{PatternSpec, SequencePosition};
use crate::renamer::{BatchRenamer, RenameOutcome};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

/// Batch-rename files with previews and undo.
#[derive(Debug, Parser)]
#[command(name = "batchname", version, about)]
pub struct Cli {
    /// Configuration file to use instead of the default lookup.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: RenameCommand,
}

/// Represents a CLI command to execute.
#[derive(Debug, Clone, Subcommand)]
pub enum RenameCommand {
    /// Show what a pattern would do without renaming anything.
    Preview {
        /// Files, directories (their immediate files, or the directories themselves
        /// with --dirs-as-entries) or glob patterns.
        #[arg(required = true)]
        paths: Vec<String>,
        /// Rename directories themselves instead of the files inside them.
        #[arg(long)]
        dirs_as_entries: bool,
        #[command(flatten)]
        pattern: PatternArgs,
    },
    /// Rename files and record an undo journal.
    Rename {
        /// Files, directories (their immediate files, or the directories themselves
        /// with --dirs-as-entries) or glob patterns.
        #[arg(required = true)]
        paths: Vec<String>,
        /// Rename directories themselves instead of the files inside them.
        #[arg(long)]
        dirs_as_entries: bool,
        #[command(flatten)]
        pattern: PatternArgs,
        /// Write an undo journal even if the configuration disables it.
        #[arg(long, conflicts_with = "no_journal")]
        journal: bool,
        /// Do not write an undo journal.
        #[arg(long)]
        no_journal: bool,
        /// Also write a plain-text `newPath|originalPath` list to this file.
        #[arg(long, value_name = "FILE")]
        export_legacy: Option<PathBuf>,
    },
    /// Reverse a recorded batch (the most recent one when no journal is given).
    Undo {
        /// Journal file to replay.
        journal: Option<PathBuf>,
    },
    /// List recorded batches, most recent first.
    History,
}

/// Pattern options shared by `preview` and `rename`.
#[derive(Debug, Clone, Default, Args)]
pub struct PatternArgs {
    /// Text to add before the name.
    #[arg(long)]
    pub prefix: Option<String>,
    /// Text to add after the name, before the extension.
    #[arg(long)]
    pub suffix: Option<String>,
    /// Text to search for in the name.
    #[arg(long)]
    pub find: Option<String>,
    /// Replacement for every occurrence of --find.
    #[arg(long)]
    pub replace: Option<String>,
    /// Treat --find as a regular expression.
    #[arg(long)]
    pub regex: bool,
    /// Insert a running sequence number.
    #[arg(long)]
    pub sequence: bool,
    /// First sequence number (implies --sequence).
    #[arg(long, allow_negative_numbers = true)]
    pub seq_start: Option<i32>,
    /// Step between sequence numbers (implies --sequence).
    #[arg(long, allow_negative_numbers = true)]
    pub seq_increment: Option<i32>,
    /// Padding format such as 000 or D4 (implies --sequence).
    #[arg(long)]
    pub seq_format: Option<String>,
    /// Where the number goes (implies --sequence).
    #[arg(long, value_enum)]
    pub seq_position: Option<SequencePosition>,
    /// Start from a pattern saved in the configuration file.
    #[arg(long)]
    pub preset: Option<String>,
}

impl PatternArgs {
    /// Builds the pattern: the preset (if any) overridden by explicit flags.
    pub fn resolve(&self, config: &AppConfig) -> Result<PatternSpec, ConfigError> {
        let mut pattern = match &self.preset {
            Some(name) => config.preset(name)?.clone(),
            None => PatternSpec::default(),
        };

        if let Some(prefix) = &self.prefix {
            pattern.prefix = prefix.clone();
        }
        if let Some(suffix) = &self.suffix {
            pattern.suffix = suffix.clone();
        }
        if let Some(find) = &self.find {
            pattern.find_text = find.clone();
        }
        if let Some(replace) = &self.replace {
            pattern.replace_text = replace.clone();
        }
        if self.regex {
            pattern.use_regex = true;
        }

        if let Some(start) = self.seq_start {
            pattern.sequence_start = start;
        }
        if let Some(increment) = self.seq_increment {
            pattern.sequence_increment = increment;
        }
        if let Some(format) = &self.seq_format {
            pattern.sequence_format = format.clone();
        }
        if let Some(position) = self.seq_position {
            pattern.sequence_position = position;
        }
        if self.sequence
            || self.seq_start.is_some()
            || self.seq_increment.is_some()
            || self.seq_format.is_some()
            || self.seq_position.is_some()
        {
            pattern.use_sequence = true;
        }

        Ok(pattern)
    }
}

/// Runs a command with the given configuration.
///
/// # Examples
///
/// ```no_run
/// use batchname::cli::{PatternArgs, RenameCommand, run_cli};
/// use batchname::config::AppConfig;
///
/// let command = RenameCommand::Preview {
///     paths: vec!["/photos".to_string()],
///     dirs_as_entries: false,
///     pattern: PatternArgs {
///         prefix: Some("2024_".to_string()),
///         ..Default::default()
///     },
/// };
/// if let Err(e) = run_cli(command, &AppConfig::default()) {
///     eprintln!("Error: {}", e);
/// }
/// ```
pub fn run_cli(command: RenameCommand, config: &AppConfig) -> Result<(), String> {
    match command {
        RenameCommand::Preview {
            paths,
            dirs_as_entries,
            pattern,
        } => preview_batch(&paths, dirs_as_entries, &pattern, config),
        RenameCommand::Rename {
            paths,
            dirs_as_entries,
            pattern,
            journal,
            no_journal,
            export_legacy,
        } => {
            let write_journal = !no_journal && (journal || config.journal.create_by_default);
            rename_batch(
                &paths,
                dirs_as_entries,
                &pattern,
                config,
                write_journal,
                export_legacy.as_deref(),
            )
        }
        RenameCommand::Undo { journal } => undo_batch(journal, config),
        RenameCommand::History => {
            OutputFormatter::journal_list(&config.journal_store().available_undo_files());
            Ok(())
        }
    }
}

/// Validates the pattern and loads the batch, printing the preview table.
///
/// Returns `None` when there is nothing to work on.
fn prepare(
    paths: &[String],
    dirs_as_entries: bool,
    pattern_args: &PatternArgs,
    config: &AppConfig,
) -> Result<Option<(Batch, Vec<PreviewItem>)>, String> {
    let pattern = pattern_args
        .resolve(config)
        .map_err(|e| format!("Error resolving pattern: {}", e))?;

    let validation = pattern.validate();
    if !validation.is_valid {
        return Err(format!("Invalid pattern: {}", validation.error_message));
    }

    let mut batch = Batch::new();
    let collected = collect_paths(paths, dirs_as_entries)?;
    let added = batch.add_paths(collected.as_slice());
    if added < collected.len() {
        OutputFormatter::warning(&format!(
            "Skipped {} {} that could not be read or whose path is not valid UTF-8",
            collected.len() - added,
            if collected.len() - added == 1 { "path" } else { "paths" }
        ));
    }
    if batch.is_empty() {
        OutputFormatter::info("No files found to rename.");
        return Ok(None);
    }

    OutputFormatter::info(&format!("Pattern: {}", pattern.describe()));
    let preview = batch.preview(&pattern);
    OutputFormatter::preview_table(&preview);

    Ok(Some((batch, preview)))
}

fn preview_batch(
    paths: &[String],
    dirs_as_entries: bool,
    pattern: &PatternArgs,
    config: &AppConfig,
) -> Result<(), String> {
    if prepare(paths, dirs_as_entries, pattern, config)?.is_some() {
        OutputFormatter::preview_notice("No files were modified.");
    }
    Ok(())
}

fn rename_batch(
    paths: &[String],
    dirs_as_entries: bool,
    pattern_args: &PatternArgs,
    config: &AppConfig,
    write_journal: bool,
    export_path: Option<&Path>,
) -> Result<(), String> {
    let Some((mut batch, preview)) = prepare(paths, dirs_as_entries, pattern_args, config)? else {
        return Ok(());
    };

    let actionable: Vec<PreviewItem> = preview
        .into_iter()
        .filter(PreviewItem::is_actionable)
        .collect();
    if actionable.is_empty() {
        OutputFormatter::warning("No valid files to rename.");
        return Ok(());
    }

    let pb = OutputFormatter::create_progress_bar(actionable.len() as u64);
    let outcomes = BatchRenamer::rename_files_with_progress(&actionable, |outcome| {
        if let Some(name) = outcome.new_path.file_name() {
            pb.set_message(name.to_string_lossy().into_owned());
        }
        pb.inc(1);
    });
    pb.finish_and_clear();

    batch.record_outcomes(&outcomes);
    OutputFormatter::rename_summary(&outcomes);

    let moved: Vec<&RenameOutcome> = outcomes.iter().filter(|o| o.moved()).collect();
    if moved.is_empty() {
        return Ok(());
    }
    let original_paths: Vec<PathBuf> = moved.iter().map(|o| o.original_path.clone()).collect();
    let new_paths: Vec<PathBuf> = moved.iter().map(|o| o.new_path.clone()).collect();

    if write_journal {
        match config
            .journal_store()
            .create_undo_file(&original_paths, &new_paths, None)
        {
            Ok(path) => {
                OutputFormatter::success(&format!("Undo journal saved: {}", path.display()));
                OutputFormatter::plain(&format!(
                    "Use 'batchname undo {}' to revert these changes.",
                    path.display()
                ));
            }
            Err(e) => OutputFormatter::warning(&format!("Could not save undo journal: {}", e)),
        }
    }

    if let Some(export_path) = export_path {
        let exported = Journal::from_pairs(&original_paths, &new_paths, Local::now())
            .and_then(|journal| journal::export_legacy(export_path, &journal));
        match exported {
            Ok(()) => OutputFormatter::success(&format!(
                "Rename list written to {}",
                export_path.display()
            )),
            Err(e) => OutputFormatter::warning(&format!("Could not write rename list: {}", e)),
        }
    }

    Ok(())
}

fn undo_batch(journal: Option<PathBuf>, config: &AppConfig) -> Result<(), String> {
    let outcome = match journal {
        Some(path) => {
            OutputFormatter::info(&format!("Undoing rename batch {}", path.display()));
            process_undo_file(&path)
        }
        None => {
            OutputFormatter::info("Undoing most recent rename batch...");
            config
                .journal_store()
                .undo_latest()
                .ok_or_else(|| "No undo journals found.".to_string())?
        }
    };

    OutputFormatter::undo_report(&outcome);
    if !outcome.failed_items.is_empty() {
        OutputFormatter::warning("The undo journal was kept because some items could not be restored.");
    }

    if outcome.success {
        Ok(())
    } else {
        Err("Nothing was restored.".to_string())
    }
}

/// Expands command-line path arguments into concrete paths.
///
/// Directories contribute their immediate files in name order, unless
/// `dirs_as_entries` is set, in which case the directory itself is an entry.
/// Arguments that do not exist are treated as glob patterns.
pub fn collect_paths(args: &[String], dirs_as_entries: bool) -> Result<Vec<PathBuf>, String> {
    let mut paths = Vec::new();

    for arg in args {
        let path = PathBuf::from(arg);
        if path.is_dir() && !dirs_as_entries {
            let entries = fs::read_dir(&path)
                .map_err(|e| format!("Error reading directory {}: {}", path.display(), e))?;
            let mut files: Vec<PathBuf> = entries
                .flatten()
                .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
                .map(|entry| entry.path())
                .collect();
            files.sort();
            paths.extend(files);
        } else if path.exists() {
            paths.push(path);
        } else if arg.contains(['*', '?', '[']) {
            let matches = glob::glob(arg)
                .map_err(|e| format!("Invalid glob pattern '{}': {}", arg, e))?;
            let before = paths.len();
            paths.extend(matches.flatten());
            if paths.len() == before {
                OutputFormatter::warning(&format!("No files match '{}'", arg));
            }
        } else {
            OutputFormatter::warning(&format!("Skipping missing path: {}", arg));
        }
    }

    Ok(paths)
}
