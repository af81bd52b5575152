//! Output formatting and styling module.
//!
//! Provides a centralized interface for all CLI output: coloured status lines,
//! a progress bar for rename batches, the preview table and the summaries
//! printed after renaming or undoing.

use crate::conflict::PreviewItem;
use crate::journal::{JournalSummary, UndoOutcome};
use crate::renamer::RenameOutcome;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Manages all CLI output with consistent styling and formatting.
///
/// - Success messages (green with ✓)
/// - Error messages (red with ✗, on stderr)
/// - Warning messages (yellow with ⚠)
/// - Info messages (cyan)
/// - Progress bars and summary tables
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// ```no_run
    /// use batchname::output::OutputFormatter;
    /// OutputFormatter::success("Renamed 12 files");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a regular message without styling.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a notice that nothing will be modified.
    pub fn preview_notice(message: &str) {
        println!("{}", format!("[PREVIEW] {}", message).yellow());
    }

    /// Creates a progress bar for a rename batch.
    ///
    /// Falls back to the default bar style if the template is rejected.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Prints the old → new name table of a preview.
    pub fn preview_table(items: &[PreviewItem]) {
        Self::header("PREVIEW");

        let width = items
            .iter()
            .map(|item| item.entry.original_name.chars().count())
            .max()
            .unwrap_or(0)
            .max(8);

        println!("{:<width$}   {}", "Current".bold(), "New".bold(), width = width);
        println!("{}", "-".repeat(width * 2 + 3));

        for item in items {
            let new_name = if let Some(reason) = item.block_reason() {
                format!("{}  {}", item.result.new_name.red(), format!("({})", reason).red())
            } else if item.changes_name() {
                item.result.new_name.green().to_string()
            } else {
                format!("{}", "(unchanged)".dimmed())
            };
            println!(
                "{:<width$} → {}",
                item.entry.original_name,
                new_name,
                width = width
            );
        }

        let actionable = items.iter().filter(|i| i.is_actionable()).count();
        let blocked = items.iter().filter(|i| i.is_blocked()).count();
        println!("{}", "-".repeat(width * 2 + 3));
        println!(
            "{} to rename, {} blocked, {} unchanged",
            actionable.to_string().green().bold(),
            blocked.to_string().red().bold(),
            items.len() - actionable - blocked
        );
    }

    /// Prints the result of a rename batch, listing every failure.
    pub fn rename_summary(outcomes: &[RenameOutcome]) {
        Self::header("SUMMARY");

        let failures: Vec<_> = outcomes.iter().filter(|o| !o.success).collect();
        let renamed = outcomes.iter().filter(|o| o.moved()).count();

        if failures.is_empty() {
            Self::success(&format!("Renamed {} {}", renamed, files_word(renamed)));
            return;
        }

        Self::warning(&format!(
            "Renamed {} {}. {} could not be renamed:",
            renamed,
            files_word(renamed),
            failures.len()
        ));
        for outcome in failures {
            let name = outcome
                .original_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| outcome.original_path.display().to_string());
            eprintln!("   {} {} - {}", "✗".red(), name, outcome.error_message);
        }
    }

    /// Prints the result of replaying a journal.
    pub fn undo_report(outcome: &UndoOutcome) {
        if outcome.success && outcome.failed_items.is_empty() {
            Self::success(&outcome.message);
        } else if outcome.success {
            Self::warning(&outcome.message);
        } else {
            Self::error(&outcome.message);
        }

        for failure in &outcome.failed_items {
            eprintln!(
                "   {} {} → {}: {}",
                "✗".red(),
                failure.entry.new_path.display(),
                failure.entry.original_path.display(),
                failure.reason
            );
        }
    }

    /// Prints stored journals, most recent first.
    pub fn journal_list(summaries: &[JournalSummary]) {
        if summaries.is_empty() {
            Self::info("No undo journals found.");
            return;
        }

        Self::header("UNDO HISTORY");
        for (position, summary) in summaries.iter().enumerate() {
            println!(
                "{:>3}. {}\n     {}",
                position + 1,
                summary.display_label,
                summary.storage_path.display().to_string().dimmed()
            );
        }
    }
}

fn files_word(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
