//! Console output helpers.
//!
//! The activity log is the record of what happened; the console only carries
//! the confirmation line of a run and the dry-run preview, styled here.

use crate::file_organizer::PlannedMove;
use colored::*;
use std::collections::BTreeMap;

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// ```no_run
    /// use desktidy::output::OutputFormatter;
    /// OutputFormatter::success("Your desktop has been tidied up!");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow.
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Prints one planned move per line.
    pub fn planned_moves(planned: &[PlannedMove]) {
        for plan in planned {
            println!(" - {} {} {}/", plan.name, "→".cyan(), plan.category);
        }
    }

    /// Prints a summary table with file counts per category.
    ///
    /// ```no_run
    /// use desktidy::output::OutputFormatter;
    /// use std::collections::BTreeMap;
    ///
    /// let mut counts = BTreeMap::new();
    /// counts.insert("Documents".to_string(), 15);
    /// counts.insert("Images".to_string(), 8);
    /// OutputFormatter::summary_table(&counts);
    /// ```
    pub fn summary_table(category_counts: &BTreeMap<String, usize>) {
        Self::header("SUMMARY");

        let width = category_counts
            .keys()
            .map(String::len)
            .max()
            .unwrap_or(0)
            .max("Category".len());
        let total: usize = category_counts.values().sum();

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Files".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 10));

        for (category, count) in category_counts {
            println!(
                "{:<width$} | {} {}",
                category,
                count.to_string().green(),
                plural(*count),
                width = width
            );
        }

        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total.to_string().green().bold(),
            plural(total),
            width = width
        );
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
