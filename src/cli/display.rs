//! Display utilities for the Pomodoro client CLI.
//!
//! This module provides formatted output for:
//! - The session history table
//! - One-shot command results
//! - Error messages

use crate::types::HistoryEntry;

/// Column headers of the history table.
const HISTORY_HEADERS: [&str; 5] = ["ID", "Started At", "Work", "Break", "Status"];

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Formats the session history as a plain-text table.
    pub fn history_table(entries: &[HistoryEntry]) -> String {
        if entries.is_empty() {
            return "No sessions yet".to_string();
        }

        let rows: Vec<[String; 5]> = entries.iter().map(HistoryEntry::cells).collect();
        let mut widths = HISTORY_HEADERS.map(str::len);
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut lines = Vec::with_capacity(rows.len() + 2);
        lines.push(Self::format_row(HISTORY_HEADERS.map(String::from).iter(), &widths));
        lines.push(
            widths
                .iter()
                .map(|width| "─".repeat(*width))
                .collect::<Vec<_>>()
                .join("  "),
        );
        for row in &rows {
            lines.push(Self::format_row(row.iter(), &widths));
        }
        lines.join("\n")
    }

    /// Prints the session history.
    pub fn show_history(entries: &[HistoryEntry]) {
        println!("{}", Self::history_table(entries));
    }

    /// Shows a success message for a deleted session.
    pub fn show_delete_success(session_id: u64) {
        println!("* Session {} deleted", session_id);
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }

    fn format_row<'a>(cells: impl Iterator<Item = &'a String>, widths: &[usize; 5]) -> String {
        cells
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================
