//! Terminal rendering shared by the one-shot commands and `watch`.

use owo_colors::OwoColorize;

use crate::controller::Severity;
use crate::types::RecordStatus;

mod detail;
mod table;

pub use detail::{format_record_details, format_stats, format_view};
pub use table::format_record_table;

/// Colour a record status badge
pub fn format_status_colored(status: &RecordStatus) -> String {
    let badge = format!("[{status}]");
    match status {
        RecordStatus::Pending => badge.yellow().to_string(),
        RecordStatus::Approved => badge.green().to_string(),
        RecordStatus::Rejected => badge.red().to_string(),
        RecordStatus::Other(_) => badge.dimmed().to_string(),
    }
}

/// Colour a notification line by severity
pub fn format_notification(message: &str, severity: Severity) -> String {
    let line = format!("[{}] {message}", severity.label());
    match severity {
        Severity::Success => line.green().to_string(),
        Severity::Info => line.cyan().to_string(),
        Severity::Error => line.red().to_string(),
    }
}

/// Format a date string for display
///
/// Keeps just the date part (YYYY-MM-DD) of an ISO datetime string.
///
/// ```
/// use discovery_console::display::format_date_for_display;
///
/// assert_eq!(format_date_for_display("2024-01-15T10:30:00Z"), "2024-01-15");
/// assert_eq!(format_date_for_display("short"), "short");
/// ```
pub fn format_date_for_display(date_str: &str) -> String {
    match date_str.get(..10) {
        Some(date) if date_str.len() >= 10 => date.to_string(),
        _ => date_str.to_string(),
    }
}
