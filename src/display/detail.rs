use owo_colors::OwoColorize;
use serde_json::Value;

use crate::controller::ViewState;
use crate::types::{DiscoveryRecord, Stats};

use super::{format_notification, format_record_table, format_status_colored};

/// Multi-line record details for `show` and the watch dialog
pub fn format_record_details(record: &DiscoveryRecord) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} {} {}\n",
        format!("#{}", record.id).cyan(),
        format_status_colored(&record.status),
        record.display_name().bold()
    ));

    let fields = [
        ("environment", record.environment.as_deref()),
        ("env_type", record.env_type.as_deref()),
        ("data_source_type", record.data_source_type.as_deref()),
        ("folder_path", record.folder_path.as_deref()),
        ("schema_hash", record.schema_hash.as_deref()),
        ("discovered_at", record.discovered_at.as_deref()),
        ("approved_by", record.approved_by.as_deref()),
        ("rejected_by", record.rejected_by.as_deref()),
        ("rejection_reason", record.rejection_reason.as_deref()),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            out.push_str(&format!("  {}: {value}\n", label.dimmed()));
        }
    }

    for (label, value) in [
        ("storage_location", &record.storage_location),
        ("file_metadata", &record.file_metadata),
    ] {
        if let Some(value) = value {
            out.push_str(&format!("  {}:\n", label.dimmed()));
            let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
            for line in pretty.lines() {
                out.push_str(&format!("    {line}\n"));
            }
        }
    }
    out
}

/// One line per stats key; nested objects are flattened with dots
pub fn format_stats(stats: &Stats) -> String {
    if stats.is_empty() {
        return "No statistics available.".dimmed().to_string();
    }
    let mut lines = Vec::new();
    for (key, value) in stats.iter() {
        push_stat(&mut lines, key, value);
    }
    lines.join("\n")
}

fn push_stat(lines: &mut Vec<String>, key: &str, value: &Value) {
    match value {
        Value::Object(map) => {
            for (child, nested) in map {
                push_stat(lines, &format!("{key}.{child}"), nested);
            }
        }
        Value::String(s) => lines.push(format!("{}: {s}", key.cyan())),
        other => lines.push(format!("{}: {other}", key.cyan())),
    }
}

/// Full watch screen for one state snapshot
pub fn format_view(state: &ViewState) -> String {
    let mut out = String::new();

    let pagination = &state.pagination;
    let pages = pagination.total_pages.max(1);
    let mut header = format!(
        "{}  page {}/{}  {} total  size {}",
        "Discoveries".cyan().bold(),
        pagination.page + 1,
        pages,
        pagination.total,
        pagination.size
    );
    if let Some(count) = state.new_arrivals {
        header.push_str(&format!("  {}", format!("{count} new").green().bold()));
    }
    if state.loading {
        header.push_str(&format!("  {}", "loading".dimmed()));
    }
    header.push_str(&format!("  [{}]", state.scan_label()));
    out.push_str(&header);
    out.push('\n');

    let filters = &state.filters;
    if !filters.is_empty() {
        let active: Vec<String> = [
            ("status", &filters.status),
            ("env", &filters.environment),
            ("type", &filters.data_source_type),
            ("search", &filters.search),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(label, value)| format!("{label}={value}"))
        .collect();
        out.push_str(&format!("{} {}\n", "filters:".dimmed(), active.join(" ")));
    }

    if !state.stats.is_empty() {
        let summary: Vec<String> = state
            .stats
            .iter()
            .filter_map(|(key, value)| value.as_u64().map(|n| format!("{key}={n}")))
            .collect();
        if !summary.is_empty() {
            out.push_str(&format!("{} {}\n", "stats:".dimmed(), summary.join(" ")));
        }
    }

    if state.records.is_empty() {
        out.push_str(&format!("{}\n", "No discoveries found.".dimmed()));
    } else {
        out.push_str(&format_record_table(&state.records));
        out.push('\n');
    }

    if state.dialog.open {
        out.push('\n');
        match (&state.dialog.record, state.dialog.loading) {
            (_, true) => out.push_str(&format!("{}\n", "Loading details...".dimmed())),
            (Some(record), false) => out.push_str(&format_record_details(record)),
            (None, false) => {}
        }
    }

    if let Some(notification) = &state.notification {
        out.push('\n');
        out.push_str(&format_notification(
            &notification.message,
            notification.severity,
        ));
        out.push('\n');
    }

    if let Some(at) = state.last_refreshed {
        out.push_str(&format!("{}\n", format!("Last refreshed {at}").dimmed()));
    }
    out
}
