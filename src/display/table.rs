use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::types::DiscoveryRecord;

use super::{format_date_for_display, format_status_colored};

/// A row in the discovery list table
#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Environment")]
    environment: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Discovered")]
    discovered: String,
}

impl From<&DiscoveryRecord> for RecordRow {
    fn from(record: &DiscoveryRecord) -> Self {
        Self {
            id: record.id,
            name: record.display_name(),
            source: record.data_source_type.clone().unwrap_or_else(|| "-".into()),
            environment: record.environment.clone().unwrap_or_else(|| "-".into()),
            status: format_status_colored(&record.status),
            discovered: record
                .discovered_at
                .as_deref()
                .map(format_date_for_display)
                .unwrap_or_else(|| "-".into()),
        }
    }
}

/// Render records as a rounded table
pub fn format_record_table(records: &[DiscoveryRecord]) -> String {
    let rows: Vec<RecordRow> = records.iter().map(RecordRow::from).collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}
