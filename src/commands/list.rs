use owo_colors::OwoColorize;
use serde_json::json;

use super::{CommandOutput, Session};
use crate::cli::OutputOptions;
use crate::display::format_record_table;
use crate::error::Result;
use crate::gateway::{DiscoveryApi, ListQuery};

/// List one page of discoveries
pub async fn cmd_list(session: &Session, query: ListQuery, output: OutputOptions) -> Result<()> {
    let page = session.gateway.list_records(&query).await?;

    let json_output = json!({
        "discoveries": page.records,
        "pagination": page.pagination,
        "query": query.to_pairs().into_iter().collect::<std::collections::BTreeMap<_, _>>(),
    });

    let mut text = if page.records.is_empty() {
        "No discoveries found.".dimmed().to_string()
    } else {
        format_record_table(&page.records)
    };
    if let Some(pagination) = &page.pagination {
        text.push_str(&format!(
            "\n\nPage {}/{} ({} total)",
            pagination.page + 1,
            pagination.total_pages.max(1),
            pagination.total
        ));
    }

    CommandOutput::new(json_output)
        .with_text(text)
        .print(output)
}
