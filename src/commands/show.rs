use serde_json::json;

use super::{CommandOutput, Session};
use crate::cli::OutputOptions;
use crate::display::format_record_details;
use crate::error::Result;
use crate::gateway::DiscoveryApi;

/// Display one discovery with all of its fields
pub async fn cmd_show(session: &Session, id: i64, output: OutputOptions) -> Result<()> {
    let record = session.gateway.get_record(id).await?;
    let text = format_record_details(&record);

    CommandOutput::new(json!(record))
        .with_text(text.trim_end())
        .print(output)
}
