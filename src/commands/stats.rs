use owo_colors::OwoColorize;
use serde_json::json;

use super::{CommandOutput, Session};
use crate::cli::OutputOptions;
use crate::display::format_stats;
use crate::error::Result;
use crate::gateway::DiscoveryApi;

/// Show aggregate statistics
pub async fn cmd_stats(session: &Session, output: OutputOptions) -> Result<()> {
    let stats = session.gateway.get_stats().await?;
    let text = format!("{}\n\n{}", "Statistics:".cyan().bold(), format_stats(&stats));

    CommandOutput::new(json!(stats))
        .with_text(text)
        .print(output)
}
