use owo_colors::OwoColorize;
use serde_json::json;
use tracing::info;

use super::{CommandOutput, Session};
use crate::cli::OutputOptions;
use crate::error::Result;
use crate::gateway::DiscoveryApi;

/// Ask the service to start a scan
///
/// Returns as soon as the service accepts the request; the scan itself runs in
/// the background. Use `watch` to follow its results.
pub async fn cmd_trigger(session: &Session, output: OutputOptions) -> Result<()> {
    let ack = session.gateway.trigger_scan().await?;
    info!(status = ?ack.status, "discovery scan triggered");

    let message = ack
        .message
        .clone()
        .unwrap_or_else(|| "Discovery scan started".to_string());
    let mut text = format!("{}", message.green());
    if let Some(status) = &ack.status {
        text.push_str(&format!(" {}", format!("({status})").dimmed()));
    }

    CommandOutput::new(json!({
        "action": "trigger",
        "accepted": ack.accepted,
        "message": ack.message,
        "status": ack.status,
    }))
    .with_text(text)
    .print(output)
}
