//! Approve and reject commands.

use owo_colors::OwoColorize;
use serde_json::json;
use tracing::info;

use super::{CommandOutput, Session};
use crate::cli::OutputOptions;
use crate::display::format_status_colored;
use crate::error::{DiscoveryError, Result};
use crate::gateway::DiscoveryApi;

/// Approve a discovery
pub async fn cmd_approve(
    session: &Session,
    id: i64,
    by: Option<&str>,
    output: OutputOptions,
) -> Result<()> {
    let user = reviewer(session, by)?;
    let record = session.gateway.approve(id, &user).await?;
    info!(id, user = %user, "discovery approved");

    let json_output = json!({
        "action": "approve",
        "id": id,
        "approved_by": user,
        "discovery": record,
        "success": true,
    });
    let text = format!(
        "Approved {} {}",
        format!("#{id}").cyan(),
        format_status_colored(&record.status)
    );

    CommandOutput::new(json_output)
        .with_text(text)
        .print(output)
}

/// Reject a discovery
pub async fn cmd_reject(
    session: &Session,
    id: i64,
    by: Option<&str>,
    reason: Option<&str>,
    output: OutputOptions,
) -> Result<()> {
    let user = reviewer(session, by)?;
    let reason = match reason {
        Some(reason) => Some(reason.to_string()),
        None => Some(session.config.reject_reason.clone()).filter(|r| !r.is_empty()),
    };
    let record = session
        .gateway
        .reject(id, &user, reason.as_deref())
        .await?;
    info!(id, user = %user, "discovery rejected");

    let json_output = json!({
        "action": "reject",
        "id": id,
        "rejected_by": user,
        "rejection_reason": reason,
        "discovery": record,
        "success": true,
    });
    let text = format!(
        "Rejected {} {}",
        format!("#{id}").cyan(),
        format_status_colored(&record.status)
    );

    CommandOutput::new(json_output)
        .with_text(text)
        .print(output)
}

fn reviewer(session: &Session, by: Option<&str>) -> Result<String> {
    match by {
        Some(user) if user.trim().is_empty() => Err(DiscoveryError::InvalidInput(
            "reviewer identity cannot be empty".to_string(),
        )),
        Some(user) => Ok(user.to_string()),
        None => Ok(session.config.user()),
    }
}
