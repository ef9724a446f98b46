//! Transient notifications
//!
//! A notification replaces whatever was showing before; nothing is queued.

use std::time::Duration;

use tokio::time::Instant;

/// A notification message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// The message to display
    pub message: String,
    /// The severity level
    pub severity: Severity,
    /// When the notification was raised
    pub raised_at: Instant,
}

/// Severity level for notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Error,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Info => "info",
            Severity::Error => "error",
        }
    }
}

impl Notification {
    pub fn new(message: String, severity: Severity) -> Self {
        Self {
            message,
            severity,
            raised_at: Instant::now(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message.into(), Severity::Success)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message.into(), Severity::Info)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message.into(), Severity::Error)
    }

    /// True once the notification has been visible for `ttl`
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.raised_at.elapsed() >= ttl
    }
}
