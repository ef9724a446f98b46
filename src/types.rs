//! Wire types for the discovery service.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default number of records per page
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Review status of a discovered record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecordStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    /// Any other status the service reports, kept verbatim
    Other(String),
}

impl RecordStatus {
    pub fn as_str(&self) -> &str {
        match self {
            RecordStatus::Pending => "pending",
            RecordStatus::Approved => "approved",
            RecordStatus::Rejected => "rejected",
            RecordStatus::Other(s) => s,
        }
    }
}

impl From<String> for RecordStatus {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "pending" => RecordStatus::Pending,
            "approved" => RecordStatus::Approved,
            "rejected" => RecordStatus::Rejected,
            _ => RecordStatus::Other(s),
        }
    }
}

impl From<RecordStatus> for String {
    fn from(status: RecordStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A discovered data-source entry as returned by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryRecord {
    pub id: i64,
    #[serde(default)]
    pub status: RecordStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_location: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_metadata: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovered_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    /// Every other field the service sent
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DiscoveryRecord {
    /// Minimal pending record, mostly useful for fakes and tests
    pub fn new(id: i64) -> Self {
        Self {
            id,
            status: RecordStatus::Pending,
            approval_status: None,
            environment: None,
            env_type: None,
            data_source_type: None,
            folder_path: None,
            storage_location: None,
            file_metadata: None,
            schema_hash: None,
            discovered_at: None,
            approved_by: None,
            rejected_by: None,
            rejection_reason: None,
            extra: Map::new(),
        }
    }

    /// Human-facing name: file name, then storage path, then `#id`
    pub fn display_name(&self) -> String {
        let file_name = self
            .file_metadata
            .as_ref()
            .and_then(|m| m.pointer("/basic/name"))
            .and_then(Value::as_str);
        if let Some(name) = file_name {
            return name.to_string();
        }

        let path = self.storage_location.as_ref().and_then(|loc| {
            loc.get("path")
                .or_else(|| loc.get("blob_path"))
                .and_then(Value::as_str)
        });
        match path {
            Some(path) => path.to_string(),
            None => format!("#{}", self.id),
        }
    }
}

/// Pagination block of a list response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub size: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub total_pages: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            total: 0,
            total_pages: 0,
        }
    }
}

impl Pagination {
    pub fn with_size(size: u32) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// Clamp a requested page so that `page < total_pages` when pages exist
    pub fn clamp_page(&self, page: u32) -> u32 {
        if self.total_pages > 0 {
            page.min(self.total_pages - 1)
        } else {
            page
        }
    }

    pub fn has_next(&self) -> bool {
        self.page.saturating_add(1) < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 0
    }
}

/// One page of records
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordPage {
    #[serde(default, rename = "discoveries")]
    pub records: Vec<DiscoveryRecord>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Aggregate counts, keyed by whatever dimensions the service reports
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stats(pub BTreeMap<String, Value>);

impl Stats {
    /// Numeric count for a top-level key
    pub fn count(&self, key: &str) -> Option<u64> {
        self.0.get(key).and_then(Value::as_u64)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

/// Answer to a scan trigger
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerAck {
    /// Set by the gateway from the HTTP status, not read from the body
    #[serde(default)]
    pub accepted: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Approve/reject answers come either bare or wrapped with a message
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum ReviewResponse {
    Wrapped {
        discovery: DiscoveryRecord,
        #[allow(dead_code)]
        #[serde(default)]
        message: Option<String>,
    },
    Bare(DiscoveryRecord),
}

impl ReviewResponse {
    pub(crate) fn into_record(self) -> DiscoveryRecord {
        match self {
            ReviewResponse::Wrapped { discovery, .. } => discovery,
            ReviewResponse::Bare(record) => record,
        }
    }
}
