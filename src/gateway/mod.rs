//! Remote data gateway.
//!
//! Each operation maps to exactly one HTTP request against the discovery
//! service. Implementations own no state and never retry; a non-success status
//! is reported as [`DiscoveryError::HttpStatus`](crate::error::DiscoveryError)
//! and timeouts are whatever the caller configured on the client.

pub mod http;
pub mod query;

use std::future::Future;

use crate::error::Result;
use crate::types::{DiscoveryRecord, RecordPage, Stats, TriggerAck};

pub use http::HttpGateway;
pub use query::{Filters, ListQuery};

/// Common interface for talking to the discovery service
pub trait DiscoveryApi: Send + Sync {
    /// Fetch one page of records matching the query
    fn list_records(&self, query: &ListQuery) -> impl Future<Output = Result<RecordPage>> + Send;

    /// Fetch a single record by id
    fn get_record(&self, id: i64) -> impl Future<Output = Result<DiscoveryRecord>> + Send;

    /// Approve a record on behalf of `approved_by`
    fn approve(
        &self,
        id: i64,
        approved_by: &str,
    ) -> impl Future<Output = Result<DiscoveryRecord>> + Send;

    /// Reject a record; a missing reason is sent as an explicit null
    fn reject(
        &self,
        id: i64,
        rejected_by: &str,
        reason: Option<&str>,
    ) -> impl Future<Output = Result<DiscoveryRecord>> + Send;

    /// Fetch aggregate counts
    fn get_stats(&self) -> impl Future<Output = Result<Stats>> + Send;

    /// Ask the service to start a scan; returns once the request is accepted
    fn trigger_scan(&self) -> impl Future<Output = Result<TriggerAck>> + Send;
}
