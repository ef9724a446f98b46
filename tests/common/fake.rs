//! In-memory discovery service for controller tests.
//!
//! Counts every call, can be told to fail any operation, and can delay list or
//! get calls so tests can line up out-of-order completions on tokio's paused
//! clock.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::json;

use discovery_console::controller::ControllerSettings;
use discovery_console::error::{DiscoveryError, Result};
use discovery_console::gateway::{DiscoveryApi, ListQuery};
use discovery_console::types::{
    DiscoveryRecord, Pagination, RecordPage, RecordStatus, Stats, TriggerAck,
};
use discovery_console::Timings;

pub const REVIEWER: &str = "reviewer@example.com";

/// Settings with default timings and a fixed reviewer identity
pub fn settings() -> ControllerSettings {
    ControllerSettings {
        timings: Timings::default(),
        user: REVIEWER.to_string(),
        reject_reason: Some("Rejected by user".to_string()),
        page_size: 50,
    }
}

/// Let spawned tasks run up to their next await point
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

#[derive(Default)]
struct FakeState {
    total: AtomicU64,

    fail_list: AtomicBool,
    fail_stats: AtomicBool,
    fail_get: AtomicBool,
    fail_approve: AtomicBool,
    fail_reject: AtomicBool,
    fail_trigger: AtomicBool,

    list_delays: Mutex<VecDeque<Duration>>,
    get_delay: Mutex<Option<Duration>>,

    list_calls: Mutex<Vec<ListQuery>>,
    stats_calls: AtomicUsize,
    get_calls: AtomicUsize,
    approvals: Mutex<Vec<(i64, String)>>,
    rejections: Mutex<Vec<(i64, String, Option<String>)>>,
    trigger_calls: AtomicUsize,
}

/// Cheap to clone; clones share counters and behaviour
#[derive(Clone, Default)]
pub struct FakeApi {
    state: Arc<FakeState>,
}

impl FakeApi {
    pub fn with_total(total: u64) -> Self {
        let fake = Self::default();
        fake.set_total(total);
        fake
    }

    pub fn set_total(&self, total: u64) {
        self.state.total.store(total, Ordering::SeqCst);
    }

    pub fn fail_list(&self, fail: bool) {
        self.state.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn fail_stats(&self, fail: bool) {
        self.state.fail_stats.store(fail, Ordering::SeqCst);
    }

    pub fn fail_get(&self, fail: bool) {
        self.state.fail_get.store(fail, Ordering::SeqCst);
    }

    pub fn fail_approve(&self, fail: bool) {
        self.state.fail_approve.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reject(&self, fail: bool) {
        self.state.fail_reject.store(fail, Ordering::SeqCst);
    }

    pub fn fail_trigger(&self, fail: bool) {
        self.state.fail_trigger.store(fail, Ordering::SeqCst);
    }

    /// Delay the next list call by `delay`
    pub fn delay_next_list(&self, delay: Duration) {
        self.state.list_delays.lock().push_back(delay);
    }

    /// Delay every get call by `delay`
    pub fn delay_get(&self, delay: Duration) {
        *self.state.get_delay.lock() = Some(delay);
    }

    pub fn list_calls(&self) -> usize {
        self.state.list_calls.lock().len()
    }

    pub fn last_query(&self) -> Option<ListQuery> {
        self.state.list_calls.lock().last().cloned()
    }

    pub fn stats_calls(&self) -> usize {
        self.state.stats_calls.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.state.get_calls.load(Ordering::SeqCst)
    }

    pub fn approvals(&self) -> Vec<(i64, String)> {
        self.state.approvals.lock().clone()
    }

    pub fn rejections(&self) -> Vec<(i64, String, Option<String>)> {
        self.state.rejections.lock().clone()
    }

    pub fn trigger_calls(&self) -> usize {
        self.state.trigger_calls.load(Ordering::SeqCst)
    }

    fn failure() -> DiscoveryError {
        DiscoveryError::HttpStatus { status: 500 }
    }
}

/// Records on page `p` get ids `p * 100 + 1` onwards
fn page_for(query: &ListQuery, total: u64) -> RecordPage {
    let size = u64::from(query.size.max(1));
    let total_pages = total.div_ceil(size) as u32;
    let start = u64::from(query.page) * size;
    let count = total.saturating_sub(start).min(size).min(3);

    let records = (0..count)
        .map(|i| {
            let mut record = DiscoveryRecord::new(i64::from(query.page) * 100 + i as i64 + 1);
            if !query.filters.status.is_empty() {
                record.status = RecordStatus::from(query.filters.status.clone());
            }
            record
        })
        .collect();

    RecordPage {
        records,
        pagination: Some(Pagination {
            page: query.page,
            size: query.size,
            total,
            total_pages,
        }),
    }
}

impl DiscoveryApi for FakeApi {
    async fn list_records(&self, query: &ListQuery) -> Result<RecordPage> {
        self.state.list_calls.lock().push(query.clone());
        let total = self.state.total.load(Ordering::SeqCst);
        let delay = self.state.list_delays.lock().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.state.fail_list.load(Ordering::SeqCst) {
            return Err(Self::failure());
        }
        Ok(page_for(query, total))
    }

    async fn get_record(&self, id: i64) -> Result<DiscoveryRecord> {
        self.state.get_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.state.get_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.state.fail_get.load(Ordering::SeqCst) {
            return Err(DiscoveryError::RecordNotFound(id));
        }
        let mut record = DiscoveryRecord::new(id);
        record.file_metadata = Some(json!({"basic": {"name": format!("file-{id}.csv")}}));
        Ok(record)
    }

    async fn approve(&self, id: i64, approved_by: &str) -> Result<DiscoveryRecord> {
        if self.state.fail_approve.load(Ordering::SeqCst) {
            return Err(Self::failure());
        }
        self.state
            .approvals
            .lock()
            .push((id, approved_by.to_string()));

        let mut record = DiscoveryRecord::new(id);
        record.status = RecordStatus::Approved;
        record.approved_by = Some(approved_by.to_string());
        Ok(record)
    }

    async fn reject(
        &self,
        id: i64,
        rejected_by: &str,
        reason: Option<&str>,
    ) -> Result<DiscoveryRecord> {
        if self.state.fail_reject.load(Ordering::SeqCst) {
            return Err(Self::failure());
        }
        self.state.rejections.lock().push((
            id,
            rejected_by.to_string(),
            reason.map(str::to_string),
        ));

        let mut record = DiscoveryRecord::new(id);
        record.status = RecordStatus::Rejected;
        record.rejected_by = Some(rejected_by.to_string());
        record.rejection_reason = reason.map(str::to_string);
        Ok(record)
    }

    async fn get_stats(&self) -> Result<Stats> {
        self.state.stats_calls.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_stats.load(Ordering::SeqCst) {
            return Err(Self::failure());
        }
        let total = self.state.total.load(Ordering::SeqCst);
        let mut counts = BTreeMap::new();
        counts.insert("total".to_string(), json!(total));
        counts.insert("pending".to_string(), json!(total / 2));
        Ok(Stats(counts))
    }

    async fn trigger_scan(&self) -> Result<TriggerAck> {
        self.state.trigger_calls.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_trigger.load(Ordering::SeqCst) {
            return Err(Self::failure());
        }
        Ok(TriggerAck {
            accepted: true,
            message: Some("Discovery started".to_string()),
            status: Some("running".to_string()),
        })
    }
}
