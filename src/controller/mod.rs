//! Discovery view controller.
//!
//! Owns the client-side view state and keeps it in sync with the service:
//! - an immediate fetch cycle plus a periodic one, re-armed whenever the page,
//!   page size or any filter changes
//! - new-record detection against the unfiltered first-page baseline
//! - approve/reject row actions followed by a full re-fetch
//! - the details dialog
//! - the manual scan trigger: trigger, settle, refresh, then a delayed
//!   follow-up refresh
//!
//! Requests are tagged per channel so late responses never overwrite newer
//! state, and every timer hangs off one cancellation token so nothing touches
//! the state after [`DiscoveryController::teardown`] or after the last handle
//! is dropped.

mod baseline;
pub mod notification;
pub mod schedule;
pub mod sequence;
pub mod state;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use jiff::Timestamp;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

use crate::config::{Config, Timings};
use crate::gateway::{DiscoveryApi, Filters};
use crate::types::TriggerAck;

pub use baseline::Baseline;
pub use notification::{Notification, Severity};
pub use sequence::{Channel, RequestSequencer, RequestTag};
pub use state::{DialogState, FilterField, ViewState};

/// Knobs the controller reads at construction
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub timings: Timings,
    /// Identity sent as approver/rejecter
    pub user: String,
    /// Reason sent with rejections; `None` sends an explicit null
    pub reject_reason: Option<String>,
    pub page_size: u32,
}

impl ControllerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            timings: config.timings.clone(),
            user: config.user(),
            reject_reason: Some(config.reject_reason.clone()).filter(|r| !r.is_empty()),
            page_size: config.page_size,
        }
    }
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Result of [`DiscoveryController::trigger_scan`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Accepted; a follow-up refresh is scheduled
    Started(TriggerAck),
    /// The trigger request failed; one refresh was still run
    Failed(String),
    /// A scan sequence is already running
    AlreadyScanning,
    /// The controller was torn down
    Inactive,
}

struct Shared<A> {
    api: A,
    settings: ControllerSettings,
    state: Mutex<ViewState>,
    sequencer: RequestSequencer,
    lifecycle: CancellationToken,
    poll: Mutex<Option<CancellationToken>>,
    badge_epoch: AtomicU64,
    revision: watch::Sender<u64>,
}

/// Handle to a discovery view.
///
/// Clones share the same view. Dropping the last handle tears the view down.
pub struct DiscoveryController<A> {
    shared: Arc<Shared<A>>,
    _teardown: Arc<DropGuard>,
}

impl<A> Clone for DiscoveryController<A> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            _teardown: Arc::clone(&self._teardown),
        }
    }
}

impl<A: DiscoveryApi + 'static> DiscoveryController<A> {
    pub fn new(api: A, settings: ControllerSettings) -> Self {
        let lifecycle = CancellationToken::new();
        let (revision, _) = watch::channel(0);
        let shared = Shared {
            api,
            state: Mutex::new(ViewState::with_page_size(settings.page_size)),
            settings,
            sequencer: RequestSequencer::new(),
            lifecycle: lifecycle.clone(),
            poll: Mutex::new(None),
            badge_epoch: AtomicU64::new(0),
            revision,
        };

        Self {
            shared: Arc::new(shared),
            _teardown: Arc::new(lifecycle.drop_guard()),
        }
    }

    /// Start from `filters` instead of an empty filter set; call before `mount`
    pub fn with_filters(self, filters: Filters) -> Self {
        self.shared.update(|s| s.filters = filters);
        self
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.shared.settings
    }

    /// Run the first fetch cycle and start polling
    pub async fn mount(&self) {
        self.shared.rearm().await;
    }

    /// Stop every timer; later completions are ignored
    pub fn teardown(&self) {
        self.shared.teardown();
    }

    pub fn is_active(&self) -> bool {
        !self.shared.lifecycle.is_cancelled()
    }

    /// Copy of the current view state
    pub fn snapshot(&self) -> ViewState {
        self.shared.state.lock().clone()
    }

    /// Revision counter, bumped on every state change
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.revision.subscribe()
    }

    /// One records + stats fetch cycle
    pub async fn refresh(&self) {
        self.shared.refresh().await;
    }

    pub async fn set_page(&self, page: u32) {
        self.change(|s| s.set_page(page)).await;
    }

    pub async fn next_page(&self) {
        self.change(ViewState::next_page).await;
    }

    pub async fn previous_page(&self) {
        self.change(ViewState::previous_page).await;
    }

    pub async fn set_page_size(&self, size: u32) {
        self.change(|s| s.set_page_size(size)).await;
    }

    pub async fn set_filter(&self, field: FilterField, value: &str) {
        self.change(|s| s.set_filter(field, value)).await;
    }

    pub async fn set_search(&self, value: &str) {
        self.set_filter(FilterField::Search, value).await;
    }

    pub async fn set_status(&self, value: &str) {
        self.set_filter(FilterField::Status, value).await;
    }

    pub async fn set_environment(&self, value: &str) {
        self.set_filter(FilterField::Environment, value).await;
    }

    pub async fn set_data_source_type(&self, value: &str) {
        self.set_filter(FilterField::DataSourceType, value).await;
    }

    pub async fn clear_filters(&self) {
        self.change(ViewState::clear_filters).await;
    }

    /// Approve a record; returns whether the service accepted it
    pub async fn approve(&self, id: i64) -> bool {
        self.shared.approve(id).await
    }

    /// Reject a record; returns whether the service accepted it
    pub async fn reject(&self, id: i64) -> bool {
        self.shared.reject(id).await
    }

    pub async fn open_details(&self, id: i64) {
        self.shared.open_details(id).await;
    }

    pub fn close_details(&self) {
        self.shared.close_details();
    }

    pub fn dismiss_notification(&self) {
        self.shared.update(ViewState::dismiss_notification);
    }

    /// Trigger a backend scan and refresh around it
    pub async fn trigger_scan(&self) -> ScanOutcome {
        self.shared.trigger_scan().await
    }

    /// Apply a view change and re-arm polling if anything changed
    async fn change(&self, f: impl FnOnce(&mut ViewState) -> bool) {
        if self.shared.update(f) == Some(true) {
            self.shared.rearm().await;
        }
    }
}

impl<A: DiscoveryApi + 'static> Shared<A> {
    /// Mutate the state unless torn down, then publish a new revision
    fn update<R>(&self, f: impl FnOnce(&mut ViewState) -> R) -> Option<R> {
        let result = {
            let mut state = self.state.lock();
            if self.lifecycle.is_cancelled() {
                return None;
            }
            f(&mut state)
        };
        self.revision.send_modify(|revision| *revision += 1);
        Some(result)
    }

    fn issue(&self, channel: Channel) -> Option<RequestTag> {
        let _state = self.state.lock();
        if self.lifecycle.is_cancelled() {
            return None;
        }
        Some(self.sequencer.issue(channel))
    }

    fn teardown(&self) {
        let _state = self.state.lock();
        if !self.lifecycle.is_cancelled() {
            debug!("tearing down discovery view");
        }
        self.lifecycle.cancel();
    }

    /// Cancel the current poll timer, start a fresh one and fetch right away
    async fn rearm(self: &Arc<Self>) {
        let token = {
            let mut slot = self.poll.lock();
            if let Some(previous) = slot.take() {
                previous.cancel();
            }
            if self.lifecycle.is_cancelled() {
                return;
            }
            let token = self.lifecycle.child_token();
            *slot = Some(token.clone());
            token
        };

        let this = Arc::clone(self);
        schedule::spawn_periodic(token, self.settings.timings.poll_interval(), move || {
            let this = Arc::clone(&this);
            async move { this.poll_cycle().await }
        });

        self.poll_cycle().await;
    }

    async fn poll_cycle(self: &Arc<Self>) {
        self.refresh().await;
        self.update(|s| s.last_refreshed = Some(Timestamp::now()));
    }

    async fn refresh(self: &Arc<Self>) {
        tokio::join!(self.fetch_records(), self.fetch_stats());
    }

    async fn fetch_records(self: &Arc<Self>) {
        let Some((tag, query)) = self.update(|s| {
            s.loading = true;
            (self.sequencer.issue(Channel::Records), s.view_query())
        }) else {
            return;
        };

        let result = self.api.list_records(&query).await;

        let badge_epoch = self
            .update(|s| {
                if !self.sequencer.is_current(tag) {
                    debug!(seq = tag.seq(), "discarding stale records response");
                    return None;
                }
                s.loading = false;

                match result {
                    Ok(page) => {
                        let delta = s.apply_records(&query, page)?;
                        info!(delta, "new discoveries arrived");
                        s.new_arrivals = Some(delta);
                        s.notify(Notification::info(format!(
                            "{delta} new file(s) discovered!"
                        )));
                        Some(self.badge_epoch.fetch_add(1, Ordering::SeqCst) + 1)
                    }
                    Err(e) => {
                        warn!(error = %e, "error fetching discoveries");
                        s.notify(Notification::error("Error fetching discoveries"));
                        None
                    }
                }
            })
            .flatten();

        if let Some(epoch) = badge_epoch {
            self.schedule_badge_clear(epoch);
        }
    }

    fn schedule_badge_clear(self: &Arc<Self>, epoch: u64) {
        let this = Arc::clone(self);
        schedule::spawn_delayed(
            self.lifecycle.clone(),
            self.settings.timings.new_badge(),
            move || async move {
                this.update(|s| {
                    // a newer badge restarts the countdown
                    if this.badge_epoch.load(Ordering::SeqCst) == epoch {
                        s.new_arrivals = None;
                    }
                });
            },
        );
    }

    async fn fetch_stats(self: &Arc<Self>) {
        let Some(tag) = self.issue(Channel::Stats) else {
            return;
        };

        let result = self.api.get_stats().await;

        self.update(|s| {
            if !self.sequencer.is_current(tag) {
                debug!(seq = tag.seq(), "discarding stale stats response");
                return;
            }
            match result {
                Ok(stats) => s.stats = stats,
                Err(e) => warn!(error = %e, "error fetching stats"),
            }
        });
    }

    async fn approve(self: &Arc<Self>, id: i64) -> bool {
        if self.lifecycle.is_cancelled() {
            return false;
        }
        match self.api.approve(id, &self.settings.user).await {
            Ok(_) => {
                info!(id, user = %self.settings.user, "discovery approved");
                self.update(|s| s.notify(Notification::success("Discovery approved successfully")));
                self.refresh().await;
                true
            }
            Err(e) => {
                warn!(id, error = %e, "error approving discovery");
                self.update(|s| s.notify(Notification::error("Error approving discovery")));
                false
            }
        }
    }

    async fn reject(self: &Arc<Self>, id: i64) -> bool {
        if self.lifecycle.is_cancelled() {
            return false;
        }
        let reason = self.settings.reject_reason.as_deref();
        match self.api.reject(id, &self.settings.user, reason).await {
            Ok(_) => {
                info!(id, user = %self.settings.user, "discovery rejected");
                self.update(|s| s.notify(Notification::success("Discovery rejected successfully")));
                self.refresh().await;
                true
            }
            Err(e) => {
                warn!(id, error = %e, "error rejecting discovery");
                self.update(|s| s.notify(Notification::error("Error rejecting discovery")));
                false
            }
        }
    }

    async fn open_details(self: &Arc<Self>, id: i64) {
        let Some(tag) = self.update(|s| {
            s.dialog = DialogState::opening(id);
            self.sequencer.issue(Channel::Dialog)
        }) else {
            return;
        };

        let result = self.api.get_record(id).await;

        self.update(|s| {
            if !self.sequencer.is_current(tag) {
                debug!(id, "discarding stale details response");
                return;
            }
            match result {
                Ok(record) => s.dialog.record = Some(record),
                Err(e) => {
                    warn!(id, error = %e, "error loading discovery details");
                    s.notify(Notification::error("Error loading discovery details"));
                    s.dialog.open = false;
                }
            }
            s.dialog.loading = false;
        });
    }

    fn close_details(&self) {
        self.update(|s| {
            self.sequencer.invalidate(Channel::Dialog);
            s.dialog = DialogState::default();
        });
    }

    async fn trigger_scan(self: &Arc<Self>) -> ScanOutcome {
        let entered = self.update(|s| {
            if s.scanning {
                return false;
            }
            s.scanning = true;
            true
        });
        match entered {
            None => return ScanOutcome::Inactive,
            Some(false) => return ScanOutcome::AlreadyScanning,
            Some(true) => {}
        }

        let ack = match self.api.trigger_scan().await {
            Ok(ack) => ack,
            Err(e) => {
                warn!(error = %e, "error triggering discovery");
                let message = e.to_string();
                self.update(|s| {
                    s.notify(Notification::error(format!(
                        "Error triggering discovery: {message}"
                    )));
                    s.scanning = false;
                });
                // still show whatever the service has now
                self.refresh().await;
                return ScanOutcome::Failed(message);
            }
        };

        info!(status = ?ack.status, "discovery scan triggered");
        self.update(|s| {
            s.notify(Notification::info(
                "Discovery scan started. Refreshing data...",
            ))
        });

        let settle = self.settings.timings.scan_settle();
        if !schedule::sleep_or_cancel(&self.lifecycle, settle).await {
            return ScanOutcome::Inactive;
        }

        self.refresh().await;
        self.update(|s| {
            s.last_refreshed = Some(Timestamp::now());
            let total = s.pagination.total;
            s.baseline.reset_to(total);
        });

        let this = Arc::clone(self);
        schedule::spawn_delayed(
            self.lifecycle.clone(),
            self.settings.timings.scan_followup(),
            move || async move {
                this.refresh().await;
                this.update(|s| {
                    s.notify(Notification::success("Discovery complete. Data refreshed."));
                    s.scanning = false;
                });
            },
        );

        ScanOutcome::Started(ack)
    }
}
