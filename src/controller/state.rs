//! View state owned by the controller
//!
//! Everything here is plain data with pure transitions so it can be tested
//! without a runtime. The controller wraps it in a mutex and decides when the
//! transitions run.

use jiff::Timestamp;

use crate::gateway::{Filters, ListQuery};
use crate::types::{DiscoveryRecord, Pagination, RecordPage, Stats};

use super::baseline::Baseline;
use super::notification::Notification;

/// Label of the trigger control while idle
pub const REFRESH_LABEL: &str = "Refresh";
/// Label of the trigger control while a scan is running
pub const SCANNING_LABEL: &str = "Scanning...";

/// One of the four filter predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Search,
    Status,
    Environment,
    DataSourceType,
}

/// Details dialog state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DialogState {
    pub open: bool,
    pub loading: bool,
    /// Id the dialog was opened for
    pub requested_id: Option<i64>,
    pub record: Option<DiscoveryRecord>,
}

impl DialogState {
    /// Open and loading, with no stale record visible
    pub fn opening(id: i64) -> Self {
        Self {
            open: true,
            loading: true,
            requested_id: Some(id),
            record: None,
        }
    }
}

/// Snapshot of everything the presentation layer renders
#[derive(Debug, Clone)]
pub struct ViewState {
    pub records: Vec<DiscoveryRecord>,
    pub stats: Stats,
    pub pagination: Pagination,
    pub filters: Filters,
    pub dialog: DialogState,
    pub notification: Option<Notification>,
    /// "N new" badge, cleared automatically after a while
    pub new_arrivals: Option<u64>,
    pub last_refreshed: Option<Timestamp>,
    /// A records fetch is in flight
    pub loading: bool,
    /// The manual trigger sequence is running
    pub scanning: bool,
    pub(crate) baseline: Baseline,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::with_page_size(Pagination::default().size)
    }
}

impl ViewState {
    pub fn with_page_size(size: u32) -> Self {
        Self {
            records: Vec::new(),
            stats: Stats::default(),
            pagination: Pagination::with_size(size.max(1)),
            filters: Filters::default(),
            dialog: DialogState::default(),
            notification: None,
            new_arrivals: None,
            last_refreshed: None,
            loading: false,
            scanning: false,
            baseline: Baseline::default(),
        }
    }

    /// Current new-record baseline
    pub fn baseline(&self) -> u64 {
        self.baseline.value()
    }

    /// The list request matching the current view
    pub fn view_query(&self) -> ListQuery {
        ListQuery::new(
            self.pagination.page,
            self.pagination.size,
            self.filters.clone(),
        )
    }

    /// Apply a list response issued for `query`.
    ///
    /// Returns the number of new records to announce. Records and pagination
    /// are replaced whatever the detection outcome; a response without
    /// pagination keeps the previous pagination.
    pub fn apply_records(&mut self, query: &ListQuery, page: RecordPage) -> Option<u64> {
        let delta = page
            .pagination
            .and_then(|p| self.baseline.observe(query, p.total));

        self.records = page.records;
        if let Some(pagination) = page.pagination {
            self.pagination = pagination;
        }
        delta
    }

    pub fn notify(&mut self, notification: Notification) {
        self.notification = Some(notification);
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    /// Move to `page`; returns whether the view changed
    pub fn set_page(&mut self, page: u32) -> bool {
        let page = self.pagination.clamp_page(page);
        if page == self.pagination.page {
            return false;
        }
        self.pagination.page = page;
        true
    }

    pub fn next_page(&mut self) -> bool {
        if !self.pagination.has_next() {
            return false;
        }
        self.set_page(self.pagination.page + 1)
    }

    pub fn previous_page(&mut self) -> bool {
        if !self.pagination.has_previous() {
            return false;
        }
        self.set_page(self.pagination.page - 1)
    }

    /// Change the page size and go back to the first page
    pub fn set_page_size(&mut self, size: u32) -> bool {
        if size == 0 {
            return false;
        }
        let changed = size != self.pagination.size || self.pagination.page != 0;
        self.pagination.size = size;
        self.pagination.page = 0;
        changed
    }

    /// Change one filter and go back to the first page
    pub fn set_filter(&mut self, field: FilterField, value: &str) -> bool {
        let slot = match field {
            FilterField::Search => &mut self.filters.search,
            FilterField::Status => &mut self.filters.status,
            FilterField::Environment => &mut self.filters.environment,
            FilterField::DataSourceType => &mut self.filters.data_source_type,
        };
        if slot.as_str() == value {
            return false;
        }
        *slot = value.to_string();
        self.pagination.page = 0;
        true
    }

    /// Clear all filters and go back to the first page
    pub fn clear_filters(&mut self) -> bool {
        let changed = !self.filters.is_empty() || self.pagination.page != 0;
        self.filters.clear();
        self.pagination.page = 0;
        changed
    }

    /// Whether the manual trigger may be started now
    pub fn can_trigger(&self) -> bool {
        !self.loading && !self.scanning
    }

    /// Label for the trigger control
    pub fn scan_label(&self) -> &'static str {
        if self.scanning {
            SCANNING_LABEL
        } else {
            REFRESH_LABEL
        }
    }
}
