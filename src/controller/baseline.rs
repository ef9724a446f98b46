//! New-record detection baseline.
//!
//! The baseline is the last total seen for the unfiltered first page. Totals
//! from filtered or later pages never reach it, so they cannot produce false
//! "new records" signals.

use crate::gateway::ListQuery;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Baseline {
    previous: u64,
}

impl Baseline {
    pub fn value(&self) -> u64 {
        self.previous
    }

    /// Record the total returned for `query`.
    ///
    /// Returns the number of newly arrived records when the query is the
    /// unfiltered first page, a baseline exists and the total grew. The
    /// baseline moves to `total` whenever the query is the unfiltered first
    /// page, whether or not anything is announced.
    pub fn observe(&mut self, query: &ListQuery, total: u64) -> Option<u64> {
        if !query.is_unfiltered_first_page() {
            return None;
        }

        let previous = self.previous;
        self.previous = total;
        (previous > 0 && total > previous).then(|| total - previous)
    }

    /// Overwrite the baseline after a manual scan trigger.
    // NOTE: this hides "N new" for records the triggered scan itself produced.
    pub fn reset_to(&mut self, total: u64) {
        self.previous = total;
    }
}
