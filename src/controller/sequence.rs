//! Per-channel request tags.
//!
//! Every request is tagged with the next number on its channel. A completion is
//! applied only while its tag is still the newest one issued there, so
//! responses that arrive out of order are dropped instead of overwriting newer
//! state.

use std::sync::atomic::{AtomicU64, Ordering};

/// Logical request channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Records,
    Stats,
    Dialog,
}

/// Tag handed out when a request is issued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTag {
    channel: Channel,
    seq: u64,
}

impl RequestTag {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Default)]
pub struct RequestSequencer {
    records: AtomicU64,
    stats: AtomicU64,
    dialog: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, channel: Channel) -> &AtomicU64 {
        match channel {
            Channel::Records => &self.records,
            Channel::Stats => &self.stats,
            Channel::Dialog => &self.dialog,
        }
    }

    pub fn issue(&self, channel: Channel) -> RequestTag {
        let seq = self.slot(channel).fetch_add(1, Ordering::SeqCst) + 1;
        RequestTag { channel, seq }
    }

    pub fn is_current(&self, tag: RequestTag) -> bool {
        self.slot(tag.channel).load(Ordering::SeqCst) == tag.seq
    }

    /// Make every outstanding tag on `channel` stale
    pub fn invalidate(&self, channel: Channel) {
        self.slot(channel).fetch_add(1, Ordering::SeqCst);
    }
}
