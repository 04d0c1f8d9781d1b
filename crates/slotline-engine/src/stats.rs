//! Ingestion counters.
//!
//! [`IngestStats`] is written by the ingest thread and read by anyone
//! holding the receiver; [`StatsSnapshot`] is a plain copy for reports
//! and assertions.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters updated by the ingest thread.
///
/// Each counter is individually atomic; a [`snapshot`](Self::snapshot)
/// taken while ingestion runs is not a consistent cut across counters.
#[derive(Debug, Default)]
pub struct IngestStats {
    frames: AtomicU64,
    evicted: AtomicU64,
    dropped: AtomicU64,
    bytes: AtomicU64,
    timeouts: AtomicU64,
}

impl IngestStats {
    /// All counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_stored(&self, len: usize, evicted: bool) {
        self.frames.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(len as u64, Ordering::Relaxed);
        if evicted {
            self.evicted.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the current counter values.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            frames: self.frames.load(Ordering::Relaxed),
            evicted: self.evicted.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            bytes: self.bytes.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`IngestStats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct StatsSnapshot {
    /// Frames stored in the queue.
    pub frames: u64,
    /// Buffered frames discarded to make room
    /// ([`EvictOldest`](crate::OverflowPolicy::EvictOldest)).
    pub evicted: u64,
    /// Incoming frames discarded on a full pool
    /// ([`DropNewest`](crate::OverflowPolicy::DropNewest)).
    pub dropped: u64,
    /// Bytes stored across all frames.
    pub bytes: u64,
    /// Transport reads that timed out with no data.
    pub timeouts: u64,
}

impl StatsSnapshot {
    /// Frames that reached the ingest thread, stored or not.
    pub fn received(&self) -> u64 {
        self.frames + self.dropped
    }
}
