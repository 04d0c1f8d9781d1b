//! Ingestion loop: transport reads, overflow handling, and publication.
//!
//! The ingest thread owns its [`FrameSource`] exclusively (moved in via
//! `thread::Builder::spawn`). Each read lands in a private scratch
//! buffer of one slot's size; only a completed read touches the shared
//! queue, so cancellation can never strand an acquired slot.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use slotline_core::{FrameSource, TransportError};

use crate::config::OverflowPolicy;
use crate::queue::{FrameQueue, Publish};
use crate::stats::{IngestStats, StatsSnapshot};

/// Why the ingestion loop ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IngestExit {
    /// The shutdown flag was observed.
    Cancelled,
    /// The transport reported end of stream.
    SourceClosed,
    /// The transport failed; no further reads were attempted.
    Failed(TransportError),
}

/// Summary returned by the ingest thread through its `JoinHandle`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IngestReport {
    /// Counters at the moment the loop ended.
    pub stats: StatsSnapshot,
    /// Why the loop ended.
    pub exit: IngestExit,
}

/// One-shot "ingest loop has ended" signal that waiters can block on.
#[derive(Debug, Default)]
pub(crate) struct StopLatch {
    stopped: Mutex<bool>,
    cond: Condvar,
}

impl StopLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) {
        *self.stopped.lock() = true;
        self.cond.notify_all();
    }

    pub fn is_set(&self) -> bool {
        *self.stopped.lock()
    }

    /// Block until set or `timeout` elapses. Returns whether it was set.
    pub fn wait(&self, timeout: Duration) -> bool {
        let mut stopped = self.stopped.lock();
        match Instant::now().checked_add(timeout) {
            Some(deadline) => {
                while !*stopped {
                    if self.cond.wait_until(&mut stopped, deadline).timed_out() {
                        break;
                    }
                }
            }
            None => {
                while !*stopped {
                    self.cond.wait(&mut stopped);
                }
            }
        }
        *stopped
    }
}

/// State held by the ingest thread's main loop.
pub(crate) struct IngestState<S> {
    source: S,
    queue: Arc<FrameQueue>,
    stats: Arc<IngestStats>,
    shutdown_flag: Arc<AtomicBool>,
    ingest_stopped: Arc<StopLatch>,
    overflow: OverflowPolicy,
    read_timeout: Duration,
    scratch: Vec<u8>,
    idle_reads: u64,
}

impl<S: FrameSource> IngestState<S> {
    pub fn new(
        source: S,
        queue: Arc<FrameQueue>,
        stats: Arc<IngestStats>,
        shutdown_flag: Arc<AtomicBool>,
        ingest_stopped: Arc<StopLatch>,
        overflow: OverflowPolicy,
        read_timeout: Duration,
    ) -> Self {
        let scratch = vec![0u8; queue.slot_size()];
        Self {
            source,
            queue,
            stats,
            shutdown_flag,
            ingest_stopped,
            overflow,
            read_timeout,
            scratch,
            idle_reads: 0,
        }
    }

    /// Main ingest loop. Runs until shutdown, end of stream, or a
    /// transport failure.
    pub fn run(mut self) -> IngestReport {
        let exit = loop {
            if self.shutdown_flag.load(Ordering::Acquire) {
                break IngestExit::Cancelled;
            }

            match self.source.recv_frame(&mut self.scratch, self.read_timeout) {
                Ok(Some(0)) => {}
                Ok(Some(n)) => self.publish(n.min(self.scratch.len())),
                Ok(None) => {
                    self.idle_reads += 1;
                    self.stats.record_timeout();
                }
                Err(TransportError::Closed) => {
                    tracing::info!("Transport reached end of stream");
                    break IngestExit::SourceClosed;
                }
                Err(err) => {
                    tracing::error!(error = %err, "Transport failed, stopping ingestion");
                    break IngestExit::Failed(err);
                }
            }
        };

        self.ingest_stopped.set();
        IngestReport {
            stats: self.stats.snapshot(),
            exit,
        }
    }

    fn publish(&mut self, len: usize) {
        if self.idle_reads > 0 {
            tracing::debug!(timeouts = self.idle_reads, "Line active after idle reads");
            self.idle_reads = 0;
        }
        match self.queue.publish(&self.scratch[..len], self.overflow) {
            Publish::Stored { seq, evicted } => {
                if let Some(old) = evicted {
                    tracing::debug!(evicted = %old, stored = %seq, "Evicted oldest frame");
                }
                self.stats.record_stored(len, evicted.is_some());
            }
            Publish::Dropped => {
                tracing::warn!(len, "Pool full, dropped incoming frame");
                self.stats.record_dropped();
            }
        }
    }
}
