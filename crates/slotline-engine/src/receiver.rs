//! User-facing `FrameReceiver` API and stop sequence.
//!
//! The receiver runs the ingestion loop on a dedicated background
//! thread and hands the consumer a shared [`FrameQueue`].
//!
//! # Lifecycle
//!
//! ```text
//! start(source, config)
//!     validate config        -> ConfigError, nothing allocated
//!     build FrameQueue
//!     spawn "slotline-ingest" -> JoinHandle<IngestReport>
//!
//! stop()
//!     Running -> Stopping: set shutdown flag, unpark ingest thread
//!     Stopping -> Stopped: join (≤ one read timeout), keep IngestReport
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use slotline_core::{ConfigError, FrameSource, RxStatus};

use crate::config::ReceiverConfig;
use crate::frame::Frame;
use crate::ingest::{IngestReport, IngestState, StopLatch};
use crate::queue::FrameQueue;
use crate::readiness::Readiness;
use crate::stats::{IngestStats, StatsSnapshot};

// ── StopReport ───────────────────────────────────────────────────

/// Report from [`FrameReceiver::stop`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StopReport {
    /// Time spent in the stop sequence.
    pub total_ms: u64,
    /// Time from start to the beginning of the stop sequence.
    pub uptime_ms: u64,
    /// Whether the ingest thread was joined without panicking.
    pub joined: bool,
    /// The ingest thread's report; `None` if it panicked.
    pub ingest: Option<IngestReport>,
}

// ── ReceiverState ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReceiverState {
    Running,
    Stopped,
}

// ── FrameReceiver ────────────────────────────────────────────────

/// Background frame receiver.
///
/// Owns the ingestion thread and exposes the consumer side of the
/// shared queue. Dropping the receiver stops the thread.
pub struct FrameReceiver {
    queue: Arc<FrameQueue>,
    stats: Arc<IngestStats>,
    readiness: Readiness,
    shutdown_flag: Arc<AtomicBool>,
    ingest_stopped: Arc<StopLatch>,
    ingest_thread: Option<JoinHandle<IngestReport>>,
    state: ReceiverState,
    started: Instant,
    /// Kept so repeated `stop()` calls report the same outcome.
    last_report: Option<StopReport>,
}

impl FrameReceiver {
    /// Validate `config`, build the queue, and start ingesting from
    /// `source` on a thread named `slotline-ingest`.
    pub fn start<S>(source: S, config: ReceiverConfig) -> Result<Self, ConfigError>
    where
        S: FrameSource + Send + 'static,
    {
        config.validate()?;

        let queue = Arc::new(FrameQueue::new(&config.pool, config.direction)?);
        let stats = Arc::new(IngestStats::new());
        let shutdown_flag = Arc::new(AtomicBool::new(false));
        let ingest_stopped = Arc::new(StopLatch::new());

        let state = IngestState::new(
            source,
            Arc::clone(&queue),
            Arc::clone(&stats),
            Arc::clone(&shutdown_flag),
            Arc::clone(&ingest_stopped),
            config.overflow,
            config.read_timeout,
        );
        let ingest_thread = thread::Builder::new()
            .name("slotline-ingest".into())
            .spawn(move || state.run())
            .map_err(|e| ConfigError::ThreadSpawnFailed {
                reason: format!("slotline-ingest: {e}"),
            })?;

        tracing::info!(
            capacity = config.pool.capacity,
            slot_size = config.pool.slot_size,
            direction = %config.direction,
            overflow = %config.overflow,
            reserved_slots = config.readiness.reserved_slots,
            "Frame receiver started"
        );

        Ok(Self {
            queue,
            stats,
            readiness: config.readiness,
            shutdown_flag,
            ingest_stopped,
            ingest_thread: Some(ingest_thread),
            state: ReceiverState::Running,
            started: Instant::now(),
            last_report: None,
        })
    }

    /// Coarse readiness from current occupancy. Non-blocking; a
    /// following pop may still return `None`.
    pub fn status(&self) -> RxStatus {
        self.queue.status(&self.readiness)
    }

    /// The shared queue, for consumers that outlive this handle's
    /// borrow or need the full queue API.
    pub fn queue(&self) -> &Arc<FrameQueue> {
        &self.queue
    }

    /// Remove and return the oldest buffered frame.
    pub fn pop_oldest(&self) -> Option<Frame> {
        self.queue.pop_oldest()
    }

    /// Copy the oldest buffered frame without removing it.
    pub fn peek_oldest(&self) -> Option<Frame> {
        self.queue.peek_oldest()
    }

    /// Wait up to `timeout` for a frame, then pop the oldest.
    pub fn wait_oldest(&self, timeout: Duration) -> Option<Frame> {
        self.queue.wait_oldest(timeout)
    }

    /// Current ingestion counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Whether the ingest thread is still running its loop.
    pub fn is_ingesting(&self) -> bool {
        self.state == ReceiverState::Running && !self.ingest_stopped.is_set()
    }

    /// Wait up to `timeout` for the ingest thread to end on its own
    /// (end of stream or transport failure). Returns whether it did.
    pub fn wait_until_stopped(&self, timeout: Duration) -> bool {
        self.ingest_stopped.wait(timeout)
    }

    /// Stop ingestion and join the thread.
    ///
    /// 1. **Running → Stopping:** set the shutdown flag and unpark the
    ///    ingest thread. The loop observes the flag within one read
    ///    timeout.
    /// 2. **Stopping → Stopped:** join the thread and recover its
    ///    [`IngestReport`].
    ///
    /// Buffered frames stay in the queue. Calling `stop` again returns
    /// the first report.
    pub fn stop(&mut self) -> StopReport {
        if self.state == ReceiverState::Stopped {
            if let Some(report) = &self.last_report {
                return report.clone();
            }
        }

        let start = Instant::now();
        let uptime_ms = start.duration_since(self.started).as_millis() as u64;

        self.shutdown_flag.store(true, Ordering::Release);
        if let Some(handle) = &self.ingest_thread {
            handle.thread().unpark();
        }

        let (joined, ingest) = match self.ingest_thread.take() {
            Some(handle) => match handle.join() {
                Ok(report) => (true, Some(report)),
                Err(_) => {
                    tracing::error!("Ingest thread panicked");
                    (false, None)
                }
            },
            None => (true, None),
        };
        self.state = ReceiverState::Stopped;

        let report = StopReport {
            total_ms: start.elapsed().as_millis() as u64,
            uptime_ms,
            joined,
            ingest,
        };
        match &report.ingest {
            Some(ingest) => tracing::info!(
                frames = ingest.stats.frames,
                evicted = ingest.stats.evicted,
                dropped = ingest.stats.dropped,
                exit = ?ingest.exit,
                stop_ms = report.total_ms,
                "Frame receiver stopped"
            ),
            None => tracing::info!(stop_ms = report.total_ms, "Frame receiver stopped"),
        }
        self.last_report = Some(report.clone());
        report
    }
}

impl Drop for FrameReceiver {
    fn drop(&mut self) {
        if self.state != ReceiverState::Stopped {
            self.stop();
        }
    }
}

impl std::fmt::Debug for FrameReceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameReceiver")
            .field("queue", &self.queue)
            .field("readiness", &self.readiness)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
