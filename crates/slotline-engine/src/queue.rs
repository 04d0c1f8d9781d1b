//! Lock-protected shared frame queue.
//!
//! [`FrameQueue`] wraps a [`SlotDeque`] in a single `parking_lot`
//! mutex. Every operation that touches linkage, occupancy or slot
//! bytes runs inside that one critical section, so a consumer never
//! sees a half-written slot or the gap between evicting the oldest
//! frame and inserting the new one.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use slotline_arena::{PoolConfig, SlotDeque, SlotRef};
use slotline_core::{ConfigError, FrameSeq, RxStatus};

use crate::config::{IngestDirection, OverflowPolicy};
use crate::frame::Frame;
use crate::readiness::Readiness;

/// Outcome of [`FrameQueue::publish`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Publish {
    /// The frame was stored.
    Stored {
        /// Sequence number assigned to the new frame.
        seq: FrameSeq,
        /// Sequence number of the frame evicted to make room, if any.
        evicted: Option<FrameSeq>,
    },
    /// The pool was full under [`OverflowPolicy::DropNewest`]; the new
    /// frame was discarded.
    Dropped,
}

impl Publish {
    /// Whether the frame was stored.
    pub fn is_stored(&self) -> bool {
        matches!(self, Self::Stored { .. })
    }
}

/// A bounded frame queue shared by one producer and one consumer.
///
/// Producers insert at the configured [`IngestDirection`]; "oldest"
/// and "newest" in the consumer API are relative to that direction.
pub struct FrameQueue {
    deque: Mutex<SlotDeque>,
    published: Condvar,
    direction: IngestDirection,
    capacity: usize,
    slot_size: usize,
}

// Compile-time assertion: FrameQueue must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<FrameQueue>();
};

impl FrameQueue {
    /// Allocate the slot pool and an empty queue.
    pub fn new(pool: &PoolConfig, direction: IngestDirection) -> Result<Self, ConfigError> {
        let deque = SlotDeque::new(pool)?;
        Ok(Self {
            capacity: deque.capacity(),
            slot_size: deque.item_size(),
            deque: Mutex::new(deque),
            published: Condvar::new(),
            direction,
        })
    }

    /// Store `bytes` as the newest frame.
    ///
    /// On a full pool, [`EvictOldest`](OverflowPolicy::EvictOldest)
    /// discards the oldest frame first; both steps happen under the same
    /// lock. Input longer than a slot is truncated.
    pub fn publish(&self, bytes: &[u8], policy: OverflowPolicy) -> Publish {
        let (seq, evicted, stored) = {
            let mut deque = self.deque.lock();
            let mut evicted = None;
            if deque.is_full() {
                match policy {
                    OverflowPolicy::DropNewest => return Publish::Dropped,
                    OverflowPolicy::EvictOldest => {
                        evicted = self.direction.oldest(&deque).map(|s| s.seq());
                        self.direction.pop_oldest(&mut deque);
                    }
                }
            }
            let Some(mut slot) = self.direction.push(&mut deque) else {
                return Publish::Dropped;
            };
            let stored = slot.fill_from(bytes);
            (slot.seq(), evicted, stored)
        };
        self.published.notify_all();

        if stored < bytes.len() {
            tracing::warn!(
                seq = %seq,
                len = bytes.len(),
                slot_size = self.slot_size,
                "Frame truncated to slot size"
            );
        }
        Publish::Stored { seq, evicted }
    }

    /// Remove and return the oldest frame.
    pub fn pop_oldest(&self) -> Option<Frame> {
        let mut deque = self.deque.lock();
        self.take_oldest(&mut deque)
    }

    /// Remove and return the newest frame.
    pub fn pop_newest(&self) -> Option<Frame> {
        let mut deque = self.deque.lock();
        let frame = self.direction.newest(&deque).map(Frame::from_slot)?;
        self.direction.pop_newest(&mut deque);
        Some(frame)
    }

    /// Copy the oldest frame without removing it.
    pub fn peek_oldest(&self) -> Option<Frame> {
        self.with_oldest(Frame::from_slot)
    }

    /// Copy the newest frame without removing it.
    pub fn peek_newest(&self) -> Option<Frame> {
        let deque = self.deque.lock();
        self.direction.newest(&deque).map(Frame::from_slot)
    }

    /// Run `f` on the oldest slot in place, without copying.
    ///
    /// The queue is locked while `f` runs; the producer blocks until
    /// it returns.
    pub fn with_oldest<R>(&self, f: impl FnOnce(SlotRef<'_>) -> R) -> Option<R> {
        let deque = self.deque.lock();
        self.direction.oldest(&deque).map(f)
    }

    /// Wait up to `timeout` for a frame, then pop the oldest.
    ///
    /// Returns immediately if a frame is already buffered, and `None`
    /// if the timeout elapses with the queue still empty.
    pub fn wait_oldest(&self, timeout: Duration) -> Option<Frame> {
        let mut deque = self.deque.lock();
        match Instant::now().checked_add(timeout) {
            Some(deadline) => {
                while deque.is_empty() {
                    if self.published.wait_until(&mut deque, deadline).timed_out() {
                        break;
                    }
                }
            }
            None => {
                while deque.is_empty() {
                    self.published.wait(&mut deque);
                }
            }
        }
        self.take_oldest(&mut deque)
    }

    /// Remove every frame, oldest first.
    pub fn drain(&self) -> Vec<Frame> {
        let mut deque = self.deque.lock();
        let mut frames = Vec::with_capacity(deque.len());
        while let Some(frame) = self.take_oldest(&mut deque) {
            frames.push(frame);
        }
        frames
    }

    /// Run `f` with exclusive access to the underlying deque.
    pub fn with_deque<R>(&self, f: impl FnOnce(&mut SlotDeque) -> R) -> R {
        let mut deque = self.deque.lock();
        f(&mut deque)
    }

    /// Readiness for the current occupancy. Non-blocking snapshot; a
    /// following pop may still find the queue empty.
    pub fn status(&self, readiness: &Readiness) -> RxStatus {
        readiness.status(self.len())
    }

    /// Number of buffered frames.
    pub fn len(&self) -> usize {
        self.deque.lock().len()
    }

    /// Whether no frame is buffered.
    pub fn is_empty(&self) -> bool {
        self.deque.lock().is_empty()
    }

    /// Maximum number of buffered frames.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Size of each slot in bytes.
    pub fn slot_size(&self) -> usize {
        self.slot_size
    }

    /// The producer's insertion end.
    pub fn direction(&self) -> IngestDirection {
        self.direction
    }

    fn take_oldest(&self, deque: &mut SlotDeque) -> Option<Frame> {
        let frame = self.direction.oldest(deque).map(Frame::from_slot)?;
        self.direction.pop_oldest(deque);
        Some(frame)
    }
}

impl std::fmt::Debug for FrameQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameQueue")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .field("slot_size", &self.slot_size)
            .field("direction", &self.direction)
            .finish()
    }
}
