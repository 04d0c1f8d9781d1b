//! Receiver configuration and validation.
//!
//! [`ReceiverConfig`] is the builder-input for
//! [`FrameReceiver::start`](crate::FrameReceiver::start).
//! [`validate()`](ReceiverConfig::validate) runs before any arena,
//! queue or thread exists.

use std::fmt;
use std::time::Duration;

use slotline_arena::{PoolConfig, SlotDeque, SlotMut, SlotRef};
use slotline_core::ConfigError;

use crate::readiness::Readiness;

// ── OverflowPolicy ────────────────────────────────────────────────

/// What the producer does with a new frame when every slot is occupied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OverflowPolicy {
    /// Discard the oldest unread frame and store the new one.
    #[default]
    EvictOldest,
    /// Keep the buffered frames and discard the new one.
    DropNewest,
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EvictOldest => write!(f, "evict-oldest"),
            Self::DropNewest => write!(f, "drop-newest"),
        }
    }
}

// ── IngestDirection ───────────────────────────────────────────────

/// The deque end the producer inserts at.
///
/// The oldest frame always sits at the opposite end, which is where
/// eviction and the consumer's `*_oldest` operations work.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum IngestDirection {
    /// Insert at the back; oldest frame is at the front.
    #[default]
    PushBack,
    /// Insert at the front; oldest frame is at the back.
    PushFront,
}

impl IngestDirection {
    pub(crate) fn push(self, deque: &mut SlotDeque) -> Option<SlotMut<'_>> {
        match self {
            Self::PushBack => deque.push_back(),
            Self::PushFront => deque.push_front(),
        }
    }

    pub(crate) fn oldest(self, deque: &SlotDeque) -> Option<SlotRef<'_>> {
        match self {
            Self::PushBack => deque.front(),
            Self::PushFront => deque.back(),
        }
    }

    pub(crate) fn newest(self, deque: &SlotDeque) -> Option<SlotRef<'_>> {
        match self {
            Self::PushBack => deque.back(),
            Self::PushFront => deque.front(),
        }
    }

    pub(crate) fn pop_oldest(self, deque: &mut SlotDeque) -> bool {
        match self {
            Self::PushBack => deque.pop_front(),
            Self::PushFront => deque.pop_back(),
        }
    }

    pub(crate) fn pop_newest(self, deque: &mut SlotDeque) -> bool {
        match self {
            Self::PushBack => deque.pop_back(),
            Self::PushFront => deque.pop_front(),
        }
    }
}

impl fmt::Display for IngestDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PushBack => write!(f, "push-back"),
            Self::PushFront => write!(f, "push-front"),
        }
    }
}

// ── ReceiverConfig ────────────────────────────────────────────────

/// Configuration for a [`FrameReceiver`](crate::FrameReceiver).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceiverConfig {
    /// Slot size and slot count. Default: 1024 × 3.
    pub pool: PoolConfig,
    /// Producer insertion end. Default: [`IngestDirection::PushBack`].
    pub direction: IngestDirection,
    /// Full-pool behaviour. Default: [`OverflowPolicy::EvictOldest`].
    pub overflow: OverflowPolicy,
    /// Occupancy reservation for [`RxStatus`](slotline_core::RxStatus).
    /// Default: no reservation.
    pub readiness: Readiness,
    /// Upper bound on one transport read, and therefore on how long
    /// [`stop`](crate::FrameReceiver::stop) waits for the ingest thread
    /// to notice cancellation. Default: 50 ms.
    pub read_timeout: Duration,
}

impl ReceiverConfig {
    /// Default transport read timeout.
    pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(50);

    /// Default config with the given pool.
    pub fn with_pool(pool: PoolConfig) -> Self {
        Self {
            pool,
            ..Self::default()
        }
    }

    /// Check every field. Called by `FrameReceiver::start` before
    /// allocating anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pool.validate()?;
        self.readiness.validate(self.pool.capacity)?;
        if self.read_timeout.is_zero() {
            return Err(ConfigError::ZeroReadTimeout);
        }
        Ok(())
    }
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            pool: PoolConfig::default(),
            direction: IngestDirection::default(),
            overflow: OverflowPolicy::default(),
            readiness: Readiness::default(),
            read_timeout: Self::DEFAULT_READ_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ReceiverConfig::default();
        assert_eq!(config.pool, PoolConfig::default());
        assert_eq!(config.direction, IngestDirection::PushBack);
        assert_eq!(config.overflow, OverflowPolicy::EvictOldest);
        assert_eq!(config.readiness.reserved_slots, 0);
        assert_eq!(config.read_timeout, Duration::from_millis(50));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn pool_errors_surface() {
        let config = ReceiverConfig::with_pool(PoolConfig::new(0, 3));
        assert_eq!(config.validate(), Err(ConfigError::ZeroSlotSize));
    }

    #[test]
    fn reservation_must_leave_a_slot() {
        let config = ReceiverConfig {
            readiness: Readiness::new(3),
            ..ReceiverConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ReservationTooLarge {
                reserved: 3,
                capacity: 3
            })
        );
    }

    #[test]
    fn zero_read_timeout_rejected() {
        let config = ReceiverConfig {
            read_timeout: Duration::ZERO,
            ..ReceiverConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroReadTimeout));
    }

    #[test]
    fn direction_picks_opposite_ends() {
        let mut deque = SlotDeque::new(&PoolConfig::new(1, 3)).unwrap();
        for direction in [IngestDirection::PushBack, IngestDirection::PushFront] {
            deque.clear();
            for b in [1u8, 2, 3] {
                direction.push(&mut deque).unwrap().fill_from(&[b]);
            }
            assert_eq!(direction.oldest(&deque).unwrap().bytes(), &[1]);
            assert_eq!(direction.newest(&deque).unwrap().bytes(), &[3]);
            assert!(direction.pop_oldest(&mut deque));
            assert_eq!(direction.oldest(&deque).unwrap().bytes(), &[2]);
            assert!(direction.pop_newest(&mut deque));
            assert_eq!(direction.newest(&deque).unwrap().bytes(), &[2]);
        }
    }

    #[test]
    fn policy_and_direction_display() {
        assert_eq!(OverflowPolicy::EvictOldest.to_string(), "evict-oldest");
        assert_eq!(OverflowPolicy::DropNewest.to_string(), "drop-newest");
        assert_eq!(IngestDirection::PushFront.to_string(), "push-front");
    }
}
