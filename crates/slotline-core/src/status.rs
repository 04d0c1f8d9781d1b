//! Coarse receive-status signal exposed to the consumer.

use std::fmt;

/// Whether buffered frames are waiting to be consumed.
///
/// This is an approximate, non-blocking signal derived from pool
/// occupancy, not a per-frame notification. A consumer that reads
/// `Ready` must still handle a subsequent pop returning nothing: the
/// producer may have evicted the frame in between.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RxStatus {
    /// Occupancy exceeds the configured reservation.
    Ready,
    /// Nothing beyond the reservation is buffered.
    Idle,
}

impl RxStatus {
    /// Shorthand for `self == RxStatus::Ready`.
    pub fn is_ready(self) -> bool {
        self == Self::Ready
    }
}

impl fmt::Display for RxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => write!(f, "ready"),
            Self::Idle => write!(f, "idle"),
        }
    }
}
