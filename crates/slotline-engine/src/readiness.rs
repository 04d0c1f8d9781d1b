//! Coarse consumer readiness signal.

use slotline_core::{ConfigError, RxStatus};

/// Occupancy threshold for [`RxStatus::Ready`].
///
/// `Ready` means more than `reserved_slots` frames are buffered. The
/// default reservation of 0 reports `Ready` as soon as one frame is
/// buffered. [`Readiness::LEGACY`] reserves one slot, i.e. `Ready` only
/// with at least two frames buffered, and reports `Idle` on an empty
/// pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Readiness {
    /// Number of buffered frames that still count as idle.
    pub reserved_slots: usize,
}

impl Readiness {
    /// One reserved slot: ready only with two or more frames buffered.
    pub const LEGACY: Self = Self { reserved_slots: 1 };

    /// Readiness with the given reservation.
    pub fn new(reserved_slots: usize) -> Self {
        Self { reserved_slots }
    }

    /// Status for `occupancy` buffered frames. Never underflows.
    pub fn status(&self, occupancy: usize) -> RxStatus {
        if occupancy > self.reserved_slots {
            RxStatus::Ready
        } else {
            RxStatus::Idle
        }
    }

    /// Reject a reservation that would keep the status `Idle` forever.
    pub fn validate(&self, capacity: usize) -> Result<(), ConfigError> {
        if self.reserved_slots >= capacity {
            return Err(ConfigError::ReservationTooLarge {
                reserved: self.reserved_slots,
                capacity,
            });
        }
        Ok(())
    }
}
