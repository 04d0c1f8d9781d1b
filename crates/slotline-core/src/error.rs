//! Error types for the slotline frame buffer.
//!
//! Pool-level conditions (a full deque, an empty deque) are not errors:
//! they surface as `Option` results on the deque itself. What remains is
//! organized by subsystem: the stream transport, and configuration
//! validation performed before any buffering infrastructure is built.

use std::io;

use thiserror::Error;

/// Errors from the stream transport collaborator.
///
/// I/O errors are flattened to their description at the transport
/// boundary so that reports carrying a `TransportError` stay `Clone`
/// and comparable.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The device could not be opened.
    #[error("failed to open '{path}': {reason}")]
    Open {
        /// Device path that was being opened.
        path: String,
        /// Description of the underlying failure.
        reason: String,
    },
    /// A read from the device failed.
    #[error("read failed: {reason}")]
    Read {
        /// Description of the underlying failure.
        reason: String,
    },
    /// A write to the device failed.
    #[error("write failed: {reason}")]
    Write {
        /// Description of the underlying failure.
        reason: String,
    },
    /// The stream reached end-of-file; no further bytes will arrive.
    #[error("stream closed by peer")]
    Closed,
    /// The reader feeding this source went away without reporting a cause.
    #[error("transport reader disconnected")]
    Disconnected,
}

impl TransportError {
    /// Build an [`Open`](Self::Open) error from an I/O error.
    pub fn open(path: impl Into<String>, err: &io::Error) -> Self {
        Self::Open {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    /// Build a [`Read`](Self::Read) error from an I/O error.
    pub fn read(err: &io::Error) -> Self {
        Self::Read {
            reason: err.to_string(),
        }
    }

    /// Build a [`Write`](Self::Write) error from an I/O error.
    pub fn write(err: &io::Error) -> Self {
        Self::Write {
            reason: err.to_string(),
        }
    }

    /// Whether the error means the stream ended rather than failed.
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// Errors detected while validating configuration.
///
/// Raised at construction time, before any slot arena, queue, or thread
/// exists. Nothing else in the workspace is allowed to abort start-up.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Data bits outside `{5, 6, 7, 8}`.
    #[error("data bits must be 5, 6, 7 or 8, got {value}")]
    InvalidDataBits {
        /// The rejected value.
        value: u8,
    },
    /// Stop bits outside `{1, 2}`.
    #[error("stop bits must be 1 or 2, got {value}")]
    InvalidStopBits {
        /// The rejected value.
        value: u8,
    },
    /// Parity code outside `{0 = none, 1 = odd, 2 = even}`.
    #[error("parity must be 0 (none), 1 (odd) or 2 (even), got {value}")]
    InvalidParity {
        /// The rejected value.
        value: u8,
    },
    /// Baud rate of zero.
    #[error("baud rate must be positive, got {value}")]
    InvalidBaudRate {
        /// The rejected value.
        value: u32,
    },
    /// Slot size of zero bytes.
    #[error("slot size must be at least 1 byte")]
    ZeroSlotSize,
    /// Pool capacity of zero slots.
    #[error("pool capacity must be at least 1 slot")]
    ZeroCapacity,
    /// Pool capacity does not fit the `u32` slot index space.
    #[error("pool capacity {value} exceeds u32::MAX")]
    CapacityOverflow {
        /// The configured capacity.
        value: usize,
    },
    /// Readiness reservation leaves no slot that could ever report ready.
    #[error("reserved slots ({reserved}) must be below pool capacity ({capacity})")]
    ReservationTooLarge {
        /// Configured reservation.
        reserved: usize,
        /// Configured pool capacity.
        capacity: usize,
    },
    /// A read timeout of zero would turn the ingestion loop into a spin.
    #[error("read timeout must be non-zero")]
    ZeroReadTimeout,
    /// A background thread could not be spawned.
    #[error("thread spawn failed: {reason}")]
    ThreadSpawnFailed {
        /// Description of which thread failed and why.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_from_io_keeps_description() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "no such device");
        let err = TransportError::open("/dev/ttyUSB6", &io_err);
        assert_eq!(
            err.to_string(),
            "failed to open '/dev/ttyUSB6': no such device"
        );
        assert!(!err.is_end_of_stream());
    }

    #[test]
    fn closed_is_end_of_stream() {
        assert!(TransportError::Closed.is_end_of_stream());
        assert!(!TransportError::Disconnected.is_end_of_stream());
    }

    #[test]
    fn config_error_messages_name_the_value() {
        assert_eq!(
            ConfigError::InvalidDataBits { value: 9 }.to_string(),
            "data bits must be 5, 6, 7 or 8, got 9"
        );
        assert_eq!(
            ConfigError::ReservationTooLarge {
                reserved: 3,
                capacity: 3
            }
            .to_string(),
            "reserved slots (3) must be below pool capacity (3)"
        );
    }
}
