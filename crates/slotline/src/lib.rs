//! slotline: a bounded slot-pool frame buffer for byte-stream receivers.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all slotline sub-crates. For most users, adding `slotline` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use std::io::Cursor;
//! use std::time::Duration;
//!
//! use slotline::prelude::*;
//!
//! // Any TimedRead works; a serial device comes from SerialPort::source().
//! let source = StreamSource::spawn(Cursor::new(b"hello".to_vec()), 255).unwrap();
//!
//! let config = ReceiverConfig {
//!     pool: PoolConfig::new(64, 3),
//!     ..ReceiverConfig::default()
//! };
//! let mut rx = FrameReceiver::start(source, config).unwrap();
//!
//! let frame = rx.wait_oldest(Duration::from_secs(5)).unwrap();
//! assert_eq!(frame.bytes, b"hello");
//!
//! let report = rx.stop();
//! assert!(report.joined);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `slotline-core` | IDs, `RxStatus`, error types, transport traits |
//! | [`arena`] | `slotline-arena` | Slot arena, slot views, bounded deque |
//! | [`serial`] | `slotline-serial` | Serial line config, device port, stream source |
//! | [`engine`] | `slotline-engine` | Frame queue, ingestion task, receiver |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`slotline-core`).
///
/// Contains [`types::SlotIndex`], [`types::FrameSeq`], [`types::RxStatus`],
/// the error types, and the transport traits ([`types::FrameSource`],
/// [`types::FrameSink`]).
pub use slotline_core as types;

/// Slot arena and bounded deque (`slotline-arena`).
///
/// [`arena::SlotDeque`] is usable on its own where no background
/// ingestion is needed.
pub use slotline_arena as arena;

/// Serial transport (`slotline-serial`).
///
/// [`serial::SerialConfig`] validates line parameters,
/// [`serial::SerialPort`] opens the device, and [`serial::StreamSource`]
/// makes blocking reads cancellable.
pub use slotline_serial as serial;

/// Frame queue and receiver (`slotline-engine`).
///
/// [`engine::FrameReceiver`] for background ingestion,
/// [`engine::FrameQueue`] for direct producer/consumer use.
pub use slotline_engine as engine;

/// Common imports for typical slotline usage.
///
/// ```rust
/// use slotline::prelude::*;
/// ```
///
/// This imports the receiver and its configuration, the queue, the
/// serial transport, core traits and the error types.
pub mod prelude {
    // Core types and traits
    pub use slotline_core::{FrameSeq, FrameSink, FrameSource, RxStatus};

    // Errors
    pub use slotline_core::{ConfigError, TransportError};

    // Arena
    pub use slotline_arena::{PoolConfig, SlotDeque};

    // Serial
    pub use slotline_serial::{OpenError, SerialConfig, SerialPort, StreamSource};

    // Engine
    pub use slotline_engine::{
        Frame, FrameQueue, FrameReceiver, IngestDirection, IngestExit, OverflowPolicy, Readiness,
        ReceiverConfig, StopReport,
    };
}
