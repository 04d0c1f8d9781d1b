//! Frame buffering engine for slotline.
//!
//! Wires a [`FrameSource`](slotline_core::FrameSource) to a shared
//! [`FrameQueue`] through a background ingestion task, and exposes the
//! consumer surface: readiness, peeks, pops and blocking waits.
//!
//! # Architecture
//!
//! ```text
//! Transport            Ingest Thread                 Consumer Thread
//!     |                      |                              |
//!     |<--recv_frame(buf)----| check shutdown_flag          |
//!     |   (≤ read_timeout)   | read into scratch buffer     |
//!     |---bytes------------->| lock deque                   |
//!     |                      |   evict oldest if full       |
//!     |                      |   push + copy + seq          |
//!     |                      | unlock, notify               |
//!     |                      |                              |
//!     |                      |          status()----------->| occupancy > reserved
//!     |                      |          pop_oldest()------->| lock, copy out, release
//! ```
//!
//! [`FrameReceiver`] owns the ingest thread: it validates configuration
//! before anything is allocated, spawns the thread, and joins it on
//! [`stop`](FrameReceiver::stop), recovering the [`IngestReport`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod frame;
pub mod ingest;
pub mod queue;
pub mod readiness;
pub mod receiver;
pub mod stats;

pub use config::{IngestDirection, OverflowPolicy, ReceiverConfig};
pub use frame::Frame;
pub use ingest::{IngestExit, IngestReport};
pub use queue::{FrameQueue, Publish};
pub use readiness::Readiness;
pub use receiver::{FrameReceiver, StopReport};
pub use stats::{IngestStats, StatsSnapshot};
