//! Core types and traits for the slotline frame buffer.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions shared by the rest of the workspace:
//! slot and frame identifiers, the receive-status signal, the error
//! taxonomy, and the transport traits the ingestion task reads from.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod status;
pub mod traits;

pub use error::{ConfigError, TransportError};
pub use id::{FrameSeq, SlotIndex};
pub use status::RxStatus;
pub use traits::{FrameSink, FrameSource};
