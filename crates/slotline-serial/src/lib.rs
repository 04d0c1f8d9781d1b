//! Serial line transport for the slotline frame buffer.
//!
//! Provides the stream collaborator the ingestion task reads from:
//!
//! - [`SerialConfig`] validates line parameters (data bits, stop bits,
//!   parity, flow control, baud) before anything is opened, and renders
//!   them as `stty` arguments.
//! - [`SerialPort`] opens the device node and implements
//!   [`FrameSink`](slotline_core::FrameSink) for outbound writes.
//! - [`StreamSource`] turns any [`TimedRead`] into a cancellable
//!   [`FrameSource`](slotline_core::FrameSource) by running the reads on
//!   a pump thread and polling a bounded channel with a timeout.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod port;
pub mod source;

pub use config::{DataBits, FlowControl, Parity, SerialConfig, StopBits};
pub use port::{OpenError, SerialPort};
pub use source::{StreamSource, TimedRead, PUMP_POLL};
