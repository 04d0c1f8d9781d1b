//! Transport traits consumed by the ingestion task.

use std::time::Duration;

use crate::error::TransportError;

/// A source of byte frames, read one slot at a time.
///
/// Implemented by device transports (see `slotline-serial`) and by the
/// mock sources in `slotline-test-utils`. The ingestion task owns its
/// source exclusively and calls [`recv_frame`](FrameSource::recv_frame)
/// in a loop, checking its cancellation flag between calls.
pub trait FrameSource {
    /// Wait up to `timeout` for the next frame and copy it into `buf`.
    ///
    /// Returns `Ok(Some(n))` with the number of bytes written into
    /// `buf[..n]`, or `Ok(None)` if nothing arrived before the timeout.
    /// A frame longer than `buf` is delivered across successive calls.
    ///
    /// Implementations must honour the timeout: the caller relies on it
    /// to bound cancellation latency.
    fn recv_frame(
        &mut self,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<Option<usize>, TransportError>;
}

/// A sink accepting outbound byte frames.
pub trait FrameSink {
    /// Write `bytes` to the transport, returning how many were accepted.
    fn send_frame(&mut self, bytes: &[u8]) -> Result<usize, TransportError>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn recv_frame(
        &mut self,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<Option<usize>, TransportError> {
        (**self).recv_frame(buf, timeout)
    }
}

impl<S: FrameSink + ?Sized> FrameSink for Box<S> {
    fn send_frame(&mut self, bytes: &[u8]) -> Result<usize, TransportError> {
        (**self).send_frame(bytes)
    }
}
