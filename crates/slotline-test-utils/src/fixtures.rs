//! Reusable frame fixtures.
//!
//! - [`numbered_frame`] / [`frame_number`] encode a counter as a 4-byte
//!   frame so ordering, duplication and tearing can be checked from the
//!   bytes alone.
//! - [`JitterSource`] emits numbered frames with seeded random gaps.

use std::thread;
use std::time::Duration;

use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use slotline_core::{FrameSource, TransportError};

/// Big-endian encoding of `n` as a 4-byte frame.
pub fn numbered_frame(n: u32) -> [u8; 4] {
    n.to_be_bytes()
}

/// Decode a frame built by [`numbered_frame`]. `None` for any other
/// length, which is how a torn or merged frame shows up.
pub fn frame_number(bytes: &[u8]) -> Option<u32> {
    let arr: [u8; 4] = bytes.try_into().ok()?;
    Some(u32::from_be_bytes(arr))
}

/// Emits numbered frames `0..count` with seeded random gaps, then
/// reports end of stream.
///
/// A gap of zero delivers immediately; otherwise the source sleeps
/// `gap` microseconds, or reports a timeout if the gap exceeds the
/// caller's read timeout (the frame is then delivered on a later call).
pub struct JitterSource {
    rng: ChaCha8Rng,
    next: u32,
    count: u32,
    max_gap_us: u32,
    owed_us: u64,
}

impl JitterSource {
    pub fn new(seed: u64, count: u32, max_gap: Duration) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            next: 0,
            count,
            max_gap_us: u32::try_from(max_gap.as_micros()).unwrap_or(u32::MAX),
            owed_us: 0,
        }
    }

    /// Number of frames emitted so far.
    pub fn emitted(&self) -> u32 {
        self.next
    }
}

impl FrameSource for JitterSource {
    fn recv_frame(
        &mut self,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<Option<usize>, TransportError> {
        if self.next >= self.count {
            return Err(TransportError::Closed);
        }
        if self.owed_us == 0 && self.max_gap_us > 0 {
            self.owed_us = u64::from(self.rng.next_u32() % self.max_gap_us);
        }
        let timeout_us = u64::try_from(timeout.as_micros()).unwrap_or(u64::MAX);
        if self.owed_us > timeout_us {
            self.owed_us -= timeout_us;
            thread::park_timeout(timeout);
            return Ok(None);
        }
        thread::sleep(Duration::from_micros(self.owed_us));
        self.owed_us = 0;

        let frame = numbered_frame(self.next);
        let n = frame.len().min(buf.len());
        buf[..n].copy_from_slice(&frame[..n]);
        self.next += 1;
        Ok(Some(n))
    }
}
