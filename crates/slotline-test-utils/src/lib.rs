//! Test utilities and mock transports for slotline development.
//!
//! Provides mock implementations of the transport traits
//! ([`FrameSource`], [`FrameSink`]) so the queue and receiver can be
//! exercised without a device:
//!
//! - [`ScriptedSource`] replays a fixed script of frames, idle reads
//!   and failures.
//! - [`ChannelSource`] is fed frame by frame from another thread.
//! - [`RecordingSink`] captures everything written to it.
//!
//! Frame fixtures live in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::collections::VecDeque;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use slotline_core::{FrameSink, FrameSource, TransportError};

pub use fixtures::{frame_number, numbered_frame, JitterSource};

/// Copy as much of `frame` as fits into `buf`, returning the number of
/// bytes copied and the undelivered remainder.
fn deliver(frame: Vec<u8>, buf: &mut [u8]) -> (usize, Option<Vec<u8>>) {
    let n = frame.len().min(buf.len());
    buf[..n].copy_from_slice(&frame[..n]);
    let rest = (n < frame.len()).then(|| frame[n..].to_vec());
    (n, rest)
}

// ── ScriptedSource ───────────────────────────────────────────────

/// One scripted transport event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// A read returning these bytes.
    Frame(Vec<u8>),
    /// A read that times out.
    Idle,
    /// A read that fails.
    Fail(TransportError),
}

/// What a [`ScriptedSource`] does once its script runs out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AtEnd {
    /// Keep timing out, like a quiet line.
    #[default]
    Idle,
    /// Report end of stream.
    Close,
}

/// Mock [`FrameSource`] replaying a fixed script.
///
/// Idle reads wait out the caller's timeout with `thread::park_timeout`,
/// so an unpark from the receiver's stop sequence ends them early.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    steps: VecDeque<Step>,
    at_end: AtEnd,
    delay: Option<Duration>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a frame.
    pub fn frame(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.steps.push_back(Step::Frame(bytes.into()));
        self
    }

    /// Append several frames.
    pub fn frames<I, B>(mut self, frames: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Vec<u8>>,
    {
        self.steps
            .extend(frames.into_iter().map(|b| Step::Frame(b.into())));
        self
    }

    /// Append a timed-out read.
    pub fn idle(mut self) -> Self {
        self.steps.push_back(Step::Idle);
        self
    }

    /// Append a failing read.
    pub fn fail(mut self, err: TransportError) -> Self {
        self.steps.push_back(Step::Fail(err));
        self
    }

    /// Report end of stream once the script is exhausted.
    pub fn then_close(mut self) -> Self {
        self.at_end = AtEnd::Close;
        self
    }

    /// Keep timing out once the script is exhausted (the default).
    pub fn then_idle(mut self) -> Self {
        self.at_end = AtEnd::Idle;
        self
    }

    /// Sleep this long before delivering each frame.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Steps not yet replayed.
    pub fn remaining(&self) -> usize {
        self.steps.len()
    }
}

impl FrameSource for ScriptedSource {
    fn recv_frame(
        &mut self,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<Option<usize>, TransportError> {
        match self.steps.pop_front() {
            Some(Step::Frame(bytes)) => {
                if let Some(delay) = self.delay {
                    thread::sleep(delay);
                }
                let (n, rest) = deliver(bytes, buf);
                if let Some(rest) = rest {
                    self.steps.push_front(Step::Frame(rest));
                }
                Ok(Some(n))
            }
            Some(Step::Idle) => {
                thread::park_timeout(timeout);
                Ok(None)
            }
            Some(Step::Fail(err)) => Err(err),
            None => match self.at_end {
                AtEnd::Idle => {
                    thread::park_timeout(timeout);
                    Ok(None)
                }
                AtEnd::Close => Err(TransportError::Closed),
            },
        }
    }
}

// ── ChannelSource ────────────────────────────────────────────────

/// Mock [`FrameSource`] fed through a crossbeam channel.
///
/// Dropping every sender ends the stream ([`TransportError::Closed`]).
#[derive(Debug)]
pub struct ChannelSource {
    rx: Receiver<Vec<u8>>,
    pending: Option<Vec<u8>>,
}

impl ChannelSource {
    /// A bounded feed of `depth` frames and the source reading it.
    pub fn bounded(depth: usize) -> (Sender<Vec<u8>>, Self) {
        let (tx, rx) = crossbeam_channel::bounded(depth);
        (tx, Self { rx, pending: None })
    }

    /// An unbounded feed and the source reading it.
    pub fn unbounded() -> (Sender<Vec<u8>>, Self) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (tx, Self { rx, pending: None })
    }
}

impl FrameSource for ChannelSource {
    fn recv_frame(
        &mut self,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<Option<usize>, TransportError> {
        let frame = match self.pending.take() {
            Some(frame) => frame,
            None => match self.rx.recv_timeout(timeout) {
                Ok(frame) => frame,
                Err(RecvTimeoutError::Timeout) => return Ok(None),
                Err(RecvTimeoutError::Disconnected) => return Err(TransportError::Closed),
            },
        };
        let (n, rest) = deliver(frame, buf);
        self.pending = rest;
        Ok(Some(n))
    }
}

// ── RecordingSink ────────────────────────────────────────────────

/// Mock [`FrameSink`] that records every frame written.
///
/// Optionally fails every write after the first `fail_after` frames.
#[derive(Debug, Default)]
pub struct RecordingSink {
    frames: Vec<Vec<u8>>,
    fail_after: Option<usize>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `n` frames, then fail with [`TransportError::Write`].
    pub fn failing_after(n: usize) -> Self {
        Self {
            frames: Vec::new(),
            fail_after: Some(n),
        }
    }

    /// Frames written so far, in order.
    pub fn frames(&self) -> &[Vec<u8>] {
        &self.frames
    }

    /// All written bytes concatenated.
    pub fn bytes(&self) -> Vec<u8> {
        self.frames.concat()
    }
}

impl FrameSink for RecordingSink {
    fn send_frame(&mut self, bytes: &[u8]) -> Result<usize, TransportError> {
        if self.fail_after.is_some_and(|n| self.frames.len() >= n) {
            return Err(TransportError::Write {
                reason: "sink closed".into(),
            });
        }
        self.frames.push(bytes.to_vec());
        Ok(bytes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: Duration = Duration::from_millis(1);

    #[test]
    fn scripted_source_replays_in_order() {
        let mut src = ScriptedSource::new()
            .frame(b"ab".to_vec())
            .idle()
            .fail(TransportError::Disconnected)
            .then_close();
        let mut buf = [0u8; 8];
        assert_eq!(src.recv_frame(&mut buf, T), Ok(Some(2)));
        assert_eq!(&buf[..2], b"ab");
        assert_eq!(src.recv_frame(&mut buf, T), Ok(None));
        assert_eq!(src.recv_frame(&mut buf, T), Err(TransportError::Disconnected));
        assert_eq!(src.recv_frame(&mut buf, T), Err(TransportError::Closed));
        assert_eq!(src.remaining(), 0);
    }

    #[test]
    fn scripted_source_splits_long_frames() {
        let mut src = ScriptedSource::new().frame(b"abcdef".to_vec()).then_close();
        let mut buf = [0u8; 4];
        assert_eq!(src.recv_frame(&mut buf, T), Ok(Some(4)));
        assert_eq!(src.recv_frame(&mut buf, T), Ok(Some(2)));
        assert_eq!(&buf[..2], b"ef");
        assert_eq!(src.recv_frame(&mut buf, T), Err(TransportError::Closed));
    }

    #[test]
    fn scripted_source_idles_by_default() {
        let mut src = ScriptedSource::new();
        let mut buf = [0u8; 4];
        assert_eq!(src.recv_frame(&mut buf, T), Ok(None));
        assert_eq!(src.recv_frame(&mut buf, T), Ok(None));
    }

    #[test]
    fn channel_source_closes_when_senders_drop() {
        let (tx, mut src) = ChannelSource::unbounded();
        tx.send(b"xyz".to_vec()).unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(src.recv_frame(&mut buf, T), Ok(Some(3)));
        assert_eq!(src.recv_frame(&mut buf, T), Ok(None));
        drop(tx);
        assert_eq!(src.recv_frame(&mut buf, T), Err(TransportError::Closed));
    }

    #[test]
    fn recording_sink_captures_and_fails_on_cue() {
        let mut sink = RecordingSink::failing_after(2);
        assert_eq!(sink.send_frame(b"a"), Ok(1));
        assert_eq!(sink.send_frame(b"bc"), Ok(2));
        assert!(sink.send_frame(b"d").is_err());
        assert_eq!(sink.frames().len(), 2);
        assert_eq!(sink.bytes(), b"abc");
    }
}
