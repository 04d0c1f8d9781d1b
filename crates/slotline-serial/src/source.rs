//! Cancellable frame source over a device reader.
//!
//! [`StreamSource`] moves device reads to a dedicated pump thread that
//! forwards each chunk over a bounded crossbeam channel;
//! [`recv_frame`](FrameSource::recv_frame) then waits on the channel
//! with `recv_timeout`, which is what lets the ingestion task observe
//! cancellation within one read timeout.
//!
//! The pump itself never blocks unboundedly: every read goes through
//! [`TimedRead`], which waits at most [`PUMP_POLL`] for input, so the
//! pump sees the stop flag promptly and is joined when the source drops.

use std::fs::File;
use std::io::{self, Cursor, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, SendTimeoutError, Sender};
use slotline_core::{FrameSource, TransportError};

/// Chunks buffered between the pump thread and the consumer.
const PUMP_DEPTH: usize = 16;

/// Upper bound on how long the pump waits in one read or send before
/// re-checking its stop flag.
pub const PUMP_POLL: Duration = Duration::from_millis(20);

type Chunk = Result<Vec<u8>, TransportError>;

// ── TimedRead ────────────────────────────────────────────────────

/// A byte stream whose reads wait for input with a bound.
pub trait TimedRead {
    /// Read up to `buf.len()` bytes, waiting at most `timeout` for input.
    ///
    /// `Ok(None)` means nothing arrived in time; `Ok(Some(0))` is end of
    /// stream.
    fn read_timeout(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<Option<usize>>;
}

impl<R: TimedRead + ?Sized> TimedRead for Box<R> {
    fn read_timeout(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<Option<usize>> {
        (**self).read_timeout(buf, timeout)
    }
}

/// In-memory streams are always readable.
impl<T: AsRef<[u8]>> TimedRead for Cursor<T> {
    fn read_timeout(&mut self, buf: &mut [u8], _timeout: Duration) -> io::Result<Option<usize>> {
        self.read(buf).map(Some)
    }
}

/// Waits with `poll(2)` before reading, so a quiet tty never pins the
/// pump inside `read`.
#[cfg(unix)]
impl TimedRead for File {
    fn read_timeout(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<Option<usize>> {
        use nix::errno::Errno;
        use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
        use std::os::fd::AsFd;

        let ms = u16::try_from(timeout.as_millis()).unwrap_or(u16::MAX);
        let ready = {
            let mut fds = [PollFd::new(self.as_fd(), PollFlags::POLLIN)];
            match poll(&mut fds, PollTimeout::from(ms)) {
                Ok(n) => n > 0,
                Err(Errno::EINTR) => false,
                Err(errno) => return Err(io::Error::from(errno)),
            }
        };
        if ready {
            self.read(buf).map(Some)
        } else {
            Ok(None)
        }
    }
}

#[cfg(not(unix))]
impl TimedRead for File {
    fn read_timeout(&mut self, buf: &mut [u8], _timeout: Duration) -> io::Result<Option<usize>> {
        self.read(buf).map(Some)
    }
}

// ── StreamSource ─────────────────────────────────────────────────

/// A [`FrameSource`] fed by a pump thread reading a [`TimedRead`].
///
/// Each successful read of up to `max_read` bytes becomes one frame. A
/// frame longer than the caller's buffer is handed out over successive
/// calls. End of file surfaces as [`TransportError::Closed`] and read
/// failures as [`TransportError::Read`]; once either is returned every
/// later call returns it again.
///
/// Dropping the source stops the pump and joins it; this takes at most
/// about one [`PUMP_POLL`]. The reader is dropped before `drop` returns.
pub struct StreamSource {
    rx: Receiver<Chunk>,
    pending: Vec<u8>,
    pending_pos: usize,
    finished: Option<TransportError>,
    stop: Arc<AtomicBool>,
    pump: Option<JoinHandle<()>>,
}

impl StreamSource {
    /// Spawn the pump thread (`slotline-pump`) over `reader`.
    ///
    /// `max_read` caps each read; values below 1 are treated as 1.
    pub fn spawn<R>(reader: R, max_read: usize) -> io::Result<Self>
    where
        R: TimedRead + Send + 'static,
    {
        let (tx, rx) = crossbeam_channel::bounded(PUMP_DEPTH);
        let stop = Arc::new(AtomicBool::new(false));
        let pump_stop = Arc::clone(&stop);
        let max_read = max_read.max(1);
        let handle = thread::Builder::new()
            .name("slotline-pump".into())
            .spawn(move || pump(reader, max_read, &tx, &pump_stop))?;
        Ok(Self {
            rx,
            pending: Vec::new(),
            pending_pos: 0,
            finished: None,
            stop,
            pump: Some(handle),
        })
    }

    /// Whether the pump thread has exited.
    pub fn is_pump_finished(&self) -> bool {
        self.pump.as_ref().is_none_or(JoinHandle::is_finished)
    }

    fn take_pending(&mut self, buf: &mut [u8]) -> usize {
        let rest = &self.pending[self.pending_pos..];
        let n = rest.len().min(buf.len());
        buf[..n].copy_from_slice(&rest[..n]);
        self.pending_pos += n;
        if self.pending_pos == self.pending.len() {
            self.pending.clear();
            self.pending_pos = 0;
        }
        n
    }
}

impl FrameSource for StreamSource {
    fn recv_frame(
        &mut self,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<Option<usize>, TransportError> {
        if buf.is_empty() {
            return Ok(Some(0));
        }
        if self.pending_pos < self.pending.len() {
            return Ok(Some(self.take_pending(buf)));
        }
        if let Some(err) = &self.finished {
            return Err(err.clone());
        }
        match self.rx.recv_timeout(timeout) {
            Ok(Ok(chunk)) => {
                self.pending = chunk;
                self.pending_pos = 0;
                Ok(Some(self.take_pending(buf)))
            }
            Ok(Err(err)) => {
                self.finished = Some(err.clone());
                Err(err)
            }
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                self.finished = Some(TransportError::Disconnected);
                Err(TransportError::Disconnected)
            }
        }
    }
}

impl Drop for StreamSource {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.pump.take() {
            if handle.join().is_err() {
                tracing::error!("Transport pump panicked");
            }
        }
    }
}

impl std::fmt::Debug for StreamSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamSource")
            .field("pending", &(self.pending.len() - self.pending_pos))
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

/// Send `chunk`, giving up if the consumer is gone or `stop` is raised
/// while the channel is full.
fn forward(tx: &Sender<Chunk>, mut chunk: Chunk, stop: &AtomicBool) -> bool {
    loop {
        match tx.send_timeout(chunk, PUMP_POLL) {
            Ok(()) => return true,
            Err(SendTimeoutError::Disconnected(_)) => return false,
            Err(SendTimeoutError::Timeout(back)) => {
                if stop.load(Ordering::Acquire) {
                    return false;
                }
                chunk = back;
            }
        }
    }
}

fn pump<R: TimedRead>(mut reader: R, max_read: usize, tx: &Sender<Chunk>, stop: &AtomicBool) {
    tracing::debug!(max_read, "Transport pump started");
    let mut buf = vec![0u8; max_read];
    let reason = loop {
        if stop.load(Ordering::Acquire) {
            break "cancelled";
        }
        match reader.read_timeout(&mut buf, PUMP_POLL) {
            Ok(None) => {}
            Ok(Some(0)) => {
                forward(tx, Err(TransportError::Closed), stop);
                break "end of stream";
            }
            Ok(Some(n)) => {
                if !forward(tx, Ok(buf[..n].to_vec()), stop) {
                    break "source dropped";
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                ) =>
            {
                thread::sleep(Duration::from_millis(1));
            }
            Err(e) => {
                forward(tx, Err(TransportError::read(&e)), stop);
                break "read failed";
            }
        }
    };
    drop(reader);
    tracing::debug!(reason, "Transport pump stopped");
}
