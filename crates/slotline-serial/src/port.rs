//! Serial device node handle.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use slotline_core::{ConfigError, FrameSink, TransportError};
use thiserror::Error;

use crate::config::SerialConfig;
use crate::source::StreamSource;

/// Failure to open a [`SerialPort`].
///
/// Invalid line parameters are rejected before the device is touched
/// and stay distinct from device-level failures.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum OpenError {
    /// The configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The device node could not be opened.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// An open serial device.
///
/// Opened read/write. Writes go through [`FrameSink`]; reads are
/// handed to a [`StreamSource`] via [`source`](Self::source) or
/// [`into_source`](Self::into_source). The device is closed when the
/// port and every source cloned from it have been dropped.
#[derive(Debug)]
pub struct SerialPort {
    file: File,
    path: PathBuf,
    config: SerialConfig,
}

impl SerialPort {
    /// Validate `config` and open its device node.
    ///
    /// The node is opened with `O_NOCTTY | O_SYNC` on unix, so it never
    /// becomes the process's controlling terminal. The line discipline
    /// itself is not applied here; see [`SerialConfig::stty_args`].
    pub fn open(config: &SerialConfig) -> Result<Self, OpenError> {
        config.validate()?;
        let path = config.device_path();
        let mut options = OpenOptions::new();
        options.read(true).write(true);
        #[cfg(unix)]
        {
            use nix::fcntl::OFlag;
            use std::os::unix::fs::OpenOptionsExt;
            options.custom_flags((OFlag::O_NOCTTY | OFlag::O_SYNC).bits());
        }
        let file = options
            .open(&path)
            .map_err(|e| TransportError::open(path.display().to_string(), &e))?;
        tracing::info!(
            path = %path.display(),
            baud = config.baud,
            line = %config,
            "Serial port opened"
        );
        Ok(Self {
            file,
            path,
            config: config.clone(),
        })
    }

    /// Device path this port was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The configuration the port was opened with.
    pub fn config(&self) -> &SerialConfig {
        &self.config
    }

    /// Start a [`StreamSource`] over a cloned handle of the device,
    /// leaving this port usable for writes.
    pub fn source(&self) -> Result<StreamSource, TransportError> {
        let reader = self
            .file
            .try_clone()
            .map_err(|e| TransportError::open(self.path.display().to_string(), &e))?;
        spawn_source(reader, &self.path, &self.config)
    }

    /// Turn the port into a [`StreamSource`], giving up the write side.
    pub fn into_source(self) -> Result<StreamSource, TransportError> {
        let Self { file, path, config } = self;
        spawn_source(file, &path, &config)
    }
}

fn spawn_source(
    reader: File,
    path: &Path,
    config: &SerialConfig,
) -> Result<StreamSource, TransportError> {
    StreamSource::spawn(reader, config.max_read).map_err(|e| TransportError::Open {
        path: path.display().to_string(),
        reason: format!("failed to spawn reader thread: {e}"),
    })
}

impl FrameSink for SerialPort {
    fn send_frame(&mut self, bytes: &[u8]) -> Result<usize, TransportError> {
        self.file
            .write_all(bytes)
            .map_err(|e| TransportError::write(&e))?;
        Ok(bytes.len())
    }
}
