//! Serial line parameters and their validation.

use std::fmt;
use std::path::PathBuf;

use slotline_core::ConfigError;

/// Character size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DataBits {
    /// 5 bits per character.
    Five,
    /// 6 bits per character.
    Six,
    /// 7 bits per character.
    Seven,
    /// 8 bits per character.
    #[default]
    Eight,
}

impl DataBits {
    /// Number of bits per character.
    pub fn bits(self) -> u8 {
        match self {
            Self::Five => 5,
            Self::Six => 6,
            Self::Seven => 7,
            Self::Eight => 8,
        }
    }
}

impl TryFrom<u8> for DataBits {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            5 => Ok(Self::Five),
            6 => Ok(Self::Six),
            7 => Ok(Self::Seven),
            8 => Ok(Self::Eight),
            _ => Err(ConfigError::InvalidDataBits { value }),
        }
    }
}

/// Number of stop bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StopBits {
    /// One stop bit.
    #[default]
    One,
    /// Two stop bits.
    Two,
}

impl TryFrom<u8> for StopBits {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            _ => Err(ConfigError::InvalidStopBits { value }),
        }
    }
}

/// Parity checking mode.
///
/// The integer encoding accepted by [`TryFrom<u8>`] is `0 = none`,
/// `1 = odd`, `2 = even`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Parity {
    /// No parity bit.
    #[default]
    None,
    /// Odd parity.
    Odd,
    /// Even parity.
    Even,
}

impl TryFrom<u8> for Parity {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Odd),
            2 => Ok(Self::Even),
            _ => Err(ConfigError::InvalidParity { value }),
        }
    }
}

/// Flow control mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FlowControl {
    /// No flow control.
    #[default]
    None,
    /// RTS/CTS hardware flow control.
    Hardware,
}

impl From<bool> for FlowControl {
    fn from(enabled: bool) -> Self {
        if enabled {
            Self::Hardware
        } else {
            Self::None
        }
    }
}

/// Configuration for a serial device.
///
/// Data bits, stop bits, parity and flow control are typed, so once a
/// `SerialConfig` exists only the baud rate can still be invalid;
/// [`validate()`](Self::validate) checks it. [`from_raw`](Self::from_raw)
/// accepts the integer encoding used by device tables and validates
/// every field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SerialConfig {
    /// Device number; the default device path is `/dev/ttyUSB{port}`.
    pub port: u32,
    /// Line speed in bits per second.
    pub baud: u32,
    /// Character size. Default: 8.
    pub data_bits: DataBits,
    /// Stop bits. Default: 1.
    pub stop_bits: StopBits,
    /// Parity. Default: none.
    pub parity: Parity,
    /// Flow control. Default: none.
    pub flow_control: FlowControl,
    /// Maximum bytes per device read. Default: 255.
    pub max_read: usize,
    /// Explicit device path, overriding the `port`-derived one.
    pub path: Option<PathBuf>,
}

impl SerialConfig {
    /// Default cap on a single device read.
    pub const DEFAULT_MAX_READ: usize = 255;

    /// 8N1, no flow control, on `/dev/ttyUSB{port}`.
    pub fn new(port: u32, baud: u32) -> Self {
        Self {
            port,
            baud,
            data_bits: DataBits::default(),
            stop_bits: StopBits::default(),
            parity: Parity::default(),
            flow_control: FlowControl::default(),
            max_read: Self::DEFAULT_MAX_READ,
            path: None,
        }
    }

    /// Build from the integer encoding `(data_bits, stop_bits, parity,
    /// flow_ctrl)` with parity `0 = none, 1 = odd, 2 = even`.
    ///
    /// Fields are checked in that order; the first invalid one is
    /// reported.
    pub fn from_raw(
        port: u32,
        baud: u32,
        data_bits: u8,
        stop_bits: u8,
        parity: u8,
        flow_ctrl: bool,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            data_bits: DataBits::try_from(data_bits)?,
            stop_bits: StopBits::try_from(stop_bits)?,
            parity: Parity::try_from(parity)?,
            flow_control: FlowControl::from(flow_ctrl),
            ..Self::new(port, baud)
        };
        config.validate()?;
        Ok(config)
    }

    /// Set the character size.
    pub fn data_bits(mut self, data_bits: DataBits) -> Self {
        self.data_bits = data_bits;
        self
    }

    /// Set the stop bits.
    pub fn stop_bits(mut self, stop_bits: StopBits) -> Self {
        self.stop_bits = stop_bits;
        self
    }

    /// Set the parity.
    pub fn parity(mut self, parity: Parity) -> Self {
        self.parity = parity;
        self
    }

    /// Set the flow control mode.
    pub fn flow_control(mut self, flow_control: FlowControl) -> Self {
        self.flow_control = flow_control;
        self
    }

    /// Set the per-read byte cap. Values below 1 are treated as 1.
    pub fn max_read(mut self, max_read: usize) -> Self {
        self.max_read = max_read.max(1);
        self
    }

    /// Use `path` instead of `/dev/ttyUSB{port}`.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Check the remaining free-form fields.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.baud == 0 {
            return Err(ConfigError::InvalidBaudRate { value: self.baud });
        }
        Ok(())
    }

    /// The device node this config opens.
    pub fn device_path(&self) -> PathBuf {
        match &self.path {
            Some(path) => path.clone(),
            None => PathBuf::from(format!("/dev/ttyUSB{}", self.port)),
        }
    }

    /// Render the line discipline as `stty` arguments.
    ///
    /// Canonical input, echo off, signals off, software flow control
    /// off, no input translation, raw output. Applying them to the
    /// device (e.g. `stty -F <path> <args..>`) is up to the host.
    pub fn stty_args(&self) -> Vec<String> {
        let mut args = vec![
            self.baud.to_string(),
            format!("cs{}", self.data_bits.bits()),
        ];
        args.push(
            match self.stop_bits {
                StopBits::One => "-cstopb",
                StopBits::Two => "cstopb",
            }
            .to_owned(),
        );
        match self.parity {
            Parity::None => args.push("-parenb".to_owned()),
            Parity::Odd => args.extend(["parenb".to_owned(), "parodd".to_owned()]),
            Parity::Even => args.extend(["parenb".to_owned(), "-parodd".to_owned()]),
        }
        args.push(
            match self.flow_control {
                FlowControl::None => "-crtscts",
                FlowControl::Hardware => "crtscts",
            }
            .to_owned(),
        );
        args.extend(
            [
                "icanon", "-echo", "-echoe", "-echonl", "-isig", "-ixon", "-ixoff", "-ixany",
                "-ignbrk", "-parmrk", "-brkint", "-istrip", "-inlcr", "-igncr", "-icrnl",
                "-opost", "-onlcr",
            ]
            .into_iter()
            .map(str::to_owned),
        );
        args
    }
}

impl fmt::Display for SerialConfig {
    /// Short line description, e.g. `/dev/ttyUSB6 9600 8N1`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parity = match self.parity {
            Parity::None => 'N',
            Parity::Odd => 'O',
            Parity::Even => 'E',
        };
        let stop = match self.stop_bits {
            StopBits::One => 1,
            StopBits::Two => 2,
        };
        write!(
            f,
            "{} {} {}{}{}",
            self.device_path().display(),
            self.baud,
            self.data_bits.bits(),
            parity,
            stop
        )?;
        if self.flow_control == FlowControl::Hardware {
            write!(f, " rtscts")?;
        }
        Ok(())
    }
}
