use crate::domain::{
    error::{ComError, ComResult},
    speed::LineSpeed,
};
use serialport::SerialPort;
use std::io::{Read, Write};
use std::time::Duration;
use tracing::{info, warn};

/// Read wait on the receive half. A timeout is not an error; it lets the
/// output worker observe its stop flag.
pub const READ_POLL: Duration = Duration::from_millis(50);

/// Write timeout on the transmit half.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(1);

/// Serial path that selects a locally created pseudo-terminal pair.
pub const PTY_PATH: &str = "/dev/ptmx";

pub type SerialReader = Box<dyn Read + Send>;
pub type SerialWriter = Box<dyn Write + Send>;

/// Open duplex byte stream, split by direction.
pub struct SerialLink {
    reader: SerialReader,
    writer: SerialWriter,
    peer: Option<Box<dyn SerialPort>>,
    pty_name: Option<String>,
}

impl SerialLink {
    /// Open the device at `path` at the given speed.
    ///
    /// [`PTY_PATH`] creates a pseudo-terminal pair instead; the slave end is
    /// kept open for the lifetime of the link.
    pub fn open(path: &str, speed: LineSpeed) -> ComResult<Self> {
        if path == PTY_PATH {
            return Self::open_pty();
        }

        let baud = speed.baud().unwrap_or_else(|| {
            let fallback = LineSpeed::default();
            warn!("No line speed configured, using {}", fallback);
            fallback.baud().unwrap_or(115200)
        });

        let reader = serialport::new(path, baud)
            .timeout(READ_POLL)
            .open()
            .map_err(|source| ComError::Open {
                path: path.to_string(),
                source,
            })?;

        let mut writer = reader.try_clone()?;
        writer.set_timeout(WRITE_TIMEOUT)?;

        info!("Serial port {} opened at {} baud", path, baud);

        Ok(Self {
            reader: Box::new(reader),
            writer: Box::new(writer),
            peer: None,
            pty_name: None,
        })
    }

    #[cfg(unix)]
    fn open_pty() -> ComResult<Self> {
        let (mut master, slave) = serialport::TTYPort::pair()?;
        master.set_timeout(READ_POLL)?;

        let mut writer = master.try_clone()?;
        writer.set_timeout(WRITE_TIMEOUT)?;

        let pty_name = slave.name();
        info!("Opened PTY pair, slave {:?}", pty_name);

        Ok(Self {
            reader: Box::new(master),
            writer: Box::new(writer),
            peer: Some(Box::new(slave)),
            pty_name,
        })
    }

    #[cfg(not(unix))]
    fn open_pty() -> ComResult<Self> {
        Err(ComError::Config {
            message: "Pseudo-terminals are only supported on unix".to_string(),
        })
    }

    /// Build a link from arbitrary halves, e.g. in-memory streams
    pub fn from_parts(reader: SerialReader, writer: SerialWriter) -> Self {
        Self {
            reader,
            writer,
            peer: None,
            pty_name: None,
        }
    }

    /// Path of the pseudo-terminal slave, when running in PTY mode
    pub fn pty_name(&self) -> Option<&str> {
        self.pty_name.as_deref()
    }

    /// Hand out the two directions. The returned guard keeps the PTY slave
    /// (if any) alive until it is dropped.
    pub fn split(self) -> (SerialReader, SerialWriter, LinkGuard) {
        (self.reader, self.writer, LinkGuard { _peer: self.peer })
    }
}

/// Keeps the far end of a pseudo-terminal open.
pub struct LinkGuard {
    _peer: Option<Box<dyn SerialPort>>,
}
