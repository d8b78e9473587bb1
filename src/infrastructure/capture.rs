use crate::domain::error::{ComError, ComResult};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Append-only raw capture of everything received from the serial device.
pub struct CaptureLog {
    file: File,
}

impl CaptureLog {
    /// Open (or create) the capture file in append mode
    pub fn open(path: &Path) -> ComResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| ComError::Capture(format!("{}: {}", path.display(), e)))?;

        info!("Capturing received bytes to {}", path.display());
        Ok(Self { file })
    }

    pub fn append(&mut self, data: &[u8]) -> ComResult<()> {
        self.file
            .write_all(data)
            .and_then(|_| self.file.flush())
            .map_err(|e| ComError::Capture(e.to_string()))
    }
}
