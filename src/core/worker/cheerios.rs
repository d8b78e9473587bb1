use std::io::{ErrorKind, Read};
use std::sync::Arc;

use tracing::{info, warn};

use super::StopFlag;
use crate::core::decode::ColorDecoder;
use crate::core::session::{Session, StatusSource};
use crate::domain::error::{ComError, ComResult};
use crate::infrastructure::capture::CaptureLog;
use crate::infrastructure::serial::SerialReader;

pub const READ_CHUNK: usize = 1024;

const RECEIVING: &str = "receiving";

/// Serial to screen worker.
pub struct Cheerios {
    session: Arc<Session>,
    reader: SerialReader,
    decoder: ColorDecoder,
    capture: Option<CaptureLog>,
    receiving: bool,
}

impl Cheerios {
    pub fn new(session: Arc<Session>, reader: SerialReader, capture: Option<CaptureLog>) -> Self {
        let decoder = ColorDecoder::new(session.config().colors);
        Self {
            session,
            reader,
            decoder,
            capture,
            receiving: false,
        }
    }

    /// Worker body. Returns the serial reader so the caller controls when
    /// the channel is closed.
    pub fn run(mut self, stop: StopFlag) -> SerialReader {
        info!("Cheerios worker running");
        let mut buf = [0u8; READ_CHUNK];

        while !stop.is_raised() {
            let result = match self.reader.read(&mut buf) {
                Ok(0) => Err(ComError::DeviceClosed),
                Ok(n) => self.receive(&buf[..n]),
                Err(e) if matches!(
                    e.kind(),
                    ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                ) => self.set_receiving(false),
                Err(e) => Err(e.into()),
            };

            if let Err(e) = result {
                self.session.fail(StatusSource::Cheerios, &e);
                break;
            }
        }

        info!("Cheerios worker exiting");
        self.reader
    }

    fn receive(&mut self, chunk: &[u8]) -> ComResult<()> {
        self.session.traffic().add_received(chunk.len());
        self.set_receiving(true)?;

        let actions = self.decoder.decode(chunk);

        // The capture write and the screen write share the render lock
        let mut surface = self.session.lock_surface();
        let capture_failed = match self.capture.as_mut() {
            Some(capture) => capture.append(chunk).err(),
            None => None,
        };
        if let Some(e) = capture_failed {
            warn!("Disabling capture log: {}", e);
            self.capture = None;
        }
        surface.write_output(&actions)
    }

    fn set_receiving(&mut self, receiving: bool) -> ComResult<()> {
        if self.receiving == receiving {
            return Ok(());
        }
        self.receiving = receiving;
        self.session
            .set_status(StatusSource::Cheerios, if receiving { RECEIVING } else { "" })
    }
}
