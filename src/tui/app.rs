use std::sync::Arc;

use tracing::info;

use super::{CrosstermKeys, KeySource, Surface, TerminalSurface};
use crate::{
    core::{
        session::{Session, StatusSource, StopReason},
        Runtime, SignalWatch, TERMINATION_SIGNALS,
    },
    domain::{config::Config, error::ComResult},
    infrastructure::{capture::CaptureLog, serial::SerialLink},
};

/// Interactive terminal session against one serial device.
pub struct App {
    config: Config,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Open the serial channel and the terminal, run until quit or a fatal
    /// error, and restore the terminal.
    pub fn run(self) -> ComResult<StopReason> {
        let link = SerialLink::open(&self.config.serial_path, self.config.speed)?;
        let capture = self.open_capture()?;

        let surface = TerminalSurface::open()?;
        self.run_with(
            link,
            Box::new(surface),
            Box::new(CrosstermKeys::new()),
            capture,
            TERMINATION_SIGNALS,
        )
    }

    /// Run a session over already opened collaborators. Any of `signals`
    /// delivered while it runs stops it like the quit command does.
    pub fn run_with(
        self,
        link: SerialLink,
        surface: Box<dyn Surface>,
        keys: Box<dyn KeySource>,
        capture: Option<CaptureLog>,
        signals: &[i32],
    ) -> ComResult<StopReason> {
        let pty_name = link.pty_name().map(str::to_string);
        let serial_path = self.config.serial_path.clone();

        let session = Arc::new(Session::new(self.config, surface));
        session.set_status(StatusSource::Session, serial_path)?;

        let runtime = Runtime::start(Arc::clone(&session), link, keys, capture)?;
        let watch = SignalWatch::install(Arc::clone(&session), signals)?;

        if let Some(name) = pty_name {
            session.insert_text(&format!("Opened PTY port {}\r\n", name))?;
        }

        let reason = runtime.run();
        watch.close();
        info!("Session ended: {}", reason);
        Ok(reason)
    }

    fn open_capture(&self) -> ComResult<Option<CaptureLog>> {
        self.config
            .log_path
            .as_deref()
            .map(CaptureLog::open)
            .transpose()
    }
}
