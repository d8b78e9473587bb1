use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use super::StopFlag;
use crate::core::decode::ColorDecoder;
use crate::core::escape::{Command, EscapeMachine, KeyAction};
use crate::core::session::{Session, StatusSource, StopReason};
use crate::domain::error::ComResult;
use crate::infrastructure::serial::SerialWriter;
use crate::tui::{KeySource, TermEvent};

/// Bounded wait for a key, so the stop flag is checked every tick
pub const KEY_POLL: Duration = Duration::from_millis(10);

const SENDING: &str = "sending";
const COMMAND_MODE: &str = "CMD";

enum Flow {
    Continue,
    Done,
}

/// Keyboard to serial worker.
pub struct Ingest {
    session: Arc<Session>,
    keys: Box<dyn KeySource>,
    writer: SerialWriter,
    machine: EscapeMachine,
    echo: Option<ColorDecoder>,
    sending: bool,
}

impl Ingest {
    pub fn new(session: Arc<Session>, keys: Box<dyn KeySource>, writer: SerialWriter) -> Self {
        let config = session.config();
        let machine = EscapeMachine::new(config.escape, config.no_crlf);
        // Echoed keys are decoded like device output, so cursor-key
        // sequences are consumed instead of printed
        let echo = config.echo.then(|| ColorDecoder::new(false));
        Self {
            session,
            keys,
            writer,
            machine,
            echo,
            sending: false,
        }
    }

    /// Worker body. Returns the serial writer so the caller controls when
    /// the channel is closed.
    pub fn run(mut self, stop: StopFlag) -> SerialWriter {
        info!("Ingest worker running");
        while !stop.is_raised() {
            match self.step() {
                Ok(Flow::Continue) => {}
                Ok(Flow::Done) => break,
                Err(e) => {
                    self.session.fail(StatusSource::Ingest, &e);
                    break;
                }
            }
        }
        info!("Ingest worker exiting");
        self.writer
    }

    fn step(&mut self) -> ComResult<Flow> {
        match self.keys.next_event(KEY_POLL)? {
            None => {
                self.set_sending(false)?;
                Ok(Flow::Continue)
            }
            Some(TermEvent::Resize) => {
                self.session.resize_surfaces()?;
                Ok(Flow::Continue)
            }
            Some(TermEvent::Key(bytes)) => self.handle_key(&bytes),
        }
    }

    fn handle_key(&mut self, key: &[u8]) -> ComResult<Flow> {
        let mut outgoing = Vec::new();

        for action in self.machine.feed_all(key) {
            match action {
                KeyAction::Send(bytes) => outgoing.extend(bytes),
                KeyAction::EnterCommand => {
                    self.transmit(&mut outgoing)?;
                    self.session.set_status(StatusSource::CommandPage, COMMAND_MODE)?;
                }
                KeyAction::Ignored => {
                    self.transmit(&mut outgoing)?;
                    self.session.set_status(StatusSource::CommandPage, "")?;
                }
                KeyAction::Command(command) => {
                    self.transmit(&mut outgoing)?;
                    self.session.set_status(StatusSource::CommandPage, "")?;
                    if let Flow::Done = self.run_command(command)? {
                        return Ok(Flow::Done);
                    }
                }
            }
        }

        self.transmit(&mut outgoing)?;
        Ok(Flow::Continue)
    }

    fn run_command(&mut self, command: Command) -> ComResult<Flow> {
        debug!("Running command: {}", command);
        match command {
            Command::Quit => {
                self.session.request_stop(StopReason::QuitRequested);
                return Ok(Flow::Done);
            }
            Command::ShowStats => self.session.show_stats()?,
            Command::ClearOutput => self.session.clear_output()?,
            Command::Help => {
                let help = Command::help_text(self.session.config().escape);
                self.session.insert_text(&help)?;
            }
        }
        Ok(Flow::Continue)
    }

    /// Write pending bytes to the serial channel, echoing them if enabled
    fn transmit(&mut self, pending: &mut Vec<u8>) -> ComResult<()> {
        if pending.is_empty() {
            return Ok(());
        }

        self.set_sending(true)?;
        self.writer.write_all(pending)?;
        self.writer.flush()?;
        self.session.traffic().add_sent(pending.len());

        if let Some(decoder) = self.echo.as_mut() {
            self.session.write_output(&decoder.decode(pending))?;
        }

        pending.clear();
        Ok(())
    }

    fn set_sending(&mut self, sending: bool) -> ComResult<()> {
        if self.sending == sending {
            return Ok(());
        }
        self.sending = sending;
        self.session
            .set_status(StatusSource::Ingest, if sending { SENDING } else { "" })
    }
}
