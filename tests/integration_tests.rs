use duplexcom::core::session::SessionPhase;
use duplexcom::infrastructure::capture::CaptureLog;
use duplexcom::infrastructure::serial::SerialLink;
use duplexcom::tui::{KeySource, TermEvent, TerminalSurface};
use duplexcom::{ComResult, Config, Runtime, Session, StatusSource, StopReason};
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Integration tests for a full session: both workers, the latch and teardown
#[cfg(test)]
mod integration_tests {
    use super::*;

    struct ScriptedKeys(VecDeque<TermEvent>);

    impl KeySource for ScriptedKeys {
        fn next_event(&mut self, timeout: Duration) -> ComResult<Option<TermEvent>> {
            match self.0.pop_front() {
                Some(event) => Ok(Some(event)),
                None => {
                    std::thread::sleep(timeout);
                    Ok(None)
                }
            }
        }
    }

    /// Key source fed by the test thread
    struct ChannelKeys(Receiver<TermEvent>);

    impl KeySource for ChannelKeys {
        fn next_event(&mut self, timeout: Duration) -> ComResult<Option<TermEvent>> {
            Ok(self.0.recv_timeout(timeout).ok())
        }
    }

    struct ChannelReader(Receiver<io::Result<Vec<u8>>>);

    impl Read for ChannelReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.recv_timeout(Duration::from_millis(5)) {
                Ok(Ok(chunk)) => {
                    buf[..chunk.len()].copy_from_slice(&chunk);
                    Ok(chunk.len())
                }
                Ok(Err(e)) => Err(e),
                Err(RecvTimeoutError::Timeout) => {
                    Err(io::Error::new(io::ErrorKind::TimedOut, "poll"))
                }
                Err(RecvTimeoutError::Disconnected) => Ok(0),
            }
        }
    }

    #[derive(Clone, Default)]
    struct SharedWriter(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Device {
        tx: Sender<io::Result<Vec<u8>>>,
        written: SharedWriter,
    }

    fn link() -> (SerialLink, Device) {
        let (tx, rx) = mpsc::channel();
        let written = SharedWriter::default();
        let link = SerialLink::from_parts(Box::new(ChannelReader(rx)), Box::new(written.clone()));
        (link, Device { tx, written })
    }

    fn session(config: Config) -> Arc<Session> {
        let surface = TerminalSurface::headless(80, 24).unwrap();
        Arc::new(Session::new(config, Box::new(surface)))
    }

    fn config() -> Config {
        Config::new("/dev/ttyUSB0", "/tmp/none")
    }

    fn key(bytes: &[u8]) -> TermEvent {
        TermEvent::Key(bytes.to_vec())
    }

    #[test]
    fn test_typed_line_reaches_device_and_quit_stops() {
        let (link, device) = link();
        let session = session(config());
        let keys = ScriptedKeys(
            vec![key(b"l"), key(b"s"), key(b"\n"), key(&[0x02]), key(b"q")].into(),
        );

        let runtime = Runtime::start(Arc::clone(&session), link, Box::new(keys), None).unwrap();

        assert_eq!(runtime.run(), StopReason::QuitRequested);
        assert_eq!(session.phase(), SessionPhase::Stopped);
        assert_eq!(*device.written.0.lock().unwrap(), b"ls\r\n");
    }

    #[test]
    fn test_device_output_is_rendered_and_captured() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let capture_path = temp_dir.path().join("capture.log");
        let capture = CaptureLog::open(&capture_path).unwrap();

        let (link, device) = link();
        let session = session(config());
        let (key_tx, key_rx) = mpsc::channel();

        let runtime = Runtime::start(
            Arc::clone(&session),
            link,
            Box::new(ChannelKeys(key_rx)),
            Some(capture),
        )
        .unwrap();

        device.tx.send(Ok(b"\x1b[1;32mPASS\x1b".to_vec())).unwrap();
        device.tx.send(Ok(b"[0m\r\n$ ".to_vec())).unwrap();

        // The quit keys are only sent once the output is on screen
        let mut rendered = false;
        for _ in 0..200 {
            if session.snapshot().output.first().map(String::as_str) == Some("PASS") {
                rendered = true;
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(rendered);

        key_tx.send(key(&[0x02])).unwrap();
        key_tx.send(key(b"q")).unwrap();
        assert_eq!(runtime.run(), StopReason::QuitRequested);

        assert_eq!(session.snapshot().output, vec!["PASS", "$ "]);
        assert_eq!(
            std::fs::read(&capture_path).unwrap(),
            b"\x1b[1;32mPASS\x1b[0m\r\n$ "
        );
        assert_eq!(session.traffic().received(), 19);
    }

    #[test]
    fn test_fatal_read_error_stops_session() {
        let (link, device) = link();
        let session = session(config());

        let runtime = Runtime::start(
            Arc::clone(&session),
            link,
            Box::new(ScriptedKeys(VecDeque::new())),
            None,
        )
        .unwrap();

        device
            .tx
            .send(Err(io::Error::new(io::ErrorKind::Other, "Input/output error")))
            .unwrap();

        let reason = runtime.run();
        assert_eq!(
            reason,
            StopReason::Fatal {
                source: StatusSource::Cheerios,
                message: "I/O error: Input/output error".to_string(),
            }
        );
        assert_eq!(session.phase(), SessionPhase::Stopped);
        assert!(session
            .snapshot()
            .status
            .contains("I/O error: Input/output error"));
    }

    #[test]
    fn test_device_hangup_is_fatal() {
        let (link, device) = link();
        let session = session(config());

        let runtime = Runtime::start(
            Arc::clone(&session),
            link,
            Box::new(ScriptedKeys(VecDeque::new())),
            None,
        )
        .unwrap();
        drop(device);

        let reason = runtime.run();
        assert!(reason.is_fatal());
        assert_eq!(session.status(StatusSource::Cheerios), "Serial device closed");
    }

    #[test]
    fn test_commands_during_session() {
        let mut config = config();
        config.echo = true;
        let (link, device) = link();
        let session = session(config);
        let keys = ScriptedKeys(
            vec![
                key(b"x"),
                key(&[0x02]),
                key(b"c"),
                key(&[0x02]),
                key(b"h"),
                key(&[0x02]),
                key(b"q"),
            ]
            .into(),
        );

        let runtime = Runtime::start(Arc::clone(&session), link, Box::new(keys), None).unwrap();
        assert_eq!(runtime.run(), StopReason::QuitRequested);

        let output = session.snapshot().output;
        // The echoed x was cleared, the help text follows
        assert_eq!(output[0], "^B q: quit");
        assert_eq!(output.iter().filter(|line| line.starts_with("^B ")).count(), 4);
        assert_eq!(*device.written.0.lock().unwrap(), b"x");
        assert_eq!(session.status(StatusSource::CommandPage), "");
    }

    #[test]
    fn test_resize_event_refits_status() {
        let (link, _device) = link();
        let session = session(config());
        session.set_status(StatusSource::Session, "/dev/ttyUSB0").unwrap();

        let keys = ScriptedKeys(vec![TermEvent::Resize, key(&[0x02]), key(b"q")].into());
        let runtime = Runtime::start(Arc::clone(&session), link, Box::new(keys), None).unwrap();
        assert_eq!(runtime.run(), StopReason::QuitRequested);

        let status = session.snapshot().status;
        assert!(status.starts_with("|--/dev/ttyUSB0--|"));
        assert_eq!(status.chars().count(), 80);
    }
}
