use duplexcom::core::session::SessionPhase;
use duplexcom::infrastructure::serial::SerialLink;
use duplexcom::tui::{KeySource, OutputAction, TermEvent, TerminalSurface};
use duplexcom::{ComResult, Config, Runtime, Session, StatusSource};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Stress tests for the shared render and status locks
#[cfg(test)]
mod performance_tests {
    use super::*;
    use std::io::{self, Read};
    use std::sync::mpsc;

    struct IdleKeys;

    impl KeySource for IdleKeys {
        fn next_event(&mut self, timeout: Duration) -> ComResult<Option<TermEvent>> {
            thread::sleep(timeout);
            Ok(None)
        }
    }

    fn session(width: u16) -> Arc<Session> {
        let surface = TerminalSurface::headless(width, 24).unwrap();
        Arc::new(Session::new(
            Config::new("/dev/ttyUSB0", "/tmp/none"),
            Box::new(surface),
        ))
    }

    #[test]
    fn test_status_slots_under_contention() {
        let session = session(120);

        let writers: Vec<_> = StatusSource::ALL
            .into_iter()
            .map(|source| {
                let session = Arc::clone(&session);
                thread::spawn(move || {
                    for i in 0..100 {
                        session.set_status(source, format!("{}{}", source, i)).unwrap();
                    }
                })
            })
            .collect();

        let output = {
            let session = Arc::clone(&session);
            thread::spawn(move || {
                for _ in 0..100 {
                    session
                        .write_output(&OutputAction::from_text("line\r\n"))
                        .unwrap();
                }
            })
        };

        for writer in writers {
            writer.join().unwrap();
        }
        output.join().unwrap();

        // Each slot keeps its own last value; no update bled into another
        for source in StatusSource::ALL {
            assert_eq!(session.status(source), format!("{}99", source));
        }
        let status = session.snapshot().status;
        assert!(status.starts_with("|--session99--|--ingest99--|--cheerios99--|--command99--|"));
        assert_eq!(status.chars().count(), 120);
    }

    #[test]
    fn test_large_output_keeps_bounded_scrollback() {
        let session = session(80);

        let start = Instant::now();
        let chunk = OutputAction::from_text(&"0123456789".repeat(8).repeat(2));
        for _ in 0..1000 {
            session.write_output(&chunk).unwrap();
        }
        let elapsed = start.elapsed();

        assert_eq!(session.snapshot().output.len(), 22);
        assert!(elapsed < Duration::from_secs(30), "rendering took {:?}", elapsed);
    }

    #[test]
    fn test_teardown_is_prompt() {
        let (_tx, rx) = mpsc::channel::<Vec<u8>>();
        let link = SerialLink::from_parts(Box::new(QuietLine(rx)), Box::new(io::sink()));
        let session = session(80);

        let mut runtime =
            Runtime::start(Arc::clone(&session), link, Box::new(IdleKeys), None).unwrap();
        thread::sleep(Duration::from_millis(50));

        let start = Instant::now();
        runtime.shutdown();
        let elapsed = start.elapsed();

        assert_eq!(session.phase(), SessionPhase::Stopped);
        // Both workers wake within one poll tick
        assert!(elapsed < Duration::from_secs(1), "teardown took {:?}", elapsed);
    }

    /// Reader that times out until bytes arrive
    struct QuietLine(mpsc::Receiver<Vec<u8>>);

    impl Read for QuietLine {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.recv_timeout(Duration::from_millis(5)) {
                Ok(chunk) => {
                    buf[..chunk.len()].copy_from_slice(&chunk);
                    Ok(chunk.len())
                }
                Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "poll")),
            }
        }
    }
}
