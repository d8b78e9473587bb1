use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::warn;

use crate::core::session::Session;
use crate::domain::error::ComResult;

/// Signals that end the session through the normal teardown path
#[cfg(unix)]
pub const TERMINATION_SIGNALS: &[i32] = &[
    signal_hook::consts::SIGINT,
    signal_hook::consts::SIGTERM,
    signal_hook::consts::SIGHUP,
];

#[cfg(not(unix))]
pub const TERMINATION_SIGNALS: &[i32] = &[];

/// Background thread that turns delivered signals into
/// [`StopReason::Interrupted`](crate::core::session::StopReason::Interrupted)
/// on the session's shutdown latch.
///
/// While installed the default action of the watched signals is replaced, so
/// the process no longer dies before the terminal has been restored.
pub struct SignalWatch {
    #[cfg(unix)]
    handle: Option<signal_hook::iterator::Handle>,
    thread: Option<JoinHandle<()>>,
}

impl SignalWatch {
    /// Watch `signals` until [`SignalWatch::close`]. An empty list installs
    /// nothing.
    #[cfg(unix)]
    pub fn install(session: Arc<Session>, signals: &[i32]) -> ComResult<Self> {
        use crate::core::session::StopReason;
        use crate::domain::error::ComError;
        use signal_hook::iterator::Signals;
        use tracing::{debug, info};

        if signals.is_empty() {
            return Ok(Self {
                handle: None,
                thread: None,
            });
        }

        let mut delivered = Signals::new(signals)?;
        let handle = delivered.handle();

        let thread = std::thread::Builder::new()
            .name("signals".to_string())
            .spawn(move || {
                for signal in delivered.forever() {
                    info!("Received signal {}", signal);
                    session.request_stop(StopReason::Interrupted { signal });
                }
                debug!("Signal watch closed");
            })
            .map_err(|source| ComError::Spawn {
                worker: "signals",
                source,
            })?;

        Ok(Self {
            handle: Some(handle),
            thread: Some(thread),
        })
    }

    #[cfg(not(unix))]
    pub fn install(_session: Arc<Session>, _signals: &[i32]) -> ComResult<Self> {
        Ok(Self { thread: None })
    }

    /// Stop watching and join the thread
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        #[cfg(unix)]
        if let Some(handle) = self.handle.take() {
            handle.close();
        }

        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Signal watch thread panicked");
            }
        }
    }
}

impl Drop for SignalWatch {
    fn drop(&mut self) {
        self.shutdown();
    }
}
