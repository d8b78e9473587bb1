// Worker module - The two I/O threads
pub mod cheerios;
pub mod ingest;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, error};

use crate::domain::error::{ComError, ComResult};

pub use cheerios::Cheerios;
pub use ingest::Ingest;

/// Cooperative stop request shared with one worker thread
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A running worker thread. Joining hands back whatever the worker owned
/// (its serial half), so the caller decides when that is closed.
pub struct WorkerHandle<T> {
    name: &'static str,
    stop: StopFlag,
    handle: JoinHandle<T>,
}

impl<T: Send + 'static> WorkerHandle<T> {
    pub fn spawn<F>(name: &'static str, body: F) -> ComResult<Self>
    where
        F: FnOnce(StopFlag) -> T + Send + 'static,
    {
        let stop = StopFlag::new();
        let worker_stop = stop.clone();
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || body(worker_stop))
            .map_err(|source| ComError::Spawn { worker: name, source })?;

        debug!("Started {} worker", name);
        Ok(Self { name, stop, handle })
    }

    /// Raise the stop flag and wait for the thread to finish.
    ///
    /// `None` if the worker panicked.
    pub fn stop(self) -> Option<T> {
        self.stop.raise();
        match self.handle.join() {
            Ok(owned) => {
                debug!("Stopped {} worker", self.name);
                Some(owned)
            }
            Err(_) => {
                error!("{} worker panicked", self.name);
                None
            }
        }
    }
}
