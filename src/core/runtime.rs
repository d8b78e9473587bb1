use std::sync::Arc;

use tracing::{info, warn};

use crate::core::session::{Session, StopReason};
use crate::core::worker::{Cheerios, Ingest, WorkerHandle};
use crate::domain::error::ComResult;
use crate::infrastructure::capture::CaptureLog;
use crate::infrastructure::serial::{LinkGuard, SerialLink, SerialReader, SerialWriter};
use crate::tui::KeySource;

/// Owns both worker threads for one session and tears everything down in
/// order: workers first, then the screen, then the serial channel.
pub struct Runtime {
    session: Arc<Session>,
    ingest: Option<WorkerHandle<SerialWriter>>,
    cheerios: Option<WorkerHandle<SerialReader>>,
    guard: Option<LinkGuard>,
}

impl Runtime {
    /// Start the output worker, then the input worker. If the second one
    /// cannot be started the first is stopped again before returning.
    pub fn start(
        session: Arc<Session>,
        link: SerialLink,
        keys: Box<dyn KeySource>,
        capture: Option<CaptureLog>,
    ) -> ComResult<Self> {
        let (reader, writer, guard) = link.split();

        let cheerios = Cheerios::new(Arc::clone(&session), reader, capture);
        let cheerios = WorkerHandle::spawn("cheerios", move |stop| cheerios.run(stop))?;

        let ingest = Ingest::new(Arc::clone(&session), keys, writer);
        let ingest = match WorkerHandle::spawn("ingest", move |stop| ingest.run(stop)) {
            Ok(handle) => handle,
            Err(e) => {
                cheerios.stop();
                return Err(e);
            }
        };

        info!("Session running");
        Ok(Self {
            session,
            ingest: Some(ingest),
            cheerios: Some(cheerios),
            guard: Some(guard),
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Block until quit, a fatal worker error or an interrupt, then tear down
    pub fn run(mut self) -> StopReason {
        let reason = self.session.wait_for_stop();
        info!("Stopping: {}", reason);
        self.shutdown();
        reason
    }

    /// Stop both workers, destroy the regions and close the channel.
    /// Only the first call does anything.
    pub fn shutdown(&mut self) {
        if !self.session.begin_teardown() {
            return;
        }

        let writer = self.ingest.take().and_then(WorkerHandle::stop);
        let reader = self.cheerios.take().and_then(WorkerHandle::stop);

        if let Err(e) = self.session.destroy_surface() {
            warn!("Failed to restore terminal: {}", e);
        }

        drop(writer);
        drop(reader);
        drop(self.guard.take());

        self.session.finish_teardown();
        info!("Session stopped");
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        self.shutdown();
    }
}
