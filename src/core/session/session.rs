use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, info, warn};

use super::shutdown::{ShutdownLatch, StopReason};
use super::status::{StatusSlots, StatusSource};
use crate::domain::{
    config::Config,
    error::{ComError, ComResult},
};
use crate::tui::{OutputAction, Surface, SurfaceSnapshot};

/// Session lifecycle. Only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Running,
    Stopping,
    Stopped,
}

/// Byte counters for the stats command
#[derive(Debug, Default)]
pub struct TrafficStats {
    sent: AtomicU64,
    received: AtomicU64,
}

impl TrafficStats {
    pub fn add_sent(&self, bytes: usize) {
        self.sent.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn add_received(&self, bytes: usize) {
        self.received.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn sent(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }

    pub fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }
}

/// State shared by the main thread and both workers.
///
/// Lock order is render, then status. The status lock is only held long
/// enough to swap or copy text; every surface call happens under the render
/// lock.
pub struct Session {
    config: Config,
    status: Mutex<StatusSlots>,
    render: Mutex<Box<dyn Surface>>,
    latch: ShutdownLatch,
    phase: Mutex<SessionPhase>,
    traffic: TrafficStats,
}

impl Session {
    pub fn new(config: Config, surface: Box<dyn Surface>) -> Self {
        Self {
            config,
            status: Mutex::new(StatusSlots::new()),
            render: Mutex::new(surface),
            latch: ShutdownLatch::new(),
            phase: Mutex::new(SessionPhase::Running),
            traffic: TrafficStats::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn traffic(&self) -> &TrafficStats {
        &self.traffic
    }

    /// Replace one status slot and repaint the status bar
    pub fn set_status(&self, source: StatusSource, text: impl Into<String>) -> ComResult<()> {
        self.lock_status().set(source, text.into());
        self.repaint_status()
    }

    pub fn status(&self, source: StatusSource) -> String {
        self.lock_status().get(source).to_string()
    }

    /// Compose all four slots and draw them into the status region
    pub fn repaint_status(&self) -> ComResult<()> {
        let mut surface = self.lock_surface();
        self.repaint_locked(&mut surface)
    }

    /// Fit every region to the current terminal size and repaint
    pub fn resize_surfaces(&self) -> ComResult<()> {
        let mut surface = self.lock_surface();
        surface.resize()?;
        debug!("Regions resized to width {}", surface.width());
        self.repaint_locked(&mut surface)
    }

    fn repaint_locked(&self, surface: &mut Box<dyn Surface>) -> ComResult<()> {
        let line = self.lock_status().compose(usize::from(surface.width()));
        surface.write_status(&line)
    }

    pub fn write_output(&self, actions: &[OutputAction]) -> ComResult<()> {
        self.lock_surface().write_output(actions)
    }

    /// Write locally generated text to the output region
    pub fn insert_text(&self, text: &str) -> ComResult<()> {
        self.write_output(&OutputAction::from_text(text))
    }

    pub fn clear_output(&self) -> ComResult<()> {
        self.lock_surface().clear_output()
    }

    /// Print settings and traffic counters into the output region
    pub fn show_stats(&self) -> ComResult<()> {
        let mut text = String::new();
        for line in self.config.describe() {
            text.push_str(&line);
            text.push_str("\r\n");
        }
        text.push_str(&format!("bytes_sent: {}\r\n", self.traffic.sent()));
        text.push_str(&format!("bytes_received: {}\r\n", self.traffic.received()));
        self.insert_text(&text)
    }

    /// Exclusive access to the render surface. Anything written to the
    /// output region must happen while this guard is held.
    pub fn lock_surface(&self) -> MutexGuard<'_, Box<dyn Surface>> {
        self.render.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> SurfaceSnapshot {
        self.lock_surface().snapshot()
    }

    fn lock_status(&self) -> MutexGuard<'_, StatusSlots> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wake the main thread. Returns `true` if this call tripped the latch.
    pub fn request_stop(&self, reason: StopReason) -> bool {
        let first = self.latch.signal(reason.clone());
        if first {
            info!("Stop requested: {}", reason);
        }
        first
    }

    pub fn stop_requested(&self) -> bool {
        self.latch.is_signaled()
    }

    /// Block until a stop is requested
    pub fn wait_for_stop(&self) -> StopReason {
        self.latch.wait()
    }

    /// Report a runtime-fatal worker error: show it in the worker's slot,
    /// then signal shutdown
    pub fn fail(&self, source: StatusSource, err: &ComError) {
        let message = err.to_string();
        error!("{} failed: {}", source, message);
        if let Err(e) = self.set_status(source, message.clone()) {
            warn!("Could not show {} failure in status bar: {}", source, e);
        }
        self.request_stop(StopReason::Fatal { source, message });
    }

    pub fn phase(&self) -> SessionPhase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move `Running` to `Stopping`. Returns `false` when teardown has
    /// already started.
    pub fn begin_teardown(&self) -> bool {
        let mut phase = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
        if *phase != SessionPhase::Running {
            return false;
        }
        *phase = SessionPhase::Stopping;
        true
    }

    pub fn finish_teardown(&self) {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = SessionPhase::Stopped;
    }

    /// Tear down all three regions
    pub fn destroy_surface(&self) -> ComResult<()> {
        self.lock_surface().destroy()
    }
}
