use std::fmt;
use std::sync::{Condvar, Mutex, PoisonError};

use super::status::StatusSource;

/// Why a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The operator used the quit command
    QuitRequested,
    /// A worker hit an unrecoverable error
    Fatal { source: StatusSource, message: String },
    /// The process received a termination signal (SIGINT, SIGTERM, SIGHUP)
    Interrupted { signal: i32 },
}

impl StopReason {
    pub fn is_fatal(&self) -> bool {
        match self {
            StopReason::Fatal { .. } => true,
            StopReason::QuitRequested | StopReason::Interrupted { .. } => false,
        }
    }

    /// Process exit status for this reason; signals follow the shell's
    /// `128 + signo` convention
    pub fn exit_code(&self) -> i32 {
        match self {
            StopReason::QuitRequested => 0,
            StopReason::Fatal { .. } => 1,
            StopReason::Interrupted { signal } => 128 + signal,
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::QuitRequested => write!(f, "quit requested"),
            StopReason::Fatal { source, message } => write!(f, "{}: {}", source, message),
            StopReason::Interrupted { signal } => write!(f, "interrupted by signal {}", signal),
        }
    }
}

#[derive(Debug, Default)]
struct LatchState {
    reason: Option<StopReason>,
}

/// One-shot wake-up for the main thread.
///
/// The first signal wins and is remembered, so a signal sent before anyone
/// waits is not lost; later signals are ignored.
#[derive(Debug, Default)]
pub struct ShutdownLatch {
    state: Mutex<LatchState>,
    cond: Condvar,
}

impl ShutdownLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `reason` (unless already signaled) and wake the waiter.
    /// Returns `true` for the signal that tripped the latch.
    pub fn signal(&self, reason: StopReason) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let first = state.reason.is_none();
        if first {
            state.reason = Some(reason);
        }
        self.cond.notify_all();
        first
    }

    pub fn is_signaled(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .reason
            .is_some()
    }

    /// Block until signaled
    pub fn wait(&self) -> StopReason {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let state = self
            .cond
            .wait_while(state, |state| state.reason.is_none())
            .unwrap_or_else(PoisonError::into_inner);
        state.reason.clone().unwrap_or(StopReason::QuitRequested)
    }
}
