// Session module - Shared session state and shutdown coordination
pub mod session;
pub mod shutdown;
pub mod status;

pub use session::{Session, SessionPhase, TrafficStats};
pub use shutdown::{ShutdownLatch, StopReason};
pub use status::{StatusSlots, StatusSource};
