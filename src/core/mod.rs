// Core module - Session state, key handling and the worker threads
pub mod decode;
pub mod escape;
pub mod runtime;
pub mod session;
pub mod signals;
pub mod worker;

pub use runtime::Runtime;
pub use signals::{SignalWatch, TERMINATION_SIGNALS};
