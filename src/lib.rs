//! duplexcom library
//!
//! Full-duplex serial terminal: an input worker forwards keystrokes to the
//! device, an output worker renders what the device sends, and the main
//! thread waits for quit or a fatal error to tear both down.

pub mod cli;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod tui;

pub use crate::core::session::{Session, StatusSource, StopReason};
pub use crate::core::Runtime;
pub use domain::config::Config;
pub use domain::error::{ComError, ComResult};
pub use tui::app::App;
