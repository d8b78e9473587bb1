// Serial module - Serial device access
pub mod client;

pub use client::{LinkGuard, SerialLink, SerialReader, SerialWriter, PTY_PATH, READ_POLL};
