// Domain module - Configuration, line speeds and errors
pub mod config;
pub mod error;
pub mod speed;

pub use config::{Config, ConfigKey, ConfigOverrides, EscapeKey};
pub use error::{ComError, ComResult};
pub use speed::LineSpeed;
