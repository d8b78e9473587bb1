use thiserror::Error;

/// DuplexCom unified error type
#[derive(Error, Debug)]
pub enum ComError {
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to open serial port {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: serialport::Error,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("Failed to start {worker} worker: {source}")]
    Spawn {
        worker: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Serial device closed")]
    DeviceClosed,

    #[error("Capture log error: {0}")]
    Capture(String),
}

pub type ComResult<T> = Result<T, ComError>;
