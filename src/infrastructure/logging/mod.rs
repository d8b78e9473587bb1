// Logging module - Diagnostics logging infrastructure
use crate::domain::error::{ComError, ComResult};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging system
///
/// The terminal belongs to the render surface while a session runs, so
/// diagnostics only go to `path`. Without a path no subscriber is installed.
pub fn init_logging(path: Option<&Path>) -> ComResult<()> {
    let Some(path) = path else {
        return Ok(());
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| ComError::Config {
            message: format!("Failed to open trace file {}: {}", path.display(), e),
        })?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("duplexcom=info,warn,error"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_file(true)
                .with_line_number(true)
        )
        .try_init()
        .map_err(|e| ComError::Config {
            message: format!("Failed to install trace subscriber: {}", e),
        })?;

    tracing::info!("DuplexCom logging system initialized");
    Ok(())
}
