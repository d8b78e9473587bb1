use std::path::PathBuf;

use clap::Parser;

use crate::domain::{
    config::{Config, ConfigKey, ConfigOverrides, EscapeKey},
    error::ComResult,
    speed::LineSpeed,
};
use crate::infrastructure::config::ConfigLoader;

/// Command line arguments for duplexcom
#[derive(Parser, Debug)]
#[command(
    name = "duplexcom",
    version = env!("CARGO_PKG_VERSION"),
    about = "Interactive serial terminal",
    long_about = "Full-duplex serial terminal with ANSI color rendering. \
                  Press the escape key followed by h for the command list."
)]
pub struct Args {
    /// Serial device path (/dev/ptmx opens a pseudo-terminal pair)
    pub serial_path: String,

    /// Line speed, e.g. 115200
    #[arg(short, long)]
    pub baud: Option<String>,

    /// Capture every received byte to this file
    #[arg(short, long)]
    pub log: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Interpret ANSI colors (0 or 1)
    #[arg(long, value_name = "0|1", value_parser = parse_switch)]
    pub colors: Option<bool>,

    /// Echo typed bytes locally (0 or 1)
    #[arg(long, value_name = "0|1", value_parser = parse_switch)]
    pub echo: Option<bool>,

    /// Send a bare LF for the Enter key (0 or 1)
    #[arg(long, alias = "no_crlf", value_name = "0|1", value_parser = parse_switch)]
    pub no_crlf: Option<bool>,

    /// Command escape key: a character or caret notation such as ^B
    #[arg(long, value_name = "CHAR")]
    pub escape: Option<EscapeKey>,

    /// Write diagnostics to this file
    #[arg(long, value_name = "PATH")]
    pub trace: Option<PathBuf>,
}

fn parse_switch(value: &str) -> Result<bool, String> {
    match value {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(format!("expected 0 or 1, got '{}'", other)),
    }
}

impl Args {
    /// Build the command-line half of the configuration. Every setting given
    /// here is marked in the returned overrides so the config file cannot
    /// replace it.
    pub fn to_config(&self) -> ComResult<(Config, ConfigOverrides)> {
        let config_path = match &self.config {
            Some(path) => path.clone(),
            None => ConfigLoader::default_config_path()?,
        };

        let mut config = Config::new(self.serial_path.clone(), config_path);
        let mut overrides = ConfigOverrides::new();

        if let Some(baud) = &self.baud {
            config.speed = LineSpeed::parse(baud);
        }
        config.log_path = self.log.clone();

        if let Some(colors) = self.colors {
            config.colors = colors;
            overrides.set(ConfigKey::Colors);
        }
        if let Some(echo) = self.echo {
            config.echo = echo;
            overrides.set(ConfigKey::Echo);
        }
        if let Some(no_crlf) = self.no_crlf {
            config.no_crlf = no_crlf;
            overrides.set(ConfigKey::NoCrlf);
        }
        if let Some(escape) = self.escape {
            config.escape = escape;
            overrides.set(ConfigKey::Escape);
        }

        Ok((config, overrides))
    }
}
