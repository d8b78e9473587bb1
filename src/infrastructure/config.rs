use crate::domain::{
    config::{Config, ConfigKey, ConfigOverrides, EscapeKey},
    error::{ComError, ComResult},
};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Loader for the line-oriented `key=value` config file.
pub struct ConfigLoader {
    overrides: ConfigOverrides,
}

impl ConfigLoader {
    /// Create a loader that leaves every key in `overrides` alone
    pub fn new(overrides: ConfigOverrides) -> Self {
        Self { overrides }
    }

    /// Default config path, `$HOME/.config/duplexcom/config`
    pub fn default_config_path() -> ComResult<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| ComError::Config {
            message: "Could not determine home directory".to_string(),
        })?;

        Ok(home.join(".config").join("duplexcom").join("config"))
    }

    /// Merge the file at `config.config_path` into `config`.
    ///
    /// A missing file is not an error.
    pub fn load(&self, config: &mut Config) -> ComResult<()> {
        let path = config.config_path.clone();
        match fs::read_to_string(&path) {
            Ok(content) => {
                info!("Loading config file {}", path.display());
                self.apply_str(config, &content);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No config file at {}", path.display());
                Ok(())
            }
            Err(e) => Err(Self::read_error(&path, e)),
        }
    }

    /// Apply every recognized line of `content` to `config`. Unknown and
    /// malformed lines are skipped.
    pub fn apply_str(&self, config: &mut Config, content: &str) {
        for line in content.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };

            match key.trim() {
                "colors" => self.apply_switch(ConfigKey::Colors, value, &mut config.colors),
                "echo" => self.apply_switch(ConfigKey::Echo, value, &mut config.echo),
                "no_crlf" => self.apply_switch(ConfigKey::NoCrlf, value, &mut config.no_crlf),
                "escape" => {
                    if self.overrides.contains(ConfigKey::Escape) {
                        continue;
                    }
                    if let Some(c) = value.chars().next().filter(char::is_ascii) {
                        config.escape = EscapeKey::new(c as u8);
                    }
                }
                other => debug!("Ignoring config key '{}'", other),
            }
        }
    }

    fn apply_switch(&self, key: ConfigKey, value: &str, target: &mut bool) {
        if self.overrides.contains(key) {
            return;
        }
        match value.trim_start().chars().next() {
            Some('0') => *target = false,
            Some('1') => *target = true,
            _ => {}
        }
    }

    fn read_error(path: &Path, e: io::Error) -> ComError {
        ComError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(ConfigOverrides::new())
    }
}
