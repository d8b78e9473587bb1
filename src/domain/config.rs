use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::speed::LineSpeed;

/// Effective session configuration.
///
/// Built once from the command line and the config file before any worker
/// starts, then shared read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Serial line speed
    pub speed: LineSpeed,
    /// Interpret ANSI color sequences received from the device
    pub colors: bool,
    /// Echo typed bytes into the output region
    pub echo: bool,
    /// Send a bare LF instead of CRLF for the line-feed key
    pub no_crlf: bool,
    /// Byte that switches the keyboard path into command mode
    pub escape: EscapeKey,
    /// Serial device path
    pub serial_path: String,
    /// Raw capture of every received byte
    pub log_path: Option<PathBuf>,
    /// Config file consulted at startup
    pub config_path: PathBuf,
}

impl Config {
    pub fn new(serial_path: impl Into<String>, config_path: impl Into<PathBuf>) -> Self {
        Self {
            speed: LineSpeed::default(),
            colors: default_colors(),
            echo: default_echo(),
            no_crlf: default_no_crlf(),
            escape: EscapeKey::default(),
            serial_path: serial_path.into(),
            log_path: None,
            config_path: config_path.into(),
        }
    }

    /// One `key: value` line per setting, as shown by the stats command.
    pub fn describe(&self) -> Vec<String> {
        vec![
            format!("colors: {}", enabled(self.colors)),
            format!("echo: {}", enabled(self.echo)),
            format!("no_crlf: {}", enabled(self.no_crlf)),
            format!("escape: {}", self.escape),
            format!("baud: {}", self.speed),
            format!("config_path: {}", self.config_path.display()),
            format!(
                "log_path: {}",
                self.log_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default()
            ),
            format!("serial_path: {}", self.serial_path),
        ]
    }
}

fn enabled(flag: bool) -> &'static str {
    if flag {
        "enabled"
    } else {
        "disabled"
    }
}

// Default value functions
fn default_colors() -> bool {
    true
}

fn default_echo() -> bool {
    false
}

fn default_no_crlf() -> bool {
    false
}

/// Settings that the config file may supply and the command line may pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    Colors,
    Echo,
    NoCrlf,
    Escape,
}

impl ConfigKey {
    fn bit(self) -> u8 {
        match self {
            ConfigKey::Colors => 1 << 0,
            ConfigKey::Echo => 1 << 1,
            ConfigKey::NoCrlf => 1 << 2,
            ConfigKey::Escape => 1 << 3,
        }
    }
}

/// Bitset of settings given explicitly on the command line. The config file
/// loader leaves these untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigOverrides(u8);

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: ConfigKey) {
        self.0 |= key.bit();
    }

    pub fn contains(self, key: ConfigKey) -> bool {
        self.0 & key.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Single-byte escape trigger.
///
/// Parses either a literal ASCII character (`a`) or caret notation for a
/// control character (`^B`); displays control characters in caret notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscapeKey(u8);

/// Ctrl+B
pub const DEFAULT_ESCAPE: u8 = 0x02;

impl EscapeKey {
    pub fn new(byte: u8) -> Self {
        Self(byte)
    }

    pub fn byte(self) -> u8 {
        self.0
    }
}

impl Default for EscapeKey {
    fn default() -> Self {
        Self(DEFAULT_ESCAPE)
    }
}

impl FromStr for EscapeKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        match bytes {
            [b] if b.is_ascii() => Ok(Self(*b)),
            [b'^', c] if (b'@'..=b'_').contains(&c.to_ascii_uppercase()) => {
                Ok(Self(c.to_ascii_uppercase() & 0x1f))
            }
            [b'^', b'?'] => Ok(Self(0x7f)),
            _ => Err(format!(
                "escape must be a single ASCII character or ^X notation, got '{}'",
                s
            )),
        }
    }
}

impl fmt::Display for EscapeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0x7f => write!(f, "^?"),
            b if b < 0x20 => write!(f, "^{}", (b | 0x40) as char),
            b => write!(f, "{}", b as char),
        }
    }
}
