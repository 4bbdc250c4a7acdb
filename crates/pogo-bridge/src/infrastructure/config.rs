//! TOML configuration for the bridge.
//!
//! Every field has a default, so the bridge runs with no file at all and an
//! existing file only needs the keys it wants to change:
//!
//! ```toml
//! [serial]
//! device = "/dev/ttyS1"
//!
//! [hid]
//! device = "/dev/hidraw2"
//! report_id = 1
//!
//! [session]
//! keep_alive_ms = 400
//! poll_interval_ms = 10
//!
//! [identity]
//! serial_number = "RM712-311-00001"
//!
//! [logging]
//! level = "debug"
//! ```
//!
//! # Serde default values
//!
//! Fields annotated with `#[serde(default = "some_fn")]` take the value of
//! `some_fn()` when the key is missing. The `[identity]` table falls back to
//! [`DeviceIdentity::default`] field by field.

use std::path::{Path, PathBuf};
use std::time::Duration;

use pogo_core::DeviceIdentity;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level bridge configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BridgeConfig {
    #[serde(default)]
    pub serial: SerialConfig,
    #[serde(default)]
    pub hid: HidConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub identity: DeviceIdentity,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The serial line to the host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SerialConfig {
    #[serde(default = "default_serial_device")]
    pub device: PathBuf,
}

/// The USB keyboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HidConfig {
    #[serde(default = "default_hid_device")]
    pub device: PathBuf,
    /// Report id prefix used by composite keyboards; absent for plain boot
    /// keyboards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_id: Option<u8>,
}

/// Protocol timing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    /// Interval between liveness frames in keyboard mode.
    #[serde(default = "default_keep_alive_ms")]
    pub keep_alive_ms: u64,
    /// How often the event loop checks the keep-alive timer when idle.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl SessionConfig {
    pub fn keep_alive(&self) -> Duration {
        Duration::from_millis(self.keep_alive_ms)
    }

    /// Poll interval, never shorter than one millisecond.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

// ── Default value functions ───────────────────────────────────────────────────

fn default_serial_device() -> PathBuf {
    PathBuf::from("/dev/ttyS0")
}
fn default_hid_device() -> PathBuf {
    PathBuf::from("/dev/hidraw0")
}
fn default_keep_alive_ms() -> u64 {
    400
}
fn default_poll_interval_ms() -> u64 {
    10
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            device: default_serial_device(),
        }
    }
}

impl Default for HidConfig {
    fn default() -> Self {
        Self {
            device: default_hid_device(),
            report_id: None,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            keep_alive_ms: default_keep_alive_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ── Persistence ───────────────────────────────────────────────────────────────

impl BridgeConfig {
    /// Loads the configuration at `path`, returning the defaults if the file
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] for file-system errors other than "not
    /// found", and [`ConfigError::Parse`] if the TOML is malformed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Writes the configuration to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] for file-system failures or
    /// [`ConfigError::Serialize`] if serialization fails.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
