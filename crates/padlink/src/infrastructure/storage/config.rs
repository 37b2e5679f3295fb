//! TOML configuration file for the relay.
//!
//! The file is optional.  When `--config PATH` is given the file must exist;
//! otherwise `$XDG_CONFIG_HOME/padlink/config.toml` (or
//! `~/.config/padlink/config.toml`) is read if present and silently skipped
//! if not.  Environment variables and CLI flags are applied on top of the
//! result in `main.rs`.
//!
//! Every key is optional:
//!
//! ```toml
//! [device]
//! path = "/dev/input/by-id/usb-1038_SteelSeries_Stratus_Duo-event-joystick"
//! mirror_identity = true
//!
//! [virtual_device]
//! name = "VirtualGamepad"
//! event_alias = "/tmp/gamepad-event"
//! js_alias = "/tmp/gamepad-js"
//!
//! [timing]
//! poll_interval_ms = 1000
//! backoff_ms = 1000
//!
//! [discovery]
//! attempts = 5
//! retry_delay_ms = 200
//! sysfs_input_root = "/sys/class/input"
//! dev_input_root = "/dev/input"
//! ```
//!
//! Unknown keys are rejected so that a typo does not silently fall back to
//! a default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use padlink_core::LinkTiming;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::config::{
    RelayConfig, DEFAULT_DEVICE_PATH, DEFAULT_EVENT_ALIAS, DEFAULT_JS_ALIAS, DEFAULT_VIRTUAL_NAME,
};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub device: DeviceSection,
    pub virtual_device: VirtualDeviceSection,
    pub timing: TimingSection,
    pub discovery: DiscoverySection,
}

/// The physical device.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DeviceSection {
    #[serde(default = "default_device_path")]
    pub path: PathBuf,
    #[serde(default = "default_true")]
    pub mirror_identity: bool,
}

/// The virtual device and its aliases.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct VirtualDeviceSection {
    #[serde(default = "default_virtual_name")]
    pub name: String,
    #[serde(default = "default_event_alias")]
    pub event_alias: PathBuf,
    #[serde(default = "default_js_alias")]
    pub js_alias: PathBuf,
}

/// Loop timing in milliseconds.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TimingSection {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

/// Alias discovery.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DiscoverySection {
    #[serde(default = "default_discovery_attempts")]
    pub attempts: u32,
    #[serde(default = "default_discovery_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_sysfs_input_root")]
    pub sysfs_input_root: PathBuf,
    #[serde(default = "default_dev_input_root")]
    pub dev_input_root: PathBuf,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_device_path() -> PathBuf {
    PathBuf::from(DEFAULT_DEVICE_PATH)
}
fn default_true() -> bool {
    true
}
fn default_virtual_name() -> String {
    DEFAULT_VIRTUAL_NAME.to_string()
}
fn default_event_alias() -> PathBuf {
    PathBuf::from(DEFAULT_EVENT_ALIAS)
}
fn default_js_alias() -> PathBuf {
    PathBuf::from(DEFAULT_JS_ALIAS)
}
fn default_poll_interval_ms() -> u64 {
    LinkTiming::DEFAULT_POLL_INTERVAL.as_millis() as u64
}
fn default_backoff_ms() -> u64 {
    LinkTiming::DEFAULT_BACKOFF.as_millis() as u64
}
fn default_discovery_attempts() -> u32 {
    5
}
fn default_discovery_retry_delay_ms() -> u64 {
    200
}
fn default_sysfs_input_root() -> PathBuf {
    PathBuf::from("/sys/class/input")
}
fn default_dev_input_root() -> PathBuf {
    PathBuf::from("/dev/input")
}

impl Default for DeviceSection {
    fn default() -> Self {
        Self {
            path: default_device_path(),
            mirror_identity: default_true(),
        }
    }
}

impl Default for VirtualDeviceSection {
    fn default() -> Self {
        Self {
            name: default_virtual_name(),
            event_alias: default_event_alias(),
            js_alias: default_js_alias(),
        }
    }
}

impl Default for TimingSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

impl Default for DiscoverySection {
    fn default() -> Self {
        Self {
            attempts: default_discovery_attempts(),
            retry_delay_ms: default_discovery_retry_delay_ms(),
            sysfs_input_root: default_sysfs_input_root(),
            dev_input_root: default_dev_input_root(),
        }
    }
}

impl FileConfig {
    /// Converts the file layout into the runtime configuration value.
    pub fn into_relay_config(self) -> RelayConfig {
        RelayConfig {
            device_path: self.device.path,
            event_alias: self.virtual_device.event_alias,
            js_alias: self.virtual_device.js_alias,
            virtual_name: self.virtual_device.name,
            mirror_identity: self.device.mirror_identity,
            timing: LinkTiming {
                poll_interval: Duration::from_millis(self.timing.poll_interval_ms),
                backoff: Duration::from_millis(self.timing.backoff_ms),
            },
            discovery_attempts: self.discovery.attempts,
            discovery_retry_delay: Duration::from_millis(self.discovery.retry_delay_ms),
            sysfs_input_root: self.discovery.sysfs_input_root,
            dev_input_root: self.discovery.dev_input_root,
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Resolves the default config file path, if a home directory is known.
pub fn default_config_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
    Some(base.join("padlink").join("config.toml"))
}

/// Parses configuration from TOML text.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if the TOML is malformed or has unknown keys.
pub fn parse_config(content: &str) -> Result<FileConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Loads the configuration file.
///
/// With `Some(path)` the file must exist.  With `None` the default location
/// is tried and a missing file yields [`FileConfig::default`].
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors, and
/// [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: Option<&Path>) -> Result<FileConfig, ConfigError> {
    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => match default_config_path() {
            Some(path) => (path, false),
            None => return Ok(FileConfig::default()),
        },
    };

    match std::fs::read_to_string(&path) {
        Ok(content) => parse_config(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
            Ok(FileConfig::default())
        }
        Err(source) => Err(ConfigError::Io { path, source }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
