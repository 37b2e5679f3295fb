//! Relay configuration.
//!
//! [`RelayConfig`] is the single source of truth for all runtime settings.
//! It is built once in `main.rs` (defaults, then an optional TOML file, then
//! environment variables, then CLI flags) and handed by reference to every
//! component that needs it.
//!
//! # Design rationale
//!
//! Keeping configuration as a plain struct (no global state, no environment
//! variable reads inside the application layer) means the forwarding loop
//! and the startup sequence can be driven from tests with any configuration
//! they like.  Paths are opaque: the core never interprets them beyond
//! handing them to the platform adapters.

use std::path::PathBuf;
use std::time::Duration;

use padlink_core::LinkTiming;

/// Default physical device path (a stable udev `by-id` link).
pub const DEFAULT_DEVICE_PATH: &str =
    "/dev/input/by-id/usb-1038_SteelSeries_Stratus_Duo-event-joystick";
/// Default alias for the virtual device's event node.
pub const DEFAULT_EVENT_ALIAS: &str = "/tmp/gamepad-event";
/// Default alias for the virtual device's joystick node.
pub const DEFAULT_JS_ALIAS: &str = "/tmp/gamepad-js";
/// Default display name of the virtual device.
pub const DEFAULT_VIRTUAL_NAME: &str = "VirtualGamepad";

/// All runtime configuration for the relay.
///
/// # Example
///
/// ```rust
/// use padlink::domain::RelayConfig;
///
/// let cfg = RelayConfig::default();
/// assert_eq!(cfg.virtual_name, "VirtualGamepad");
/// assert!(cfg.mirror_identity);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Path of the physical device's event node.
    ///
    /// A udev `by-id` symlink is recommended: it survives re-enumeration,
    /// while `/dev/input/eventN` numbers change on every reconnect.
    pub device_path: PathBuf,

    /// Stable alias published for the virtual device's `eventN` node.
    pub event_alias: PathBuf,

    /// Stable alias published for the virtual device's `jsN` node.
    pub js_alias: PathBuf,

    /// Display name given to the virtual device.  Discovery locates the
    /// device's sysfs entry by this name.
    pub virtual_name: String,

    /// Present the physical device's bus/vendor/product/version on the
    /// virtual device.  When `false` the virtual device reports
    /// `BUS_VIRTUAL` with zero ids.
    pub mirror_identity: bool,

    /// Polling interval while awaiting the device, and backoff after a lost
    /// link.
    pub timing: LinkTiming,

    /// How many times discovery is attempted before giving up.
    pub discovery_attempts: u32,

    /// Delay between discovery attempts.
    pub discovery_retry_delay: Duration,

    /// Root of the input class in sysfs.
    pub sysfs_input_root: PathBuf,

    /// Directory holding the input device nodes.
    pub dev_input_root: PathBuf,
}

impl Default for RelayConfig {
    /// | Field                 | Default                                       |
    /// |-----------------------|-----------------------------------------------|
    /// | device_path           | SteelSeries Stratus Duo `by-id` event link    |
    /// | event_alias           | `/tmp/gamepad-event`                          |
    /// | js_alias              | `/tmp/gamepad-js`                             |
    /// | virtual_name          | `VirtualGamepad`                              |
    /// | mirror_identity       | `true`                                        |
    /// | timing                | 1 s poll, 1 s backoff                         |
    /// | discovery_attempts    | 5                                             |
    /// | discovery_retry_delay | 200 ms                                        |
    /// | sysfs_input_root      | `/sys/class/input`                            |
    /// | dev_input_root        | `/dev/input`                                  |
    fn default() -> Self {
        Self {
            device_path: PathBuf::from(DEFAULT_DEVICE_PATH),
            event_alias: PathBuf::from(DEFAULT_EVENT_ALIAS),
            js_alias: PathBuf::from(DEFAULT_JS_ALIAS),
            virtual_name: DEFAULT_VIRTUAL_NAME.to_string(),
            mirror_identity: true,
            timing: LinkTiming::default(),
            discovery_attempts: 5,
            discovery_retry_delay: Duration::from_millis(200),
            sysfs_input_root: PathBuf::from("/sys/class/input"),
            dev_input_root: PathBuf::from("/dev/input"),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
