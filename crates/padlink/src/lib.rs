//! padlink library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does padlink do? (for beginners)
//!
//! Sandboxed game sessions often cannot see `/dev/input/eventN` of the real
//! controller, and even when they can, unplugging the controller makes the
//! node disappear and most games never notice it coming back.  padlink runs as
//! a privileged helper that:
//!
//! 1. Waits for the physical gamepad to appear at a configured path.
//! 2. Copies its capabilities (buttons, calibrated axes, force-feedback
//!    effects) and its bus/vendor/product/version identity.
//! 3. Creates **one** virtual uinput device with those capabilities and
//!    identity, and publishes stable symlinks to its event and joystick nodes.
//! 4. Grabs the physical device and relays every event to the virtual one.
//! 5. When the physical device disconnects, waits for it to return and
//!    resumes relaying.  The virtual device is never recreated, so consumers
//!    see an uninterrupted controller.

/// Domain layer: the runtime configuration value.
pub mod domain;

/// Application layer: capability mirroring, device provisioning, the
/// forwarding loop, and startup orchestration.
pub mod application;

/// Infrastructure layer: evdev/uinput adapters, sysfs discovery, TOML config,
/// and in-memory mocks.
pub mod infrastructure;
