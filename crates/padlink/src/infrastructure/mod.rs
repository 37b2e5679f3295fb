//! Infrastructure layer for the relay.
//!
//! Contains the platform adapters behind the application-layer traits:
//!
//! **Dependency rule**: this layer may depend on `application`, `domain`,
//! and `padlink_core`, but MUST NOT be imported by them (tests excepted).
//!
//! # Sub-modules
//!
//! - **`evdev_device`** – Linux evdev source and uinput sink, compiled only
//!   on Linux.
//!
//! - **`discovery`** – Finds the virtual device in sysfs by name and
//!   publishes symlink aliases to its `eventN`/`jsN` nodes.
//!
//! - **`storage`** – The optional TOML configuration file.
//!
//! - **`mock`** – In-memory implementations of every platform trait, used by
//!   unit and integration tests.

#[cfg(target_os = "linux")]
pub mod evdev_device;

#[cfg(unix)]
pub mod discovery;
pub mod mock;
pub mod storage;
