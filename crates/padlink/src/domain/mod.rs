//! Domain layer for the padlink application.
//!
//! Holds [`RelayConfig`], the one configuration value built at startup and
//! passed explicitly to every component that needs it.  Device-level domain
//! types (capabilities, identity, events) live in `padlink-core`.

pub mod config;

pub use config::RelayConfig;
