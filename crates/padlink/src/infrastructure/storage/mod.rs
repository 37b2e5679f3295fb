//! Storage infrastructure: the optional TOML configuration file.
//!
//! The `config` sub-module reads the file and turns it into a
//! [`RelayConfig`](crate::domain::RelayConfig).  Nothing is ever written
//! back; the relay has no settings of its own to persist.

pub mod config;
