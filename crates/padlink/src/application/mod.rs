//! Application layer use cases for the relay.
//!
//! # What use cases does the relay have?
//!
//! - **`mirror_capabilities`** – Reads buttons, calibrated axes,
//!   force-feedback effects, and the identity tuple from an open
//!   [`CapabilitySource`](mirror_capabilities::CapabilitySource).
//!
//! - **`provision_device`** – Creates the single virtual device through a
//!   [`VirtualDeviceFactory`](provision_device::VirtualDeviceFactory).
//!
//! - **`publish_aliases`** – Points stable paths at the virtual device's
//!   kernel-numbered nodes, with bounded retries.
//!
//! - **`forward_events`** – The wait/acquire/relay supervisor that survives
//!   physical disconnects.
//!
//! - **`bootstrap`** – Wires the above together at startup.
//!
//! Each use case depends only on traits.  The evdev adapters and the
//! in-memory mocks in `infrastructure` implement them.

pub mod bootstrap;
pub mod forward_events;
pub mod mirror_capabilities;
pub mod provision_device;
pub mod publish_aliases;
