//! # padlink-core
//!
//! Shared domain types for padlink, a relay that keeps a stable virtual
//! gamepad alive in front of a hot-pluggable physical one.
//!
//! This crate has zero dependencies on OS APIs, async runtimes, or the
//! filesystem.  Everything here can be built and tested on any platform.
//!
//! # What lives here? (for beginners)
//!
//! The Linux input subsystem describes every device with three things:
//!
//! - **What it can report** – a set of event codes per category (buttons,
//!   absolute axes, force-feedback effects).  Absolute axes also carry
//!   calibration metadata (min, max, fuzz, flat, resolution).  This is the
//!   [`CapabilityDescriptor`].
//! - **Who it claims to be** – the bus/vendor/product/version tuple that games
//!   use to look up controller mappings.  This is the [`DeviceIdentity`].
//! - **What it says** – a stream of `(category, code, value)` triples framed by
//!   synchronization markers.  This is the [`RelayEvent`].
//!
//! The relay copies the first two from the physical device onto a virtual one
//! exactly once, then forwards the third forever.
//!
//! - **`domain`** – capability descriptor, identity tuple, and the link state
//!   machine vocabulary (`LinkState`, `LinkTiming`).
//! - **`event`** – the relay event type, event-type constants, and a small
//!   table of well-known gamepad codes.

pub mod domain;
pub mod event;

// Re-export the most-used types at the crate root so callers can write
// `padlink_core::CapabilityDescriptor` instead of the full module path.
pub use domain::capability::{
    AxisCalibration, CapabilityDescriptor, CapabilityDescriptorBuilder, CapabilityError,
    EventCategory,
};
pub use domain::identity::DeviceIdentity;
pub use domain::link::{LinkState, LinkTiming};
pub use event::RelayEvent;
