//! evdev/uinput adapters (Linux only).
//!
//! - [`EvdevOpener`] / [`EvdevLink`] – open the physical device node, answer
//!   capability queries, grab it, and stream its events asynchronously.
//! - [`EvdevFactory`] / [`EvdevSink`] – create the uinput device and write
//!   events into it.
//!
//! # How reads suspend (for beginners)
//!
//! `Device::into_event_stream` switches the file descriptor to non-blocking
//! mode and registers it with the Tokio reactor.  `next_event().await` then
//! parks the task until the kernel has an event ready, so an idle but
//! connected controller costs nothing.  When the controller is unplugged the
//! descriptor becomes readable with an error (`ENODEV`), which surfaces as
//! [`LinkError::Disconnected`](crate::application::forward_events::LinkError).

mod absinfo;
mod link;
mod uinput;

pub use link::{EvdevLink, EvdevOpener};
pub use uinput::{EvdevFactory, EvdevSink, FF_EFFECTS_MAX};
