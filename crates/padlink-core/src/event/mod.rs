//! Relay events: the `(category, code, value)` triples read from the physical
//! device and written, unmodified, to the virtual one.
//!
//! # Framing (for beginners)
//!
//! The kernel groups related changes (e.g. both stick axes moving at once) into
//! a *frame* terminated by an `EV_SYN`/`SYN_REPORT` event.  Consumers apply the
//! whole frame atomically.  The relay writes each event and then issues its
//! own synchronization flush, so the virtual device never holds a half-written
//! frame while the relay waits for the next physical event.

pub mod codes;

use std::fmt;

use crate::domain::capability::EventCategory;

/// `EV_SYN`: synchronization events.
pub const EV_SYN: u16 = 0x00;
/// `EV_KEY`: buttons and keys.
pub const EV_KEY: u16 = 0x01;
/// `EV_ABS`: absolute axes.
pub const EV_ABS: u16 = 0x03;
/// `EV_MSC`: miscellaneous (scan codes, timestamps).
pub const EV_MSC: u16 = 0x04;
/// `EV_FF`: force-feedback.
pub const EV_FF: u16 = 0x15;

/// `SYN_REPORT`: end of frame.
pub const SYN_REPORT: u16 = 0x00;

/// One input event, as seen on the wire between the two devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RelayEvent {
    /// Kernel event type (`EV_*`).
    pub kind: u16,
    pub code: u16,
    pub value: i32,
}

impl RelayEvent {
    pub const fn new(kind: u16, code: u16, value: i32) -> Self {
        Self { kind, code, value }
    }

    /// A `SYN_REPORT` frame terminator.
    pub const fn sync() -> Self {
        Self::new(EV_SYN, SYN_REPORT, 0)
    }

    /// Convenience constructor for a button event.
    pub const fn button(code: u16, pressed: bool) -> Self {
        Self::new(EV_KEY, code, if pressed { 1 } else { 0 })
    }

    /// Convenience constructor for an absolute-axis event.
    pub const fn absolute(code: u16, value: i32) -> Self {
        Self::new(EV_ABS, code, value)
    }

    /// Returns `true` for a `SYN_REPORT` event.
    pub const fn is_sync_report(&self) -> bool {
        self.kind == EV_SYN && self.code == SYN_REPORT
    }

    /// The mirrored category of this event, if any.
    pub const fn category(&self) -> Option<EventCategory> {
        EventCategory::from_raw(self.kind)
    }
}

impl fmt::Display for RelayEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match codes::name(self.kind, self.code) {
            Some(name) => write!(f, "{name}={}", self.value),
            None => write!(
                f,
                "type={:#04x} code={:#05x} value={}",
                self.kind, self.code, self.value
            ),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_constructor_maps_pressed_to_one() {
        assert_eq!(RelayEvent::button(codes::BTN_SOUTH, true).value, 1);
        assert_eq!(RelayEvent::button(codes::BTN_SOUTH, false).value, 0);
    }

    #[test]
    fn test_sync_is_syn_report() {
        let ev = RelayEvent::sync();
        assert!(ev.is_sync_report());
        assert_eq!(ev.category(), None);
    }

    #[test]
    fn test_category_of_axis_event() {
        let ev = RelayEvent::absolute(codes::ABS_X, 128);
        assert_eq!(ev.category(), Some(EventCategory::Absolute));
    }

    #[test]
    fn test_display_uses_code_name_when_known() {
        let ev = RelayEvent::absolute(codes::ABS_X, 128);
        assert_eq!(ev.to_string(), "ABS_X=128");
    }

    #[test]
    fn test_display_falls_back_to_raw_numbers() {
        let ev = RelayEvent::new(EV_MSC, 0x04, 7);
        assert_eq!(ev.to_string(), "type=0x04 code=0x004 value=7");
    }
}
