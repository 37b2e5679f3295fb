//! Well-known gamepad event codes.
//!
//! Only the codes a typical gamepad reports are named here; the relay itself
//! forwards every code unchanged whether or not it appears in this table.
//! Values follow `linux/input-event-codes.h`.

use super::{EV_ABS, EV_FF, EV_KEY, EV_SYN, SYN_REPORT};

// ── Buttons ───────────────────────────────────────────────────────────────────

pub const BTN_SOUTH: u16 = 0x130;
pub const BTN_EAST: u16 = 0x131;
pub const BTN_C: u16 = 0x132;
pub const BTN_NORTH: u16 = 0x133;
pub const BTN_WEST: u16 = 0x134;
pub const BTN_Z: u16 = 0x135;
pub const BTN_TL: u16 = 0x136;
pub const BTN_TR: u16 = 0x137;
pub const BTN_TL2: u16 = 0x138;
pub const BTN_TR2: u16 = 0x139;
pub const BTN_SELECT: u16 = 0x13a;
pub const BTN_START: u16 = 0x13b;
pub const BTN_MODE: u16 = 0x13c;
pub const BTN_THUMBL: u16 = 0x13d;
pub const BTN_THUMBR: u16 = 0x13e;

/// Alias used by most gamepad documentation.
pub const BTN_A: u16 = BTN_SOUTH;
pub const BTN_B: u16 = BTN_EAST;
pub const BTN_X: u16 = BTN_NORTH;
pub const BTN_Y: u16 = BTN_WEST;

// ── Absolute axes ─────────────────────────────────────────────────────────────

pub const ABS_X: u16 = 0x00;
pub const ABS_Y: u16 = 0x01;
pub const ABS_Z: u16 = 0x02;
pub const ABS_RX: u16 = 0x03;
pub const ABS_RY: u16 = 0x04;
pub const ABS_RZ: u16 = 0x05;
pub const ABS_GAS: u16 = 0x09;
pub const ABS_BRAKE: u16 = 0x0a;
pub const ABS_HAT0X: u16 = 0x10;
pub const ABS_HAT0Y: u16 = 0x11;

/// Number of absolute axis codes (`ABS_CNT`).
pub const ABS_CNT: usize = 0x40;

// ── Force-feedback ────────────────────────────────────────────────────────────

pub const FF_RUMBLE: u16 = 0x50;
pub const FF_PERIODIC: u16 = 0x51;
pub const FF_CONSTANT: u16 = 0x52;
pub const FF_SPRING: u16 = 0x53;
pub const FF_FRICTION: u16 = 0x54;
pub const FF_DAMPER: u16 = 0x55;
pub const FF_INERTIA: u16 = 0x56;
pub const FF_RAMP: u16 = 0x57;
pub const FF_SQUARE: u16 = 0x58;
pub const FF_TRIANGLE: u16 = 0x59;
pub const FF_SINE: u16 = 0x5a;
pub const FF_GAIN: u16 = 0x60;
pub const FF_AUTOCENTER: u16 = 0x61;

/// Returns the symbolic name of `(kind, code)` if it is a well-known code.
pub fn name(kind: u16, code: u16) -> Option<&'static str> {
    let name = match (kind, code) {
        (EV_SYN, SYN_REPORT) => "SYN_REPORT",
        (EV_KEY, BTN_SOUTH) => "BTN_SOUTH",
        (EV_KEY, BTN_EAST) => "BTN_EAST",
        (EV_KEY, BTN_C) => "BTN_C",
        (EV_KEY, BTN_NORTH) => "BTN_NORTH",
        (EV_KEY, BTN_WEST) => "BTN_WEST",
        (EV_KEY, BTN_Z) => "BTN_Z",
        (EV_KEY, BTN_TL) => "BTN_TL",
        (EV_KEY, BTN_TR) => "BTN_TR",
        (EV_KEY, BTN_TL2) => "BTN_TL2",
        (EV_KEY, BTN_TR2) => "BTN_TR2",
        (EV_KEY, BTN_SELECT) => "BTN_SELECT",
        (EV_KEY, BTN_START) => "BTN_START",
        (EV_KEY, BTN_MODE) => "BTN_MODE",
        (EV_KEY, BTN_THUMBL) => "BTN_THUMBL",
        (EV_KEY, BTN_THUMBR) => "BTN_THUMBR",
        (EV_ABS, ABS_X) => "ABS_X",
        (EV_ABS, ABS_Y) => "ABS_Y",
        (EV_ABS, ABS_Z) => "ABS_Z",
        (EV_ABS, ABS_RX) => "ABS_RX",
        (EV_ABS, ABS_RY) => "ABS_RY",
        (EV_ABS, ABS_RZ) => "ABS_RZ",
        (EV_ABS, ABS_GAS) => "ABS_GAS",
        (EV_ABS, ABS_BRAKE) => "ABS_BRAKE",
        (EV_ABS, ABS_HAT0X) => "ABS_HAT0X",
        (EV_ABS, ABS_HAT0Y) => "ABS_HAT0Y",
        (EV_FF, FF_RUMBLE) => "FF_RUMBLE",
        (EV_FF, FF_PERIODIC) => "FF_PERIODIC",
        (EV_FF, FF_CONSTANT) => "FF_CONSTANT",
        (EV_FF, FF_SPRING) => "FF_SPRING",
        (EV_FF, FF_FRICTION) => "FF_FRICTION",
        (EV_FF, FF_DAMPER) => "FF_DAMPER",
        (EV_FF, FF_INERTIA) => "FF_INERTIA",
        (EV_FF, FF_RAMP) => "FF_RAMP",
        (EV_FF, FF_SQUARE) => "FF_SQUARE",
        (EV_FF, FF_TRIANGLE) => "FF_TRIANGLE",
        (EV_FF, FF_SINE) => "FF_SINE",
        (EV_FF, FF_GAIN) => "FF_GAIN",
        (EV_FF, FF_AUTOCENTER) => "FF_AUTOCENTER",
        _ => return None,
    };
    Some(name)
}
