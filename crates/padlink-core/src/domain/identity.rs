//! Device identity tuple.
//!
//! Games and SDL look up controller mappings by `(bus, vendor, product,
//! version)`.  Copying the physical tuple onto the virtual device makes the
//! relay invisible to them.
//!
//! The identity is captured once, from the first successful open, before the
//! physical handle is released.  It is never re-read on reconnect: if a
//! different controller is plugged into the same path, the virtual device
//! keeps presenting the original identity.

use std::fmt;

/// Kernel `BUS_USB`.
pub const BUS_USB: u16 = 0x03;
/// Kernel `BUS_BLUETOOTH`.
pub const BUS_BLUETOOTH: u16 = 0x05;
/// Kernel `BUS_VIRTUAL`.
pub const BUS_VIRTUAL: u16 = 0x06;

/// Bus type, vendor id, product id, and version of an input device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceIdentity {
    pub bus_type: u16,
    pub vendor: u16,
    pub product: u16,
    pub version: u16,
}

impl DeviceIdentity {
    pub const fn new(bus_type: u16, vendor: u16, product: u16, version: u16) -> Self {
        Self {
            bus_type,
            vendor,
            product,
            version,
        }
    }

    /// Identity presented when mirroring is disabled.
    pub const fn virtual_default() -> Self {
        Self::new(BUS_VIRTUAL, 0, 0, 0)
    }

    /// Human-readable bus name for logs.
    pub fn bus_name(&self) -> &'static str {
        match self.bus_type {
            BUS_USB => "usb",
            BUS_BLUETOOTH => "bluetooth",
            BUS_VIRTUAL => "virtual",
            _ => "other",
        }
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:04x}:{:04x} v{:04x}",
            self.bus_name(),
            self.vendor,
            self.product,
            self.version
        )
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
