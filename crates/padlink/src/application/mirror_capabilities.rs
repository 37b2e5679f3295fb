//! MirrorCapabilities: reads what an open source device can report and who it
//! claims to be.
//!
//! The functions here only ever read from the [`CapabilitySource`]; they
//! never change device state.  They run once at startup against the first
//! successful open, and their output parameterises the single virtual device
//! creation.
//!
//! # Calibration lookup
//!
//! Every absolute axis needs its `input_absinfo` record (min, max, fuzz,
//! flat, resolution, current value).  The bulk query returns all of them in
//! one call and is tried first.  Codes it omits, or returns without a usable
//! range, fall back to a per-code query.  A code neither path can describe is
//! logged and left out of the descriptor; it never reaches the virtual device
//! with made-up limits.

use std::collections::HashMap;
use std::io;

use padlink_core::{AxisCalibration, CapabilityDescriptor, DeviceIdentity};
use thiserror::Error;
use tracing::{debug, warn};

/// Error type for capability mirroring.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// Every category came back empty: there is nothing to mirror.
    #[error("source device reports no usable buttons, absolute axes, or force-feedback effects")]
    NoCapabilities,
}

/// Read-only capability and identity queries on an open device handle.
///
/// Implemented by the evdev adapter on Linux and by the in-memory mock.
pub trait CapabilitySource {
    /// The kernel-reported device name, if the driver sets one.
    fn device_name(&self) -> Option<String>;

    /// Bus type, vendor, product, and version of the device.
    fn identity(&self) -> DeviceIdentity;

    /// Supported `EV_KEY` codes.
    fn supported_buttons(&self) -> Vec<u16>;

    /// Supported `EV_ABS` codes.
    fn supported_axes(&self) -> Vec<u16>;

    /// Calibration for many axes in one query.
    ///
    /// May omit codes.  An `Err` means the bulk form is unavailable and every
    /// axis falls back to [`axis_calibration`](Self::axis_calibration).
    fn bulk_calibration(&self) -> io::Result<HashMap<u16, AxisCalibration>>;

    /// Calibration for one axis.
    fn axis_calibration(&self, code: u16) -> io::Result<AxisCalibration>;

    /// Supported `EV_FF` codes.
    fn supported_effects(&self) -> Vec<u16>;
}

/// Everything captured from the first open of the physical device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirroredDevice {
    /// Name of the physical device, for logs only.
    pub name: Option<String>,
    pub capabilities: CapabilityDescriptor,
    pub identity: DeviceIdentity,
}

/// Builds a [`CapabilityDescriptor`] from `source`.
///
/// # Errors
///
/// Returns [`MirrorError::NoCapabilities`] when buttons, axes (after dropping
/// codes without calibration), and effects are all empty.
pub fn mirror_capabilities<S>(source: &S) -> Result<CapabilityDescriptor, MirrorError>
where
    S: CapabilitySource + ?Sized,
{
    let axes = source.supported_axes();
    let bulk = if axes.is_empty() {
        HashMap::new()
    } else {
        source.bulk_calibration().unwrap_or_else(|e| {
            debug!("bulk calibration query failed, falling back per axis: {e}");
            HashMap::new()
        })
    };

    let mut builder = CapabilityDescriptor::builder().buttons(source.supported_buttons());

    for code in axes {
        match calibration_for(source, &bulk, code) {
            Ok(calibration) => builder = builder.axis(code, calibration),
            Err(e) => warn!("dropping axis {code:#04x}: calibration unavailable: {e}"),
        }
    }

    // The builder keeps an empty effect list out of the descriptor.
    let capabilities = builder
        .effects(source.supported_effects())
        .build()
        .map_err(|_| MirrorError::NoCapabilities)?;

    debug!("extracted capabilities: {capabilities} {capabilities:?}");
    Ok(capabilities)
}

/// Reads the identity tuple of `source`.
pub fn mirror_identity<S>(source: &S) -> DeviceIdentity
where
    S: CapabilitySource + ?Sized,
{
    source.identity()
}

/// Captures name, capabilities, and identity in one pass.
///
/// # Errors
///
/// See [`mirror_capabilities`].
pub fn mirror_device<S>(source: &S) -> Result<MirroredDevice, MirrorError>
where
    S: CapabilitySource + ?Sized,
{
    Ok(MirroredDevice {
        name: source.device_name(),
        capabilities: mirror_capabilities(source)?,
        identity: mirror_identity(source),
    })
}

fn calibration_for<S>(
    source: &S,
    bulk: &HashMap<u16, AxisCalibration>,
    code: u16,
) -> io::Result<AxisCalibration>
where
    S: CapabilitySource + ?Sized,
{
    match bulk.get(&code) {
        Some(calibration) if calibration.has_range() => Ok(*calibration),
        _ => source.axis_calibration(code),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
