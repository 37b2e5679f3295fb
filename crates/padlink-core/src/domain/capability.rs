//! Capability descriptor: the set of event codes a device can report.
//!
//! A [`CapabilityDescriptor`] is built once from the live physical device at
//! startup and consumed exactly once to create the virtual device.  It is
//! immutable after construction.
//!
//! # Invariants
//!
//! - Every absolute axis carries a complete [`AxisCalibration`].  There is no
//!   "axis without metadata" representation: an axis whose calibration could
//!   not be read is simply not added.  A virtual axis created with guessed
//!   min/max values would report nonsense to games.
//! - The force-feedback set is never advertised empty.  [`effects`] returns
//!   `None` when the device has no effects, so the factory never enables the
//!   force-feedback category with zero effects.
//! - A descriptor with no buttons, no axes, and no effects cannot be built.
//!   [`CapabilityDescriptorBuilder::build`] returns
//!   [`CapabilityError::Empty`] instead.
//!
//! [`effects`]: CapabilityDescriptor::effects

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use thiserror::Error;

use crate::event::{EV_ABS, EV_FF, EV_KEY};

/// Error returned when a descriptor would violate its invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapabilityError {
    /// No buttons, no axes, and no force-feedback effects were supplied.
    #[error("device reports no buttons, absolute axes, or force-feedback effects")]
    Empty,
}

/// The event categories that are mirrored onto the virtual device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventCategory {
    /// Digital buttons (`EV_KEY`).
    Button,
    /// Absolute axes (`EV_ABS`).
    Absolute,
    /// Force-feedback effects (`EV_FF`).
    ForceFeedback,
}

impl EventCategory {
    /// Returns the kernel event-type number for this category.
    pub const fn raw(self) -> u16 {
        match self {
            Self::Button => EV_KEY,
            Self::Absolute => EV_ABS,
            Self::ForceFeedback => EV_FF,
        }
    }

    /// Maps a kernel event-type number back to a mirrored category.
    pub const fn from_raw(raw: u16) -> Option<Self> {
        match raw {
            EV_KEY => Some(Self::Button),
            EV_ABS => Some(Self::Absolute),
            EV_FF => Some(Self::ForceFeedback),
            _ => None,
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Button => "EV_KEY",
            Self::Absolute => "EV_ABS",
            Self::ForceFeedback => "EV_FF",
        };
        f.write_str(name)
    }
}

/// Calibration metadata for one absolute axis.
///
/// Field order and meaning match the kernel's `struct input_absinfo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AxisCalibration {
    /// Current value of the axis when the metadata was read.
    pub value: i32,
    /// Logical minimum.
    pub minimum: i32,
    /// Logical maximum.
    pub maximum: i32,
    /// Noise threshold: changes smaller than this are filtered by the kernel.
    pub fuzz: i32,
    /// Dead zone around the centre.
    pub flat: i32,
    /// Units per millimetre (or per radian for rotational axes).
    pub resolution: i32,
}

impl AxisCalibration {
    /// Creates calibration metadata in `input_absinfo` field order.
    pub const fn new(
        value: i32,
        minimum: i32,
        maximum: i32,
        fuzz: i32,
        flat: i32,
        resolution: i32,
    ) -> Self {
        Self {
            value,
            minimum,
            maximum,
            fuzz,
            flat,
            resolution,
        }
    }

    /// Returns `true` when the axis spans a non-empty logical range.
    ///
    /// The bulk `input_absinfo` query returns an all-zero record for axes the
    /// driver never initialised; such a record is not usable calibration.
    pub const fn has_range(&self) -> bool {
        self.maximum > self.minimum
    }
}

/// Immutable description of what a device can report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityDescriptor {
    buttons: BTreeSet<u16>,
    axes: BTreeMap<u16, AxisCalibration>,
    effects: BTreeSet<u16>,
}

impl CapabilityDescriptor {
    /// Starts building a descriptor.
    pub fn builder() -> CapabilityDescriptorBuilder {
        CapabilityDescriptorBuilder::default()
    }

    /// Supported digital button codes, possibly empty.
    pub fn buttons(&self) -> &BTreeSet<u16> {
        &self.buttons
    }

    /// Supported absolute axes with their calibration, possibly empty.
    pub fn axes(&self) -> &BTreeMap<u16, AxisCalibration> {
        &self.axes
    }

    /// Supported force-feedback effect codes, or `None` if there are none.
    pub fn effects(&self) -> Option<&BTreeSet<u16>> {
        if self.effects.is_empty() {
            None
        } else {
            Some(&self.effects)
        }
    }

    /// Returns `true` if at least one code of `category` is supported.
    pub fn supports(&self, category: EventCategory) -> bool {
        match category {
            EventCategory::Button => !self.buttons.is_empty(),
            EventCategory::Absolute => !self.axes.is_empty(),
            EventCategory::ForceFeedback => !self.effects.is_empty(),
        }
    }

    /// Returns `true` if `code` is advertised in `category`.
    pub fn contains(&self, category: EventCategory, code: u16) -> bool {
        match category {
            EventCategory::Button => self.buttons.contains(&code),
            EventCategory::Absolute => self.axes.contains_key(&code),
            EventCategory::ForceFeedback => self.effects.contains(&code),
        }
    }
}

impl fmt::Display for CapabilityDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} buttons, {} axes, {} ff effects",
            self.buttons.len(),
            self.axes.len(),
            self.effects.len()
        )
    }
}

/// Accumulates codes and produces a validated [`CapabilityDescriptor`].
#[derive(Debug, Default)]
pub struct CapabilityDescriptorBuilder {
    buttons: BTreeSet<u16>,
    axes: BTreeMap<u16, AxisCalibration>,
    effects: BTreeSet<u16>,
}

impl CapabilityDescriptorBuilder {
    /// Adds digital button codes.
    pub fn buttons(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.buttons.extend(codes);
        self
    }

    /// Adds one absolute axis with its calibration.
    ///
    /// Adding the same code twice keeps the last calibration.
    pub fn axis(mut self, code: u16, calibration: AxisCalibration) -> Self {
        self.axes.insert(code, calibration);
        self
    }

    /// Adds force-feedback effect codes.
    pub fn effects(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.effects.extend(codes);
        self
    }

    /// Validates and freezes the descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::Empty`] if every category is empty.
    pub fn build(self) -> Result<CapabilityDescriptor, CapabilityError> {
        if self.buttons.is_empty() && self.axes.is_empty() && self.effects.is_empty() {
            return Err(CapabilityError::Empty);
        }
        Ok(CapabilityDescriptor {
            buttons: self.buttons,
            axes: self.axes,
            effects: self.effects,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::codes;

    fn stick() -> AxisCalibration {
        AxisCalibration::new(0, -32768, 32767, 16, 128, 0)
    }

    #[test]
    fn test_build_with_no_codes_returns_empty_error() {
        // Arrange / Act
        let result = CapabilityDescriptor::builder().build();

        // Assert
        assert_eq!(result, Err(CapabilityError::Empty));
    }

    #[test]
    fn test_build_with_only_buttons_succeeds() {
        // Arrange / Act
        let caps = CapabilityDescriptor::builder()
            .buttons([codes::BTN_SOUTH, codes::BTN_EAST])
            .build()
            .unwrap();

        // Assert
        assert_eq!(caps.buttons().len(), 2);
        assert!(caps.axes().is_empty());
        assert!(caps.effects().is_none());
    }

    #[test]
    fn test_empty_effects_are_reported_as_none() {
        // Arrange
        let caps = CapabilityDescriptor::builder()
            .axis(codes::ABS_X, stick())
            .effects(std::iter::empty())
            .build()
            .unwrap();

        // Assert – force feedback must not be advertised with zero effects
        assert!(caps.effects().is_none());
        assert!(!caps.supports(EventCategory::ForceFeedback));
    }

    #[test]
    fn test_effects_are_kept_when_present() {
        let caps = CapabilityDescriptor::builder()
            .effects([codes::FF_RUMBLE, codes::FF_PERIODIC])
            .build()
            .unwrap();

        let effects = caps.effects().unwrap();
        assert!(effects.contains(&codes::FF_RUMBLE));
        assert!(effects.contains(&codes::FF_PERIODIC));
    }

    #[test]
    fn test_axis_keeps_full_calibration() {
        // Arrange
        let cal = AxisCalibration::new(128, 0, 255, 2, 8, 1);

        // Act
        let caps = CapabilityDescriptor::builder()
            .axis(codes::ABS_Z, cal)
            .build()
            .unwrap();

        // Assert
        assert_eq!(caps.axes().get(&codes::ABS_Z), Some(&cal));
    }

    #[test]
    fn test_duplicate_buttons_are_collapsed() {
        let caps = CapabilityDescriptor::builder()
            .buttons([codes::BTN_SOUTH, codes::BTN_SOUTH])
            .build()
            .unwrap();
        assert_eq!(caps.buttons().len(), 1);
    }

    #[test]
    fn test_contains_checks_the_right_category() {
        let caps = CapabilityDescriptor::builder()
            .buttons([codes::BTN_SOUTH])
            .axis(codes::ABS_X, stick())
            .build()
            .unwrap();

        assert!(caps.contains(EventCategory::Button, codes::BTN_SOUTH));
        assert!(caps.contains(EventCategory::Absolute, codes::ABS_X));
        assert!(!caps.contains(EventCategory::Absolute, codes::BTN_SOUTH));
    }

    #[test]
    fn test_has_range_rejects_zeroed_record() {
        assert!(!AxisCalibration::default().has_range());
        assert!(AxisCalibration::new(0, -1, 1, 0, 0, 0).has_range());
    }

    #[test]
    fn test_category_raw_round_trip() {
        for category in [
            EventCategory::Button,
            EventCategory::Absolute,
            EventCategory::ForceFeedback,
        ] {
            assert_eq!(EventCategory::from_raw(category.raw()), Some(category));
        }
        assert_eq!(EventCategory::from_raw(0x00), None);
    }

    #[test]
    fn test_display_summarises_counts() {
        let caps = CapabilityDescriptor::builder()
            .buttons([codes::BTN_SOUTH])
            .axis(codes::ABS_X, stick())
            .axis(codes::ABS_Y, stick())
            .build()
            .unwrap();
        assert_eq!(caps.to_string(), "1 buttons, 2 axes, 0 ff effects");
    }
}
