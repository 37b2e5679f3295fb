//! ProvisionDevice: creates the one virtual gamepad the process owns.
//!
//! A [`VirtualDeviceFactory`] is consumed by [`provision_virtual_device`], so
//! a factory value can produce at most one device.  The returned
//! [`VirtualGamepad`] is moved into the forwarding loop and lives until the
//! process exits; physical reconnects never touch it.

use std::io;

use padlink_core::{CapabilityDescriptor, DeviceIdentity, RelayEvent};
use thiserror::Error;
use tracing::info;

/// Longest display name uinput accepts, excluding the terminating NUL.
pub const MAX_NAME_LEN: usize = 79;

/// Error type for virtual device creation.  Always fatal at startup.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// The kernel refused to create the device (missing `/dev/uinput`,
    /// insufficient permissions, invalid capability set).
    #[error("failed to create virtual device: {0}")]
    Create(#[source] io::Error),
    /// The display name cannot be passed to uinput.
    #[error("invalid virtual device name {0:?}: must be at most {MAX_NAME_LEN} bytes without NUL")]
    InvalidName(String),
}

/// Error type for writes to the virtual device during relaying.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("virtual device write failed: {0}")]
    Sink(#[source] io::Error),
}

/// Everything needed to create the virtual device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualDeviceSpec {
    /// Display name; discovery finds the device by this name.
    pub name: String,
    pub capabilities: CapabilityDescriptor,
    pub identity: DeviceIdentity,
}

/// Write side of a created virtual device.
pub trait VirtualSink: Send {
    /// Queues one event for the virtual device.
    fn write_event(&mut self, event: RelayEvent) -> io::Result<()>;

    /// Flushes queued events and marks a frame boundary.
    fn sync(&mut self) -> io::Result<()>;
}

/// Creates a virtual device.  Consumed on use.
pub trait VirtualDeviceFactory {
    type Sink: VirtualSink;

    /// Creates the device described by `spec`.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError::Create`] if the platform refuses.
    fn create(self, spec: &VirtualDeviceSpec) -> Result<Self::Sink, FactoryError>;
}

/// The long-lived virtual device: its sink plus what it was created with.
#[derive(Debug)]
pub struct VirtualGamepad<S> {
    sink: S,
    spec: VirtualDeviceSpec,
}

impl<S: VirtualSink> VirtualGamepad<S> {
    /// The name, capabilities, and identity the device was created with.
    pub fn spec(&self) -> &VirtualDeviceSpec {
        &self.spec
    }

    /// Writes `event` unchanged and immediately flushes it.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Sink`] if either write fails.
    pub fn forward(&mut self, event: RelayEvent) -> Result<(), RelayError> {
        self.sink.write_event(event).map_err(RelayError::Sink)?;
        self.sink.sync().map_err(RelayError::Sink)
    }
}

/// Validates `spec` and creates the virtual device with `factory`.
///
/// # Errors
///
/// Returns [`FactoryError::InvalidName`] before touching the platform if the
/// name cannot be represented, or whatever the factory reports.
pub fn provision_virtual_device<F>(
    factory: F,
    spec: VirtualDeviceSpec,
) -> Result<VirtualGamepad<F::Sink>, FactoryError>
where
    F: VirtualDeviceFactory,
{
    if spec.name.len() > MAX_NAME_LEN || spec.name.contains('\0') {
        return Err(FactoryError::InvalidName(spec.name));
    }

    let sink = factory.create(&spec)?;
    info!(
        "created virtual device {:?} ({}) with {}",
        spec.name, spec.identity, spec.capabilities
    );
    Ok(VirtualGamepad { sink, spec })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::mock::{MockFactory, SinkRecord};
    use padlink_core::event::codes::{ABS_X, BTN_SOUTH};

    fn spec(name: &str) -> VirtualDeviceSpec {
        VirtualDeviceSpec {
            name: name.to_string(),
            capabilities: CapabilityDescriptor::builder()
                .buttons([BTN_SOUTH])
                .build()
                .unwrap(),
            identity: DeviceIdentity::new(0x03, 0x1038, 0x1430, 0x0111),
        }
    }

    #[test]
    fn test_provision_creates_exactly_one_device() {
        // Arrange
        let factory = MockFactory::new();
        let probe = factory.probe();

        // Act
        let device = provision_virtual_device(factory, spec("VirtualGamepad")).unwrap();

        // Assert
        assert_eq!(probe.created(), 1);
        assert_eq!(probe.specs()[0], *device.spec());
    }

    #[test]
    fn test_provision_keeps_spec() {
        let device = provision_virtual_device(MockFactory::new(), spec("Pad")).unwrap();
        assert_eq!(device.spec().name, "Pad");
        assert_eq!(device.spec().identity.vendor, 0x1038);
    }

    #[test]
    fn test_factory_failure_is_reported() {
        // Arrange
        let factory = MockFactory::failing();
        let probe = factory.probe();

        // Act
        let result = provision_virtual_device(factory, spec("Pad"));

        // Assert
        assert!(matches!(result, Err(FactoryError::Create(_))));
        assert_eq!(probe.created(), 0);
    }

    #[test]
    fn test_overlong_name_is_rejected_before_creation() {
        let factory = MockFactory::new();
        let probe = factory.probe();

        let result = provision_virtual_device(factory, spec(&"x".repeat(MAX_NAME_LEN + 1)));

        assert!(matches!(result, Err(FactoryError::InvalidName(_))));
        assert_eq!(probe.created(), 0);
    }

    #[test]
    fn test_name_with_nul_is_rejected() {
        let result = provision_virtual_device(MockFactory::new(), spec("Pad\0"));
        assert!(matches!(result, Err(FactoryError::InvalidName(_))));
    }

    #[test]
    fn test_empty_name_is_accepted() {
        assert!(provision_virtual_device(MockFactory::new(), spec("")).is_ok());
    }

    #[test]
    fn test_forward_writes_then_syncs() {
        // Arrange
        let factory = MockFactory::new();
        let probe = factory.probe();
        let mut device = provision_virtual_device(factory, spec("Pad")).unwrap();
        let event = RelayEvent::absolute(ABS_X, 128);

        // Act
        device.forward(event).unwrap();

        // Assert
        assert_eq!(
            probe.records(),
            vec![SinkRecord::Event(event), SinkRecord::Sync]
        );
    }

    #[test]
    fn test_forward_surfaces_sink_failure() {
        let factory = MockFactory::new();
        let probe = factory.probe();
        let mut device = provision_virtual_device(factory, spec("Pad")).unwrap();
        probe.fail_writes(true);

        let result = device.forward(RelayEvent::button(BTN_SOUTH, true));

        assert!(matches!(result, Err(RelayError::Sink(_))));
    }
}
