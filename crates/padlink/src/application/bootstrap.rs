//! Bootstrap: the startup sequence that ends in a running [`Forwarder`].
//!
//! 1. Wait for the physical device (same polling as the forwarding loop).
//! 2. Mirror its capabilities and identity, then close that first handle.
//! 3. Create the virtual device.  Fatal on failure.
//! 4. Publish discovery aliases.  Advisory only.
//!
//! Only the two fatal outcomes are returned as errors; [`StartupError`] maps
//! each one to a distinct process exit status.

use padlink_core::DeviceIdentity;
use thiserror::Error;
use tracing::info;

use crate::domain::RelayConfig;

use super::forward_events::{await_link, Forwarder, LinkOpener};
use super::mirror_capabilities::{mirror_device, MirrorError};
use super::provision_device::{
    provision_virtual_device, FactoryError, VirtualDeviceFactory, VirtualDeviceSpec,
};
use super::publish_aliases::{publish_with_retry, AliasPublisher, DiscoveryRetry};

/// Exit status when the physical device offers nothing to mirror.
pub const EXIT_NO_CAPABILITIES: u8 = 3;
/// Exit status when the virtual device cannot be created.
pub const EXIT_VIRTUAL_DEVICE: u8 = 4;

/// Fatal startup errors.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("capability mirroring failed: {0}")]
    Capabilities(#[from] MirrorError),
    #[error("virtual device creation failed: {0}")]
    VirtualDevice(#[from] FactoryError),
}

impl StartupError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Capabilities(_) => EXIT_NO_CAPABILITIES,
            Self::VirtualDevice(_) => EXIT_VIRTUAL_DEVICE,
        }
    }
}

/// Runs the startup sequence and returns the forwarding supervisor.
///
/// Waits indefinitely for the physical device to appear.
///
/// # Errors
///
/// [`StartupError::Capabilities`] if the first opened device has nothing to
/// mirror, [`StartupError::VirtualDevice`] if creation fails.  The factory is
/// never called in the first case.
pub async fn bootstrap<O, F, P>(
    config: &RelayConfig,
    opener: O,
    factory: F,
    publisher: &P,
) -> Result<Forwarder<O, F::Sink>, StartupError>
where
    O: LinkOpener,
    F: VirtualDeviceFactory,
    P: AliasPublisher + ?Sized,
{
    info!("setting up virtual device {:?}", config.virtual_name);

    let source = await_link(&opener, &config.device_path, config.timing.poll_interval).await;
    let mirrored = mirror_device(&source)?;
    drop(source);

    let identity = if config.mirror_identity {
        mirrored.identity
    } else {
        DeviceIdentity::virtual_default()
    };
    let spec = VirtualDeviceSpec {
        name: config.virtual_name.clone(),
        capabilities: mirrored.capabilities,
        identity,
    };
    let device = provision_virtual_device(factory, spec)?;

    publish_with_retry(
        publisher,
        &config.virtual_name,
        &config.event_alias,
        &config.js_alias,
        DiscoveryRetry {
            attempts: config.discovery_attempts,
            delay: config.discovery_retry_delay,
        },
    )
    .await;

    Ok(Forwarder::new(
        opener,
        config.device_path.clone(),
        config.timing,
        device,
    ))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
