//! ForwardEvents: the wait/acquire/relay supervisor.
//!
//! [`Forwarder`] owns the virtual device for the rest of the process and
//! drives the physical link through the [`LinkState`] machine:
//!
//! ```text
//! AwaitingLink ──open──► Acquiring ──grab──► Relaying
//!      ▲                     │                  │
//!      └──── backoff ◄───────┴── lost / fault ──┘
//! ```
//!
//! One call to [`Forwarder::run_cycle`] performs exactly one pass around the
//! loop (wait, acquire, relay until the link ends) and reports how it ended.
//! [`Forwarder::run`] repeats cycles forever with the configured backoff in
//! between.  Nothing in either path recreates or reconfigures the virtual
//! device.
//!
//! # Disconnect detection (for beginners)
//!
//! When a USB controller is unplugged, the kernel invalidates the open event
//! node and the next read fails with `ENODEV`.  The link adapter turns that
//! into [`LinkError::Disconnected`], which ends the relay phase.  The handle
//! is then dropped, which also drops the exclusive grab.  A fresh handle is
//! opened on the next cycle because the replugged controller gets a new
//! kernel node.

use std::convert::Infallible;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use padlink_core::{LinkState, LinkTiming, RelayEvent};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, error, info, trace, warn};

use super::mirror_capabilities::CapabilitySource;
use super::provision_device::{RelayError, VirtualGamepad, VirtualSink};

/// Error type for everything that can go wrong with the physical link.
///
/// All variants are transient: the loop waits and tries again.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The configured path does not exist (controller unplugged).
    #[error("{} does not exist", path.display())]
    Absent { path: PathBuf },
    /// The path exists but could not be opened as an input device.
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Another process holds the device exclusively.
    #[error("exclusive grab refused: {0}")]
    Grab(#[source] io::Error),
    /// A read failed mid-stream, normally because the device was unplugged.
    #[error("link lost: {0}")]
    Disconnected(#[source] io::Error),
}

/// An open physical device.
///
/// Dropping the link closes the handle and releases any grab.
#[async_trait]
pub trait PhysicalLink: CapabilitySource + Send {
    /// Requests exclusive access to the device's event stream.
    fn grab(&mut self) -> Result<(), LinkError>;

    /// Waits for the next event.  Blocks indefinitely while the device is
    /// idle; returns [`LinkError::Disconnected`] when the link fails.
    async fn next_event(&mut self) -> Result<RelayEvent, LinkError>;
}

/// Opens physical links by path.
pub trait LinkOpener {
    type Link: PhysicalLink;

    /// Opens `path`.
    ///
    /// # Errors
    ///
    /// [`LinkError::Absent`] if nothing exists at `path`, otherwise
    /// [`LinkError::Open`].
    fn open(&self, path: &Path) -> Result<Self::Link, LinkError>;
}

/// How one wait/acquire/relay cycle ended.
#[derive(Debug)]
pub enum CycleEnd {
    /// The device opened but the exclusive grab failed.
    GrabRefused(LinkError),
    /// Reading from the physical device failed.
    LinkLost(LinkError),
    /// Writing to the virtual device failed.
    Fault(RelayError),
}

/// Outcome of [`Forwarder::run_cycle`].
#[derive(Debug)]
pub struct CycleReport {
    /// Events relayed during this cycle.
    pub forwarded: u64,
    pub end: CycleEnd,
}

/// Lifetime counters, reported on shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    /// Relay phases entered (successful grabs).
    pub sessions: u64,
    /// Relay phases entered after the first one.
    pub reconnects: u64,
    pub events_forwarded: u64,
}

/// Polls `path` until `opener` succeeds, sleeping `poll_interval` between
/// attempts.  Never gives up.
pub async fn await_link<O>(opener: &O, path: &Path, poll_interval: Duration) -> O::Link
where
    O: LinkOpener + ?Sized,
{
    let mut announced = false;
    loop {
        match opener.open(path) {
            Ok(link) => {
                let name = link.device_name();
                info!(
                    "opened {} ({})",
                    path.display(),
                    name.as_deref().unwrap_or("unnamed device")
                );
                return link;
            }
            Err(LinkError::Absent { .. }) if !announced => {
                info!("waiting for {} to appear", path.display());
                announced = true;
            }
            Err(LinkError::Absent { .. }) => debug!("{} still absent", path.display()),
            Err(e) => warn!("{e}; retrying in {poll_interval:?}"),
        }
        sleep(poll_interval).await;
    }
}

/// The forwarding supervisor.  Owns the virtual device.
pub struct Forwarder<O, S> {
    opener: O,
    device_path: PathBuf,
    timing: LinkTiming,
    device: VirtualGamepad<S>,
    state: LinkState,
    stats: RelayStats,
}

impl<O, S> Forwarder<O, S>
where
    O: LinkOpener,
    S: VirtualSink,
{
    /// Creates a supervisor for `device_path` that writes into `device`.
    pub fn new(
        opener: O,
        device_path: impl Into<PathBuf>,
        timing: LinkTiming,
        device: VirtualGamepad<S>,
    ) -> Self {
        Self {
            opener,
            device_path: device_path.into(),
            timing,
            device,
            state: LinkState::AwaitingLink,
            stats: RelayStats::default(),
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn stats(&self) -> RelayStats {
        self.stats
    }

    /// The virtual device, unchanged since startup.
    pub fn virtual_device(&self) -> &VirtualGamepad<S> {
        &self.device
    }

    /// Runs one wait/acquire/relay cycle.
    ///
    /// Returns once the link is lost, the grab is refused, or a write to the
    /// virtual device fails.  The physical handle is closed and the state is
    /// back to [`LinkState::AwaitingLink`] on return.  No backoff is applied
    /// here; see [`run`](Self::run).
    pub async fn run_cycle(&mut self) -> CycleReport {
        self.transition(LinkState::AwaitingLink);
        let mut link = await_link(&self.opener, &self.device_path, self.timing.poll_interval).await;

        self.transition(LinkState::Acquiring);
        if let Err(e) = link.grab() {
            drop(link);
            self.transition(LinkState::AwaitingLink);
            return CycleReport {
                forwarded: 0,
                end: CycleEnd::GrabRefused(e),
            };
        }

        if self.stats.sessions > 0 {
            self.stats.reconnects += 1;
            info!("reconnected (reconnect #{})", self.stats.reconnects);
        }
        self.stats.sessions += 1;
        self.transition(LinkState::Relaying);

        let mut forwarded = 0;
        let end = loop {
            let event = match link.next_event().await {
                Ok(event) => event,
                Err(e) => break CycleEnd::LinkLost(e),
            };
            trace!("{event}");
            if let Err(e) = self.device.forward(event) {
                break CycleEnd::Fault(e);
            }
            forwarded += 1;
            self.stats.events_forwarded += 1;
        };

        drop(link);
        self.transition(LinkState::AwaitingLink);
        CycleReport { forwarded, end }
    }

    /// Runs cycles forever, sleeping for the backoff between them.
    ///
    /// Every failure is logged and retried; the future only completes if it
    /// is dropped by the caller.
    pub async fn run(&mut self) -> Infallible {
        loop {
            let report = self.run_cycle().await;
            match &report.end {
                CycleEnd::LinkLost(e) => warn!(
                    "{e} after {} events; waiting for {}",
                    report.forwarded,
                    self.device_path.display()
                ),
                CycleEnd::GrabRefused(e) => warn!("{e}; retrying in {:?}", self.timing.backoff),
                CycleEnd::Fault(e) => {
                    error!("unexpected relay fault after {} events: {e}", report.forwarded)
                }
            }
            sleep(self.timing.backoff).await;
        }
    }

    fn transition(&mut self, next: LinkState) {
        if self.state != next {
            info!("link state: {} -> {}", self.state, next);
            self.state = next;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::provision_device::{provision_virtual_device, VirtualDeviceSpec};
    use crate::infrastructure::mock::{
        MockDevice, MockFactory, MockOpener, RecordingSink, SinkProbe, SinkRecord,
    };
    use padlink_core::event::codes::{ABS_X, BTN_SOUTH};
    use padlink_core::{AxisCalibration, CapabilityDescriptor, DeviceIdentity};

    fn pad() -> MockDevice {
        MockDevice::new("pad")
            .with_buttons([BTN_SOUTH])
            .with_axis(ABS_X, AxisCalibration::new(128, 0, 255, 0, 0, 0))
    }

    fn forwarder(opener: MockOpener) -> (Forwarder<MockOpener, RecordingSink>, SinkProbe) {
        let factory = MockFactory::new();
        let probe = factory.probe();
        let spec = VirtualDeviceSpec {
            name: "VirtualGamepad".to_string(),
            capabilities: CapabilityDescriptor::builder()
                .buttons([BTN_SOUTH])
                .build()
                .unwrap(),
            identity: DeviceIdentity::new(0x03, 0x1038, 0x1430, 0x0111),
        };
        let device = provision_virtual_device(factory, spec).unwrap();
        let forwarder = Forwarder::new(opener, "/dev/input/pad", LinkTiming::immediate(), device);
        (forwarder, probe)
    }

    #[tokio::test]
    async fn test_events_are_forwarded_in_order_each_followed_by_sync() {
        // Arrange
        let press = RelayEvent::button(BTN_SOUTH, true);
        let release = RelayEvent::button(BTN_SOUTH, false);
        let axis = RelayEvent::absolute(ABS_X, 128);
        let opener = MockOpener::new(pad()).connect([press, release, axis]);
        let (mut forwarder, probe) = forwarder(opener);

        // Act
        let report = forwarder.run_cycle().await;

        // Assert
        assert_eq!(report.forwarded, 3);
        assert!(matches!(report.end, CycleEnd::LinkLost(LinkError::Disconnected(_))));
        assert_eq!(
            probe.records(),
            vec![
                SinkRecord::Event(press),
                SinkRecord::Sync,
                SinkRecord::Event(release),
                SinkRecord::Sync,
                SinkRecord::Event(axis),
                SinkRecord::Sync,
            ]
        );
    }

    #[tokio::test]
    async fn test_physical_sync_events_are_forwarded_verbatim() {
        let opener = MockOpener::new(pad()).connect([
            RelayEvent::absolute(ABS_X, 10),
            RelayEvent::sync(),
        ]);
        let (mut forwarder, probe) = forwarder(opener);

        forwarder.run_cycle().await;

        assert_eq!(probe.events(), vec![RelayEvent::absolute(ABS_X, 10), RelayEvent::sync()]);
    }

    #[tokio::test]
    async fn test_waits_through_absent_and_unopenable_paths() {
        // Arrange: absent twice, then a permission error, then connected
        let opener = MockOpener::new(pad())
            .absent()
            .absent()
            .open_fails()
            .connect([RelayEvent::button(BTN_SOUTH, true)]);
        let opens = opener.opens();
        let (mut forwarder, probe) = forwarder(opener);

        // Act
        let report = forwarder.run_cycle().await;

        // Assert
        assert_eq!(opens.get(), 4);
        assert_eq!(report.forwarded, 1);
        assert_eq!(probe.events().len(), 1);
    }

    #[tokio::test]
    async fn test_grab_refusal_ends_cycle_without_relaying() {
        // Arrange
        let opener = MockOpener::new(pad()).grab_refused();
        let (mut forwarder, probe) = forwarder(opener);

        // Act
        let report = forwarder.run_cycle().await;

        // Assert
        assert!(matches!(report.end, CycleEnd::GrabRefused(LinkError::Grab(_))));
        assert_eq!(forwarder.state(), LinkState::AwaitingLink);
        assert_eq!(forwarder.stats().sessions, 0);
        assert!(probe.records().is_empty());
    }

    #[tokio::test]
    async fn test_reconnect_cycles_never_recreate_virtual_device() {
        // Arrange: three sessions, each ending in a disconnect
        let opener = MockOpener::new(pad())
            .connect([RelayEvent::button(BTN_SOUTH, true)])
            .absent()
            .connect([RelayEvent::button(BTN_SOUTH, false)])
            .connect([RelayEvent::absolute(ABS_X, 7)]);
        let (mut forwarder, probe) = forwarder(opener);
        let spec_before = forwarder.virtual_device().spec().clone();

        // Act / Assert
        for _ in 0..3 {
            let report = forwarder.run_cycle().await;
            assert!(matches!(report.end, CycleEnd::LinkLost(_)));
            assert_eq!(forwarder.state(), LinkState::AwaitingLink);
            assert_eq!(*forwarder.virtual_device().spec(), spec_before);
        }
        assert_eq!(probe.created(), 1);
        assert_eq!(forwarder.stats().sessions, 3);
        assert_eq!(forwarder.stats().reconnects, 2);
        assert_eq!(forwarder.stats().events_forwarded, 3);
    }

    #[tokio::test]
    async fn test_each_cycle_opens_a_fresh_handle() {
        let opener = MockOpener::new(pad())
            .connect([RelayEvent::sync()])
            .connect([RelayEvent::sync()]);
        let opens = opener.opens();
        let (mut forwarder, _probe) = forwarder(opener);

        forwarder.run_cycle().await;
        forwarder.run_cycle().await;

        assert_eq!(opens.get(), 2);
    }

    #[tokio::test]
    async fn test_sink_fault_ends_cycle_as_fault() {
        // Arrange
        let opener = MockOpener::new(pad()).connect([
            RelayEvent::button(BTN_SOUTH, true),
            RelayEvent::button(BTN_SOUTH, false),
        ]);
        let (mut forwarder, probe) = forwarder(opener);
        probe.fail_writes(true);

        // Act
        let report = forwarder.run_cycle().await;

        // Assert
        assert!(matches!(report.end, CycleEnd::Fault(RelayError::Sink(_))));
        assert_eq!(report.forwarded, 0);
        assert_eq!(forwarder.state(), LinkState::AwaitingLink);
    }

    #[tokio::test]
    async fn test_fault_is_recovered_on_next_cycle() {
        let opener = MockOpener::new(pad())
            .connect([RelayEvent::button(BTN_SOUTH, true)])
            .connect([RelayEvent::button(BTN_SOUTH, true)]);
        let (mut forwarder, probe) = forwarder(opener);

        probe.fail_writes(true);
        let first = forwarder.run_cycle().await;
        probe.fail_writes(false);
        let second = forwarder.run_cycle().await;

        assert!(matches!(first.end, CycleEnd::Fault(_)));
        assert_eq!(second.forwarded, 1);
        assert_eq!(probe.created(), 1);
    }

    #[test]
    fn test_link_error_messages_name_the_path() {
        let absent = LinkError::Absent {
            path: PathBuf::from("/dev/input/pad"),
        };
        let open = LinkError::Open {
            path: PathBuf::from("/dev/input/pad"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };
        assert_eq!(absent.to_string(), "/dev/input/pad does not exist");
        assert_eq!(
            open.to_string(),
            "failed to open /dev/input/pad: permission denied"
        );
    }
}
