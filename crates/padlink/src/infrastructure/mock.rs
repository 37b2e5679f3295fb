//! In-memory platform for tests.
//!
//! # Why a mock platform?
//!
//! The real adapters need `/dev/input`, `/dev/uinput`, and a controller that
//! can be unplugged on demand.  None of that exists on a CI machine, and a
//! test cannot yank a USB cable.  The types here replace every platform call
//! with scripted or recorded behaviour:
//!
//! - [`MockDevice`] – a physical device profile: name, identity, buttons,
//!   axes with calibration, effects.  Calibration lookups can be made to
//!   fail per code or in bulk.
//! - [`MockOpener`] – a script of what each successive open returns: absent,
//!   unopenable, grab refused, or a session that yields a fixed list of
//!   events and then disconnects.
//! - [`MockFactory`] / [`RecordingSink`] – a virtual device that records
//!   every write and sync in order.  The [`SinkProbe`] obtained from the
//!   factory stays usable after the factory has been consumed.
//! - [`MockPublisher`] – an alias publisher that fails a configurable number
//!   of times before succeeding.
//!
//! # Usage in tests
//!
//! ```
//! use padlink::application::forward_events::Forwarder;
//! use padlink::application::provision_device::{provision_virtual_device, VirtualDeviceSpec};
//! use padlink::infrastructure::mock::{MockDevice, MockFactory, MockOpener, SinkRecord};
//! use padlink_core::event::codes::BTN_SOUTH;
//! use padlink_core::{CapabilityDescriptor, DeviceIdentity, LinkTiming, RelayEvent};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
//! let press = RelayEvent::button(BTN_SOUTH, true);
//! let opener = MockOpener::new(MockDevice::new("pad").with_buttons([BTN_SOUTH])).connect([press]);
//! let factory = MockFactory::new();
//! let probe = factory.probe();
//! let spec = VirtualDeviceSpec {
//!     name: "VirtualGamepad".into(),
//!     capabilities: CapabilityDescriptor::builder().buttons([BTN_SOUTH]).build().unwrap(),
//!     identity: DeviceIdentity::virtual_default(),
//! };
//! let device = provision_virtual_device(factory, spec).unwrap();
//! let mut forwarder = Forwarder::new(opener, "/dev/input/pad", LinkTiming::immediate(), device);
//!
//! forwarder.run_cycle().await;
//!
//! assert_eq!(probe.records(), vec![SinkRecord::Event(press), SinkRecord::Sync]);
//! # });
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use padlink_core::domain::identity::BUS_USB;
use padlink_core::{AxisCalibration, DeviceIdentity, RelayEvent};

use crate::application::forward_events::{LinkError, LinkOpener, PhysicalLink};
use crate::application::mirror_capabilities::CapabilitySource;
use crate::application::provision_device::{
    FactoryError, VirtualDeviceFactory, VirtualDeviceSpec, VirtualSink,
};
use crate::application::publish_aliases::{
    Alias, AliasPublisher, DiscoveryError, PublishedAliases,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── Physical device ───────────────────────────────────────────────────────────

/// A scripted physical device profile.
#[derive(Debug, Clone)]
pub struct MockDevice {
    name: Option<String>,
    identity: DeviceIdentity,
    buttons: Vec<u16>,
    /// `None` marks an axis no query can describe.
    axes: BTreeMap<u16, Option<AxisCalibration>>,
    bulk_omitted: BTreeSet<u16>,
    bulk_fails: bool,
    per_code_fails: bool,
    effects: Vec<u16>,
    per_code_queries: Arc<AtomicUsize>,
}

impl MockDevice {
    /// A USB device called `name` with no capabilities.
    pub fn new(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            identity: DeviceIdentity::new(BUS_USB, 0x1234, 0x5678, 0x0001),
            buttons: Vec::new(),
            axes: BTreeMap::new(),
            bulk_omitted: BTreeSet::new(),
            bulk_fails: false,
            per_code_fails: false,
            effects: Vec::new(),
            per_code_queries: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_identity(mut self, identity: DeviceIdentity) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_buttons(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.buttons.extend(codes);
        self
    }

    pub fn with_axis(mut self, code: u16, calibration: AxisCalibration) -> Self {
        self.axes.insert(code, Some(calibration));
        self
    }

    /// Advertises `code` but reports a zeroed bulk record and fails the
    /// per-code query for it.
    pub fn with_uncalibrated_axis(mut self, code: u16) -> Self {
        self.axes.insert(code, None);
        self
    }

    /// Leaves `code` out of the bulk calibration map.
    pub fn omit_from_bulk(mut self, code: u16) -> Self {
        self.bulk_omitted.insert(code);
        self
    }

    /// Makes the bulk calibration query fail outright.
    pub fn with_failing_bulk(mut self) -> Self {
        self.bulk_fails = true;
        self
    }

    /// Makes every per-code calibration query fail.
    pub fn with_bulk_only(mut self) -> Self {
        self.per_code_fails = true;
        self
    }

    pub fn with_effects(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.effects.extend(codes);
        self
    }

    /// Number of per-code calibration queries made so far, across clones.
    pub fn per_code_queries(&self) -> usize {
        self.per_code_queries.load(Ordering::SeqCst)
    }
}

impl CapabilitySource for MockDevice {
    fn device_name(&self) -> Option<String> {
        self.name.clone()
    }

    fn identity(&self) -> DeviceIdentity {
        self.identity
    }

    fn supported_buttons(&self) -> Vec<u16> {
        self.buttons.clone()
    }

    fn supported_axes(&self) -> Vec<u16> {
        self.axes.keys().copied().collect()
    }

    fn bulk_calibration(&self) -> io::Result<HashMap<u16, AxisCalibration>> {
        if self.bulk_fails {
            return Err(io::Error::other("bulk absinfo unavailable"));
        }
        Ok(self
            .axes
            .iter()
            .filter(|(code, _)| !self.bulk_omitted.contains(*code))
            .map(|(code, calibration)| (*code, calibration.unwrap_or_default()))
            .collect())
    }

    fn axis_calibration(&self, code: u16) -> io::Result<AxisCalibration> {
        self.per_code_queries.fetch_add(1, Ordering::SeqCst);
        match self.axes.get(&code) {
            Some(Some(calibration)) if !self.per_code_fails => Ok(*calibration),
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("no absinfo for axis {code:#04x}"),
            )),
        }
    }

    fn supported_effects(&self) -> Vec<u16> {
        self.effects.clone()
    }
}

/// One open of a [`MockDevice`].
#[derive(Debug)]
pub struct MockLink {
    device: MockDevice,
    events: VecDeque<RelayEvent>,
    grab_refused: bool,
    grabbed: bool,
}

impl MockLink {
    pub fn is_grabbed(&self) -> bool {
        self.grabbed
    }
}

impl CapabilitySource for MockLink {
    fn device_name(&self) -> Option<String> {
        self.device.device_name()
    }

    fn identity(&self) -> DeviceIdentity {
        self.device.identity()
    }

    fn supported_buttons(&self) -> Vec<u16> {
        self.device.supported_buttons()
    }

    fn supported_axes(&self) -> Vec<u16> {
        self.device.supported_axes()
    }

    fn bulk_calibration(&self) -> io::Result<HashMap<u16, AxisCalibration>> {
        self.device.bulk_calibration()
    }

    fn axis_calibration(&self, code: u16) -> io::Result<AxisCalibration> {
        self.device.axis_calibration(code)
    }

    fn supported_effects(&self) -> Vec<u16> {
        self.device.supported_effects()
    }
}

#[async_trait]
impl PhysicalLink for MockLink {
    fn grab(&mut self) -> Result<(), LinkError> {
        if self.grab_refused {
            return Err(LinkError::Grab(io::Error::other("device or resource busy")));
        }
        self.grabbed = true;
        Ok(())
    }

    /// Yields the scripted events, then reports a disconnect.
    async fn next_event(&mut self) -> Result<RelayEvent, LinkError> {
        self.events
            .pop_front()
            .ok_or_else(|| LinkError::Disconnected(io::Error::other("no such device")))
    }
}

#[derive(Debug)]
enum OpenStep {
    Absent,
    OpenFails,
    Connect {
        events: Vec<RelayEvent>,
        grab_refused: bool,
    },
}

/// Shared count of open attempts.
#[derive(Debug, Clone, Default)]
pub struct OpenCounter(Arc<AtomicUsize>);

impl OpenCounter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Scripted [`LinkOpener`].  Once the script runs out every open reports
/// the path as absent.
#[derive(Debug)]
pub struct MockOpener {
    device: MockDevice,
    steps: Mutex<VecDeque<OpenStep>>,
    opens: OpenCounter,
}

impl MockOpener {
    pub fn new(device: MockDevice) -> Self {
        Self {
            device,
            steps: Mutex::new(VecDeque::new()),
            opens: OpenCounter::default(),
        }
    }

    /// Next open finds nothing at the path.
    pub fn absent(self) -> Self {
        self.push(OpenStep::Absent)
    }

    /// Next open finds the path but cannot open it.
    pub fn open_fails(self) -> Self {
        self.push(OpenStep::OpenFails)
    }

    /// Next open succeeds but the grab is refused.
    pub fn grab_refused(self) -> Self {
        self.push(OpenStep::Connect {
            events: Vec::new(),
            grab_refused: true,
        })
    }

    /// Next open succeeds; the link yields `events` then disconnects.
    pub fn connect(self, events: impl IntoIterator<Item = RelayEvent>) -> Self {
        self.push(OpenStep::Connect {
            events: events.into_iter().collect(),
            grab_refused: false,
        })
    }

    /// Next open succeeds; the link disconnects on the first read.
    pub fn plugged_in(self) -> Self {
        self.connect(Vec::new())
    }

    pub fn opens(&self) -> OpenCounter {
        self.opens.clone()
    }

    fn push(self, step: OpenStep) -> Self {
        lock(&self.steps).push_back(step);
        self
    }
}

impl LinkOpener for MockOpener {
    type Link = MockLink;

    fn open(&self, path: &Path) -> Result<MockLink, LinkError> {
        self.opens.0.fetch_add(1, Ordering::SeqCst);
        match lock(&self.steps).pop_front() {
            Some(OpenStep::Connect {
                events,
                grab_refused,
            }) => Ok(MockLink {
                device: self.device.clone(),
                events: events.into(),
                grab_refused,
                grabbed: false,
            }),
            Some(OpenStep::OpenFails) => Err(LinkError::Open {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
            }),
            Some(OpenStep::Absent) | None => Err(LinkError::Absent {
                path: path.to_path_buf(),
            }),
        }
    }
}

// ── Virtual device ────────────────────────────────────────────────────────────

/// One call observed by a [`RecordingSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkRecord {
    Event(RelayEvent),
    Sync,
}

#[derive(Debug, Default)]
struct SinkShared {
    created: AtomicUsize,
    specs: Mutex<Vec<VirtualDeviceSpec>>,
    records: Mutex<Vec<SinkRecord>>,
    fail_writes: AtomicBool,
}

/// Virtual sink that records every call.
#[derive(Debug)]
pub struct RecordingSink {
    shared: Arc<SinkShared>,
}

impl RecordingSink {
    fn check(&self) -> io::Result<()> {
        if self.shared.fail_writes.load(Ordering::SeqCst) {
            return Err(io::Error::other("virtual device write failed"));
        }
        Ok(())
    }
}

impl VirtualSink for RecordingSink {
    fn write_event(&mut self, event: RelayEvent) -> io::Result<()> {
        self.check()?;
        lock(&self.shared.records).push(SinkRecord::Event(event));
        Ok(())
    }

    fn sync(&mut self) -> io::Result<()> {
        self.check()?;
        lock(&self.shared.records).push(SinkRecord::Sync);
        Ok(())
    }
}

/// Factory producing a [`RecordingSink`].
#[derive(Debug, Default)]
pub struct MockFactory {
    shared: Arc<SinkShared>,
    fail: bool,
}

impl MockFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A factory whose `create` always fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Observer that outlives the factory.
    pub fn probe(&self) -> SinkProbe {
        SinkProbe {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl VirtualDeviceFactory for MockFactory {
    type Sink = RecordingSink;

    fn create(self, spec: &VirtualDeviceSpec) -> Result<RecordingSink, FactoryError> {
        if self.fail {
            return Err(FactoryError::Create(io::Error::new(
                io::ErrorKind::NotFound,
                "/dev/uinput not available",
            )));
        }
        self.shared.created.fetch_add(1, Ordering::SeqCst);
        lock(&self.shared.specs).push(spec.clone());
        Ok(RecordingSink {
            shared: self.shared,
        })
    }
}

/// Read access to what a [`MockFactory`] and its sink did.
#[derive(Debug, Clone)]
pub struct SinkProbe {
    shared: Arc<SinkShared>,
}

impl SinkProbe {
    /// Number of virtual devices created.
    pub fn created(&self) -> usize {
        self.shared.created.load(Ordering::SeqCst)
    }

    /// Specs passed to `create`, in order.
    pub fn specs(&self) -> Vec<VirtualDeviceSpec> {
        lock(&self.shared.specs).clone()
    }

    /// Every write and sync, in order.
    pub fn records(&self) -> Vec<SinkRecord> {
        lock(&self.shared.records).clone()
    }

    /// Only the written events, in order.
    pub fn events(&self) -> Vec<RelayEvent> {
        self.records()
            .into_iter()
            .filter_map(|record| match record {
                SinkRecord::Event(event) => Some(event),
                SinkRecord::Sync => None,
            })
            .collect()
    }

    /// Makes subsequent writes and syncs fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.shared.fail_writes.store(fail, Ordering::SeqCst);
    }
}

// ── Discovery ─────────────────────────────────────────────────────────────────

/// Alias publisher that reports `NotFound` for the first N calls.
#[derive(Debug, Default)]
pub struct MockPublisher {
    failures: usize,
    published: Option<PublishedAliases>,
    names: Mutex<Vec<String>>,
}

impl MockPublisher {
    /// Fails `failures` times, then returns `published`.
    pub fn succeeding_after(failures: usize, published: PublishedAliases) -> Self {
        Self {
            failures,
            published: Some(published),
            names: Mutex::default(),
        }
    }

    /// Never finds the device.
    pub fn never_found() -> Self {
        Self {
            failures: usize::MAX,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        lock(&self.names).len()
    }

    /// Device names passed to each call.
    pub fn names(&self) -> Vec<String> {
        lock(&self.names).clone()
    }
}

impl AliasPublisher for MockPublisher {
    fn publish(
        &self,
        device_name: &str,
        event_alias: &Path,
        js_alias: &Path,
    ) -> Result<PublishedAliases, DiscoveryError> {
        let mut names = lock(&self.names);
        names.push(device_name.to_string());
        if names.len() <= self.failures {
            return Err(DiscoveryError::NotFound {
                name: device_name.to_string(),
            });
        }
        Ok(self.published.clone().unwrap_or_else(|| PublishedAliases {
            event: Some(Alias {
                link: event_alias.to_path_buf(),
                target: PathBuf::from("/dev/input/event0"),
            }),
            joystick: Some(Alias {
                link: js_alias.to_path_buf(),
                target: PathBuf::from("/dev/input/js0"),
            }),
        }))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use padlink_core::event::codes::{ABS_X, BTN_SOUTH};

    #[test]
    fn test_exhausted_script_reports_absent() {
        let opener = MockOpener::new(MockDevice::new("pad"));
        let result = opener.open(Path::new("/dev/input/pad"));
        assert!(matches!(result, Err(LinkError::Absent { .. })));
        assert_eq!(opener.opens().get(), 1);
    }

    #[tokio::test]
    async fn test_link_yields_script_then_disconnects() {
        // Arrange
        let event = RelayEvent::absolute(ABS_X, 5);
        let opener = MockOpener::new(MockDevice::new("pad")).connect([event]);
        let mut link = opener.open(Path::new("/dev/input/pad")).unwrap();

        // Act
        link.grab().unwrap();
        let first = link.next_event().await.unwrap();
        let second = link.next_event().await;

        // Assert
        assert!(link.is_grabbed());
        assert_eq!(first, event);
        assert!(matches!(second, Err(LinkError::Disconnected(_))));
    }

    #[test]
    fn test_probe_outlives_factory() {
        let factory = MockFactory::new();
        let probe = factory.probe();
        let spec = VirtualDeviceSpec {
            name: "pad".into(),
            capabilities: padlink_core::CapabilityDescriptor::builder()
                .buttons([BTN_SOUTH])
                .build()
                .unwrap(),
            identity: DeviceIdentity::virtual_default(),
        };

        let mut sink = factory.create(&spec).unwrap();
        sink.sync().unwrap();

        assert_eq!(probe.created(), 1);
        assert_eq!(probe.records(), vec![SinkRecord::Sync]);
    }
}
