//! Integration tests for the relay lifecycle.
//!
//! These tests drive the public API end to end over the in-memory platform:
//! startup, several unplug/replug cycles, and the guarantees consumers of the
//! virtual device rely on (one device, unchanged, fed every event in order).

use std::time::Duration;

use padlink::application::bootstrap::{bootstrap, StartupError};
use padlink::application::forward_events::{CycleEnd, LinkError};
use padlink::domain::RelayConfig;
use padlink::infrastructure::mock::{
    MockDevice, MockFactory, MockOpener, MockPublisher, SinkRecord,
};
use padlink_core::event::codes::{ABS_X, ABS_Y, BTN_EAST, BTN_SOUTH, FF_RUMBLE};
use padlink_core::{AxisCalibration, DeviceIdentity, LinkState, LinkTiming, RelayEvent};

fn config() -> RelayConfig {
    RelayConfig {
        timing: LinkTiming::immediate(),
        discovery_retry_delay: Duration::ZERO,
        ..RelayConfig::default()
    }
}

fn stratus() -> MockDevice {
    MockDevice::new("SteelSeries Stratus Duo")
        .with_identity(DeviceIdentity::new(0x03, 0x1038, 0x1430, 0x0111))
        .with_buttons([BTN_SOUTH, BTN_EAST])
        .with_axis(ABS_X, AxisCalibration::new(0, -32768, 32767, 16, 128, 0))
        .with_axis(ABS_Y, AxisCalibration::new(0, -32768, 32767, 16, 128, 0))
        .with_effects([FF_RUMBLE])
}

fn frame(code: u16, value: i32) -> [RelayEvent; 2] {
    [RelayEvent::absolute(code, value), RelayEvent::sync()]
}

#[tokio::test]
async fn test_virtual_device_survives_repeated_reconnects() {
    // Arrange: startup open, then three sessions separated by absences
    let opener = MockOpener::new(stratus())
        .plugged_in()
        .connect(frame(ABS_X, 100))
        .absent()
        .absent()
        .connect(frame(ABS_X, 200))
        .absent()
        .connect(frame(ABS_Y, -5));
    let factory = MockFactory::new();
    let probe = factory.probe();
    let mut forwarder = bootstrap(&config(), opener, factory, &MockPublisher::default())
        .await
        .unwrap();
    let created_with = forwarder.virtual_device().spec().clone();

    // Act
    let mut ends = Vec::new();
    for _ in 0..3 {
        let report = forwarder.run_cycle().await;
        assert_eq!(report.forwarded, 2);
        ends.push(report.end);
        assert_eq!(forwarder.state(), LinkState::AwaitingLink);
    }

    // Assert
    assert!(ends
        .iter()
        .all(|end| matches!(end, CycleEnd::LinkLost(LinkError::Disconnected(_)))));
    assert_eq!(probe.created(), 1);
    assert_eq!(*forwarder.virtual_device().spec(), created_with);
    assert_eq!(forwarder.stats().sessions, 3);
    assert_eq!(forwarder.stats().reconnects, 2);
    assert_eq!(forwarder.stats().events_forwarded, 6);
}

#[tokio::test]
async fn test_events_reach_virtual_device_in_order_across_sessions() {
    // Arrange
    let first = [
        RelayEvent::button(BTN_SOUTH, true),
        RelayEvent::absolute(ABS_X, 1200),
        RelayEvent::sync(),
    ];
    let second = [RelayEvent::button(BTN_SOUTH, false), RelayEvent::sync()];
    let opener = MockOpener::new(stratus())
        .plugged_in()
        .connect(first)
        .open_fails()
        .connect(second);
    let factory = MockFactory::new();
    let probe = factory.probe();
    let mut forwarder = bootstrap(&config(), opener, factory, &MockPublisher::default())
        .await
        .unwrap();

    // Act
    forwarder.run_cycle().await;
    forwarder.run_cycle().await;

    // Assert
    let expected: Vec<RelayEvent> = first.into_iter().chain(second).collect();
    assert_eq!(probe.events(), expected);
    let records = probe.records();
    assert_eq!(records.len(), expected.len() * 2);
    assert!(records
        .chunks(2)
        .all(|pair| matches!(pair, [SinkRecord::Event(_), SinkRecord::Sync])));
}

#[tokio::test]
async fn test_virtual_device_copies_physical_profile() {
    let opener = MockOpener::new(stratus()).plugged_in();
    let factory = MockFactory::new();
    let probe = factory.probe();

    bootstrap(&config(), opener, factory, &MockPublisher::default())
        .await
        .unwrap();

    let spec = &probe.specs()[0];
    assert_eq!(spec.name, "VirtualGamepad");
    assert_eq!(spec.identity, DeviceIdentity::new(0x03, 0x1038, 0x1430, 0x0111));
    assert!(spec.capabilities.buttons().contains(&BTN_EAST));
    assert_eq!(spec.capabilities.axes().len(), 2);
    assert!(spec
        .capabilities
        .effects()
        .is_some_and(|effects| effects.contains(&FF_RUMBLE)));
}

#[tokio::test]
async fn test_refused_grab_then_successful_session() {
    // Arrange
    let opener = MockOpener::new(stratus())
        .plugged_in()
        .grab_refused()
        .connect(frame(ABS_Y, 7));
    let mut forwarder = bootstrap(&config(), opener, MockFactory::new(), &MockPublisher::default())
        .await
        .unwrap();

    // Act
    let refused = forwarder.run_cycle().await;
    let relayed = forwarder.run_cycle().await;

    // Assert
    assert!(matches!(refused.end, CycleEnd::GrabRefused(_)));
    assert_eq!(relayed.forwarded, 2);
    assert_eq!(forwarder.stats().sessions, 1);
    assert_eq!(forwarder.stats().reconnects, 0);
}

#[tokio::test]
async fn test_sink_fault_does_not_recreate_device() {
    // Arrange
    let opener = MockOpener::new(stratus())
        .plugged_in()
        .connect(frame(ABS_X, 1))
        .connect(frame(ABS_X, 2));
    let factory = MockFactory::new();
    let probe = factory.probe();
    let mut forwarder = bootstrap(&config(), opener, factory, &MockPublisher::default())
        .await
        .unwrap();

    // Act
    probe.fail_writes(true);
    let faulted = forwarder.run_cycle().await;
    probe.fail_writes(false);
    let recovered = forwarder.run_cycle().await;

    // Assert
    assert!(matches!(faulted.end, CycleEnd::Fault(_)));
    assert_eq!(recovered.forwarded, 2);
    assert_eq!(probe.created(), 1);
}

#[tokio::test]
async fn test_run_keeps_relaying_until_dropped() {
    // Arrange: two sessions, then the device stays away
    let opener = MockOpener::new(stratus())
        .plugged_in()
        .connect(frame(ABS_X, 1))
        .connect(frame(ABS_X, 2));
    let factory = MockFactory::new();
    let probe = factory.probe();
    let cfg = RelayConfig {
        timing: LinkTiming {
            poll_interval: Duration::from_millis(1),
            backoff: Duration::from_millis(1),
        },
        ..config()
    };
    let mut forwarder = bootstrap(&cfg, opener, factory, &MockPublisher::default())
        .await
        .unwrap();

    // Act: the loop never returns on its own
    let outcome = tokio::time::timeout(Duration::from_millis(200), forwarder.run()).await;

    // Assert
    assert!(outcome.is_err());
    assert_eq!(probe.events().len(), 4);
    assert_eq!(forwarder.stats().reconnects, 1);
}

#[tokio::test]
async fn test_startup_failures_map_to_distinct_exit_codes() {
    let no_caps = bootstrap(
        &config(),
        MockOpener::new(MockDevice::new("dud")).plugged_in(),
        MockFactory::new(),
        &MockPublisher::default(),
    )
    .await;
    let no_uinput = bootstrap(
        &config(),
        MockOpener::new(stratus()).plugged_in(),
        MockFactory::failing(),
        &MockPublisher::default(),
    )
    .await;

    let no_caps = no_caps.err().unwrap();
    let no_uinput = no_uinput.err().unwrap();
    assert!(matches!(no_caps, StartupError::Capabilities(_)));
    assert!(matches!(no_uinput, StartupError::VirtualDevice(_)));
    assert_ne!(no_caps.exit_code(), no_uinput.exit_code());
    assert_ne!(no_caps.exit_code(), 0);
}
