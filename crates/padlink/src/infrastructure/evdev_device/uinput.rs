//! Virtual device side: build the uinput device and write into it.

use std::io;

use evdev::uinput::VirtualDevice;
use evdev::{
    AbsInfo, AbsoluteAxisCode, AttributeSet, BusType, FFEffectCode, InputEvent, InputId, KeyCode,
    UinputAbsSetup,
};
use padlink_core::RelayEvent;

use crate::application::provision_device::{
    FactoryError, VirtualDeviceFactory, VirtualDeviceSpec, VirtualSink,
};

/// Effect slots offered when force feedback is mirrored.  uinput refuses
/// `EV_FF` with zero slots.
pub const FF_EFFECTS_MAX: u32 = 96;

/// Creates the uinput device.  Needs write access to `/dev/uinput`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvdevFactory;

impl VirtualDeviceFactory for EvdevFactory {
    type Sink = EvdevSink;

    fn create(self, spec: &VirtualDeviceSpec) -> Result<EvdevSink, FactoryError> {
        let device = build(spec).map_err(FactoryError::Create)?;
        Ok(EvdevSink {
            device,
            pending: Vec::new(),
        })
    }
}

fn build(spec: &VirtualDeviceSpec) -> io::Result<VirtualDevice> {
    let id = spec.identity;
    let caps = &spec.capabilities;

    let mut builder = VirtualDevice::builder()?
        .name(spec.name.as_str())
        .input_id(InputId::new(
            BusType(id.bus_type),
            id.vendor,
            id.product,
            id.version,
        ));

    if !caps.buttons().is_empty() {
        let mut keys = AttributeSet::<KeyCode>::default();
        for &code in caps.buttons() {
            keys.insert(KeyCode(code));
        }
        builder = builder.with_keys(&keys)?;
    }

    for (&code, cal) in caps.axes() {
        let info = AbsInfo::new(
            cal.value,
            cal.minimum,
            cal.maximum,
            cal.fuzz,
            cal.flat,
            cal.resolution,
        );
        builder = builder.with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisCode(code), info))?;
    }

    if let Some(effects) = caps.effects() {
        let mut ff = AttributeSet::<FFEffectCode>::default();
        for &code in effects {
            ff.insert(FFEffectCode(code));
        }
        builder = builder.with_ff(&ff)?.with_ff_effects_max(FF_EFFECTS_MAX);
    }

    builder.build()
}

/// Write side of the uinput device.
///
/// Events are queued by `write_event` and written by `sync`.  evdev's
/// `emit` appends its own `SYN_REPORT`, which is the flush.  An extra
/// report right after a forwarded `SYN_REPORT` carries no events and is
/// discarded by the input core.
pub struct EvdevSink {
    device: VirtualDevice,
    pending: Vec<InputEvent>,
}

impl VirtualSink for EvdevSink {
    fn write_event(&mut self, event: RelayEvent) -> io::Result<()> {
        self.pending
            .push(InputEvent::new(event.kind, event.code, event.value));
        Ok(())
    }

    fn sync(&mut self) -> io::Result<()> {
        let result = self.device.emit(&self.pending);
        self.pending.clear();
        result
    }
}
