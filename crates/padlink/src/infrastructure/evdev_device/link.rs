//! Physical device side: open, query, grab, read.

use std::collections::HashMap;
use std::io;
use std::os::fd::AsRawFd;
use std::path::Path;

use async_trait::async_trait;
use evdev::{Device, EventStream};
use padlink_core::{AxisCalibration, DeviceIdentity, RelayEvent};

use super::absinfo::read_absinfo;
use crate::application::forward_events::{LinkError, LinkOpener, PhysicalLink};
use crate::application::mirror_capabilities::CapabilitySource;

/// Opens evdev nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvdevOpener;

impl LinkOpener for EvdevOpener {
    type Link = EvdevLink;

    /// Must be called from within a Tokio runtime: the handle is registered
    /// with the reactor on open.
    fn open(&self, path: &Path) -> Result<EvdevLink, LinkError> {
        // `exists` follows symlinks, so a dangling by-id link counts as absent.
        if !path.exists() {
            return Err(LinkError::Absent {
                path: path.to_path_buf(),
            });
        }

        let open_error = |source: io::Error| {
            if source.kind() == io::ErrorKind::NotFound {
                LinkError::Absent {
                    path: path.to_path_buf(),
                }
            } else {
                LinkError::Open {
                    path: path.to_path_buf(),
                    source,
                }
            }
        };

        let device = Device::open(path).map_err(open_error)?;
        let stream = device.into_event_stream().map_err(open_error)?;
        Ok(EvdevLink { stream })
    }
}

/// An open evdev node.  Dropping it closes the node and releases the grab.
pub struct EvdevLink {
    stream: EventStream,
}

impl EvdevLink {
    fn device(&self) -> &Device {
        self.stream.device()
    }
}

impl CapabilitySource for EvdevLink {
    fn device_name(&self) -> Option<String> {
        self.device().name().map(str::to_string)
    }

    fn identity(&self) -> DeviceIdentity {
        let id = self.device().input_id();
        DeviceIdentity::new(id.bus_type().0, id.vendor(), id.product(), id.version())
    }

    fn supported_buttons(&self) -> Vec<u16> {
        self.device()
            .supported_keys()
            .map(|keys| keys.iter().map(|key| key.0).collect())
            .unwrap_or_default()
    }

    fn supported_axes(&self) -> Vec<u16> {
        self.device()
            .supported_absolute_axes()
            .map(|axes| axes.iter().map(|axis| axis.0).collect())
            .unwrap_or_default()
    }

    fn bulk_calibration(&self) -> io::Result<HashMap<u16, AxisCalibration>> {
        let state = self.device().get_abs_state()?;
        Ok(self
            .supported_axes()
            .into_iter()
            .filter_map(|code| {
                let info = state.get(usize::from(code))?;
                let calibration = AxisCalibration::new(
                    info.value,
                    info.minimum,
                    info.maximum,
                    info.fuzz,
                    info.flat,
                    info.resolution,
                );
                Some((code, calibration))
            })
            .collect())
    }

    fn axis_calibration(&self, code: u16) -> io::Result<AxisCalibration> {
        read_absinfo(self.device().as_raw_fd(), code)
    }

    fn supported_effects(&self) -> Vec<u16> {
        self.device()
            .supported_ff()
            .map(|effects| effects.iter().map(|effect| effect.0).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PhysicalLink for EvdevLink {
    fn grab(&mut self) -> Result<(), LinkError> {
        self.stream.device_mut().grab().map_err(LinkError::Grab)
    }

    async fn next_event(&mut self) -> Result<RelayEvent, LinkError> {
        let event = self
            .stream
            .next_event()
            .await
            .map_err(LinkError::Disconnected)?;
        Ok(RelayEvent::new(
            event.event_type().0,
            event.code(),
            event.value(),
        ))
    }
}
