//! Per-axis `EVIOCGABS` query.
//!
//! The evdev crate only exposes calibration for all axes at once.  This is
//! the single-code form used when that bulk answer is missing an axis.

use std::io;
use std::os::fd::RawFd;

use padlink_core::event::codes::ABS_CNT;
use padlink_core::AxisCalibration;

/// `_IOR('E', 0x40, struct input_absinfo)`; the axis code is added to it.
const EVIOCGABS_BASE: u32 = 0x8018_4540;

/// Reads calibration for axis `code` from the device behind `fd`.
pub(super) fn read_absinfo(fd: RawFd, code: u16) -> io::Result<AxisCalibration> {
    if usize::from(code) >= ABS_CNT {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("axis code {code:#04x} out of range"),
        ));
    }

    let mut info = libc::input_absinfo {
        value: 0,
        minimum: 0,
        maximum: 0,
        fuzz: 0,
        flat: 0,
        resolution: 0,
    };
    let request = EVIOCGABS_BASE + u32::from(code);
    // SAFETY: `info` is a live, writable `input_absinfo`, which is exactly
    // what EVIOCGABS fills in; the kernel never writes past it.
    let ret = unsafe { libc::ioctl(fd, request as _, &mut info as *mut libc::input_absinfo) };
    if ret < 0 {
        return Err(io::Error::last_os_error());
    }

    Ok(AxisCalibration::new(
        info.value,
        info.minimum,
        info.maximum,
        info.fuzz,
        info.flat,
        info.resolution,
    ))
}
