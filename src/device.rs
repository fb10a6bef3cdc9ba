//! Device discovery and handle management for MPSSE adapters.

use crate::error::{self, Result};
use crate::transport::{c_field_str, NativeHandle, RawDeviceInfo, Transport};
use log::{debug, trace, warn};
use std::fmt;

/// Chip variant reported by the native device list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChipType {
    FtBm,
    FtAm,
    Ft100Ax,
    Unknown,
    Ft2232C,
    Ft232R,
    Ft2232H,
    Ft4232H,
    Ft232H,
    FtXSeries,
    /// Any other native type tag.
    Other(u32),
}

impl ChipType {
    pub fn from_native(tag: u32) -> Self {
        match tag {
            0 => ChipType::FtBm,
            1 => ChipType::FtAm,
            2 => ChipType::Ft100Ax,
            3 => ChipType::Unknown,
            4 => ChipType::Ft2232C,
            5 => ChipType::Ft232R,
            6 => ChipType::Ft2232H,
            7 => ChipType::Ft4232H,
            8 => ChipType::Ft232H,
            9 => ChipType::FtXSeries,
            other => ChipType::Other(other),
        }
    }

    /// Whether this variant has an MPSSE engine.
    pub fn is_mpsse_capable(self) -> bool {
        matches!(
            self,
            ChipType::Ft2232C | ChipType::Ft2232H | ChipType::Ft4232H | ChipType::Ft232H
        )
    }
}

/// Identity of one adapter as last enumerated.
///
/// `index` follows enumeration order and is not stable across
/// re-enumeration. Only [`open`] and [`close`] change a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    index: usize,
    is_open: bool,
    is_high_speed: bool,
    chip_type: ChipType,
    vid: u16,
    pid: u16,
    loc_id: u32,
    serial: String,
    description: String,
    handle: Option<NativeHandle>,
}

impl DeviceDescriptor {
    /// Builds a descriptor from a native list record.
    ///
    /// Returns `None` if the serial or description field is malformed (no
    /// NUL terminator or not UTF-8).
    pub fn from_raw(index: usize, raw: &RawDeviceInfo) -> Option<Self> {
        Some(Self {
            index,
            is_open: raw.is_open(),
            is_high_speed: raw.is_high_speed(),
            chip_type: ChipType::from_native(raw.chip_type),
            vid: raw.vid(),
            pid: raw.pid(),
            loc_id: raw.loc_id,
            serial: c_field_str(&raw.serial_number)?,
            description: c_field_str(&raw.description)?,
            handle: raw.handle,
        })
    }

    /// Position in the enumeration this descriptor came from.
    pub fn index(&self) -> usize {
        self.index
    }
    /// Whether the device is open, by this process or another one.
    pub fn is_open(&self) -> bool {
        self.is_open
    }
    /// Whether the device enumerated on a high-speed USB port.
    pub fn is_high_speed(&self) -> bool {
        self.is_high_speed
    }
    /// Chip variant reported by the driver.
    pub fn chip_type(&self) -> ChipType {
        self.chip_type
    }
    /// USB vendor ID.
    pub fn vid(&self) -> u16 {
        self.vid
    }
    /// USB product ID.
    pub fn pid(&self) -> u16 {
        self.pid
    }
    /// USB location ID (bus and port path).
    pub fn loc_id(&self) -> u32 {
        self.loc_id
    }
    /// Serial number string from the device EEPROM.
    pub fn serial(&self) -> &str {
        &self.serial
    }
    /// Product description string from the device EEPROM.
    pub fn description(&self) -> &str {
        &self.description
    }
    /// Native handle, present only while this process holds the device open.
    pub fn handle(&self) -> Option<NativeHandle> {
        self.handle
    }
}

impl fmt::Display for DeviceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {:?} VID=0x{:04X} PID=0x{:04X} SN='{}' Desc='{}' Loc=0x{:X}{}{}",
            self.index,
            self.chip_type,
            self.vid,
            self.pid,
            self.serial,
            self.description,
            self.loc_id,
            if self.is_high_speed { " hi-speed" } else { "" },
            if self.is_open { " [open]" } else { "" },
        )
    }
}

/// Lists attached adapters in enumeration order.
///
/// A failed count or detail query fails the whole call. A single malformed
/// detail record is skipped (best effort) and logged; the remaining
/// descriptors keep their enumeration index.
pub fn enumerate<T: Transport>(transport: &mut T) -> Result<Vec<DeviceDescriptor>> {
    let count = transport
        .count_devices()
        .map_err(error::transport("count_devices"))?;
    debug!("Transport reports {} device(s)", count);
    if count == 0 {
        return Ok(Vec::new());
    }

    let records = transport
        .device_details(count)
        .map_err(error::transport("device_details"))?;
    let mut devices = Vec::with_capacity(records.len());
    for (index, raw) in records.iter().enumerate() {
        match DeviceDescriptor::from_raw(index, raw) {
            Some(device) => {
                debug!("Found device: {}", device);
                devices.push(device);
            }
            None => warn!(
                "Skipping malformed device record at index {} (ID=0x{:08X}, Loc=0x{:X})",
                index, raw.id, raw.loc_id
            ),
        }
    }
    Ok(devices)
}

/// Opens `device`, closing it first if it is already open.
///
/// On failure the descriptor is left as it was after the optional close.
pub fn open<T: Transport>(transport: &mut T, device: &mut DeviceDescriptor) -> Result<()> {
    if device.is_open {
        trace!("Device #{} already open, closing before re-open", device.index);
        close(transport, device)?;
    }
    let handle = transport
        .open(device)
        .map_err(error::transport("open"))?;
    debug!("Opened device #{}: handle={:?}", device.index, handle);
    device.is_open = true;
    device.handle = Some(handle);
    Ok(())
}

/// Releases `device`. A no-op if it is not open.
pub fn close<T: Transport>(transport: &mut T, device: &mut DeviceDescriptor) -> Result<()> {
    if !device.is_open {
        return Ok(());
    }
    match device.handle.take() {
        Some(handle) => {
            let result = transport.close(handle).map_err(error::transport("close"));
            device.is_open = false;
            result?;
            debug!("Closed device #{}", device.index);
        }
        None => {
            // Opened elsewhere; nothing of ours to release.
            device.is_open = false;
        }
    }
    Ok(())
}
