//! The native transport seam.
//!
//! Everything below the session (USB access, MPSSE command framing, clock
//! programming) lives behind [`Transport`]. Implementations translate their
//! native status codes with [`Status::check`]. The bundled native binding is
//! `ffi::LibMpsse` (feature `libmpsse`); tests drive the session through a
//! scripted implementation.

use crate::consts::{self, list_flags};
use crate::device::DeviceDescriptor;
use crate::error::Status;
use crate::i2c::I2cConfig;
use crate::spi::{SpiConfig, SpiTransferOptions};

/// Result of a single native call.
pub type TransportResult<T> = std::result::Result<T, Status>;

/// Opaque token for an open native device handle.
///
/// Only meaningful to the transport that produced it and only while the
/// device it was returned for stays open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeHandle(pub usize);

/// One record of the native device list, as the transport reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDeviceInfo {
    /// Bit 0: open, bit 1: high-speed.
    pub flags: u32,
    /// Native chip-type tag.
    pub chip_type: u32,
    /// `VID << 16 | PID`.
    pub id: u32,
    pub loc_id: u32,
    /// NUL-terminated serial number.
    pub serial_number: [u8; consts::SERIAL_NUMBER_LEN],
    /// NUL-terminated description.
    pub description: [u8; consts::DESCRIPTION_LEN],
    /// Native handle if the transport already holds the device open.
    pub handle: Option<NativeHandle>,
}

impl RawDeviceInfo {
    /// Builds a record from Rust strings, truncating them to fit the native
    /// fixed-size fields (one byte is always kept for the terminator).
    pub fn new(
        flags: u32,
        chip_type: u32,
        vid: u16,
        pid: u16,
        loc_id: u32,
        serial_number: &str,
        description: &str,
    ) -> Self {
        Self {
            flags,
            chip_type,
            id: (u32::from(vid) << 16) | u32::from(pid),
            loc_id,
            serial_number: c_field(serial_number),
            description: c_field(description),
            handle: None,
        }
    }

    /// USB vendor ID, the high half of `id`.
    pub fn vid(&self) -> u16 {
        (self.id >> 16) as u16
    }

    /// USB product ID, the low half of `id`.
    pub fn pid(&self) -> u16 {
        (self.id & 0xFFFF) as u16
    }

    pub fn is_open(&self) -> bool {
        self.flags & list_flags::OPENED != 0
    }

    pub fn is_high_speed(&self) -> bool {
        self.flags & list_flags::HI_SPEED != 0
    }
}

fn c_field<const N: usize>(s: &str) -> [u8; N] {
    let mut buf = [0u8; N];
    let len = s.len().min(N - 1);
    buf[..len].copy_from_slice(&s.as_bytes()[..len]);
    buf
}

/// Reads a NUL-terminated string out of a fixed native field.
///
/// Returns `None` if the field has no terminator or is not valid UTF-8.
pub(crate) fn c_field_str(field: &[u8]) -> Option<String> {
    let end = field.iter().position(|&b| b == 0)?;
    std::str::from_utf8(&field[..end]).ok().map(str::to_string)
}

/// The status-code style API of the native MPSSE library.
///
/// Every method is a blocking round trip. Implementations provide no
/// internal locking; a session issues at most one call at a time.
pub trait Transport {
    /// Number of attached devices.
    fn count_devices(&mut self) -> TransportResult<u32>;

    /// Detail records for `count` devices, in enumeration order.
    fn device_details(&mut self, count: u32) -> TransportResult<Vec<RawDeviceInfo>>;

    /// Opens the device described by `device`.
    fn open(&mut self, device: &DeviceDescriptor) -> TransportResult<NativeHandle>;

    /// Releases a handle returned by [`Transport::open`].
    fn close(&mut self, handle: NativeHandle) -> TransportResult<()>;

    /// Puts the channel into SPI master mode.
    fn init_spi(&mut self, handle: NativeHandle, config: &SpiConfig) -> TransportResult<()>;

    /// Puts the channel into I2C master mode.
    fn init_i2c(&mut self, handle: NativeHandle, config: &I2cConfig) -> TransportResult<()>;

    /// Clocks `data` out over SPI, returning the number of bytes transferred.
    fn spi_write(
        &mut self,
        handle: NativeHandle,
        data: &[u8],
        options: SpiTransferOptions,
    ) -> TransportResult<usize>;

    /// Drives the GPIO bank.
    fn gpio_write(&mut self, handle: NativeHandle, direction: u8, value: u8)
        -> TransportResult<()>;

    /// Samples the GPIO bank.
    fn gpio_read(&mut self, handle: NativeHandle) -> TransportResult<u8>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn count_devices(&mut self) -> TransportResult<u32> {
        (**self).count_devices()
    }
    fn device_details(&mut self, count: u32) -> TransportResult<Vec<RawDeviceInfo>> {
        (**self).device_details(count)
    }
    fn open(&mut self, device: &DeviceDescriptor) -> TransportResult<NativeHandle> {
        (**self).open(device)
    }
    fn close(&mut self, handle: NativeHandle) -> TransportResult<()> {
        (**self).close(handle)
    }
    fn init_spi(&mut self, handle: NativeHandle, config: &SpiConfig) -> TransportResult<()> {
        (**self).init_spi(handle, config)
    }
    fn init_i2c(&mut self, handle: NativeHandle, config: &I2cConfig) -> TransportResult<()> {
        (**self).init_i2c(handle, config)
    }
    fn spi_write(
        &mut self,
        handle: NativeHandle,
        data: &[u8],
        options: SpiTransferOptions,
    ) -> TransportResult<usize> {
        (**self).spi_write(handle, data, options)
    }
    fn gpio_write(
        &mut self,
        handle: NativeHandle,
        direction: u8,
        value: u8,
    ) -> TransportResult<()> {
        (**self).gpio_write(handle, direction, value)
    }
    fn gpio_read(&mut self, handle: NativeHandle) -> TransportResult<u8> {
        (**self).gpio_read(handle)
    }
}
