//! Native transport backed by FTDI's libMPSSE and the D2XX driver.
//!
//! Enabled with the `libmpsse` feature. Links against both `libMPSSE` and
//! `libftd2xx`, which must be installed where the linker can find them.

use crate::consts::{self, open_by};
use crate::device::DeviceDescriptor;
use crate::error::Status;
use crate::i2c::I2cConfig;
use crate::spi::{SpiConfig, SpiTransferOptions};
use crate::transport::{NativeHandle, RawDeviceInfo, Transport, TransportResult};
use log::trace;
use std::ffi::{c_char, c_void, CString};

type FtHandle = *mut c_void;
type FtStatus = u32;

/// `FT_DEVICE_LIST_INFO_NODE`
#[repr(C)]
#[derive(Clone, Copy)]
struct FtDeviceListInfoNode {
    flags: u32,
    type_: u32,
    id: u32,
    loc_id: u32,
    serial_number: [c_char; consts::SERIAL_NUMBER_LEN],
    description: [c_char; consts::DESCRIPTION_LEN],
    ft_handle: FtHandle,
}

impl Default for FtDeviceListInfoNode {
    fn default() -> Self {
        Self {
            flags: 0,
            type_: 0,
            id: 0,
            loc_id: 0,
            serial_number: [0; consts::SERIAL_NUMBER_LEN],
            description: [0; consts::DESCRIPTION_LEN],
            ft_handle: std::ptr::null_mut(),
        }
    }
}

/// libMPSSE SPI `ChannelConfig`
#[repr(C)]
struct SpiChannelConfig {
    clock_rate: u32,
    latency_timer: u8,
    config_options: u32,
    pin: u32,
    reserved: u16,
}

/// libMPSSE I2C `ChannelConfig`
#[repr(C)]
struct I2cChannelConfig {
    clock_rate: u32,
    latency_timer: u8,
    options: u32,
}

// D2XX device list and handle management.
#[link(name = "ftd2xx")]
extern "C" {
    fn FT_CreateDeviceInfoList(num_devs: *mut u32) -> FtStatus;
    fn FT_GetDeviceInfoList(dest: *mut FtDeviceListInfoNode, num_devs: *mut u32) -> FtStatus;
    fn FT_OpenEx(arg: *mut c_void, flags: u32, handle: *mut FtHandle) -> FtStatus;
    fn FT_Close(handle: FtHandle) -> FtStatus;
}

// libMPSSE channel and GPIO calls.
#[link(name = "MPSSE")]
extern "C" {
    fn SPI_InitChannel(handle: FtHandle, config: *mut SpiChannelConfig) -> FtStatus;
    fn I2C_InitChannel(handle: FtHandle, config: *mut I2cChannelConfig) -> FtStatus;
    fn SPI_Write(
        handle: FtHandle,
        buffer: *mut u8,
        size_to_transfer: u32,
        size_transferred: *mut u32,
        options: u32,
    ) -> FtStatus;
    fn FT_WriteGPIO(handle: FtHandle, dir: u8, value: u8) -> FtStatus;
    fn FT_ReadGPIO(handle: FtHandle, value: *mut u8) -> FtStatus;
}

fn to_ptr(handle: NativeHandle) -> FtHandle {
    handle.0 as FtHandle
}

fn c_chars_to_bytes<const N: usize>(field: &[c_char; N]) -> [u8; N] {
    let mut out = [0u8; N];
    for (dst, &src) in out.iter_mut().zip(field.iter()) {
        *dst = src as u8;
    }
    out
}

/// The libMPSSE / D2XX transport.
#[derive(Debug, Default)]
pub struct LibMpsse;

impl LibMpsse {
    pub fn new() -> Self {
        LibMpsse
    }
}

impl Transport for LibMpsse {
    fn count_devices(&mut self) -> TransportResult<u32> {
        let mut count = 0u32;
        // SAFETY: `count` is a valid out-pointer for the duration of the call.
        Status::check(unsafe { FT_CreateDeviceInfoList(&mut count) })?;
        trace!("FT_CreateDeviceInfoList: {}", count);
        Ok(count)
    }

    fn device_details(&mut self, count: u32) -> TransportResult<Vec<RawDeviceInfo>> {
        let mut nodes = vec![FtDeviceListInfoNode::default(); count as usize];
        let mut filled = count;
        // SAFETY: `nodes` holds `count` initialized nodes, as the call requires.
        Status::check(unsafe { FT_GetDeviceInfoList(nodes.as_mut_ptr(), &mut filled) })?;
        nodes.truncate(filled.min(count) as usize);
        Ok(nodes
            .iter()
            .map(|node| RawDeviceInfo {
                flags: node.flags,
                chip_type: node.type_,
                id: node.id,
                loc_id: node.loc_id,
                serial_number: c_chars_to_bytes(&node.serial_number),
                description: c_chars_to_bytes(&node.description),
                handle: (!node.ft_handle.is_null()).then(|| NativeHandle(node.ft_handle as usize)),
            })
            .collect())
    }

    fn open(&mut self, device: &DeviceDescriptor) -> TransportResult<NativeHandle> {
        let mut handle: FtHandle = std::ptr::null_mut();
        let raw = if device.loc_id() != 0 {
            // SAFETY: open-by-location passes the location id in the pointer argument.
            unsafe {
                FT_OpenEx(
                    device.loc_id() as usize as *mut c_void,
                    open_by::LOCATION,
                    &mut handle,
                )
            }
        } else {
            let serial = CString::new(device.serial()).map_err(|_| Status::InvalidArgs)?;
            // SAFETY: `serial` outlives the call and is NUL-terminated.
            unsafe {
                FT_OpenEx(
                    serial.as_ptr() as *mut c_void,
                    open_by::SERIAL_NUMBER,
                    &mut handle,
                )
            }
        };
        Status::check(raw)?;
        trace!("FT_OpenEx: {:p}", handle);
        Ok(NativeHandle(handle as usize))
    }

    fn close(&mut self, handle: NativeHandle) -> TransportResult<()> {
        // SAFETY: the handle came from `FT_OpenEx` and is closed once.
        Status::check(unsafe { FT_Close(to_ptr(handle)) })
    }

    fn init_spi(&mut self, handle: NativeHandle, config: &SpiConfig) -> TransportResult<()> {
        let mut native = SpiChannelConfig {
            clock_rate: config.clock_rate_hz(),
            latency_timer: config.latency_ms(),
            config_options: config.options().bits(),
            pin: config.pins(),
            reserved: 0,
        };
        // SAFETY: `native` is a valid, initialized config for the duration of the call.
        Status::check(unsafe { SPI_InitChannel(to_ptr(handle), &mut native) })
    }

    fn init_i2c(&mut self, handle: NativeHandle, config: &I2cConfig) -> TransportResult<()> {
        let mut native = I2cChannelConfig {
            clock_rate: config.clock_rate.hz(),
            latency_timer: config.latency_ms(),
            options: config.options.bits(),
        };
        // SAFETY: `native` is a valid, initialized config for the duration of the call.
        Status::check(unsafe { I2C_InitChannel(to_ptr(handle), &mut native) })
    }

    fn spi_write(
        &mut self,
        handle: NativeHandle,
        data: &[u8],
        options: SpiTransferOptions,
    ) -> TransportResult<usize> {
        let len = u32::try_from(data.len()).map_err(|_| Status::InvalidArgs)?;
        let mut transferred = 0u32;
        // SAFETY: libMPSSE only reads `len` bytes from the buffer despite the
        // non-const pointer in its signature.
        Status::check(unsafe {
            SPI_Write(
                to_ptr(handle),
                data.as_ptr() as *mut u8,
                len,
                &mut transferred,
                options.bits(),
            )
        })?;
        Ok(transferred as usize)
    }

    fn gpio_write(
        &mut self,
        handle: NativeHandle,
        direction: u8,
        value: u8,
    ) -> TransportResult<()> {
        // SAFETY: plain values and a live handle.
        Status::check(unsafe { FT_WriteGPIO(to_ptr(handle), direction, value) })
    }

    fn gpio_read(&mut self, handle: NativeHandle) -> TransportResult<u8> {
        let mut value = 0u8;
        // SAFETY: `value` is a valid out-pointer for the duration of the call.
        Status::check(unsafe { FT_ReadGPIO(to_ptr(handle), &mut value) })?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_symbols_resolve() {
        // Referencing every import makes the test binary link both libraries.
        let d2xx: [usize; 4] = [
            FT_CreateDeviceInfoList as usize,
            FT_GetDeviceInfoList as usize,
            FT_OpenEx as usize,
            FT_Close as usize,
        ];
        let mpsse: [usize; 5] = [
            SPI_InitChannel as usize,
            I2C_InitChannel as usize,
            SPI_Write as usize,
            FT_WriteGPIO as usize,
            FT_ReadGPIO as usize,
        ];
        assert!(d2xx.iter().chain(mpsse.iter()).all(|&addr| addr != 0));
    }

    #[test]
    fn test_native_struct_layout() {
        assert_eq!(std::mem::size_of::<SpiChannelConfig>(), 20);
        assert_eq!(std::mem::size_of::<I2cChannelConfig>(), 12);
        assert_eq!(
            std::mem::offset_of!(FtDeviceListInfoNode, serial_number),
            16
        );
        assert_eq!(
            std::mem::offset_of!(FtDeviceListInfoNode, description),
            16 + consts::SERIAL_NUMBER_LEN
        );
    }
}
