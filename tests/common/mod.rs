//! Scripted in-memory transport shared by the integration tests.
//!
//! Records every call in order and can be told to fail a given operation
//! with a given status until the failure is cleared.

#![allow(dead_code)]

use mpsse_session::flags::spi::SpiTransferOptions;
use mpsse_session::{
    DeviceDescriptor, I2cConfig, NativeHandle, RawDeviceInfo, SpiConfig, Status, Transport,
    TransportResult,
};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// FT232H chip-type tag in the native device list.
pub const CHIP_FT232H: u32 = 8;
/// Device list flag: enumerated on a high-speed port.
pub const FLAG_HI_SPEED: u32 = 0x02;

/// One recorded transport call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CountDevices,
    DeviceDetails(u32),
    Open { loc_id: u32 },
    Close(NativeHandle),
    InitSpi { clock: u32, latency: u8, options: u32, pins: u32 },
    InitI2c { clock: u32, latency: u8, options: u32 },
    SpiWrite { data: Vec<u8>, options: u32 },
    GpioWrite { direction: u8, value: u8 },
    GpioRead,
}

#[derive(Debug, Default)]
pub struct MockTransport {
    pub devices: Vec<RawDeviceInfo>,
    /// Reported device count; defaults to `devices.len()`.
    pub count_override: Option<u32>,
    pub calls: Vec<Call>,
    /// Handles currently held open.
    pub open_handles: Vec<NativeHandle>,
    /// Level the GPIO bank reads back.
    pub gpio_input: Cell<u8>,
    /// Bytes reported by `spi_write`; defaults to the full buffer.
    pub short_write: Cell<Option<usize>>,
    // Scriptable while a session holds `&mut` to the mock.
    failures: RefCell<HashMap<&'static str, Status>>,
    next_handle: usize,
}

impl MockTransport {
    pub fn new(devices: Vec<RawDeviceInfo>) -> Self {
        Self {
            devices,
            next_handle: 0x100,
            ..Default::default()
        }
    }

    /// Two FT232H adapters: "FT232H" at index 0 and "FT232H-C" at index 1.
    pub fn ft232h_pair() -> Self {
        Self::new(vec![
            ft232h(0x11, "FT9XK1AB", "FT232H"),
            ft232h(0x12, "FTQ77C2", "FT232H-C"),
        ])
    }

    /// Makes `operation` (a `Transport` method name) fail with `status`.
    pub fn fail(&self, operation: &'static str, status: Status) {
        self.failures.borrow_mut().insert(operation, status);
    }

    pub fn clear_failure(&self, operation: &'static str) {
        self.failures.borrow_mut().remove(operation);
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|call| pred(call)).count()
    }

    pub fn gpio_writes(&self) -> Vec<(u8, u8)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::GpioWrite { direction, value } => Some((*direction, *value)),
                _ => None,
            })
            .collect()
    }

    pub fn spi_writes(&self) -> Vec<(Vec<u8>, u32)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::SpiWrite { data, options } => Some((data.clone(), *options)),
                _ => None,
            })
            .collect()
    }

    pub fn last_call(&self) -> Option<&Call> {
        self.calls.last()
    }

    fn outcome(&self, operation: &'static str) -> TransportResult<()> {
        match self.failures.borrow().get(operation) {
            Some(status) => Err(*status),
            None => Ok(()),
        }
    }
}

impl Transport for MockTransport {
    fn count_devices(&mut self) -> TransportResult<u32> {
        self.calls.push(Call::CountDevices);
        self.outcome("count_devices")?;
        Ok(self
            .count_override
            .unwrap_or(self.devices.len() as u32))
    }

    fn device_details(&mut self, count: u32) -> TransportResult<Vec<RawDeviceInfo>> {
        self.calls.push(Call::DeviceDetails(count));
        self.outcome("device_details")?;
        Ok(self.devices.iter().take(count as usize).cloned().collect())
    }

    fn open(&mut self, device: &DeviceDescriptor) -> TransportResult<NativeHandle> {
        self.calls.push(Call::Open {
            loc_id: device.loc_id(),
        });
        self.outcome("open")?;
        let handle = NativeHandle(self.next_handle);
        self.next_handle += 1;
        self.open_handles.push(handle);
        Ok(handle)
    }

    fn close(&mut self, handle: NativeHandle) -> TransportResult<()> {
        self.calls.push(Call::Close(handle));
        self.outcome("close")?;
        let position = self
            .open_handles
            .iter()
            .position(|&h| h == handle)
            .ok_or(Status::InvalidHandle)?;
        self.open_handles.remove(position);
        Ok(())
    }

    fn init_spi(&mut self, _handle: NativeHandle, config: &SpiConfig) -> TransportResult<()> {
        self.calls.push(Call::InitSpi {
            clock: config.clock_rate_hz(),
            latency: config.latency_ms(),
            options: config.options().bits(),
            pins: config.pins(),
        });
        self.outcome("init_spi")
    }

    fn init_i2c(&mut self, _handle: NativeHandle, config: &I2cConfig) -> TransportResult<()> {
        self.calls.push(Call::InitI2c {
            clock: config.clock_rate.hz(),
            latency: config.latency_ms(),
            options: config.options.bits(),
        });
        self.outcome("init_i2c")
    }

    fn spi_write(
        &mut self,
        _handle: NativeHandle,
        data: &[u8],
        options: SpiTransferOptions,
    ) -> TransportResult<usize> {
        self.calls.push(Call::SpiWrite {
            data: data.to_vec(),
            options: options.bits(),
        });
        self.outcome("spi_write")?;
        Ok(self.short_write.get().unwrap_or(data.len()).min(data.len()))
    }

    fn gpio_write(
        &mut self,
        _handle: NativeHandle,
        direction: u8,
        value: u8,
    ) -> TransportResult<()> {
        self.calls.push(Call::GpioWrite { direction, value });
        self.outcome("gpio_write")
    }

    fn gpio_read(&mut self, _handle: NativeHandle) -> TransportResult<u8> {
        self.calls.push(Call::GpioRead);
        self.outcome("gpio_read")?;
        Ok(self.gpio_input.get())
    }
}

/// A high-speed FT232H record with the default FTDI VID/PID.
pub fn ft232h(loc_id: u32, serial: &str, description: &str) -> RawDeviceInfo {
    RawDeviceInfo::new(FLAG_HI_SPEED, CHIP_FT232H, 0x0403, 0x6014, loc_id, serial, description)
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
