//! Session lifecycle: open one adapter, track the active protocol, close.

use crate::device::{self, DeviceDescriptor};
use crate::error::{Error, Result};
use crate::filter::{self, OpenFilter};
use crate::gpio::{Gpio, GpioConfig};
use crate::i2c::{I2c, I2cConfig};
use crate::spi::{Spi, SpiConfig};
use crate::transport::{NativeHandle, Transport};
use log::{debug, warn};

/// Protocol currently driving the MPSSE engine.
///
/// The chip has a single engine, so at most one of SPI, I2C or GPIO-only
/// mode can be active on a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProtocolMode {
    #[default]
    None,
    Spi,
    I2c,
    Gpio,
}

/// An open MPSSE adapter.
///
/// Owns the transport, exactly one opened [`DeviceDescriptor`] and the
/// channel configurations. The [`Spi`], [`I2c`] and [`Gpio`] views borrow
/// the session and cannot outlive it.
///
/// Dropping the session closes the device. Call [`Mpsse::close`] to observe
/// a close failure.
///
/// **Note:** Issue at most one call at a time; wrap the session in a mutex
/// or give it to one thread if several threads need it.
#[derive(Debug)]
pub struct Mpsse<T: Transport> {
    pub(crate) transport: T,
    pub(crate) device: DeviceDescriptor,
    pub(crate) mode: ProtocolMode,
    pub(crate) spi: SpiConfig,
    pub(crate) i2c: I2cConfig,
    pub(crate) gpio: GpioConfig,
}

impl<T: Transport> Mpsse<T> {
    // --- Constructors and Info ---
    /// Opens the first enumerated adapter.
    pub fn open(transport: T) -> Result<Self> {
        Self::open_internal(transport, None)
    }

    /// Opens the first enumerated adapter matching `filter`.
    pub fn open_with_filter(transport: T, filter: &OpenFilter) -> Result<Self> {
        Self::open_internal(transport, Some(filter))
    }

    // Enumerate, select, open, then drive the default GPIO state. If the
    // GPIO step fails the half-built session is dropped, which closes the
    // handle again.
    fn open_internal(mut transport: T, filter: Option<&OpenFilter>) -> Result<Self> {
        let mut devices = device::enumerate(&mut transport)?;
        let position = filter::select(&devices, filter)?;
        let mut selected = devices.swap_remove(position);
        if !selected.chip_type().is_mpsse_capable() {
            warn!(
                "Selected device {} reports chip type {:?}, which has no MPSSE engine",
                selected,
                selected.chip_type()
            );
        }
        device::open(&mut transport, &mut selected)?;

        let mut session = Self {
            transport,
            device: selected,
            mode: ProtocolMode::None,
            spi: SpiConfig::default(),
            i2c: I2cConfig::default(),
            gpio: GpioConfig::default(),
        };
        session.gpio_apply_default()?;
        debug!("Session open on {}", session.device);
        Ok(session)
    }

    /// The opened device.
    pub fn device(&self) -> &DeviceDescriptor {
        &self.device
    }

    pub fn mode(&self) -> ProtocolMode {
        self.mode
    }

    pub fn is_open(&self) -> bool {
        self.device.handle().is_some()
    }

    /// The transport the session drives.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn spi(&mut self) -> Spi<'_, T> {
        Spi::new(self)
    }

    pub fn i2c(&mut self) -> I2c<'_, T> {
        I2c::new(self)
    }

    pub fn gpio(&mut self) -> Gpio<'_, T> {
        Gpio::new(self)
    }

    /// Returns to `ProtocolMode::None` so another protocol can be activated.
    ///
    /// Purely logical: the hardware channel keeps its last configuration
    /// until the next activation reprograms it.
    pub fn deactivate(&mut self) {
        if self.mode != ProtocolMode::None {
            debug!("Deactivating {:?} mode", self.mode);
        }
        self.mode = ProtocolMode::None;
    }

    /// Closes the device and resets the mode. Idempotent.
    ///
    /// If the native close fails the error is returned and the session is
    /// still unusable afterwards.
    pub fn close(&mut self) -> Result<()> {
        self.mode = ProtocolMode::None;
        device::close(&mut self.transport, &mut self.device)
    }

    // --- Internal helpers ---
    pub(crate) fn handle(&self) -> Result<NativeHandle> {
        self.device.handle().ok_or(Error::SessionClosed)
    }

    /// Activation may proceed if nothing, or the same mode, is active.
    pub(crate) fn check_mode_available(&self, requested: ProtocolMode) -> Result<()> {
        self.handle()?;
        match self.mode {
            ProtocolMode::None => Ok(()),
            active if active == requested => Ok(()),
            active => Err(Error::ModeConflict { active, requested }),
        }
    }

    /// Transfers need their protocol to be the active one.
    pub(crate) fn require_mode(&self, requested: ProtocolMode) -> Result<()> {
        self.handle()?;
        if self.mode == requested {
            Ok(())
        } else {
            Err(Error::ModeConflict {
                active: self.mode,
                requested,
            })
        }
    }

    pub(crate) fn set_mode(&mut self, mode: ProtocolMode) {
        debug!("Protocol mode {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
    }
}

impl<T: Transport> Drop for Mpsse<T> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Failed to close device #{}: {}", self.device.index(), e);
        }
    }
}
