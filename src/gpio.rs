//! GPIO bank control.
//!
//! The GPIO bank is eight lines (C0-C7 on an FT232H) driven with one
//! direction byte and one value byte per write. It is separate from the
//! MPSSE serial lines, so it stays usable while SPI or I2C is active.

use crate::consts;
use crate::error::{self, Result};
use crate::session::{Mpsse, ProtocolMode};
use crate::transport::Transport;
use log::{debug, trace};

/// Direction of a GPIO or MPSSE line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioDirection {
    /// Line is sampled (direction bit 0).
    Input,
    /// Line is driven (direction bit 1).
    Output,
}

/// Logic level of a GPIO or MPSSE line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioLevel {
    /// Logic low (bit 0).
    Low,
    /// Logic high (bit 1).
    High,
}

impl GpioDirection {
    #[inline]
    pub(crate) fn bit(self) -> u8 {
        match self {
            GpioDirection::Input => 0,
            GpioDirection::Output => 1,
        }
    }
    #[inline]
    pub(crate) fn from_bit(bit: bool) -> Self {
        if bit {
            GpioDirection::Output
        } else {
            GpioDirection::Input
        }
    }
}

impl GpioLevel {
    #[inline]
    pub(crate) fn bit(self) -> u8 {
        match self {
            GpioLevel::Low => 0,
            GpioLevel::High => 1,
        }
    }
    #[inline]
    pub(crate) fn from_bit(bit: bool) -> Self {
        if bit {
            GpioLevel::High
        } else {
            GpioLevel::Low
        }
    }
}

impl std::ops::Not for GpioLevel {
    type Output = GpioLevel;
    fn not(self) -> GpioLevel {
        match self {
            GpioLevel::Low => GpioLevel::High,
            GpioLevel::High => GpioLevel::Low,
        }
    }
}

/// Represents a valid GPIO pin number (0-7).
/// Use `GpioPin::new(num)` to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GpioPin(u8);

impl GpioPin {
    /// Creates a new GpioPin, returning an error if the number is out of range (0-7).
    pub fn new(pin_num: u8) -> Result<Self> {
        if pin_num <= 7 {
            Ok(GpioPin(pin_num))
        } else {
            Err(error::invalid_parameter(
                "pin",
                format!("GPIO pin {pin_num} out of range (0-7)"),
            ))
        }
    }

    /// Returns the underlying pin number (0-7).
    #[inline]
    pub fn number(&self) -> u8 {
        self.0
    }

    /// Returns the bit mask (1 << number) for bank operations.
    #[inline]
    pub fn mask(&self) -> u8 {
        1u8 << self.0
    }
}

/// Cached direction/value state of the GPIO bank.
///
/// `value` bits of input pins are meaningless on the wire and always held
/// at 0 before being sent (`value & direction`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioConfig {
    /// Bit set: pin is an output.
    pub direction: u8,
    /// Bit set: pin is high.
    pub value: u8,
}

impl Default for GpioConfig {
    fn default() -> Self {
        Self {
            direction: consts::gpio::DEFAULT_DIRECTION,
            value: consts::gpio::DEFAULT_VALUE,
        }
    }
}

impl GpioConfig {
    /// Builds a config with input-pin value bits cleared.
    pub fn masked(direction: u8, value: u8) -> Self {
        Self {
            direction,
            value: value & direction,
        }
    }

    pub fn direction_of(&self, pin: GpioPin) -> GpioDirection {
        GpioDirection::from_bit(self.direction & pin.mask() != 0)
    }

    pub fn level_of(&self, pin: GpioPin) -> GpioLevel {
        GpioLevel::from_bit(self.value & pin.mask() != 0)
    }
}

/// GPIO view of an open session. Obtained from [`Mpsse::gpio`].
pub struct Gpio<'a, T: Transport> {
    session: &'a mut Mpsse<T>,
}

impl<'a, T: Transport> Gpio<'a, T> {
    pub(crate) fn new(session: &'a mut Mpsse<T>) -> Self {
        Self { session }
    }

    /// Last state confirmed by the hardware.
    pub fn config(&self) -> GpioConfig {
        self.session.gpio
    }

    /// Claims the session for GPIO-only use and drives the cached state.
    pub fn init(&mut self) -> Result<()> {
        self.session.activate_gpio()
    }

    /// Drives the whole bank. Value bits of input pins are forced to 0.
    pub fn write(&mut self, direction: u8, value: u8) -> Result<()> {
        self.session.gpio_write(direction, value)
    }

    /// Samples the whole bank. The full sample is returned; only output pin
    /// levels are kept in [`Gpio::config`].
    pub fn read(&mut self) -> Result<u8> {
        self.session.gpio_read()
    }

    /// Makes `pin` an output at `level`, leaving every other pin untouched.
    pub fn set_pin(&mut self, pin: GpioPin, level: GpioLevel) -> Result<()> {
        self.session.gpio_set_pin(pin, level)
    }

    /// Reads the level of a single pin.
    pub fn get_pin(&mut self, pin: GpioPin) -> Result<GpioLevel> {
        let sample = self.read()?;
        Ok(GpioLevel::from_bit(sample & pin.mask() != 0))
    }
}

impl<T: Transport> Mpsse<T> {
    // --- GPIO Methods ---
    pub(crate) fn gpio_write(&mut self, direction: u8, value: u8) -> Result<()> {
        let handle = self.handle()?;
        let config = GpioConfig::masked(direction, value);
        trace!(
            "gpio_write: direction=0x{:02X}, value=0x{:02X} (requested 0x{:02X})",
            config.direction,
            config.value,
            value
        );
        self.transport
            .gpio_write(handle, config.direction, config.value)
            .map_err(error::transport("gpio_write"))?;
        self.gpio = config;
        Ok(())
    }

    pub(crate) fn gpio_read(&mut self) -> Result<u8> {
        let handle = self.handle()?;
        let sample = self
            .transport
            .gpio_read(handle)
            .map_err(error::transport("gpio_read"))?;
        trace!("gpio_read: 0x{:02X}", sample);
        self.gpio = GpioConfig::masked(self.gpio.direction, sample);
        Ok(sample)
    }

    pub(crate) fn gpio_set_pin(&mut self, pin: GpioPin, level: GpioLevel) -> Result<()> {
        let mask = pin.mask();
        let direction = self.gpio.direction | mask;
        let value = match level {
            GpioLevel::High => self.gpio.value | mask,
            GpioLevel::Low => self.gpio.value & !mask,
        };
        trace!("Setting GPIO pin {} {:?}", pin.number(), level);
        self.gpio_write(direction, value)
    }

    /// Writes the default bank state (all outputs, all low).
    pub(crate) fn gpio_apply_default(&mut self) -> Result<()> {
        let default = GpioConfig::default();
        debug!(
            "Applying default GPIO state: direction=0x{:02X}, value=0x{:02X}",
            default.direction, default.value
        );
        self.gpio_write(default.direction, default.value)
    }

    /// Switches the session into GPIO-only mode.
    pub fn activate_gpio(&mut self) -> Result<()> {
        self.check_mode_available(ProtocolMode::Gpio)?;
        let GpioConfig { direction, value } = self.gpio;
        self.gpio_write(direction, value)?;
        self.set_mode(ProtocolMode::Gpio);
        Ok(())
    }
}
