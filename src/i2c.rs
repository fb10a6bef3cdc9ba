//! I2C channel configuration.

use crate::consts::i2c as consts;
use crate::error::{self, Result};
use crate::session::{Mpsse, ProtocolMode};
use crate::transport::Transport;
use bitflags::bitflags;
use log::debug;
use std::fmt;

/// Supported I2C bus speeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum I2cClockRate {
    /// 100 kbit/s.
    #[default]
    Standard,
    /// 400 kbit/s.
    Fast,
    /// 1 Mbit/s.
    FastPlus,
    /// 3.4 Mbit/s.
    HighSpeed,
}

impl I2cClockRate {
    pub fn hz(self) -> u32 {
        match self {
            I2cClockRate::Standard => consts::CLOCK_STANDARD_MODE,
            I2cClockRate::Fast => consts::CLOCK_FAST_MODE,
            I2cClockRate::FastPlus => consts::CLOCK_FAST_MODE_PLUS,
            I2cClockRate::HighSpeed => consts::CLOCK_HIGH_SPEED_MODE,
        }
    }

    /// Maps an exact bus frequency to a supported rate.
    pub fn from_hz(hz: u32) -> Result<Self> {
        match hz {
            consts::CLOCK_STANDARD_MODE => Ok(I2cClockRate::Standard),
            consts::CLOCK_FAST_MODE => Ok(I2cClockRate::Fast),
            consts::CLOCK_FAST_MODE_PLUS => Ok(I2cClockRate::FastPlus),
            consts::CLOCK_HIGH_SPEED_MODE => Ok(I2cClockRate::HighSpeed),
            _ => Err(error::invalid_parameter(
                "clock_rate",
                format!(
                    "I2C clock {} Hz not supported (100000, 400000, 1000000 or 3400000)",
                    hz
                ),
            )),
        }
    }
}

impl fmt::Display for I2cClockRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} kHz", self.hz() / 1000)
    }
}

bitflags! {
    /// The `Options` word of an I2C channel.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct I2cConfigOptions: u32 {
        /// Turn off 3-phase data clocking (on by default).
        const DISABLE_3PHASE_CLOCKING = consts::DISABLE_3PHASE_CLOCKING;
        /// Drive SDA only when low and tristate it when high. FT232H only.
        const ENABLE_DRIVE_ONLY_ZERO = consts::ENABLE_DRIVE_ONLY_ZERO;
    }
}

/// Configuration of an I2C channel as consumed by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct I2cConfig {
    pub clock_rate: I2cClockRate,
    latency_ms: u8,
    pub options: I2cConfigOptions,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self {
            clock_rate: I2cClockRate::default(),
            latency_ms: consts::DEFAULT_LATENCY_MS,
            options: I2cConfigOptions::empty(),
        }
    }
}

impl I2cConfig {
    pub fn latency_ms(&self) -> u8 {
        self.latency_ms
    }

    /// Sets the latency timer; 0 selects the 16 ms default.
    pub fn set_latency(&mut self, latency_ms: u8) {
        self.latency_ms = if latency_ms == 0 {
            consts::DEFAULT_LATENCY_MS
        } else {
            latency_ms
        };
        debug!("I2C latency={} ms", self.latency_ms);
    }
}

/// I2C view of an open session. Obtained from [`Mpsse::i2c`].
pub struct I2c<'a, T: Transport> {
    session: &'a mut Mpsse<T>,
}

impl<'a, T: Transport> I2c<'a, T> {
    pub(crate) fn new(session: &'a mut Mpsse<T>) -> Self {
        Self { session }
    }

    pub fn config(&self) -> &I2cConfig {
        &self.session.i2c
    }

    /// Changes take effect on the next [`I2c::init`].
    pub fn config_mut(&mut self) -> &mut I2cConfig {
        &mut self.session.i2c
    }

    /// Initializes the channel in I2C mode with the current configuration.
    pub fn init(&mut self) -> Result<()> {
        self.session.activate_i2c()
    }
}

impl<T: Transport> Mpsse<T> {
    // --- I2C Methods ---
    /// Initializes the channel in I2C mode.
    ///
    /// Fails with `ModeConflict` if SPI or GPIO-only mode is active.
    pub fn activate_i2c(&mut self) -> Result<()> {
        self.check_mode_available(ProtocolMode::I2c)?;
        let handle = self.handle()?;
        debug!(
            "Initializing I2C: clock={}, latency={} ms, options=0x{:04X}",
            self.i2c.clock_rate,
            self.i2c.latency_ms,
            self.i2c.options.bits()
        );
        self.transport
            .init_i2c(handle, &self.i2c)
            .map_err(error::transport("init_i2c"))?;
        self.set_mode(ProtocolMode::I2c);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_rates() {
        for rate in [
            I2cClockRate::Standard,
            I2cClockRate::Fast,
            I2cClockRate::FastPlus,
            I2cClockRate::HighSpeed,
        ] {
            assert_eq!(I2cClockRate::from_hz(rate.hz()).unwrap(), rate);
        }
        assert!(I2cClockRate::from_hz(250_000).is_err());
        assert_eq!(I2cClockRate::Fast.to_string(), "400 kHz");
    }

    #[test]
    fn test_default_config_and_latency() {
        let mut cfg = I2cConfig::default();
        assert_eq!(cfg.clock_rate, I2cClockRate::Standard);
        assert_eq!(cfg.latency_ms(), 16);
        assert!(cfg.options.is_empty());

        cfg.set_latency(3);
        assert_eq!(cfg.latency_ms(), 3);
        cfg.set_latency(0);
        assert_eq!(cfg.latency_ms(), 16);
    }
}
