//! # mpsse-session
//!
//! Session management for FTDI adapters with an MPSSE engine (FT232H,
//! FT2232H, FT4232H, FT2232C): find an attached adapter, open it, configure
//! its channel for SPI or I²C, drive the GPIO bank, and close it again.
//!
//! Byte-level MPSSE command framing is left to the native vendor library.
//! This crate sits on top of it behind the [`Transport`] trait and adds the
//! typed configuration, validation, device selection and protocol bookkeeping.
//!
//! ## Features
//!
//! *   Device enumeration with per-record error tolerance ([`device::enumerate`]).
//! *   Device selection by index, VID/PID in any common notation, serial or
//!     description ([`OpenFilter`], parseable from `key=value,...` strings).
//! *   SPI channel configuration:
//!     *   Clock rate and latency timer with range checks.
//!     *   Chip-select line (D3-D7) and polarity, SPI modes 0-3.
//!     *   Initial/final pin states packed into the native 32-bit word ([`PinTable`]).
//!     *   Writes framed by the dedicated chip-select or a GPIO pin.
//! *   I²C channel configuration (100 kHz to 3.4 MHz, 3-phase clocking, drive-only-zero).
//! *   GPIO bank control with a cache of the last confirmed state.
//! *   One active protocol per session ([`ProtocolMode`]), enforced with
//!     `Error::ModeConflict`.
//!
//! ## Cargo features
//!
//! *   `libmpsse`: builds [`ffi::LibMpsse`], a [`Transport`] over FTDI's
//!     `libMPSSE`/`ftd2xx` shared libraries, which must be installed.
//!
//! ## Basic Usage
//!
//! ```no_run
//! use mpsse_session::{
//!     pins::Line,
//!     GpioLevel, GpioPin, Mpsse, OpenFilter, Result, Transport,
//! };
//!
//! fn run<T: Transport>(transport: T) -> Result<()> {
//!     let filter: OpenFilter = "vid=0403,desc=FT232H".parse()?;
//!     let mut mpsse = Mpsse::open_with_filter(transport, &filter)?;
//!     println!("Opened {}", mpsse.device());
//!
//!     let mut spi = mpsse.spi();
//!     spi.config_mut().set_clock_and_latency(10_000_000, 2)?;
//!     spi.config_mut().set_mode(Line::D3, true, 0)?;
//!     spi.init()?;
//!     spi.write(&[0x9F, 0x00, 0x00], true, true)?;
//!
//!     // The GPIO bank stays usable while SPI is active.
//!     mpsse.gpio().set_pin(GpioPin::new(2)?, GpioLevel::High)?;
//!
//!     mpsse.close()
//! }
//! ```

mod consts;
mod error;
pub mod device;
pub mod filter;
pub mod gpio;
pub mod i2c;
pub mod pins;
pub mod session;
pub mod spi;
pub mod transport;

#[cfg(feature = "libmpsse")]
pub mod ffi;

pub use device::{ChipType, DeviceDescriptor};
pub use error::{Error, Result, Status};
pub use filter::OpenFilter;
pub use gpio::{GpioConfig, GpioDirection, GpioLevel, GpioPin};
pub use i2c::{I2cClockRate, I2cConfig};
pub use pins::{Line, PinLine, PinTable};
pub use session::{Mpsse, ProtocolMode};
pub use spi::{SpiConfig, SpiConfigBuilder, SpiMode};
pub use transport::{NativeHandle, RawDeviceInfo, Transport, TransportResult};

/// Option words passed to the native library.
pub mod flags {
    /// The SPI `configOptions` and `transferOptions` words.
    pub mod spi {
        pub use crate::spi::{SpiConfigOptions, SpiTransferOptions};
    }
    /// The I²C `Options` word.
    pub mod i2c {
        pub use crate::i2c::I2cConfigOptions;
    }
}
