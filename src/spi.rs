//! SPI channel configuration and transfers.

use crate::consts::spi as consts;
use crate::error::{self, Result};
use crate::gpio::{GpioLevel, GpioPin};
use crate::pins::{Line, PinTable};
use crate::session::{Mpsse, ProtocolMode};
use crate::transport::Transport;
use bitflags::bitflags;
use log::{debug, trace, warn};

bitflags! {
    /// The `configOptions` word of an SPI channel.
    ///
    /// * Bits 1-0: CPOL/CPHA (SPI mode)
    /// * Bits 4-2: chip-select line (000 = D3 ... 100 = D7)
    /// * Bit 5: chip-select is active low (active high when clear)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SpiConfigOptions: u32 {
        const CPHA = 0x01;
        const CPOL = 0x02;
        const CS_BIT0 = 0x04;
        const CS_BIT1 = 0x08;
        const CS_BIT2 = 0x10;
        const CS_ACTIVE_LOW = consts::CS_ACTIVE_LOW;

        const MODE_MASK = consts::MODE_MASK;
        const CS_MASK = consts::CS_MASK;
    }
}

bitflags! {
    /// Per-transfer options passed to the transport's SPI write.
    ///
    /// An empty set means: size in bytes, no chip-select framing.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SpiTransferOptions: u32 {
        /// Transfer size is given in bits rather than bytes.
        const SIZE_IN_BITS = consts::transfer::SIZE_IN_BITS;
        /// Assert chip-select before the first bit.
        const CHIPSELECT_ENABLE = consts::transfer::CHIPSELECT_ENABLE;
        /// Deassert chip-select after the last bit.
        const CHIPSELECT_DISABLE = consts::transfer::CHIPSELECT_DISABLE;
    }
}

impl SpiTransferOptions {
    /// Byte-sized transfer with optional chip-select framing.
    pub fn framed(assert_start: bool, deassert_end: bool) -> Self {
        let mut options = Self::from_bits_retain(consts::transfer::SIZE_IN_BYTES);
        options.set(Self::CHIPSELECT_ENABLE, assert_start);
        options.set(Self::CHIPSELECT_DISABLE, deassert_end);
        options
    }
}

/// SPI clock polarity/phase combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpiMode {
    /// CPOL=0, CPHA=0: data captured on rising edge, propagated on falling.
    Mode0,
    /// CPOL=0, CPHA=1: data captured on falling edge, propagated on rising.
    Mode1,
    /// CPOL=1, CPHA=0: data captured on falling edge, propagated on rising.
    Mode2,
    /// CPOL=1, CPHA=1: data captured on rising edge, propagated on falling.
    Mode3,
}

impl SpiMode {
    /// Converts a numeric mode (0-3).
    pub fn from_u8(mode: u8) -> Result<Self> {
        match mode {
            0 => Ok(SpiMode::Mode0),
            1 => Ok(SpiMode::Mode1),
            2 => Ok(SpiMode::Mode2),
            3 => Ok(SpiMode::Mode3),
            _ => Err(error::invalid_parameter(
                "mode",
                format!("SPI mode {mode} out of range (0-3)"),
            )),
        }
    }

    pub fn number(self) -> u8 {
        self as u8
    }

    /// Whether the MPSSE engine is known to clock this mode correctly.
    ///
    /// The hardware only guarantees modes 0 and 2. Modes 1 and 3 are still
    /// accepted and passed through unchanged.
    pub fn is_hardware_reliable(self) -> bool {
        matches!(self, SpiMode::Mode0 | SpiMode::Mode2)
    }

    fn bits(self) -> SpiConfigOptions {
        SpiConfigOptions::from_bits_retain(u32::from(self.number()))
    }
}

/// Chip-select line to option-bit mapping. D0-D2 carry clock and data and
/// cannot select a peripheral.
const CHIP_SELECT_BITS: [(Line, u32); 5] = [
    (Line::D3, consts::CS_DBUS3),
    (Line::D4, consts::CS_DBUS4),
    (Line::D5, consts::CS_DBUS5),
    (Line::D6, consts::CS_DBUS6),
    (Line::D7, consts::CS_DBUS7),
];

fn chip_select_bits(line: Line) -> Result<SpiConfigOptions> {
    CHIP_SELECT_BITS
        .iter()
        .find(|(l, _)| *l == line)
        .map(|&(_, bits)| SpiConfigOptions::from_bits_retain(bits))
        .ok_or_else(|| {
            error::invalid_parameter(
                "cs_line",
                format!("{line} cannot be used as chip-select (valid: D3-D7)"),
            )
        })
}

fn check_clock_rate(clock_rate_hz: u32) -> Result<()> {
    if clock_rate_hz > consts::MAX_CLOCK_RATE_HZ {
        return Err(error::invalid_parameter(
            "clock_rate_hz",
            format!(
                "SPI clock {} Hz out of range (0-{})",
                clock_rate_hz,
                consts::MAX_CLOCK_RATE_HZ
            ),
        ));
    }
    Ok(())
}

/// Configuration of an SPI channel as consumed by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpiConfig {
    clock_rate_hz: u32,
    latency_ms: u8,
    options: SpiConfigOptions,
    pins: u32,
}

impl Default for SpiConfig {
    /// 12 MHz, 16 ms latency, active-low chip-select on D3, mode 0, default
    /// pin table.
    fn default() -> Self {
        Self {
            clock_rate_hz: consts::DEFAULT_CLOCK_RATE_HZ,
            latency_ms: consts::DEFAULT_LATENCY_MS,
            options: SpiConfigOptions::CS_ACTIVE_LOW
                | SpiConfigOptions::from_bits_retain(consts::CS_DBUS3)
                | SpiMode::Mode0.bits(),
            pins: PinTable::default().encode(),
        }
    }
}

impl SpiConfig {
    /// Starts a builder that validates every field before producing a config.
    pub fn builder() -> SpiConfigBuilder {
        SpiConfigBuilder::default()
    }

    pub fn clock_rate_hz(&self) -> u32 {
        self.clock_rate_hz
    }

    pub fn latency_ms(&self) -> u8 {
        self.latency_ms
    }

    pub fn options(&self) -> SpiConfigOptions {
        self.options
    }

    /// Packed pin descriptor.
    pub fn pins(&self) -> u32 {
        self.pins
    }

    pub fn pin_table(&self) -> PinTable {
        PinTable::decode(self.pins)
    }

    pub fn mode(&self) -> SpiMode {
        match (self.options & SpiConfigOptions::MODE_MASK).bits() {
            0 => SpiMode::Mode0,
            1 => SpiMode::Mode1,
            2 => SpiMode::Mode2,
            _ => SpiMode::Mode3,
        }
    }

    /// The configured chip-select line.
    pub fn chip_select(&self) -> Line {
        let bits = (self.options & SpiConfigOptions::CS_MASK).bits();
        CHIP_SELECT_BITS
            .iter()
            .find(|&&(_, b)| b == bits)
            .map_or(Line::D3, |&(line, _)| line)
    }

    pub fn is_active_low(&self) -> bool {
        self.options.contains(SpiConfigOptions::CS_ACTIVE_LOW)
    }

    /// Sets clock rate and latency timer.
    ///
    /// A clock of 0 selects the 12 MHz default; anything above 30 MHz is
    /// rejected and leaves the config untouched. A latency of 0 selects the
    /// 16 ms default. Other latencies are stored as given; the hardware
    /// accepts 1-255 ms.
    pub fn set_clock_and_latency(&mut self, clock_rate_hz: u32, latency_ms: u8) -> Result<()> {
        check_clock_rate(clock_rate_hz)?;
        self.clock_rate_hz = if clock_rate_hz == 0 {
            consts::DEFAULT_CLOCK_RATE_HZ
        } else {
            clock_rate_hz
        };
        self.latency_ms = if latency_ms == 0 {
            consts::DEFAULT_LATENCY_MS
        } else {
            latency_ms
        };
        debug!(
            "SPI clock={} Hz, latency={} ms",
            self.clock_rate_hz, self.latency_ms
        );
        Ok(())
    }

    /// Selects the chip-select line, keeping mode and polarity bits.
    pub fn set_chip_select(&mut self, line: Line) -> Result<()> {
        let bits = chip_select_bits(line)?;
        self.options = (self.options - SpiConfigOptions::CS_MASK) | bits;
        debug!("SPI chip-select on {}", line);
        Ok(())
    }

    /// Replaces polarity and mode, then selects `cs_line`.
    ///
    /// An invalid `mode` fails before anything changes. An invalid `cs_line`
    /// fails after polarity and mode were rebuilt, with the chip-select bits
    /// cleared (D3).
    pub fn set_mode(&mut self, cs_line: Line, active_low: bool, mode: u8) -> Result<()> {
        let mode = SpiMode::from_u8(mode)?;
        if !mode.is_hardware_reliable() {
            warn!(
                "SPI mode {} is not reliably supported by the MPSSE hardware \
                 (only modes 0 and 2 are)",
                mode.number()
            );
        }
        let mut options = mode.bits();
        options.set(SpiConfigOptions::CS_ACTIVE_LOW, active_low);
        self.options = options;
        self.set_chip_select(cs_line)
    }

    /// Applies clock/latency, then mode and chip-select.
    ///
    /// Not atomic: the first failing step returns its error and whatever the
    /// earlier steps changed stays changed. Use [`SpiConfig::builder`] for
    /// all-or-nothing validation.
    pub fn apply_all(
        &mut self,
        clock_rate_hz: u32,
        latency_ms: u8,
        cs_line: Line,
        active_low: bool,
        mode: u8,
    ) -> Result<()> {
        self.set_clock_and_latency(clock_rate_hz, latency_ms)?;
        self.set_mode(cs_line, active_low, mode)
    }

    /// Replaces the whole open/close pin table.
    pub fn set_pin_table(&mut self, table: PinTable) {
        self.pins = table.encode();
        debug!("SPI pin descriptor=0x{:08X}", self.pins);
    }
}

/// Validating builder for [`SpiConfig`].
///
/// Nothing is committed until [`SpiConfigBuilder::build`] has checked every
/// field.
#[derive(Debug, Clone, Copy)]
pub struct SpiConfigBuilder {
    clock_rate_hz: u32,
    latency_ms: u8,
    cs_line: Line,
    active_low: bool,
    mode: u8,
    pins: PinTable,
}

impl Default for SpiConfigBuilder {
    fn default() -> Self {
        Self {
            clock_rate_hz: consts::DEFAULT_CLOCK_RATE_HZ,
            latency_ms: consts::DEFAULT_LATENCY_MS,
            cs_line: Line::D3,
            active_low: true,
            mode: 0,
            pins: PinTable::default(),
        }
    }
}

impl SpiConfigBuilder {
    /// Clock rate in Hz; 0 selects the 12 MHz default, above 30 MHz fails.
    pub fn clock_rate_hz(mut self, clock_rate_hz: u32) -> Self {
        self.clock_rate_hz = clock_rate_hz;
        self
    }

    /// Latency timer in ms; 0 selects the 16 ms default.
    pub fn latency_ms(mut self, latency_ms: u8) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Chip-select line (D3-D7) and its polarity.
    pub fn chip_select(mut self, line: Line, active_low: bool) -> Self {
        self.cs_line = line;
        self.active_low = active_low;
        self
    }

    /// SPI mode 0-3.
    pub fn mode(mut self, mode: u8) -> Self {
        self.mode = mode;
        self
    }

    /// Open/close states of lines D0-D7.
    pub fn pin_table(mut self, pins: PinTable) -> Self {
        self.pins = pins;
        self
    }

    /// Validates every field, then produces the config.
    pub fn build(self) -> Result<SpiConfig> {
        check_clock_rate(self.clock_rate_hz)?;
        SpiMode::from_u8(self.mode)?;
        chip_select_bits(self.cs_line)?;

        let mut config = SpiConfig::default();
        config.apply_all(
            self.clock_rate_hz,
            self.latency_ms,
            self.cs_line,
            self.active_low,
            self.mode,
        )?;
        config.set_pin_table(self.pins);
        Ok(config)
    }
}

/// SPI view of an open session. Obtained from [`Mpsse::spi`].
pub struct Spi<'a, T: Transport> {
    session: &'a mut Mpsse<T>,
}

impl<'a, T: Transport> Spi<'a, T> {
    pub(crate) fn new(session: &'a mut Mpsse<T>) -> Self {
        Self { session }
    }

    pub fn config(&self) -> &SpiConfig {
        &self.session.spi
    }

    /// Mutable access to the configuration. Changes take effect on the next
    /// [`Spi::init`].
    pub fn config_mut(&mut self) -> &mut SpiConfig {
        &mut self.session.spi
    }

    /// Initializes the channel in SPI mode with the current configuration.
    pub fn init(&mut self) -> Result<()> {
        self.session.activate_spi()
    }

    /// Writes `data` using the dedicated chip-select line, optionally
    /// asserting it before and deasserting it after the transfer. Returns the
    /// number of bytes transferred.
    pub fn write(&mut self, data: &[u8], assert_start: bool, deassert_end: bool) -> Result<usize> {
        self.session
            .spi_write(data, SpiTransferOptions::framed(assert_start, deassert_end))
    }

    /// Writes `data` using a GPIO pin as chip-select.
    ///
    /// The pin is driven to the asserted level (from the configured polarity)
    /// before the transfer if `assert_start`, and back to idle afterwards if
    /// `deassert_end`, even when the transfer fails. A transfer error takes
    /// precedence over an error restoring the pin.
    pub fn write_with_manual_cs(
        &mut self,
        pin: GpioPin,
        data: &[u8],
        assert_start: bool,
        deassert_end: bool,
    ) -> Result<usize> {
        self.session
            .spi_write_manual_cs(pin, data, assert_start, deassert_end)
    }
}

impl<T: Transport> Mpsse<T> {
    // --- SPI Methods ---
    /// Initializes the channel in SPI mode.
    ///
    /// Fails with `ModeConflict` if I2C or GPIO-only mode is active. The
    /// GPIO bank is reset to its default state after channel init; the mode
    /// only changes once both steps succeed.
    pub fn activate_spi(&mut self) -> Result<()> {
        self.check_mode_available(ProtocolMode::Spi)?;
        let handle = self.handle()?;
        debug!(
            "Initializing SPI: clock={} Hz, latency={} ms, options=0x{:08X}, pins=0x{:08X}",
            self.spi.clock_rate_hz,
            self.spi.latency_ms,
            self.spi.options.bits(),
            self.spi.pins
        );
        if !self.spi.mode().is_hardware_reliable() {
            warn!(
                "Initializing SPI in mode {}; only modes 0 and 2 are reliable on this hardware",
                self.spi.mode().number()
            );
        }
        self.transport
            .init_spi(handle, &self.spi)
            .map_err(error::transport("init_spi"))?;
        self.gpio_apply_default()?;
        self.set_mode(ProtocolMode::Spi);
        Ok(())
    }

    pub(crate) fn spi_write(&mut self, data: &[u8], options: SpiTransferOptions) -> Result<usize> {
        self.require_mode(ProtocolMode::Spi)?;
        let handle = self.handle()?;
        trace!(
            "spi_write: {} bytes, options=0x{:02X}: {:02X?}",
            data.len(),
            options.bits(),
            data
        );
        let written = self
            .transport
            .spi_write(handle, data, options)
            .map_err(error::transport("spi_write"))?;
        if written != data.len() {
            warn!(
                "spi_write transferred {} of {} bytes",
                written,
                data.len()
            );
        }
        Ok(written)
    }

    pub(crate) fn spi_write_manual_cs(
        &mut self,
        pin: GpioPin,
        data: &[u8],
        assert_start: bool,
        deassert_end: bool,
    ) -> Result<usize> {
        self.require_mode(ProtocolMode::Spi)?;
        let asserted = if self.spi.is_active_low() {
            GpioLevel::Low
        } else {
            GpioLevel::High
        };
        if assert_start {
            self.gpio_set_pin(pin, asserted)?;
        }
        let result = self.spi_write(data, SpiTransferOptions::framed(false, false));
        if deassert_end {
            let restored = self.gpio_set_pin(pin, !asserted);
            if let (Ok(_), Err(e)) = (&result, restored) {
                return Err(e);
            }
        }
        result
    }
}
