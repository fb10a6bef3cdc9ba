//! Internal constants: native status codes, option bits and channel defaults.

// --- Native status codes (FT_STATUS) ---
pub mod status {
    pub const OK: u32 = 0;
    pub const INVALID_HANDLE: u32 = 1;
    pub const DEVICE_NOT_FOUND: u32 = 2;
    pub const DEVICE_NOT_OPENED: u32 = 3;
    pub const IO_ERROR: u32 = 4;
    pub const INSUFFICIENT_RESOURCES: u32 = 5;
    pub const INVALID_PARAMETER: u32 = 6;
    pub const INVALID_BAUD_RATE: u32 = 7;
    pub const DEVICE_NOT_OPENED_FOR_ERASE: u32 = 8;
    pub const DEVICE_NOT_OPENED_FOR_WRITE: u32 = 9;
    pub const FAILED_TO_WRITE_DEVICE: u32 = 10;
    pub const EEPROM_READ_FAILED: u32 = 11;
    pub const EEPROM_WRITE_FAILED: u32 = 12;
    pub const EEPROM_ERASE_FAILED: u32 = 13;
    pub const EEPROM_NOT_PRESENT: u32 = 14;
    pub const EEPROM_NOT_PROGRAMMED: u32 = 15;
    pub const INVALID_ARGS: u32 = 16;
    pub const NOT_SUPPORTED: u32 = 17;
    pub const OTHER_ERROR: u32 = 18;
    pub const DEVICE_LIST_NOT_READY: u32 = 19;
}

// --- Device list node flags ---
pub mod list_flags {
    /// Device is open (possibly by another process).
    pub const OPENED: u32 = 0x01;
    /// Device enumerated on a high-speed USB port.
    pub const HI_SPEED: u32 = 0x02;
}

// --- FT_OpenEx selectors ---
#[allow(dead_code)] // Only consumed by the native binding
pub mod open_by {
    pub const SERIAL_NUMBER: u32 = 1;
    pub const DESCRIPTION: u32 = 2;
    pub const LOCATION: u32 = 4;
}

/// Sizes of the NUL-terminated strings in a native device list node.
pub const SERIAL_NUMBER_LEN: usize = 16;
pub const DESCRIPTION_LEN: usize = 64;

// --- SPI channel ---
pub mod spi {
    pub const DEFAULT_CLOCK_RATE_HZ: u32 = 12_000_000;
    pub const MAX_CLOCK_RATE_HZ: u32 = 30_000_000;
    pub const DEFAULT_LATENCY_MS: u8 = 16;

    // configOptions bits 1-0: CPOL/CPHA
    pub const MODE_MASK: u32 = 0x0000_0003;

    // configOptions bits 4-2: chip-select line
    pub const CS_MASK: u32 = 0x0000_001C; // 111 00
    pub const CS_DBUS3: u32 = 0x0000_0000; // 000 00
    pub const CS_DBUS4: u32 = 0x0000_0004; // 001 00
    pub const CS_DBUS5: u32 = 0x0000_0008; // 010 00
    pub const CS_DBUS6: u32 = 0x0000_000C; // 011 00
    pub const CS_DBUS7: u32 = 0x0000_0010; // 100 00

    // configOptions bit 5: chip-select is active high if this bit is 0
    pub const CS_ACTIVE_LOW: u32 = 0x0000_0020;

    // transferOptions
    pub mod transfer {
        /// Bit 0 clear: transfer size is in bytes.
        pub const SIZE_IN_BYTES: u32 = 0x0000_0000;
        /// Bit 0 set: transfer size is in bits.
        pub const SIZE_IN_BITS: u32 = 0x0000_0001;
        /// Assert chip-select at the start of the transfer.
        pub const CHIPSELECT_ENABLE: u32 = 0x0000_0002;
        /// Deassert chip-select at the end of the transfer.
        pub const CHIPSELECT_DISABLE: u32 = 0x0000_0004;
    }
}

// --- I2C channel ---
pub mod i2c {
    pub const DEFAULT_LATENCY_MS: u8 = 16;

    pub const CLOCK_STANDARD_MODE: u32 = 100_000;
    pub const CLOCK_FAST_MODE: u32 = 400_000;
    pub const CLOCK_FAST_MODE_PLUS: u32 = 1_000_000;
    pub const CLOCK_HIGH_SPEED_MODE: u32 = 3_400_000;

    /// 3-phase clocking is on unless this bit is set.
    pub const DISABLE_3PHASE_CLOCKING: u32 = 0x0001;
    /// Drive SDA only when low (tristate when high). FT232H only.
    pub const ENABLE_DRIVE_ONLY_ZERO: u32 = 0x0002;
}

// --- GPIO bank ---
pub mod gpio {
    /// All lines output.
    pub const DEFAULT_DIRECTION: u8 = 0xFF;
    /// All lines low.
    pub const DEFAULT_VALUE: u8 = 0x00;
}
