//! Packed pin descriptor for the eight MPSSE serial lines (D0-D7).
//!
//! The transport programs "pin state at channel open" and "pin state at
//! channel close" from one 32-bit word:
//!
//! | bits   | field                    |
//! |--------|--------------------------|
//! | 7-0    | initial direction        |
//! | 15-8   | initial value            |
//! | 23-16  | final (close) direction  |
//! | 31-24  | final (close) value      |
//!
//! Bit `i` of each field belongs to line `Di`. A table always covers all
//! eight lines; there is no partial update.

use crate::error::{self, Result};
use crate::gpio::{GpioDirection, GpioLevel};
use std::fmt;

/// One of the eight MPSSE serial lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Line {
    /// Clock (SCK).
    D0,
    /// Data out (MOSI).
    D1,
    /// Data in (MISO).
    D2,
    /// Default chip-select.
    D3,
    /// Free line; alternative chip-select.
    D4,
    /// Free line; alternative chip-select.
    D5,
    /// Free line; alternative chip-select.
    D6,
    /// Free line; alternative chip-select.
    D7,
}

impl Line {
    pub const ALL: [Line; 8] = [
        Line::D0,
        Line::D1,
        Line::D2,
        Line::D3,
        Line::D4,
        Line::D5,
        Line::D6,
        Line::D7,
    ];

    /// Line for a numeric index (0-7).
    pub fn from_index(index: u8) -> Result<Self> {
        Line::ALL
            .get(usize::from(index))
            .copied()
            .ok_or_else(|| {
                error::invalid_parameter("line", format!("line D{index} out of range (D0-D7)"))
            })
    }

    #[inline]
    pub fn index(self) -> u8 {
        self as u8
    }

    #[inline]
    pub fn mask(self) -> u8 {
        1u8 << self.index()
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D{}", self.index())
    }
}

/// Direction and level of one line at channel open and at channel close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinLine {
    /// Direction once the channel is initialized.
    pub init_direction: GpioDirection,
    /// Level once the channel is initialized (outputs only).
    pub init_value: GpioLevel,
    /// Direction when the channel is closed.
    pub close_direction: GpioDirection,
    /// Level when the channel is closed (outputs only).
    pub close_value: GpioLevel,
}

impl PinLine {
    /// Same direction and level at open and close.
    pub const fn fixed(direction: GpioDirection, value: GpioLevel) -> Self {
        Self {
            init_direction: direction,
            init_value: value,
            close_direction: direction,
            close_value: value,
        }
    }
}

/// The adapter's wiring convention for SPI.
const DEFAULT_LINES: [PinLine; 8] = [
    PinLine::fixed(GpioDirection::Output, GpioLevel::Low), // D0 clock, idle low
    PinLine::fixed(GpioDirection::Output, GpioLevel::Low), // D1 data out
    PinLine::fixed(GpioDirection::Input, GpioLevel::Low),  // D2 data in
    PinLine::fixed(GpioDirection::Output, GpioLevel::High), // D3 CS, deasserted (active low)
    PinLine::fixed(GpioDirection::Output, GpioLevel::Low), // D4
    PinLine::fixed(GpioDirection::Output, GpioLevel::Low), // D5
    PinLine::fixed(GpioDirection::Output, GpioLevel::Low), // D6
    PinLine::fixed(GpioDirection::Output, GpioLevel::Low), // D7
];

/// Full open/close configuration of lines D0-D7, indexed by line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinTable(pub [PinLine; 8]);

impl Default for PinTable {
    fn default() -> Self {
        PinTable(DEFAULT_LINES)
    }
}

impl PinTable {
    pub fn line(&self, line: Line) -> PinLine {
        self.0[usize::from(line.index())]
    }

    /// Packs the table into the transport's 32-bit pin descriptor.
    pub fn encode(&self) -> u32 {
        let mut init_dir = 0u8;
        let mut init_val = 0u8;
        let mut close_dir = 0u8;
        let mut close_val = 0u8;
        for (i, pin) in self.0.iter().enumerate() {
            init_dir |= pin.init_direction.bit() << i;
            init_val |= pin.init_value.bit() << i;
            close_dir |= pin.close_direction.bit() << i;
            close_val |= pin.close_value.bit() << i;
        }
        u32::from_le_bytes([init_dir, init_val, close_dir, close_val])
    }

    /// Unpacks a 32-bit pin descriptor.
    pub fn decode(word: u32) -> Self {
        let [init_dir, init_val, close_dir, close_val] = word.to_le_bytes();
        let mut lines = DEFAULT_LINES;
        for (i, pin) in lines.iter_mut().enumerate() {
            let bit = |field: u8| field & (1u8 << i) != 0;
            *pin = PinLine {
                init_direction: GpioDirection::from_bit(bit(init_dir)),
                init_value: GpioLevel::from_bit(bit(init_val)),
                close_direction: GpioDirection::from_bit(bit(close_dir)),
                close_value: GpioLevel::from_bit(bit(close_val)),
            };
        }
        PinTable(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_encoding() {
        // dir: D2 input, rest output -> 0xFB; value: D3 high -> 0x08
        assert_eq!(PinTable::default().encode(), 0x08FB_08FB);
    }

    #[test]
    fn test_field_layout() {
        let mut lines = [PinLine::fixed(GpioDirection::Input, GpioLevel::Low); 8];
        lines[0].init_direction = GpioDirection::Output;
        lines[1].init_value = GpioLevel::High;
        lines[2].close_direction = GpioDirection::Output;
        lines[7].close_value = GpioLevel::High;
        assert_eq!(PinTable(lines).encode(), 0x8004_0201);
    }

    #[test]
    fn test_decode_reconstructs_every_line() {
        // Walk a set of words covering every bit position in every field.
        let mut words = vec![0u32, u32::MAX, 0xA5A5_5A5A, 0x0F0F_F0F0, 0x08FB_08FB];
        words.extend((0..32).map(|b| 1u32 << b));
        words.extend((0..32).map(|b| !(1u32 << b)));
        for word in words {
            let table = PinTable::decode(word);
            assert_eq!(table.encode(), word, "word 0x{word:08X}");
            for line in Line::ALL {
                let pin = table.line(line);
                let i = line.index();
                assert_eq!(pin.init_direction.bit(), ((word >> i) & 1) as u8);
                assert_eq!(pin.init_value.bit(), ((word >> (8 + i)) & 1) as u8);
                assert_eq!(pin.close_direction.bit(), ((word >> (16 + i)) & 1) as u8);
                assert_eq!(pin.close_value.bit(), ((word >> (24 + i)) & 1) as u8);
            }
        }
    }

    #[test]
    fn test_line_from_index() {
        assert_eq!(Line::from_index(3).unwrap(), Line::D3);
        assert_eq!(Line::D7.mask(), 0x80);
        assert_eq!(Line::D5.to_string(), "D5");
        assert!(Line::from_index(8).is_err());
    }
}
