//! HD44780 character display behind a PCF8574 I2C expander.
//!
//! The expander drives the display in 4-bit mode. Its outputs are wired as
//! follows:
//!
//! ```text
//! P0  P1  P2  P3         P4  P5  P6  P7
//! RS  RW  EN  Backlight  D4  D5  D6  D7
//! ```
//!
//! Every byte is sent as two nibbles, each latched by a pulse of EN, all in
//! a single I2C transaction. The bus is slower than the display, so only
//! clearing and initialization need to wait.

use eload_control::peripherals::{Display, Glyph};

use super::bus::{Bus, Error};

const ADDRESS: u8 = 0x27;

const REGISTER_SELECT: u8 = 0b0001;
const ENABLE: u8 = 0b0100;
const BACKLIGHT: u8 = 0b1000;

const CLEAR: u8 = 0x01;
const ENTRY_MODE_INCREMENT: u8 = 0x06;
const DISPLAY_ON: u8 = 0x0C;
const FUNCTION_SET_4_BIT_2_LINES: u8 = 0x28;
const SET_CGRAM_ADDRESS: u8 = 0x40;
const SET_DDRAM_ADDRESS: u8 = 0x80;

const ROW_OFFSETS: [u8; 2] = [0x00, 0x40];

const CYCLES_PER_US: u32 = 480;

pub struct Lcd<'a> {
    bus: &'a Bus,
}

impl<'a> Lcd<'a> {
    #[must_use]
    pub fn new(bus: &'a Bus) -> Self {
        Self { bus }
    }

    /// Reset the display into 4-bit mode and upload all glyphs.
    ///
    /// # Errors
    ///
    /// Fails if the expander does not respond.
    pub fn init(&mut self) -> Result<(), Error> {
        wait_us(50_000);
        for delay_us in [4_500, 4_500, 150] {
            self.write_nibble(0x30, 0)?;
            wait_us(delay_us);
        }
        self.write_nibble(0x20, 0)?;

        self.command(FUNCTION_SET_4_BIT_2_LINES)?;
        self.command(DISPLAY_ON)?;
        self.clear()?;
        self.command(ENTRY_MODE_INCREMENT)?;

        for glyph in Glyph::ALL {
            self.command(SET_CGRAM_ADDRESS | (glyph.id() << 3))?;
            for row in glyph.bitmap() {
                self.data(row)?;
            }
        }
        self.command(SET_DDRAM_ADDRESS)
    }

    fn command(&mut self, byte: u8) -> Result<(), Error> {
        self.write_byte(byte, 0)
    }

    fn data(&mut self, byte: u8) -> Result<(), Error> {
        self.write_byte(byte, REGISTER_SELECT)
    }

    fn write_byte(&mut self, byte: u8, mode: u8) -> Result<(), Error> {
        let high = (byte & 0xF0) | mode | BACKLIGHT;
        let low = (byte << 4) | mode | BACKLIGHT;
        self.bus.write(ADDRESS, &[high | ENABLE, high, low | ENABLE, low])
    }

    fn write_nibble(&mut self, nibble: u8, mode: u8) -> Result<(), Error> {
        let value = (nibble & 0xF0) | mode | BACKLIGHT;
        self.bus.write(ADDRESS, &[value | ENABLE, value])
    }
}

impl Display for Lcd<'_> {
    type Error = Error;

    fn clear(&mut self) -> Result<(), Error> {
        self.command(CLEAR)?;
        wait_us(2_000);
        Ok(())
    }

    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), Error> {
        let offset = ROW_OFFSETS[usize::from(row) % ROW_OFFSETS.len()];
        self.command(SET_DDRAM_ADDRESS | (offset + col))
    }

    fn print(&mut self, text: &str) -> Result<(), Error> {
        for byte in text.bytes() {
            self.data(byte)?;
        }
        Ok(())
    }

    fn write_glyph(&mut self, glyph: Glyph) -> Result<(), Error> {
        self.data(glyph.id())
    }
}

fn wait_us(us: u32) {
    cortex_m::asm::delay(us * CYCLES_PER_US);
}
