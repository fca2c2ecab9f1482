//! Interfaces of the peripheral drivers the control core is talking to.
//!
//! These are thin wrappers implemented by the firmware. All of them are
//! accessed from the main loop only, never from an interrupt.

/// Analog to digital converter sensing the load.
pub trait Sense {
    type Error;

    /// Raw code across the current shunt, not scaled.
    fn read_differential(&mut self) -> Result<i32, Self::Error>;

    /// Raw code of the given single ended channel, not scaled.
    fn read_single_ended(&mut self, channel: u8) -> Result<i32, Self::Error>;
}

/// Converter driving the gate of the load's pass element.
pub trait Actuator {
    type Error;

    /// The code is always within `0..=COMMAND_MAX`, the driver does not need
    /// to clamp it.
    ///
    /// [`COMMAND_MAX`]: crate::regulation::COMMAND_MAX
    fn set_output(&mut self, code: u16) -> Result<(), Self::Error>;
}

/// Character display.
pub trait Display {
    type Error;

    fn clear(&mut self) -> Result<(), Self::Error>;

    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), Self::Error>;

    fn print(&mut self, text: &str) -> Result<(), Self::Error>;

    fn write_glyph(&mut self, glyph: Glyph) -> Result<(), Self::Error>;
}

/// Custom characters used by the screens.
///
/// The display driver is expected to upload [`Glyph::bitmap`] of each of
/// them under [`Glyph::id`] on initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Glyph {
    /// Marks the highlighted item.
    Arrow,
    /// Marks a value adjustable with the encoder.
    Adjust,
    Ohm,
    Pause,
}

impl Glyph {
    pub const ALL: [Glyph; 4] = [Glyph::Arrow, Glyph::Adjust, Glyph::Ohm, Glyph::Pause];

    #[must_use]
    pub fn id(self) -> u8 {
        match self {
            Self::Arrow => 0,
            Self::Adjust => 1,
            Self::Ohm => 2,
            Self::Pause => 3,
        }
    }

    /// Rows of the 5x8 character, top to bottom.
    #[must_use]
    pub fn bitmap(self) -> [u8; 8] {
        match self {
            Self::Arrow => [
                0b10000, 0b11000, 0b11100, 0b11110, 0b11110, 0b11100, 0b11000, 0b10000,
            ],
            Self::Adjust => [
                0b00100, 0b01110, 0b11111, 0b00000, 0b00000, 0b11111, 0b01110, 0b00100,
            ],
            Self::Ohm => [
                0b00000, 0b01110, 0b10001, 0b10001, 0b10001, 0b01010, 0b11011, 0b00000,
            ],
            Self::Pause => [
                0b00000, 0b11011, 0b11011, 0b11011, 0b11011, 0b11011, 0b11011, 0b00000,
            ],
        }
    }
}
