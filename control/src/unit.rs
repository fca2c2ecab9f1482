//! Descriptors of the quantities the load can regulate.
//!
//! Menu, editor and screens are generic over these descriptors, adding a
//! new regulated unit means adding a new descriptor only.

use crate::peripherals::Glyph;

/// Maximum number of digits of any unit's setpoint.
pub const MAX_DIGITS: usize = 7;

/// Maximum number of units the menu can offer.
pub const MAX_UNITS: usize = 8;

/// Physical quantity decides which law the regulation follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Quantity {
    /// Setpoint in ohms, regulated through current.
    Resistance,
    /// Setpoint in milliamps.
    Current,
    /// Setpoint in milliwatts.
    Power,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Unit {
    pub quantity: Quantity,
    /// Name shown in the menu.
    pub label: &'static str,
    /// Printed right after the value.
    pub suffix: &'static str,
    /// Written right after the suffix.
    pub glyph: Option<Glyph>,
    /// Fixed width of the setpoint while editing, at most [`MAX_DIGITS`].
    pub digits: usize,
}

pub const RESISTANCE: Unit = Unit {
    quantity: Quantity::Resistance,
    label: "Resistance",
    suffix: "",
    glyph: Some(Glyph::Ohm),
    digits: 7,
};

pub const CURRENT: Unit = Unit {
    quantity: Quantity::Current,
    label: "Current",
    suffix: "mA",
    glyph: None,
    digits: 4,
};

pub const POWER: Unit = Unit {
    quantity: Quantity::Power,
    label: "Power",
    suffix: "mW",
    glyph: None,
    digits: 5,
};

pub const UNITS: [Unit; 3] = [RESISTANCE, CURRENT, POWER];

impl Unit {
    #[must_use]
    pub fn width(&self) -> usize {
        self.digits.min(MAX_DIGITS)
    }

    /// The largest setpoint fitting the width.
    #[must_use]
    pub fn max_value(&self) -> u32 {
        10_u32.pow(self.width() as u32) - 1
    }
}
