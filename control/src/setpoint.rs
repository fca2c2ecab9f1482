//! Digit by digit editing of a setpoint.

use heapless::Vec;

use crate::input::encoder::Direction;
use crate::unit::MAX_DIGITS;

pub type Digits = Vec<u8, MAX_DIGITS>;

/// Editor of a fixed width decimal setpoint.
///
/// Digits are ordered from the most significant one. The cursor starts on
/// the first digit and moves with every confirmation, confirming the last
/// digit completes the edit.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Editor {
    digits: Digits,
    cursor: usize,
}

/// Outcome of confirming the digit under the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Advance {
    /// Cursor moved to the given digit.
    Next(usize),
    /// The last digit was confirmed, this is the composed setpoint.
    Confirmed(u32),
}

impl Editor {
    #[must_use]
    pub fn new(width: usize) -> Self {
        let mut editor = Self {
            digits: Vec::new(),
            cursor: 0,
        };
        editor.reset(width);
        editor
    }

    /// Zero all digits of the new width and move the cursor to the first.
    pub fn reset(&mut self, width: usize) {
        self.digits.clear();
        // NOTE: The width is clamped to the capacity, resize cannot fail.
        let _ = self.digits.resize(width.min(MAX_DIGITS), 0);
        self.cursor = 0;
    }

    pub fn adjust(&mut self, direction: Direction) {
        match direction {
            Direction::Up => self.increment(),
            Direction::Down => self.decrement(),
        }
    }

    pub fn increment(&mut self) {
        if let Some(digit) = self.digits.get_mut(self.cursor) {
            *digit = (*digit + 1).min(9);
        }
    }

    pub fn decrement(&mut self) {
        if let Some(digit) = self.digits.get_mut(self.cursor) {
            *digit = digit.saturating_sub(1);
        }
    }

    pub fn advance(&mut self) -> Advance {
        if self.cursor + 1 < self.digits.len() {
            self.cursor += 1;
            Advance::Next(self.cursor)
        } else {
            Advance::Confirmed(self.value())
        }
    }

    #[must_use]
    pub fn value(&self) -> u32 {
        compose(&self.digits)
    }

    #[must_use]
    pub fn digits(&self) -> &[u8] {
        &self.digits
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

/// Compose digits ordered from the most significant one into a number.
///
/// Every place is accounted for, leading zeros included.
#[must_use]
pub fn compose(digits: &[u8]) -> u32 {
    digits.iter().fold(0_u32, |value, digit| {
        value.saturating_mul(10).saturating_add(u32::from(*digit))
    })
}
