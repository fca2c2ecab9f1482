//! Quadrature decoding of the rotary encoder.
//!
//! The decoder is fed from the pin-change interrupt of either phase while
//! the main loop collects turns from it. [`SharedEncoder`] keeps the state
//! behind a critical section so that an interrupt can never observe or
//! leave a half-updated state.

use core::cell::Cell;

use critical_section::Mutex;

const PHASE_A: u8 = 0b10;
const PHASE_B: u8 = 0b01;

/// Direction of a single encoder transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    #[must_use]
    pub fn delta(self) -> i32 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}

/// State of the decoder between two pin changes.
///
/// Only the owner of the state may mutate it. Outside of this module it is
/// reachable through [`SharedEncoder`] exclusively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncoderState {
    phase: u8,
    position: i32,
    direction: Direction,
    turn_pending: bool,
}

impl Default for EncoderState {
    fn default() -> Self {
        Self::new()
    }
}

impl EncoderState {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: 0,
            position: 0,
            direction: Direction::Up,
            turn_pending: false,
        }
    }

    /// Latch the current phase without counting it as a transition.
    pub fn latch(&mut self, a: bool, b: bool) {
        self.phase = phase_bits(a, b);
    }

    /// Process a sample of both phases.
    ///
    /// The phase that moved decides how the two levels are compared. When A
    /// moved, equal levels mean a turn up. When B moved, differing levels
    /// mean a turn up. A sample equal to the latched one is ignored, and so
    /// is one where both phases moved at once, since the step in between
    /// was missed.
    pub fn transition(&mut self, a: bool, b: bool) -> Option<Direction> {
        let phase = phase_bits(a, b);
        let moved = phase ^ self.phase;
        self.phase = phase;

        let direction = match moved {
            PHASE_A if a == b => Direction::Up,
            PHASE_A => Direction::Down,
            PHASE_B if a != b => Direction::Up,
            PHASE_B => Direction::Down,
            _ => return None,
        };

        self.position = self.position.wrapping_add(direction.delta());
        self.direction = direction;
        self.turn_pending = true;

        Some(direction)
    }

    /// Return the direction of the latest turn, if there was any since the
    /// previous call.
    ///
    /// Multiple turns between two calls collapse into one, carrying the
    /// direction of the last of them.
    pub fn take_turn(&mut self) -> Option<Direction> {
        if self.turn_pending {
            self.turn_pending = false;
            Some(self.direction)
        } else {
            None
        }
    }

    #[must_use]
    pub fn position(&self) -> i32 {
        self.position
    }
}

fn phase_bits(a: bool, b: bool) -> u8 {
    (u8::from(a) << 1) | u8::from(b)
}

/// Encoder state shared between the pin interrupt and the main loop.
///
/// Each access is one short critical section. It is never held across
/// peripheral I/O.
pub struct SharedEncoder {
    state: Mutex<Cell<EncoderState>>,
}

impl Default for SharedEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedEncoder {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(Cell::new(EncoderState::new())),
        }
    }

    pub fn latch(&self, a: bool, b: bool) {
        self.update(|state| state.latch(a, b));
    }

    /// To be called from the interrupt handler on every change of either
    /// phase pin.
    pub fn on_edge(&self, a: bool, b: bool) -> Option<Direction> {
        self.update(|state| state.transition(a, b))
    }

    pub fn take_turn(&self) -> Option<Direction> {
        self.update(EncoderState::take_turn)
    }

    #[must_use]
    pub fn position(&self) -> i32 {
        critical_section::with(|cs| self.state.borrow(cs).get().position())
    }

    fn update<R>(&self, f: impl FnOnce(&mut EncoderState) -> R) -> R {
        critical_section::with(|cs| {
            let cell = self.state.borrow(cs);
            let mut state = cell.get();
            let result = f(&mut state);
            cell.set(state);
            result
        })
    }
}
