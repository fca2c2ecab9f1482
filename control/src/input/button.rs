//! Debouncing of push buttons.
//!
//! The debounce is counting consecutive samples, not measuring time, so its
//! latency scales with the sampling rate. The defaults assume sampling every
//! millisecond, [`DEFAULT_THRESHOLD`] then corresponds to 200 ms.

use core::cell::Cell;

use critical_section::Mutex;

/// Number of consecutive samples a changed level must hold to be accepted.
pub const DEFAULT_THRESHOLD: u16 = 200;

/// Level of the pin while the button is held down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActiveLevel {
    High,
    /// Button pulling a pulled-up pin to the ground.
    Low,
}

impl ActiveLevel {
    fn is_active(self, high: bool) -> bool {
        match self {
            Self::High => high,
            Self::Low => !high,
        }
    }
}

/// A committed change of the button's state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    #[default]
    None,
    Pressed,
    Released,
}

impl Edge {
    #[must_use]
    pub fn pressed(self) -> bool {
        self == Self::Pressed
    }
}

/// Use this to hold button's state over time.
///
/// Levels are kept as sampled, `true` being high. A sampled level differing
/// from the stable one must be observed `threshold` times in a row before it is
/// committed. Any sample matching the stable level restarts the count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonState {
    stable_level: bool,
    consecutive: u16,
    edge: Edge,
    threshold: u16,
    active_level: ActiveLevel,
}

impl ButtonState {
    /// The button starts released. Threshold of zero is treated as one.
    #[must_use]
    pub const fn new(threshold: u16, active_level: ActiveLevel) -> Self {
        let released = match active_level {
            ActiveLevel::High => false,
            ActiveLevel::Low => true,
        };
        Self {
            stable_level: released,
            consecutive: 0,
            edge: Edge::None,
            threshold: if threshold == 0 { 1 } else { threshold },
            active_level,
        }
    }

    /// Process a raw sample of the pin, returning the edge if one got
    /// committed by it.
    ///
    /// The committed edge is also kept until it is taken, a newer edge
    /// replaces one that was not taken yet.
    pub fn sample(&mut self, high: bool) -> Edge {
        if high == self.stable_level {
            self.consecutive = 0;
            return Edge::None;
        }

        self.consecutive = self.consecutive.saturating_add(1);
        if self.consecutive < self.threshold {
            return Edge::None;
        }

        self.stable_level = high;
        self.consecutive = 0;
        self.edge = if self.active_level.is_active(high) {
            Edge::Pressed
        } else {
            Edge::Released
        };
        self.edge
    }

    pub fn take_edge(&mut self) -> Edge {
        core::mem::take(&mut self.edge)
    }

    #[must_use]
    pub fn pressed(&self) -> bool {
        self.active_level.is_active(self.stable_level)
    }
}

impl Default for ButtonState {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD, ActiveLevel::Low)
    }
}

/// Button state shared between the sampling task and the main loop.
pub struct SharedButton {
    state: Mutex<Cell<ButtonState>>,
}

impl SharedButton {
    #[must_use]
    pub const fn new(threshold: u16, active_level: ActiveLevel) -> Self {
        Self {
            state: Mutex::new(Cell::new(ButtonState::new(threshold, active_level))),
        }
    }

    pub fn sample(&self, high: bool) -> Edge {
        self.update(|state| state.sample(high))
    }

    pub fn take_edge(&self) -> Edge {
        self.update(ButtonState::take_edge)
    }

    #[must_use]
    pub fn pressed(&self) -> bool {
        critical_section::with(|cs| self.state.borrow(cs).get().pressed())
    }

    fn update<R>(&self, f: impl FnOnce(&mut ButtonState) -> R) -> R {
        critical_section::with(|cs| {
            let cell = self.state.borrow(cs);
            let mut state = cell.get();
            let result = f(&mut state);
            cell.set(state);
            result
        })
    }
}

impl Default for SharedButton {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD, ActiveLevel::Low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    fn hold(button: &mut ButtonState, high: bool, samples: u16) -> heapless::Vec<Edge, 4> {
        let mut edges = heapless::Vec::new();
        for _ in 0..samples {
            let edge = button.sample(high);
            if edge != Edge::None {
                edges.push(edge).unwrap();
            }
        }
        edges
    }

    #[test]
    fn when_pressed_for_the_threshold_it_emits_press_on_the_last_sample() {
        let mut button = ButtonState::new(4, ActiveLevel::Low);
        assert!(hold(&mut button, false, 3).is_empty());
        assert_eq!(button.sample(false), Edge::Pressed);
        assert!(button.pressed());
    }

    #[test]
    fn when_released_for_the_threshold_it_emits_release() {
        let mut button = ButtonState::new(4, ActiveLevel::Low);
        hold(&mut button, false, 4);
        assert_eq!(hold(&mut button, true, 4).as_slice(), &[Edge::Released]);
        assert!(!button.pressed());
    }

    #[test]
    fn when_held_long_it_emits_only_once() {
        let mut button = ButtonState::new(4, ActiveLevel::Low);
        assert_eq!(hold(&mut button, false, 100).as_slice(), &[Edge::Pressed]);
    }

    #[test]
    fn when_bouncing_shorter_than_threshold_it_emits_nothing() {
        let mut button = ButtonState::new(4, ActiveLevel::Low);
        for _ in 0..50 {
            assert!(hold(&mut button, false, 3).is_empty());
            assert!(hold(&mut button, true, 1).is_empty());
        }
        assert!(!button.pressed());
    }

    #[test]
    fn when_a_single_sample_bounces_the_button_stays_released() {
        let mut button = ButtonState::new(4, ActiveLevel::Low);
        assert_eq!(button.sample(false), Edge::None);
        assert_eq!(button.sample(true), Edge::None);
        assert!(hold(&mut button, false, 3).is_empty());
        assert!(!button.pressed());
        assert_eq!(button.sample(false), Edge::Pressed);
    }

    #[test]
    fn when_active_high_it_starts_released_and_presses_on_high() {
        let mut button = ButtonState::new(2, ActiveLevel::High);
        assert!(hold(&mut button, false, 10).is_empty());
        assert_eq!(hold(&mut button, true, 2).as_slice(), &[Edge::Pressed]);
    }

    #[test]
    fn when_edge_is_taken_it_resets_to_none() {
        let mut button = ButtonState::new(1, ActiveLevel::Low);
        button.sample(false);
        assert_eq!(button.take_edge(), Edge::Pressed);
        assert_eq!(button.take_edge(), Edge::None);
    }

    #[test]
    fn when_threshold_is_zero_it_acts_as_one() {
        let mut button = ButtonState::new(0, ActiveLevel::Low);
        assert_eq!(button.sample(false), Edge::Pressed);
    }

    #[test]
    fn shared_button_keeps_edge_until_taken() {
        let button = SharedButton::new(2, ActiveLevel::Low);
        button.sample(false);
        button.sample(false);
        button.sample(false);
        assert!(button.pressed());
        assert_eq!(button.take_edge(), Edge::Pressed);
        assert_eq!(button.take_edge(), Edge::None);
    }

    proptest! {
        #[test]
        fn edge_is_emitted_iff_level_differed_for_threshold_samples(
            threshold in 1u16..8,
            samples in proptest::collection::vec(any::<bool>(), 0..300)
        ) {
            let mut button = ButtonState::new(threshold, ActiveLevel::Low);
            let mut stable = true;
            let mut run = 0;
            for high in samples {
                let edge = button.sample(high);
                if high == stable {
                    run = 0;
                    prop_assert_eq!(edge, Edge::None);
                } else {
                    run += 1;
                    if run == threshold {
                        stable = high;
                        run = 0;
                        let expected = if high { Edge::Released } else { Edge::Pressed };
                        prop_assert_eq!(edge, expected);
                    } else {
                        prop_assert_eq!(edge, Edge::None);
                    }
                }
            }
        }
    }
}
