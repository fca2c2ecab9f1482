//! Input peripherals shared between interrupts and the main loop.

pub mod button;
pub mod encoder;
pub mod snapshot;

use button::{ActiveLevel, SharedButton};
use encoder::SharedEncoder;
use snapshot::Snapshot;

/// All inputs of the instrument.
///
/// This is meant to be placed in a `static`. Interrupts and periodic tasks
/// write into it, the main loop collects a [`Snapshot`] from it once per
/// iteration. Each peripheral is read and cleared in its own critical
/// section.
pub struct Inputs {
    pub encoder: SharedEncoder,
    pub confirm: SharedButton,
    pub back: SharedButton,
    pub pause: SharedButton,
}

impl Inputs {
    #[must_use]
    pub const fn new(debounce_threshold: u16, active_level: ActiveLevel) -> Self {
        Self {
            encoder: SharedEncoder::new(),
            confirm: SharedButton::new(debounce_threshold, active_level),
            back: SharedButton::new(debounce_threshold, active_level),
            pause: SharedButton::new(debounce_threshold, active_level),
        }
    }

    /// Sample all buttons. Levels are passed as read, `true` being high.
    pub fn sample_buttons(&self, confirm: bool, back: bool, pause: bool) {
        self.confirm.sample(confirm);
        self.back.sample(back);
        self.pause.sample(pause);
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            turn: self.encoder.take_turn(),
            confirm: self.confirm.take_edge(),
            back: self.back.take_edge(),
            pause: self.pause.take_edge(),
        }
    }
}

impl Default for Inputs {
    fn default() -> Self {
        Self::new(button::DEFAULT_THRESHOLD, ActiveLevel::Low)
    }
}
