//! Configuration of the instrument.
//!
//! All of it is fixed at build time. Nothing is persisted, the instrument
//! always starts from these defaults. Debouncing of buttons is configured
//! where the shared [`Inputs`] are placed.
//!
//! [`Inputs`]: crate::input::Inputs

use crate::gate;
use crate::regulation::{Calibration, StepTable};
use crate::unit::{Unit, UNITS};
use crate::Duration;

/// How long the splash screen stays after boot.
pub const SPLASH: Duration = Duration::from_ticks(2000);

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Units offered by the menu, in order.
    pub units: &'static [Unit],
    pub calibration: Calibration,
    pub step_table: StepTable,
    pub render_period: Duration,
    /// Zero skips the splash screen.
    pub splash: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            units: &UNITS,
            calibration: Calibration::default(),
            step_table: StepTable::default(),
            render_period: gate::DEFAULT_PERIOD,
            splash: SPLASH,
        }
    }
}
