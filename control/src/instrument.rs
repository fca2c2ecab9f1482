//! The instrument as a whole, driven by the main loop of the firmware.

use crate::config::Config;
use crate::gate::RenderGate;
use crate::input::snapshot::Snapshot;
use crate::log;
use crate::menu::Menu;
use crate::peripherals::{Actuator, Display, Sense};
use crate::regulation::{Calibration, Objective, Readings, Regulator};
use crate::render::Renderer;
use crate::{Duration, Instant};

/// Failure of a peripheral during a tick.
///
/// The instrument stays consistent after any of these and the loop is
/// expected to keep ticking. Failures of the converters leave the actuator
/// output at zero, failures of the display are retried on the next repaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault {
    Sense,
    Actuator,
    Display,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Boot {
    Splash {
        duration: Duration,
        since: Option<Instant>,
    },
    Ready,
}

#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Instrument {
    menu: Menu,
    regulator: Regulator,
    calibration: Calibration,
    gate: RenderGate,
    renderer: Renderer,
    boot: Boot,
    readings: Option<Readings>,
    written: Option<u16>,
}

impl Instrument {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let boot = if config.splash.ticks() == 0 {
            Boot::Ready
        } else {
            Boot::Splash {
                duration: config.splash,
                since: None,
            }
        };
        Self {
            menu: Menu::new(config.units),
            regulator: Regulator::new(config.step_table),
            calibration: config.calibration,
            gate: RenderGate::new(config.render_period),
            renderer: Renderer::default(),
            boot,
            readings: None,
            written: None,
        }
    }

    /// Run one iteration of the main loop.
    ///
    /// Input events are applied to the menu, the load is regulated while
    /// running and the display is repainted when the render gate fires.
    /// Events arriving while the splash screen is shown are dropped.
    ///
    /// # Errors
    ///
    /// Returns the first peripheral that failed, see [`Fault`]. The display
    /// is still painted after a failure of the converters.
    pub fn tick<S: Sense, A: Actuator, D: Display>(
        &mut self,
        snapshot: Snapshot,
        now: Instant,
        sense: &mut S,
        actuator: &mut A,
        display: &mut D,
    ) -> Result<(), Fault> {
        if self.splash(now, actuator, display)? {
            return Ok(());
        }

        let reaction = self.menu.apply(&snapshot);
        if reaction.transitioned {
            self.gate.reset();
            self.readings = None;
        }
        if reaction.zero_actuator {
            self.regulator.zero();
        }

        let mut fault = None;
        let output = match self.menu.running() {
            Some((unit, setpoint)) => {
                let sensed = Readings::sense(sense, &self.calibration, unit.quantity);
                match sensed {
                    Ok(readings) => {
                        self.readings = Some(readings);
                        if !self.menu.paused() {
                            let objective = Objective::new(unit.quantity, setpoint, &readings);
                            self.regulator.step(&objective);
                        }
                        self.regulator.output(self.menu.paused())
                    }
                    Err(_) => {
                        log::warn!("Failed reading the converter, output zeroed");
                        self.readings = None;
                        fault = Some(Fault::Sense);
                        0
                    }
                }
            }
            None => 0,
        };
        if let Err(failed) = self.drive(actuator, output) {
            fault.get_or_insert(failed);
        }

        if self.gate.poll(now) {
            let painted = self.renderer.paint(display, &self.menu, self.readings.as_ref());
            if painted.is_err() {
                self.renderer.invalidate();
                fault.get_or_insert(Fault::Display);
            }
        }

        fault.map_or(Ok(()), Err)
    }

    // Returns whether the splash screen is still being shown.
    fn splash<A: Actuator, D: Display>(
        &mut self,
        now: Instant,
        actuator: &mut A,
        display: &mut D,
    ) -> Result<bool, Fault> {
        let Boot::Splash { duration, since } = &mut self.boot else {
            return Ok(false);
        };

        match *since {
            None => {
                if self.renderer.paint_splash(display).is_err() {
                    self.renderer.invalidate();
                    return Err(Fault::Display);
                }
                *since = Some(now);
                self.drive(actuator, 0)?;
                Ok(true)
            }
            Some(since) if now.ticks().wrapping_sub(since.ticks()) < duration.ticks() => {
                Ok(true)
            }
            Some(_) => {
                log::debug!("Splash screen done");
                self.boot = Boot::Ready;
                self.gate.reset();
                Ok(false)
            }
        }
    }

    // Write the output only when it changed or when the last write failed.
    fn drive<A: Actuator>(&mut self, actuator: &mut A, code: u16) -> Result<(), Fault> {
        if self.written == Some(code) {
            return Ok(());
        }
        if actuator.set_output(code).is_err() {
            log::warn!("Failed setting the output to {}", code);
            self.written = None;
            return Err(Fault::Actuator);
        }
        self.written = Some(code);
        Ok(())
    }

    #[must_use]
    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    /// Actuator command kept by the regulator, even while paused.
    #[must_use]
    pub fn command(&self) -> u16 {
        self.regulator.command()
    }

    /// Readings of the last tick spent running.
    #[must_use]
    pub fn readings(&self) -> Option<&Readings> {
        self.readings.as_ref()
    }
}
