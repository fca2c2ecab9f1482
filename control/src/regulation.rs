//! Closed loop regulation of the load.
//!
//! This is a coarse proportional band controller. The relative error picks
//! a step from an ordered table and the actuator command moves by that step
//! toward the target. There is no integral or derivative term, the only
//! limit is the clamping of the command.

#[allow(unused_imports)]
use micromath::F32Ext;

use crate::peripherals::Sense;
use crate::unit::Quantity;

/// Largest code accepted by the 12-bit actuator.
pub const COMMAND_MAX: u16 = 4095;

/// Step applied when the relative error falls below all bands.
pub const FINE_STEP: u16 = 1;

/// Step taken when the relative error is above the given fraction of the
/// target.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Band {
    pub fraction: f32,
    pub step: u16,
}

/// Bands ordered from the largest fraction.
pub const DEFAULT_BANDS: [Band; 6] = [
    Band { fraction: 0.8, step: 300 },
    Band { fraction: 0.6, step: 170 },
    Band { fraction: 0.4, step: 120 },
    Band { fraction: 0.3, step: 60 },
    Band { fraction: 0.2, step: 40 },
    Band { fraction: 0.1, step: 30 },
];

/// Table driving the size of regulation steps.
///
/// Bands are searched in order and the first one exceeded wins, so they
/// must be sorted from the largest fraction.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepTable {
    pub bands: &'static [Band],
    pub fine: u16,
}

impl Default for StepTable {
    fn default() -> Self {
        Self {
            bands: &DEFAULT_BANDS,
            fine: FINE_STEP,
        }
    }
}

impl StepTable {
    #[must_use]
    pub fn step_magnitude(&self, error: f32, target: f32) -> u16 {
        let fraction = error_fraction(error, target);
        self.bands
            .iter()
            .find(|band| fraction > band.fraction)
            .map_or(self.fine, |band| band.step)
    }
}

/// Step size for the given error using the default table.
#[must_use]
pub fn step_magnitude(error: f32, target: f32) -> u16 {
    StepTable::default().step_magnitude(error, target)
}

// Zero target with any error left counts as infinitely far.
fn error_fraction(error: f32, target: f32) -> f32 {
    let error = error.abs();
    let target = target.abs();
    if target > 0.0 {
        error / target
    } else if error > 0.0 {
        f32::INFINITY
    } else {
        0.0
    }
}

/// Scaling of raw converter codes into physical units.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    /// Amps per code of the differential reading across the shunt.
    pub current_per_code: f32,
    /// Volts per code of the voltage divider reading.
    pub voltage_per_code: f32,
    /// Single ended channel carrying the divided bus voltage.
    pub voltage_channel: u8,
}

impl Default for Calibration {
    fn default() -> Self {
        // 0.1875 mV per code at the default gain, 0.0975 Ω shunt and
        // a 1:11.13 voltage divider.
        Self {
            current_per_code: 0.1875 / 1000.0 / 0.0975,
            voltage_per_code: 0.1875 * 11.13 / 1000.0,
            voltage_channel: 2,
        }
    }
}

/// Sensed values of one regulation step.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Readings {
    /// Amps.
    pub current: f32,
    /// Volts. Only sensed when the regulated quantity needs it.
    pub voltage: Option<f32>,
}

impl Readings {
    /// Read the sensed values needed to regulate the given quantity.
    ///
    /// # Errors
    ///
    /// Passes through the failure of the converter.
    pub fn sense<S: Sense>(
        sense: &mut S,
        calibration: &Calibration,
        quantity: Quantity,
    ) -> Result<Self, S::Error> {
        let current = sense.read_differential()? as f32 * calibration.current_per_code;
        let voltage = match quantity {
            Quantity::Current => None,
            Quantity::Resistance | Quantity::Power => Some(
                sense.read_single_ended(calibration.voltage_channel)? as f32
                    * calibration.voltage_per_code,
            ),
        };
        Ok(Self { current, voltage })
    }

    /// Watts.
    #[must_use]
    pub fn power(&self) -> Option<f32> {
        self.voltage.map(|voltage| voltage * self.current)
    }

    /// Ohms, if the current is flowing.
    #[must_use]
    pub fn resistance(&self) -> Option<f32> {
        match self.voltage {
            Some(voltage) if self.current > 0.0 => Some(voltage / self.current),
            _ => None,
        }
    }
}

/// Target and sensed value in the same physical unit.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Objective {
    pub target: f32,
    pub sensed: f32,
}

impl Objective {
    /// Build the objective for the quantity and its setpoint.
    ///
    /// Current and resistance are regulated through current in amps, power
    /// in watts. Resistance with zero setpoint targets zero current.
    #[must_use]
    pub fn new(quantity: Quantity, setpoint: u32, readings: &Readings) -> Self {
        let voltage = readings.voltage.unwrap_or(0.0);
        match quantity {
            Quantity::Current => Self {
                target: setpoint as f32 / 1000.0,
                sensed: readings.current,
            },
            Quantity::Power => Self {
                target: setpoint as f32 / 1000.0,
                sensed: readings.current * voltage,
            },
            Quantity::Resistance => Self {
                target: if setpoint == 0 {
                    0.0
                } else {
                    voltage / setpoint as f32
                },
                sensed: readings.current,
            },
        }
    }

    #[must_use]
    pub fn error(&self) -> f32 {
        (self.target - self.sensed).abs()
    }
}

/// Keeper of the actuator command.
///
/// The command survives pausing, it is only zeroed explicitly.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Regulator {
    command: u16,
    table: StepTable,
}

impl Regulator {
    #[must_use]
    pub fn new(table: StepTable) -> Self {
        Self { command: 0, table }
    }

    /// Move the command one step toward the objective.
    pub fn step(&mut self, objective: &Objective) -> u16 {
        let step = self.table.step_magnitude(objective.error(), objective.target);
        self.command = if objective.target > objective.sensed {
            self.command.saturating_add(step).min(COMMAND_MAX)
        } else {
            self.command.saturating_sub(step)
        };
        self.command
    }

    /// Code to be written to the actuator.
    #[must_use]
    pub fn output(&self, paused: bool) -> u16 {
        if paused {
            0
        } else {
            self.command
        }
    }

    #[must_use]
    pub fn command(&self) -> u16 {
        self.command
    }

    pub fn zero(&mut self) {
        self.command = 0;
    }

    #[cfg(test)]
    pub(crate) fn set_command(&mut self, command: u16) {
        self.command = command.min(COMMAND_MAX);
    }
}

impl Default for Regulator {
    fn default() -> Self {
        Self::new(StepTable::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    struct FakeSense {
        differential: i32,
        single_ended: i32,
        single_ended_reads: usize,
    }

    impl Sense for FakeSense {
        type Error = ();

        fn read_differential(&mut self) -> Result<i32, ()> {
            Ok(self.differential)
        }

        fn read_single_ended(&mut self, channel: u8) -> Result<i32, ()> {
            assert_eq!(channel, 2);
            self.single_ended_reads += 1;
            Ok(self.single_ended)
        }
    }

    fn objective(target: f32, sensed: f32) -> Objective {
        Objective { target, sensed }
    }

    #[test]
    fn step_magnitude_follows_bands() {
        assert_eq!(step_magnitude(0.85, 1.0), 300);
        assert_eq!(step_magnitude(0.7, 1.0), 170);
        assert_eq!(step_magnitude(0.5, 1.0), 120);
        assert_eq!(step_magnitude(0.35, 1.0), 60);
        assert_eq!(step_magnitude(0.25, 1.0), 40);
        assert_eq!(step_magnitude(0.15, 1.0), 30);
        assert_eq!(step_magnitude(0.05, 1.0), 1);
        assert_eq!(step_magnitude(0.0, 1.0), 1);
    }

    #[test]
    fn step_magnitude_is_relative_to_target() {
        assert_eq!(step_magnitude(8.5, 10.0), 300);
        assert_eq!(step_magnitude(0.0085, 0.01), 300);
        assert_eq!(step_magnitude(0.5, 10.0), 1);
    }

    #[test]
    fn when_band_fraction_is_hit_exactly_the_lower_band_applies() {
        assert_eq!(step_magnitude(0.8, 1.0), 170);
        assert_eq!(step_magnitude(0.1, 1.0), 1);
    }

    #[test]
    fn when_target_is_zero_any_error_takes_the_largest_step() {
        assert_eq!(step_magnitude(0.001, 0.0), 300);
        assert_eq!(step_magnitude(0.0, 0.0), 1);
    }

    #[test]
    fn when_error_is_85_percent_below_target_command_rises_by_300() {
        let mut regulator = Regulator::default();
        regulator.set_command(1000);
        assert_eq!(regulator.step(&objective(1.0, 0.15)), 1300);
    }

    #[test]
    fn when_large_step_would_overflow_it_is_clamped_to_max() {
        let mut regulator = Regulator::default();
        regulator.set_command(4000);
        assert_eq!(regulator.step(&objective(1.0, 0.15)), COMMAND_MAX);
    }

    #[test]
    fn when_sensed_is_above_target_command_falls() {
        let mut regulator = Regulator::default();
        regulator.set_command(1000);
        assert_eq!(regulator.step(&objective(1.0, 1.5)), 880);
        regulator.set_command(100);
        assert_eq!(regulator.step(&objective(1.0, 3.0)), 0);
    }

    #[test]
    fn when_sensed_equals_target_command_falls_by_fine_step() {
        let mut regulator = Regulator::default();
        regulator.set_command(10);
        assert_eq!(regulator.step(&objective(1.0, 1.0)), 9);
    }

    #[test]
    fn when_paused_output_is_zero_but_command_is_kept() {
        let mut regulator = Regulator::default();
        regulator.set_command(1234);
        assert_eq!(regulator.output(true), 0);
        assert_eq!(regulator.command(), 1234);
        assert_eq!(regulator.output(false), 1234);
    }

    #[test]
    fn when_regulating_current_voltage_is_not_sensed() {
        let mut sense = FakeSense {
            differential: 520,
            single_ended: 5700,
            single_ended_reads: 0,
        };
        let readings =
            Readings::sense(&mut sense, &Calibration::default(), Quantity::Current).unwrap();
        assert_eq!(sense.single_ended_reads, 0);
        assert_eq!(readings.voltage, None);
        assert_relative_eq!(readings.current, 1.0, epsilon = 0.001);
    }

    #[test]
    fn when_regulating_power_voltage_is_scaled_by_divider() {
        let mut sense = FakeSense {
            differential: 520,
            single_ended: 5750,
            single_ended_reads: 0,
        };
        let readings =
            Readings::sense(&mut sense, &Calibration::default(), Quantity::Power).unwrap();
        assert_eq!(sense.single_ended_reads, 1);
        assert_relative_eq!(readings.voltage.unwrap(), 12.0, epsilon = 0.01);
        assert_relative_eq!(readings.power().unwrap(), 12.0, epsilon = 0.02);
    }

    #[test]
    fn resistance_objective_targets_current_through_setpoint() {
        let readings = Readings {
            current: 0.5,
            voltage: Some(12.0),
        };
        let objective = Objective::new(Quantity::Resistance, 10, &readings);
        assert_relative_eq!(objective.target, 1.2);
        assert_relative_eq!(objective.sensed, 0.5);
    }

    #[test]
    fn when_resistance_setpoint_is_zero_target_is_zero() {
        let readings = Readings {
            current: 0.5,
            voltage: Some(12.0),
        };
        let objective = Objective::new(Quantity::Resistance, 0, &readings);
        assert_relative_eq!(objective.target, 0.0);

        let mut regulator = Regulator::default();
        regulator.set_command(500);
        assert_eq!(regulator.step(&objective), 200);
    }

    #[test]
    fn current_and_power_objectives_are_scaled_from_milli_units() {
        let readings = Readings {
            current: 0.25,
            voltage: Some(10.0),
        };
        let current = Objective::new(Quantity::Current, 500, &readings);
        assert_relative_eq!(current.target, 0.5);
        assert_relative_eq!(current.sensed, 0.25);
        let power = Objective::new(Quantity::Power, 3000, &readings);
        assert_relative_eq!(power.target, 3.0);
        assert_relative_eq!(power.sensed, 2.5);
    }

    #[test]
    fn resistance_is_not_derived_without_current() {
        let readings = Readings {
            current: 0.0,
            voltage: Some(10.0),
        };
        assert_eq!(readings.resistance(), None);
    }

    proptest! {
        #[test]
        fn command_stays_within_range_for_any_sequence(
            steps in proptest::collection::vec((-1.0e6f32..1.0e6, -1.0e6f32..1.0e6), 0..200),
            initial in 0u16..=COMMAND_MAX,
        ) {
            let mut regulator = Regulator::default();
            regulator.set_command(initial);
            for (target, sensed) in steps {
                let command = regulator.step(&objective(target, sensed));
                prop_assert!(command <= COMMAND_MAX);
            }
        }
    }
}
