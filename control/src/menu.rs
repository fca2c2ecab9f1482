//! State machine of the menu and operating modes.
//!
//! ```text
//!            confirm                   confirm on last digit
//!   [ Idle ] -------> [ Edit(unit) ] ---------------------> [ Run(unit) ]
//!      A   A              |                                     |
//!      |   +--------------+ back                                |
//!      +--------------------------------------------------------+ back
//! ```
//!
//! Turning the encoder moves the highlight in `Idle`, changes the digit
//! under the cursor in `Edit` and nudges the setpoint in `Run`. The pause
//! button toggles pause in `Run` only.

use heapless::Vec;

use crate::input::encoder::Direction;
use crate::input::snapshot::Snapshot;
use crate::log;
use crate::setpoint::{Advance, Editor};
use crate::unit::{Unit, MAX_UNITS};

/// The current state of the menu state machine.
///
/// Indices point to the units the menu was configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    Idle { highlighted: usize },
    Edit { unit: usize },
    Run { unit: usize },
}

impl Default for Mode {
    fn default() -> Self {
        Self::Idle { highlighted: 0 }
    }
}

/// Reaction of the menu to a snapshot of inputs.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reaction {
    /// The mode changed, the new screen should be painted.
    pub transitioned: bool,
    /// The actuator command must be brought to zero.
    pub zero_actuator: bool,
    pub pause_toggled: bool,
    pub setpoint_changed: bool,
}

#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Menu {
    units: Vec<Unit, MAX_UNITS>,
    mode: Mode,
    editor: Editor,
    setpoints: Vec<u32, MAX_UNITS>,
    paused: bool,
}

impl Menu {
    /// Units beyond [`MAX_UNITS`] are ignored.
    #[must_use]
    pub fn new(units: &[Unit]) -> Self {
        let units: Vec<Unit, MAX_UNITS> = units.iter().take(MAX_UNITS).copied().collect();
        let setpoints = units.iter().map(|_| 0).collect();
        let width = units.first().map_or(0, Unit::width);
        Self {
            units,
            mode: Mode::default(),
            editor: Editor::new(width),
            setpoints,
            paused: false,
        }
    }

    /// Process events of one loop iteration.
    ///
    /// Within one snapshot the turn is applied first. Back takes precedence
    /// over confirm when both were pressed.
    pub fn apply(&mut self, snapshot: &Snapshot) -> Reaction {
        let mut reaction = Reaction::default();

        match self.mode {
            Mode::Idle { highlighted } => {
                if let Some(direction) = snapshot.turn {
                    self.move_highlight(highlighted, direction);
                }
                if snapshot.confirm.pressed() {
                    self.enter_edit(&mut reaction);
                }
            }
            Mode::Edit { unit } => {
                if let Some(direction) = snapshot.turn {
                    self.editor.adjust(direction);
                }
                if snapshot.back.pressed() {
                    self.abort_edit(unit, &mut reaction);
                } else if snapshot.confirm.pressed() {
                    if let Advance::Confirmed(value) = self.editor.advance() {
                        self.enter_run(unit, value, &mut reaction);
                    }
                }
            }
            Mode::Run { unit } => {
                if let Some(direction) = snapshot.turn {
                    self.nudge(unit, direction, &mut reaction);
                }
                if snapshot.back.pressed() {
                    self.leave_run(unit, &mut reaction);
                } else if snapshot.pause.pressed() {
                    self.paused = !self.paused;
                    reaction.pause_toggled = true;
                    log::info!("Paused: {}", self.paused);
                }
            }
        }

        reaction
    }

    fn move_highlight(&mut self, highlighted: usize, direction: Direction) {
        let last = self.units.len().saturating_sub(1);
        let highlighted = match direction {
            Direction::Up => highlighted.saturating_sub(1),
            Direction::Down => (highlighted + 1).min(last),
        };
        self.mode = Mode::Idle { highlighted };
    }

    fn enter_edit(&mut self, reaction: &mut Reaction) {
        let Mode::Idle { highlighted } = self.mode else {
            return;
        };
        let Some(unit) = self.units.get(highlighted) else {
            return;
        };
        self.editor.reset(unit.width());
        self.mode = Mode::Edit { unit: highlighted };
        reaction.transitioned = true;
        log::info!("Editing setpoint of unit {}", highlighted);
    }

    fn abort_edit(&mut self, unit: usize, reaction: &mut Reaction) {
        self.editor.reset(self.units[unit].width());
        self.mode = Mode::Idle { highlighted: unit };
        reaction.transitioned = true;
        reaction.zero_actuator = true;
        log::info!("Setpoint edit aborted");
    }

    fn enter_run(&mut self, unit: usize, value: u32, reaction: &mut Reaction) {
        self.setpoints[unit] = value;
        self.editor.reset(self.units[unit].width());
        self.paused = false;
        self.mode = Mode::Run { unit };
        reaction.transitioned = true;
        reaction.setpoint_changed = true;
        log::info!("Running unit {} with setpoint {}", unit, value);
    }

    fn leave_run(&mut self, unit: usize, reaction: &mut Reaction) {
        self.mode = Mode::Idle { highlighted: unit };
        reaction.transitioned = true;
        reaction.zero_actuator = true;
        log::info!("Stopped running unit {}", unit);
    }

    fn nudge(&mut self, unit: usize, direction: Direction, reaction: &mut Reaction) {
        let max = self.units[unit].max_value();
        let setpoint = &mut self.setpoints[unit];
        let nudged = match direction {
            Direction::Up => setpoint.saturating_add(1).min(max),
            Direction::Down => setpoint.saturating_sub(1),
        };
        if nudged != *setpoint {
            *setpoint = nudged;
            reaction.setpoint_changed = true;
        }
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn paused(&self) -> bool {
        self.paused
    }

    #[must_use]
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    #[must_use]
    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    #[must_use]
    pub fn setpoint(&self, unit: usize) -> Option<u32> {
        self.setpoints.get(unit).copied()
    }

    /// The unit and its setpoint while in a running mode.
    #[must_use]
    pub fn running(&self) -> Option<(Unit, u32)> {
        match self.mode {
            Mode::Run { unit } => Some((self.units[unit], self.setpoints[unit])),
            _ => None,
        }
    }
}
