//! Control core of an electronic load: user interface, regulation and
//! display of the instrument.
//!
//! It is meant to run in a firmware where the rotary encoder and buttons are
//! sampled from interrupts while a cooperative main loop keeps regulating
//! the load and painting the display. None of it touches hardware directly,
//! all peripherals are reached through traits from [`peripherals`].
//!
//! Following is the flow of data through a single iteration of the main
//! loop:
//!
//! ```text
//!   (EXTI)        (1 kHz)
//! [ Encoder ]  [ Buttons ]
//!      |            |
//!      +-----+------+
//!            | (Snapshot)
//!            V
//!        [ Menu ] ----> [ Regulator ] <---> {ADC, DAC}
//!            |                |
//!            +-------+--------+
//!                    | (Readings)
//!                    V
//!            [ RenderGate ] ----> {Display}
//! ```

#![cfg_attr(not(test), no_std)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]

#[cfg(test)]
#[macro_use]
extern crate approx;

pub mod config;
pub mod gate;
pub mod input;
pub mod instrument;
mod log;
pub mod menu;
pub mod peripherals;
pub mod regulation;
pub mod render;
pub mod setpoint;
pub mod unit;

pub use config::Config;
pub use input::snapshot::Snapshot;
pub use instrument::{Fault, Instrument};

/// Point in time of the main loop, in milliseconds.
pub type Instant = fugit::TimerInstantU32<1_000>;

/// Span of time of the main loop, in milliseconds.
pub type Duration = fugit::TimerDurationU32<1_000>;
