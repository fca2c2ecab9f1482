//! Pins of the encoder and buttons.
//!
//! Decoding and debouncing happens in the control crate, these only read
//! levels and feed them to the shared [`Inputs`](eload_control::input::Inputs).

mod buttons;
mod encoder;

pub use buttons::{Buttons, Pins as ButtonsPins};
pub use encoder::Encoder;
