use eload_control::input::Inputs;

use crate::system::hal::gpio;

pub type ConfirmPin = gpio::gpiob::PB15<gpio::Input>;
pub type BackPin = gpio::gpioa::PA0<gpio::Input>;
pub type PausePin = gpio::gpiob::PB14<gpio::Input>;

/// Pins of the buttons. All of them are pulled up and shorted to the
/// ground when pressed.
pub struct Buttons {
    pins: Pins,
}

pub struct Pins {
    pub confirm: ConfirmPin,
    pub back: BackPin,
    pub pause: PausePin,
}

impl Buttons {
    pub fn new(pins: Pins) -> Self {
        Self { pins }
    }

    /// Feed current levels to the debouncers. This is meant to be called
    /// once per millisecond.
    pub fn sample(&self, inputs: &Inputs) {
        inputs.sample_buttons(
            self.pins.confirm.is_high(),
            self.pins.back.is_high(),
            self.pins.pause.is_high(),
        );
    }
}
