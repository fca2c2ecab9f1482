use eload_control::input::button::SharedButton;
use eload_control::input::Inputs;

use crate::system::inputs::Buttons;

/// Sample buttons once per millisecond until the given one gets pressed.
pub fn sample_until_clicked(
    buttons: &Buttons,
    inputs: &Inputs,
    button: fn(&Inputs) -> &SharedButton,
) {
    loop {
        buttons.sample(inputs);
        if button(inputs).take_edge().pressed() {
            break;
        }
        cortex_m::asm::delay(480_000_000 / 1000);
    }
}

pub fn sample_until_confirm_is_clicked(buttons: &Buttons, inputs: &Inputs) {
    sample_until_clicked(buttons, inputs, |inputs| &inputs.confirm);
}
