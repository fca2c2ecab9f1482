//! MCP4725 12-bit DAC driving the gate of the pass element.

use eload_control::peripherals::Actuator;
use eload_control::regulation::COMMAND_MAX;

use super::bus::{Bus, Error};

const ADDRESS: u8 = 0x60;

pub struct Dac<'a> {
    bus: &'a Bus,
}

impl<'a> Dac<'a> {
    #[must_use]
    pub fn new(bus: &'a Bus) -> Self {
        Self { bus }
    }
}

impl Actuator for Dac<'_> {
    type Error = Error;

    // Fast mode write, the value is not stored in the EEPROM of the chip.
    fn set_output(&mut self, code: u16) -> Result<(), Error> {
        let [high, low] = code.min(COMMAND_MAX).to_be_bytes();
        self.bus.write(ADDRESS, &[high & 0x0F, low])
    }
}
