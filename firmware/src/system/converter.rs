//! ADS1115 analog to digital converter sensing the load.
//!
//! The shunt is connected differentially between inputs 0 and 1, the divided
//! bus voltage to one of the single ended inputs. Every read triggers a
//! single shot conversion and polls until it is done.

use eload_control::peripherals::Sense;

use super::bus::{Bus, Error};

const ADDRESS: u8 = 0x48;

const CONVERSION_REGISTER: u8 = 0x00;
const CONFIG_REGISTER: u8 = 0x01;

const START: u16 = 1 << 15;
const DIFFERENTIAL_0_1: u16 = 0b000 << 12;
const SINGLE_ENDED_0: u16 = 0b100 << 12;
// ±6.144 V, 0.1875 mV per code.
const GAIN_TWO_THIRDS: u16 = 0b000 << 9;
const SINGLE_SHOT: u16 = 1 << 8;
const RATE_860_SPS: u16 = 0b111 << 5;
const COMPARATOR_DISABLED: u16 = 0b11;

// A conversion at 860 SPS takes about 1.2 ms, each poll takes tens of
// microseconds on a 400 kHz bus.
const MAX_POLLS: u32 = 200;

pub struct Converter<'a> {
    bus: &'a Bus,
}

impl<'a> Converter<'a> {
    #[must_use]
    pub fn new(bus: &'a Bus) -> Self {
        Self { bus }
    }

    fn convert(&mut self, mux: u16) -> Result<i32, Error> {
        let config =
            START | mux | GAIN_TWO_THIRDS | SINGLE_SHOT | RATE_860_SPS | COMPARATOR_DISABLED;
        let [high, low] = config.to_be_bytes();
        self.bus.write(ADDRESS, &[CONFIG_REGISTER, high, low])?;

        let mut buffer = [0; 2];
        let mut done = false;
        for _ in 0..MAX_POLLS {
            self.bus.write_read(ADDRESS, &[CONFIG_REGISTER], &mut buffer)?;
            if u16::from_be_bytes(buffer) & START != 0 {
                done = true;
                break;
            }
        }
        if !done {
            return Err(Error::Timeout);
        }

        self.bus.write_read(ADDRESS, &[CONVERSION_REGISTER], &mut buffer)?;
        Ok(i32::from(i16::from_be_bytes(buffer)))
    }
}

impl Sense for Converter<'_> {
    type Error = Error;

    fn read_differential(&mut self) -> Result<i32, Error> {
        self.convert(DIFFERENTIAL_0_1)
    }

    fn read_single_ended(&mut self, channel: u8) -> Result<i32, Error> {
        let channel = u16::from(channel.min(3));
        self.convert(SINGLE_ENDED_0 | (channel << 12))
    }
}
