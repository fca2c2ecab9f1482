pub mod bus;
pub mod converter;
pub mod dac;
pub mod inputs;
pub mod lcd;

pub use daisy::hal;

use eload_control::peripherals::Actuator;
use hal::pac::CorePeripherals;
use hal::pac::Peripherals as DevicePeripherals;
use hal::prelude::*;
use systick_monotonic::Systick;

use bus::Bus;
use dac::Dac;
use inputs::{Buttons, ButtonsPins, Encoder};
use lcd::Lcd;

pub struct System {
    pub mono: Systick<1000>,
    pub encoder: Encoder,
    pub buttons: Buttons,
    pub bus: Bus,
}

impl System {
    /// Initialize system abstraction
    ///
    /// The output of the load is set to zero and the display is reset
    /// before this returns.
    ///
    /// # Panics
    ///
    /// The system can be initialized only once. It panics otherwise. It
    /// also panics when the DAC or the display do not respond.
    #[must_use]
    pub fn init(mut cp: CorePeripherals, dp: DevicePeripherals) -> Self {
        enable_cache(&mut cp);

        let board = daisy::Board::take().unwrap();
        let ccdr = daisy::board_freeze_clocks!(board, dp);
        let pins = daisy::board_split_gpios!(board, ccdr, dp);

        let mut syscfg = dp.SYSCFG;
        let mut exti = dp.EXTI;

        let i2c = dp.I2C1.i2c(
            (
                pins.GPIO.PIN_B7.into_alternate_open_drain(),
                pins.GPIO.PIN_B8.into_alternate_open_drain(),
            ),
            400.kHz(),
            ccdr.peripheral.I2C1,
            &ccdr.clocks,
        );
        let bus = Bus::new(i2c);
        Dac::new(&bus).set_output(0).unwrap();
        Lcd::new(&bus).init().unwrap();

        let encoder = Encoder::new(
            pins.GPIO.PIN_B10.into_pull_up_input(),
            pins.GPIO.PIN_B9.into_pull_up_input(),
            &mut syscfg,
            &mut exti,
        );
        let buttons = Buttons::new(ButtonsPins {
            confirm: pins.GPIO.PIN_A9.into_pull_up_input(),
            back: pins.GPIO.PIN_A8.into_pull_up_input(),
            pause: pins.GPIO.PIN_A3.into_pull_up_input(),
        });

        let mono = Systick::new(cp.SYST, 480_000_000);

        Self {
            mono,
            encoder,
            buttons,
            bus,
        }
    }
}

/// AN5212: Improve application performance when fetching instruction and
/// data, from both internal and external memories.
fn enable_cache(cp: &mut CorePeripherals) {
    cp.SCB.enable_icache();
    cp.SCB.enable_dcache(&mut cp.CPUID);
}
