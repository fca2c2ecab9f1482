#![no_main]
#![no_std]

use eload_firmware as _; // global logger + panicking-behavior

#[rtic::app(device = stm32h7xx_hal::pac, peripherals = true, dispatchers = [EXTI0, EXTI1, EXTI2])]
mod app {
    use fugit::ExtU64;
    use systick_monotonic::Systick;

    use eload_control::input::button::{ActiveLevel, DEFAULT_THRESHOLD};
    use eload_control::input::Inputs;
    use eload_control::{Config, Instant, Instrument};
    use eload_firmware::system::bus::Bus;
    use eload_firmware::system::converter::Converter;
    use eload_firmware::system::dac::Dac;
    use eload_firmware::system::inputs::{Buttons, Encoder};
    use eload_firmware::system::lcd::Lcd;
    use eload_firmware::system::System;

    // Written from interrupts, read and cleared once per iteration of the
    // main loop.
    static INPUTS: Inputs = Inputs::new(DEFAULT_THRESHOLD, ActiveLevel::Low);

    #[monotonic(binds = SysTick, default = true)]
    type Mono = Systick<1000>; // 1 kHz / 1 ms granularity

    #[shared]
    struct Shared {}

    #[local]
    struct Local {
        encoder: Encoder,
        buttons: Buttons,
        bus: Bus,
        instrument: Instrument,
    }

    #[init]
    fn init(cx: init::Context) -> (Shared, Local, init::Monotonics) {
        defmt::info!("INIT");

        let system = System::init(cx.core, cx.device);
        let mono = system.mono;
        let encoder = system.encoder;
        let buttons = system.buttons;
        let bus = system.bus;

        let (a, b) = encoder.phases();
        INPUTS.encoder.latch(a, b);

        let instrument = Instrument::new(&Config::default());

        sample_buttons::spawn().unwrap();

        (
            Shared {},
            Local {
                encoder,
                buttons,
                bus,
                instrument,
            },
            init::Monotonics(mono),
        )
    }

    #[task(binds = EXTI15_10, local = [encoder], priority = 3)]
    fn encoder(cx: encoder::Context) {
        cx.local.encoder.handle_interrupt(&INPUTS.encoder);
    }

    #[task(local = [buttons], priority = 2)]
    fn sample_buttons(cx: sample_buttons::Context) {
        cx.local.buttons.sample(&INPUTS);
        sample_buttons::spawn_after(1.millis()).unwrap();
    }

    #[idle(local = [bus, instrument])]
    fn idle(cx: idle::Context) -> ! {
        let bus: &Bus = cx.local.bus;
        let instrument = cx.local.instrument;
        let mut converter = Converter::new(bus);
        let mut dac = Dac::new(bus);
        let mut lcd = Lcd::new(bus);

        loop {
            let snapshot = INPUTS.snapshot();
            let now = Instant::from_ticks(monotonics::now().ticks() as u32);
            let result = instrument.tick(snapshot, now, &mut converter, &mut dac, &mut lcd);
            if let Err(fault) = result {
                defmt::warn!("Peripheral failed: {}", fault);
            }
        }
    }
}
