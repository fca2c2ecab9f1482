use eload_control::input::encoder::SharedEncoder;

use crate::system::hal::gpio::{self, Edge, ExtiPin};
use crate::system::hal::pac::{EXTI, SYSCFG};

pub type PhaseAPin = gpio::gpiog::PG14<gpio::Input>;
pub type PhaseBPin = gpio::gpiog::PG13<gpio::Input>;

/// Phase pins of the rotary encoder.
///
/// Phase A is the CLK pin of the encoder and phase B its DT pin. Both of them
/// trigger `EXTI15_10` on either edge.
pub struct Encoder {
    phase_a: PhaseAPin,
    phase_b: PhaseBPin,
}

impl Encoder {
    pub fn new(
        mut phase_a: PhaseAPin,
        mut phase_b: PhaseBPin,
        syscfg: &mut SYSCFG,
        exti: &mut EXTI,
    ) -> Self {
        phase_a.make_interrupt_source(syscfg);
        phase_a.trigger_on_edge(exti, Edge::RisingFalling);
        phase_a.enable_interrupt(exti);
        phase_b.make_interrupt_source(syscfg);
        phase_b.trigger_on_edge(exti, Edge::RisingFalling);
        phase_b.enable_interrupt(exti);
        Self { phase_a, phase_b }
    }

    /// Levels of phase A and phase B, `true` being high.
    pub fn phases(&self) -> (bool, bool) {
        (self.phase_a.is_high(), self.phase_b.is_high())
    }

    /// This is meant to be called from the interrupt of the phase pins.
    pub fn handle_interrupt(&mut self, shared: &SharedEncoder) {
        self.phase_a.clear_interrupt_pending_bit();
        self.phase_b.clear_interrupt_pending_bit();
        let (a, b) = self.phases();
        shared.on_edge(a, b);
    }
}
