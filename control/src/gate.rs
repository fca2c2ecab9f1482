//! Periodic gate deciding when the display gets repainted.

use crate::{Duration, Instant};

pub const DEFAULT_PERIOD: Duration = Duration::from_ticks(300);

/// Decouples the rate of painting from the rate of the main loop.
///
/// The gate fires once per period, keeping the phase of the period steady
/// instead of restarting it from the moment it was polled. When the loop
/// falls behind by more than a whole period, the missed periods are dropped
/// rather than fired in a burst. After [`RenderGate::reset`], the gate fires
/// on the very next poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RenderGate {
    last_fire: Instant,
    period: Duration,
    pending: bool,
}

impl RenderGate {
    /// The gate starts pending, firing on the first poll.
    #[must_use]
    pub fn new(period: Duration) -> Self {
        Self {
            last_fire: Instant::from_ticks(0),
            period,
            pending: true,
        }
    }

    pub fn reset(&mut self) {
        self.pending = true;
    }

    /// Returns whether the screen should be painted now. Never blocks.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.pending {
            self.pending = false;
            self.last_fire = now;
            return true;
        }

        let period = self.period.ticks();
        let elapsed = now.ticks().wrapping_sub(self.last_fire.ticks());
        if elapsed < period {
            return false;
        }

        self.last_fire = if elapsed - period >= period {
            now
        } else {
            Instant::from_ticks(self.last_fire.ticks().wrapping_add(period))
        };

        true
    }
}

impl Default for RenderGate {
    fn default() -> Self {
        Self::new(DEFAULT_PERIOD)
    }
}
