//! Structures used to pass the current state of input peripherals.

use super::button::Edge;
use super::encoder::Direction;

/// Input events collected at the start of one main loop iteration.
///
/// `Snapshot` is meant to be passed from the hardware binding to the
/// control package. Both quadrature decoding and button debouncing are done
/// before, the snapshot carries only their single-shot events.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Snapshot {
    pub turn: Option<Direction>,
    pub confirm: Edge,
    pub back: Edge,
    pub pause: Edge,
}

impl Snapshot {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turn.is_none()
            && self.confirm == Edge::None
            && self.back == Edge::None
            && self.pause == Edge::None
    }
}
