use petri_core::{Behavior, FieldView, Movement, OrganismState};
use rand::RngCore;

use crate::{AUTHOR, LOW_MITOSIS_THRESHOLD};

/// Axis an [`AxisFollower`] is allowed to move along.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Moves only along `x`.
    Horizontal,
    /// Moves only along `y`.
    Vertical,
}

impl Axis {
    const fn step(self, delta: i32) -> Movement {
        match self {
            Self::Horizontal => Movement::new(delta, 0),
            Self::Vertical => Movement::new(0, delta),
        }
    }
}

/// Follows the nutrient gradient along a single axis.
///
/// The lower side is checked first: the organism steps back if that cell is
/// richer than its own, otherwise forward if the upper side is richer.
#[derive(Clone, Copy, Debug)]
pub struct AxisFollower {
    axis: Axis,
}

impl AxisFollower {
    /// Creates a follower restricted to `axis`.
    #[must_use]
    pub const fn new(axis: Axis) -> Self {
        Self { axis }
    }
}

impl Behavior for AxisFollower {
    fn name(&self) -> &str {
        match self.axis {
            Axis::Horizontal => "MOxx",
            Axis::Vertical => "MOyy",
        }
    }

    fn author(&self) -> &str {
        AUTHOR
    }

    fn decide_movement(
        &mut self,
        organism: &OrganismState,
        field: &FieldView<'_>,
        _rng: &mut dyn RngCore,
    ) -> Movement {
        let here = field.nutrients(organism.cell);
        let behind = self.axis.step(-1);
        let ahead = self.axis.step(1);
        if field.nutrients(organism.cell.offset(behind)) > here {
            behind
        } else if field.nutrients(organism.cell.offset(ahead)) > here {
            ahead
        } else {
            Movement::STILL
        }
    }

    fn wants_reproduction(&mut self, organism: &OrganismState) -> bool {
        organism.energy > LOW_MITOSIS_THRESHOLD
    }
}
