use petri_core::{Behavior, FieldView, Movement, OrganismState};
use rand::RngCore;

use crate::AUTHOR;

/// Walks along a fixed diagonal and never divides.
#[derive(Clone, Copy, Debug)]
pub struct DiagonalWalker {
    name: &'static str,
    direction: Movement,
}

impl DiagonalWalker {
    /// Walker heading toward increasing coordinates.
    #[must_use]
    pub const fn ascending() -> Self {
        Self {
            name: "MO++",
            direction: Movement::new(1, 1),
        }
    }

    /// Walker heading toward decreasing coordinates.
    #[must_use]
    pub const fn descending() -> Self {
        Self {
            name: "MO--",
            direction: Movement::new(-1, -1),
        }
    }
}

impl Behavior for DiagonalWalker {
    fn name(&self) -> &str {
        self.name
    }

    fn author(&self) -> &str {
        AUTHOR
    }

    fn decide_movement(
        &mut self,
        _organism: &OrganismState,
        _field: &FieldView<'_>,
        _rng: &mut dyn RngCore,
    ) -> Movement {
        self.direction
    }

    fn wants_reproduction(&mut self, _organism: &OrganismState) -> bool {
        false
    }
}
