use petri_core::{Behavior, FieldView, Movement, OrganismState};
use rand::RngCore;

use crate::{AUTHOR, HIGH_MITOSIS_THRESHOLD};

/// Greedy climber that steps onto the richest cell of its 3x3 neighborhood.
///
/// Columns are scanned before rows and only a strictly richer cell replaces
/// the current best, so ties keep the earliest candidate and a flat
/// neighborhood keeps the organism still.
#[derive(Clone, Copy, Debug, Default)]
pub struct NutrientSeeker;

impl Behavior for NutrientSeeker {
    fn name(&self) -> &str {
        "Nutrient Seeker"
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
        let mut best = Movement::STILL;
        for dx in -1..=1 {
            for dy in -1..=1 {
                let candidate = Movement::new(dx, dy);
                if field.nutrients(organism.cell.offset(candidate))
                    > field.nutrients(organism.cell.offset(best))
                {
                    best = candidate;
                }
            }
        }
        best
    }

    fn wants_reproduction(&mut self, organism: &OrganismState) -> bool {
        organism.energy > HIGH_MITOSIS_THRESHOLD
    }
}
