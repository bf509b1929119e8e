use petri_core::{Behavior, FieldView, Movement, OrganismState};
use rand::{Rng, RngCore};

use crate::{AUTHOR, HIGH_MITOSIS_THRESHOLD};

/// Steps toward a uniformly random neighbor, or stays put, every tick.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomWalker;

impl Behavior for RandomWalker {
    fn name(&self) -> &str {
        "Random Walker"
    }

    fn author(&self) -> &str {
        AUTHOR
    }

    fn decide_movement(
        &mut self,
        _organism: &OrganismState,
        _field: &FieldView<'_>,
        rng: &mut dyn RngCore,
    ) -> Movement {
        let dx = rng.gen_range(-1..=1);
        let dy = rng.gen_range(-1..=1);
        Movement::new(dx, dy)
    }

    fn wants_reproduction(&mut self, organism: &OrganismState) -> bool {
        organism.energy > HIGH_MITOSIS_THRESHOLD
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use petri_core::{Cell, CellCoord, ColonyId, Distribution};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn steps_stay_within_one_cell() {
        let cells = vec![Cell::default(); 16];
        let field = FieldView::new(&cells, 4, 4, CellCoord::new(0, 0), Distribution::Famine);
        let organism = OrganismState {
            colony: ColonyId::new(1),
            cell: CellCoord::new(1, 1),
            energy: 100.0,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut walker = RandomWalker;
        let mut seen_still = false;
        let mut seen_moving = false;
        for _ in 0..200 {
            let step = walker.decide_movement(&organism, &field, &mut rng);
            assert!((-1..=1).contains(&step.dx()));
            assert!((-1..=1).contains(&step.dy()));
            seen_still |= step.is_still();
            seen_moving |= !step.is_still();
        }
        assert!(seen_still && seen_moving);
    }

    #[test]
    fn divides_only_when_rich() {
        let mut walker = RandomWalker;
        let mut organism = OrganismState {
            colony: ColonyId::new(1),
            cell: CellCoord::new(0, 0),
            energy: 5000.0,
        };
        assert!(!walker.wants_reproduction(&organism));
        organism.energy = 5000.5;
        assert!(walker.wants_reproduction(&organism));
    }
}
