use petri_core::{
    Behavior, BehaviorFactory, CellCoord, ColonyId, FieldView, Movement, OrganismState,
};
use rand::RngCore;

/// Per-colony overlay holding organism instances and their cached decisions.
///
/// The overlay shares the field's coordinate space. Coordinates outside the
/// grid are ignored by every mutator and read as neutral defaults.
#[derive(Debug)]
pub struct ColonyOverlay {
    id: ColonyId,
    width: u32,
    height: u32,
    organisms: Vec<Option<Box<dyn Behavior>>>,
    movements: Vec<Movement>,
    duplicates: Vec<bool>,
    alive: usize,
    factory: BehaviorFactory,
    prototype: Box<dyn Behavior>,
}

impl ColonyOverlay {
    pub(crate) fn new(id: ColonyId, width: u32, height: u32, factory: BehaviorFactory) -> Self {
        let capacity = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
        let mut organisms = Vec::with_capacity(capacity);
        organisms.resize_with(capacity, || None);
        Self {
            id,
            width,
            height,
            organisms,
            movements: vec![Movement::STILL; capacity],
            duplicates: vec![false; capacity],
            alive: 0,
            factory,
            prototype: factory(),
        }
    }

    /// Identifier of the colony.
    #[must_use]
    pub const fn id(&self) -> ColonyId {
        self.id
    }

    /// Number of organisms currently alive.
    #[must_use]
    pub const fn alive_count(&self) -> usize {
        self.alive
    }

    /// Display name of the colony's policy.
    #[must_use]
    pub fn name(&self) -> &str {
        self.prototype.name()
    }

    /// Author of the colony's policy.
    #[must_use]
    pub fn author(&self) -> &str {
        self.prototype.author()
    }

    /// Reports whether an organism of this colony occupies the cell.
    #[must_use]
    pub fn is_occupied(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.organisms.get(index))
            .is_some_and(Option::is_some)
    }

    /// Movement cached by the last decision taken on the cell.
    #[must_use]
    pub fn movement_at(&self, cell: CellCoord) -> Movement {
        self.index(cell)
            .and_then(|index| self.movements.get(index).copied())
            .unwrap_or(Movement::STILL)
    }

    /// Reports whether the cached movement on the cell is non-zero.
    #[must_use]
    pub fn moved_at(&self, cell: CellCoord) -> bool {
        !self.movement_at(cell).is_still()
    }

    /// Reproduction intent cached by the last decision taken on the cell.
    #[must_use]
    pub fn wants_duplicate_at(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.duplicates.get(index).copied())
            .unwrap_or(false)
    }

    /// Lets the organism on `cell` decide, caching its movement and intent.
    ///
    /// Clears stale cached decisions when the cell holds no organism.
    pub(crate) fn live(&mut self, cell: CellCoord, field: &FieldView<'_>, rng: &mut dyn RngCore) {
        let Some(index) = self.index(cell) else {
            return;
        };
        let state = OrganismState {
            colony: self.id,
            cell,
            energy: field.energy(cell),
        };
        let decision = self.organisms.get_mut(index).and_then(Option::as_mut).map(|organism| {
            let movement = organism.decide_movement(&state, field, rng);
            let duplicate = organism.wants_reproduction(&state);
            (movement, duplicate)
        });
        let (movement, duplicate) = decision.unwrap_or((Movement::STILL, false));
        self.cache(index, movement, duplicate);
    }

    /// Materializes a new organism. Occupied cells are left untouched.
    pub(crate) fn create(&mut self, cell: CellCoord) {
        let Some(slot) = self.index(cell).and_then(|index| self.organisms.get_mut(index)) else {
            return;
        };
        if slot.is_none() {
            *slot = Some((self.factory)());
            self.alive += 1;
        }
    }

    /// Drops the organism on `cell`, if any.
    pub(crate) fn kill(&mut self, cell: CellCoord) {
        let Some(index) = self.index(cell) else {
            return;
        };
        let removed = self.organisms.get_mut(index).and_then(Option::take);
        if removed.is_some() {
            self.alive = self.alive.saturating_sub(1);
            self.cache(index, Movement::STILL, false);
        }
    }

    /// Carries the organism instance from `from` to `to`.
    pub(crate) fn relocate(&mut self, from: CellCoord, to: CellCoord) {
        let (Some(source), Some(target)) = (self.index(from), self.index(to)) else {
            return;
        };
        let organism = self.organisms.get_mut(source).and_then(Option::take);
        if let Some(slot) = self.organisms.get_mut(target) {
            *slot = organism;
        }
        self.cache(source, Movement::STILL, false);
    }

    fn cache(&mut self, index: usize, movement: Movement, duplicate: bool) {
        if let Some(slot) = self.movements.get_mut(index) {
            *slot = movement;
        }
        if let Some(slot) = self.duplicates.get_mut(index) {
            *slot = duplicate;
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        let column = u32::try_from(cell.x()).ok()?;
        let row = u32::try_from(cell.y()).ok()?;
        if column >= self.width || row >= self.height {
            return None;
        }
        let width = usize::try_from(self.width).ok()?;
        Some(usize::try_from(row).ok()? * width + usize::try_from(column).ok()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use petri_core::{Cell, Distribution};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[derive(Debug)]
    struct Eager;

    impl Behavior for Eager {
        fn name(&self) -> &str {
            "eager"
        }

        fn author(&self) -> &str {
            "tests"
        }

        fn decide_movement(
            &mut self,
            _organism: &OrganismState,
            _field: &FieldView<'_>,
            _rng: &mut dyn RngCore,
        ) -> Movement {
            Movement::new(0, 1)
        }

        fn wants_reproduction(&mut self, organism: &OrganismState) -> bool {
            organism.energy > 10.0
        }
    }

    fn eager() -> Box<dyn Behavior> {
        Box::new(Eager)
    }

    fn overlay() -> ColonyOverlay {
        ColonyOverlay::new(ColonyId::new(1), 4, 4, eager)
    }

    #[test]
    fn live_caches_decisions_and_clears_empty_cells() {
        let mut colony = overlay();
        let mut cells = vec![Cell::default(); 16];
        cells[5].energy = 20.0;
        let field = FieldView::new(&cells, 4, 4, CellCoord::new(0, 0), Distribution::Famine);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let cell = CellCoord::new(1, 1);

        colony.create(cell);
        colony.live(cell, &field, &mut rng);
        assert_eq!(colony.movement_at(cell), Movement::new(0, 1));
        assert!(colony.moved_at(cell));
        assert!(colony.wants_duplicate_at(cell));

        colony.relocate(cell, CellCoord::new(2, 2));
        assert!(!colony.moved_at(cell));
        assert!(!colony.wants_duplicate_at(cell));
        assert!(colony.is_occupied(CellCoord::new(2, 2)));

        colony.live(CellCoord::new(2, 2), &field, &mut rng);
        assert!(!colony.wants_duplicate_at(CellCoord::new(2, 2)));
        colony.live(cell, &field, &mut rng);
        assert!(!colony.moved_at(cell));
    }

    #[test]
    fn create_and_kill_track_alive_count() {
        let mut colony = overlay();
        colony.create(CellCoord::new(0, 0));
        colony.create(CellCoord::new(0, 0));
        colony.create(CellCoord::new(3, 3));
        assert_eq!(colony.alive_count(), 2);

        colony.kill(CellCoord::new(0, 0));
        colony.kill(CellCoord::new(0, 0));
        assert_eq!(colony.alive_count(), 1);
        assert!(!colony.is_occupied(CellCoord::new(0, 0)));
    }

    #[test]
    fn out_of_range_coordinates_are_ignored() {
        let mut colony = overlay();
        colony.create(CellCoord::new(4, 0));
        colony.create(CellCoord::new(-1, 2));
        colony.kill(CellCoord::new(9, 9));
        colony.relocate(CellCoord::new(-3, 0), CellCoord::new(1, 1));
        assert_eq!(colony.alive_count(), 0);
        assert_eq!(colony.movement_at(CellCoord::new(7, 7)), Movement::STILL);
        assert!(!colony.wants_duplicate_at(CellCoord::new(-1, -1)));
    }

    #[test]
    fn metadata_comes_from_the_prototype() {
        let colony = overlay();
        assert_eq!(colony.name(), "eager");
        assert_eq!(colony.author(), "tests");
        assert_eq!(colony.id(), ColonyId::new(1));
    }
}
