use petri_core::{Behavior, CellCoord, ColonyId, FieldView, Movement, OrganismState};
use rand::{Rng, RngCore};

use crate::{AUTHOR, LOW_MITOSIS_THRESHOLD};

/// Slot of the organism itself inside a [`Neighborhood`].
const CENTER: usize = 4;

/// Single step of a tactical plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tactic {
    /// Step onto the empty neighbor with the most nutrients.
    Eat,
    /// Step onto the first weaker neighbor owned by another colony.
    Kill,
    /// Step toward the strongest neighbor of the same colony.
    Reproduce,
    /// Step toward a random neighbor. Always finds a target.
    Wander,
}

/// Agent that walks an ordered list of tactics and commits to the first one
/// that finds a target.
#[derive(Clone, Copy, Debug)]
pub struct Tactics {
    name: &'static str,
    plan: &'static [Tactic],
}

impl Tactics {
    /// Kill first, then eat, then reproduce, falling back to a random step.
    #[must_use]
    pub const fn first() -> Self {
        Self {
            name: "Tactics 1",
            plan: &[Tactic::Kill, Tactic::Eat, Tactic::Reproduce, Tactic::Wander],
        }
    }

    /// Eat first, then kill, then reproduce. Stays still when nothing matches.
    #[must_use]
    pub const fn second() -> Self {
        Self {
            name: "Tactics 2",
            plan: &[Tactic::Eat, Tactic::Kill, Tactic::Reproduce],
        }
    }

    /// Ordered tactics tried each tick.
    #[must_use]
    pub fn plan(&self) -> &'static [Tactic] {
        self.plan
    }
}

impl Behavior for Tactics {
    fn name(&self) -> &str {
        self.name
    }

    fn author(&self) -> &str {
        AUTHOR
    }

    fn decide_movement(
        &mut self,
        organism: &OrganismState,
        field: &FieldView<'_>,
        rng: &mut dyn RngCore,
    ) -> Movement {
        let neighborhood = Neighborhood::capture(field, organism.cell);
        self.plan
            .iter()
            .find_map(|tactic| match tactic {
                Tactic::Eat => neighborhood.eat(),
                Tactic::Kill => neighborhood.kill(),
                Tactic::Reproduce => neighborhood.reproduce(),
                Tactic::Wander => Some(Movement::new(rng.gen_range(-1..=1), rng.gen_range(-1..=1))),
            })
            .unwrap_or(Movement::STILL)
    }

    fn wants_reproduction(&mut self, organism: &OrganismState) -> bool {
        organism.energy > LOW_MITOSIS_THRESHOLD
    }
}

/// Snapshot of the 3x3 block around an organism, scanned row by row.
#[derive(Clone, Copy, Debug)]
struct Neighborhood {
    occupants: [Option<ColonyId>; 9],
    energies: [f64; 9],
    nutrients: [f64; 9],
}

impl Neighborhood {
    fn capture(field: &FieldView<'_>, center: CellCoord) -> Self {
        let mut snapshot = Self {
            occupants: [None; 9],
            energies: [0.0; 9],
            nutrients: [0.0; 9],
        };
        // Each slot is read at the cell its step lands on: (x + dx, y + dy).
        for slot in 0..9 {
            let cell = center.offset(offset(slot));
            snapshot.occupants[slot] = field.occupant(cell);
            snapshot.energies[slot] = field.energy(cell);
            snapshot.nutrients[slot] = field.nutrients(cell);
        }
        snapshot
    }

    fn eat(&self) -> Option<Movement> {
        strongest(&self.nutrients, |slot| self.occupants[slot].is_none())
    }

    fn kill(&self) -> Option<Movement> {
        let own = self.occupants[CENTER];
        let own_energy = self.energies[CENTER];
        (0..9)
            .find(|&slot| {
                self.occupants[slot].is_some()
                    && self.occupants[slot] != own
                    && self.energies[slot] < own_energy
            })
            .map(offset)
    }

    fn reproduce(&self) -> Option<Movement> {
        let own = self.occupants[CENTER];
        strongest(&self.energies, |slot| {
            slot != CENTER && self.occupants[slot] == own
        })
    }
}

// First slot holding a strictly larger positive value among the eligible ones.
fn strongest(values: &[f64; 9], eligible: impl Fn(usize) -> bool) -> Option<Movement> {
    let mut best: Option<(usize, f64)> = None;
    for (slot, &value) in values.iter().enumerate() {
        let threshold = best.map_or(0.0, |(_, current)| current);
        if eligible(slot) && value > threshold {
            best = Some((slot, value));
        }
    }
    best.map(|(slot, _)| offset(slot))
}

const fn offset(slot: usize) -> Movement {
    Movement::new((slot % 3) as i32 - 1, (slot / 3) as i32 - 1)
}
