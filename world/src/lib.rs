#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for Petri colony contests.
//!
//! The world owns the [`Field`] and one [`ColonyOverlay`] per colony. All
//! mutation flows through [`apply`]; adapters and systems observe the dish
//! through the read-only functions in [`query`].

mod colony;
mod field;

use petri_core::{
    CellCoord, ColonyId, Command, ConfigError, ContestConfig, ContestPhase, DeathCause, Event,
    Movement, GRACE_TICKS, LIVING_COST, MOVING_COST,
};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub use colony::ColonyOverlay;
pub use field::Field;

/// Fraction of the parent's energy lost when it divides.
const MITOSIS_PENALTY: f64 = 0.01;

/// Fraction of the loser's energy the winner of a fight absorbs.
const COMBAT_SPOILS: f64 = 0.075;

/// Energy nudge applied to the defender when a fight starts even.
const COMBAT_TIE_BREAK: f64 = 0.01;

/// Drift moves the nutrients on the first half of every window of this length.
const DRIFT_WINDOW: u64 = 10;

/// Number of ticks in each drift window during which the nutrients slide.
const DRIFT_ACTIVE_TICKS: u64 = 5;

/// The drift direction is redrawn on active drift ticks that are a multiple of this.
const DRIFT_REDRAW_PERIOD: u64 = 6;

/// Represents the authoritative state of one contest.
#[derive(Debug)]
pub struct World {
    field: Field,
    colonies: Vec<ColonyOverlay>,
    alive: Vec<CellCoord>,
    tick: u64,
    phase: ContestPhase,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates a contest whose random source is seeded from the configuration.
    pub fn new(config: &ContestConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, ChaCha8Rng::seed_from_u64(config.seed()))
    }

    /// Creates a contest driven by the provided random source.
    ///
    /// Each colony receives its starting population on random empty cells
    /// inside the dish, then the nutrient offset and drift are drawn.
    pub fn with_rng(config: &ContestConfig, rng: ChaCha8Rng) -> Result<Self, ConfigError> {
        if config.radius() == 0 {
            return Err(ConfigError::ZeroRadius);
        }
        let field = Field::new(config.radius(), config.distribution());
        config.validate(field.dish_capacity())?;

        let colonies = config
            .colonies()
            .iter()
            .enumerate()
            .map(|(index, setup)| {
                ColonyOverlay::new(
                    ColonyId::from_index(index),
                    field.width(),
                    field.height(),
                    setup.policy(),
                )
            })
            .collect();

        let mut world = Self {
            field,
            colonies,
            alive: Vec::new(),
            tick: 0,
            phase: ContestPhase::Running,
            rng,
        };

        for (index, setup) in config.colonies().iter().enumerate() {
            world.populate(
                ColonyId::from_index(index),
                setup.population(),
                config.starting_energy(),
            );
        }

        let width = i64::from(world.field.width());
        let height = i64::from(world.field.height());
        let x = world.rng.gen_range(0..width) - width / 2;
        let y = world.rng.gen_range(0..height) - height / 2;
        world.field.set_offset(x, y);
        let drift = random_step(&mut world.rng);
        world.field.set_drift(drift);

        tracing::debug!(
            distribution = config.distribution().label(),
            total_nutrients = world.field.total_nutrients(),
            "seeded dish"
        );
        tracing::info!(
            radius = config.radius(),
            first = world.colonies.first().map_or("", ColonyOverlay::name),
            second = world.colonies.get(1).map_or("", ColonyOverlay::name),
            "contest created"
        );

        Ok(world)
    }

    fn populate(&mut self, colony: ColonyId, population: usize, energy: f64) {
        let width = i32::try_from(self.field.width()).unwrap_or(i32::MAX);
        let height = i32::try_from(self.field.height()).unwrap_or(i32::MAX);
        let mut placed = 0;
        while placed < population {
            let cell = CellCoord::new(self.rng.gen_range(0..width), self.rng.gen_range(0..height));
            if self.field.contains(cell) && self.field.is_empty(cell) {
                self.place(colony, cell, energy);
                placed += 1;
            }
        }
    }

    fn overlay_mut(&mut self, colony: ColonyId) -> Option<&mut ColonyOverlay> {
        colony.index().and_then(|index| self.colonies.get_mut(index))
    }

    fn occupant(&self, cell: CellCoord) -> Option<ColonyId> {
        self.field.cell(cell).and_then(|cell| cell.occupant)
    }

    fn energy(&self, cell: CellCoord) -> f64 {
        self.field.cell(cell).map_or(0.0, |cell| cell.energy)
    }

    fn adjust_energy(&mut self, cell: CellCoord, delta: f64) {
        if let Some(cell) = self.field.cell_mut(cell) {
            cell.energy += delta;
        }
    }

    fn set_energy(&mut self, cell: CellCoord, energy: f64) {
        if let Some(cell) = self.field.cell_mut(cell) {
            cell.energy = energy;
        }
    }

    fn place(&mut self, colony: ColonyId, cell: CellCoord, energy: f64) {
        let Some(target) = self.field.cell_mut(cell) else {
            return;
        };
        target.occupant = Some(colony);
        target.energy = energy;
        if let Some(overlay) = self.overlay_mut(colony) {
            overlay.create(cell);
        }
    }

    fn remove(&mut self, cell: CellCoord, cause: DeathCause, out_events: &mut Vec<Event>) {
        let Some(target) = self.field.cell_mut(cell) else {
            return;
        };
        let Some(colony) = target.occupant.take() else {
            return;
        };
        target.energy = 0.0;
        if let Some(overlay) = self.overlay_mut(colony) {
            overlay.kill(cell);
        }
        out_events.push(Event::OrganismDied {
            colony,
            cell,
            cause,
        });
    }

    fn relocate(&mut self, colony: ColonyId, from: CellCoord, to: CellCoord, out_events: &mut Vec<Event>) {
        let energy = self.energy(from);
        if let Some(source) = self.field.cell_mut(from) {
            source.occupant = None;
            source.energy = 0.0;
        }
        if let Some(target) = self.field.cell_mut(to) {
            target.occupant = Some(colony);
            target.energy = energy;
        }
        if let Some(overlay) = self.overlay_mut(colony) {
            overlay.relocate(from, to);
        }
        out_events.push(Event::OrganismMoved { colony, from, to });
    }

    fn advance(&mut self, out_events: &mut Vec<Event>) {
        if self.phase == ContestPhase::Ended {
            return;
        }
        self.tick = self.tick.saturating_add(1);
        out_events.push(Event::TimeAdvanced { tick: self.tick });

        let mut alive = std::mem::take(&mut self.alive);
        alive.clear();
        alive.extend(
            self.field
                .coordinates()
                .filter(|cell| self.occupant(*cell).is_some()),
        );
        let mut order: Vec<usize> = (0..alive.len()).collect();
        order.shuffle(&mut self.rng);

        for index in order {
            if let Some(&cell) = alive.get(index) {
                self.activate(cell, out_events);
            }
        }
        self.alive = alive;

        self.drift_nutrients(out_events);
        self.check_termination(out_events);
    }

    fn activate(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        let Some(colony) = self.occupant(cell) else {
            return;
        };
        let Some(slot) = colony.index().filter(|slot| *slot < self.colonies.len()) else {
            return;
        };

        self.field.feed(cell);
        self.adjust_energy(cell, -LIVING_COST);

        let view = self.field.view();
        self.colonies[slot].live(cell, &view, &mut self.rng);
        let movement = self.colonies[slot].movement_at(cell);
        if !movement.is_still() {
            self.adjust_energy(cell, -MOVING_COST);
        }

        if self.energy(cell) <= 0.0 {
            self.remove(cell, DeathCause::Starvation, out_events);
            return;
        }

        if self.colonies[slot].wants_duplicate_at(cell) {
            self.mitosis(colony, cell, out_events);
        }

        if movement.is_still() {
            return;
        }
        let target = cell.offset(movement.unit_step());
        if !self.field.contains(target) {
            return;
        }
        match self.occupant(target) {
            None => self.relocate(colony, cell, target, out_events),
            Some(other) if other != colony => self.combat(cell, target, out_events),
            Some(_) => {}
        }
    }

    fn mitosis(&mut self, colony: ColonyId, parent: CellCoord, out_events: &mut Vec<Event>) {
        let mut offsets = Movement::NEIGHBORS;
        offsets.shuffle(&mut self.rng);
        let Some(offspring) = offsets
            .into_iter()
            .map(|offset| parent.offset(offset))
            .find(|cell| self.field.contains(*cell) && self.field.is_empty(*cell))
        else {
            return;
        };

        let before = self.energy(parent);
        let energy = before * 0.5 - before * MITOSIS_PENALTY;
        self.set_energy(parent, energy);
        self.place(colony, offspring, energy);
        out_events.push(Event::OrganismDivided {
            colony,
            parent,
            offspring,
            energy,
        });
    }

    fn combat(&mut self, attacker: CellCoord, defender: CellCoord, out_events: &mut Vec<Event>) {
        let attacker_energy = self.energy(attacker);
        let mut defender_energy = self.energy(defender);
        if defender_energy == attacker_energy {
            defender_energy += if self.rng.gen::<f64>() > 0.5 {
                COMBAT_TIE_BREAK
            } else {
                -COMBAT_TIE_BREAK
            };
        }

        let (winner, loser) = if defender_energy > attacker_energy {
            (defender, attacker)
        } else {
            (attacker, defender)
        };
        let difference = (defender_energy - attacker_energy).abs();
        let spoils = COMBAT_SPOILS * self.energy(loser);
        self.adjust_energy(winner, spoils);
        self.adjust_energy(loser, -difference);

        if let (Some(winner_colony), Some(loser_colony)) = (self.occupant(winner), self.occupant(loser)) {
            out_events.push(Event::CombatResolved {
                winner: winner_colony,
                winner_cell: winner,
                loser: loser_colony,
                loser_cell: loser,
            });
        }

        if self.energy(loser) <= 0.0 {
            self.remove(loser, DeathCause::Combat, out_events);
        }
    }

    fn drift_nutrients(&mut self, out_events: &mut Vec<Event>) {
        if self.tick % DRIFT_WINDOW >= DRIFT_ACTIVE_TICKS {
            return;
        }
        if self.tick % DRIFT_REDRAW_PERIOD == 0 {
            let drift = random_step(&mut self.rng);
            self.field.set_drift(drift);
        }
        self.field.shift_nutrients();
        out_events.push(Event::NutrientsDrifted {
            offset: self.field.nutrient_offset(),
        });
    }

    fn check_termination(&mut self, out_events: &mut Vec<Event>) {
        let mut living = self
            .colonies
            .iter()
            .filter(|colony| colony.alive_count() > 0);
        let survivor = living.next().map(ColonyOverlay::id);
        if living.next().is_some() || self.tick <= GRACE_TICKS {
            return;
        }
        self.phase = ContestPhase::Ended;
        tracing::info!(
            tick = self.tick,
            survivor = survivor.map(|colony| colony.get()),
            "contest ended"
        );
        out_events.push(Event::ContestEnded { survivor });
    }
}

fn random_step(rng: &mut ChaCha8Rng) -> Movement {
    let dx = rng.gen_range(-1..=1);
    let dy = rng.gen_range(-1..=1);
    Movement::new(dx, dy)
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick => world.advance(out_events),
        Command::SpawnOrganism {
            colony,
            cell,
            energy,
        } => {
            let known = colony
                .index()
                .is_some_and(|index| index < world.colonies.len());
            if !known || !(energy > 0.0) {
                return;
            }
            if !world.field.contains(cell) || !world.field.is_empty(cell) {
                return;
            }
            world.place(colony, cell, energy);
            out_events.push(Event::OrganismSpawned {
                colony,
                cell,
                energy,
            });
        }
        Command::RemoveOrganism { cell } => {
            world.remove(cell, DeathCause::Removed, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{ColonyOverlay, Field, World};
    use petri_core::{
        CellCoord, ColonyId, ColonyReport, ColonyStats, ContestPhase, FieldStats, FieldView,
    };

    /// Number of ticks simulated so far.
    #[must_use]
    pub fn tick(world: &World) -> u64 {
        world.tick
    }

    /// Current lifecycle phase of the contest.
    #[must_use]
    pub fn phase(world: &World) -> ContestPhase {
        world.phase
    }

    /// Provides read-only access to the dish.
    #[must_use]
    pub fn field(world: &World) -> &Field {
        &world.field
    }

    /// Captures the view handed to policies.
    #[must_use]
    pub fn field_view(world: &World) -> FieldView<'_> {
        world.field.view()
    }

    /// Reports whether the unwrapped coordinate lies inside the dish.
    #[must_use]
    pub fn is_in_dish(world: &World, cell: CellCoord) -> bool {
        world.field.contains(cell)
    }

    /// Current nutrient read offset.
    #[must_use]
    pub fn nutrient_offset(world: &World) -> CellCoord {
        world.field.nutrient_offset()
    }

    /// Colony overlays ordered by identifier.
    #[must_use]
    pub fn colonies(world: &World) -> &[ColonyOverlay] {
        &world.colonies
    }

    /// Overlay of a specific colony.
    #[must_use]
    pub fn colony(world: &World, colony: ColonyId) -> Option<&ColonyOverlay> {
        colony.index().and_then(|index| world.colonies.get(index))
    }

    /// Display name of a colony's policy.
    #[must_use]
    pub fn colony_name(world: &World, colony: ColonyId) -> Option<&str> {
        self::colony(world, colony).map(ColonyOverlay::name)
    }

    /// Author of a colony's policy.
    #[must_use]
    pub fn colony_author(world: &World, colony: ColonyId) -> Option<&str> {
        self::colony(world, colony).map(ColonyOverlay::author)
    }

    /// Scans the dish once and aggregates per-colony population and energy.
    #[must_use]
    pub fn field_stats(world: &World) -> FieldStats {
        let mut colonies: Vec<ColonyStats> = world
            .colonies
            .iter()
            .map(|overlay| ColonyStats {
                colony: overlay.id(),
                alive: 0,
                energy: 0.0,
            })
            .collect();
        let mut nutrients = 0.0;
        for cell in world.field.view().cells() {
            nutrients += cell.nutrients;
            let Some(stats) = cell
                .occupant
                .and_then(|colony| colony.index())
                .and_then(|index| colonies.get_mut(index))
            else {
                continue;
            };
            stats.alive += 1;
            stats.energy += cell.energy;
        }
        FieldStats {
            colonies,
            nutrients,
        }
    }

    /// Final standing of every colony at the current tick.
    #[must_use]
    pub fn colony_reports(world: &World) -> Vec<ColonyReport> {
        let stats = field_stats(world);
        world
            .colonies
            .iter()
            .map(|overlay| {
                let (population, energy) = stats
                    .colony(overlay.id())
                    .map_or((0, 0.0), |stats| (stats.alive, stats.energy));
                ColonyReport {
                    colony: overlay.id(),
                    name: overlay.name().to_owned(),
                    author: overlay.author().to_owned(),
                    population,
                    energy,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use petri_core::{
        Behavior, ColonySetup, Distribution, FieldView, OrganismState, DISH_RADIUS,
    };
    use rand::RngCore;

    #[derive(Debug)]
    struct Still;

    impl Behavior for Still {
        fn name(&self) -> &str {
            "still"
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
            Movement::STILL
        }

        fn wants_reproduction(&mut self, _organism: &OrganismState) -> bool {
            false
        }
    }

    fn still() -> Box<dyn Behavior> {
        Box::new(Still)
    }

    fn empty_world() -> World {
        let config = ContestConfig::from_setups(
            Distribution::Famine,
            vec![
                ColonySetup::new(still).with_population(0),
                ColonySetup::new(still).with_population(0),
            ],
        )
        .with_seed(5);
        World::new(&config).expect("valid config")
    }

    fn spawn(world: &mut World, colony: u32, x: i32, y: i32, energy: f64) {
        let mut events = Vec::new();
        apply(
            world,
            Command::SpawnOrganism {
                colony: ColonyId::new(colony),
                cell: CellCoord::new(x, y),
                energy,
            },
            &mut events,
        );
        assert_eq!(events.len(), 1, "spawn rejected at ({x}, {y})");
    }

    fn energy_at(world: &World, x: i32, y: i32) -> f64 {
        world.energy(CellCoord::new(x, y))
    }

    #[test]
    fn mitosis_splits_energy_evenly_minus_penalty() {
        let mut world = empty_world();
        spawn(&mut world, 1, 25, 25, 1000.0);
        let mut events = Vec::new();

        world.mitosis(ColonyId::new(1), CellCoord::new(25, 25), &mut events);

        assert_eq!(energy_at(&world, 25, 25), 490.0);
        let Some(Event::OrganismDivided {
            offspring, energy, ..
        }) = events.first()
        else {
            panic!("expected a division event, got {events:?}");
        };
        assert_eq!(*energy, 490.0);
        assert_eq!(world.energy(*offspring), 490.0);
        assert_eq!(query::colony(&world, ColonyId::new(1)).map(ColonyOverlay::alive_count), Some(2));
    }

    #[test]
    fn mitosis_without_room_changes_nothing() {
        let mut world = empty_world();
        spawn(&mut world, 1, 25, 25, 1000.0);
        for offset in Movement::NEIGHBORS {
            let cell = CellCoord::new(25, 25).offset(offset);
            spawn(&mut world, 2, cell.x(), cell.y(), 10.0);
        }
        let mut events = Vec::new();

        world.mitosis(ColonyId::new(1), CellCoord::new(25, 25), &mut events);

        assert!(events.is_empty());
        assert_eq!(energy_at(&world, 25, 25), 1000.0);
    }

    #[test]
    fn stronger_attacker_wins_and_defender_survives() {
        let mut world = empty_world();
        spawn(&mut world, 1, 20, 20, 800.0);
        spawn(&mut world, 2, 21, 20, 500.0);
        let mut events = Vec::new();

        world.combat(CellCoord::new(20, 20), CellCoord::new(21, 20), &mut events);

        assert_eq!(energy_at(&world, 20, 20), 837.5);
        assert_eq!(energy_at(&world, 21, 20), 200.0);
        assert_eq!(
            events,
            vec![Event::CombatResolved {
                winner: ColonyId::new(1),
                winner_cell: CellCoord::new(20, 20),
                loser: ColonyId::new(2),
                loser_cell: CellCoord::new(21, 20),
            }]
        );
    }

    #[test]
    fn stronger_defender_wins_and_attacker_stays_put() {
        let mut world = empty_world();
        spawn(&mut world, 1, 20, 20, 500.0);
        spawn(&mut world, 2, 21, 20, 800.0);
        let mut events = Vec::new();

        world.combat(CellCoord::new(20, 20), CellCoord::new(21, 20), &mut events);

        assert_eq!(energy_at(&world, 21, 20), 837.5);
        assert_eq!(energy_at(&world, 20, 20), 200.0);
        assert_eq!(world.occupant(CellCoord::new(20, 20)), Some(ColonyId::new(1)));
    }

    #[test]
    fn crushed_loser_is_removed() {
        let mut world = empty_world();
        spawn(&mut world, 1, 20, 20, 900.0);
        spawn(&mut world, 2, 21, 20, 300.0);
        let mut events = Vec::new();

        world.combat(CellCoord::new(20, 20), CellCoord::new(21, 20), &mut events);

        assert_eq!(energy_at(&world, 20, 20), 922.5);
        assert_eq!(world.occupant(CellCoord::new(21, 20)), None);
        assert_eq!(energy_at(&world, 21, 20), 0.0);
        assert!(events.contains(&Event::OrganismDied {
            colony: ColonyId::new(2),
            cell: CellCoord::new(21, 20),
            cause: DeathCause::Combat,
        }));
        assert_eq!(query::colony(&world, ColonyId::new(2)).map(ColonyOverlay::alive_count), Some(0));
    }

    #[test]
    fn even_fight_is_decided_by_a_nudge() {
        let mut world = empty_world();
        spawn(&mut world, 1, 20, 20, 500.0);
        spawn(&mut world, 2, 21, 20, 500.0);
        let mut events = Vec::new();

        world.combat(CellCoord::new(20, 20), CellCoord::new(21, 20), &mut events);

        let mut energies = [energy_at(&world, 20, 20), energy_at(&world, 21, 20)];
        energies.sort_by(f64::total_cmp);
        assert!((energies[0] - 499.99).abs() < 1e-9);
        assert!((energies[1] - 537.5).abs() < 1e-9);
    }

    #[test]
    fn spawn_rejects_invalid_requests() {
        let mut world = empty_world();
        let mut events = Vec::new();
        for command in [
            Command::SpawnOrganism {
                colony: ColonyId::new(1),
                cell: CellCoord::new(0, 0),
                energy: 10.0,
            },
            Command::SpawnOrganism {
                colony: ColonyId::new(3),
                cell: CellCoord::new(25, 25),
                energy: 10.0,
            },
            Command::SpawnOrganism {
                colony: ColonyId::new(1),
                cell: CellCoord::new(25, 25),
                energy: 0.0,
            },
        ] {
            apply(&mut world, command, &mut events);
        }
        assert!(events.is_empty());
    }

    #[test]
    fn remove_is_idempotent() {
        let mut world = empty_world();
        spawn(&mut world, 2, 30, 30, 50.0);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::RemoveOrganism {
                cell: CellCoord::new(30, 30),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::RemoveOrganism {
                cell: CellCoord::new(30, 30),
            },
            &mut events,
        );
        assert_eq!(events.len(), 1);
        assert_eq!(query::field_stats(&world).living_colonies(), 0);
    }

    #[test]
    fn drift_follows_the_schedule() {
        let mut world = empty_world();
        let mut drifted = Vec::new();
        for _ in 0..10 {
            let mut events = Vec::new();
            apply(&mut world, Command::Tick, &mut events);
            if events
                .iter()
                .any(|event| matches!(event, Event::NutrientsDrifted { .. }))
            {
                drifted.push(query::tick(&world));
            }
        }
        assert_eq!(drifted, vec![1, 2, 3, 4, 10]);
    }

    #[test]
    fn drift_direction_is_redrawn_only_while_drifting() {
        let mut world = empty_world();
        spawn(&mut world, 1, 20, 25, 1000.0);
        spawn(&mut world, 2, 30, 25, 1000.0);
        let marker = Movement::new(2, 0);
        world.field.set_drift(marker);
        let mut events = Vec::new();

        for _ in 0..11 {
            apply(&mut world, Command::Tick, &mut events);
        }
        assert_eq!(query::tick(&world), 11);
        assert_eq!(query::field(&world).drift(), marker);

        apply(&mut world, Command::Tick, &mut events);
        let drift = query::field(&world).drift();
        assert_ne!(drift, marker);
        assert!((-1..=1).contains(&drift.dx()));
        assert!((-1..=1).contains(&drift.dy()));
    }

    #[test]
    fn queries_describe_the_contest() {
        let world = empty_world();
        let field = query::field(&world);
        assert_eq!(field.radius(), DISH_RADIUS);
        assert_eq!(field.distribution(), Distribution::Famine);
        assert_eq!(query::colony_name(&world, ColonyId::new(2)), Some("still"));
        assert_eq!(query::colony_author(&world, ColonyId::new(1)), Some("tests"));
        assert_eq!(query::colony_name(&world, ColonyId::new(3)), None);
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let config = ContestConfig::new(Distribution::Ring, still, still).with_radius(3);
        assert!(matches!(
            World::new(&config),
            Err(ConfigError::Overcrowded { .. })
        ));
        let config = ContestConfig::new(Distribution::Ring, still, still).with_radius(0);
        assert_eq!(World::new(&config).err(), Some(ConfigError::ZeroRadius));
    }
}
