#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Petri colony contest engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Behavior policies never mutate the dish: they
//! observe it through a [`FieldView`] and answer with a [`Movement`] and a
//! reproduction intent.

use std::fmt;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Relative maximum of every nutrient distribution.
pub const MAX_NUTRIENT: f64 = 5000.0;

/// Number of organisms each colony receives when a contest starts.
pub const INITIAL_POPULATION: usize = 50;

/// Energy assigned to every organism placed at contest start.
pub const INITIAL_ENERGY: f64 = 1000.0;

/// Energy every organism pays per tick for staying alive.
pub const LIVING_COST: f64 = 5.0;

/// Additional energy paid by an organism that requests a movement.
pub const MOVING_COST: f64 = 10.0;

/// Radius of the dish used by regular contests.
pub const DISH_RADIUS: u32 = 25;

/// Number of colonies competing in a contest.
pub const CONTEST_COLONIES: usize = 2;

/// Ticks that must elapse before a contest may end naturally.
pub const GRACE_TICKS: u64 = 10;

/// Tick count after which callers force an unresolved contest to stop.
pub const SAFETY_TICK_LIMIT: u64 = 10_000;

/// One-based identifier of a colony. Identifier `1` maps to the first colony.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ColonyId(u32);

impl ColonyId {
    /// Creates a colony identifier from its one-based numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Creates the identifier of the colony stored at the zero-based `index`.
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self(u32::try_from(index).map_or(u32::MAX, |value| value.saturating_add(1)))
    }

    /// Retrieves the one-based numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Zero-based slot of the colony, or `None` for the reserved value zero.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        usize::try_from(self.0).ok()?.checked_sub(1)
    }
}

impl fmt::Display for ColonyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Absolute grid coordinate. Signed so neighbor arithmetic may leave the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    x: i32,
    y: i32,
}

impl CellCoord {
    /// Creates a new grid coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal component of the coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical component of the coordinate.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Coordinate reached by applying `movement` without any wrapping.
    #[must_use]
    pub const fn offset(self, movement: Movement) -> Self {
        Self {
            x: self.x.saturating_add(movement.dx),
            y: self.y.saturating_add(movement.dy),
        }
    }
}

/// Relative displacement requested by an organism.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Movement {
    dx: i32,
    dy: i32,
}

impl Movement {
    /// Movement that keeps the organism in place.
    pub const STILL: Self = Self::new(0, 0);

    /// The eight single-step offsets surrounding a cell.
    pub const NEIGHBORS: [Self; 8] = [
        Self::new(-1, -1),
        Self::new(-1, 0),
        Self::new(-1, 1),
        Self::new(0, -1),
        Self::new(0, 1),
        Self::new(1, -1),
        Self::new(1, 0),
        Self::new(1, 1),
    ];

    /// Creates a movement from raw deltas.
    #[must_use]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Horizontal delta.
    #[must_use]
    pub const fn dx(&self) -> i32 {
        self.dx
    }

    /// Vertical delta.
    #[must_use]
    pub const fn dy(&self) -> i32 {
        self.dy
    }

    /// Reports whether the movement leaves the organism where it is.
    #[must_use]
    pub const fn is_still(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }

    /// Reduces each axis to its sign so any request becomes a single step.
    #[must_use]
    pub const fn unit_step(self) -> Self {
        Self {
            dx: self.dx.signum(),
            dy: self.dy.signum(),
        }
    }
}

/// Single square of the dish.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Cell {
    /// Colony owning the organism on this cell, if any.
    pub occupant: Option<ColonyId>,
    /// Energy of the occupying organism; zero when the cell is empty.
    pub energy: f64,
    /// Nutrients available on this cell.
    pub nutrients: f64,
}

/// Nutrient layouts available when seeding the dish.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Distribution {
    /// Plane that declines from the origin corner toward the far corner.
    InclinedPlane,
    /// Narrow vertical band through the middle of the dish.
    VerticalBar,
    /// Thin ring around the dish center.
    Ring,
    /// Two diagonal lattices over an inclined plane.
    Lattice,
    /// Two gaussian bumps on the main diagonal.
    TwoGaussians,
    /// Low uniform supply everywhere.
    Famine,
}

impl Distribution {
    /// Every distribution in selector order.
    pub const ALL: [Self; 6] = [
        Self::InclinedPlane,
        Self::VerticalBar,
        Self::Ring,
        Self::Lattice,
        Self::TwoGaussians,
        Self::Famine,
    ];

    /// Numeric selector understood by the nutrient generator (`1..=6`).
    #[must_use]
    pub const fn id(self) -> u32 {
        match self {
            Self::InclinedPlane => 1,
            Self::VerticalBar => 2,
            Self::Ring => 3,
            Self::Lattice => 4,
            Self::TwoGaussians => 5,
            Self::Famine => 6,
        }
    }

    /// Resolves a numeric selector, rejecting identifiers outside `1..=6`.
    pub fn from_id(id: u32) -> Result<Self, ConfigError> {
        Self::ALL
            .into_iter()
            .find(|distribution| distribution.id() == id)
            .ok_or(ConfigError::UnknownDistribution(id))
    }

    /// Human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::InclinedPlane => "inclined plane",
            Self::VerticalBar => "vertical bar",
            Self::Ring => "ring",
            Self::Lattice => "lattice",
            Self::TwoGaussians => "two gaussians",
            Self::Famine => "famine",
        }
    }
}

/// Read-only view over the dish handed to policies and adapters.
///
/// Occupancy and energy reads wrap toroidally. Nutrient reads are shifted by
/// the drifting nutrient offset before wrapping, so the nutrient field slides
/// underneath a fixed dish.
#[derive(Clone, Copy, Debug)]
pub struct FieldView<'a> {
    cells: &'a [Cell],
    width: u32,
    height: u32,
    nutrient_offset: CellCoord,
    distribution: Distribution,
}

impl<'a> FieldView<'a> {
    /// Captures a new view backed by the provided row-major cell slice.
    #[must_use]
    pub fn new(
        cells: &'a [Cell],
        width: u32,
        height: u32,
        nutrient_offset: CellCoord,
        distribution: Distribution,
    ) -> Self {
        Self {
            cells,
            width,
            height,
            nutrient_offset,
            distribution,
        }
    }

    /// Colony occupying the cell, if any.
    #[must_use]
    pub fn occupant(&self, cell: CellCoord) -> Option<ColonyId> {
        self.wrapped(i64::from(cell.x()), i64::from(cell.y()))
            .and_then(|cell| cell.occupant)
    }

    /// Energy of the organism occupying the cell, zero when empty.
    #[must_use]
    pub fn energy(&self, cell: CellCoord) -> f64 {
        self.wrapped(i64::from(cell.x()), i64::from(cell.y()))
            .map_or(0.0, |cell| cell.energy)
    }

    /// Nutrients currently drifting over the cell.
    #[must_use]
    pub fn nutrients(&self, cell: CellCoord) -> f64 {
        let x = i64::from(cell.x()) + i64::from(self.nutrient_offset.x());
        let y = i64::from(cell.y()) + i64::from(self.nutrient_offset.y());
        self.wrapped(x, y).map_or(0.0, |cell| cell.nutrients)
    }

    /// Width of the grid in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the grid in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Nutrient distribution the dish was seeded with.
    #[must_use]
    pub const fn distribution(&self) -> Distribution {
        self.distribution
    }

    /// Current nutrient read offset.
    #[must_use]
    pub const fn nutrient_offset(&self) -> CellCoord {
        self.nutrient_offset
    }

    /// Raw row-major cells without any offset applied.
    #[must_use]
    pub fn cells(&self) -> &'a [Cell] {
        self.cells
    }

    fn wrapped(&self, x: i64, y: i64) -> Option<&'a Cell> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        let width = i64::from(self.width);
        let column = usize::try_from(x.rem_euclid(width)).ok()?;
        let row = usize::try_from(y.rem_euclid(i64::from(self.height))).ok()?;
        let width = usize::try_from(self.width).ok()?;
        self.cells.get(row * width + column)
    }
}

/// State pushed into an organism before it decides.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrganismState {
    /// Colony the organism belongs to.
    pub colony: ColonyId,
    /// Absolute cell the organism occupies.
    pub cell: CellCoord,
    /// Energy the organism holds right now.
    pub energy: f64,
}

/// Contract implemented by every behavior policy.
///
/// The engine owns one instance per living organism. Implementations may keep
/// private fields across ticks but must not rely on anything else surviving.
pub trait Behavior: fmt::Debug {
    /// Display name of the policy.
    fn name(&self) -> &str;

    /// Author credited for the policy.
    fn author(&self) -> &str;

    /// Chooses the relative movement for this tick.
    ///
    /// Well-behaved policies keep each component in `-1..=1`. Larger requests
    /// are reduced to a unit step by sign before the move is validated.
    fn decide_movement(
        &mut self,
        organism: &OrganismState,
        field: &FieldView<'_>,
        rng: &mut dyn RngCore,
    ) -> Movement;

    /// Reports whether the organism wants to divide this tick.
    fn wants_reproduction(&mut self, organism: &OrganismState) -> bool;
}

/// Constructor used to materialize organisms of one policy.
pub type BehaviorFactory = fn() -> Box<dyn Behavior>;

/// Starting setup of a single colony.
#[derive(Clone, Copy, Debug)]
pub struct ColonySetup {
    policy: BehaviorFactory,
    population: usize,
}

impl ColonySetup {
    /// Creates a colony setup with the default starting population.
    #[must_use]
    pub fn new(policy: BehaviorFactory) -> Self {
        Self {
            policy,
            population: INITIAL_POPULATION,
        }
    }

    /// Overrides the number of organisms placed at contest start.
    #[must_use]
    pub fn with_population(mut self, population: usize) -> Self {
        self.population = population;
        self
    }

    /// Factory building this colony's organisms.
    #[must_use]
    pub fn policy(&self) -> BehaviorFactory {
        self.policy
    }

    /// Number of organisms placed at contest start.
    #[must_use]
    pub const fn population(&self) -> usize {
        self.population
    }
}

/// Construction input for a contest.
#[derive(Clone, Debug)]
pub struct ContestConfig {
    radius: u32,
    distribution: Distribution,
    colonies: Vec<ColonySetup>,
    starting_energy: f64,
    seed: u64,
}

impl ContestConfig {
    /// Creates a two-colony contest with the default radius, population and energy.
    #[must_use]
    pub fn new(distribution: Distribution, first: BehaviorFactory, second: BehaviorFactory) -> Self {
        Self {
            radius: DISH_RADIUS,
            distribution,
            colonies: vec![ColonySetup::new(first), ColonySetup::new(second)],
            starting_energy: INITIAL_ENERGY,
            seed: 0,
        }
    }

    /// Creates a contest from explicit colony setups.
    #[must_use]
    pub fn from_setups(distribution: Distribution, colonies: Vec<ColonySetup>) -> Self {
        Self {
            radius: DISH_RADIUS,
            distribution,
            colonies,
            starting_energy: INITIAL_ENERGY,
            seed: 0,
        }
    }

    /// Overrides the dish radius.
    #[must_use]
    pub fn with_radius(mut self, radius: u32) -> Self {
        self.radius = radius;
        self
    }

    /// Overrides the starting population of every colony.
    #[must_use]
    pub fn with_population(mut self, population: usize) -> Self {
        for colony in &mut self.colonies {
            *colony = colony.with_population(population);
        }
        self
    }

    /// Overrides the energy assigned to organisms placed at contest start.
    #[must_use]
    pub fn with_starting_energy(mut self, energy: f64) -> Self {
        self.starting_energy = energy;
        self
    }

    /// Seeds the random source driving placement, activation order and policies.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Dish radius in cells.
    #[must_use]
    pub const fn radius(&self) -> u32 {
        self.radius
    }

    /// Nutrient distribution used to seed the dish.
    #[must_use]
    pub const fn distribution(&self) -> Distribution {
        self.distribution
    }

    /// Colony setups ordered by colony identifier.
    #[must_use]
    pub fn colonies(&self) -> &[ColonySetup] {
        &self.colonies
    }

    /// Energy of organisms placed at contest start.
    #[must_use]
    pub const fn starting_energy(&self) -> f64 {
        self.starting_energy
    }

    /// Seed of the contest's random source.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Checks the configuration against the provided dish capacity.
    pub fn validate(&self, dish_capacity: usize) -> Result<(), ConfigError> {
        if self.radius == 0 {
            return Err(ConfigError::ZeroRadius);
        }
        if self.colonies.len() != CONTEST_COLONIES {
            return Err(ConfigError::ColonyCount {
                expected: CONTEST_COLONIES,
                actual: self.colonies.len(),
            });
        }
        if !(self.starting_energy > 0.0) {
            return Err(ConfigError::StartingEnergy(self.starting_energy));
        }
        let requested = self
            .colonies
            .iter()
            .map(ColonySetup::population)
            .fold(0usize, usize::saturating_add);
        if requested > dish_capacity {
            return Err(ConfigError::Overcrowded {
                requested,
                capacity: dish_capacity,
            });
        }
        Ok(())
    }
}

/// Configuration failures surfaced while constructing a contest.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The nutrient selector is outside the supported range.
    #[error("unknown nutrient distribution {0}, expected an id between 1 and 6")]
    UnknownDistribution(u32),
    /// The dish radius must be at least one cell.
    #[error("dish radius must be positive")]
    ZeroRadius,
    /// A contest needs exactly two colonies.
    #[error("a contest requires exactly {expected} colonies, got {actual}")]
    ColonyCount {
        /// Number of colonies a contest requires.
        expected: usize,
        /// Number of colonies supplied.
        actual: usize,
    },
    /// Starting energy must be strictly positive.
    #[error("starting energy must be positive, got {0}")]
    StartingEnergy(f64),
    /// The starting populations do not fit inside the dish.
    #[error("{requested} organisms requested but the dish only holds {capacity}")]
    Overcrowded {
        /// Total starting population requested.
        requested: usize,
        /// Number of cells inside the dish.
        capacity: usize,
    },
    /// The policy selector does not match any catalogue entry.
    #[error("unknown behavior policy `{0}`")]
    UnknownPolicy(String),
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the contest by one tick.
    Tick,
    /// Places an organism on an empty cell inside the dish.
    SpawnOrganism {
        /// Colony the organism joins.
        colony: ColonyId,
        /// Cell receiving the organism.
        cell: CellCoord,
        /// Energy assigned to the organism.
        energy: f64,
    },
    /// Removes whatever organism occupies the cell.
    RemoveOrganism {
        /// Cell to clear.
        cell: CellCoord,
    },
}

/// Reason an organism left the dish.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeathCause {
    /// Energy dropped to zero while living or moving.
    Starvation,
    /// Lost a fight against another colony.
    Combat,
    /// Removed by an explicit command.
    Removed,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the contest clock advanced.
    TimeAdvanced {
        /// Tick that was just simulated.
        tick: u64,
    },
    /// Confirms that an organism was placed on the dish.
    OrganismSpawned {
        /// Colony of the new organism.
        colony: ColonyId,
        /// Cell the organism occupies.
        cell: CellCoord,
        /// Energy assigned to the organism.
        energy: f64,
    },
    /// Confirms that an organism divided.
    OrganismDivided {
        /// Colony of both organisms.
        colony: ColonyId,
        /// Cell of the parent.
        parent: CellCoord,
        /// Cell of the offspring.
        offspring: CellCoord,
        /// Energy both organisms hold after the division.
        energy: f64,
    },
    /// Confirms that an organism moved between two cells.
    OrganismMoved {
        /// Colony of the organism.
        colony: ColonyId,
        /// Cell occupied before the move.
        from: CellCoord,
        /// Cell occupied after the move.
        to: CellCoord,
    },
    /// Reports the outcome of a fight between two colonies.
    CombatResolved {
        /// Colony that won.
        winner: ColonyId,
        /// Cell of the winner, which never changes during a fight.
        winner_cell: CellCoord,
        /// Colony that lost.
        loser: ColonyId,
        /// Cell of the loser.
        loser_cell: CellCoord,
    },
    /// Reports that an organism left the dish.
    OrganismDied {
        /// Colony of the organism.
        colony: ColonyId,
        /// Cell the organism occupied.
        cell: CellCoord,
        /// Reason the organism died.
        cause: DeathCause,
    },
    /// Reports that the nutrient field slid under the dish.
    NutrientsDrifted {
        /// New nutrient read offset.
        offset: CellCoord,
    },
    /// Announces that at most one colony survives.
    ContestEnded {
        /// Colony still alive, if any.
        survivor: Option<ColonyId>,
    },
}

/// Lifecycle of a contest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContestPhase {
    /// Ticks are still being simulated.
    Running,
    /// At most one colony survives; further ticks are ignored.
    Ended,
}

/// Aggregate statistics of a single colony.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColonyStats {
    /// Colony described by the statistics.
    pub colony: ColonyId,
    /// Number of living organisms.
    pub alive: usize,
    /// Total energy held by living organisms.
    pub energy: f64,
}

/// Statistics gathered by scanning the dish once.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldStats {
    /// Per-colony statistics ordered by colony identifier.
    pub colonies: Vec<ColonyStats>,
    /// Total nutrients left in the dish.
    pub nutrients: f64,
}

impl FieldStats {
    /// Number of colonies with at least one living organism.
    #[must_use]
    pub fn living_colonies(&self) -> usize {
        self.colonies.iter().filter(|stats| stats.alive > 0).count()
    }

    /// Statistics for a specific colony.
    #[must_use]
    pub fn colony(&self, colony: ColonyId) -> Option<&ColonyStats> {
        self.colonies.iter().find(|stats| stats.colony == colony)
    }
}

/// Final standing of one colony.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColonyReport {
    /// Colony described by the report.
    pub colony: ColonyId,
    /// Display name of the colony's policy.
    pub name: String,
    /// Author of the colony's policy.
    pub author: String,
    /// Organisms alive when the contest stopped.
    pub population: usize,
    /// Total energy held when the contest stopped.
    pub energy: f64,
}

/// Decision reached by a contest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The colony with the strictly largest final population.
    Winner(ColonyId),
    /// Final populations tie.
    Draw,
}

/// Structured record produced when a contest stops.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContestResult {
    /// Final standings ordered by colony identifier.
    pub colonies: Vec<ColonyReport>,
    /// Winner or draw.
    pub outcome: Outcome,
    /// Ticks simulated.
    pub ticks: u64,
    /// `true` when the contest ended naturally rather than being cut off.
    pub completed: bool,
}

impl ContestResult {
    /// Builds a result, deciding the outcome from the final populations.
    #[must_use]
    pub fn new(colonies: Vec<ColonyReport>, ticks: u64, completed: bool) -> Self {
        let outcome = decide_outcome(&colonies);
        Self {
            colonies,
            outcome,
            ticks,
            completed,
        }
    }

    /// Report of the winning colony, if the contest was not a draw.
    #[must_use]
    pub fn winner(&self) -> Option<&ColonyReport> {
        match self.outcome {
            Outcome::Winner(colony) => self.colonies.iter().find(|report| report.colony == colony),
            Outcome::Draw => None,
        }
    }

    /// Points awarded to the winner: its final population, or zero on a draw.
    #[must_use]
    pub fn points(&self) -> usize {
        self.winner().map_or(0, |report| report.population)
    }

    /// Names of the competing colonies joined as `"A vs B"`.
    #[must_use]
    pub fn matchup(&self) -> String {
        self.colonies
            .iter()
            .map(|report| report.name.as_str())
            .collect::<Vec<_>>()
            .join(" vs ")
    }
}

fn decide_outcome(colonies: &[ColonyReport]) -> Outcome {
    let Some(best) = colonies.iter().map(|report| report.population).max() else {
        return Outcome::Draw;
    };
    let mut leaders = colonies.iter().filter(|report| report.population == best);
    match (leaders.next(), leaders.next()) {
        (Some(leader), None) => Outcome::Winner(leader.colony),
        _ => Outcome::Draw,
    }
}
