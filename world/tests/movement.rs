use petri_core::{
    Behavior, CellCoord, ColonyId, ColonySetup, Command, ContestConfig, DeathCause, Distribution,
    Event, FieldView, Movement, OrganismState,
};
use petri_world::{self as world, query, World};
use rand::RngCore;

#[derive(Debug)]
struct Fixed(Movement);

impl Behavior for Fixed {
    fn name(&self) -> &str {
        "fixed"
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
        self.0
    }

    fn wants_reproduction(&mut self, _organism: &OrganismState) -> bool {
        false
    }
}

fn still() -> Box<dyn Behavior> {
    Box::new(Fixed(Movement::STILL))
}

fn west() -> Box<dyn Behavior> {
    Box::new(Fixed(Movement::new(-1, 0)))
}

fn east() -> Box<dyn Behavior> {
    Box::new(Fixed(Movement::new(1, 0)))
}

fn leaper() -> Box<dyn Behavior> {
    Box::new(Fixed(Movement::new(5, -3)))
}

fn world_with(first: fn() -> Box<dyn Behavior>, second: fn() -> Box<dyn Behavior>) -> World {
    let config = ContestConfig::from_setups(
        Distribution::Famine,
        vec![
            ColonySetup::new(first).with_population(0),
            ColonySetup::new(second).with_population(0),
        ],
    )
    .with_seed(17);
    World::new(&config).expect("valid contest")
}

fn spawn(world: &mut World, colony: u32, cell: CellCoord, energy: f64) {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::SpawnOrganism {
            colony: ColonyId::new(colony),
            cell,
            energy,
        },
        &mut events,
    );
    assert_eq!(events.len(), 1, "spawn at {cell:?} rejected");
}

fn tick(world: &mut World) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::Tick, &mut events);
    events
}

fn occupant(world: &World, cell: CellCoord) -> Option<ColonyId> {
    query::field(world).cell(cell).and_then(|cell| cell.occupant)
}

#[test]
fn oversized_requests_move_a_single_step() {
    let mut world = world_with(leaper, still);
    let start = CellCoord::new(25, 25);
    spawn(&mut world, 1, start, 1000.0);

    let events = tick(&mut world);

    let landed = CellCoord::new(26, 24);
    assert!(events.contains(&Event::OrganismMoved {
        colony: ColonyId::new(1),
        from: start,
        to: landed,
    }));
    assert_eq!(occupant(&world, start), None);
    assert_eq!(occupant(&world, landed), Some(ColonyId::new(1)));
}

#[test]
fn moving_costs_extra_energy() {
    let mut world = world_with(leaper, still);
    spawn(&mut world, 1, CellCoord::new(25, 25), 1000.0);
    spawn(&mut world, 2, CellCoord::new(10, 25), 1000.0);

    let _ = tick(&mut world);

    let energy = |cell| query::field(&world).cell(cell).map_or(0.0, |cell| cell.energy);
    let mover = energy(CellCoord::new(26, 24));
    let sitter = energy(CellCoord::new(10, 25));
    assert!(mover < sitter);
    assert!(mover > 980.0 && sitter > 990.0);
}

#[test]
fn moves_that_leave_the_dish_are_dropped() {
    let mut world = world_with(west, still);
    let edge = CellCoord::new(1, 25);
    spawn(&mut world, 1, edge, 1000.0);

    let events = tick(&mut world);

    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::OrganismMoved { .. })));
    assert_eq!(occupant(&world, edge), Some(ColonyId::new(1)));
}

#[test]
fn same_colony_neighbors_block_each_other() {
    let mut world = world_with(east, still);
    let inner = CellCoord::new(48, 25);
    let outer = CellCoord::new(49, 25);
    spawn(&mut world, 1, inner, 1000.0);
    spawn(&mut world, 1, outer, 1000.0);

    let events = tick(&mut world);

    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::OrganismMoved { .. } | Event::CombatResolved { .. })));
    assert_eq!(occupant(&world, inner), Some(ColonyId::new(1)));
    assert_eq!(occupant(&world, outer), Some(ColonyId::new(1)));
}

#[test]
fn stepping_onto_a_stranger_starts_a_fight() {
    let mut world = world_with(east, still);
    let attacker = CellCoord::new(24, 25);
    let defender = CellCoord::new(25, 25);
    spawn(&mut world, 1, attacker, 1000.0);
    spawn(&mut world, 2, defender, 300.0);

    let events = tick(&mut world);

    assert!(events.iter().any(|event| matches!(
        event,
        Event::CombatResolved { winner, loser, .. }
            if *winner == ColonyId::new(1) && *loser == ColonyId::new(2)
    )));
    assert!(events.contains(&Event::OrganismDied {
        colony: ColonyId::new(2),
        cell: defender,
        cause: DeathCause::Combat,
    }));
    assert_eq!(occupant(&world, attacker), Some(ColonyId::new(1)));
    assert_eq!(occupant(&world, defender), None);
}

#[test]
fn starving_organisms_die() {
    let mut world = world_with(leaper, still);
    let cell = CellCoord::new(25, 25);
    spawn(&mut world, 1, cell, 3.0);

    let events = tick(&mut world);

    assert!(events.contains(&Event::OrganismDied {
        colony: ColonyId::new(1),
        cell,
        cause: DeathCause::Starvation,
    }));
    assert_eq!(query::field_stats(&world).living_colonies(), 0);
}

#[test]
fn contest_ends_once_grace_period_expires() {
    let mut world = world_with(still, still);
    spawn(&mut world, 1, CellCoord::new(25, 25), 1000.0);

    let mut ended_at = None;
    for _ in 0..20 {
        let events = tick(&mut world);
        if let Some(Event::ContestEnded { survivor }) = events
            .iter()
            .find(|event| matches!(event, Event::ContestEnded { .. }))
        {
            assert_eq!(*survivor, Some(ColonyId::new(1)));
            ended_at = Some(query::tick(&world));
        }
    }

    assert_eq!(ended_at, Some(11));
    assert_eq!(query::tick(&world), 11, "ticks after the end are ignored");
}
