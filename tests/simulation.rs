use std::collections::{BTreeSet, HashSet};

use nomnom::{Event, Position, Report, SimConfig, Simulation, StopReason, run_simulation};

fn scenario() -> SimConfig {
    SimConfig {
        width: 20,
        height: 20,
        collectors: 3,
        explorers: 2,
        max_food: 10,
        spawn_interval: 5,
        seed: 12345,
        max_ticks: 5000,
        ..SimConfig::default()
    }
}

#[test]
fn small_colony_stores_all_food() {
    let mut sim = Simulation::new(scenario()).unwrap();
    let outcome = sim.run_to_completion();

    assert_eq!(outcome.reason, StopReason::AllFoodStored);
    assert_eq!(outcome.storaged_food, 10);
    assert!(outcome.ticks <= 5000);
}

#[test]
fn same_seed_same_digest() {
    let first = Report::from_simulation(&run_simulation(scenario()).unwrap());
    let second = Report::from_simulation(&run_simulation(scenario()).unwrap());

    assert_eq!(first, second);
    assert_eq!(first.digest().unwrap(), second.digest().unwrap());
}

#[test]
fn different_seed_changes_the_run() {
    let first = Report::from_simulation(&run_simulation(scenario()).unwrap());
    let other = Report::from_simulation(
        &run_simulation(SimConfig {
            seed: 777,
            ..scenario()
        })
        .unwrap(),
    );

    assert_ne!(first.digest().unwrap(), other.digest().unwrap());
}

#[test]
fn invariants_hold_every_tick() {
    let config = scenario();
    let mut sim = Simulation::new(config.clone()).unwrap();
    let mut stored = 0;
    let mut known_storage = None;

    while sim.should_stop().is_none() {
        let result = sim.step();
        let world = sim.world();

        // Known food is always real food.
        for cell in world.knowledge.known_food().positions() {
            assert!(world.knowledge.has_food(cell), "tick {}: stale {}", result.tick, cell);
        }

        if let Some(storage) = known_storage {
            assert_eq!(world.knowledge.known_storage(), Some(storage));
        }
        known_storage = world.knowledge.known_storage();
        if let Some(storage) = known_storage {
            assert_eq!(storage, sim.storage());
        }

        assert!(world.storaged_food() >= stored);
        assert!(world.storaged_food() <= config.max_food);
        stored = world.storaged_food();

        let mut seen = HashSet::new();
        for agent in sim.agents() {
            let pos = world.grid.position_of(agent.id).unwrap();
            assert!(world.grid.contains(pos));
            assert!(seen.insert(pos), "tick {}: two agents on {}", result.tick, pos);
        }

        for event in &result.events {
            if let Event::AgentMoved { from, to, .. } = event {
                assert!((from.x - to.x).abs() <= 1 && (from.y - to.y).abs() <= 1);
            }
        }
    }

    assert_eq!(stored, 10);
}

#[test]
fn replay_matches_the_live_board() {
    let mut sim = Simulation::new(scenario()).unwrap();
    let mut boards = Vec::new();

    while sim.should_stop().is_none() {
        let result = sim.step();
        let mut board: BTreeSet<Position> = sim.world().knowledge.food().positions().collect();
        // Spawns after the snapshot belong to the next step.
        for event in &result.events {
            if let Event::FoodSpawned { positions, .. } = event {
                for cell in positions {
                    board.remove(cell);
                }
            }
        }
        boards.push(board);
    }

    let report = Report::from_simulation(&sim);
    for (index, board) in boards.iter().enumerate() {
        let step = index as u64 + 1;
        assert_eq!(report.food_at(step).as_ref(), Some(board), "step {}", step);
    }
}

#[test]
fn report_survives_disk_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let report = Report::from_simulation(&run_simulation(scenario()).unwrap());

    nomnom::save_report(dir.path(), &report).unwrap();
    let loaded = nomnom::load_report(dir.path()).unwrap().unwrap();

    assert_eq!(loaded.digest().unwrap(), report.digest().unwrap());
    assert_eq!(loaded.storage_location, report.storage_location);
}
