use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::modules::agent::{Agent, RoleKind};
use crate::modules::config::{SimConfig, SimError};
use crate::modules::grid::{AgentId, Position};
use crate::modules::recorder::Recorder;
use crate::modules::spawner::{FoodSpawner, SpawnerConfig};
use crate::modules::state::Status;
use crate::modules::world::World;

const AGENT_SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    AgentMoved {
        agent_id: AgentId,
        from: Position,
        to: Position,
    },
    MoveBlocked {
        agent_id: AgentId,
        position: Position,
    },
    FoodSensed {
        agent_id: AgentId,
        position: Position,
    },
    StorageDiscovered {
        agent_id: AgentId,
        position: Position,
    },
    FoodPicked {
        agent_id: AgentId,
        position: Position,
        tick: u64,
    },
    FoodDropped {
        agent_id: AgentId,
        position: Position,
        stored: u32,
    },
    FoodSpawned {
        tick: u64,
        positions: Vec<Position>,
    },
}

impl Event {
    pub fn agent_id(&self) -> Option<AgentId> {
        match self {
            Event::AgentMoved { agent_id, .. }
            | Event::MoveBlocked { agent_id, .. }
            | Event::FoodSensed { agent_id, .. }
            | Event::StorageDiscovered { agent_id, .. }
            | Event::FoodPicked { agent_id, .. }
            | Event::FoodDropped { agent_id, .. } => Some(*agent_id),
            Event::FoodSpawned { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickResult {
    pub tick: u64,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    AllFoodStored,
    TickCap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub ticks: u64,
    pub storaged_food: u32,
    pub reason: StopReason,
}

/// Owns the colony and advances it one synchronized tick at a time.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimConfig,
    world: World,
    storage: Position,
    agents: Vec<Agent>,
    spawner: FoodSpawner,
    recorder: Recorder,
    rng: StdRng,
    tick: u64,
    status: Status,
}

impl Simulation {
    /// Seeds food, then places the storage, collectors and explorers, in that order.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;

        let width = config.width as i32;
        let height = config.height as i32;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut world = World::new(width, height);
        let mut spawner = FoodSpawner::new(SpawnerConfig::from(&config));
        let mut recorder = Recorder::new();

        let initial_food = spawner.spawn(&mut world, &mut rng);
        recorder.note_spawned(&initial_food);

        let storage = random_cell(&world, &mut rng, config.placement_attempts, |w, cell| {
            w.grid.is_empty(cell) && !w.knowledge.has_food(cell)
        })
        .ok_or_else(|| placement_error("storage", &config))?;
        world.knowledge.place_storage(storage);

        let roles = std::iter::repeat(RoleKind::Collector)
            .take(config.collectors as usize)
            .chain(std::iter::repeat(RoleKind::Explorer).take(config.explorers as usize));
        let mut agents = Vec::with_capacity(config.agent_count() as usize);
        for (index, role) in roles.enumerate() {
            let id = index as AgentId;
            let cell = random_cell(&world, &mut rng, config.placement_attempts, |w, cell| {
                w.grid.is_empty(cell)
            })
            .ok_or_else(|| placement_error(&format!("{} {}", role, id), &config))?;
            world
                .grid
                .place(id, cell)
                .map_err(|_| placement_error(&format!("{} {}", role, id), &config))?;

            let seed = agent_seed(&config, id);
            agents.push(match role {
                RoleKind::Collector => Agent::collector(id, seed),
                RoleKind::Explorer => Agent::explorer(id, seed),
            });
        }

        debug!(
            x = storage.x,
            y = storage.y,
            agents = agents.len(),
            food = initial_food.len(),
            "colony initialized"
        );

        Ok(Self {
            config,
            world,
            storage,
            agents,
            spawner,
            recorder,
            rng,
            tick: 0,
            status: Status::NotStarted,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn storage(&self) -> Position {
        self.storage
    }

    /// Agents in their fixed stepping order.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn spawner(&self) -> &FoodSpawner {
        &self.spawner
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn storaged_food(&self) -> u32 {
        self.world.storaged_food()
    }

    pub fn all_food_stored(&self) -> bool {
        self.world.storaged_food() >= self.config.max_food
    }

    /// Caller-side stop condition: everything stored or the tick cap reached.
    pub fn should_stop(&self) -> Option<StopReason> {
        if self.all_food_stored() {
            Some(StopReason::AllFoodStored)
        } else if self.tick >= self.config.max_ticks {
            Some(StopReason::TickCap)
        } else {
            None
        }
    }

    /// Runs one tick: every agent in order, then the snapshot, then spawning when due.
    pub fn step(&mut self) -> TickResult {
        if self.status == Status::Terminated {
            return TickResult {
                tick: self.tick,
                events: Vec::new(),
            };
        }
        self.status = Status::Running;

        let tick = self.tick + 1;
        let mut events = Vec::new();
        for agent in &mut self.agents {
            agent.step(&mut self.world, tick, &mut events);
        }
        self.tick = tick;

        self.recorder.record(
            tick,
            &self.world,
            &self.agents,
            &events,
            self.spawner.total_spawned(),
        );

        if self.spawner.is_due(tick) {
            let positions = self.spawner.spawn(&mut self.world, &mut self.rng);
            if !positions.is_empty() {
                self.recorder.note_spawned(&positions);
                events.push(Event::FoodSpawned { tick, positions });
            }
        }

        TickResult { tick, events }
    }

    pub fn terminate(&mut self) {
        self.status = Status::Terminated;
    }

    pub fn run_to_completion(&mut self) -> RunOutcome {
        info!(
            width = self.config.width,
            height = self.config.height,
            seed = self.config.seed,
            max_food = self.config.max_food,
            "simulation started"
        );

        let reason = loop {
            if let Some(reason) = self.should_stop() {
                break reason;
            }
            self.step();
        };
        self.finish(reason)
    }

    /// Terminates the run and logs how it ended.
    pub fn finish(&mut self, reason: StopReason) -> RunOutcome {
        self.terminate();

        let outcome = RunOutcome {
            ticks: self.tick,
            storaged_food: self.storaged_food(),
            reason,
        };
        match reason {
            StopReason::AllFoodStored => info!(
                ticks = outcome.ticks,
                stored = outcome.storaged_food,
                "simulation finished"
            ),
            StopReason::TickCap => warn!(
                ticks = outcome.ticks,
                stored = outcome.storaged_food,
                max_food = self.config.max_food,
                "simulation hit its tick cap"
            ),
        }
        outcome
    }
}

/// Builds a colony and runs it until all food is stored or the tick cap is hit.
pub fn run_simulation(config: SimConfig) -> Result<Simulation, SimError> {
    let mut sim = Simulation::new(config)?;
    sim.run_to_completion();
    Ok(sim)
}

fn agent_seed(config: &SimConfig, id: AgentId) -> u64 {
    if config.decorrelate_agents {
        config
            .seed
            .wrapping_add((id as u64 + 1).wrapping_mul(AGENT_SEED_STRIDE))
    } else {
        config.seed
    }
}

fn random_cell(
    world: &World,
    rng: &mut StdRng,
    attempts: u32,
    accept: impl Fn(&World, Position) -> bool,
) -> Option<Position> {
    for _ in 0..attempts {
        let cell = Position {
            x: rng.gen_range(0..world.grid.width()),
            y: rng.gen_range(0..world.grid.height()),
        };
        if accept(world, cell) {
            return Some(cell);
        }
    }
    None
}

fn placement_error(what: &str, config: &SimConfig) -> SimError {
    SimError::Placement {
        what: what.to_string(),
        attempts: config.placement_attempts,
        width: config.width,
        height: config.height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> SimConfig {
        SimConfig {
            width: 10,
            height: 10,
            max_food: 6,
            max_ticks: 3000,
            ..SimConfig::default()
        }
    }

    #[test]
    fn initialization_places_everyone_on_distinct_cells() {
        let sim = Simulation::new(small_config()).unwrap();

        assert_eq!(sim.status(), Status::NotStarted);
        assert_eq!(sim.agents().len(), 5);
        assert_eq!(sim.world().grid.agent_count(), 5);
        assert!(!sim.world().knowledge.has_food(sim.storage()));
        assert!((2..=5).contains(&sim.world().knowledge.food().count()));

        let kinds: Vec<RoleKind> = sim.agents().iter().map(|a| a.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                RoleKind::Collector,
                RoleKind::Collector,
                RoleKind::Collector,
                RoleKind::Explorer,
                RoleKind::Explorer,
            ]
        );
    }

    #[test]
    fn spawns_on_interval_ticks_only() {
        let mut sim = Simulation::new(SimConfig {
            max_food: 40,
            ..small_config()
        })
        .unwrap();
        let initial = sim.spawner().total_spawned();

        for _ in 0..4 {
            let result = sim.step();
            assert!(
                !result
                    .events
                    .iter()
                    .any(|e| matches!(e, Event::FoodSpawned { .. }))
            );
        }
        assert_eq!(sim.spawner().total_spawned(), initial);

        let fifth = sim.step();
        assert_eq!(fifth.tick, 5);
        assert!(sim.spawner().total_spawned() > initial);
        assert!(
            fifth
                .events
                .iter()
                .any(|e| matches!(e, Event::FoodSpawned { tick: 5, .. }))
        );
    }

    #[test]
    fn status_moves_through_lifecycle() {
        let mut sim = Simulation::new(small_config()).unwrap();
        sim.step();
        assert_eq!(sim.status(), Status::Running);

        sim.terminate();
        let result = sim.step();
        assert_eq!(sim.status(), Status::Terminated);
        assert_eq!(result.tick, 1);
        assert!(result.events.is_empty());
    }

    #[test]
    fn run_stops_when_everything_is_stored() {
        let sim = run_simulation(small_config()).unwrap();

        assert_eq!(sim.storaged_food(), 6);
        assert_eq!(sim.status(), Status::Terminated);
        assert_eq!(sim.recorder().len() as u64, sim.tick());
    }

    #[test]
    fn tick_cap_bounds_the_run() {
        let mut sim = Simulation::new(SimConfig {
            max_ticks: 7,
            ..small_config()
        })
        .unwrap();

        let outcome = sim.run_to_completion();

        assert_eq!(outcome.ticks, 7);
        assert_eq!(outcome.reason, StopReason::TickCap);
    }

    #[test]
    fn finish_terminates_with_the_given_reason() {
        let mut sim = Simulation::new(small_config()).unwrap();
        sim.step();
        sim.step();

        let outcome = sim.finish(StopReason::TickCap);

        assert_eq!(sim.status(), Status::Terminated);
        assert_eq!(
            outcome,
            RunOutcome {
                ticks: 2,
                storaged_food: sim.storaged_food(),
                reason: StopReason::TickCap,
            }
        );
        assert_eq!(sim.step().tick, 2);
    }

    #[test]
    fn zero_food_target_finishes_immediately() {
        let sim = run_simulation(SimConfig {
            max_food: 0,
            ..small_config()
        })
        .unwrap();

        assert_eq!(sim.tick(), 0);
        assert_eq!(sim.world().knowledge.spawned_food().count(), 0);
    }

    #[test]
    fn storage_without_a_free_cell_fails_loudly() {
        let err = Simulation::new(SimConfig {
            width: 1,
            height: 2,
            collectors: 1,
            explorers: 0,
            max_food: 2,
            min_food_per_spawn: 2,
            max_food_per_spawn: 2,
            ..SimConfig::default()
        })
        .unwrap_err();

        assert!(matches!(
            err,
            SimError::Placement { ref what, attempts, .. }
                if what == "storage" && attempts == SimConfig::default().placement_attempts
        ));
    }

    #[test]
    fn shared_seed_gives_agents_identical_streams() {
        let config = small_config();
        assert_eq!(agent_seed(&config, 0), agent_seed(&config, 4));

        let decorrelated = SimConfig {
            decorrelate_agents: true,
            ..config
        };
        assert_ne!(agent_seed(&decorrelated, 0), agent_seed(&decorrelated, 1));
    }
}
