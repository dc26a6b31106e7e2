use rand::rngs::StdRng;
use tracing::debug;

use crate::modules::agent::{random_move, step_toward};
use crate::modules::grid::AgentId;
use crate::modules::scheduler::Event;
use crate::modules::world::World;

/// Carries known food to the known storage, one greedy step per tick.
#[derive(Debug, Clone, Default)]
pub struct Collector {
    has_food: bool,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_food(&self) -> bool {
        self.has_food
    }

    pub fn step(
        &mut self,
        agent_id: AgentId,
        world: &mut World,
        tick: u64,
        rng: &mut StdRng,
        events: &mut Vec<Event>,
    ) {
        let Some(pos) = world.grid.position_of(agent_id) else {
            return;
        };
        if world.knowledge.sense_storage(pos) {
            debug!(agent_id, x = pos.x, y = pos.y, "collector found storage");
            events.push(Event::StorageDiscovered {
                agent_id,
                position: pos,
            });
        }

        if !self.has_food && !world.knowledge.storage_known() {
            random_move(agent_id, world, rng, events);
            return;
        }

        if self.attempt_pick(agent_id, world, tick, rng, events) {
            return;
        }
        self.attempt_drop(agent_id, world, rng, events);
    }

    /// Returns true when food was picked up, which ends the collector's tick.
    fn attempt_pick(
        &mut self,
        agent_id: AgentId,
        world: &mut World,
        tick: u64,
        rng: &mut StdRng,
        events: &mut Vec<Event>,
    ) -> bool {
        if self.has_food || !world.knowledge.storage_known() {
            return false;
        }
        let Some(pos) = world.grid.position_of(agent_id) else {
            return false;
        };
        let Some(target) = world.knowledge.nearest_known_food(pos) else {
            return false;
        };

        if pos != target {
            step_toward(agent_id, target, world, rng, events);
            return false;
        }

        if !world.knowledge.take_food(pos) {
            return false;
        }
        self.has_food = true;
        debug!(agent_id, tick, x = pos.x, y = pos.y, "food picked");
        events.push(Event::FoodPicked {
            agent_id,
            position: pos,
            tick,
        });
        true
    }

    fn attempt_drop(
        &mut self,
        agent_id: AgentId,
        world: &mut World,
        rng: &mut StdRng,
        events: &mut Vec<Event>,
    ) {
        if !self.has_food {
            return;
        }
        let Some(target) = world.knowledge.known_storage() else {
            return;
        };
        let Some(pos) = world.grid.position_of(agent_id) else {
            return;
        };

        if pos != target {
            step_toward(agent_id, target, world, rng, events);
            return;
        }

        self.has_food = false;
        let stored = world.store_food();
        debug!(agent_id, stored, "food stored");
        events.push(Event::FoodDropped {
            agent_id,
            position: pos,
            stored,
        });
        // Clear the storage cell for the next carrier.
        random_move(agent_id, world, rng, events);
    }
}
