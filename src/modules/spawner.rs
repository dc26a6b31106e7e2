use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::index;
use tracing::debug;

use crate::modules::config::SimConfig;
use crate::modules::grid::Position;
use crate::modules::world::World;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnerConfig {
    pub min_per_spawn: u32,
    pub max_per_spawn: u32,
    pub max_total_food: u32,
    pub spawn_interval: u64,
}

impl From<&SimConfig> for SpawnerConfig {
    fn from(config: &SimConfig) -> Self {
        Self {
            min_per_spawn: config.min_food_per_spawn,
            max_per_spawn: config.max_food_per_spawn,
            max_total_food: config.max_food,
            spawn_interval: config.spawn_interval,
        }
    }
}

/// Drops food onto free cells, never exceeding the configured total.
#[derive(Debug, Clone)]
pub struct FoodSpawner {
    config: SpawnerConfig,
    total_spawned: u32,
}

impl FoodSpawner {
    pub fn new(config: SpawnerConfig) -> Self {
        Self {
            config,
            total_spawned: 0,
        }
    }

    pub fn total_spawned(&self) -> u32 {
        self.total_spawned
    }

    pub fn remaining_capacity(&self) -> u32 {
        self.config.max_total_food.saturating_sub(self.total_spawned)
    }

    pub fn is_due(&self, tick: u64) -> bool {
        self.config.spawn_interval > 0 && tick % self.config.spawn_interval == 0
    }

    /// Spawns one batch and returns the new food cells in selection order.
    pub fn spawn(&mut self, world: &mut World, rng: &mut StdRng) -> Vec<Position> {
        let storage = world.knowledge.storage();
        let candidates: Vec<Position> = world
            .grid
            .cells()
            .filter(|cell| {
                world.grid.is_empty(*cell)
                    && !world.knowledge.has_food(*cell)
                    && storage != Some(*cell)
            })
            .collect();

        let low = self.config.min_per_spawn.min(self.config.max_per_spawn);
        let requested = rng.gen_range(low..=self.config.max_per_spawn);
        let count = (requested as usize)
            .min(self.remaining_capacity() as usize)
            .min(candidates.len());
        if count == 0 {
            return Vec::new();
        }

        let spawned: Vec<Position> = index::sample(rng, candidates.len(), count)
            .into_iter()
            .map(|i| candidates[i])
            .collect();
        for cell in &spawned {
            world.knowledge.add_food(*cell);
        }
        self.total_spawned = self.total_spawned.saturating_add(spawned.len() as u32);

        debug!(
            requested,
            spawned = spawned.len(),
            total = self.total_spawned,
            "spawned food"
        );
        spawned
    }
}
