use crate::modules::grid::GridWorld;
use crate::modules::knowledge::KnowledgeLayers;

/// Shared state every agent reads and mutates during its own step.
#[derive(Debug, Clone)]
pub struct World {
    pub grid: GridWorld,
    pub knowledge: KnowledgeLayers,
    storaged_food: u32,
}

impl World {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            grid: GridWorld::new(width, height),
            knowledge: KnowledgeLayers::new(width, height),
            storaged_food: 0,
        }
    }

    pub fn storaged_food(&self) -> u32 {
        self.storaged_food
    }

    pub(crate) fn store_food(&mut self) -> u32 {
        self.storaged_food = self.storaged_food.saturating_add(1);
        self.storaged_food
    }
}
