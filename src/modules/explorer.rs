use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::modules::grid::{AgentId, MOORE_RADIUS, Position};
use crate::modules::scheduler::Event;
use crate::modules::world::World;

/// Random walker that prefers cells it has not stood on and reports what it sees.
#[derive(Debug, Clone, Default)]
pub struct Explorer {
    visited: HashSet<Position>,
}

impl Explorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visited(&self) -> &HashSet<Position> {
        &self.visited
    }

    pub fn step(
        &mut self,
        agent_id: AgentId,
        world: &mut World,
        rng: &mut StdRng,
        events: &mut Vec<Event>,
    ) {
        self.wander(agent_id, world, rng, events);
        sense(agent_id, world, events);
    }

    fn wander(
        &mut self,
        agent_id: AgentId,
        world: &mut World,
        rng: &mut StdRng,
        events: &mut Vec<Event>,
    ) {
        let Some(pos) = world.grid.position_of(agent_id) else {
            return;
        };
        let neighbors = world.grid.neighborhood(pos, MOORE_RADIUS, false);

        let unvisited: Vec<Position> = neighbors
            .iter()
            .copied()
            .filter(|cell| !self.visited.contains(cell) && world.grid.is_empty(*cell))
            .collect();
        let target = match unvisited.choose(rng) {
            Some(cell) => Some(*cell),
            None => {
                let empty: Vec<Position> = neighbors
                    .iter()
                    .copied()
                    .filter(|cell| world.grid.is_empty(*cell))
                    .collect();
                empty.choose(rng).copied()
            }
        };

        let Some(target) = target else {
            events.push(Event::MoveBlocked {
                agent_id,
                position: pos,
            });
            return;
        };

        match world.grid.move_agent(agent_id, target) {
            Ok(from) => {
                self.visited.insert(target);
                events.push(Event::AgentMoved {
                    agent_id,
                    from,
                    to: target,
                });
            }
            Err(_) => events.push(Event::MoveBlocked {
                agent_id,
                position: pos,
            }),
        }
    }
}

// Reveals food and storage in the Moore neighborhood, center included.
fn sense(agent_id: AgentId, world: &mut World, events: &mut Vec<Event>) {
    let Some(pos) = world.grid.position_of(agent_id) else {
        return;
    };

    for cell in world.grid.neighborhood(pos, MOORE_RADIUS, true) {
        if world.knowledge.sense_food(cell) {
            events.push(Event::FoodSensed {
                agent_id,
                position: cell,
            });
        }
        if world.knowledge.sense_storage(cell) {
            debug!(agent_id, x = cell.x, y = cell.y, "explorer found storage");
            events.push(Event::StorageDiscovered {
                agent_id,
                position: cell,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn prefers_unvisited_cells() {
        let mut world = World::new(3, 1);
        world.grid.place(0, Position::new(1, 0)).unwrap();
        let mut explorer = Explorer::new();
        let mut rng = StdRng::seed_from_u64(12345);
        let mut events = Vec::new();

        explorer.step(0, &mut world, &mut rng, &mut events);
        let first = world.grid.position_of(0).unwrap();
        explorer.step(0, &mut world, &mut rng, &mut events);
        explorer.step(0, &mut world, &mut rng, &mut events);

        // From an end cell the only neighbor is the middle; from there the unvisited end wins.
        let last = world.grid.position_of(0).unwrap();
        assert_ne!(first, Position::new(1, 0));
        assert_ne!(last, first);
        assert_eq!(explorer.visited().len(), 3);
    }

    #[test]
    fn falls_back_to_visited_cells() {
        let mut world = World::new(3, 3);
        world.grid.place(0, Position::new(1, 1)).unwrap();
        let mut explorer = Explorer::new();
        let neighbors = world.grid.neighborhood(Position::new(1, 1), MOORE_RADIUS, false);
        explorer.visited.extend(neighbors.iter().copied());
        let mut rng = StdRng::seed_from_u64(12345);
        let mut events = Vec::new();

        explorer.step(0, &mut world, &mut rng, &mut events);

        let pos = world.grid.position_of(0).unwrap();
        assert!(neighbors.contains(&pos));
        assert_eq!(explorer.visited().len(), 8);
        assert!(matches!(events[0], Event::AgentMoved { agent_id: 0, .. }));
    }

    #[test]
    fn occupied_unvisited_cell_forces_visited_fallback() {
        let mut world = World::new(3, 1);
        world.grid.place(0, Position::new(1, 0)).unwrap();
        world.grid.place(1, Position::new(2, 0)).unwrap();
        let mut explorer = Explorer::new();
        explorer.visited.insert(Position::new(0, 0));
        let mut rng = StdRng::seed_from_u64(7);
        let mut events = Vec::new();

        explorer.step(0, &mut world, &mut rng, &mut events);

        assert_eq!(world.grid.position_of(0), Some(Position::new(0, 0)));
        assert_eq!(world.grid.position_of(1), Some(Position::new(2, 0)));
    }

    #[test]
    fn senses_food_and_storage_around_itself() {
        let mut world = World::new(5, 5);
        world.grid.place(0, Position::new(2, 2)).unwrap();
        // Surround the explorer so it stays put and senses from (2,2).
        let mut next_id = 1;
        for cell in world.grid.neighborhood(Position::new(2, 2), 1, false) {
            world.grid.place(next_id, cell).unwrap();
            next_id += 1;
        }
        world.knowledge.add_food(Position::new(1, 1));
        world.knowledge.add_food(Position::new(2, 2));
        world.knowledge.add_food(Position::new(4, 4));
        world.knowledge.place_storage(Position::new(3, 2));
        let mut explorer = Explorer::new();
        let mut rng = StdRng::seed_from_u64(1);
        let mut events = Vec::new();

        explorer.step(0, &mut world, &mut rng, &mut events);

        assert_eq!(world.grid.position_of(0), Some(Position::new(2, 2)));
        assert!(world.knowledge.is_known_food(Position::new(1, 1)));
        assert!(world.knowledge.is_known_food(Position::new(2, 2)));
        assert!(!world.knowledge.is_known_food(Position::new(4, 4)));
        assert_eq!(world.knowledge.known_storage(), Some(Position::new(3, 2)));
        assert!(matches!(events[0], Event::MoveBlocked { agent_id: 0, .. }));
        assert!(
            events
                .iter()
                .any(|e| matches!(e, Event::StorageDiscovered { agent_id: 0, .. }))
        );
    }

    #[test]
    fn sensing_never_clears_known_food() {
        let mut world = World::new(3, 3);
        world.grid.place(0, Position::new(0, 0)).unwrap();
        world.knowledge.add_food(Position::new(2, 2));
        world.knowledge.sense_food(Position::new(2, 2));
        let mut explorer = Explorer::new();
        let mut rng = StdRng::seed_from_u64(8);
        let mut events = Vec::new();

        explorer.step(0, &mut world, &mut rng, &mut events);

        assert!(world.knowledge.is_known_food(Position::new(2, 2)));
    }
}
