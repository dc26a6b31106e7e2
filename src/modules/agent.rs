use std::fmt;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::modules::collector::Collector;
use crate::modules::explorer::Explorer;
use crate::modules::grid::{AgentId, MOORE_RADIUS, Position};
use crate::modules::scheduler::Event;
use crate::modules::world::World;

/// Random cells tried after a blocked step before the move is dropped.
pub const MAX_MOVE_RETRIES: u32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleKind {
    Explorer,
    Collector,
}

impl RoleKind {
    pub const fn label(self) -> &'static str {
        match self {
            RoleKind::Explorer => "explorer",
            RoleKind::Collector => "collector",
        }
    }
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone)]
pub enum Role {
    Explorer(Explorer),
    Collector(Collector),
}

#[derive(Debug, Clone)]
pub struct Agent {
    pub id: AgentId,
    pub role: Role,
    rng: StdRng,
}

impl Agent {
    pub fn explorer(id: AgentId, seed: u64) -> Self {
        Self {
            id,
            role: Role::Explorer(Explorer::new()),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn collector(id: AgentId, seed: u64) -> Self {
        Self {
            id,
            role: Role::Collector(Collector::new()),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn kind(&self) -> RoleKind {
        match self.role {
            Role::Explorer(_) => RoleKind::Explorer,
            Role::Collector(_) => RoleKind::Collector,
        }
    }

    pub fn carrying_food(&self) -> bool {
        match &self.role {
            Role::Collector(collector) => collector.has_food(),
            Role::Explorer(_) => false,
        }
    }

    /// One decision for this tick. Effects land in `world` immediately.
    pub fn step(&mut self, world: &mut World, tick: u64, events: &mut Vec<Event>) {
        let Agent { id, role, rng } = self;
        match role {
            Role::Explorer(explorer) => explorer.step(*id, world, rng, events),
            Role::Collector(collector) => collector.step(*id, world, tick, rng, events),
        }
    }
}

/// One greedy step toward `target`, diagonals allowed.
pub(crate) fn step_toward(
    agent_id: AgentId,
    target: Position,
    world: &mut World,
    rng: &mut StdRng,
    events: &mut Vec<Event>,
) -> bool {
    let Some(pos) = world.grid.position_of(agent_id) else {
        return false;
    };

    let mut dx = (target.x - pos.x).signum();
    let mut dy = (target.y - pos.y).signum();
    if !world.grid.contains(pos.offset(dx, 0)) {
        dx = 0;
    }
    if !world.grid.contains(pos.offset(0, dy)) {
        dy = 0;
    }

    move_with_retries(agent_id, pos, pos.offset(dx, dy), world, rng, events)
}

/// Moves to a uniformly random Moore neighbor.
pub(crate) fn random_move(
    agent_id: AgentId,
    world: &mut World,
    rng: &mut StdRng,
    events: &mut Vec<Event>,
) -> bool {
    let Some(pos) = world.grid.position_of(agent_id) else {
        return false;
    };
    let neighbors = world.grid.neighborhood(pos, MOORE_RADIUS, false);
    let Some(first) = neighbors.choose(rng).copied() else {
        events.push(Event::MoveBlocked {
            agent_id,
            position: pos,
        });
        return false;
    };

    move_with_retries(agent_id, pos, first, world, rng, events)
}

// An occupied candidate is swapped for a random neighbor up to MAX_MOVE_RETRIES times.
fn move_with_retries(
    agent_id: AgentId,
    pos: Position,
    first: Position,
    world: &mut World,
    rng: &mut StdRng,
    events: &mut Vec<Event>,
) -> bool {
    let neighbors = world.grid.neighborhood(pos, MOORE_RADIUS, false);
    let mut candidate = first;
    let mut retries = MAX_MOVE_RETRIES;

    while !world.grid.is_empty(candidate) {
        let next = if retries > 0 {
            neighbors.choose(rng).copied()
        } else {
            None
        };
        let Some(next) = next else {
            events.push(Event::MoveBlocked {
                agent_id,
                position: pos,
            });
            return false;
        };
        candidate = next;
        retries -= 1;
    }

    match world.grid.move_agent(agent_id, candidate) {
        Ok(from) => {
            events.push(Event::AgentMoved {
                agent_id,
                from,
                to: candidate,
            });
            true
        }
        Err(_) => {
            events.push(Event::MoveBlocked {
                agent_id,
                position: pos,
            });
            false
        }
    }
}
