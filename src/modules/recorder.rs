use serde::{Deserialize, Serialize};

use crate::modules::agent::{Agent, RoleKind};
use crate::modules::grid::{AgentId, Position};
use crate::modules::scheduler::Event;
use crate::modules::world::World;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub position: Position,
    pub role: RoleKind,
    pub carrying_food: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickEvent {
    pub collector_id: AgentId,
    pub position: Position,
    pub tick: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub storaged_food: u32,
    pub food_on_grid: u32,
    pub known_food: u32,
    pub total_spawned: u32,
}

/// State of the colony at the end of one tick's agent phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickRecord {
    pub tick: u64,
    pub agents: Vec<AgentSnapshot>,
    /// Food spawned since the previous record.
    pub spawned: Vec<Position>,
    pub picks: Vec<PickEvent>,
    pub totals: Totals,
}

#[derive(Debug, Clone, Default)]
pub struct Recorder {
    records: Vec<TickRecord>,
    pending_spawns: Vec<Position>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn note_spawned(&mut self, cells: &[Position]) {
        self.pending_spawns.extend_from_slice(cells);
    }

    pub fn record(
        &mut self,
        tick: u64,
        world: &World,
        agents: &[Agent],
        events: &[Event],
        total_spawned: u32,
    ) -> &TickRecord {
        let snapshots = agents
            .iter()
            .filter_map(|agent| {
                world.grid.position_of(agent.id).map(|position| AgentSnapshot {
                    id: agent.id,
                    position,
                    role: agent.kind(),
                    carrying_food: agent.carrying_food(),
                })
            })
            .collect();

        let picks = events
            .iter()
            .filter_map(|event| match event {
                Event::FoodPicked {
                    agent_id,
                    position,
                    tick,
                } => Some(PickEvent {
                    collector_id: *agent_id,
                    position: *position,
                    tick: *tick,
                }),
                _ => None,
            })
            .collect();

        let totals = Totals {
            storaged_food: world.storaged_food(),
            food_on_grid: world.knowledge.food().count() as u32,
            known_food: world.knowledge.known_food().count() as u32,
            total_spawned,
        };

        self.records.push(TickRecord {
            tick,
            agents: snapshots,
            spawned: std::mem::take(&mut self.pending_spawns),
            picks,
            totals,
        });
        &self.records[self.records.len() - 1]
    }

    /// Every spawn in the order it happened, pending ones last.
    pub fn spawn_history(&self) -> impl Iterator<Item = Position> + '_ {
        self.records
            .iter()
            .flat_map(|record| record.spawned.iter().copied())
            .chain(self.pending_spawns.iter().copied())
    }

    pub fn records(&self) -> &[TickRecord] {
        &self.records
    }

    /// Record for a 1-based tick.
    pub fn get(&self, tick: u64) -> Option<&TickRecord> {
        let index = usize::try_from(tick.checked_sub(1)?).ok()?;
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
