use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::modules::grid::AgentId;
use crate::modules::scheduler::Event;

const STATS_FILE: &str = "action_stats.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionStats {
    pub move_count: u64,
    pub blocked_count: u64,
    pub sensed_count: u64,
    pub storage_found_count: u64,
    pub pick_count: u64,
    pub drop_count: u64,
}

impl ActionStats {
    pub fn record(&mut self, event: &Event) {
        match event {
            Event::AgentMoved { .. } => self.move_count = self.move_count.saturating_add(1),
            Event::MoveBlocked { .. } => self.blocked_count = self.blocked_count.saturating_add(1),
            Event::FoodSensed { .. } => self.sensed_count = self.sensed_count.saturating_add(1),
            Event::StorageDiscovered { .. } => {
                self.storage_found_count = self.storage_found_count.saturating_add(1)
            }
            Event::FoodPicked { .. } => self.pick_count = self.pick_count.saturating_add(1),
            Event::FoodDropped { .. } => self.drop_count = self.drop_count.saturating_add(1),
            Event::FoodSpawned { .. } => {}
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionStatsStore {
    pub per_agent: BTreeMap<AgentId, ActionStats>,
}

impl ActionStatsStore {
    pub fn totals(&self) -> ActionStats {
        self.per_agent
            .values()
            .fold(ActionStats::default(), |mut acc, stats| {
                acc.move_count += stats.move_count;
                acc.blocked_count += stats.blocked_count;
                acc.sensed_count += stats.sensed_count;
                acc.storage_found_count += stats.storage_found_count;
                acc.pick_count += stats.pick_count;
                acc.drop_count += stats.drop_count;
                acc
            })
    }
}

pub fn stats_file_path(dir: &Path) -> PathBuf {
    dir.join(STATS_FILE)
}

pub fn reset_action_stats(dir: &Path) -> io::Result<()> {
    save_action_stats(dir, &ActionStatsStore::default())
}

pub fn load_action_stats(dir: &Path) -> io::Result<ActionStatsStore> {
    let path = stats_file_path(dir);
    if !path.exists() {
        return Ok(ActionStatsStore::default());
    }

    let bytes = fs::read(&path)?;
    if bytes.is_empty() {
        return Ok(ActionStatsStore::default());
    }

    let store: ActionStatsStore = serde_json::from_slice(&bytes)?;
    Ok(store)
}

pub fn save_action_stats(dir: &Path, store: &ActionStatsStore) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    let json = serde_json::to_vec_pretty(store)?;
    fs::write(stats_file_path(dir), json)?;
    Ok(())
}

/// Folds one tick's events into the per-agent counters. Spawns have no agent and are skipped.
pub fn record_events<'a>(store: &mut ActionStatsStore, events: impl IntoIterator<Item = &'a Event>) {
    for event in events {
        if let Some(agent_id) = event.agent_id() {
            store.per_agent.entry(agent_id).or_default().record(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::grid::Position;

    #[test]
    fn counts_events_per_agent() {
        let mut store = ActionStatsStore::default();
        let events = vec![
            Event::AgentMoved {
                agent_id: 0,
                from: Position::new(0, 0),
                to: Position::new(1, 1),
            },
            Event::FoodPicked {
                agent_id: 0,
                position: Position::new(1, 1),
                tick: 2,
            },
            Event::MoveBlocked {
                agent_id: 3,
                position: Position::new(4, 4),
            },
            Event::FoodSpawned {
                tick: 5,
                positions: vec![Position::new(2, 2)],
            },
        ];

        record_events(&mut store, &events);

        assert_eq!(store.per_agent.len(), 2);
        assert_eq!(store.per_agent[&0].move_count, 1);
        assert_eq!(store.per_agent[&0].pick_count, 1);
        assert_eq!(store.per_agent[&3].blocked_count, 1);
        assert_eq!(store.totals().move_count, 1);
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ActionStatsStore::default();
        store.per_agent.entry(4).or_default().drop_count = 2;

        save_action_stats(dir.path(), &store).unwrap();
        assert_eq!(load_action_stats(dir.path()).unwrap(), store);

        reset_action_stats(dir.path()).unwrap();
        assert!(load_action_stats(dir.path()).unwrap().per_agent.is_empty());
    }
}
