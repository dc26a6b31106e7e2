use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Seed the colony uses when none is given.
pub const DEFAULT_SEED: u64 = 12345;
/// Random cells tried per placement before initialization gives up.
pub const DEFAULT_PLACEMENT_ATTEMPTS: u32 = 64;

/// Errors raised while building a simulation. Nothing in here escapes a running tick.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("could not place {what} on the {width}x{height} grid after {attempts} attempts")]
    Placement {
        what: String,
        attempts: u32,
        width: u32,
        height: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub width: u32,
    pub height: u32,
    pub collectors: u32,
    pub explorers: u32,
    /// Total food ever spawned; the run ends once this much has been stored.
    pub max_food: u32,
    pub spawn_interval: u64,
    pub min_food_per_spawn: u32,
    pub max_food_per_spawn: u32,
    pub seed: u64,
    /// Safety cap on ticks for a single run.
    pub max_ticks: u64,
    pub placement_attempts: u32,
    /// Give each agent its own seed instead of sharing the run seed.
    pub decorrelate_agents: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: 20,
            height: 20,
            collectors: 3,
            explorers: 2,
            max_food: 47,
            spawn_interval: 5,
            min_food_per_spawn: 2,
            max_food_per_spawn: 5,
            seed: DEFAULT_SEED,
            max_ticks: 1500,
            placement_attempts: DEFAULT_PLACEMENT_ATTEMPTS,
            decorrelate_agents: false,
        }
    }
}

impl SimConfig {
    pub fn load(path: &Path) -> io::Result<Self> {
        let bytes = fs::read(path)?;
        if bytes.is_empty() {
            return Ok(Self::default());
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("failed to parse config file {}: {}", path.display(), e),
            )
        })
    }

    pub fn agent_count(&self) -> u64 {
        self.collectors as u64 + self.explorers as u64
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.width == 0 || self.height == 0 {
            return Err(SimError::InvalidConfig(
                "grid width and height must be positive".into(),
            ));
        }
        if self.width > i32::MAX as u32 || self.height > i32::MAX as u32 {
            return Err(SimError::InvalidConfig("grid dimensions are too large".into()));
        }
        if self.spawn_interval == 0 {
            return Err(SimError::InvalidConfig(
                "spawn_interval must be at least 1".into(),
            ));
        }
        if self.min_food_per_spawn > self.max_food_per_spawn {
            return Err(SimError::InvalidConfig(format!(
                "min_food_per_spawn ({}) exceeds max_food_per_spawn ({})",
                self.min_food_per_spawn, self.max_food_per_spawn
            )));
        }
        if self.placement_attempts == 0 {
            return Err(SimError::InvalidConfig(
                "placement_attempts must be at least 1".into(),
            ));
        }

        // Storage needs a cell of its own next to every agent.
        let cells = self.width as u64 * self.height as u64;
        if self.agent_count() + 1 > cells {
            return Err(SimError::InvalidConfig(format!(
                "{}x{} grid cannot hold {} agents and the storage",
                self.width,
                self.height,
                self.agent_count()
            )));
        }
        Ok(())
    }
}
