use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::modules::agent::RoleKind;
use crate::modules::grid::{AgentId, Position};
use crate::modules::recorder::{PickEvent, TickRecord, Totals};
use crate::modules::scheduler::Simulation;

const REPORT_FILE: &str = "report.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentPosition {
    pub id: AgentId,
    pub x: i32,
    pub y: i32,
    pub role: RoleKind,
    pub carrying: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickedFood {
    pub collector_id: AgentId,
    pub x: i32,
    pub y: i32,
    pub step: u64,
}

impl From<&PickEvent> for PickedFood {
    fn from(pick: &PickEvent) -> Self {
        Self {
            collector_id: pick.collector_id,
            x: pick.position.x,
            y: pick.position.y,
            step: pick.tick,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    pub id: u64,
    pub agent_positions: Vec<AgentPosition>,
    /// Food that appeared since the previous step.
    pub food_positions: Vec<Position>,
    pub food_picked: Option<PickedFood>,
    /// Every pick of the step, present only when there was more than one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub picks: Vec<PickedFood>,
    pub totals: Totals,
}

impl StepReport {
    /// All picks of the step, whichever field carries them.
    pub fn all_picks(&self) -> Vec<PickedFood> {
        if self.picks.is_empty() {
            self.food_picked.into_iter().collect()
        } else {
            self.picks.clone()
        }
    }
}

impl From<&TickRecord> for StepReport {
    fn from(record: &TickRecord) -> Self {
        let picks: Vec<PickedFood> = record.picks.iter().map(PickedFood::from).collect();
        Self {
            id: record.tick,
            agent_positions: record
                .agents
                .iter()
                .map(|agent| AgentPosition {
                    id: agent.id,
                    x: agent.position.x,
                    y: agent.position.y,
                    role: agent.role,
                    carrying: agent.carrying_food,
                })
                .collect(),
            food_positions: record.spawned.clone(),
            food_picked: picks.first().copied(),
            picks: if picks.len() > 1 { picks } else { Vec::new() },
            totals: record.totals,
        }
    }
}

/// Client-facing record of a whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub width: u32,
    pub height: u32,
    pub storage_location: Position,
    pub total_steps: u64,
    pub storaged_food: u32,
    pub spawned_food: Vec<Position>,
    pub steps: Vec<StepReport>,
}

impl Report {
    pub fn from_simulation(sim: &Simulation) -> Self {
        Self {
            width: sim.config().width,
            height: sim.config().height,
            storage_location: sim.storage(),
            total_steps: sim.tick(),
            storaged_food: sim.storaged_food(),
            spawned_food: sim.recorder().spawn_history().collect(),
            steps: sim.recorder().records().iter().map(StepReport::from).collect(),
        }
    }

    pub fn step(&self, step: u64) -> Option<&StepReport> {
        let index = usize::try_from(step.checked_sub(1)?).ok()?;
        self.steps.get(index)
    }

    /// SHA-256 of the compact JSON encoding, hex encoded.
    pub fn digest(&self) -> Result<String, serde_json::Error> {
        let bytes = serde_json::to_vec(self)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(hex::encode(hasher.finalize()))
    }

    /// Food on the grid at the end of `step`, rebuilt from the incremental log.
    pub fn food_at(&self, step: u64) -> Option<BTreeSet<Position>> {
        if step == 0 || step > self.steps.len() as u64 {
            return None;
        }
        let mut food = BTreeSet::new();
        for record in self.steps.iter().take(step as usize) {
            food.extend(record.food_positions.iter().copied());
            for pick in record.all_picks() {
                food.remove(&Position::new(pick.x, pick.y));
            }
        }
        Some(food)
    }

    /// ASCII frame of one step: `S` storage, `*` food, `E` explorer,
    /// `c` idle collector, `C` loaded collector. Row 0 is printed first.
    pub fn render_step(&self, step: u64) -> Option<String> {
        let food = self.food_at(step)?;
        let record = self.step(step)?;

        let mut out = String::new();
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let cell = Position::new(x, y);
                let agent = record
                    .agent_positions
                    .iter()
                    .find(|a| a.x == x && a.y == y);
                let glyph = match agent {
                    Some(a) if a.role == RoleKind::Explorer => 'E',
                    Some(a) if a.carrying => 'C',
                    Some(_) => 'c',
                    None if cell == self.storage_location => 'S',
                    None if food.contains(&cell) => '*',
                    None => '.',
                };
                out.push(glyph);
            }
            out.push('\n');
        }
        Some(out)
    }
}

pub fn report_path(dir: &Path) -> PathBuf {
    dir.join(REPORT_FILE)
}

pub fn save_report(dir: &Path, report: &Report) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = report_path(dir);
    let json = serde_json::to_vec_pretty(report)?;
    fs::write(&path, json)?;
    Ok(path)
}

pub fn load_report(dir: &Path) -> io::Result<Option<Report>> {
    let path = report_path(dir);
    if !path.exists() {
        return Ok(None);
    }

    let bytes = fs::read(&path)?;
    if bytes.is_empty() {
        return Ok(None);
    }

    let report: Report = serde_json::from_slice(&bytes).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "failed to parse report {}; run `nomnom run` to regenerate it: {}",
                path.display(),
                e
            ),
        )
    })?;
    Ok(Some(report))
}
