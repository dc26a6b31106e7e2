use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const DATA_DIR: &str = ".nomnom";
const STATE_FILE: &str = "state.json";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    NotStarted,
    Running,
    Terminated,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuntimeState {
    pub status: Status,
    pub last_tick: u64,
    #[serde(default)]
    pub storaged_food: u32,
    pub message: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Default for RuntimeState {
    fn default() -> Self {
        Self {
            status: Status::NotStarted,
            last_tick: 0,
            storaged_food: 0,
            message: None,
            updated_at: None,
        }
    }
}

/// Where the CLI keeps state, report and stats unless told otherwise.
pub fn default_data_dir() -> PathBuf {
    PathBuf::from(DATA_DIR)
}

pub fn state_file_path(dir: &Path) -> PathBuf {
    dir.join(STATE_FILE)
}

pub fn load_state(dir: &Path) -> io::Result<Option<RuntimeState>> {
    let path = state_file_path(dir);
    if !path.exists() {
        return Ok(None);
    }

    let bytes = fs::read(&path)?;
    if bytes.is_empty() {
        return Ok(None);
    }

    let state: RuntimeState = serde_json::from_slice(&bytes).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "failed to parse state file {}; delete it or run `nomnom run` to reset: {}",
                path.display(),
                e
            ),
        )
    })?;
    Ok(Some(state))
}

pub fn save_state(dir: &Path, state: &RuntimeState) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    let json = serde_json::to_vec_pretty(state)?;
    fs::write(state_file_path(dir), json)?;
    Ok(())
}

pub fn set_status(
    dir: &Path,
    status: Status,
    last_tick: u64,
    storaged_food: u32,
    message: Option<String>,
) -> io::Result<RuntimeState> {
    let mut state = load_state(dir)?.unwrap_or_default();
    state.status = status;
    state.last_tick = last_tick;
    state.storaged_food = storaged_food;
    state.message = message;
    state.updated_at = Some(chrono::Utc::now().to_rfc3339());
    save_state(dir, &state)?;
    Ok(state)
}
