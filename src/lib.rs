pub mod modules;

pub use modules::agent::{Agent, MAX_MOVE_RETRIES, Role, RoleKind};
pub use modules::collector::Collector;
pub use modules::config::{DEFAULT_PLACEMENT_ATTEMPTS, DEFAULT_SEED, SimConfig, SimError};
pub use modules::explorer::Explorer;
pub use modules::grid::{AgentId, GridError, GridWorld, MOORE_RADIUS, Position};
pub use modules::knowledge::{KnowledgeLayers, Layer};
pub use modules::recorder::{AgentSnapshot, PickEvent, Recorder, TickRecord, Totals};
pub use modules::report::{
    AgentPosition, PickedFood, Report, StepReport, load_report, report_path, save_report,
};
pub use modules::scheduler::{
    Event, RunOutcome, Simulation, StopReason, TickResult, run_simulation,
};
pub use modules::spawner::{FoodSpawner, SpawnerConfig};
pub use modules::state::{self, RuntimeState, Status, default_data_dir};
pub use modules::stats::{
    ActionStats, ActionStatsStore, load_action_stats, record_events, reset_action_stats,
    save_action_stats,
};
pub use modules::world::World;
