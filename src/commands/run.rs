use std::path::{Path, PathBuf};

use clap::{ArgAction, Args};
use nomnom::{
    ActionStatsStore, Event, Report, SimConfig, Simulation, StopReason, TickResult,
    record_events, reset_action_stats, save_action_stats, save_report,
    state::{self, Status},
};
use tracing::info;

#[derive(Args)]
pub struct RunArgs {
    /// JSON config file; flags below override its fields
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<PathBuf>,
    #[arg(long)]
    width: Option<u32>,
    #[arg(long)]
    height: Option<u32>,
    #[arg(long)]
    collectors: Option<u32>,
    #[arg(long)]
    explorers: Option<u32>,
    /// Food to spawn and store before the run ends
    #[arg(long)]
    max_food: Option<u32>,
    /// Ticks between spawns
    #[arg(long)]
    spawn_interval: Option<u64>,
    #[arg(long)]
    min_food_per_spawn: Option<u32>,
    #[arg(long)]
    max_food_per_spawn: Option<u32>,
    #[arg(long)]
    seed: Option<u64>,
    /// Safety cap on ticks
    #[arg(short = 't', long)]
    max_ticks: Option<u64>,
    /// Give every agent its own random stream
    #[arg(long, action = ArgAction::SetTrue)]
    decorrelate_agents: bool,
    /// Print every tick's events
    #[arg(short = 'v', long, action = ArgAction::SetTrue)]
    verbose: bool,
    /// Print the report JSON to stdout
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
    /// Skip writing state, stats and report
    #[arg(long, action = ArgAction::SetTrue)]
    no_save: bool,
}

impl RunArgs {
    fn to_config(&self) -> Result<SimConfig, String> {
        let mut config = match &self.config {
            Some(path) => SimConfig::load(path).map_err(|e| e.to_string())?,
            None => SimConfig::default(),
        };

        if let Some(value) = self.width {
            config.width = value;
        }
        if let Some(value) = self.height {
            config.height = value;
        }
        if let Some(value) = self.collectors {
            config.collectors = value;
        }
        if let Some(value) = self.explorers {
            config.explorers = value;
        }
        if let Some(value) = self.max_food {
            config.max_food = value;
        }
        if let Some(value) = self.spawn_interval {
            config.spawn_interval = value;
        }
        if let Some(value) = self.min_food_per_spawn {
            config.min_food_per_spawn = value;
        }
        if let Some(value) = self.max_food_per_spawn {
            config.max_food_per_spawn = value;
        }
        if let Some(value) = self.seed {
            config.seed = value;
        }
        if let Some(value) = self.max_ticks {
            config.max_ticks = value;
        }
        if self.decorrelate_agents {
            config.decorrelate_agents = true;
        }
        Ok(config)
    }
}

pub(super) fn run_colony(args: RunArgs, dir: &Path) -> Result<(), String> {
    let config = args.to_config()?;
    let save = !args.no_save;
    let mut sim = Simulation::new(config).map_err(|e| e.to_string())?;
    let mut stats = ActionStatsStore::default();

    if save {
        reset_action_stats(dir).map_err(|e| e.to_string())?;
        state::set_status(dir, Status::Running, 0, 0, Some("run started".into()))
            .map_err(|e| e.to_string())?;
    }
    info!(
        storage = %sim.storage(),
        agents = sim.agents().len(),
        max_food = sim.config().max_food,
        "colony ready"
    );

    let reason = loop {
        if let Some(reason) = sim.should_stop() {
            break reason;
        }
        let result = sim.step();
        record_events(&mut stats, &result.events);
        if args.verbose {
            print_tick(&result);
        }
    };
    let outcome = sim.finish(reason);

    let message = match outcome.reason {
        StopReason::AllFoodStored => "all food stored".to_string(),
        StopReason::TickCap => format!(
            "tick cap reached with {}/{} food stored",
            outcome.storaged_food,
            sim.config().max_food
        ),
    };
    let report = Report::from_simulation(&sim);
    let digest = report.digest().map_err(|e| e.to_string())?;

    if save {
        save_action_stats(dir, &stats).map_err(|e| e.to_string())?;
        let path = save_report(dir, &report).map_err(|e| e.to_string())?;
        state::set_status(
            dir,
            Status::Terminated,
            sim.tick(),
            sim.storaged_food(),
            Some(message.clone()),
        )
        .map_err(|e| e.to_string())?;
        if !args.json {
            println!("Report written to {}", path.display());
        }
    }

    if args.json {
        let json = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
        println!("{}", json);
        return Ok(());
    }

    println!(
        "Finished after {} ticks: {} ({} of {} food stored)",
        outcome.ticks,
        message,
        outcome.storaged_food,
        sim.config().max_food
    );
    println!("Storage at {} | seed={}", sim.storage(), sim.config().seed);
    println!("Digest: {}", digest);
    Ok(())
}

fn print_tick(tick: &TickResult) {
    println!("Tick {}: {} events", tick.tick, tick.events.len());
    for event in &tick.events {
        println!(" - {}", describe_event(event));
    }
}

fn describe_event(event: &Event) -> String {
    match event {
        Event::AgentMoved { agent_id, from, to } => {
            format!("agent {} moved {} -> {}", agent_id, from, to)
        }
        Event::MoveBlocked { agent_id, position } => {
            format!("agent {} blocked at {}", agent_id, position)
        }
        Event::FoodSensed { agent_id, position } => {
            format!("agent {} sensed food at {}", agent_id, position)
        }
        Event::StorageDiscovered { agent_id, position } => {
            format!("agent {} found the storage at {}", agent_id, position)
        }
        Event::FoodPicked {
            agent_id, position, ..
        } => format!("agent {} picked food at {}", agent_id, position),
        Event::FoodDropped {
            agent_id, stored, ..
        } => format!("agent {} stored food (total {})", agent_id, stored),
        Event::FoodSpawned { positions, .. } => {
            format!("{} food spawned", positions.len())
        }
    }
}
