use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use nomnom::{default_data_dir, load_action_stats, state};

mod report;
mod run;

use report::{run_replay, run_report};
use run::{RunArgs, run_colony};

#[derive(Parser)]
#[command(
    name = "nomnom",
    version,
    about = "NomNom foraging colony simulation (explorers, collectors, food)",
    long_about = None
)]
pub struct Cli {
    /// Directory for state, report and stats (default: .nomnom)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a simulation to completion and save its report
    Run(RunArgs),
    /// Show the status of the last run
    Status,
    /// Summarize the saved report
    Report {
        /// Print the full report JSON to stdout
        #[arg(long)]
        json: bool,
    },
    /// Draw one step of the saved report
    Replay {
        /// Step to draw (1-based)
        #[arg(short = 's', long)]
        step: u64,
    },
}

pub fn run() {
    let cli = Cli::parse();
    let dir = cli.data_dir.unwrap_or_else(default_data_dir);
    if let Err(err) = dispatch(cli.command, &dir) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn dispatch(command: Command, dir: &Path) -> Result<(), String> {
    match command {
        Command::Run(args) => run_colony(args, dir),
        Command::Status => run_status(dir),
        Command::Report { json } => run_report(dir, json),
        Command::Replay { step } => run_replay(dir, step),
    }
}

fn run_status(dir: &Path) -> Result<(), String> {
    match state::load_state(dir).map_err(|e| e.to_string())? {
        None => {
            println!("Status: no run recorded. Run `nomnom run`.");
        }
        Some(state) => {
            println!(
                "Status: {:?} | last_tick={} | stored={} | message={} | updated={}",
                state.status,
                state.last_tick,
                state.storaged_food,
                state.message.unwrap_or_else(|| "-".into()),
                state.updated_at.unwrap_or_else(|| "-".into())
            );
            print_action_summary(dir)?;
        }
    }
    Ok(())
}

fn print_action_summary(dir: &Path) -> Result<(), String> {
    let store = load_action_stats(dir).map_err(|e| e.to_string())?;
    if store.per_agent.is_empty() {
        println!("No action stats recorded.");
        return Ok(());
    }

    println!("Action summary per agent:");
    for (agent, stats) in store.per_agent.iter() {
        println!(
            " - agent {} | move={} blocked={} sensed={} storage_found={} pick={} drop={}",
            agent,
            stats.move_count,
            stats.blocked_count,
            stats.sensed_count,
            stats.storage_found_count,
            stats.pick_count,
            stats.drop_count
        );
    }
    let totals = store.totals();
    println!(
        "Colony total | move={} blocked={} sensed={} storage_found={} pick={} drop={}",
        totals.move_count,
        totals.blocked_count,
        totals.sensed_count,
        totals.storage_found_count,
        totals.pick_count,
        totals.drop_count
    );
    Ok(())
}
