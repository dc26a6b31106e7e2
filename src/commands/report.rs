use std::path::Path;

use nomnom::{Report, load_report};

fn require_report(dir: &Path) -> Result<Report, String> {
    load_report(dir)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| "no report found. Run `nomnom run` first.".to_string())
}

pub(super) fn run_report(dir: &Path, json: bool) -> Result<(), String> {
    let report = require_report(dir)?;
    if json {
        let json_str = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
        println!("{}", json_str);
        return Ok(());
    }

    let picks: usize = report.steps.iter().map(|s| s.all_picks().len()).sum();
    println!(
        "{}x{} grid | storage at {} | {} steps",
        report.width, report.height, report.storage_location, report.total_steps
    );
    println!(
        "Food: spawned={} picked={} stored={}",
        report.spawned_food.len(),
        picks,
        report.storaged_food
    );
    if let Some(last) = report.steps.last() {
        println!(
            "Final step {}: on_grid={} known={}",
            last.id, last.totals.food_on_grid, last.totals.known_food
        );
    }
    println!(
        "Digest: {}",
        report.digest().map_err(|e| e.to_string())?
    );
    Ok(())
}

pub(super) fn run_replay(dir: &Path, step: u64) -> Result<(), String> {
    let report = require_report(dir)?;
    let frame = report.render_step(step).ok_or_else(|| {
        format!(
            "step {} is out of range (report has steps 1..={})",
            step, report.total_steps
        )
    })?;
    let Some(record) = report.step(step) else {
        return Err(format!("step {} missing from report", step));
    };

    println!(
        "Step {} | stored={} on_grid={} known={}",
        record.id,
        record.totals.storaged_food,
        record.totals.food_on_grid,
        record.totals.known_food
    );
    print!("{}", frame);
    for pick in record.all_picks() {
        println!(
            " - collector {} picked food at ({}, {})",
            pick.collector_id, pick.x, pick.y
        );
    }
    Ok(())
}
