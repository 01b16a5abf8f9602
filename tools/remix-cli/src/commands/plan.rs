//! Plan a batch and print the variants.

use std::path::PathBuf;

use remix_common::config::AppConfig;
use remix_planner::{BatchState, VariantPlanner};

pub fn run(
    path: PathBuf,
    count: Option<usize>,
    seed: Option<u64>,
    json: bool,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let request = super::load_request(&path, count, seed)?;
    tracing::info!(path = %path.display(), "Planning batch");
    let planner = VariantPlanner::new(config.planner.clone());
    let (outcome, _) = planner.plan_request(&request, BatchState::default())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    println!(
        "Planned {} of {} variant(s)",
        outcome.plans.len(),
        request.config.output_count
    );
    for plan in &outcome.plans {
        let slots = plan
            .slots
            .iter()
            .map(|s| format!("{}@{:.3}x[{:.2}-{:.2}]", s.clip_id, s.speed, s.trim.start, s.trim.end))
            .collect::<Vec<_>>()
            .join(" -> ");
        println!(
            "  {} ({:.2}s): {slots}",
            plan.variant_id,
            plan.timeline_duration()
        );
    }

    for warning in &outcome.warnings {
        println!("  warning {}: {}", warning.variant_id, warning.message);
    }
    for failure in &outcome.failures {
        println!("  failed {}: {}", failure.variant_id, failure.reason);
    }

    Ok(())
}
