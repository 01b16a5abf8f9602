//! Plan and compile a batch into a JSON report.

use std::path::PathBuf;

use remix_common::config::AppConfig;
use remix_graph::generate_batch;
use remix_planner::BatchState;

pub fn run(
    path: PathBuf,
    output: Option<PathBuf>,
    count: Option<usize>,
    seed: Option<u64>,
    start_index: usize,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let request = super::load_request(&path, count, seed)?;
    tracing::info!(path = %path.display(), start_index, "Compiling batch");
    let outcome = generate_batch(
        &request,
        &config.planner,
        BatchState::starting_at(start_index),
    )?;
    let report = &outcome.report;

    match output {
        Some(out) => {
            report
                .write(&out)
                .map_err(|e| anyhow::anyhow!("Failed to write report {}: {e}", out.display()))?;
            println!(
                "Compiled {} of {} variant(s) ({} failed, {} warning(s))",
                report.variants.len(),
                report.requested,
                report.failures.len(),
                report.warnings.len()
            );
            println!("  Report: {}", out.display());
            println!("  Next start index: {}", outcome.state.next_variant_index);
        }
        None => println!("{}", serde_json::to_string_pretty(report)?),
    }

    Ok(())
}
