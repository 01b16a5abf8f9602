//! Validate a batch request.

use std::path::PathBuf;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating request at: {}", path.display());

    let request = super::load_request(&path, None, None)?;
    let config = &request.config;

    println!("  Clips: {}", request.clips.len());
    println!("  Groups: {}", request.groups.len());
    println!("  Outputs: {}", config.output_count);
    println!(
        "  Mixing: order={} speed={} starting-clip={} groups={}",
        config.order_mixing, config.speed_mixing, config.different_starting_clip, config.group_mixing
    );
    println!("  Aspect ratio: {}", config.aspect_ratio.as_str());

    let issues = request.issues();
    if issues.is_empty() {
        println!("\nRequest is valid.");
        return Ok(());
    }

    println!("\nValidation issues:");
    for issue in &issues {
        println!("  - {issue}");
    }
    anyhow::bail!("{} issue(s) found", issues.len())
}
