//! Write a sample batch request.

use std::path::PathBuf;

use remix_common::config::AppConfig;
use remix_model::BatchRequest;

pub fn run(path: PathBuf, force: bool, with_config: bool, config: &AppConfig) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    let request = BatchRequest::sample();
    request
        .save(&path)
        .map_err(|e| anyhow::anyhow!("Failed to write request: {e}"))?;

    println!("Sample request written to {}", path.display());
    println!("  Clips: {}", request.clips.len());
    println!("  Outputs: {}", request.config.output_count);
    println!("  Aspect ratio: {}", request.config.aspect_ratio.as_str());

    if with_config {
        config
            .save()
            .map_err(|e| anyhow::anyhow!("Failed to write application config: {e}"))?;
        println!("Application config written.");
    }

    Ok(())
}
