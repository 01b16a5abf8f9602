//! CLI subcommand implementations.

pub mod compile;
pub mod init;
pub mod plan;
pub mod validate;

use std::path::Path;

use remix_model::BatchRequest;

/// Load a request and apply command-line overrides.
pub(crate) fn load_request(
    path: &Path,
    count: Option<usize>,
    seed: Option<u64>,
) -> anyhow::Result<BatchRequest> {
    let mut request = BatchRequest::load(path)
        .map_err(|e| anyhow::anyhow!("Failed to load request: {e}"))?;

    if let Some(count) = count {
        request.config.output_count = count;
    }
    if seed.is_some() {
        request.config.seed = seed;
    }

    Ok(request)
}
