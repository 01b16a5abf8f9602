//! Batch results as handed back to the caller.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::clip::ClipId;
use crate::geometry::Geometry;
use crate::plan::{CompiledGraph, PlanWarning, RenderPlan, TrimWindow, VariantFailure};

/// One successfully planned and compiled variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantOutput {
    pub variant_id: String,
    pub index: usize,
    pub clip_order: Vec<ClipId>,
    pub compiled_graph_text: String,
    pub inputs: Vec<String>,
    pub output_geometry: Option<Geometry>,
    pub output_args: Vec<String>,
    pub audio_present: bool,
    pub applied_speeds: Vec<f64>,
    pub applied_trims: Vec<TrimWindow>,
    pub timeline_duration_secs: f64,
}

impl VariantOutput {
    pub fn from_parts(plan: &RenderPlan, graph: CompiledGraph) -> Self {
        Self {
            variant_id: graph.variant_id,
            index: plan.index,
            clip_order: plan.slots.iter().map(|s| s.clip_id.clone()).collect(),
            compiled_graph_text: graph.graph_text,
            inputs: graph.inputs,
            output_geometry: graph.output_geometry,
            output_args: graph.output_args,
            audio_present: graph.audio_present,
            applied_speeds: plan.speeds(),
            applied_trims: plan.trims(),
            timeline_duration_secs: plan.timeline_duration(),
        }
    }
}

/// Serializable summary of one batch call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    /// Creation timestamp (RFC 3339).
    pub generated_at: String,

    /// Number of variants that were requested.
    pub requested: usize,

    pub variants: Vec<VariantOutput>,
    pub failures: Vec<VariantFailure>,
    pub warnings: Vec<PlanWarning>,
}

impl BatchReport {
    pub fn new(
        requested: usize,
        variants: Vec<VariantOutput>,
        failures: Vec<VariantFailure>,
        warnings: Vec<PlanWarning>,
    ) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            requested,
            variants,
            failures,
            warnings,
        }
    }

    /// Indices the caller can retry.
    pub fn failed_indices(&self) -> Vec<usize> {
        self.failures.iter().map(|f| f.index).collect()
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), std::io::Error> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}
