//! Render plans, compiled graphs, and per-variant outcomes.
//!
//! A plan is stored slot-wise: one [`PlanSlot`] per position in the clip
//! order. The slot list is fixed in length from the moment the plan is
//! created; only trim values are ever corrected.

use serde::{Deserialize, Serialize};

use crate::clip::ClipId;
use crate::config::AudioMode;
use crate::geometry::{Geometry, GeometryTarget};

/// Source-time window `[start, end]` in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimWindow {
    pub start: f64,
    pub end: f64,
}

impl TrimWindow {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// The whole clip.
    pub fn full(duration: f64) -> Self {
        Self {
            start: 0.0,
            end: duration,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// A window is usable when it is finite, non-negative and non-empty.
    pub fn is_valid(&self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.start >= 0.0 && self.end > self.start
    }
}

/// One position in a plan's clip order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSlot {
    pub clip_id: ClipId,
    pub speed: f64,
    pub trim: TrimWindow,
}

impl PlanSlot {
    /// Seconds this slot occupies on the output timeline.
    pub fn timeline_secs(&self) -> f64 {
        self.trim.duration() / self.speed
    }
}

/// One fully specified recipe for a single output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderPlan {
    pub variant_id: String,

    /// Position of the variant inside its batch.
    pub index: usize,

    /// Rotation bucket that fixed clip[0], when starting clips are distributed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_bucket: Option<usize>,

    pub slots: Vec<PlanSlot>,
    pub audio_mode: AudioMode,
    pub geometry_target: GeometryTarget,
}

impl RenderPlan {
    pub fn clip_order(&self) -> Vec<&str> {
        self.slots.iter().map(|s| s.clip_id.as_str()).collect()
    }

    /// Speed per slot, aligned with [`RenderPlan::clip_order`].
    pub fn speeds(&self) -> Vec<f64> {
        self.slots.iter().map(|s| s.speed).collect()
    }

    /// Trim window per slot, aligned with [`RenderPlan::clip_order`].
    pub fn trims(&self) -> Vec<TrimWindow> {
        self.slots.iter().map(|s| s.trim).collect()
    }

    /// Length of the rendered output in seconds.
    pub fn timeline_duration(&self) -> f64 {
        self.slots.iter().map(PlanSlot::timeline_secs).sum()
    }

    pub fn stream_count(&self) -> usize {
        self.slots.len()
    }
}

/// Filter graph ready to hand to the transcoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledGraph {
    pub variant_id: String,

    /// `-filter_complex` text.
    pub graph_text: String,

    /// Number of per-clip streams (equals the plan's slot count).
    pub stream_count: usize,

    pub audio_present: bool,

    /// Source references in input order; slot `k` reads input `k`.
    pub inputs: Vec<String>,

    /// Frame size of the output, `None` when it follows unknown source geometry.
    pub output_geometry: Option<Geometry>,

    /// Encoder, bitrate, frame-rate, and metadata arguments.
    pub output_args: Vec<String>,

    /// Final video pad label.
    pub video_label: String,

    /// Final audio pad label, when the graph carries audio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_label: Option<String>,
}

/// Which stage rejected a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureStage {
    Distribution,
    Compilation,
}

/// A variant that could not be produced. The rest of the batch is unaffected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantFailure {
    pub index: usize,
    pub variant_id: String,
    pub stage: FailureStage,
    pub reason: String,
}

/// Non-fatal planning observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    /// The ordering space was exhausted and an ordering was reused.
    RepeatedOrdering,
    /// Random group mixing accepted an already-used selection.
    DuplicateGroupSelection,
    /// Nothing in the configuration makes this variant differ from earlier
    /// ones (voiceover with every mixing option off).
    IdenticalVariant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanWarning {
    pub index: usize,
    pub variant_id: String,
    pub kind: WarningKind,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(id: &str, speed: f64, end: f64) -> PlanSlot {
        PlanSlot {
            clip_id: id.to_string(),
            speed,
            trim: TrimWindow::new(0.0, end),
        }
    }

    #[test]
    fn test_timeline_duration_accounts_for_speed() {
        let plan = RenderPlan {
            variant_id: "variant-0001".to_string(),
            index: 0,
            start_bucket: None,
            slots: vec![slot("a", 2.0, 10.0), slot("b", 0.5, 2.0)],
            audio_mode: AudioMode::Keep,
            geometry_target: GeometryTarget::Source,
        };
        assert!((plan.timeline_duration() - 9.0).abs() < 1e-9);
        assert_eq!(plan.clip_order(), vec!["a", "b"]);
        assert_eq!(plan.speeds(), vec![2.0, 0.5]);
        assert_eq!(plan.stream_count(), 2);
    }

    #[test]
    fn test_trim_window_validity() {
        assert!(TrimWindow::full(3.0).is_valid());
        assert!(!TrimWindow::new(2.0, 2.0).is_valid());
        assert!(!TrimWindow::new(-0.1, 2.0).is_valid());
        assert!(!TrimWindow::new(0.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn test_failure_stage_serializes_kebab_case() {
        let failure = VariantFailure {
            index: 3,
            variant_id: "variant-0004".to_string(),
            stage: FailureStage::Distribution,
            reason: "target unreachable".to_string(),
        };
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["stage"], "distribution");
        assert_eq!(json["variantId"], "variant-0004");
    }
}
