//! Mixing configuration for one batch.
//!
//! A configuration is validated as a whole before any planning starts.
//! Contradictory settings are rejected, never coerced into something the
//! caller did not ask for.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geometry::AspectRatio;

/// How each clip's trim window is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DurationType {
    /// Every clip plays at its native length.
    #[default]
    Original,
    /// A caller target is distributed across the clips.
    Fixed,
}

/// How a fixed target duration is split between clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DistributionMode {
    #[default]
    Equal,
    Proportional,
    Weighted,
}

/// Group selection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum GroupMixingMode {
    /// Ascending group order, round-robin member choice.
    #[default]
    Strict,
    /// Shuffled group order and member choice.
    Random,
}

/// What happens to clip audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AudioMode {
    #[default]
    Keep,
    Mute,
    /// Clip audio is dropped; narration is muxed by a downstream collaborator.
    Voiceover,
}

/// Output quality tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum QualityTier {
    Low,
    #[default]
    Medium,
    High,
}

/// Behaviour when random group mixing cannot find an unused combination
/// within its retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Keep the duplicate selection and record a warning.
    #[default]
    Accept,
    /// Fail the whole batch.
    FailBatch,
}

/// Complete mixing configuration for one batch call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MixingConfiguration {
    pub order_mixing: bool,
    pub speed_mixing: bool,
    pub different_starting_clip: bool,
    pub group_mixing: bool,
    pub group_mixing_mode: GroupMixingMode,

    /// Speed factors available to speed mixing. Treated as a set.
    pub allowed_speeds: Vec<f64>,

    pub duration_type: DurationType,
    pub duration_distribution_mode: DistributionMode,
    pub target_duration_seconds: Option<f64>,

    /// Exponent used by weighted distribution (must be > 1).
    pub weighted_exponent: f64,

    pub aspect_ratio: AspectRatio,
    pub quality_tier: QualityTier,
    pub audio_mode: AudioMode,

    /// Number of variants requested.
    pub output_count: usize,

    pub duplicate_policy: DuplicatePolicy,

    /// Seed for every random choice in the batch. Same seed, same batch.
    pub seed: Option<u64>,

    /// Output frame rate.
    pub frame_rate: u32,

    /// Opaque key/value pairs embedded in every output container.
    pub metadata: BTreeMap<String, String>,
}

impl Default for MixingConfiguration {
    fn default() -> Self {
        Self {
            order_mixing: false,
            speed_mixing: false,
            different_starting_clip: false,
            group_mixing: false,
            group_mixing_mode: GroupMixingMode::Strict,
            allowed_speeds: vec![0.9, 1.0, 1.1],
            duration_type: DurationType::Original,
            duration_distribution_mode: DistributionMode::Equal,
            target_duration_seconds: None,
            weighted_exponent: 1.5,
            aspect_ratio: AspectRatio::Original,
            quality_tier: QualityTier::Medium,
            audio_mode: AudioMode::Keep,
            output_count: 1,
            duplicate_policy: DuplicatePolicy::Accept,
            seed: None,
            frame_rate: 30,
            metadata: BTreeMap::new(),
        }
    }
}

/// A configuration that cannot be planned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigViolation {
    #[error("voiceover audio requires durationType=original")]
    VoiceoverRequiresOriginalDuration,

    #[error("voiceover audio cannot be combined with speed mixing")]
    VoiceoverWithSpeedMixing,

    #[error("outputCount must be at least 1")]
    ZeroOutputCount,

    #[error("speed mixing requires at least one allowed speed")]
    EmptySpeedSet,

    #[error("allowed speed {0} is outside (0, 100]")]
    InvalidSpeed(f64),

    #[error("durationType=fixed requires targetDurationSeconds")]
    MissingTargetDuration,

    #[error("targetDurationSeconds must be positive, got {0}")]
    InvalidTargetDuration(f64),

    #[error("weightedExponent must be greater than 1, got {0}")]
    InvalidWeightedExponent(f64),

    #[error("frameRate must be positive")]
    InvalidFrameRate,
}

impl MixingConfiguration {
    /// Check every cross-field invariant.
    pub fn validate(&self) -> Result<(), ConfigViolation> {
        if self.audio_mode == AudioMode::Voiceover {
            if self.duration_type != DurationType::Original {
                return Err(ConfigViolation::VoiceoverRequiresOriginalDuration);
            }
            if self.speed_mixing {
                return Err(ConfigViolation::VoiceoverWithSpeedMixing);
            }
        }

        if self.output_count == 0 {
            return Err(ConfigViolation::ZeroOutputCount);
        }

        if self.speed_mixing {
            if self.allowed_speeds.is_empty() {
                return Err(ConfigViolation::EmptySpeedSet);
            }
            if let Some(bad) = self
                .allowed_speeds
                .iter()
                .copied()
                .find(|s| !s.is_finite() || *s <= 0.0 || *s > 100.0)
            {
                return Err(ConfigViolation::InvalidSpeed(bad));
            }
        }

        if self.duration_type == DurationType::Fixed {
            match self.target_duration_seconds {
                None => return Err(ConfigViolation::MissingTargetDuration),
                Some(t) if !t.is_finite() || t <= 0.0 => {
                    return Err(ConfigViolation::InvalidTargetDuration(t))
                }
                Some(_) => {}
            }
            if self.duration_distribution_mode == DistributionMode::Weighted
                && !(self.weighted_exponent.is_finite() && self.weighted_exponent > 1.0)
            {
                return Err(ConfigViolation::InvalidWeightedExponent(
                    self.weighted_exponent,
                ));
            }
        }

        if self.frame_rate == 0 {
            return Err(ConfigViolation::InvalidFrameRate);
        }

        Ok(())
    }

    /// Allowed speeds as a sorted, de-duplicated palette.
    pub fn speed_palette(&self) -> Vec<f64> {
        let mut speeds = self.allowed_speeds.clone();
        speeds.sort_by(f64::total_cmp);
        speeds.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
        speeds
    }

    /// Whether any ordering/selection feature already makes variants differ.
    pub fn has_structural_variability(&self) -> bool {
        self.order_mixing || self.different_starting_clip || self.group_mixing
    }
}
