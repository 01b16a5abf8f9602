//! The variant planner: one batch call in, N render plans out.
//!
//! # Pipeline
//!
//! 1. **Validate** the configuration and clips. Problems here fail the batch.
//! 2. **Order** the clips for every variant (identity, rotation, permutation,
//!    or group selection). A rotation bucket is fixed first; randomness only
//!    ever touches the slots after clip[0].
//! 3. **Speed** every slot according to the [`SpeedPolicy`].
//! 4. **Distribute** the duration per plan. A failure here is recorded for that
//!    variant only.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use remix_common::{
    PlannerDefaults, RemixError, RemixResult, MAX_PERMUTATION_ENUMERATION_LIMIT,
};
use remix_model::{
    BatchRequest, Clip, FailureStage, GroupSpec, MixingConfiguration, PlanSlot, PlanWarning,
    RenderPlan, VariantFailure, WarningKind,
};

use crate::duration::DurationDistributor;
use crate::groups::{GroupLayout, GroupSelector};
use crate::permutations::draw_orderings;
use crate::speed::SpeedPolicy;
use crate::state::BatchState;

/// Result of one planning call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningOutcome {
    /// Plans that passed duration distribution, in index order.
    pub plans: Vec<RenderPlan>,
    pub failures: Vec<VariantFailure>,
    pub warnings: Vec<PlanWarning>,
}

/// Clip order chosen for one variant before speeds and trims.
#[derive(Debug, Clone)]
struct Ordering {
    clip_indices: Vec<usize>,
    start_bucket: Option<usize>,
    warning: Option<(WarningKind, String)>,
}

/// Plans batches of render variants.
#[derive(Debug, Clone)]
pub struct VariantPlanner {
    settings: PlannerDefaults,
}

impl Default for VariantPlanner {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl VariantPlanner {
    pub fn new(settings: PlannerDefaults) -> Self {
        Self { settings }
    }

    pub fn with_defaults() -> Self {
        Self::new(PlannerDefaults::default())
    }

    pub fn settings(&self) -> &PlannerDefaults {
        &self.settings
    }

    /// Plan a batch from scratch. Groups, if any, are derived from the clips.
    pub fn plan(&self, clips: &[Clip], config: &MixingConfiguration) -> RemixResult<PlanningOutcome> {
        self.plan_with_state(clips, &[], config, BatchState::default())
            .map(|(outcome, _)| outcome)
    }

    /// Plan the batch described by a request file.
    pub fn plan_request(
        &self,
        request: &BatchRequest,
        state: BatchState,
    ) -> RemixResult<(PlanningOutcome, BatchState)> {
        self.plan_with_state(&request.clips, &request.groups, &request.config, state)
    }

    /// Plan a batch continuing from `state`; returns the updated state.
    pub fn plan_with_state(
        &self,
        clips: &[Clip],
        groups: &[GroupSpec],
        config: &MixingConfiguration,
        state: BatchState,
    ) -> RemixResult<(PlanningOutcome, BatchState)> {
        config
            .validate()
            .map_err(|v| RemixError::configuration(v.to_string()))?;
        validate_clips(clips)?;

        let mut state = state;
        let base = state.next_variant_index;
        let count = config.output_count;

        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);

        tracing::info!(
            clips = clips.len(),
            count,
            base,
            seed,
            order_mixing = config.order_mixing,
            different_starting_clip = config.different_starting_clip,
            group_mixing = config.group_mixing,
            "Planning batch"
        );

        let orderings = if config.group_mixing {
            let layout = GroupLayout::resolve(clips, groups)?;
            let selector = GroupSelector::new(
                layout,
                config.group_mixing_mode,
                self.settings.group_retry_attempts,
                config.duplicate_policy,
            );
            group_orderings(&selector, clips, count, base, &mut rng, &mut state)?
        } else {
            self.clip_orderings(clips.len(), config, count, base, &mut rng)
        };

        let speeds = SpeedPolicy::from_config(config);
        let uniform = speeds == SpeedPolicy::Unit && !config.has_structural_variability();
        let distributor = DurationDistributor::new(self.settings.duration_tolerance_secs);
        let geometry_target = config.aspect_ratio.geometry_target();

        let mut outcome = PlanningOutcome::default();

        for (i, ordering) in orderings.into_iter().enumerate() {
            let global = base + i;
            let variant_id = BatchState::variant_id(global);

            if let Some((kind, message)) = ordering.warning {
                tracing::warn!(index = i, variant_id = %variant_id, ?kind, "{message}");
                outcome.warnings.push(PlanWarning {
                    index: i,
                    variant_id: variant_id.clone(),
                    kind,
                    message,
                });
            }

            if uniform && global > 0 {
                let message = format!(
                    "{:?} audio with no mixing enabled; identical to {}",
                    config.audio_mode,
                    BatchState::variant_id(0)
                );
                tracing::warn!(index = i, variant_id = %variant_id, "{message}");
                outcome.warnings.push(PlanWarning {
                    index: i,
                    variant_id: variant_id.clone(),
                    kind: WarningKind::IdenticalVariant,
                    message,
                });
            }

            let mut indices = ordering.clip_indices;
            if indices.len() == 1 {
                indices.push(indices[0]);
            }

            let slot_speeds = speeds.speeds_for(global, indices.len());
            let natives: Vec<f64> = indices.iter().map(|&k| clips[k].duration_seconds).collect();

            match distributor.distribute(&natives, &slot_speeds, config) {
                Ok(trims) => {
                    let slots = indices
                        .iter()
                        .zip(slot_speeds)
                        .zip(trims)
                        .map(|((&k, speed), trim)| PlanSlot {
                            clip_id: clips[k].id.clone(),
                            speed,
                            trim,
                        })
                        .collect();
                    outcome.plans.push(RenderPlan {
                        variant_id,
                        index: i,
                        start_bucket: ordering.start_bucket,
                        slots,
                        audio_mode: config.audio_mode,
                        geometry_target,
                    });
                }
                Err(e) => {
                    tracing::warn!(index = i, variant_id = %variant_id, error = %e, "Variant failed distribution");
                    outcome.failures.push(VariantFailure {
                        index: i,
                        variant_id,
                        stage: FailureStage::Distribution,
                        reason: e.to_string(),
                    });
                }
            }
        }

        state.next_variant_index = base + count;

        tracing::info!(
            planned = outcome.plans.len(),
            failed = outcome.failures.len(),
            warnings = outcome.warnings.len(),
            "Batch planned"
        );

        Ok((outcome, state))
    }

    fn clip_orderings(
        &self,
        n: usize,
        config: &MixingConfiguration,
        count: usize,
        base: usize,
        rng: &mut StdRng,
    ) -> Vec<Ordering> {
        let identity: Vec<usize> = (0..n).collect();
        let limit = self
            .settings
            .permutation_enumeration_limit
            .min(MAX_PERMUTATION_ENUMERATION_LIMIT);

        match (config.order_mixing, config.different_starting_clip) {
            (false, false) => (0..count)
                .map(|_| Ordering {
                    clip_indices: identity.clone(),
                    start_bucket: None,
                    warning: None,
                })
                .collect(),

            (false, true) => (0..count)
                .map(|i| {
                    let bucket = (base + i) % n;
                    let mut order = identity.clone();
                    order.rotate_left(bucket);
                    Ordering {
                        clip_indices: order,
                        start_bucket: Some(bucket),
                        warning: None,
                    }
                })
                .collect(),

            (true, false) => draw_orderings(n, count, limit, rng)
                .into_iter()
                .map(|drawn| Ordering {
                    warning: drawn.repeated.then(|| {
                        (
                            WarningKind::RepeatedOrdering,
                            format!("all {n}! orderings used; reusing an earlier ordering"),
                        )
                    }),
                    clip_indices: drawn.indices,
                    start_bucket: None,
                })
                .collect(),

            (true, true) => bucketed_orderings(n, count, base, limit, rng),
        }
    }
}

/// Fix clip[0] by rotation bucket, then permute only the tail.
fn bucketed_orderings(
    n: usize,
    count: usize,
    base: usize,
    limit: u64,
    rng: &mut StdRng,
) -> Vec<Ordering> {
    let mut slots: Vec<Option<Ordering>> = vec![None; count];

    for bucket in 0..n {
        let members: Vec<usize> = (0..count).filter(|i| (base + i) % n == bucket).collect();
        if members.is_empty() {
            continue;
        }

        let tail: Vec<usize> = (0..n).filter(|&k| k != bucket).collect();
        let drawn = draw_orderings(tail.len(), members.len(), limit, rng);

        for (i, tail_order) in members.into_iter().zip(drawn) {
            let mut order = Vec::with_capacity(n);
            order.push(bucket);
            order.extend(tail_order.indices.iter().map(|&t| tail[t]));
            slots[i] = Some(Ordering {
                clip_indices: order,
                start_bucket: Some(bucket),
                warning: tail_order.repeated.then(|| {
                    (
                        WarningKind::RepeatedOrdering,
                        format!(
                            "all orderings starting with clip {bucket} used; reusing an earlier ordering"
                        ),
                    )
                }),
            });
        }
    }

    slots.into_iter().flatten().collect()
}

fn group_orderings(
    selector: &GroupSelector,
    clips: &[Clip],
    count: usize,
    base: usize,
    rng: &mut StdRng,
    state: &mut BatchState,
) -> RemixResult<Vec<Ordering>> {
    tracing::debug!(groups = selector.layout().len(), "Selecting clips by group");

    (0..count)
        .map(|i| {
            let selection =
                selector.select(base + i, clips, rng, &mut state.accepted_group_orders)?;
            Ok(Ordering {
                clip_indices: selection.clip_indices,
                start_bucket: None,
                warning: selection.duplicate.then(|| {
                    (
                        WarningKind::DuplicateGroupSelection,
                        "retry budget exhausted; accepted a previously used group selection"
                            .to_string(),
                    )
                }),
            })
        })
        .collect()
}

fn validate_clips(clips: &[Clip]) -> RemixResult<()> {
    if clips.is_empty() {
        return Err(RemixError::insufficient_input("no clips supplied"));
    }

    let mut seen = HashSet::new();
    for clip in clips {
        if clip.id.trim().is_empty() {
            return Err(RemixError::configuration("clip with empty id"));
        }
        if !seen.insert(clip.id.as_str()) {
            return Err(RemixError::configuration(format!(
                "duplicate clip id '{}'",
                clip.id
            )));
        }
        if !clip.has_valid_duration() {
            return Err(RemixError::configuration(format!(
                "clip '{}' has invalid duration {}",
                clip.id, clip.duration_seconds
            )));
        }
    }

    Ok(())
}
