//! Duration distribution: turn a target length into per-slot trim windows.
//!
//! # Algorithm
//!
//! 1. **Weights**: `equal` gives every slot weight 1, `proportional` uses the
//!    native duration, `weighted` uses `duration^w`.
//! 2. **Share**: each free slot's timeline contribution is
//!    `residual * weight / Σ free weights`.
//! 3. **Clamp**: a slot whose share exceeds what it can provide at its speed
//!    (`native / speed`) is pinned to its full length and leaves the pool.
//! 4. **Renormalize**: repeat step 2 over the remaining budget until no slot
//!    needs clamping.
//!
//! Every slot always receives a non-empty window; the slot count never changes.

use remix_common::{RemixError, RemixResult};
use remix_model::{DistributionMode, DurationType, MixingConfiguration, TrimWindow};

/// Slack used when deciding whether a share overflows a clip.
const CLAMP_EPSILON: f64 = 1e-9;

/// Solves the trim/speed arithmetic for one plan.
#[derive(Debug, Clone)]
pub struct DurationDistributor {
    tolerance_secs: f64,
}

impl Default for DurationDistributor {
    fn default() -> Self {
        Self::new(0.05)
    }
}

impl DurationDistributor {
    pub fn new(tolerance_secs: f64) -> Self {
        Self { tolerance_secs }
    }

    pub fn tolerance_secs(&self) -> f64 {
        self.tolerance_secs
    }

    /// Compute one trim window per slot.
    ///
    /// `native_durations[k]` and `speeds[k]` describe slot `k` of the plan's
    /// clip order. The returned vector always has the same length.
    pub fn distribute(
        &self,
        native_durations: &[f64],
        speeds: &[f64],
        config: &MixingConfiguration,
    ) -> RemixResult<Vec<TrimWindow>> {
        if native_durations.len() != speeds.len() {
            return Err(RemixError::distribution(format!(
                "{} durations but {} speeds",
                native_durations.len(),
                speeds.len()
            )));
        }
        if native_durations.is_empty() {
            return Err(RemixError::distribution("plan has no slots"));
        }
        if let Some(k) = native_durations
            .iter()
            .position(|d| !d.is_finite() || *d <= 0.0)
        {
            return Err(RemixError::distribution(format!(
                "slot {k} has invalid native duration {}",
                native_durations[k]
            )));
        }
        if let Some(k) = speeds.iter().position(|s| !s.is_finite() || *s <= 0.0) {
            return Err(RemixError::distribution(format!(
                "slot {k} has invalid speed {}",
                speeds[k]
            )));
        }

        match config.duration_type {
            DurationType::Original => Ok(native_durations
                .iter()
                .map(|d| TrimWindow::full(*d))
                .collect()),
            DurationType::Fixed => {
                let target = config.target_duration_seconds.ok_or_else(|| {
                    RemixError::distribution("fixed duration without a target")
                })?;
                let weights = slot_weights(
                    native_durations,
                    config.duration_distribution_mode,
                    config.weighted_exponent,
                );
                self.solve_fixed(native_durations, speeds, &weights, target)
            }
        }
    }

    fn solve_fixed(
        &self,
        native_durations: &[f64],
        speeds: &[f64],
        weights: &[f64],
        target: f64,
    ) -> RemixResult<Vec<TrimWindow>> {
        let n = native_durations.len();
        if let Some(k) = weights.iter().position(|w| !w.is_finite() || *w <= 0.0) {
            return Err(RemixError::distribution(format!(
                "slot {k} has degenerate weight {}",
                weights[k]
            )));
        }

        // Timeline seconds each slot can provide at its speed.
        let capacity: Vec<f64> = native_durations
            .iter()
            .zip(speeds)
            .map(|(d, s)| d / s)
            .collect();

        let mut pinned: Vec<Option<f64>> = vec![None; n];
        let mut shares = vec![0.0; n];
        let mut passes = 0usize;

        loop {
            passes += 1;
            let residual = target - pinned.iter().flatten().sum::<f64>();
            let free: Vec<usize> = (0..n).filter(|k| pinned[*k].is_none()).collect();
            if free.is_empty() {
                break;
            }

            let weight_sum: f64 = free.iter().map(|k| weights[*k]).sum();
            let mut clamped = false;
            for &k in &free {
                let share = residual * weights[k] / weight_sum;
                if share > capacity[k] + CLAMP_EPSILON {
                    pinned[k] = Some(capacity[k]);
                    clamped = true;
                } else {
                    shares[k] = share;
                }
            }

            if !clamped {
                break;
            }
        }

        for (k, pin) in pinned.iter().enumerate() {
            if let Some(cap) = pin {
                shares[k] = *cap;
            }
        }

        let achieved: f64 = shares.iter().sum();
        tracing::debug!(
            target_secs = target,
            achieved_secs = achieved,
            clamped = pinned.iter().filter(|p| p.is_some()).count(),
            passes,
            "Distributed fixed duration"
        );

        if (achieved - target).abs() > self.tolerance_secs {
            return Err(RemixError::distribution(format!(
                "target {target:.3}s unreachable: clips provide at most {achieved:.3}s at the assigned speeds"
            )));
        }

        let trims: Vec<TrimWindow> = shares
            .iter()
            .zip(speeds)
            .zip(native_durations)
            .map(|((share, speed), native)| TrimWindow::new(0.0, (share * speed).min(*native)))
            .collect();

        if let Some(k) = trims.iter().position(|t| !t.is_valid()) {
            return Err(RemixError::distribution(format!(
                "slot {k} received an empty trim window"
            )));
        }

        Ok(trims)
    }
}

fn slot_weights(native_durations: &[f64], mode: DistributionMode, exponent: f64) -> Vec<f64> {
    match mode {
        DistributionMode::Equal => vec![1.0; native_durations.len()],
        DistributionMode::Proportional => native_durations.to_vec(),
        DistributionMode::Weighted => native_durations.iter().map(|d| d.powf(exponent)).collect(),
    }
}

/// Timeline length of a set of trims played at the given speeds.
pub fn timeline_length(trims: &[TrimWindow], speeds: &[f64]) -> f64 {
    trims
        .iter()
        .zip(speeds)
        .map(|(t, s)| t.duration() / s)
        .sum()
}
