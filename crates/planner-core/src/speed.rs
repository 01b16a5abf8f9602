//! Per-slot playback speed assignment.

use remix_model::{AudioMode, MixingConfiguration};

/// Lower bound of the jitter band.
pub const JITTER_MIN: f64 = 0.95;
/// Upper bound of the jitter band.
pub const JITTER_MAX: f64 = 1.05;

/// How speeds are chosen for a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum SpeedPolicy {
    /// Cycle through the palette; slot `k` of variant `i` gets
    /// `palette[(i + k) mod len]`.
    RoundRobin(Vec<f64>),

    /// One uniform speed per variant inside the jitter band. The first
    /// `count` global indices are evenly spaced across the band; later
    /// indices fall between them.
    /// Used only when nothing else makes the variants differ.
    Jitter { count: usize },

    /// Every slot plays at 1.0.
    Unit,
}

impl SpeedPolicy {
    pub fn from_config(config: &MixingConfiguration) -> Self {
        if config.speed_mixing {
            let palette = config.speed_palette();
            if palette.is_empty() {
                return SpeedPolicy::Unit;
            }
            return SpeedPolicy::RoundRobin(palette);
        }

        if !config.has_structural_variability() && config.audio_mode != AudioMode::Voiceover {
            return SpeedPolicy::Jitter {
                count: config.output_count,
            };
        }

        SpeedPolicy::Unit
    }

    /// Speeds for every slot of the variant at `global_index`, its position
    /// across batches.
    pub fn speeds_for(&self, global_index: usize, slots: usize) -> Vec<f64> {
        match self {
            SpeedPolicy::RoundRobin(palette) => (0..slots)
                .map(|k| palette[(global_index + k) % palette.len()])
                .collect(),
            SpeedPolicy::Jitter { count } => vec![jitter(global_index, *count); slots],
            SpeedPolicy::Unit => vec![1.0; slots],
        }
    }
}

/// Indices below `count` sit on the grid `i/(count-1)` of the band. Each
/// later pass over the `count-1` intervals is shifted by a distinct
/// fraction in `(0, 1)`, so no speed is handed out twice.
fn jitter(index: usize, count: usize) -> f64 {
    let t = if count <= 1 {
        if index == 0 {
            return 1.0;
        }
        radical_inverse(index + 1)
    } else if index < count {
        index as f64 / (count - 1) as f64
    } else {
        let intervals = count - 1;
        let rest = index - count;
        let pass = rest / intervals + 1;
        ((rest % intervals) as f64 + radical_inverse(pass)) / intervals as f64
    };
    (JITTER_MIN + (JITTER_MAX - JITTER_MIN) * t).clamp(JITTER_MIN, JITTER_MAX)
}

/// Base-2 van der Corput value of `n`: 1 → 0.5, 2 → 0.25, 3 → 0.75, ...
fn radical_inverse(mut n: usize) -> f64 {
    let mut value = 0.0;
    let mut scale = 0.5;
    while n > 0 {
        if n & 1 == 1 {
            value += scale;
        }
        n >>= 1;
        scale *= 0.5;
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jitter_spans_band_and_differs() {
        let config = MixingConfiguration {
            output_count: 3,
            ..Default::default()
        };
        let policy = SpeedPolicy::from_config(&config);
        let speeds: Vec<f64> = (0..3).map(|i| policy.speeds_for(i, 2)[0]).collect();
        assert!((speeds[0] - 0.95).abs() < 1e-9);
        assert!((speeds[1] - 1.00).abs() < 1e-9);
        assert!((speeds[2] - 1.05).abs() < 1e-9);
    }

    #[test]
    fn test_single_output_jitter_is_unit() {
        let policy = SpeedPolicy::Jitter { count: 1 };
        assert_eq!(policy.speeds_for(0, 3), vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_round_robin_changes_every_slot_between_neighbours() {
        let config = MixingConfiguration {
            speed_mixing: true,
            allowed_speeds: vec![1.1, 0.9, 1.0],
            output_count: 4,
            ..Default::default()
        };
        let policy = SpeedPolicy::from_config(&config);
        assert_eq!(policy.speeds_for(0, 3), vec![0.9, 1.0, 1.1]);
        for i in 0..3 {
            let a = policy.speeds_for(i, 3);
            let b = policy.speeds_for(i + 1, 3);
            assert!(a.iter().zip(&b).all(|(x, y)| x != y), "{a:?} {b:?}");
        }
    }

    #[test]
    fn test_structural_variability_disables_jitter() {
        let config = MixingConfiguration {
            order_mixing: true,
            output_count: 5,
            ..Default::default()
        };
        assert_eq!(SpeedPolicy::from_config(&config), SpeedPolicy::Unit);
    }

    #[test]
    fn test_voiceover_never_jitters() {
        let config = MixingConfiguration {
            audio_mode: AudioMode::Voiceover,
            output_count: 5,
            ..Default::default()
        };
        assert_eq!(SpeedPolicy::from_config(&config), SpeedPolicy::Unit);
    }

    #[test]
    fn test_continued_batches_never_reuse_a_jitter_speed() {
        let policy = SpeedPolicy::Jitter { count: 3 };
        let speeds: Vec<f64> = (0..12).map(|g| policy.speeds_for(g, 1)[0]).collect();

        for (i, a) in speeds.iter().enumerate() {
            assert!((JITTER_MIN..=JITTER_MAX).contains(a), "{a}");
            for b in &speeds[i + 1..] {
                assert!((a - b).abs() > 1e-9, "{speeds:?}");
            }
        }
        // variant-0004 starts the second batch and lands between 0.95 and 1.00.
        assert!((speeds[3] - 0.975).abs() < 1e-9);
    }

    #[test]
    fn test_single_output_batches_still_differ_when_continued() {
        let policy = SpeedPolicy::Jitter { count: 1 };
        assert_eq!(policy.speeds_for(0, 1), vec![1.0]);
        assert!((policy.speeds_for(1, 1)[0] - 1.0).abs() > 1e-9);
        assert!((policy.speeds_for(1, 1)[0] - policy.speeds_for(2, 1)[0]).abs() > 1e-9);
    }
}
