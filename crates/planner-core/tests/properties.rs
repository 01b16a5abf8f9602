use std::collections::{HashMap, HashSet};

use proptest::prelude::*;

use remix_model::{Clip, DistributionMode, DurationType, MixingConfiguration};
use remix_planner::duration::timeline_length;
use remix_planner::permutations::factorial;
use remix_planner::VariantPlanner;

fn clips_from(durations: &[f64]) -> Vec<Clip> {
    durations
        .iter()
        .enumerate()
        .map(|(i, d)| Clip::new(format!("clip-{i}"), *d))
        .collect()
}

fn mode_strategy() -> impl Strategy<Value = DistributionMode> {
    prop_oneof![
        Just(DistributionMode::Equal),
        Just(DistributionMode::Proportional),
        Just(DistributionMode::Weighted),
    ]
}

proptest! {
    #[test]
    fn orderings_are_distinct_within_permutation_space(
        n in 1usize..=6,
        count_seed in 1usize..=720,
        seed in any::<u64>(),
    ) {
        let space = factorial(n).unwrap() as usize;
        let count = 1 + count_seed % space;
        let config = MixingConfiguration {
            order_mixing: true,
            output_count: count,
            seed: Some(seed),
            ..Default::default()
        };
        let clips = clips_from(&vec![2.0; n]);

        let outcome = VariantPlanner::with_defaults().plan(&clips, &config).unwrap();
        let orders: HashSet<Vec<&str>> = outcome.plans.iter().map(|p| p.clip_order()).collect();

        prop_assert_eq!(orders.len(), count);
        prop_assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn starting_clips_rotate_and_balance(
        n in 1usize..=8,
        count in 1usize..=40,
    ) {
        let config = MixingConfiguration {
            different_starting_clip: true,
            output_count: count,
            ..Default::default()
        };
        let clips = clips_from(&vec![3.0; n]);

        let outcome = VariantPlanner::with_defaults().plan(&clips, &config).unwrap();
        let mut starts: HashMap<&str, usize> = HashMap::new();
        for (i, plan) in outcome.plans.iter().enumerate() {
            let first = plan.clip_order()[0];
            prop_assert_eq!(first, clips[i % n].id.as_str());
            *starts.entry(first).or_default() += 1;
        }

        let used = starts.len();
        let max = starts.values().copied().max().unwrap_or(0);
        let min = if used < n { 0 } else { starts.values().copied().min().unwrap_or(0) };
        prop_assert!(max - min <= 1, "unbalanced starts: {:?}", starts);
    }

    #[test]
    fn fixed_duration_hits_target_without_dropping_clips(
        durations in prop::collection::vec(1.0f64..30.0, 1..8),
        fraction in 0.05f64..0.95,
        mode in mode_strategy(),
        speed_mixing in any::<bool>(),
        seed in any::<u64>(),
    ) {
        let clips = clips_from(&durations);
        let slots = durations.len().max(2);
        // Slowest-case capacity keeps the target reachable at any assigned speed.
        let capacity: f64 = if durations.len() == 1 {
            2.0 * durations[0] / 1.1
        } else {
            durations.iter().map(|d| d / 1.1).sum()
        };
        let target = capacity * fraction;

        let config = MixingConfiguration {
            duration_type: DurationType::Fixed,
            duration_distribution_mode: mode,
            target_duration_seconds: Some(target),
            speed_mixing,
            order_mixing: true,
            output_count: 4,
            seed: Some(seed),
            ..Default::default()
        };

        let outcome = VariantPlanner::with_defaults().plan(&clips, &config).unwrap();
        prop_assert!(outcome.failures.is_empty(), "{:?}", outcome.failures);

        for plan in &outcome.plans {
            prop_assert_eq!(plan.slots.len(), slots);
            let total = timeline_length(&plan.trims(), &plan.speeds());
            prop_assert!((total - target).abs() <= 0.05, "total {} vs target {}", total, target);
            for slot in &plan.slots {
                prop_assert!(slot.trim.is_valid());
            }
        }
    }
}
