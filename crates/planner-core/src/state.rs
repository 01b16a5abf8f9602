//! State carried from one batch call to the next.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use remix_model::ClipId;

/// Round-robin position and duplicate-avoidance memory.
///
/// Passed into a planning call and returned, updated, with its result.
/// Two calls given equal state, input and seed produce equal batches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchState {
    /// Global index of the next variant to be planned.
    pub next_variant_index: usize,

    /// Clip orders already accepted by random group mixing.
    pub accepted_group_orders: BTreeSet<Vec<ClipId>>,
}

impl BatchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue numbering from `index` with an empty duplicate set.
    pub fn starting_at(index: usize) -> Self {
        Self {
            next_variant_index: index,
            ..Self::default()
        }
    }

    /// Stable id of the variant at a global index.
    pub fn variant_id(global_index: usize) -> String {
        format!("variant-{:04}", global_index + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_ids_are_one_based_and_padded() {
        assert_eq!(BatchState::variant_id(0), "variant-0001");
        assert_eq!(BatchState::variant_id(41), "variant-0042");
        assert_eq!(BatchState::variant_id(12_344), "variant-12345");
    }

    #[test]
    fn test_state_serializes_camel_case() {
        let mut state = BatchState::starting_at(3);
        state
            .accepted_group_orders
            .insert(vec!["a".to_string(), "b".to_string()]);
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["nextVariantIndex"], 3);
        assert_eq!(json["acceptedGroupOrders"][0][1], "b");
    }
}
