//! Remix Planner
//!
//! Turns a clip list and a mixing configuration into render plans:
//! - **Orderings:** identity, rotation buckets, distinct permutations
//! - **Group mixing:** one clip per group, strict or random
//! - **Speeds:** round-robin palette or bounded jitter
//! - **Durations:** trim windows that hit a target length without dropping clips
//!
//! This crate is pure computation. Randomness comes from a seeded RNG and
//! all state between batch calls is passed explicitly.

pub mod duration;
pub mod groups;
pub mod permutations;
pub mod speed;
pub mod state;
pub mod variants;

pub use duration::DurationDistributor;
pub use groups::{GroupLayout, GroupSelector};
pub use speed::SpeedPolicy;
pub use state::BatchState;
pub use variants::{PlanningOutcome, VariantPlanner};
