pub mod engine;
pub mod impact;
pub mod weights;

pub use engine::{run_simulation, GainBreakdown, Milestones, Projection, MAX_SCORE, MIN_SCORE};
pub use impact::worst_case_impact;
pub use weights::{derive_weights, explain_weights, WeightBreakdown, WeightStep, WeightVector};
