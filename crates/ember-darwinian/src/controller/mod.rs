//! Generation control loop
pub mod generation;
pub mod state;

pub use self::generation::{ExperimentReport, GenerationController};
pub use self::state::GenerationState;
