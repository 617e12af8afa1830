//! Fitness ranking and per-generation statistics
pub mod calculator;
pub mod summary;

pub use self::calculator::{FitnessCalculator, RankedAgent};
pub use self::summary::GenerationSummary;
