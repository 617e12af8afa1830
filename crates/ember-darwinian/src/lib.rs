//! # Darwinian
//!
//! Generational evolution engine for a swarm of EMBER bots.
//!
//! ## Fitness
//!
//! ```text
//! fitness = alive_time (seconds survived in the generation)
//! ```
//!
//! ## Selection
//!
//! The top `max(1, ⌊p × N⌋)` reporting bots become winners. Every bot in the
//! population, reachable or not, is re-bred from two winners drawn with
//! replacement: threshold from the first parent, efficiency from the second.
//!
//! ## Generation Cycle
//!
//! ```text
//! gen 0:   Initializing → LivePhase → Logging
//! gen g≥1: Breeding → Mutating → LivePhase → Logging
//! ```

pub mod controller;
pub mod fitness;
pub mod ledger;
pub mod selection;
pub mod telemetry;

pub use controller::{ExperimentReport, GenerationController, GenerationState};
pub use fitness::{FitnessCalculator, GenerationSummary, RankedAgent};
pub use ledger::ExperimentLog;
pub use selection::{GenomeAssignment, SelectionOutcome, SelectionPressure, Selector};
pub use telemetry::EvolutionMetrics;

use ember_common::{EmberError, Result};
use std::time::Duration;

/// Darwinian configuration
#[derive(Debug, Clone)]
pub struct EvolutionConfig {
    /// Number of generations to run
    pub generations: u32,
    /// Number of bots in the swarm
    pub population: usize,
    /// Length of each generation's live phase
    pub generation_duration: Duration,
    /// Fraction of the population kept as breeding winners
    pub selection_pressure: f64,
    /// Interval between monitoring polls during the live phase
    pub monitor_interval: Duration,
    /// Floor on the monitoring interval
    pub min_monitor_interval: Duration,
    /// Delay between bots when issuing staggered commands
    pub command_stagger: Duration,
    /// Seed for parent selection; random when absent
    pub seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            generations: ember_common::DEFAULT_GENERATIONS,
            population: ember_common::DEFAULT_POPULATION,
            generation_duration: Duration::from_secs(ember_common::DEFAULT_GENERATION_SECS),
            selection_pressure: ember_common::DEFAULT_SELECTION_PRESSURE,
            monitor_interval: Duration::from_secs(ember_common::DEFAULT_MONITOR_INTERVAL_SECS),
            min_monitor_interval: Duration::from_secs(ember_common::MIN_MONITOR_INTERVAL_SECS),
            command_stagger: Duration::from_millis(ember_common::DEFAULT_COMMAND_STAGGER_MS),
            seed: None,
        }
    }
}

impl EvolutionConfig {
    /// Reject configurations the controller cannot run
    pub fn validate(&self) -> Result<()> {
        if self.generations == 0 {
            return Err(EmberError::Config("generations must be at least 1".into()));
        }
        if self.population == 0 {
            return Err(EmberError::Config("population must be at least 1".into()));
        }
        if self.generation_duration.is_zero() {
            return Err(EmberError::Config("generation duration must be positive".into()));
        }
        SelectionPressure::new(self.selection_pressure)?;
        Ok(())
    }

    /// Monitoring interval after applying the floor
    pub fn effective_monitor_interval(&self) -> Duration {
        self.monitor_interval.max(self.min_monitor_interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EvolutionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = EvolutionConfig::default();
        config.generations = 0;
        assert!(config.validate().is_err());

        let mut config = EvolutionConfig::default();
        config.selection_pressure = 1.5;
        assert!(matches!(config.validate(), Err(EmberError::Selection(_))));

        let mut config = EvolutionConfig::default();
        config.generation_duration = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_monitor_interval_floor() {
        let config = EvolutionConfig {
            monitor_interval: Duration::from_millis(10),
            min_monitor_interval: Duration::from_secs(1),
            ..Default::default()
        };
        assert_eq!(config.effective_monitor_interval(), Duration::from_secs(1));
    }
}
