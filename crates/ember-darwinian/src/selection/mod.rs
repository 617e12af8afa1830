//! Selection and breeding
//!
//! Pure with respect to the population view: no network I/O happens here.
pub mod breeding;
pub mod policy;

pub use self::breeding::{Breeder, GenomeAssignment};
pub use self::policy::SelectionPressure;

use ember_common::SelectionError;
use ember_swarm::PopulationView;
use rand::Rng;
use tracing::warn;

use crate::fitness::{FitnessCalculator, RankedAgent};

/// Result of one selection round
#[derive(Debug, Clone)]
pub struct SelectionOutcome {
    /// Every reporting bot, fittest first
    pub ranking: Vec<RankedAgent>,
    /// Bots allowed to breed
    pub winners: Vec<RankedAgent>,
    /// One new genome per bot in the population
    pub assignments: Vec<GenomeAssignment>,
}

/// Truncation selection followed by crossover
#[derive(Debug, Clone)]
pub struct Selector {
    pressure: SelectionPressure,
}

impl Selector {
    pub fn new(pressure: SelectionPressure) -> Self {
        Self { pressure }
    }

    /// Rank the view, pick winners and breed assignments for `0..population`
    pub fn select<R: Rng>(
        &self,
        view: &PopulationView,
        population: usize,
        rng: &mut R,
    ) -> Result<SelectionOutcome, SelectionError> {
        let ranking = FitnessCalculator::rank(view);
        if ranking.is_empty() {
            return Err(SelectionError::NoLiveAgents);
        }

        let count = self.pressure.winner_count(population, ranking.len());
        let mut winners: Vec<RankedAgent> = ranking.iter().take(count).cloned().collect();
        if winners.is_empty() {
            warn!(
                reporting = ranking.len(),
                "No winners selected; using every reporting bot as a parent"
            );
            winners = ranking.clone();
        }

        let assignments = Breeder::breed(&winners, population, rng);
        Ok(SelectionOutcome {
            ranking,
            winners,
            assignments,
        })
    }
}
