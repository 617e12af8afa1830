//! Per-generation statistics over the final poll

use ember_common::{AgentId, Genome};
use ember_swarm::PopulationView;
use serde::Serialize;

use super::calculator::FitnessCalculator;

/// What one generation looked like at its final poll
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationSummary {
    pub generation: u32,
    /// Agents polled
    pub polled: usize,
    /// Agents that answered
    pub reporting: usize,
    /// Answering agents still alive
    pub alive: usize,
    pub best_fitness: Option<f64>,
    pub mean_fitness: Option<f64>,
    /// Mean genome of the answering agents
    pub mean_genome: Option<Genome>,
    /// Agents with no row in the log for this generation
    pub missing: Vec<AgentId>,
}

impl GenerationSummary {
    pub fn from_view(generation: u32, view: &PopulationView) -> Self {
        let reporting = view.live_count();
        let (mut sum_fitness, mut sum_threshold, mut sum_efficiency) = (0.0, 0.0, 0.0);
        let mut best: Option<f64> = None;

        for (_, snapshot) in view.live() {
            let fitness = FitnessCalculator::calculate(snapshot);
            best = Some(best.map_or(fitness, |b| b.max(fitness)));
            sum_fitness += fitness;
            sum_threshold += snapshot.genome.threshold;
            sum_efficiency += snapshot.genome.efficiency;
        }

        let n = reporting as f64;
        Self {
            generation,
            polled: view.len(),
            reporting,
            alive: view.alive_count(),
            best_fitness: best,
            mean_fitness: (reporting > 0).then(|| sum_fitness / n),
            mean_genome: (reporting > 0)
                .then(|| Genome::new(sum_threshold / n, sum_efficiency / n)),
            missing: view.absent(),
        }
    }
}
