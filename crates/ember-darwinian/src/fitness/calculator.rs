//! Fitness calculation: fitness = alive_time

use ember_common::{AgentId, Genome, TelemetrySnapshot};
use ember_swarm::PopulationView;

/// One reporting bot with its fitness
#[derive(Debug, Clone, PartialEq)]
pub struct RankedAgent {
    pub agent: AgentId,
    pub fitness: f64,
    pub genome: Genome,
}

pub struct FitnessCalculator;

impl FitnessCalculator {
    /// Seconds the bot survived in the current generation
    #[inline]
    pub fn calculate(snapshot: &TelemetrySnapshot) -> f64 {
        snapshot.alive_time
    }

    /// Reporting bots, fittest first
    ///
    /// Absent bots are left out rather than scored as zero. The sort is stable
    /// over index order, so ties keep the lower index first.
    pub fn rank(view: &PopulationView) -> Vec<RankedAgent> {
        let mut ranking: Vec<RankedAgent> = view
            .live()
            .map(|(agent, snapshot)| RankedAgent {
                agent,
                fitness: Self::calculate(snapshot),
                genome: snapshot.genome,
            })
            .collect();
        ranking.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
        ranking
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(alive_time: f64) -> Option<TelemetrySnapshot> {
        Some(TelemetrySnapshot::new(true, alive_time, 50.0, Genome::new(0.2, 1.0)))
    }

    #[test]
    fn test_rank_excludes_absent_and_sorts_descending() {
        let view = PopulationView::from_entries(vec![
            (AgentId(0), snap(100.0)),
            (AgentId(1), None),
            (AgentId(2), snap(300.0)),
            (AgentId(3), snap(200.0)),
        ]);

        let order: Vec<_> = FitnessCalculator::rank(&view).iter().map(|r| r.agent).collect();
        assert_eq!(order, vec![AgentId(2), AgentId(3), AgentId(0)]);
    }

    #[test]
    fn test_rank_ties_are_stable() {
        let view = PopulationView::from_entries(vec![
            (AgentId(0), snap(50.0)),
            (AgentId(1), snap(80.0)),
            (AgentId(2), snap(50.0)),
        ]);

        let order: Vec<_> = FitnessCalculator::rank(&view).iter().map(|r| r.agent).collect();
        assert_eq!(order, vec![AgentId(1), AgentId(0), AgentId(2)]);
    }
}
