//! Breeding: two-parent single-point crossover

use ember_common::{AgentId, Genome};
use ember_swarm::AgentCommand;
use rand::Rng;

use crate::fitness::RankedAgent;

/// New genome destined for one bot
///
/// Consumed by the controller as soon as it is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct GenomeAssignment {
    pub agent: AgentId,
    pub genome: Genome,
    /// Parent that gave the threshold, parent that gave the efficiency
    pub parents: (AgentId, AgentId),
}

impl GenomeAssignment {
    /// Commands that apply the assignment, persist last
    pub fn commands(&self) -> [AgentCommand; 3] {
        [
            AgentCommand::SetThreshold(self.genome.threshold),
            AgentCommand::SetEfficiency(self.genome.efficiency),
            AgentCommand::Save,
        ]
    }
}

pub struct Breeder;

impl Breeder {
    /// One assignment per bot in `0..population`
    ///
    /// Parents are drawn independently, uniformly, with replacement; a winner
    /// may be both parents or parent to its own slot. Empty when there are no
    /// winners.
    pub fn breed<R: Rng>(
        winners: &[RankedAgent],
        population: usize,
        rng: &mut R,
    ) -> Vec<GenomeAssignment> {
        if winners.is_empty() {
            return Vec::new();
        }

        AgentId::population(population)
            .into_iter()
            .map(|agent| {
                let first = &winners[rng.gen_range(0..winners.len())];
                let second = &winners[rng.gen_range(0..winners.len())];
                GenomeAssignment {
                    agent,
                    genome: Genome::crossover(&first.genome, &second.genome),
                    parents: (first.agent, second.agent),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn winner(index: usize, threshold: f64, efficiency: f64) -> RankedAgent {
        RankedAgent {
            agent: AgentId(index),
            fitness: 100.0,
            genome: Genome::new(threshold, efficiency),
        }
    }

    #[test]
    fn test_breed_covers_population() {
        let winners = vec![winner(0, 0.1, 0.9), winner(4, 0.3, 1.6)];
        let mut rng = StdRng::seed_from_u64(42);

        let assignments = Breeder::breed(&winners, 6, &mut rng);
        let agents: Vec<_> = assignments.iter().map(|a| a.agent).collect();
        assert_eq!(agents, AgentId::population(6));
    }

    #[test]
    fn test_child_genes_come_from_named_parents() {
        let winners = vec![winner(0, 0.1, 0.9), winner(4, 0.3, 1.6), winner(7, 0.5, 1.2)];
        let mut rng = StdRng::seed_from_u64(9);

        for assignment in Breeder::breed(&winners, 20, &mut rng) {
            let (first, second) = assignment.parents;
            let first = winners.iter().find(|w| w.agent == first).unwrap();
            let second = winners.iter().find(|w| w.agent == second).unwrap();
            assert_eq!(assignment.genome.threshold, first.genome.threshold);
            assert_eq!(assignment.genome.efficiency, second.genome.efficiency);
        }
    }

    #[test]
    fn test_breed_without_winners_is_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(Breeder::breed(&[], 5, &mut rng).is_empty());
    }

    #[test]
    fn test_commands_persist_last() {
        let assignment = GenomeAssignment {
            agent: AgentId(2),
            genome: Genome::new(0.2, 1.1),
            parents: (AgentId(0), AgentId(0)),
        };
        assert_eq!(
            assignment.commands(),
            [
                AgentCommand::SetThreshold(0.2),
                AgentCommand::SetEfficiency(1.1),
                AgentCommand::Save,
            ]
        );
    }
}
