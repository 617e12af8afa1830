//! Genome - the two heritable parameters of a bot
//!
//! `threshold` is the light level needed to gain energy and `efficiency` is
//! how well light converts into energy. The bounds mirror what the firmware
//! enforces on its own setters.

use serde::{Deserialize, Serialize};

/// Lowest light threshold a bot accepts
pub const MIN_THRESHOLD: f64 = 0.01;

/// Highest light threshold a bot accepts
pub const MAX_THRESHOLD: f64 = 1.0;

/// Lowest efficiency a bot accepts
pub const MIN_EFFICIENCY: f64 = 0.5;

/// Highest efficiency a bot accepts
pub const MAX_EFFICIENCY: f64 = 2.0;

/// Heritable parameters of one bot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    /// Light threshold (0.01-1.0)
    pub threshold: f64,
    /// Light-to-energy conversion factor (0.5-2.0)
    pub efficiency: f64,
}

impl Genome {
    pub fn new(threshold: f64, efficiency: f64) -> Self {
        Self { threshold, efficiency }
    }

    /// Single-point crossover: threshold from `first`, efficiency from `second`
    #[inline]
    pub fn crossover(first: &Genome, second: &Genome) -> Genome {
        Genome {
            threshold: first.threshold,
            efficiency: second.efficiency,
        }
    }

    /// Genome with both parameters pulled into the firmware bounds
    pub fn clamped(self) -> Genome {
        Genome {
            threshold: self.threshold.clamp(MIN_THRESHOLD, MAX_THRESHOLD),
            efficiency: self.efficiency.clamp(MIN_EFFICIENCY, MAX_EFFICIENCY),
        }
    }

    /// Whether both parameters are finite numbers
    pub fn is_finite(&self) -> bool {
        self.threshold.is_finite() && self.efficiency.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crossover_takes_one_gene_from_each_parent() {
        let a = Genome::new(0.2, 0.8);
        let b = Genome::new(0.6, 1.4);

        let child = Genome::crossover(&a, &b);
        assert_eq!(child.threshold, 0.2);
        assert_eq!(child.efficiency, 1.4);

        let selfed = Genome::crossover(&a, &a);
        assert_eq!(selfed, a);
    }

    #[test]
    fn test_clamped() {
        let g = Genome::new(5.0, 0.1).clamped();
        assert_eq!(g.threshold, MAX_THRESHOLD);
        assert_eq!(g.efficiency, MIN_EFFICIENCY);

        let inside = Genome::new(0.3, 1.1);
        assert_eq!(inside.clamped(), inside);
    }
}
