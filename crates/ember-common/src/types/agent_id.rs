//! AgentId - stable population index of one bot

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a bot within the population (`0..N-1`)
///
/// Only a logical identity: it is used to derive the bot's network address
/// and to correlate telemetry across polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub usize);

impl AgentId {
    /// Raw index
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }

    /// All agent ids of a population of `size` bots, in index order
    pub fn population(size: usize) -> Vec<AgentId> {
        (0..size).map(AgentId).collect()
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bot-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_population_is_index_ordered() {
        let ids = AgentId::population(3);
        assert_eq!(ids, vec![AgentId(0), AgentId(1), AgentId(2)]);
        assert!(AgentId::population(0).is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(AgentId(7).to_string(), "bot-7");
    }
}
