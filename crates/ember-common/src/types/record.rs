//! Generation record - one logged row per agent per generation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::agent_id::AgentId;
use super::genome::Genome;
use super::telemetry::TelemetrySnapshot;

/// Final state of one bot at the end of one generation
///
/// Created once, appended to the experiment log, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    /// Generation number (0-based)
    pub generation: u32,
    /// Population index of the bot
    pub agent: AgentId,
    /// Seconds survived (fitness)
    pub alive_time: f64,
    /// Alive flag at the final poll
    pub alive: bool,
    /// Energy at the final poll
    pub energy: f64,
    /// Genome the bot lived with
    pub genome: Genome,
    /// Wall-clock time of the record
    pub timestamp: DateTime<Utc>,
}

impl GenerationRecord {
    /// Build a record from a final-poll snapshot
    pub fn from_snapshot(
        generation: u32,
        agent: AgentId,
        snapshot: &TelemetrySnapshot,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            generation,
            agent,
            alive_time: snapshot.alive_time,
            alive: snapshot.alive,
            energy: snapshot.energy,
            genome: snapshot.genome,
            timestamp,
        }
    }
}
