//! Telemetry snapshot - one successful poll of one bot
//!
//! The status endpoint returns a flat JSON document with `alive`,
//! `alive_time`, `energy`, `threshold` and `efficiency`. `alive_time_s` and
//! `light_threshold` are accepted as aliases.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::genome::Genome;

/// Why a status document was rejected
#[derive(Debug, Error)]
pub enum InvalidTelemetry {
    #[error("not a valid stats document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("implausible value: {0}")]
    Implausible(&'static str),
}

/// Wire form of the status document
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StatsDocument {
    alive: bool,
    #[serde(alias = "alive_time_s")]
    alive_time: f64,
    energy: f64,
    #[serde(alias = "light_threshold")]
    threshold: f64,
    efficiency: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bot_id: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    generation: Option<u32>,
}

/// Last-known state of one bot
///
/// Only ever built from a successful, well-formed poll. An unreachable bot has
/// no snapshot at all rather than a zeroed one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StatsDocument", into = "StatsDocument")]
pub struct TelemetrySnapshot {
    /// Whether the bot considers itself viable
    pub alive: bool,
    /// Seconds survived in the current generation (fitness)
    pub alive_time: f64,
    /// Current resource level, diagnostic only
    pub energy: f64,
    /// Heritable parameters
    pub genome: Genome,
    /// Id the bot reports for itself, if any
    pub bot_id: Option<usize>,
    /// Generation counter kept by the bot, if any
    pub generation: Option<u32>,
}

impl TelemetrySnapshot {
    pub fn new(alive: bool, alive_time: f64, energy: f64, genome: Genome) -> Self {
        Self {
            alive,
            alive_time,
            energy,
            genome,
            bot_id: None,
            generation: None,
        }
    }

    /// Parse and validate a raw status document
    pub fn from_json(body: &[u8]) -> Result<Self, InvalidTelemetry> {
        let doc: StatsDocument = serde_json::from_slice(body)?;
        Self::try_from(doc)
    }
}

impl TryFrom<StatsDocument> for TelemetrySnapshot {
    type Error = InvalidTelemetry;

    fn try_from(doc: StatsDocument) -> Result<Self, Self::Error> {
        if !doc.alive_time.is_finite() || doc.alive_time < 0.0 {
            return Err(InvalidTelemetry::Implausible("alive_time must be finite and >= 0"));
        }
        let genome = Genome::new(doc.threshold, doc.efficiency);
        if !genome.is_finite() {
            return Err(InvalidTelemetry::Implausible("genome parameters must be finite"));
        }
        Ok(Self {
            alive: doc.alive,
            alive_time: doc.alive_time,
            energy: doc.energy,
            genome,
            bot_id: doc.bot_id,
            generation: doc.generation,
        })
    }
}

impl From<TelemetrySnapshot> for StatsDocument {
    fn from(s: TelemetrySnapshot) -> Self {
        Self {
            alive: s.alive,
            alive_time: s.alive_time,
            energy: s.energy,
            threshold: s.genome.threshold,
            efficiency: s.genome.efficiency,
            bot_id: s.bot_id,
            generation: s.generation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_current_field_names() {
        let body = br#"{"bot_id":2,"alive":true,"alive_time":512.0,"energy":63.5,
            "threshold":0.25,"efficiency":1.1}"#;
        let snap = TelemetrySnapshot::from_json(body).unwrap();

        assert!(snap.alive);
        assert_eq!(snap.alive_time, 512.0);
        assert_eq!(snap.genome, Genome::new(0.25, 1.1));
        assert_eq!(snap.bot_id, Some(2));
        assert_eq!(snap.generation, None);
    }

    #[test]
    fn test_parse_field_aliases() {
        let body = br#"{"bot_id":4,"generation":3,"alive":false,"energy":0.0,
            "light_level":0.4,"alive_time_s":97,"light_threshold":0.1,"efficiency":0.9}"#;
        let snap = TelemetrySnapshot::from_json(body).unwrap();

        assert!(!snap.alive);
        assert_eq!(snap.alive_time, 97.0);
        assert_eq!(snap.genome.threshold, 0.1);
        assert_eq!(snap.generation, Some(3));
    }

    #[test]
    fn test_missing_genome_is_rejected() {
        let body = br#"{"alive":true,"alive_time":10,"energy":50}"#;
        assert!(matches!(
            TelemetrySnapshot::from_json(body),
            Err(InvalidTelemetry::Json(_))
        ));
    }

    #[test]
    fn test_negative_alive_time_is_rejected() {
        let body = br#"{"alive":true,"alive_time":-1,"energy":50,"threshold":0.2,"efficiency":1.0}"#;
        assert!(matches!(
            TelemetrySnapshot::from_json(body),
            Err(InvalidTelemetry::Implausible(_))
        ));
    }

    #[test]
    fn test_not_json_is_rejected() {
        assert!(TelemetrySnapshot::from_json(b"<html>Not Found</html>").is_err());
    }

    #[test]
    fn test_serializes_flat_document() {
        let snap = TelemetrySnapshot::new(true, 30.0, 80.0, Genome::new(0.3, 1.2));
        let value = serde_json::to_value(&snap).unwrap();

        assert_eq!(value["threshold"], 0.3);
        assert_eq!(value["efficiency"], 1.2);
        assert!(value.get("bot_id").is_none());
    }
}
