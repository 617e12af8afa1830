//! Core data types for the EMBER orchestrator

pub mod agent_id;
pub mod genome;
pub mod record;
pub mod telemetry;
