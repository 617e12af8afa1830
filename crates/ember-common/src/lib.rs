//! # EMBER Common
//!
//! Shared types and errors for the EMBER swarm evolution orchestrator.
//!
//! ## Core Types
//!
//! - [`AgentId`]: population index of one bot
//! - [`Genome`]: the two heritable parameters (`threshold`, `efficiency`)
//! - [`TelemetrySnapshot`]: one successful poll of one bot
//! - [`GenerationRecord`]: one experiment log row

pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{EmberError, GatewayError, LogError, Result, SelectionError};
pub use types::{
    agent_id::AgentId,
    genome::Genome,
    record::GenerationRecord,
    telemetry::{InvalidTelemetry, TelemetrySnapshot},
};

/// EMBER version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default bot hostname prefix (`ember-bot-<n>.local`)
pub const DEFAULT_BASE_HOST: &str = "ember-bot";

/// Default population size
pub const DEFAULT_POPULATION: usize = 9;

/// Default number of generations
pub const DEFAULT_GENERATIONS: u32 = 10;

/// Default generation length in seconds
pub const DEFAULT_GENERATION_SECS: u64 = 1800;

/// Default selection pressure (top third breeds)
pub const DEFAULT_SELECTION_PRESSURE: f64 = 0.33;

/// Default per-request timeout in milliseconds
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 3000;

/// Default monitoring interval during the live phase, in seconds
pub const DEFAULT_MONITOR_INTERVAL_SECS: u64 = 30;

/// Floor on the monitoring interval, in seconds
pub const MIN_MONITOR_INTERVAL_SECS: u64 = 1;

/// Default delay between staggered commands, in milliseconds
pub const DEFAULT_COMMAND_STAGGER_MS: u64 = 200;
