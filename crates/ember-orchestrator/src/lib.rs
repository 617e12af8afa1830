//! # EMBER Orchestrator
//!
//! Configuration and wiring for the `ember-orchestrator` binary.

pub mod config;

pub use config::{Cli, OrchestratorConfig};
