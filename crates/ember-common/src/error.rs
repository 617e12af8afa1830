//! Error types for the EMBER orchestrator
//!
//! Provides a unified error type and domain-specific error variants

use thiserror::Error;

/// Result type alias using EmberError
pub type Result<T> = std::result::Result<T, EmberError>;

/// Unified error type for EMBER operations
#[derive(Debug, Error)]
pub enum EmberError {
    // Agent gateway errors
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    // Selection errors
    #[error("Selection error: {0}")]
    Selection(#[from] SelectionError),

    // Experiment log errors
    #[error("Experiment log error: {0}")]
    ExperimentLog(#[from] LogError),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failures talking to a single agent
///
/// These never escape the gateway; they are logged and collapsed to an
/// absent result.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Transport failure reaching {url}: {reason}")]
    Transport { url: String, reason: String },

    #[error("Request to {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("Agent at {url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("Malformed telemetry from {url}: {reason}")]
    Malformed { url: String, reason: String },

    #[error("Invalid address pattern: {0}")]
    InvalidAddress(String),
}

/// Selection and breeding errors
#[derive(Debug, Error, PartialEq)]
pub enum SelectionError {
    #[error("No live agents reported telemetry; nothing to select from")]
    NoLiveAgents,

    #[error("Selection pressure must be in (0, 1], got {0}")]
    InvalidPressure(f64),
}

/// Experiment log failures
#[derive(Debug, Error)]
pub enum LogError {
    #[error("I/O error on {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("CSV error on {path}: {reason}")]
    Csv { path: String, reason: String },
}
