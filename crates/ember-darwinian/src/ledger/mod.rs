//! Durable experiment record
pub mod experiment_log;

pub use self::experiment_log::ExperimentLog;
