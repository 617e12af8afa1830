//! Append-only CSV experiment log
//!
//! One row per agent per generation:
//!
//! ```text
//! generation,bot_id,alive_time,alive,energy,light_threshold,efficiency,timestamp
//! ```
//!
//! The header is written only when the file is new or empty, so a log can be
//! appended to any number of times, including across runs.

use chrono::{DateTime, SecondsFormat, Utc};
use ember_common::{AgentId, GenerationRecord, Genome, LogError};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// On-disk row layout
#[derive(Debug, Serialize, Deserialize)]
struct LogRow {
    generation: u32,
    bot_id: usize,
    alive_time: f64,
    alive: bool,
    energy: f64,
    light_threshold: f64,
    efficiency: f64,
    timestamp: String,
}

impl From<&GenerationRecord> for LogRow {
    fn from(r: &GenerationRecord) -> Self {
        Self {
            generation: r.generation,
            bot_id: r.agent.index(),
            alive_time: r.alive_time,
            alive: r.alive,
            energy: r.energy,
            light_threshold: r.genome.threshold,
            efficiency: r.genome.efficiency,
            timestamp: r.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }
}

/// Experiment log file
///
/// Written only by the generation controller's single control task.
#[derive(Debug, Clone)]
pub struct ExperimentLog {
    path: PathBuf,
}

impl ExperimentLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append records, creating the file and header if needed
    ///
    /// Data is flushed and synced before returning.
    pub fn append(&self, records: &[GenerationRecord]) -> Result<usize, LogError> {
        let needs_header = match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == io::ErrorKind::NotFound => true,
            Err(e) => return Err(self.io_error(&e)),
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(&e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(&e))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        for record in records {
            writer
                .serialize(LogRow::from(record))
                .map_err(|e| self.csv_error(&e))?;
        }
        writer.flush().map_err(|e| self.io_error(&e))?;

        let file = writer.into_inner().map_err(|e| self.io_error(e.error()))?;
        file.sync_data().map_err(|e| self.io_error(&e))?;

        debug!(path = %self.path.display(), rows = records.len(), header = needs_header, "Appended to experiment log");
        Ok(records.len())
    }

    /// Read every record back
    pub fn read_all(&self) -> Result<Vec<GenerationRecord>, LogError> {
        let mut reader = csv::Reader::from_path(&self.path).map_err(|e| self.csv_error(&e))?;
        let mut records = Vec::new();

        for row in reader.deserialize::<LogRow>() {
            let row = row.map_err(|e| self.csv_error(&e))?;
            let timestamp = DateTime::parse_from_rfc3339(&row.timestamp)
                .map_err(|e| LogError::Csv {
                    path: self.path.display().to_string(),
                    reason: format!("bad timestamp '{}': {}", row.timestamp, e),
                })?
                .with_timezone(&Utc);

            records.push(GenerationRecord {
                generation: row.generation,
                agent: AgentId(row.bot_id),
                alive_time: row.alive_time,
                alive: row.alive,
                energy: row.energy,
                genome: Genome::new(row.light_threshold, row.efficiency),
                timestamp,
            });
        }
        Ok(records)
    }

    fn io_error(&self, err: &io::Error) -> LogError {
        LogError::Io {
            path: self.path.display().to_string(),
            reason: err.to_string(),
        }
    }

    fn csv_error(&self, err: &csv::Error) -> LogError {
        LogError::Csv {
            path: self.path.display().to_string(),
            reason: err.to_string(),
        }
    }
}
