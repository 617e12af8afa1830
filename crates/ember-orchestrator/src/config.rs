//! Orchestrator configuration
//!
//! Layers, lowest priority first: built-in defaults, an optional
//! `ember.toml`, `EMBER_*` environment variables (a `.env` file is honored),
//! then command-line flags.

use chrono::{DateTime, Local};
use clap::Parser;
use config::{Config, Environment, File};
use ember_common::{EmberError, Result};
use ember_darwinian::EvolutionConfig;
use ember_swarm::{AddressPattern, HttpGatewayConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Command-line flags; anything left unset falls through to lower layers
#[derive(Debug, Parser)]
#[command(name = "ember-orchestrator", version, about = "Evolve a swarm of EMBER bots")]
pub struct Cli {
    /// Number of generations to run [default: 10]
    #[arg(long)]
    pub generations: Option<u32>,

    /// Seconds per generation [default: 1800]
    #[arg(long = "time", value_name = "SECONDS")]
    pub generation_secs: Option<u64>,

    /// Number of bots in the swarm [default: 9]
    #[arg(long = "count")]
    pub population: Option<usize>,

    /// Fraction of the population that breeds [default: 0.33]
    #[arg(long = "pressure")]
    pub selection_pressure: Option<f64>,

    /// Bot hostname prefix; bot N is reached at http://<host>-N.local [default: ember-bot]
    #[arg(long)]
    pub host: Option<String>,

    /// Full bot address template containing `{id}`; overrides --host
    #[arg(long)]
    pub address_template: Option<String>,

    /// CSV experiment log [default: evolution_log_<timestamp>.csv]
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Seconds between monitoring polls [default: 30]
    #[arg(long = "monitor-interval", value_name = "SECONDS")]
    pub monitor_interval_secs: Option<u64>,

    /// Per-request timeout in milliseconds [default: 3000]
    #[arg(long)]
    pub request_timeout_ms: Option<u64>,

    /// Seed for parent selection
    #[arg(long)]
    pub seed: Option<u64>,

    /// Configuration file, without extension
    #[arg(long, default_value = "ember")]
    pub config: String,

    /// Run against a simulated swarm instead of real bots
    #[arg(long)]
    pub simulate: bool,
}

/// Resolved orchestrator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    pub generations: u32,
    pub generation_secs: u64,
    pub population: usize,
    pub selection_pressure: f64,
    pub host: String,
    pub address_template: Option<String>,
    pub log_file: Option<PathBuf>,
    pub monitor_interval_secs: u64,
    pub request_timeout_ms: u64,
    pub command_stagger_ms: u64,
    pub seed: Option<u64>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            generations: ember_common::DEFAULT_GENERATIONS,
            generation_secs: ember_common::DEFAULT_GENERATION_SECS,
            population: ember_common::DEFAULT_POPULATION,
            selection_pressure: ember_common::DEFAULT_SELECTION_PRESSURE,
            host: ember_common::DEFAULT_BASE_HOST.to_string(),
            address_template: None,
            log_file: None,
            monitor_interval_secs: ember_common::DEFAULT_MONITOR_INTERVAL_SECS,
            request_timeout_ms: ember_common::DEFAULT_REQUEST_TIMEOUT_MS,
            command_stagger_ms: ember_common::DEFAULT_COMMAND_STAGGER_MS,
            seed: None,
        }
    }
}

impl OrchestratorConfig {
    /// Load every layer and validate the result
    pub fn load(cli: &Cli) -> Result<Self> {
        let _ = dotenvy::dotenv();
        let env = Environment::with_prefix("EMBER").try_parsing(true);
        let config = Self::layered(&cli.config, env)?.with_overrides(cli);
        config.validate()?;
        Ok(config)
    }

    /// Defaults, then the optional file, then `env`
    pub fn layered(file: &str, env: Environment) -> Result<Self> {
        let defaults = Self::default();
        let settings = Config::builder()
            .set_default("generations", i64::from(defaults.generations))
            .and_then(|b| b.set_default("generation_secs", defaults.generation_secs as i64))
            .and_then(|b| b.set_default("population", defaults.population as i64))
            .and_then(|b| b.set_default("selection_pressure", defaults.selection_pressure))
            .and_then(|b| b.set_default("host", defaults.host.as_str()))
            .and_then(|b| {
                b.set_default("monitor_interval_secs", defaults.monitor_interval_secs as i64)
            })
            .and_then(|b| b.set_default("request_timeout_ms", defaults.request_timeout_ms as i64))
            .and_then(|b| b.set_default("command_stagger_ms", defaults.command_stagger_ms as i64))
            .map_err(config_error)?
            .add_source(File::with_name(file).required(false))
            .add_source(env)
            .build()
            .map_err(config_error)?;

        settings.try_deserialize().map_err(config_error)
    }

    /// Apply command-line flags over the loaded layers
    pub fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(v) = cli.generations {
            self.generations = v;
        }
        if let Some(v) = cli.generation_secs {
            self.generation_secs = v;
        }
        if let Some(v) = cli.population {
            self.population = v;
        }
        if let Some(v) = cli.selection_pressure {
            self.selection_pressure = v;
        }
        if let Some(v) = &cli.host {
            self.host = v.clone();
        }
        if let Some(v) = &cli.address_template {
            self.address_template = Some(v.clone());
        }
        if let Some(v) = &cli.log_file {
            self.log_file = Some(v.clone());
        }
        if let Some(v) = cli.monitor_interval_secs {
            self.monitor_interval_secs = v;
        }
        if let Some(v) = cli.request_timeout_ms {
            self.request_timeout_ms = v;
        }
        if cli.seed.is_some() {
            self.seed = cli.seed;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_ms == 0 {
            return Err(EmberError::Config("request timeout must be positive".into()));
        }
        self.address()?;
        self.evolution().validate()
    }

    /// Bot address pattern; the template wins over the host prefix
    pub fn address(&self) -> Result<AddressPattern> {
        let pattern = match &self.address_template {
            Some(template) => AddressPattern::new(template.as_str()),
            None => AddressPattern::from_host(&self.host),
        };
        Ok(pattern?)
    }

    pub fn gateway(&self) -> Result<HttpGatewayConfig> {
        Ok(HttpGatewayConfig::new(self.address()?)
            .with_timeout(Duration::from_millis(self.request_timeout_ms)))
    }

    pub fn evolution(&self) -> EvolutionConfig {
        EvolutionConfig {
            generations: self.generations,
            population: self.population,
            generation_duration: Duration::from_secs(self.generation_secs),
            selection_pressure: self.selection_pressure,
            monitor_interval: Duration::from_secs(self.monitor_interval_secs),
            command_stagger: Duration::from_millis(self.command_stagger_ms),
            seed: self.seed,
            ..EvolutionConfig::default()
        }
    }

    /// Experiment log path, timestamped when not configured
    pub fn log_path(&self, now: DateTime<Local>) -> PathBuf {
        self.log_file.clone().unwrap_or_else(|| {
            PathBuf::from(format!("evolution_log_{}.csv", now.format("%Y%m%d_%H%M%S")))
        })
    }
}

fn config_error(err: config::ConfigError) -> EmberError {
    EmberError::Config(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix("EMBER").try_parsing(true).source(Some(map))
    }

    #[test]
    fn test_defaults_without_sources() {
        let config = OrchestratorConfig::layered("does-not-exist", env(&[])).unwrap();
        assert_eq!(config, OrchestratorConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_environment_overrides_defaults() {
        let config = OrchestratorConfig::layered(
            "does-not-exist",
            env(&[
                ("EMBER_GENERATIONS", "4"),
                ("EMBER_SELECTION_PRESSURE", "0.5"),
                ("EMBER_HOST", "lab-bot"),
            ]),
        )
        .unwrap();

        assert_eq!(config.generations, 4);
        assert_eq!(config.selection_pressure, 0.5);
        assert_eq!(config.host, "lab-bot");
        assert_eq!(config.population, 9);
    }

    #[test]
    fn test_file_then_env_then_cli() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("ember.toml");
        std::fs::write(&file, "population = 5\ngenerations = 3\ngeneration_secs = 120\n").unwrap();
        let stem = dir.path().join("ember");

        let config = OrchestratorConfig::layered(
            stem.to_str().unwrap(),
            env(&[("EMBER_GENERATIONS", "7")]),
        )
        .unwrap();
        assert_eq!(config.population, 5);
        assert_eq!(config.generations, 7);
        assert_eq!(config.generation_secs, 120);

        let cli = Cli::parse_from(["ember-orchestrator", "--count", "12", "--pressure", "0.25"]);
        let config = config.with_overrides(&cli);
        assert_eq!(config.population, 12);
        assert_eq!(config.selection_pressure, 0.25);
        assert_eq!(config.generations, 7);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from([
            "ember-orchestrator",
            "--generations",
            "2",
            "--time",
            "60",
            "--address-template",
            "http://127.0.0.1:8080/bots/{id}",
            "--log-file",
            "run.csv",
            "--seed",
            "9",
        ]);
        let config = OrchestratorConfig::default().with_overrides(&cli);

        assert_eq!(config.generations, 2);
        assert_eq!(config.generation_secs, 60);
        assert_eq!(config.seed, Some(9));
        assert_eq!(
            config.address().unwrap().status_url(ember_common::AgentId(3)),
            "http://127.0.0.1:8080/bots/3/api/stats"
        );
        let now = Local.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(config.log_path(now), PathBuf::from("run.csv"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = OrchestratorConfig {
            selection_pressure: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = OrchestratorConfig {
            address_template: Some("http://bots.local/".into()),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(EmberError::Gateway(_))));

        let config = OrchestratorConfig {
            population: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(EmberError::Config(_))));
    }

    #[test]
    fn test_default_log_path_is_timestamped() {
        let now = Local.with_ymd_and_hms(2024, 3, 1, 9, 5, 7).unwrap();
        assert_eq!(
            OrchestratorConfig::default().log_path(now),
            PathBuf::from("evolution_log_20240301_090507.csv")
        );
    }

    #[test]
    fn test_evolution_conversion() {
        let config = OrchestratorConfig {
            generation_secs: 90,
            monitor_interval_secs: 0,
            ..Default::default()
        };
        let evolution = config.evolution();

        assert_eq!(evolution.generation_duration, Duration::from_secs(90));
        assert_eq!(evolution.effective_monitor_interval(), Duration::from_secs(1));
        assert_eq!(evolution.command_stagger, Duration::from_millis(200));
    }
}
