//! EMBER Orchestrator Binary
//!
//! Runs a generational evolution experiment against a swarm of EMBER bots
//! and appends every generation's telemetry to a CSV experiment log.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ember_darwinian::{ExperimentLog, GenerationController};
use ember_orchestrator::{Cli, OrchestratorConfig};
use ember_swarm::{AgentGateway, HttpGateway, InMemoryGateway};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    info!("Starting EMBER orchestrator v{}", ember_common::VERSION);

    let config = OrchestratorConfig::load(&cli).context("invalid configuration")?;
    let log = ExperimentLog::new(config.log_path(Local::now()));
    info!(
        generations = config.generations,
        population = config.population,
        generation_secs = config.generation_secs,
        pressure = config.selection_pressure,
        log = %log.path().display(),
        "Loaded configuration"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Interrupt received, stopping now; logged generations are kept");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => error!(error = %e, "Failed to install interrupt handler"),
        }
    });

    if cli.simulate {
        info!("Running against a simulated swarm");
        let seed = config.seed.unwrap_or_default();
        // Lower light thresholds survive longer.
        let horizon = config.generation_secs as f64;
        let gateway = InMemoryGateway::new(config.population, seed)
            .with_lifespan(move |genome| horizon * (1.0 - genome.threshold));
        run(&config, gateway, log, shutdown_rx).await
    } else {
        let gateway_config = config.gateway()?;
        info!(address = gateway_config.address.template(), "Bot address pattern");
        let gateway = HttpGateway::new(gateway_config)?;
        run(&config, gateway, log, shutdown_rx).await
    }
}

async fn run<G: AgentGateway>(
    config: &OrchestratorConfig,
    gateway: G,
    log: ExperimentLog,
    shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let mut controller =
        GenerationController::new(config.evolution(), gateway, log.clone(), shutdown)?;
    let report = controller.run().await.context("experiment aborted")?;

    debug!(report = %serde_json::to_string(&report)?, "Experiment report");
    for summary in &report.summaries {
        info!(
            generation = summary.generation,
            reporting = summary.reporting,
            alive = summary.alive,
            best_fitness = summary.best_fitness.unwrap_or_default(),
            mean_fitness = summary.mean_fitness.unwrap_or_default(),
            "Generation summary"
        );
    }

    // The log may hold earlier runs; report what is on disk.
    match log.read_all() {
        Ok(records) => info!(
            run_id = %report.run_id,
            generations = report.generations_completed,
            rows_this_run = report.rows_logged,
            rows_in_log = records.len(),
            stopped = report.stopped,
            log = %log.path().display(),
            "Experiment finished"
        ),
        Err(e) => warn!(error = %e, "Could not read back experiment log"),
    }

    match controller.metrics().render() {
        Ok(text) => info!("Run metrics:\n{}", text),
        Err(e) => warn!(error = %e, "Could not render metrics"),
    }

    Ok(())
}
