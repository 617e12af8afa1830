//! Prometheus metrics for the evolution run

use ember_swarm::PopulationView;
use prometheus::{Encoder, Gauge, IntCounter, IntGauge, Registry, TextEncoder};

/// Run-level counters and gauges
pub struct EvolutionMetrics {
    registry: Registry,
    pub absent_fetches: IntCounter,
    pub failed_commands: IntCounter,
    pub generations_completed: IntCounter,
    pub breeding_skipped: IntCounter,
    pub log_gaps: IntCounter,
    pub reporting_agents: IntGauge,
    pub alive_agents: IntGauge,
    pub best_fitness: Gauge,
}

impl EvolutionMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let metrics = Self {
            registry: Registry::new(),
            absent_fetches: IntCounter::new(
                "ember_absent_fetches_total",
                "Telemetry fetches that produced no snapshot",
            )?,
            failed_commands: IntCounter::new(
                "ember_failed_commands_total",
                "Commands that could not be delivered",
            )?,
            generations_completed: IntCounter::new(
                "ember_generations_completed_total",
                "Generations whose records reached the experiment log",
            )?,
            breeding_skipped: IntCounter::new(
                "ember_breeding_skipped_total",
                "Breeding rounds skipped because no bot reported",
            )?,
            log_gaps: IntCounter::new(
                "ember_log_gaps_total",
                "Agents missing from a generation's final poll",
            )?,
            reporting_agents: IntGauge::new(
                "ember_reporting_agents",
                "Agents that answered the latest poll",
            )?,
            alive_agents: IntGauge::new("ember_alive_agents", "Agents alive at the latest poll")?,
            best_fitness: Gauge::new(
                "ember_best_fitness_seconds",
                "Best alive time in the latest logged generation",
            )?,
        };
        metrics.register()?;
        Ok(metrics)
    }

    fn register(&self) -> prometheus::Result<()> {
        self.registry.register(Box::new(self.absent_fetches.clone()))?;
        self.registry.register(Box::new(self.failed_commands.clone()))?;
        self.registry.register(Box::new(self.generations_completed.clone()))?;
        self.registry.register(Box::new(self.breeding_skipped.clone()))?;
        self.registry.register(Box::new(self.log_gaps.clone()))?;
        self.registry.register(Box::new(self.reporting_agents.clone()))?;
        self.registry.register(Box::new(self.alive_agents.clone()))?;
        self.registry.register(Box::new(self.best_fitness.clone()))?;
        Ok(())
    }

    /// Account for one polling pass
    pub fn observe_poll(&self, view: &PopulationView) {
        self.absent_fetches.inc_by(view.absent().len() as u64);
        self.reporting_agents.set(view.live_count() as i64);
        self.alive_agents.set(view.alive_count() as i64);
    }

    /// Text exposition of every metric
    pub fn render(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
