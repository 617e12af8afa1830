//! Generation controller
//!
//! Drives the experiment one state at a time from a single task. Each state
//! handler does its network work and returns the next state; the run loop
//! races every handler against the shutdown signal.

use ember_common::{AgentId, EmberError, GenerationRecord, Result, SelectionError};
use ember_swarm::{AgentCommand, AgentGateway, Applied, PopulationView};
use futures::future::join_all;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::state::GenerationState;
use crate::fitness::GenerationSummary;
use crate::ledger::ExperimentLog;
use crate::selection::{GenomeAssignment, SelectionPressure, Selector};
use crate::telemetry::EvolutionMetrics;
use crate::EvolutionConfig;

/// Outcome of a run
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentReport {
    pub run_id: Uuid,
    /// Generations whose Logging step finished
    pub generations_completed: u32,
    /// Whether an interrupt ended the run early
    pub stopped: bool,
    /// Rows appended to the experiment log during this run
    pub rows_logged: usize,
    pub summaries: Vec<GenerationSummary>,
}

/// Generational control loop over a live swarm
pub struct GenerationController<G: AgentGateway> {
    config: EvolutionConfig,
    gateway: G,
    agents: Vec<AgentId>,
    selector: Selector,
    log: ExperimentLog,
    rng: StdRng,
    metrics: EvolutionMetrics,
    shutdown: watch::Receiver<bool>,
    run_id: Uuid,
    summaries: Vec<GenerationSummary>,
    rows_logged: usize,
}

impl<G: AgentGateway> GenerationController<G> {
    /// Create a controller; `shutdown` flipping to `true` stops the run
    pub fn new(
        config: EvolutionConfig,
        gateway: G,
        log: ExperimentLog,
        shutdown: watch::Receiver<bool>,
    ) -> Result<Self> {
        config.validate()?;
        let selector = Selector::new(SelectionPressure::new(config.selection_pressure)?);
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let metrics = EvolutionMetrics::new()
            .map_err(|e| EmberError::Internal(format!("metrics registry: {}", e)))?;

        Ok(Self {
            agents: AgentId::population(config.population),
            config,
            gateway,
            selector,
            log,
            rng,
            metrics,
            shutdown,
            run_id: Uuid::now_v7(),
            summaries: Vec::new(),
            rows_logged: 0,
        })
    }

    pub fn metrics(&self) -> &EvolutionMetrics {
        &self.metrics
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Run every configured generation, or until interrupted
    ///
    /// Only an experiment log failure ends the run with an error.
    pub async fn run(&mut self) -> Result<ExperimentReport> {
        let span = info_span!("experiment", run_id = %self.run_id);
        async {
            info!(
                population = self.config.population,
                generations = self.config.generations,
                generation_secs = self.config.generation_duration.as_secs(),
                pressure = self.config.selection_pressure,
                log = %self.log.path().display(),
                "Starting evolution experiment"
            );

            let mut state = GenerationState::Initializing;
            while !state.is_terminal() {
                state = self.advance(state).await?;
            }

            let stopped = matches!(state, GenerationState::Stopped { .. });
            if stopped {
                info!(state = %state, "Experiment stopped by interrupt");
            } else {
                info!(
                    generations = self.summaries.len(),
                    rows = self.rows_logged,
                    "Evolution experiment complete"
                );
            }

            Ok(self.report(stopped))
        }
        .instrument(span)
        .await
    }

    /// Execute one state, unless an interrupt arrives first
    pub async fn advance(&mut self, state: GenerationState) -> Result<GenerationState> {
        if *self.shutdown.borrow() {
            return Ok(state.interrupted());
        }

        let mut shutdown = self.shutdown.clone();
        let fallback = state.clone();
        tokio::select! {
            biased;
            _ = wait_for_shutdown(&mut shutdown) => Ok(fallback.interrupted()),
            next = self.step(state) => next,
        }
    }

    /// Execute one state to completion
    pub async fn step(&mut self, state: GenerationState) -> Result<GenerationState> {
        debug!(state = %state, "Entering state");
        let next = match state {
            GenerationState::Initializing => {
                self.initialize().await;
                GenerationState::LivePhase { generation: 0 }
            }
            GenerationState::Breeding { generation } => {
                let assignments = self.breed(generation).await;
                GenerationState::Mutating {
                    generation,
                    assignments,
                }
            }
            GenerationState::Mutating {
                generation,
                assignments,
            } => {
                self.mutate(generation, &assignments).await;
                GenerationState::LivePhase { generation }
            }
            GenerationState::LivePhase { generation } => {
                self.live_phase(generation).await;
                GenerationState::Logging { generation }
            }
            GenerationState::Logging { generation } => {
                self.log_generation(generation).await?;
                GenerationState::after_logging(generation, self.config.generations)
            }
            terminal @ (GenerationState::Done | GenerationState::Stopped { .. }) => terminal,
        };
        Ok(next)
    }

    /// Randomize every genome for generation 0
    async fn initialize(&mut self) {
        info!(population = self.agents.len(), "Initializing population with random genomes");
        for (i, &agent) in self.agents.iter().enumerate() {
            if i > 0 {
                sleep(self.config.command_stagger).await;
            }
            let outcome = self.gateway.command(agent, &AgentCommand::Randomize).await;
            self.count_command(outcome);
        }
        info!("Population initialized");
    }

    /// Select on the previous generation's fitness and breed assignments
    ///
    /// Returns no assignments when no bot answered; the population then
    /// carries its genomes into the next generation unchanged.
    async fn breed(&mut self, generation: u32) -> Vec<GenomeAssignment> {
        info!(generation, "Selecting winners and breeding next generation");
        let view = self.poll().await;

        match self
            .selector
            .select(&view, self.agents.len(), &mut self.rng)
        {
            Ok(outcome) => {
                for winner in &outcome.winners {
                    info!(
                        agent = %winner.agent,
                        fitness = winner.fitness,
                        threshold = winner.genome.threshold,
                        efficiency = winner.genome.efficiency,
                        "Winner"
                    );
                }
                outcome.assignments
            }
            Err(SelectionError::NoLiveAgents) => {
                self.metrics.breeding_skipped.inc();
                error!(
                    generation,
                    population = self.agents.len(),
                    "No bot reported telemetry; skipping breeding, genomes unchanged"
                );
                Vec::new()
            }
            Err(e) => {
                self.metrics.breeding_skipped.inc();
                error!(generation, error = %e, "Selection failed; skipping breeding");
                Vec::new()
            }
        }
    }

    /// Apply assignments, persist them, then mutate every bot
    async fn mutate(&mut self, generation: u32, assignments: &[GenomeAssignment]) {
        if !assignments.is_empty() {
            info!(generation, bots = assignments.len(), "Applying bred genomes");
        }
        for (i, assignment) in assignments.iter().enumerate() {
            if i > 0 {
                sleep(self.config.command_stagger).await;
            }
            // Setters first, persist last, for each bot.
            for command in assignment.commands() {
                let outcome = self.gateway.command(assignment.agent, &command).await;
                self.count_command(outcome);
            }
            debug!(
                agent = %assignment.agent,
                first_parent = %assignment.parents.0,
                second_parent = %assignment.parents.1,
                threshold = assignment.genome.threshold,
                efficiency = assignment.genome.efficiency,
                "Genome assigned"
            );
        }

        info!(generation, "Applying mutations");
        for &agent in &self.agents {
            let outcome = self.gateway.command(agent, &AgentCommand::Mutate).await;
            self.count_command(outcome);
        }
    }

    /// Reset every bot and watch the generation run
    ///
    /// Monitoring polls are informational; fitness comes only from the
    /// Logging poll.
    async fn live_phase(&mut self, generation: u32) {
        info!(generation, "Resetting all bots to full energy");
        let resets = join_all(
            self.agents
                .iter()
                .map(|&agent| self.gateway.command(agent, &AgentCommand::Reset)),
        )
        .await;
        for outcome in resets {
            self.count_command(outcome);
        }

        let duration = self.config.generation_duration;
        let interval = self.config.effective_monitor_interval();
        info!(
            generation,
            seconds = duration.as_secs(),
            "Generation running, monitoring"
        );

        let started = Instant::now();
        loop {
            let remaining = duration.saturating_sub(started.elapsed());
            if remaining.is_zero() {
                break;
            }

            let view = self.poll().await;
            info!(
                generation,
                remaining_secs = remaining.as_secs(),
                alive = view.alive_count(),
                reporting = view.live_count(),
                population = self.agents.len(),
                "Monitoring"
            );

            let remaining = duration.saturating_sub(started.elapsed());
            sleep(interval.min(remaining)).await;
        }
    }

    /// Take the final poll and append it to the experiment log
    async fn log_generation(&mut self, generation: u32) -> Result<()> {
        info!(generation, "Logging fitness and genome data");
        let view = self.poll().await;
        let timestamp = view.polled_at();

        let records: Vec<GenerationRecord> = view
            .live()
            .map(|(agent, snapshot)| {
                GenerationRecord::from_snapshot(generation, agent, snapshot, timestamp)
            })
            .collect();

        let summary = GenerationSummary::from_view(generation, &view);
        for agent in &summary.missing {
            warn!(generation, agent = %agent, "No final telemetry; generation row missing from log");
        }
        self.metrics.log_gaps.inc_by(summary.missing.len() as u64);
        if records.is_empty() {
            error!(generation, "Final poll returned no telemetry; nothing logged for this generation");
        }

        let written = self.log.append(&records)?;
        self.rows_logged += written;
        self.metrics.generations_completed.inc();
        if let Some(best) = summary.best_fitness {
            self.metrics.best_fitness.set(best);
        }

        info!(
            generation,
            rows = written,
            missing = summary.missing.len(),
            alive = summary.alive,
            best_fitness = summary.best_fitness.unwrap_or_default(),
            mean_fitness = summary.mean_fitness.unwrap_or_default(),
            "Generation logged"
        );
        self.summaries.push(summary);
        Ok(())
    }

    async fn poll(&self) -> PopulationView {
        let view = PopulationView::poll(&self.agents, &self.gateway).await;
        self.metrics.observe_poll(&view);
        view
    }

    fn count_command(&self, outcome: Option<Applied>) {
        if outcome.is_none() {
            self.metrics.failed_commands.inc();
        }
    }

    fn report(&self, stopped: bool) -> ExperimentReport {
        ExperimentReport {
            run_id: self.run_id,
            generations_completed: self.summaries.len() as u32,
            stopped,
            rows_logged: self.rows_logged,
            summaries: self.summaries.clone(),
        }
    }
}

/// Resolves once the signal reads `true`; never resolves if the sender is gone
async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            futures::future::pending::<()>().await;
        }
    }
}
