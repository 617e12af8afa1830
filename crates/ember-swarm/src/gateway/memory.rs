//! In-memory gateway
//!
//! Simulated swarm with the same command semantics as the bot firmware.
//! Used by tests and dry runs; every bot can be made unreachable and every
//! delivered command is journaled.

use async_trait::async_trait;
use dashmap::DashMap;
use ember_common::{AgentId, Genome, TelemetrySnapshot};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tokio::time::Instant;

use super::{AgentCommand, AgentGateway, Applied};

/// Maps a genome to how many seconds a bot carrying it survives
pub type LifespanFn = Arc<dyn Fn(&Genome) -> f64 + Send + Sync>;

/// State of one simulated bot
#[derive(Debug, Clone)]
pub struct SimulatedBot {
    pub genome: Genome,
    /// Genome last written to flash
    pub saved_genome: Genome,
    pub alive: bool,
    pub energy: f64,
    pub generation: u32,
    /// Unreachable bots fail every fetch and command
    pub reachable: bool,
    /// Fixed alive time reported instead of the simulated clock
    pub alive_time_override: Option<f64>,
    reset_at: Instant,
}

impl SimulatedBot {
    pub fn new(genome: Genome) -> Self {
        Self {
            genome,
            saved_genome: genome,
            alive: true,
            energy: 100.0,
            generation: 0,
            reachable: true,
            alive_time_override: None,
            reset_at: Instant::now(),
        }
    }

    fn reset(&mut self) {
        self.energy = 100.0;
        self.alive = true;
        self.alive_time_override = None;
        self.reset_at = Instant::now();
    }
}

/// Gateway over simulated bots
pub struct InMemoryGateway {
    bots: DashMap<AgentId, SimulatedBot>,
    journal: Mutex<Vec<(AgentId, AgentCommand)>>,
    rng: Mutex<StdRng>,
    lifespan: Option<LifespanFn>,
}

impl InMemoryGateway {
    /// Create `size` bots with a mid-range genome
    pub fn new(size: usize, seed: u64) -> Self {
        let bots = DashMap::new();
        for agent in AgentId::population(size) {
            bots.insert(agent, SimulatedBot::new(Genome::new(0.25, 1.0)));
        }
        Self {
            bots,
            journal: Mutex::new(Vec::new()),
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            lifespan: None,
        }
    }

    /// Create bots from explicit genomes, indexed in order
    pub fn with_genomes(genomes: &[Genome], seed: u64) -> Self {
        let gateway = Self::new(0, seed);
        for (index, genome) in genomes.iter().enumerate() {
            gateway.bots.insert(AgentId(index), SimulatedBot::new(*genome));
        }
        gateway
    }

    /// Derive survival time from the genome instead of reporting a bare clock
    ///
    /// A bot is alive until the simulated clock passes its lifespan.
    pub fn with_lifespan(mut self, lifespan: impl Fn(&Genome) -> f64 + Send + Sync + 'static) -> Self {
        self.lifespan = Some(Arc::new(lifespan));
        self
    }

    /// Current state of one bot
    pub fn bot(&self, agent: AgentId) -> Option<SimulatedBot> {
        self.bots.get(&agent).map(|b| b.clone())
    }

    /// Mutate one bot in place
    pub fn update(&self, agent: AgentId, f: impl FnOnce(&mut SimulatedBot)) {
        if let Some(mut bot) = self.bots.get_mut(&agent) {
            f(&mut bot);
        }
    }

    pub fn set_reachable(&self, agent: AgentId, reachable: bool) {
        self.update(agent, |bot| bot.reachable = reachable);
    }

    pub fn set_all_reachable(&self, reachable: bool) {
        for mut bot in self.bots.iter_mut() {
            bot.reachable = reachable;
        }
    }

    /// Pin the reported alive time of one bot until its next reset
    pub fn set_alive_time(&self, agent: AgentId, alive_time: f64) {
        self.update(agent, |bot| bot.alive_time_override = Some(alive_time));
    }

    /// Every delivered command in delivery order
    pub fn journal(&self) -> Vec<(AgentId, AgentCommand)> {
        self.journal.lock().clone()
    }

    /// Delivered commands for one bot in delivery order
    pub fn commands_for(&self, agent: AgentId) -> Vec<AgentCommand> {
        self.journal
            .lock()
            .iter()
            .filter(|(a, _)| *a == agent)
            .map(|(_, c)| *c)
            .collect()
    }

    fn snapshot(&self, agent: AgentId, bot: &SimulatedBot) -> TelemetrySnapshot {
        let elapsed = bot.reset_at.elapsed().as_secs_f64();
        let (alive_time, alive) = match (bot.alive_time_override, &self.lifespan) {
            (Some(t), _) => (t, bot.alive),
            (None, Some(lifespan)) => {
                let span = lifespan(&bot.genome).max(0.0);
                (elapsed.min(span), bot.alive && elapsed < span)
            }
            (None, None) => (elapsed, bot.alive),
        };

        TelemetrySnapshot {
            alive,
            alive_time: alive_time.floor(),
            energy: if alive { bot.energy } else { 0.0 },
            genome: bot.genome,
            bot_id: Some(agent.index()),
            generation: Some(bot.generation),
        }
    }

    fn apply(&self, bot: &mut SimulatedBot, command: &AgentCommand) {
        let mut rng = self.rng.lock();
        match *command {
            AgentCommand::Randomize => {
                bot.genome = Genome::new(
                    rng.gen_range(10..500) as f64 / 1000.0,
                    0.75 + rng.gen_range(0..100) as f64 / 100.0,
                );
                bot.generation = 0;
                bot.saved_genome = bot.genome;
                bot.reset();
            }
            AgentCommand::Reset => bot.reset(),
            AgentCommand::Mutate => {
                let perturbed = Genome::new(
                    bot.genome.threshold + rng.gen_range(-100..100) as f64 / 2000.0,
                    bot.genome.efficiency + rng.gen_range(-100..100) as f64 / 2000.0,
                );
                bot.genome = perturbed.clamped();
                bot.generation += 1;
                bot.saved_genome = bot.genome;
            }
            AgentCommand::Save => bot.saved_genome = bot.genome,
            AgentCommand::SetThreshold(v) => {
                bot.genome = Genome::new(v, bot.genome.efficiency).clamped();
                bot.saved_genome = bot.genome;
            }
            AgentCommand::SetEfficiency(v) => {
                bot.genome = Genome::new(bot.genome.threshold, v).clamped();
                bot.saved_genome = bot.genome;
            }
        }
    }
}

#[async_trait]
impl AgentGateway for InMemoryGateway {
    async fn fetch(&self, agent: AgentId) -> Option<TelemetrySnapshot> {
        let bot = self.bots.get(&agent)?;
        if !bot.reachable {
            return None;
        }
        Some(self.snapshot(agent, &bot))
    }

    async fn command(&self, agent: AgentId, command: &AgentCommand) -> Option<Applied> {
        {
            let mut bot = self.bots.get_mut(&agent)?;
            if !bot.reachable {
                return None;
            }
            self.apply(&mut bot, command);
        }
        self.journal.lock().push((agent, *command));
        Some(Applied)
    }
}
