//! # EMBER Swarm
//!
//! Network-facing access to the bot population.
//!
//! Every bot runs its own web server; nothing in the orchestrator holds the
//! truth about a bot's state, it has to be polled. This crate provides:
//!
//! - [`AgentGateway`]: `fetch` telemetry and issue `command`s to one bot.
//!   Both are best-effort and never surface an error to the caller.
//! - [`HttpGateway`]: the real implementation over HTTP.
//! - [`InMemoryGateway`]: a simulated swarm for tests.
//! - [`PopulationView`]: one concurrent polling pass over the population.

pub mod gateway;
pub mod population;

pub use gateway::{
    http::{HttpGateway, HttpGatewayConfig},
    memory::{InMemoryGateway, SimulatedBot},
    AddressPattern, AgentCommand, AgentGateway, Applied,
};
pub use population::PopulationView;
