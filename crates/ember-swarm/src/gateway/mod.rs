//! Agent gateway
//!
//! Capability interface over one remote bot. The orchestrator only ever
//! talks to bots through [`AgentGateway`].

pub mod http;
pub mod memory;

use async_trait::async_trait;
use ember_common::{AgentId, GatewayError, TelemetrySnapshot};
use std::fmt;

/// Placeholder substituted with the agent index in an [`AddressPattern`]
pub const ID_PLACEHOLDER: &str = "{id}";

/// Marker for a command the transport delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied;

/// Trait for reaching bots
///
/// Implementations are stateless with respect to the caller and safe to
/// invoke concurrently for different agents. Failures are logged by the
/// implementation and reported as `None`.
#[async_trait]
pub trait AgentGateway: Send + Sync {
    /// Fetch the current telemetry of one bot
    async fn fetch(&self, agent: AgentId) -> Option<TelemetrySnapshot>;

    /// Invoke a named action on one bot
    async fn command(&self, agent: AgentId, command: &AgentCommand) -> Option<Applied>;
}

#[async_trait]
impl<G: AgentGateway + ?Sized> AgentGateway for std::sync::Arc<G> {
    async fn fetch(&self, agent: AgentId) -> Option<TelemetrySnapshot> {
        (**self).fetch(agent).await
    }

    async fn command(&self, agent: AgentId, command: &AgentCommand) -> Option<Applied> {
        (**self).command(agent, command).await
    }
}

/// Remote actions a bot exposes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AgentCommand {
    /// Replace the genome with random values and reset life
    Randomize,
    /// Refill energy and restart the generation clock
    Reset,
    /// Apply a small bot-local random perturbation to the genome
    Mutate,
    /// Persist the current genome to flash
    Save,
    /// Set the light threshold gene
    SetThreshold(f64),
    /// Set the efficiency gene
    SetEfficiency(f64),
}

impl AgentCommand {
    /// Endpoint name of the action
    pub fn name(&self) -> &'static str {
        match self {
            AgentCommand::Randomize => "randomize",
            AgentCommand::Reset => "reset",
            AgentCommand::Mutate => "mutate",
            AgentCommand::Save => "save",
            AgentCommand::SetThreshold(_) => "threshold",
            AgentCommand::SetEfficiency(_) => "efficiency",
        }
    }

    /// Query parameters carried by the action
    pub fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            AgentCommand::SetThreshold(v) | AgentCommand::SetEfficiency(v) => {
                vec![("value", v.to_string())]
            }
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for AgentCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentCommand::SetThreshold(v) | AgentCommand::SetEfficiency(v) => {
                write!(f, "{}={}", self.name(), v)
            }
            _ => f.write_str(self.name()),
        }
    }
}

/// Base URL template for the population
///
/// Contains `{id}`, replaced by the agent index, e.g.
/// `http://ember-bot-{id}.local`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressPattern {
    template: String,
}

impl AddressPattern {
    pub fn new(template: impl Into<String>) -> Result<Self, GatewayError> {
        let template = template.into();
        if !template.contains(ID_PLACEHOLDER) {
            return Err(GatewayError::InvalidAddress(format!(
                "'{}' does not contain {}",
                template, ID_PLACEHOLDER
            )));
        }
        if !(template.starts_with("http://") || template.starts_with("https://")) {
            return Err(GatewayError::InvalidAddress(format!(
                "'{}' must start with http:// or https://",
                template
            )));
        }
        Ok(Self {
            template: template.trim_end_matches('/').to_string(),
        })
    }

    /// mDNS addresses of the form `http://<host>-<n>.local`
    pub fn from_host(base_host: &str) -> Result<Self, GatewayError> {
        Self::new(format!("http://{}-{}.local", base_host, ID_PLACEHOLDER))
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Base URL of one bot
    pub fn base_url(&self, agent: AgentId) -> String {
        self.template.replace(ID_PLACEHOLDER, &agent.index().to_string())
    }

    /// Status endpoint of one bot
    pub fn status_url(&self, agent: AgentId) -> String {
        format!("{}/api/stats", self.base_url(agent))
    }

    /// Endpoint of a named action on one bot
    pub fn command_url(&self, agent: AgentId, command: &AgentCommand) -> String {
        format!("{}/{}", self.base_url(agent), command.name())
    }
}

impl fmt::Display for AddressPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_from_host() {
        let pattern = AddressPattern::from_host("ember-bot").unwrap();
        assert_eq!(pattern.base_url(AgentId(3)), "http://ember-bot-3.local");
        assert_eq!(
            pattern.status_url(AgentId(0)),
            "http://ember-bot-0.local/api/stats"
        );
        assert_eq!(
            pattern.command_url(AgentId(8), &AgentCommand::Mutate),
            "http://ember-bot-8.local/mutate"
        );
    }

    #[test]
    fn test_address_requires_placeholder() {
        assert!(matches!(
            AddressPattern::new("http://ember-bot.local"),
            Err(GatewayError::InvalidAddress(_))
        ));
        assert!(AddressPattern::new("ember-bot-{id}.local").is_err());
    }

    #[test]
    fn test_address_trims_trailing_slash() {
        let pattern = AddressPattern::new("http://127.0.0.1:8080/bots/{id}/").unwrap();
        assert_eq!(
            pattern.status_url(AgentId(1)),
            "http://127.0.0.1:8080/bots/1/api/stats"
        );
    }

    #[test]
    fn test_command_names_and_params() {
        assert_eq!(AgentCommand::Save.name(), "save");
        assert!(AgentCommand::Reset.params().is_empty());

        let set = AgentCommand::SetEfficiency(1.25);
        assert_eq!(set.name(), "efficiency");
        assert_eq!(set.params(), vec![("value", "1.25".to_string())]);
        assert_eq!(set.to_string(), "efficiency=1.25");
    }
}
