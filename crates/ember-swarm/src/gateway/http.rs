//! HTTP gateway to real bots
//!
//! Each bot serves a JSON status document at `/api/stats` and one GET
//! endpoint per action. Every request is bounded by the client timeout and
//! never retried.

use async_trait::async_trait;
use ember_common::{AgentId, GatewayError, TelemetrySnapshot};
use reqwest::{redirect, Client};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::{AddressPattern, AgentCommand, AgentGateway, Applied};

/// HTTP gateway configuration
#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
    /// Where the bots live
    pub address: AddressPattern,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl HttpGatewayConfig {
    pub fn new(address: AddressPattern) -> Self {
        Self {
            address,
            request_timeout: Duration::from_millis(ember_common::DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Gateway over the bots' web servers
pub struct HttpGateway {
    client: Client,
    address: AddressPattern,
    timeout: Duration,
}

impl HttpGateway {
    /// Create a new HTTP gateway
    pub fn new(config: HttpGatewayConfig) -> Result<Self, GatewayError> {
        // Action handlers answer 303 back to the bot's HTML page; following it
        // would only fetch a page nobody reads.
        let client = Client::builder()
            .timeout(config.request_timeout)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| GatewayError::Transport {
                url: config.address.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            address: config.address,
            timeout: config.request_timeout,
        })
    }

    pub fn address(&self) -> &AddressPattern {
        &self.address
    }

    /// Fetch and parse one status document
    pub async fn try_fetch(&self, agent: AgentId) -> Result<TelemetrySnapshot, GatewayError> {
        let url = self.address.status_url(agent);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.classify(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| self.classify(&url, e))?;
        TelemetrySnapshot::from_json(&body).map_err(|e| GatewayError::Malformed {
            url,
            reason: e.to_string(),
        })
    }

    /// Deliver one action
    ///
    /// Success is transport-level only: any HTTP answer counts, whatever its
    /// status.
    pub async fn try_command(
        &self,
        agent: AgentId,
        command: &AgentCommand,
    ) -> Result<(), GatewayError> {
        let url = self.address.command_url(agent, command);
        let response = self
            .client
            .get(&url)
            .query(&command.params())
            .send()
            .await
            .map_err(|e| self.classify(&url, e))?;

        let status = response.status();
        if !status.is_success() && !status.is_redirection() {
            debug!(url = %url, status = status.as_u16(), "Command answered with non-success status");
        }
        Ok(())
    }

    fn classify(&self, url: &str, err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Timeout {
                url: url.to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            GatewayError::Transport {
                url: url.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl AgentGateway for HttpGateway {
    #[instrument(skip(self), fields(agent = %agent))]
    async fn fetch(&self, agent: AgentId) -> Option<TelemetrySnapshot> {
        match self.try_fetch(agent).await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(agent = %agent, error = %e, "Could not fetch telemetry");
                None
            }
        }
    }

    #[instrument(skip(self, command), fields(agent = %agent, command = %command))]
    async fn command(&self, agent: AgentId, command: &AgentCommand) -> Option<Applied> {
        match self.try_command(agent, command).await {
            Ok(()) => {
                debug!(agent = %agent, command = %command, "Command delivered");
                Some(Applied)
            }
            Err(e) => {
                warn!(agent = %agent, command = %command, error = %e, "Could not send command");
                None
            }
        }
    }
}
