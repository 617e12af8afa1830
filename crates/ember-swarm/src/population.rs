//! Population view
//!
//! One polling pass over the whole population. Every pass starts from an
//! empty map so no snapshot outlives the pass that produced it.

use chrono::{DateTime, Utc};
use ember_common::{AgentId, TelemetrySnapshot};
use futures::future::join_all;
use std::collections::BTreeMap;
use tracing::debug;

use crate::gateway::AgentGateway;

/// Last-known telemetry of every agent, keyed by index
///
/// An entry is `None` when that agent's fetch failed during the pass.
#[derive(Debug, Clone)]
pub struct PopulationView {
    entries: BTreeMap<AgentId, Option<TelemetrySnapshot>>,
    polled_at: DateTime<Utc>,
}

impl PopulationView {
    /// Fetch every agent concurrently
    ///
    /// Each fetch carries its own timeout inside the gateway, so one
    /// unreachable agent delays the pass by at most that timeout.
    pub async fn poll<G: AgentGateway + ?Sized>(agents: &[AgentId], gateway: &G) -> Self {
        let polled_at = Utc::now();
        let results = join_all(agents.iter().map(|&agent| async move {
            (agent, gateway.fetch(agent).await)
        }))
        .await;

        let view = Self {
            entries: results.into_iter().collect(),
            polled_at,
        };
        debug!(
            polled = view.len(),
            live = view.live_count(),
            alive = view.alive_count(),
            "Population polled"
        );
        view
    }

    /// Build a view from known entries
    pub fn from_entries(
        entries: impl IntoIterator<Item = (AgentId, Option<TelemetrySnapshot>)>,
    ) -> Self {
        Self {
            entries: entries.into_iter().collect(),
            polled_at: Utc::now(),
        }
    }

    /// Snapshot of one agent, if it answered
    pub fn get(&self, agent: AgentId) -> Option<&TelemetrySnapshot> {
        self.entries.get(&agent).and_then(|e| e.as_ref())
    }

    /// Agents that answered, in index order
    pub fn live(&self) -> impl Iterator<Item = (AgentId, &TelemetrySnapshot)> {
        self.entries
            .iter()
            .filter_map(|(a, s)| s.as_ref().map(|s| (*a, s)))
    }

    /// Agents that did not answer, in index order
    pub fn absent(&self) -> Vec<AgentId> {
        self.entries
            .iter()
            .filter(|(_, s)| s.is_none())
            .map(|(a, _)| *a)
            .collect()
    }

    /// Number of agents that answered
    pub fn live_count(&self) -> usize {
        self.entries.values().filter(|s| s.is_some()).count()
    }

    /// Number of answering agents that report themselves alive
    pub fn alive_count(&self) -> usize {
        self.live().filter(|(_, s)| s.alive).count()
    }

    /// Number of attempted entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// When the pass started
    pub fn polled_at(&self) -> DateTime<Utc> {
        self.polled_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::memory::InMemoryGateway;

    #[tokio::test]
    async fn test_poll_records_every_agent() {
        let gateway = InMemoryGateway::new(4, 1);
        gateway.set_reachable(AgentId(2), false);
        gateway.update(AgentId(3), |bot| bot.alive = false);

        let view = PopulationView::poll(&AgentId::population(4), &gateway).await;

        assert_eq!(view.len(), 4);
        assert_eq!(view.live_count(), 3);
        assert_eq!(view.alive_count(), 2);
        assert_eq!(view.absent(), vec![AgentId(2)]);
        assert!(view.get(AgentId(2)).is_none());
        assert!(view.get(AgentId(0)).is_some());
    }

    #[tokio::test]
    async fn test_poll_time_is_pass_start() {
        let gateway = InMemoryGateway::new(2, 1);

        let before = Utc::now();
        let view = PopulationView::poll(&AgentId::population(2), &gateway).await;
        let after = Utc::now();

        assert!(view.polled_at() >= before && view.polled_at() <= after);
        assert!(!view.is_empty());
    }

    #[tokio::test]
    async fn test_poll_with_everyone_offline() {
        let gateway = InMemoryGateway::new(3, 1);
        gateway.set_all_reachable(false);

        let view = PopulationView::poll(&AgentId::population(3), &gateway).await;
        assert_eq!(view.len(), 3);
        assert_eq!(view.live_count(), 0);
        assert_eq!(view.live().count(), 0);
    }

    #[test]
    fn test_live_is_index_ordered() {
        use ember_common::Genome;
        let snap = TelemetrySnapshot::new(true, 1.0, 50.0, Genome::new(0.2, 1.0));
        let view = PopulationView::from_entries(vec![
            (AgentId(2), Some(snap.clone())),
            (AgentId(0), Some(snap.clone())),
            (AgentId(1), None),
        ]);

        let order: Vec<_> = view.live().map(|(a, _)| a).collect();
        assert_eq!(order, vec![AgentId(0), AgentId(2)]);
    }
}
