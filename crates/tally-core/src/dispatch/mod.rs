use std::sync::Arc;

use tally_model::{AgentId, TaskId};
use tracing::{debug, info, instrument, warn};

use crate::{
    config::QueuePolicy,
    metrics::{DispatchMetrics, NoopMetrics},
    registry::AgentRegistry,
    store::TaskStore,
    transport::{AgentTransport, Placement},
};

/// Result of one dispatch tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Nothing queued or no agents registered.
    Idle,
    /// The head task was accepted by `agent`.
    Placed { task: TaskId, agent: AgentId },
    /// No agent took the head task this tick; it stays queued.
    Deferred { task: TaskId },
}

/// Moves tasks from the pending queue onto accepting agents, one per tick.
pub struct Dispatcher {
    store: TaskStore,
    registry: AgentRegistry,
    transport: Arc<dyn AgentTransport>,
    metrics: Arc<dyn DispatchMetrics>,
    policy: QueuePolicy,
    probe_agents: bool,
}

impl Dispatcher {
    pub fn new(
        store: TaskStore,
        registry: AgentRegistry,
        transport: Arc<dyn AgentTransport>,
    ) -> Self {
        Self {
            store,
            registry,
            transport,
            metrics: Arc::new(NoopMetrics),
            policy: QueuePolicy::default(),
            probe_agents: false,
        }
    }

    #[inline]
    pub fn with_policy(mut self, policy: QueuePolicy) -> Self {
        self.policy = policy;
        self
    }

    #[inline]
    pub fn with_probe(mut self, probe_agents: bool) -> Self {
        self.probe_agents = probe_agents;
        self
    }

    #[inline]
    pub fn with_metrics(mut self, metrics: Arc<dyn DispatchMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Offer the head of the queue to each agent in turn until one accepts.
    #[instrument(level = "trace", skip(self))]
    pub async fn tick(&self) -> DispatchOutcome {
        self.metrics.set_queue_depth(self.store.queue_len());

        let Some(head) = self.store.head() else {
            return DispatchOutcome::Idle;
        };
        let agents = self.registry.list();
        if agents.is_empty() {
            return DispatchOutcome::Idle;
        }

        for agent in &agents {
            if self.probe_agents
                && let Err(e) = self.transport.probe(agent).await
            {
                debug!(agent = %agent.id, error = %e, "agent failed liveness, skipping");
                continue;
            }

            match self.transport.place(agent, &head).await {
                Ok(Placement::Accepted(_)) => match self.store.mark_placed(head.id, agent.id) {
                    Ok(task) => {
                        info!(task = %task.id, agent = %agent.id, "task placed");
                        self.metrics.record_placed();
                        self.metrics.set_queue_depth(self.store.queue_len());
                        return DispatchOutcome::Placed {
                            task: task.id,
                            agent: agent.id,
                        };
                    }
                    Err(e) => {
                        warn!(task = %head.id, agent = %agent.id, error = %e, "agent accepted a task that is no longer queued");
                        return DispatchOutcome::Deferred { task: head.id };
                    }
                },
                Ok(Placement::Rejected(reason)) => {
                    debug!(task = %head.id, agent = %agent.id, %reason, "placement rejected");
                    self.metrics.record_rejected();
                }
                Err(e) => {
                    debug!(task = %head.id, error = %e, "placement failed");
                }
            }
        }

        if self.policy == QueuePolicy::SkipAhead
            && let Some(id) = self.store.rotate_head()
        {
            debug!(task = %id, "no agent accepted the head task, moved to the back");
        }
        DispatchOutcome::Deferred { task: head.id }
    }
}
