use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::{
    metrics::{DispatchMetrics, NoopMetrics},
    registry::AgentRegistry,
    store::TaskStore,
    transport::{AgentTransport, Collection},
};

/// Counters for one poll tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollReport {
    /// Tasks whose terminal result was pulled in.
    pub completed: usize,
    /// Tasks the agent is still working on.
    pub running: usize,
    /// Tasks whose agent could not be asked (transport error, unknown agent, no copy).
    pub unresolved: usize,
}

/// Pulls terminal results of in-flight tasks from the agents holding them.
pub struct CompletionPoller {
    store: TaskStore,
    registry: AgentRegistry,
    transport: Arc<dyn AgentTransport>,
    metrics: Arc<dyn DispatchMetrics>,
}

impl CompletionPoller {
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
        }
    }

    #[inline]
    pub fn with_metrics(mut self, metrics: Arc<dyn DispatchMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Ask every agent holding an in-progress task whether it is done.
    #[instrument(level = "trace", skip(self))]
    pub async fn tick(&self) -> PollReport {
        let mut report = PollReport::default();

        for task in self.store.in_flight() {
            let Some(agent) = self.registry.get(task.agent_id) else {
                warn!(task = %task.id, agent = %task.agent_id, "task held by an unknown agent");
                report.unresolved += 1;
                continue;
            };

            match self.transport.collect(&agent, task.id).await {
                Ok(Collection::Ready(payload)) => match self.store.complete(&payload) {
                    Ok(done) => {
                        info!(task = %done.id, agent = %agent.id, status = %done.status, result = done.result, "task completed");
                        self.metrics.record_completed(done.status);
                        report.completed += 1;
                    }
                    Err(e) => {
                        warn!(task = %task.id, error = %e, "discarding completion report");
                        report.unresolved += 1;
                    }
                },
                Ok(Collection::Running) => {
                    report.running += 1;
                }
                Ok(Collection::Missing) => {
                    warn!(task = %task.id, agent = %agent.id, "agent holds no copy of an in-flight task");
                    report.unresolved += 1;
                }
                Err(e) => {
                    debug!(task = %task.id, error = %e, "result retrieval failed");
                    report.unresolved += 1;
                }
            }
        }
        report
    }
}
