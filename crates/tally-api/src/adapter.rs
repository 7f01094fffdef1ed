use std::{sync::Arc, time::SystemTime};

use async_trait::async_trait;
use tally_core::{AgentRegistry, CoreError, DispatchMetrics, NoopMetrics, TaskStore};
use tally_model::{Agent, AgentLoad, Task, TaskDuration, TaskId};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::handler::ApiHandler;
use crate::validate::validate_expression;

/// [`ApiHandler`] backed directly by the orchestrator's store and registry.
pub struct OrchestratorAdapter {
    store: TaskStore,
    registry: AgentRegistry,
    metrics: Arc<dyn DispatchMetrics>,
}

impl OrchestratorAdapter {
    pub fn new(store: TaskStore, registry: AgentRegistry) -> Self {
        Self {
            store,
            registry,
            metrics: Arc::new(NoopMetrics),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn DispatchMetrics>) -> Self {
        self.metrics = metrics;
        self
    }
}

#[async_trait]
impl ApiHandler for OrchestratorAdapter {
    async fn submit_expression(&self, expression: String) -> Result<Task, ApiError> {
        validate_expression(&expression)?;

        let task = self.store.submit(expression)?;
        self.metrics.record_submitted();
        self.metrics.set_queue_depth(self.store.queue_len());

        info!(task = %task.id, expression = %task.expression, "expression submitted");
        Ok(task)
    }

    async fn register_agent(&self, address: String) -> Result<Agent, ApiError> {
        let agent = self.registry.register(&address)?;
        info!(agent = %agent.id, address = %agent.address, "agent registered");
        Ok(agent)
    }

    async fn list_agents(&self) -> Result<Vec<Agent>, ApiError> {
        Ok(self.registry.list())
    }

    async fn agent_load(&self) -> Result<Vec<AgentLoad>, ApiError> {
        Ok(self.store.agent_load())
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        Ok(self.store.list_all())
    }

    async fn pending_durations(&self) -> Result<Vec<TaskDuration>, ApiError> {
        Ok(self.store.pending_durations(SystemTime::now()))
    }

    async fn retrieve_task(&self, id: TaskId) -> Result<Task, ApiError> {
        match self.store.take_result(id) {
            Ok(task) => {
                if task.is_terminal() {
                    debug!(task = %id, status = %task.status, "result picked up");
                }
                Ok(task)
            }
            Err(CoreError::TaskNotFound(id)) => Err(ApiError::TaskNotFound(id)),
            Err(e) => Err(e.into()),
        }
    }
}
