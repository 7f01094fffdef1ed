use async_trait::async_trait;
use tally_model::{Agent, AgentLoad, Task, TaskDuration, TaskId};

use crate::error::ApiError;

/// Orchestrator control-surface handler.
///
/// The HTTP layer only decodes requests and encodes responses; everything
/// else goes through this trait, so a deployment can wrap the provided
/// [`OrchestratorAdapter`](crate::OrchestratorAdapter) with extra policy.
#[async_trait]
pub trait ApiHandler: Send + Sync + 'static {
    /// Validate and enqueue an expression.
    async fn submit_expression(&self, expression: String) -> Result<Task, ApiError>;

    /// Add an agent and hand back its assigned identity.
    async fn register_agent(&self, address: String) -> Result<Agent, ApiError>;

    async fn list_agents(&self) -> Result<Vec<Agent>, ApiError>;

    /// `(agent, task)` pairs for in-progress tasks.
    async fn agent_load(&self) -> Result<Vec<AgentLoad>, ApiError>;

    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError>;

    /// Time in the system for every non-terminal task.
    async fn pending_durations(&self) -> Result<Vec<TaskDuration>, ApiError>;

    /// Client pickup; a terminal task is removed by this call.
    async fn retrieve_task(&self, id: TaskId) -> Result<Task, ApiError>;
}
