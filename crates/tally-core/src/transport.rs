use async_trait::async_trait;
use tally_model::{Agent, Task, TaskId};

use crate::error::TransportError;

/// Agent answer to a placement offer.
#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    /// The agent took the task; carries its working copy.
    Accepted(Task),
    /// The agent declined, usually because it is at capacity.
    Rejected(String),
}

/// Agent answer to a result retrieval.
#[derive(Debug, Clone, PartialEq)]
pub enum Collection {
    /// Terminal payload; the agent has deleted its copy.
    Ready(Task),
    /// Still being evaluated.
    Running,
    /// The agent holds nothing under this id.
    Missing,
}

/// Orchestrator-side client for the agent control surface.
///
/// Implementations must bound every call with a timeout so a dead agent
/// cannot stall a loop past one tick.
#[async_trait]
pub trait AgentTransport: Send + Sync + 'static {
    /// Liveness check.
    async fn probe(&self, agent: &Agent) -> Result<(), TransportError>;

    /// Offer `task` to `agent`.
    async fn place(&self, agent: &Agent, task: &Task) -> Result<Placement, TransportError>;

    /// Pull the result of `id` from `agent`.
    async fn collect(&self, agent: &Agent, id: TaskId) -> Result<Collection, TransportError>;
}
