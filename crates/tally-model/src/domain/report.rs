use serde::{Deserialize, Serialize};

use crate::{AgentId, TaskId};

/// One `(agent, task)` pair for a task currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentLoad {
    pub agent_id: AgentId,
    pub task_id: TaskId,
}

/// How long an unfinished task has been in the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDuration {
    pub task_id: TaskId,
    pub duration_secs: u64,
}

/// Liveness acknowledgement returned by an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Liveness {
    pub status: String,
    #[serde(default)]
    pub agent_id: AgentId,
    #[serde(default)]
    pub uptime_seconds: u64,
}

impl Liveness {
    pub const ALIVE: &'static str = "alive";

    pub fn alive(agent_id: AgentId, uptime_seconds: u64) -> Self {
        Self {
            status: Self::ALIVE.to_string(),
            agent_id,
            uptime_seconds,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.status == Self::ALIVE
    }
}
