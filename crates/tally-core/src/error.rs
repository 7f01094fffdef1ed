use thiserror::Error;

use tally_model::{AgentId, ModelError, TaskId, TaskStatus};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("task {id}: transition {from} -> {to} is not allowed")]
    InvalidTransition {
        id: TaskId,
        from: TaskStatus,
        to: TaskStatus,
    },

    #[error("task {0} is not waiting in the queue")]
    NotQueued(TaskId),

    #[error("too many active tasks (limit {limit})")]
    AtCapacity { limit: usize },

    #[error("invalid input: {0}")]
    Invalid(#[from] ModelError),

    #[error("supervisor error: {0}")]
    Supervisor(String),
}

/// Failure to talk to an agent. Never terminal for a task.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("agent {agent} unreachable: {reason}")]
    Unreachable { agent: AgentId, reason: String },

    #[error("agent {agent} sent an unexpected response: {reason}")]
    InvalidResponse { agent: AgentId, reason: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}
