use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Lifecycle state of a task.
///
/// Transitions only move forward: `pending -> in_progress -> {finished | error}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Submitted and waiting in the queue for an agent.
    Pending,
    /// Accepted by an agent and being evaluated there.
    InProgress,
    /// Evaluated successfully; `result` is meaningful.
    Finished,
    /// The evaluator rejected the expression.
    Error,
}

impl TaskStatus {
    /// Returns `true` if the task is in a terminal state (won't transition further).
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Finished | TaskStatus::Error)
    }

    /// Returns `true` if the task is still active (pending or in progress).
    pub fn is_active(&self) -> bool {
        matches!(self, TaskStatus::Pending | TaskStatus::InProgress)
    }

    /// Whether `self -> next` is an edge of the state machine.
    pub fn can_advance_to(&self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (TaskStatus::Pending, TaskStatus::InProgress)
                | (TaskStatus::InProgress, TaskStatus::Finished)
                | (TaskStatus::InProgress, TaskStatus::Error)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Finished => "finished",
            TaskStatus::Error => "error",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "finished" => Ok(TaskStatus::Finished),
            "error" => Ok(TaskStatus::Error),
            _ => Err(ModelError::InvalidStatus(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(TaskStatus::Finished.is_terminal());
        assert!(TaskStatus::Error.is_terminal());

        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::InProgress.is_terminal());
    }

    #[test]
    fn active_states() {
        assert!(TaskStatus::Pending.is_active());
        assert!(TaskStatus::InProgress.is_active());

        assert!(!TaskStatus::Finished.is_active());
        assert!(!TaskStatus::Error.is_active());
    }

    #[test]
    fn transitions_only_move_forward() {
        use TaskStatus::*;

        assert!(Pending.can_advance_to(InProgress));
        assert!(InProgress.can_advance_to(Finished));
        assert!(InProgress.can_advance_to(Error));

        assert!(!Pending.can_advance_to(Finished));
        assert!(!Pending.can_advance_to(Pending));
        assert!(!InProgress.can_advance_to(Pending));
        assert!(!Finished.can_advance_to(InProgress));
        assert!(!Error.can_advance_to(Finished));
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, r#""in_progress""#);

        let back: TaskStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TaskStatus::InProgress);
    }

    #[test]
    fn parse_matches_display() {
        for s in [
            TaskStatus::Pending,
            TaskStatus::InProgress,
            TaskStatus::Finished,
            TaskStatus::Error,
        ] {
            assert_eq!(s.to_string().parse::<TaskStatus>().unwrap(), s);
        }
        assert!("running".parse::<TaskStatus>().is_err());
    }
}
