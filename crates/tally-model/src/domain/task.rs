use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};

use crate::{AgentId, TaskId, TaskStatus, time_serde};

/// One expression to evaluate plus its lifecycle metadata.
///
/// The orchestrator owns the canonical record; an agent works on a copy
/// received through placement and hands it back on collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Orchestrator-assigned identifier.
    pub id: TaskId,
    /// Agent currently holding the task (`0` until placed).
    #[serde(default)]
    pub agent_id: AgentId,
    /// Opaque evaluator input.
    pub expression: String,
    /// Evaluator output; only meaningful once `status` is `finished`.
    #[serde(default)]
    pub result: f64,
    /// Current lifecycle state.
    pub status: TaskStatus,
    /// Submission time.
    #[serde(with = "time_serde")]
    pub begin_time: SystemTime,
    /// Completion time, set together with a terminal status.
    #[serde(
        default,
        with = "time_serde::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_time: Option<SystemTime>,
}

impl Task {
    /// Fresh `pending` task stamped with the current time.
    pub fn new(id: TaskId, expression: impl Into<String>) -> Self {
        Self {
            id,
            agent_id: AgentId::UNASSIGNED,
            expression: expression.into(),
            result: 0.0,
            status: TaskStatus::Pending,
            begin_time: SystemTime::now(),
            end_time: None,
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Record a successful evaluation.
    pub fn finish(&mut self, result: f64) {
        self.result = result;
        self.status = TaskStatus::Finished;
        self.end_time = Some(SystemTime::now());
    }

    /// Record a failed evaluation; `result` is left untouched.
    pub fn fail(&mut self) {
        self.status = TaskStatus::Error;
        self.end_time = Some(SystemTime::now());
    }

    /// Time since submission, or total run time once terminal.
    pub fn elapsed(&self, now: SystemTime) -> Duration {
        let until = self.end_time.unwrap_or(now);
        until.duration_since(self.begin_time).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_task_is_pending_and_unassigned() {
        let task = Task::new(TaskId(1), "1+6");
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(!task.agent_id.is_assigned());
        assert_eq!(task.result, 0.0);
        assert!(task.end_time.is_none());
    }

    #[test]
    fn finish_sets_result_and_end_time() {
        let mut task = Task::new(TaskId(1), "1+6");
        task.finish(7.0);
        assert_eq!(task.status, TaskStatus::Finished);
        assert_eq!(task.result, 7.0);
        assert!(task.end_time.is_some());
    }

    #[test]
    fn fail_keeps_zero_result() {
        let mut task = Task::new(TaskId(1), "1+");
        task.fail();
        assert_eq!(task.status, TaskStatus::Error);
        assert_eq!(task.result, 0.0);
        assert!(task.end_time.is_some());
    }

    #[test]
    fn json_uses_camel_case_and_omits_missing_end_time() {
        let task = Task::new(TaskId(3), "2*2");
        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"agentId\":0"));
        assert!(json.contains("\"beginTime\":"));
        assert!(json.contains("\"status\":\"pending\""));
        assert!(!json.contains("endTime"));

        let back: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, task.id);
        assert_eq!(back.expression, task.expression);
        assert_eq!(back.end_time, None);
    }

    #[test]
    fn elapsed_stops_at_end_time() {
        let mut task = Task::new(TaskId(1), "1");
        task.begin_time = SystemTime::UNIX_EPOCH;
        task.end_time = Some(SystemTime::UNIX_EPOCH + Duration::from_secs(5));
        let later = SystemTime::UNIX_EPOCH + Duration::from_secs(60);
        assert_eq!(task.elapsed(later), Duration::from_secs(5));
    }
}
