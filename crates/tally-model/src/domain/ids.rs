use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Orchestrator-assigned task identifier.
///
/// Ids are handed out sequentially starting at 1 and never reused within one orchestrator process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

/// Orchestrator-assigned agent identifier.
///
/// `0` is reserved for "not assigned yet".
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AgentId(pub u64);

impl AgentId {
    pub const UNASSIGNED: AgentId = AgentId(0);

    #[inline]
    pub fn is_assigned(&self) -> bool {
        self.0 != 0
    }
}

impl From<u64> for TaskId {
    fn from(raw: u64) -> Self {
        TaskId(raw)
    }
}

impl From<u64> for AgentId {
    fn from(raw: u64) -> Self {
        AgentId(raw)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(TaskId)
            .map_err(|_| ModelError::InvalidId(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_id_parses_trimmed_digits() {
        assert_eq!(" 42 ".parse::<TaskId>().unwrap(), TaskId(42));
    }

    #[test]
    fn task_id_rejects_garbage() {
        let err = "4x2".parse::<TaskId>().unwrap_err();
        assert_eq!(err, ModelError::InvalidId("4x2".into()));
        assert!("-1".parse::<TaskId>().is_err());
        assert!("".parse::<TaskId>().is_err());
    }

    #[test]
    fn unassigned_agent() {
        assert!(!AgentId::default().is_assigned());
        assert!(AgentId(3).is_assigned());
    }

    #[test]
    fn ids_serialize_as_plain_numbers() {
        assert_eq!(serde_json::to_string(&TaskId(7)).unwrap(), "7");
        let id: AgentId = serde_json::from_str("12").unwrap();
        assert_eq!(id, AgentId(12));
    }
}
