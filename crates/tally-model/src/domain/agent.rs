use serde::{Deserialize, Serialize};

use crate::{AgentId, ModelError};

/// Registry entry for a worker process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: AgentId,
    /// Base URL of the agent's control surface, e.g. `http://10.0.0.5:8081`.
    pub address: String,
}

impl Agent {
    pub fn new(id: AgentId, address: impl Into<String>) -> Self {
        Self {
            id,
            address: address.into(),
        }
    }

    /// Absolute URL for `path` on this agent.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.address.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Checks that `address` looks like an `http(s)://host[:port]` base URL.
    pub fn validate_address(address: &str) -> Result<(), ModelError> {
        let trimmed = address.trim();
        let rest = trimmed
            .strip_prefix("http://")
            .or_else(|| trimmed.strip_prefix("https://"))
            .ok_or_else(|| ModelError::InvalidAddress(address.to_string()))?;

        let host = rest.split('/').next().unwrap_or_default();
        if host.is_empty() || host.starts_with(':') || host.contains(char::is_whitespace) {
            return Err(ModelError::InvalidAddress(address.to_string()));
        }
        Ok(())
    }
}
