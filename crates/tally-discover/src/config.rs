use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RegisterConfig {
    /// Base URL of the orchestrator.
    pub endpoint: String,
    /// Base URL this agent is reachable at.
    pub address: String,
    pub retry_ms: u64,
    pub timeout_ms: u64,
}

impl RegisterConfig {
    #[inline]
    pub fn retry(&self) -> Duration {
        Duration::from_millis(self.retry_ms)
    }

    #[inline]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
