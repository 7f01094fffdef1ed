use std::{net::SocketAddr, time::Duration};

use tally_core::{ConfigError, config::env_parse};
use tally_model::TimeoutMs;

/// Agent process settings.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Address the agent's HTTP surface binds to.
    pub listen: SocketAddr,
    /// Base URL the orchestrator uses to reach this agent.
    pub advertise_address: String,
    /// Base URL of the orchestrator.
    pub orchestrator_endpoint: String,
    /// Tasks held at once, running or awaiting collection (default: 2).
    pub max_concurrent_tasks: usize,
    /// Artificial delay before each evaluation (default: none).
    pub solve_delay_ms: TimeoutMs,
    /// Pause between failed registration attempts.
    pub register_retry_ms: TimeoutMs,
    pub request_timeout_ms: TimeoutMs,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 8081)),
            advertise_address: "http://127.0.0.1:8081".to_string(),
            orchestrator_endpoint: "http://127.0.0.1:8080".to_string(),
            max_concurrent_tasks: 2,
            solve_delay_ms: 0,
            register_retry_ms: 2_000,
            request_timeout_ms: 2_000,
        }
    }
}

impl AgentConfig {
    /// Defaults overridden by `TALLY_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        if let Some(v) = env_parse("TALLY_AGENT_LISTEN")? {
            cfg.listen = v;
        }
        if let Some(v) = env_parse("TALLY_AGENT_ADDRESS")? {
            cfg.advertise_address = v;
        }
        if let Some(v) = env_parse("TALLY_ORCHESTRATOR")? {
            cfg.orchestrator_endpoint = v;
        }
        if let Some(v) = env_parse("TALLY_MAX_TASKS")? {
            cfg.max_concurrent_tasks = v;
        }
        if let Some(v) = env_parse("TALLY_SOLVE_DELAY_MS")? {
            cfg.solve_delay_ms = v;
        }
        if let Some(v) = env_parse("TALLY_REGISTER_RETRY_MS")? {
            cfg.register_retry_ms = v;
        }
        if let Some(v) = env_parse("TALLY_REQUEST_TIMEOUT_MS")? {
            cfg.request_timeout_ms = v;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent_tasks == 0 {
            return Err(ConfigError::Zero("max_concurrent_tasks"));
        }
        if self.register_retry_ms == 0 {
            return Err(ConfigError::Zero("register_retry_ms"));
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Zero("request_timeout_ms"));
        }
        for (key, url) in [
            ("advertise_address", &self.advertise_address),
            ("orchestrator_endpoint", &self.orchestrator_endpoint),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidValue {
                    key,
                    value: url.clone(),
                });
            }
        }
        Ok(())
    }

    #[inline]
    pub fn solve_delay(&self) -> Duration {
        Duration::from_millis(self.solve_delay_ms)
    }

    #[inline]
    pub fn register_retry(&self) -> Duration {
        Duration::from_millis(self.register_retry_ms)
    }

    #[inline]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
