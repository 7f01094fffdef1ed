use std::{net::SocketAddr, str::FromStr, time::Duration};

use tally_model::TimeoutMs;

use crate::error::ConfigError;

/// What the dispatch loop does when every agent rejects the head of the queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueuePolicy {
    /// Keep the head in place and retry it next tick. Tasks behind it wait.
    #[default]
    StrictFifo,
    /// Move the rejected head to the back so later tasks get a turn.
    SkipAhead,
}

impl FromStr for QueuePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict-fifo" | "fifo" => Ok(QueuePolicy::StrictFifo),
            "skip-ahead" | "skip" => Ok(QueuePolicy::SkipAhead),
            _ => Err(ConfigError::InvalidValue {
                key: "queue policy",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Address the control surface binds to.
    pub listen: SocketAddr,
    /// Dispatch loop period (default: 1 second).
    pub dispatch_interval_ms: TimeoutMs,
    /// Completion poller period (default: 1 second).
    pub poll_interval_ms: TimeoutMs,
    /// Deadline for every call to an agent (default: 2 seconds).
    pub request_timeout_ms: TimeoutMs,
    pub queue_policy: QueuePolicy,
    /// Check an agent's liveness endpoint before offering it a task.
    pub probe_agents: bool,
    /// Ceiling on pending + in-progress tasks; `None` means unlimited.
    pub max_active_tasks: Option<usize>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 8080)),
            dispatch_interval_ms: 1_000,
            poll_interval_ms: 1_000,
            request_timeout_ms: 2_000,
            queue_policy: QueuePolicy::StrictFifo,
            probe_agents: true,
            max_active_tasks: None,
        }
    }
}

impl OrchestratorConfig {
    /// Defaults overridden by `TALLY_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        if let Some(v) = env_parse("TALLY_LISTEN")? {
            cfg.listen = v;
        }
        if let Some(v) = env_parse("TALLY_DISPATCH_INTERVAL_MS")? {
            cfg.dispatch_interval_ms = v;
        }
        if let Some(v) = env_parse("TALLY_POLL_INTERVAL_MS")? {
            cfg.poll_interval_ms = v;
        }
        if let Some(v) = env_parse("TALLY_REQUEST_TIMEOUT_MS")? {
            cfg.request_timeout_ms = v;
        }
        if let Some(v) = env_parse("TALLY_QUEUE_POLICY")? {
            cfg.queue_policy = v;
        }
        if let Some(v) = env_parse("TALLY_PROBE_AGENTS")? {
            cfg.probe_agents = v;
        }
        if let Some(v) = env_parse::<usize>("TALLY_MAX_ACTIVE_TASKS")? {
            cfg.max_active_tasks = (v > 0).then_some(v);
        }
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dispatch_interval_ms == 0 {
            return Err(ConfigError::Zero("dispatch_interval_ms"));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Zero("poll_interval_ms"));
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Zero("request_timeout_ms"));
        }
        Ok(())
    }

    #[inline]
    pub fn dispatch_interval(&self) -> Duration {
        Duration::from_millis(self.dispatch_interval_ms)
    }

    #[inline]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[inline]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Read and parse an environment variable; unset or empty means `None`.
pub fn env_parse<T>(key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        _ => Ok(None),
    }
}
