pub mod error;
pub use error::{ConfigError, CoreError, TransportError};

pub mod config;
pub use config::{OrchestratorConfig, QueuePolicy};

pub mod store;
pub use store::TaskStore;

pub mod registry;
pub use registry::AgentRegistry;

pub mod transport;
pub use transport::{AgentTransport, Collection, Placement};

pub mod metrics;
pub use metrics::{DispatchMetrics, NoopMetrics};

pub mod dispatch;
pub use dispatch::{DispatchOutcome, Dispatcher};

pub mod poller;
pub use poller::{CompletionPoller, PollReport};

pub mod supervisor;
pub use supervisor::{Restart, SupervisorApi, TaskPolicy};

pub mod tasks;
pub use tasks::{dispatch_loop, poll_loop};

#[cfg(test)]
mod testing;

mod system;
pub use system::{hostname, init_uptime, platform, uptime_seconds};
