mod ids;
pub use ids::{AgentId, TaskId};

mod task_status;
pub use task_status::TaskStatus;

mod task;
pub use task::Task;

mod agent;
pub use agent::Agent;

mod report;
pub use report::{AgentLoad, Liveness, TaskDuration};

mod request;
pub use request::{RegisterAgent, SubmitExpression};

mod error;
pub use error::ModelError;

pub mod time_serde;

/// Timeout value in milliseconds.
///
/// Used by configuration for loop periods and network call deadlines.
pub type TimeoutMs = u64;
