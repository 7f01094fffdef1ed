mod error;
pub use error::ApiError;

mod handler;
pub use handler::ApiHandler;

mod adapter;
pub use adapter::OrchestratorAdapter;

mod validate;
pub use validate::{MAX_EXPRESSION_LEN, validate_expression};

#[cfg(feature = "http")]
mod http;

#[cfg(feature = "http")]
pub use http::HttpApi;

#[cfg(feature = "http")]
mod agent;

#[cfg(feature = "http")]
pub use agent::AgentHttpApi;

#[cfg(feature = "http")]
pub use axum;
