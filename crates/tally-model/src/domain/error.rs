use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid id: '{0}'")]
    InvalidId(String),

    #[error("invalid status: '{0}' (valid: pending, in_progress, finished, error)")]
    InvalidStatus(String),

    #[error("invalid agent address: '{0}' (expected http://host:port)")]
    InvalidAddress(String),
}
