use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoggerError {
    #[error("invalid logger format: {0} (expected: text|json|journald)")]
    InvalidFormat(String),
    #[error("journald is not supported on this platform or the feature is disabled")]
    JournaldNotSupported,
    #[error("logger has been already initialized")]
    AlreadyInitialized,
    #[error("failed to initialize logger: {0}")]
    InitializationFailed(String),
    #[error("invalid log filter: {0}")]
    InvalidLogLevel(String),
}
