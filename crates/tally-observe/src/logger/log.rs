use time::{UtcOffset, format_description::well_known::Rfc3339};
use tracing::Subscriber;
use tracing_subscriber::{
    EnvFilter, fmt, fmt::time::OffsetTime, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::logger::{config::LoggerConfig, error::LoggerError};

pub struct Logger;

impl Logger {
    pub fn text(cfg: &LoggerConfig) -> Result<(), LoggerError> {
        let layer = fmt::layer()
            .with_ansi(cfg.use_color)
            .with_target(cfg.with_targets)
            .with_timer(mk_timer());

        init_with(tracing_subscriber::registry().with(mk_filter(&cfg.level)?).with(layer))
    }

    pub fn json(cfg: &LoggerConfig) -> Result<(), LoggerError> {
        let layer = fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .with_ansi(false)
            .with_target(cfg.with_targets)
            .with_timer(mk_timer());

        init_with(tracing_subscriber::registry().with(mk_filter(&cfg.level)?).with(layer))
    }

    pub fn journald(cfg: &LoggerConfig) -> Result<(), LoggerError> {
        mk_journald(mk_filter(&cfg.level)?)
    }
}

pub(crate) fn mk_filter(level: &str) -> Result<EnvFilter, LoggerError> {
    EnvFilter::try_new(level).map_err(|_| LoggerError::InvalidLogLevel(level.to_string()))
}

fn mk_timer() -> OffsetTime<Rfc3339> {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetTime::new(offset, Rfc3339)
}

fn init_with<S>(subscriber: S) -> Result<(), LoggerError>
where
    S: Subscriber + Send + Sync + 'static,
{
    subscriber.try_init().map_err(|e| {
        let s = e.to_string();
        if s.contains("SetGlobalDefaultError") || s.contains("global default") {
            LoggerError::AlreadyInitialized
        } else {
            LoggerError::InitializationFailed(s)
        }
    })
}

#[cfg(all(target_os = "linux", feature = "journald"))]
fn mk_journald(filter: EnvFilter) -> Result<(), LoggerError> {
    let journald = tracing_journald::layer()
        .map_err(|e| LoggerError::InitializationFailed(format!("journald: {e}")))?;
    init_with(tracing_subscriber::registry().with(filter).with(journald))
}

#[cfg(not(all(target_os = "linux", feature = "journald")))]
fn mk_journald(_filter: EnvFilter) -> Result<(), LoggerError> {
    Err(LoggerError::JournaldNotSupported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LoggerFormat, logger_init};

    #[test]
    fn filter_syntax_is_checked() {
        assert!(mk_filter("info").is_ok());
        assert!(mk_filter("tally_core=debug,warn").is_ok());
        assert_eq!(
            mk_filter("tally_core=loud").unwrap_err(),
            LoggerError::InvalidLogLevel("tally_core=loud".into())
        );
    }

    #[test]
    fn second_init_is_rejected() {
        let cfg = LoggerConfig {
            format: LoggerFormat::Json,
            use_color: false,
            ..LoggerConfig::default()
        };
        let first = logger_init(&cfg);
        let second = logger_init(&cfg);
        assert!(first.is_ok() || first == Err(LoggerError::AlreadyInitialized));
        assert!(second.is_err());
    }
}
