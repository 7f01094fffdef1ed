use std::io::IsTerminal;

use crate::logger::{error::LoggerError, format::LoggerFormat};

/// Log filter variable, in `EnvFilter` syntax (`info`, `tally_core=debug,info`, ...).
pub const ENV_LEVEL: &str = "TALLY_LOG";
/// Output format variable: `text`, `json` or `journald`.
pub const ENV_FORMAT: &str = "TALLY_LOG_FORMAT";

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    pub level: String,
    pub with_targets: bool,
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::Text,
            level: "info".to_string(),
            with_targets: true,
            use_color: std::io::stdout().is_terminal(),
        }
    }
}

impl LoggerConfig {
    /// Defaults overridden by `TALLY_LOG` and `TALLY_LOG_FORMAT`.
    pub fn from_env() -> Result<Self, LoggerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LoggerError> {
        let mut cfg = Self::default();
        if let Some(level) = lookup(ENV_LEVEL).filter(|v| !v.trim().is_empty()) {
            cfg.level = level.trim().to_string();
        }
        if let Some(format) = lookup(ENV_FORMAT).filter(|v| !v.trim().is_empty()) {
            cfg.format = format.parse()?;
        }
        if cfg.format != LoggerFormat::Text {
            cfg.use_color = false;
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_environment_keeps_defaults() {
        let cfg = LoggerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(cfg.format, LoggerFormat::Text);
        assert_eq!(cfg.level, "info");
    }

    #[test]
    fn json_format_disables_color() {
        let cfg = LoggerConfig::from_lookup(|key| match key {
            ENV_FORMAT => Some("json".into()),
            ENV_LEVEL => Some("tally_core=debug,warn".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(cfg.format, LoggerFormat::Json);
        assert_eq!(cfg.level, "tally_core=debug,warn");
        assert!(!cfg.use_color);
    }

    #[test]
    fn bad_format_is_reported() {
        let err = LoggerConfig::from_lookup(|key| (key == ENV_FORMAT).then(|| "xml".into()))
            .unwrap_err();
        assert_eq!(err, LoggerError::InvalidFormat("xml".into()));
    }
}
