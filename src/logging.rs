//! Structured logging via `tracing`.
//!
//! Level and format come from the configuration file and can be overridden
//! by the `INOFS_LOG` environment variable or CLI flags. Log output goes to
//! stderr so the interactive prompt on stdout stays clean.

use crate::error::FsError;
use serde::{Deserialize, Serialize};
use std::io;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry,
};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Whether logging is enabled (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_level")]
    pub level: String,

    /// Output format: json, text (default: text)
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_true() -> bool {
    true
}

fn default_level() -> String {
    "warn".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            level: default_level(),
            format: default_format(),
        }
    }
}

/// Initialize the logging system.
///
/// Priority order for the filter directive: `INOFS_LOG` environment
/// variable, then the configured level.
pub fn init_logging(config: &LoggingConfig) -> Result<(), FsError> {
    if !config.enabled {
        Registry::default()
            .with(EnvFilter::new("off"))
            .with(fmt::layer().with_writer(io::sink))
            .init();
        return Ok(());
    }

    let directive = std::env::var("INOFS_LOG")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| config.level.clone());
    let filter = EnvFilter::try_new(&directive)
        .map_err(|e| FsError::Config(format!("invalid log level '{directive}': {e}")))?;

    match config.format.as_str() {
        "json" => Registry::default()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(io::stderr),
            )
            .init(),
        "text" => Registry::default()
            .with(filter)
            .with(fmt::layer().with_writer(io::stderr))
            .init(),
        other => {
            return Err(FsError::Config(format!("unknown log format '{other}'")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_quiet_text_logging() {
        let config = LoggingConfig::default();
        assert!(config.enabled);
        assert_eq!(config.level, "warn");
        assert_eq!(config.format, "text");
    }

    #[test]
    fn unknown_format_is_rejected_before_subscriber_install() {
        let config = LoggingConfig {
            enabled: true,
            level: "info".to_string(),
            format: "xml".to_string(),
        };
        let err = init_logging(&config).unwrap_err();
        assert!(matches!(err, FsError::Config(_)));
    }
}
