//! Process-wide `tracing` subscriber setup.
//!
//! The library only emits events through `tracing`; installing a subscriber
//! is left to the embedding program, which can use [`init_logger`].

use crate::error::{Error, Result};
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(Error::logger(format!(
                "invalid log format: {} (expected: text|json)",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub format: LogFormat,
    /// Filter directive used when `RUST_LOG` is not set, e.g. `info` or
    /// `seqpool=debug`.
    pub level: String,
    pub with_targets: bool,
    pub with_thread_names: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            level: "info".to_string(),
            with_targets: true,
            with_thread_names: true,
        }
    }
}

/// Install a global fmt subscriber. Fails if one is already installed.
pub fn init_logger(cfg: &LoggerConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&cfg.level)
            .map_err(|e| Error::logger(format!("invalid log level {:?}: {}", cfg.level, e)))?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(cfg.with_targets)
        .with_thread_names(cfg.with_thread_names);

    let installed = match cfg.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    installed.map_err(|e| Error::logger(e.to_string()))
}
