//! Logging setup for the CLI
//!
//! Logs go to stderr so that status output on stdout stays clean.

use std::io;
use tracing_subscriber::{fmt::Layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration for the CLI
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "warn")
    pub level: String,
    /// Enable JSON structured logging (vs plain text)
    pub json_format: bool,
    /// Environment filter (supports complex filters like "mongrate=debug,mongodb=warn")
    pub env_filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json_format: false,
            env_filter: None,
        }
    }
}

impl LoggingConfig {
    pub fn with_level<S: Into<String>>(mut self, level: S) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_json(mut self, json_format: bool) -> Self {
        self.json_format = json_format;
        self
    }

    /// Set environment filter
    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Directive used when `RUST_LOG` is not set
    pub fn directive(&self) -> String {
        match &self.env_filter {
            Some(filter) => filter.clone(),
            None => format!("mongrate={0},mongrate_cli={0},warn", self.level),
        }
    }
}

/// Initialize logging for the process
pub fn init_logging(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(config.directive()))?;

    if config.json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(Layer::new().with_writer(io::stderr).json())
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(Layer::new().with_writer(io::stderr).with_target(false))
            .try_init()?;
    }

    tracing::debug!(
        level = %config.level,
        json = config.json_format,
        "Logging initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_from_level() {
        let config = LoggingConfig::default().with_level("debug");
        assert_eq!(config.directive(), "mongrate=debug,mongrate_cli=debug,warn");
    }

    #[test]
    fn test_env_filter_wins_over_level() {
        let config = LoggingConfig::default()
            .with_level("info")
            .with_json(true)
            .with_env_filter("mongodb=debug");
        assert_eq!(config.directive(), "mongodb=debug");
        assert!(config.json_format);
    }
}
