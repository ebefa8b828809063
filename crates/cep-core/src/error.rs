//! Process-level error types shared by the gateway and orchestrator binaries.
//!
//! Request-scoped failures (geocode, weather, pipeline) live next to the code
//! that produces them. This module covers what can go wrong while a service
//! starts up or shuts down:
//! - Loading and validating configuration
//! - Building or flushing the OpenTelemetry exporter
//! - Binding the listening socket

use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get an operator-facing summary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a short message suitable for a start-up failure banner.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Config(e) => e.user_message(),
            AppError::Telemetry(e) => e.user_message(),
            AppError::Io(_) => "A socket or file operation failed.",
            AppError::Other(_) => "An unexpected error occurred.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Load(_) => "Configuration could not be read. Check the environment.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::MissingSetting(_) => "A required setting is missing. Check your settings.",
        }
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(e: config::ConfigError) -> Self {
        ConfigError::Load(e.to_string())
    }
}

/// Telemetry pipeline errors.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Failed to build span exporter: {0}")]
    Exporter(String),

    #[error("Failed to install subscriber: {0}")]
    Subscriber(String),

    #[error("Failed to flush tracer provider: {0}")]
    Shutdown(String),
}

impl TelemetryError {
    pub fn user_message(&self) -> &'static str {
        match self {
            TelemetryError::Exporter(_) => "Trace exporter could not be created. Check the collector endpoint.",
            TelemetryError::Subscriber(_) => "Logging could not be initialized.",
            TelemetryError::Shutdown(_) => "Some traces may not have been exported.",
        }
    }
}
