pub mod config;
pub mod error;
pub mod propagation;
pub mod server;
pub mod signals;
pub mod telemetry;

pub use config::{Config, LogFormat, ServiceRole, ValidationResult};
pub use error::{AppError, ConfigError, TelemetryError};
pub use telemetry::TelemetryGuard;

/// Load validated configuration and initialize telemetry for a service.
///
/// Returns the configuration together with the guard that must be shut down
/// when the service stops.
pub fn init(role: ServiceRole) -> Result<(Config, TelemetryGuard), AppError> {
    let config = Config::load(role)?;
    let guard = telemetry::init(&config)?;
    config.ensure_valid(role)?;

    tracing::info!("{} core initialized", config.otel_service_name);
    Ok((config, guard))
}
