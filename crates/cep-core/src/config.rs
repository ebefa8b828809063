use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

/// Environment variable that overrides the config file location
pub const CONFIG_PATH_ENV: &str = "CEP_CONFIG";

/// Config file looked up in the working directory when `CEP_CONFIG` is unset
pub const DEFAULT_CONFIG_FILE: &str = "cep.toml";

const DEFAULT_GEOCODE_BASE_URL: &str = "https://viacep.com.br/ws";
const DEFAULT_WEATHER_BASE_URL: &str = "https://api.weatherapi.com/v1/current.json";
const DEFAULT_REQUEST_TIMEOUT_SECS: i64 = 10;

/// Which binary is loading the configuration.
///
/// Both services read the same keys; the role decides defaults and which
/// settings are mandatory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceRole {
    Gateway,
    Orchestrator,
}

impl ServiceRole {
    pub fn default_port(self) -> u16 {
        match self {
            ServiceRole::Gateway => 8080,
            ServiceRole::Orchestrator => 8081,
        }
    }

    pub fn service_name(self) -> &'static str {
        match self {
            ServiceRole::Gateway => "service-input",
            ServiceRole::Orchestrator => "service-orchestration",
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a single line summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Settings for both services, read once at process start.
///
/// Keys are the lowercased environment variable names so the same struct can
/// be fed from `cep.toml` or from the environment.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Listening port
    pub port: u16,

    /// Base URL of the orchestrator, used by the gateway (`SERVICE_B_URL`)
    #[serde(default, rename = "service_b_url")]
    pub orchestrator_url: Option<String>,

    /// Weather provider credential (`WEATHER_API_KEY`)
    #[serde(default)]
    pub weather_api_key: Option<String>,

    /// Legacy `APIKeyWeather` spelling, used only when `WEATHER_API_KEY` is blank
    #[serde(default, rename = "apikeyweather")]
    legacy_weather_api_key: Option<String>,

    /// Geocode provider base, the postal code is appended as a path segment
    pub geocode_base_url: String,

    /// Weather provider current-conditions endpoint
    pub weather_base_url: String,

    /// OTLP gRPC collector endpoint; export is disabled when unset
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,

    /// `service.name` resource attribute
    pub otel_service_name: String,

    /// Timeout applied to each outbound call
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from defaults, the optional config file and the
    /// process environment (in increasing order of precedence).
    ///
    /// A `.env` file in the working directory is loaded into the environment
    /// first when present.
    pub fn load(role: ServiceRole) -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!("Failed to read .env file: {}", e);
            }
        }

        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::from_sources(role, Some(Path::new(&path)), None)
    }

    /// Validate for the given role, logging warnings.
    ///
    /// Any validation error is returned as `ConfigError::Invalid`.
    pub fn ensure_valid(&self, role: ServiceRole) -> Result<(), ConfigError> {
        let validation = self.validate(role);

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()));
        }

        Ok(())
    }

    /// Build configuration from explicit sources.
    ///
    /// `env` replaces the process environment when given, which keeps tests
    /// independent of the host.
    pub fn from_sources(
        role: ServiceRole,
        file: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("port", i64::from(role.default_port()))?
            .set_default("geocode_base_url", DEFAULT_GEOCODE_BASE_URL)?
            .set_default("weather_base_url", DEFAULT_WEATHER_BASE_URL)?
            .set_default("otel_service_name", role.service_name())?
            .set_default("request_timeout_secs", DEFAULT_REQUEST_TIMEOUT_SECS)?;

        if let Some(path) = file {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(false),
            );
        }

        let config = builder
            .add_source(
                config::Environment::default()
                    .ignore_empty(true)
                    .source(env),
            )
            .build()?
            .try_deserialize::<Config>()?;

        Ok(config)
    }

    /// Weather credential, treating an empty value as absent.
    ///
    /// `WEATHER_API_KEY` wins over `APIKeyWeather` when both are set.
    pub fn weather_api_key(&self) -> Option<&str> {
        [&self.weather_api_key, &self.legacy_weather_api_key]
            .into_iter()
            .filter_map(|k| k.as_deref())
            .find(|k| !k.trim().is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate the configuration for the given role
    pub fn validate(&self, role: ServiceRole) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.port == 0 {
            result.add_error("port", "Port cannot be 0");
        }

        if self.request_timeout_secs == 0 {
            result.add_error("request_timeout_secs", "Timeout must be greater than 0");
        } else if self.request_timeout_secs > 300 {
            result.add_warning(
                "request_timeout_secs",
                "Timeout is unusually large (>300 seconds)",
            );
        }

        match role {
            ServiceRole::Gateway => match &self.orchestrator_url {
                Some(url) => self.validate_url(url, "service_b_url", &mut result),
                None => result.add_error("service_b_url", "Orchestrator URL is not set"),
            },
            ServiceRole::Orchestrator => {
                self.validate_url(&self.geocode_base_url, "geocode_base_url", &mut result);
                self.validate_url(&self.weather_base_url, "weather_base_url", &mut result);

                // Reported per request as a weather failure, not a startup error
                if self.weather_api_key().is_none() {
                    result.add_warning(
                        "weather_api_key",
                        "Weather API key not configured - temperature lookups will fail",
                    );
                }
            }
        }

        if let Some(endpoint) = &self.otel_exporter_otlp_endpoint {
            self.validate_url(endpoint, "otel_exporter_otlp_endpoint", &mut result);
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }
}
