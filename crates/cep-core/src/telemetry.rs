//! Logging and OpenTelemetry initialization.
//!
//! Installs a `tracing` subscriber with an `EnvFilter`, a fmt layer and,
//! when a collector endpoint is configured, a `tracing-opentelemetry` layer
//! exporting spans over OTLP/gRPC. The tracer provider lives in the returned
//! [`TelemetryGuard`] and is flushed exactly once by [`TelemetryGuard::shutdown`].

use opentelemetry::{global, trace::TracerProvider as _, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    propagation::TraceContextPropagator,
    trace::{Sampler, SdkTracerProvider},
    Resource,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::{Config, LogFormat};
use crate::error::TelemetryError;

/// Owns the process-wide tracer provider.
///
/// Request spans borrow the global provider; only this guard flushes it.
#[must_use = "dropping the guard without calling shutdown loses buffered spans"]
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl TelemetryGuard {
    /// Whether spans are exported to a collector
    pub fn is_exporting(&self) -> bool {
        self.provider.is_some()
    }

    /// Flush buffered spans and shut the exporter down.
    pub fn shutdown(mut self) -> Result<(), TelemetryError> {
        let Some(provider) = self.provider.take() else {
            tracing::debug!("Telemetry shutdown: no exporter configured");
            return Ok(());
        };

        if let Err(e) = provider.force_flush() {
            tracing::warn!(error = %e, "force_flush failed during telemetry shutdown");
        }

        provider
            .shutdown()
            .map_err(|e| TelemetryError::Shutdown(e.to_string()))
    }
}

fn build_resource(service_name: &str) -> Resource {
    Resource::builder_empty()
        .with_attributes([KeyValue::new("service.name", service_name.to_string())])
        .build()
}

fn build_provider(endpoint: &str, service_name: &str) -> Result<SdkTracerProvider, TelemetryError> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| TelemetryError::Exporter(e.to_string()))?;

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_sampler(Sampler::ParentBased(Box::new(Sampler::AlwaysOn)))
        .with_resource(build_resource(service_name))
        .build())
}

/// Initialize logging and tracing for a service.
///
/// The W3C trace-context propagator is always installed so incoming
/// `traceparent` headers are honoured even when nothing is exported.
/// Must be called from within a tokio runtime when an endpoint is configured.
pub fn init(config: &Config) -> Result<TelemetryGuard, TelemetryError> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    let provider = match &config.otel_exporter_otlp_endpoint {
        Some(endpoint) => Some(build_provider(endpoint, &config.otel_service_name)?),
        None => None,
    };

    let otel_layer = provider.as_ref().map(|p| {
        global::set_tracer_provider(p.clone());
        tracing_opentelemetry::layer().with_tracer(p.tracer(config.otel_service_name.clone()))
    });

    let fmt_layer = match config.log_format {
        LogFormat::Text => tracing_subscriber::fmt::layer().boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(otel_layer)
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| TelemetryError::Subscriber(e.to_string()))?;

    match &config.otel_exporter_otlp_endpoint {
        Some(endpoint) => tracing::info!(
            service = %config.otel_service_name,
            %endpoint,
            "OpenTelemetry exporter initialized"
        ),
        None => tracing::info!(
            service = %config.otel_service_name,
            "No OTLP endpoint configured, spans are logged only"
        ),
    }

    Ok(TelemetryGuard { provider })
}
