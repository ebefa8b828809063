use std::sync::Arc;

use anyhow::{Context, Result};
use cep_core::ServiceRole;
use cep_weather::ReqwestFetcher;

#[tokio::main]
async fn main() -> Result<()> {
    let (config, telemetry) = cep_core::init(ServiceRole::Orchestrator)?;

    let fetcher = ReqwestFetcher::new(config.request_timeout())
        .context("Failed to build outbound HTTP client")?;
    let pipeline = cep_orchestration::build_pipeline(&config, Arc::new(fetcher));
    let app = cep_orchestration::router(pipeline);

    tracing::info!(port = config.port, "Orchestration service starting");

    let served = cep_core::server::serve(app, config.port, cep_core::server::shutdown_token()).await;

    // Flush spans even when the server failed
    if let Err(e) = telemetry.shutdown() {
        tracing::warn!("Telemetry shutdown failed: {}", e);
    }

    served
}
