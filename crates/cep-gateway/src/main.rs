use anyhow::{Context, Result};
use cep_core::ServiceRole;
use cep_gateway::OrchestratorClient;

#[tokio::main]
async fn main() -> Result<()> {
    let (config, telemetry) = cep_core::init(ServiceRole::Gateway)?;

    let orchestrator_url = config
        .orchestrator_url
        .clone()
        .context("SERVICE_B_URL environment variable not set")?;
    let client = OrchestratorClient::new(orchestrator_url, config.request_timeout())
        .context("Failed to build orchestrator client")?;
    let app = cep_gateway::router(client);

    tracing::info!(port = config.port, "Gateway service starting");

    let served = cep_core::server::serve(app, config.port, cep_core::server::shutdown_token()).await;

    // Flush spans even when the server failed
    if let Err(e) = telemetry.shutdown() {
        tracing::warn!("Telemetry shutdown failed: {}", e);
    }

    served
}
