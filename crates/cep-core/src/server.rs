//! HTTP server lifecycle shared by both services.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::Router;
use tokio_util::sync::CancellationToken;

/// Bind `0.0.0.0:<port>` and serve `router` until `cancel` fires.
///
/// In-flight requests are allowed to finish after cancellation.
pub async fn serve(router: Router, port: u16, cancel: CancellationToken) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("HTTP server bound on {}", addr);

    let shutdown = async move {
        cancel.cancelled().await;
        tracing::info!("HTTP server shutting down gracefully");
    };

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")
}

/// Spawn a task that cancels the returned token on Ctrl+C or SIGTERM.
pub fn shutdown_token() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = crate::signals::wait_for_shutdown().await {
            tracing::error!("Signal handling failed: {}", e);
        }
        trigger.cancel();
    });
    cancel
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;

    #[tokio::test]
    async fn test_serve_stops_on_cancel() {
        let router = Router::new().route("/", get(|| async { "ok" }));
        let cancel = CancellationToken::new();
        cancel.cancel();

        // Port 0 lets the OS pick a free port
        let result = serve(router, 0, cancel).await;
        assert!(result.is_ok());
    }
}
