//! Client for the orchestrator's `GET /temperature`.

use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use cep_core::propagation::inject_current_span;
use cep_weather::PostalCode;

use crate::error::GatewayError;

/// Orchestrator answer, relayed to the caller unchanged
#[derive(Debug)]
pub struct Forwarded {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

#[derive(Debug, Clone)]
pub struct OrchestratorClient {
    client: reqwest::Client,
    base_url: String,
}

impl OrchestratorClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn temperature_url(&self) -> String {
        format!("{}/temperature", self.base_url)
    }

    /// Ask the orchestrator for the temperature at `code`.
    ///
    /// The current span's trace context travels in the `traceparent` header.
    /// Any non-transport outcome, error statuses included, is returned as-is.
    pub async fn temperature(&self, code: &PostalCode) -> Result<Forwarded, GatewayError> {
        let mut headers = HeaderMap::new();
        inject_current_span(&mut headers);

        let response = self
            .client
            .get(self.temperature_url())
            .query(&[("cep", code.as_str())])
            .headers(headers)
            .send()
            .await?;

        let status = response.status();
        let content_type = response.headers().get(reqwest::header::CONTENT_TYPE).cloned();
        let body = response.bytes().await?;

        Ok(Forwarded {
            status,
            content_type,
            body,
        })
    }
}
