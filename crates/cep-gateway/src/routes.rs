use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use cep_core::propagation::server_span;
use cep_weather::{strip_formatting, PostalCode, StageSpan, TracedSpan};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::field::Empty;
use tracing::Instrument;

use crate::error::GatewayError;
use crate::forward::OrchestratorClient;

#[derive(Debug, Deserialize)]
struct CepRequest {
    #[serde(default)]
    cep: String,
}

/// Build the gateway router.
///
/// `POST /temperature` is kept as an alias of `POST /` for existing clients.
/// A slow orchestrator is bounded by the forwarding client's timeout and
/// answers 500 like any other forwarding failure.
pub fn router(client: OrchestratorClient) -> Router {
    Router::new()
        .route("/", post(post_temperature))
        .route("/temperature", post(post_temperature))
        .with_state(Arc::new(client))
        .layer(TraceLayer::new_for_http().make_span_with(server_span::<Body>))
}

fn validate_span() -> TracedSpan {
    TracedSpan::new(tracing::info_span!(
        "validate-cep",
        cep = Empty,
        error = Empty,
        otel.status_code = Empty,
        otel.status_message = Empty,
    ))
}

fn forward_span() -> TracedSpan {
    TracedSpan::new(tracing::info_span!(
        "call-service-b",
        otel.kind = "client",
        service.b.url = Empty,
        clean_cep = Empty,
        http.status_code = Empty,
        error = Empty,
        otel.status_code = Empty,
        otel.status_message = Empty,
    ))
}

/// Parse `{"cep": string}` and validate the code after stripping `-` and ` `.
fn read_postal_code(body: &[u8], span: &dyn StageSpan) -> Result<PostalCode, GatewayError> {
    let request: CepRequest = match serde_json::from_slice(body) {
        Ok(r) => r,
        Err(e) => {
            span.set_str("error", "invalid json");
            span.fail(&e, "invalid zipcode");
            return Err(GatewayError::InvalidPostalCode);
        }
    };
    span.set_str("cep", &request.cep);

    match PostalCode::parse(&strip_formatting(&request.cep)) {
        Ok(code) => {
            span.succeed("valid zipcode");
            Ok(code)
        }
        Err(e) => {
            span.set_str("error", "invalid cep format");
            span.fail(&e, "invalid zipcode");
            Err(GatewayError::InvalidPostalCode)
        }
    }
}

async fn post_temperature(
    State(client): State<Arc<OrchestratorClient>>,
    body: Bytes,
) -> Result<Response, GatewayError> {
    let code = read_postal_code(&body, &validate_span())?;

    let span = forward_span();
    span.set_str("service.b.url", &client.temperature_url());
    span.set_str("clean_cep", code.as_str());

    let forwarded = match client.temperature(&code).instrument(span.span().clone()).await {
        Ok(f) => f,
        Err(e) => {
            span.set_str("error", "service b call failed");
            span.fail(&e, "internal server error");
            return Err(e);
        }
    };

    span.set_i64("http.status_code", i64::from(forwarded.status.as_u16()));
    span.succeed("orchestrator responded");

    let mut response = (forwarded.status, forwarded.body).into_response();
    match forwarded.content_type {
        Some(content_type) => {
            response.headers_mut().insert(header::CONTENT_TYPE, content_type);
        }
        None => {
            response.headers_mut().remove(header::CONTENT_TYPE);
        }
    }

    Ok(response)
}
