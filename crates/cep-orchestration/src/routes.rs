use std::sync::Arc;

use axum::body::Body;
use axum::extract::{RawQuery, State};
use axum::routing::get;
use axum::{Json, Router};
use cep_core::propagation::server_span;
use cep_weather::{TemperatureReport, TracedSpan};
use tower_http::trace::TraceLayer;
use tracing::Instrument;

use crate::error::PipelineError;
use crate::pipeline::TemperaturePipeline;
use crate::spans;

/// Build the orchestrator router.
///
/// Requests are bounded by the outbound client timeout of each stage, so a
/// slow provider surfaces as that stage's error class. A client disconnect
/// drops the handler and with it any call in flight.
pub fn router(pipeline: TemperaturePipeline) -> Router {
    Router::new()
        .route("/temperature", get(get_temperature))
        .with_state(Arc::new(pipeline))
        .layer(TraceLayer::new_for_http().make_span_with(server_span::<Body>))
}

/// First `cep` value of the query string, empty when absent.
///
/// Repeated or undecodable parameters never reject the request; whatever is
/// found goes through validation like any other input.
fn first_cep(query: Option<&str>) -> String {
    query
        .and_then(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .find(|(key, _)| key == "cep")
                .map(|(_, value)| value.into_owned())
        })
        .unwrap_or_default()
}

async fn get_temperature(
    State(pipeline): State<Arc<TemperaturePipeline>>,
    RawQuery(query): RawQuery,
) -> Result<Json<TemperatureReport>, PipelineError> {
    let cep = first_cep(query.as_deref());

    let span = spans::request_span();
    let recorder = TracedSpan::new(span.clone());
    let report = pipeline.run(&cep, &recorder).instrument(span).await?;

    Ok(Json(report))
}
