#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end tests for `GET /temperature` against mocked providers.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use cep_core::{Config, ServiceRole};
use cep_weather::ReqwestFetcher;
use opentelemetry::trace::TracerProvider as _;
use tower::ServiceExt;
use tracing_subscriber::layer::SubscriberExt;
use wiremock::matchers::{header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Providers {
    geocode: MockServer,
    weather: MockServer,
}

impl Providers {
    async fn start() -> Self {
        Self {
            geocode: MockServer::start().await,
            weather: MockServer::start().await,
        }
    }

    fn app(&self, api_key: Option<&str>) -> Router {
        self.app_with(api_key, &[])
    }

    fn app_with(&self, api_key: Option<&str>, extra: &[(&str, &str)]) -> Router {
        let mut env = config::Map::new();
        env.insert("GEOCODE_BASE_URL".to_string(), format!("{}/ws", self.geocode.uri()));
        env.insert(
            "WEATHER_BASE_URL".to_string(),
            format!("{}/v1/current.json", self.weather.uri()),
        );
        if let Some(key) = api_key {
            env.insert("APIKeyWeather".to_string(), key.to_string());
        }
        for (key, value) in extra {
            env.insert(key.to_string(), value.to_string());
        }

        let config = Config::from_sources(ServiceRole::Orchestrator, None, Some(env)).unwrap();
        let fetcher = ReqwestFetcher::new(config.request_timeout()).unwrap();
        let pipeline = cep_orchestration::build_pipeline(&config, Arc::new(fetcher));
        cep_orchestration::router(pipeline)
    }

    async fn city(&self, cep: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(format!("/ws/{cep}/json/")))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.geocode)
            .await;
    }

    async fn weather(&self, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path("/v1/current.json"))
            .respond_with(response)
            .mount(&self.weather)
            .await;
    }
}

async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_returns_temperatures_for_known_cep() {
    let providers = Providers::start().await;
    providers
        .city("01001000", serde_json::json!({ "cep": "01001-000", "localidade": "São Paulo" }))
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/current.json"))
        .and(query_param("key", "secret"))
        .and(query_param("q", "São Paulo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "current": { "temp_c": 25.5 }
        })))
        .expect(1)
        .mount(&providers.weather)
        .await;

    let (status, content_type, body) =
        get(providers.app(Some("secret")), "/temperature?cep=01001000").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    assert_eq!(
        body,
        r#"{"city":"São Paulo","temp_C":25.5,"temp_F":77.9,"temp_K":298.5}"#
    );
}

#[tokio::test]
async fn test_malformed_cep_makes_no_outbound_calls() {
    let providers = Providers::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&providers.geocode)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&providers.weather)
        .await;

    for uri in [
        "/temperature?cep=1234567",
        "/temperature?cep=01001-000",
        "/temperature?cep=0100100a",
        "/temperature?cep=",
        "/temperature",
    ] {
        let (status, _, body) = get(providers.app(Some("secret")), uri).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
        assert_eq!(body, "invalid zipcode");
    }
}

#[tokio::test]
async fn test_not_found_flag_returns_404() {
    let providers = Providers::start().await;
    providers.city("99999999", serde_json::json!({ "erro": "true" })).await;
    providers.weather(ResponseTemplate::new(200)).await;

    let (status, _, body) = get(providers.app(Some("secret")), "/temperature?cep=99999999").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "can not find zipcode");
    assert!(providers.weather.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_city_returns_404() {
    let providers = Providers::start().await;
    providers.city("01001000", serde_json::json!({ "localidade": "" })).await;

    let (status, _, body) = get(providers.app(Some("secret")), "/temperature?cep=01001000").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "can not find zipcode");
}

#[tokio::test]
async fn test_weather_rejection_returns_500() {
    let providers = Providers::start().await;
    providers.city("01001000", serde_json::json!({ "localidade": "São Paulo" })).await;
    providers
        .weather(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": { "code": 2006, "message": "API key is invalid." }
        })))
        .await;

    let (status, _, body) = get(providers.app(Some("wrong")), "/temperature?cep=01001000").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "error getting temperature");
}

#[tokio::test]
async fn test_missing_api_key_returns_500_without_calling_weather() {
    let providers = Providers::start().await;
    providers.city("01001000", serde_json::json!({ "localidade": "São Paulo" })).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&providers.weather)
        .await;

    let (status, _, body) = get(providers.app(None), "/temperature?cep=01001000").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "error getting temperature");
}

#[tokio::test]
async fn test_repeated_cep_uses_first_value() {
    let providers = Providers::start().await;
    providers.city("01001000", serde_json::json!({ "localidade": "São Paulo" })).await;
    providers
        .weather(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "current": { "temp_c": 25.5 }
        })))
        .await;

    let (status, _, body) = get(
        providers.app(Some("secret")),
        "/temperature?cep=01001000&cep=99999999",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        r#"{"city":"São Paulo","temp_C":25.5,"temp_F":77.9,"temp_K":298.5}"#
    );

    let (status, _, body) =
        get(providers.app(Some("secret")), "/temperature?cep=123&cep=01001000").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body, "invalid zipcode");
}

#[tokio::test]
async fn test_slow_weather_provider_returns_500() {
    let providers = Providers::start().await;
    providers.city("01001000", serde_json::json!({ "localidade": "São Paulo" })).await;
    providers
        .weather(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "current": { "temp_c": 25.5 } }))
                .set_delay(Duration::from_secs(3)),
        )
        .await;

    let app = providers.app_with(Some("secret"), &[("REQUEST_TIMEOUT_SECS", "1")]);
    let (status, _, body) = get(app, "/temperature?cep=01001000").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "error getting temperature");
}

#[tokio::test]
async fn test_slow_geocode_provider_returns_404() {
    let providers = Providers::start().await;
    Mock::given(method("GET"))
        .and(path("/ws/01001000/json/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "localidade": "São Paulo" }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&providers.geocode)
        .await;

    let app = providers.app_with(Some("secret"), &[("REQUEST_TIMEOUT_SECS", "1")]);
    let (status, _, body) = get(app, "/temperature?cep=01001000").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "can not find zipcode");
}

#[tokio::test]
async fn test_incoming_trace_is_continued_upstream() {
    opentelemetry::global::set_text_map_propagator(
        opentelemetry_sdk::propagation::TraceContextPropagator::new(),
    );
    let provider = opentelemetry_sdk::trace::SdkTracerProvider::builder().build();
    let subscriber = tracing_subscriber::registry()
        .with(tracing_opentelemetry::layer().with_tracer(provider.tracer("orchestration-test")));
    let _guard = tracing::subscriber::set_default(subscriber);

    let providers = Providers::start().await;
    Mock::given(method("GET"))
        .and(path("/ws/01001000/json/"))
        .and(header_exists("traceparent"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "localidade": "Recife" })),
        )
        .expect(1)
        .mount(&providers.geocode)
        .await;
    providers
        .weather(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "current": { "temp_c": 30.0 }
        })))
        .await;

    let request = Request::builder()
        .method("GET")
        .uri("/temperature?cep=01001000")
        .header("traceparent", "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01")
        .body(Body::empty())
        .unwrap();

    let response = providers.app(Some("secret")).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let requests = providers.geocode.received_requests().await.unwrap();
    let traceparent = requests[0].headers.get("traceparent").unwrap().to_str().unwrap();
    assert_eq!(
        cep_core::propagation::parse_trace_id(traceparent),
        Some("4bf92f3577b34da6a3ce929d0e0e4736")
    );
}
