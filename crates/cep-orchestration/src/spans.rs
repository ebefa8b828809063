//! Span constructors for the request and each pipeline stage.
//!
//! `tracing` only records fields declared at creation, so every attribute a
//! stage may set is declared here as `Empty`.

use tracing::field::Empty;
use tracing::Span;

pub fn request_span() -> Span {
    tracing::info_span!(
        "temperature-handler",
        cep = Empty,
        valid_cep = Empty,
        response_city = Empty,
        otel.status_code = Empty,
        otel.status_message = Empty,
    )
}

pub fn geocode_span() -> Span {
    tracing::info_span!(
        "get-city-from-cep",
        otel.kind = "client",
        geocode.url = Empty,
        geocode.cep = Empty,
        geocode.localidade = Empty,
        geocode.erro = Empty,
        http.method = Empty,
        http.status_code = Empty,
        city = Empty,
        otel.status_code = Empty,
        otel.status_message = Empty,
    )
}

pub fn weather_span() -> Span {
    tracing::info_span!(
        "get-temperature-from-weather-api",
        otel.kind = "client",
        weather.url = Empty,
        weather.city = Empty,
        weather.temp_c = Empty,
        http.method = Empty,
        http.status_code = Empty,
        otel.status_code = Empty,
        otel.status_message = Empty,
    )
}

pub fn convert_span() -> Span {
    tracing::info_span!(
        "convert-temperatures",
        temp_celsius = Empty,
        temp_fahrenheit = Empty,
        temp_kelvin = Empty,
        otel.status_code = Empty,
        otel.status_message = Empty,
    )
}
