//! Orchestrator service: `GET /temperature?cep=` resolves a postal code to the
//! current temperature of its city in Celsius, Fahrenheit and Kelvin.

pub mod error;
pub mod pipeline;
pub mod routes;
pub mod spans;

use std::sync::Arc;

use cep_core::Config;
use cep_weather::{GeocodeClient, HttpFetch, WeatherClient};

pub use error::PipelineError;
pub use pipeline::TemperaturePipeline;
pub use routes::router;

/// Wire the provider clients from configuration around a shared fetcher
pub fn build_pipeline(config: &Config, fetcher: Arc<dyn HttpFetch>) -> TemperaturePipeline {
    let geocode = GeocodeClient::with_base_url(fetcher.clone(), config.geocode_base_url.clone());
    let weather = WeatherClient::with_base_url(
        fetcher,
        config.weather_base_url.clone(),
        config.weather_api_key().map(str::to_string),
    );

    TemperaturePipeline::new(Arc::new(geocode), Arc::new(weather))
}
