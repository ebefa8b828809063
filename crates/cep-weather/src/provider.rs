//! City to current Celsius temperature through WeatherAPI.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::fetch::HttpFetch;
use crate::span::StageSpan;
use crate::types::{City, TemperatureReading, WeatherError};

pub const WEATHER_BASE_URL: &str = "https://api.weatherapi.com/v1/current.json";

// Missing or null fields read as zero rather than failing the decode
#[derive(Debug, Default, Deserialize)]
struct WeatherApiResponse {
    #[serde(default)]
    current: Option<CurrentConditions>,
}

#[derive(Debug, Default, Deserialize)]
struct CurrentConditions {
    #[serde(default)]
    temp_c: Option<f64>,
}

impl WeatherApiResponse {
    fn celsius(&self) -> f64 {
        self.current
            .as_ref()
            .and_then(|c| c.temp_c)
            .unwrap_or_default()
    }
}

/// Resolve a city to its current temperature
#[async_trait]
pub trait TemperatureLookup: Send + Sync {
    async fn resolve_temperature(
        &self,
        city: &City,
        span: &dyn StageSpan,
    ) -> Result<TemperatureReading, WeatherError>;
}

#[derive(Clone)]
pub struct WeatherClient {
    fetcher: Arc<dyn HttpFetch>,
    base_url: String,
    api_key: Option<String>,
}

impl WeatherClient {
    /// `api_key` may be absent; lookups then fail with `WeatherError::Config`
    /// without touching the network.
    pub fn new(fetcher: Arc<dyn HttpFetch>, api_key: Option<String>) -> Self {
        Self::with_base_url(fetcher, WEATHER_BASE_URL, api_key)
    }

    pub fn with_base_url(
        fetcher: Arc<dyn HttpFetch>,
        base_url: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }
}

#[async_trait]
impl TemperatureLookup for WeatherClient {
    async fn resolve_temperature(
        &self,
        city: &City,
        span: &dyn StageSpan,
    ) -> Result<TemperatureReading, WeatherError> {
        span.set_str("weather.city", city.as_str());

        let Some(api_key) = self.api_key.as_deref() else {
            let err = WeatherError::Config;
            span.fail(&err, "API key is not set");
            return Err(err);
        };

        // The key stays out of span attributes
        span.set_str("weather.url", &self.base_url);
        span.set_str("http.method", "GET");

        let url = format!(
            "{}?key={}&q={}",
            self.base_url,
            urlencoding::encode(api_key),
            urlencoding::encode(city.as_str()),
        );

        let response = match self.fetcher.get(&url).await {
            Ok(r) => r,
            Err(e) => {
                let err = WeatherError::Request(e);
                span.fail(&err, "failed to get temperature");
                return Err(err);
            }
        };

        span.set_i64("http.status_code", i64::from(response.status));

        if !response.is_success() {
            let err = WeatherError::Provider {
                status: response.status,
            };
            span.fail(&err, "weather API returned error status");
            return Err(err);
        }

        let body: WeatherApiResponse = match serde_json::from_slice(&response.body) {
            Ok(b) => b,
            Err(e) => {
                let err = WeatherError::Decode(e.to_string());
                span.fail(&err, "failed to decode response");
                return Err(err);
            }
        };

        let celsius = body.celsius();
        span.set_f64("weather.temp_c", celsius);
        span.succeed("temperature retrieved successfully");

        tracing::debug!(city = %city, celsius, "Weather provider returned temperature");
        Ok(TemperatureReading { celsius })
    }
}
