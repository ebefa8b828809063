//! Postal code to city through the ViaCEP directory.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::fetch::HttpFetch;
use crate::span::StageSpan;
use crate::types::{City, GeocodeError, PostalCode};

pub const GEOCODE_BASE_URL: &str = "https://viacep.com.br/ws";

#[derive(Debug, Deserialize)]
struct ViaCepResponse {
    #[serde(default)]
    localidade: String,
    #[serde(default)]
    erro: Option<NotFoundFlag>,
}

/// The directory documents `"erro": true` but currently answers `"erro": "true"`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NotFoundFlag {
    Bool(bool),
    Text(String),
}

impl NotFoundFlag {
    fn is_set(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Text(s) => s.eq_ignore_ascii_case("true"),
        }
    }
}

/// Resolve a postal code to the city it belongs to
#[async_trait]
pub trait CityLookup: Send + Sync {
    async fn resolve_city(&self, code: &PostalCode, span: &dyn StageSpan) -> Result<City, GeocodeError>;
}

#[derive(Clone)]
pub struct GeocodeClient {
    fetcher: Arc<dyn HttpFetch>,
    base_url: String,
}

impl GeocodeClient {
    pub fn new(fetcher: Arc<dyn HttpFetch>) -> Self {
        Self::with_base_url(fetcher, GEOCODE_BASE_URL)
    }

    pub fn with_base_url(fetcher: Arc<dyn HttpFetch>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { fetcher, base_url }
    }

    fn lookup_url(&self, code: &PostalCode) -> String {
        format!("{}/{}/json/", self.base_url, code)
    }
}

#[async_trait]
impl CityLookup for GeocodeClient {
    async fn resolve_city(&self, code: &PostalCode, span: &dyn StageSpan) -> Result<City, GeocodeError> {
        let url = self.lookup_url(code);

        span.set_str("geocode.url", &url);
        span.set_str("geocode.cep", code.as_str());
        span.set_str("http.method", "GET");

        let response = match self.fetcher.get(&url).await {
            Ok(r) => r,
            Err(e) => {
                let err = GeocodeError::Request(e);
                span.fail(&err, "HTTP request failed");
                return Err(err);
            }
        };

        span.set_i64("http.status_code", i64::from(response.status));

        if !response.is_success() {
            let err = GeocodeError::Provider {
                status: response.status,
            };
            span.fail(&err, "unexpected HTTP status code");
            return Err(err);
        }

        let body: ViaCepResponse = match serde_json::from_slice(&response.body) {
            Ok(b) => b,
            Err(e) => {
                let err = GeocodeError::Decode(e.to_string());
                span.fail(&err, "failed to decode JSON response");
                return Err(err);
            }
        };

        let not_found = body.erro.as_ref().is_some_and(NotFoundFlag::is_set);
        span.set_str("geocode.localidade", &body.localidade);
        span.set_bool("geocode.erro", not_found);

        let city = if not_found { None } else { City::new(body.localidade) };
        let Some(city) = city else {
            let err = GeocodeError::NotFound;
            span.fail(&err, "can not find zipcode");
            return Err(err);
        };

        tracing::debug!(cep = %code, city = %city, "Geocode resolved city");
        span.succeed("city successfully retrieved from ViaCEP");
        Ok(city)
    }
}
