use serde::Serialize;

use crate::fetch::FetchError;
use crate::validate::is_valid_postal_code;

/// An 8-digit Brazilian postal code that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostalCode(String);

impl PostalCode {
    /// Accept `raw` only if it is exactly 8 ASCII digits.
    ///
    /// No normalization happens here; callers that allow formatting
    /// characters strip them first (see [`crate::strip_formatting`]).
    pub fn parse(raw: &str) -> Result<Self, InvalidPostalCode> {
        if is_valid_postal_code(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(InvalidPostalCode)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PostalCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// City display name returned by the geocode directory. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct City(String);

impl City {
    /// Returns `None` for an empty name
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        if name.is_empty() {
            None
        } else {
            Some(Self(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for City {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Current-conditions reading in Celsius; no bounds enforced
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureReading {
    pub celsius: f64,
}

/// One temperature in the three reported units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Temperatures {
    pub celsius: f64,
    pub fahrenheit: f64,
    pub kelvin: f64,
}

/// Successful lookup result, serialized as the orchestrator's response body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureReport {
    pub city: City,
    #[serde(rename = "temp_C")]
    pub temp_c: f64,
    #[serde(rename = "temp_F")]
    pub temp_f: f64,
    #[serde(rename = "temp_K")]
    pub temp_k: f64,
}

impl TemperatureReport {
    pub fn new(city: City, temperatures: Temperatures) -> Self {
        Self {
            city,
            temp_c: temperatures.celsius,
            temp_f: temperatures.fahrenheit,
            temp_k: temperatures.kelvin,
        }
    }
}

/// Postal code rejected by the validator
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid zipcode")]
pub struct InvalidPostalCode;

/// Geocode directory errors
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("Geocode request failed: {0}")]
    Request(#[source] FetchError),
    #[error("Geocode provider returned status {status}")]
    Provider { status: u16 },
    #[error("Geocode response could not be decoded: {0}")]
    Decode(String),
    /// Explicit not-found flag or empty city; the two are not distinguished
    #[error("can not find zipcode")]
    NotFound,
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Weather API key is not set")]
    Config,
    #[error("Weather request failed: {0}")]
    Request(#[source] FetchError),
    #[error("Weather provider returned status {status}")]
    Provider { status: u16 },
    #[error("Weather response could not be decoded: {0}")]
    Decode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postal_code_parse() {
        assert_eq!(PostalCode::parse("01001000").unwrap().as_str(), "01001000");
        assert_eq!(PostalCode::parse("01001-000"), Err(InvalidPostalCode));
    }

    #[test]
    fn test_city_rejects_empty_name() {
        assert!(City::new("").is_none());
        assert_eq!(City::new("Recife").unwrap().as_str(), "Recife");
    }

    #[test]
    fn test_report_serialization() {
        let report = TemperatureReport::new(
            City::new("São Paulo").unwrap(),
            Temperatures {
                celsius: 25.5,
                fahrenheit: 77.9,
                kelvin: 298.5,
            },
        );

        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(
            json,
            r#"{"city":"São Paulo","temp_C":25.5,"temp_F":77.9,"temp_K":298.5}"#
        );
    }

    #[test]
    fn test_not_found_message_matches_http_body() {
        assert_eq!(GeocodeError::NotFound.to_string(), "can not find zipcode");
    }
}
