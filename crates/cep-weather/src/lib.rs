//! Temperature lookup by Brazilian postal code (CEP).
//!
//! Resolves a postal code to a city through a geocode directory, then the
//! city to a current Celsius reading through a weather provider, and derives
//! Fahrenheit and Kelvin from it.

pub mod convert;
pub mod fetch;
pub mod geocode;
pub mod provider;
pub mod span;
pub mod types;
pub mod validate;

pub use convert::convert;
pub use fetch::{FetchError, FetchResponse, HttpFetch, ReqwestFetcher};
pub use geocode::{CityLookup, GeocodeClient};
pub use provider::{TemperatureLookup, WeatherClient};
pub use span::{NoopSpan, RecordingSpan, SpanStatus, SpanValue, StageSpan, TracedSpan};
pub use types::*;
pub use validate::{is_valid_postal_code, strip_formatting};
