//! Validate, geocode, fetch weather, convert.

use std::sync::Arc;

use cep_weather::{
    convert, CityLookup, PostalCode, StageSpan, TemperatureLookup, TemperatureReport, TracedSpan,
};
use tracing::Instrument;

use crate::error::PipelineError;
use crate::spans;

/// Runs one lookup per request, strictly in order, stopping at the first failure.
///
/// Holds no per-request state and is shared across handlers.
pub struct TemperaturePipeline {
    geocode: Arc<dyn CityLookup>,
    weather: Arc<dyn TemperatureLookup>,
}

impl TemperaturePipeline {
    pub fn new(geocode: Arc<dyn CityLookup>, weather: Arc<dyn TemperatureLookup>) -> Self {
        Self { geocode, weather }
    }

    /// Resolve `raw_cep` to a temperature report.
    ///
    /// `request` receives the request-level attributes and final status; each
    /// stage records into its own child span. A lookup failure is recorded by
    /// the stage that produced it, the request span only carries the status.
    pub async fn run(
        &self,
        raw_cep: &str,
        request: &dyn StageSpan,
    ) -> Result<TemperatureReport, PipelineError> {
        request.set_str("cep", raw_cep);

        let code = match PostalCode::parse(raw_cep) {
            Ok(code) => code,
            Err(e) => {
                request.set_bool("valid_cep", false);
                request.fail(&e, "invalid zipcode");
                return Err(e.into());
            }
        };
        request.set_bool("valid_cep", true);

        let geocode_span = TracedSpan::new(spans::geocode_span());
        let city = match self
            .geocode
            .resolve_city(&code, &geocode_span)
            .instrument(geocode_span.span().clone())
            .await
        {
            Ok(city) => city,
            Err(e) => {
                request.mark_failed("can not find zipcode");
                return Err(e.into());
            }
        };
        geocode_span.set_str("city", city.as_str());

        let weather_span = TracedSpan::new(spans::weather_span());
        let reading = match self
            .weather
            .resolve_temperature(&city, &weather_span)
            .instrument(weather_span.span().clone())
            .await
        {
            Ok(reading) => reading,
            Err(e) => {
                request.mark_failed("error getting temperature");
                return Err(e.into());
            }
        };

        let convert_span = TracedSpan::new(spans::convert_span());
        let temperatures = convert_span.span().in_scope(|| convert(reading.celsius));
        convert_span.set_f64("temp_celsius", temperatures.celsius);
        convert_span.set_f64("temp_fahrenheit", temperatures.fahrenheit);
        convert_span.set_f64("temp_kelvin", temperatures.kelvin);
        convert_span.succeed("temperatures converted");

        request.set_str("response_city", city.as_str());
        request.succeed("temperature retrieved");

        tracing::info!(
            cep = %code,
            city = %city,
            temp_c = temperatures.celsius,
            "Temperature lookup completed"
        );
        Ok(TemperatureReport::new(city, temperatures))
    }
}
