use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cep_weather::{GeocodeError, InvalidPostalCode, WeatherError};

/// Failure of one pipeline stage. The first failing stage wins.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    InvalidPostalCode(#[from] InvalidPostalCode),

    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    #[error(transparent)]
    Weather(#[from] WeatherError),
}

impl PipelineError {
    /// HTTP status reported to the caller
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidPostalCode(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Geocode(_) => StatusCode::NOT_FOUND,
            Self::Weather(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message; provider details stay in logs and spans
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::InvalidPostalCode(_) => "invalid zipcode",
            Self::Geocode(_) => "can not find zipcode",
            Self::Weather(_) => "error getting temperature",
        }
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        (self.status(), self.public_message()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_and_message() {
        let cases = [
            (
                PipelineError::from(InvalidPostalCode),
                StatusCode::UNPROCESSABLE_ENTITY,
                "invalid zipcode",
            ),
            (
                PipelineError::from(GeocodeError::NotFound),
                StatusCode::NOT_FOUND,
                "can not find zipcode",
            ),
            (
                PipelineError::from(GeocodeError::Provider { status: 503 }),
                StatusCode::NOT_FOUND,
                "can not find zipcode",
            ),
            (
                PipelineError::from(WeatherError::Config),
                StatusCode::INTERNAL_SERVER_ERROR,
                "error getting temperature",
            ),
        ];

        for (error, status, message) in cases {
            assert_eq!(error.status(), status);
            assert_eq!(error.public_message(), message);
        }
    }

    #[test]
    fn test_public_message_hides_provider_detail() {
        let error = PipelineError::from(WeatherError::Decode("expected value at line 1".into()));
        assert!(!error.public_message().contains("line 1"));
    }
}
