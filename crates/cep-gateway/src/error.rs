use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Body was not `{"cep": string}` or the code failed validation
    #[error("invalid zipcode")]
    InvalidPostalCode,

    #[error("Orchestrator request failed: {0}")]
    Forward(#[from] reqwest::Error),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: &'static str,
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidPostalCode => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Forward(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn public_message(&self) -> &'static str {
        match self {
            Self::InvalidPostalCode => "invalid zipcode",
            Self::Forward(_) => "internal server error",
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            message: self.public_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}
