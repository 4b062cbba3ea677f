use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::services::model::ModelError;

/// Standard error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid destination: {0}")]
    InvalidDestination(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// One or both upstream weather payloads could not be fetched.
    #[error("Weather data unavailable")]
    WeatherUnavailable,

    #[error("External service error: {0}")]
    ExternalServiceError(String),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::InvalidDestination(name) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid destination: {}", name),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::WeatherUnavailable => (
                StatusCode::BAD_GATEWAY,
                "Weather data unavailable".to_string(),
            ),
            AppError::ExternalServiceError(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            AppError::Model(err) => {
                tracing::error!("Model error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to compute climbing conditions score".to_string(),
                )
            }
            AppError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        (status, axum::Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (
                AppError::InvalidDestination("Nowhere".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (AppError::WeatherUnavailable, StatusCode::BAD_GATEWAY),
            (
                AppError::ExternalServiceError("bad shape".to_string()),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AppError::Model(ModelError::EmptyPrediction),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
