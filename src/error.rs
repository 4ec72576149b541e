//! HTTP error handling and response types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

/// API error response body.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Error type for HTTP handlers. Prediction handlers never produce one on
/// account of the remote service; it only covers caller mistakes.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest { message: String, details: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::BadRequest { message, details } => (
                StatusCode::BAD_REQUEST,
                ApiError::new("BAD_REQUEST", message).with_details(details),
            ),
        };
        (status, Json(error)).into_response()
    }
}
