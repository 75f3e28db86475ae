//! HTTP error responses for the web adapter.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use crate::domain::error::PricefuseError;

#[derive(Debug)]
pub struct WebError {
    pub status: StatusCode,
    pub message: String,
}

impl WebError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

pub fn status_from_error(err: &PricefuseError) -> StatusCode {
    match err {
        PricefuseError::InvalidInput { .. }
        | PricefuseError::InsufficientBalance { .. }
        | PricefuseError::InsufficientHoldings { .. } => StatusCode::BAD_REQUEST,
        PricefuseError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        PricefuseError::ConcurrencyViolation { .. }
        | PricefuseError::ConfigParse { .. }
        | PricefuseError::ConfigMissing { .. }
        | PricefuseError::ConfigInvalid { .. }
        | PricefuseError::TradeLog { .. }
        | PricefuseError::FeedSetup { .. }
        | PricefuseError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<PricefuseError> for WebError {
    fn from(err: PricefuseError) -> Self {
        let status = status_from_error(&err);
        if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            error!(error = %err, "request failed");
        }
        Self::new(status, err.to_string())
    }
}

/// Malformed or mistyped bodies are client errors with a JSON body,
/// whatever status axum would pick on its own.
impl From<JsonRejection> for WebError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
