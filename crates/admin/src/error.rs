//! Unified error handling for admin.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use dreamtrade_core::FieldError;

use crate::settings::{SessionError, SettingsError};

/// Application-level error type for the admin API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Settings could not be persisted.
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// A field edit was rejected.
    #[error("Invalid field: {0}")]
    Field(#[from] FieldError),

    /// Request conflicts with work already in progress.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        let message = err.to_string();
        match err {
            SessionError::Field(e) => Self::Field(e),
            SessionError::Save(e) => Self::Settings(e),
            SessionError::SaveInFlight => Self::Conflict(message),
            SessionError::NotLoaded => Self::Internal(message),
        }
    }
}

/// JSON body of an error response.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(self, Self::Settings(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        let status = match &self {
            Self::Settings(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Field(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Settings(_) => "Failed to save settings".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (status, Json(ApiError { error: message })).into_response()
    }
}
