//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`; anything that
//! converts into `AppError` renders as `{success: false, error, code}`.

use aiblind_core::{AppError, ErrorMetadata, LogLevel};
use aiblind_processing::TransformationError;
use aiblind_storage::StorageError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            code: code.into(),
            details: None,
            error_type: None,
        }
    }
}

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from aiblind-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(
                error = %error.detailed_message(),
                error_type = error_type,
                "Error occurred"
            );
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let mut body = ErrorResponse::new(app_error.client_message(), app_error.error_code());

        // Tool diagnostics and error chains stay out of production responses.
        if !is_production_env() {
            body.error_type = Some(app_error.error_type().to_string());
            body.details = match app_error {
                AppError::Transformation { diagnostics, .. } if !diagnostics.is_empty() => {
                    Some(diagnostics.clone())
                }
                AppError::InvalidInput(_) | AppError::PayloadTooLarge(_) => None,
                other => Some(other.detailed_message()),
            };
        }

        (status, Json(body)).into_response()
    }
}

// Convert domain errors to AppError at the pipeline boundary

pub fn storage_error(err: StorageError) -> AppError {
    match err {
        StorageError::StageFailed(msg) => AppError::Storage(msg),
        StorageError::PublishFailed(msg) => AppError::Publish(msg),
        StorageError::NotFound(msg) => AppError::Publish(format!("Source not found: {}", msg)),
        StorageError::DeleteFailed(msg) | StorageError::ConfigError(msg) => AppError::Internal(msg),
        StorageError::InvalidPath(msg) => AppError::Internal(format!("Invalid path: {}", msg)),
        StorageError::IoError(err) => AppError::Internal(format!("IO error: {}", err)),
    }
}

pub fn transformation_error(err: TransformationError) -> AppError {
    let diagnostics = err
        .diagnostics()
        .map(|d| d.stderr.clone())
        .unwrap_or_default();
    AppError::Transformation {
        message: err.to_string(),
        diagnostics,
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        HttpAppError(storage_error(err))
    }
}

impl From<TransformationError> for HttpAppError {
    fn from(err: TransformationError) -> Self {
        HttpAppError(transformation_error(err))
    }
}
