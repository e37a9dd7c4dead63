//! Request middleware

use crate::error::HttpAppError;
use aiblind_core::AppError;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

/// Reject uploads whose declared length is over the configured limit before
/// any of the body is read.
pub async fn upload_limit_middleware(
    State(max_bytes): State<usize>,
    request: Request,
    next: Next,
) -> Result<Response, HttpAppError> {
    let declared = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok());

    if let Some(length) = declared.filter(|length| *length > max_bytes as u64) {
        tracing::debug!(content_length = length, max_bytes, "Upload rejected as too large");
        return Err(AppError::PayloadTooLarge(format!(
            "File size exceeds maximum allowed size of {} MB",
            max_bytes / 1024 / 1024
        ))
        .into());
    }

    Ok(next.run(request).await)
}
