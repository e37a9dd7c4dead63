//! Image protection endpoint

use crate::constants::IMAGE_FIELD;
use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::{client_filename, field_reader, no_file_uploaded};
use aiblind_core::{AppError, PublishedArtifactSet};
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    pub success: bool,
    #[serde(flatten)]
    pub artifacts: PublishedArtifactSet,
}

/// `POST /api/convert` with the image under the `image` multipart field.
#[tracing::instrument(skip(state, multipart))]
pub async fn convert_image(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!(error = %rejection.body_text(), "Request is not a multipart upload");
        no_file_uploaded()
    })?;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        HttpAppError(AppError::InvalidInput(format!(
            "Failed to read multipart: {}",
            e.body_text()
        )))
    })? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let Some(original_filename) = client_filename(&field) else {
            continue;
        };

        let mut reader = field_reader(field);
        let outcome = state.pipeline.run(&mut reader, &original_filename).await?;

        return Ok(Json(ConvertResponse {
            success: true,
            artifacts: outcome.artifacts,
        }));
    }

    Err(no_file_uploaded().into())
}
