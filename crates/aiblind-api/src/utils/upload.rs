//! Common utilities for file upload handlers

use aiblind_core::AppError;
use axum::extract::multipart::Field;
use futures::TryStreamExt;
use std::io;
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;

/// Adapt a multipart field into a byte reader without buffering it in memory.
pub fn field_reader<'a>(field: Field<'a>) -> impl AsyncRead + Send + Unpin + 'a {
    let stream = field.map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.body_text()));
    StreamReader::new(Box::pin(stream))
}

/// File name the client sent for a field, if it is a file part at all.
pub fn client_filename(field: &Field<'_>) -> Option<String> {
    field.file_name().map(|name| {
        // Some clients send full paths; keep only the last component.
        name.rsplit(['/', '\\']).next().unwrap_or(name).to_string()
    })
}

pub fn no_file_uploaded() -> AppError {
    AppError::InvalidInput("No file uploaded".to_string())
}
