use serde::Serialize;
use std::path::PathBuf;

/// An upload written to the staging directory.
///
/// Owned by the pipeline run that staged it; deleted either when the run fails
/// or by the run's cleanup task.
#[derive(Debug, Clone, Serialize)]
pub struct UploadedFile {
    /// Generated unique file name (`<epochMillis>-<random><.ext>`)
    pub filename: String,
    pub path: PathBuf,
    /// File name as sent by the client
    pub original_filename: String,
    pub size_bytes: u64,
    /// Public URL of the staged file (`/uploads/<filename>`)
    pub url: String,
}
