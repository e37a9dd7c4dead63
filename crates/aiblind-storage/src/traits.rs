//! Artifact store abstraction
//!
//! This module defines the ArtifactStore trait the pipeline works against.

use aiblind_core::{ArtifactRole, PublishedArtifact, UploadedFile};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Staging failed: {0}")]
    StageFailed(String),

    #[error("Publish failed: {0}")]
    PublishFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Artifact store trait
///
/// Every path handed out by a store lives directly inside one of its two
/// managed directories; `delete` refuses anything else.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Write an upload stream to a new, uniquely named file in the staging directory.
    ///
    /// A partially written file is removed before an error is returned, and also
    /// when the returned future is dropped before completing.
    async fn stage(
        &self,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        original_filename: &str,
    ) -> StorageResult<UploadedFile>;

    /// Path the protection tool must write its primary output to.
    fn output_path(&self, timestamp_ms: i64) -> PathBuf;

    /// Path `publish` writes the public copy for `role` to.
    fn public_path(&self, role: ArtifactRole, timestamp_ms: i64) -> PathBuf;

    /// Copy a tool output into the public directory under its role-specific name.
    ///
    /// Fails with `StorageError::NotFound` when `source` does not exist at call time.
    async fn publish(
        &self,
        source: &Path,
        role: ArtifactRole,
        timestamp_ms: i64,
    ) -> StorageResult<PublishedArtifact>;

    /// Check if a file exists
    async fn exists(&self, path: &Path) -> bool;

    /// Delete a file. Returns `false` when there was nothing to delete.
    async fn delete(&self, path: &Path) -> StorageResult<bool>;

    /// Verify both managed directories are still present and accept new files.
    async fn check_health(&self) -> StorageResult<()>;
}
