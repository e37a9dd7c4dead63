use crate::naming;
use crate::traits::{ArtifactStore, StorageError, StorageResult};
use crate::UPLOADS_URL_PREFIX;
use aiblind_core::{ArtifactRole, PublishedArtifact, UploadedFile};
use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};

/// Attempts at finding a free staged file name before giving up
const MAX_NAME_ATTEMPTS: usize = 8;

/// Removes a staged file unless disarmed, so a cancelled or failed stage leaves nothing behind.
struct StagedFileGuard {
    path: Option<PathBuf>,
}

impl StagedFileGuard {
    fn new(path: &Path) -> Self {
        Self {
            path: Some(path.to_path_buf()),
        }
    }

    fn disarm(&mut self) {
        self.path = None;
    }
}

impl Drop for StagedFileGuard {
    fn drop(&mut self) {
        let Some(path) = self.path.take() else {
            return;
        };
        match std::fs::remove_file(&path) {
            Ok(()) => tracing::debug!(path = %path.display(), "Removed partially staged file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                error = %e,
                path = %path.display(),
                "Failed to remove partially staged file"
            ),
        }
    }
}

/// Local filesystem artifact store
#[derive(Clone, Debug)]
pub struct LocalArtifactStore {
    uploads_dir: PathBuf,
    processed_dir: PathBuf,
}

impl LocalArtifactStore {
    /// Create both managed directories (if missing) and return a store rooted at them.
    ///
    /// # Arguments
    /// * `uploads_dir` - Staging directory, also holds the public copies
    /// * `processed_dir` - Directory the protection tool writes into
    pub async fn new(
        uploads_dir: impl Into<PathBuf>,
        processed_dir: impl Into<PathBuf>,
    ) -> StorageResult<Self> {
        let uploads_dir = Self::prepare_dir(uploads_dir.into()).await?;
        let processed_dir = Self::prepare_dir(processed_dir.into()).await?;

        if uploads_dir == processed_dir {
            return Err(StorageError::ConfigError(
                "uploads and processed directories must differ".to_string(),
            ));
        }

        tracing::info!(
            uploads_dir = %uploads_dir.display(),
            processed_dir = %processed_dir.display(),
            "Local artifact store ready"
        );

        Ok(LocalArtifactStore {
            uploads_dir,
            processed_dir,
        })
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    pub fn processed_dir(&self) -> &Path {
        &self.processed_dir
    }

    async fn prepare_dir(dir: PathBuf) -> StorageResult<PathBuf> {
        fs::create_dir_all(&dir).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        fs::canonicalize(&dir).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to canonicalize directory {}: {}",
                dir.display(),
                e
            ))
        })
    }

    /// Reject any path that is not a plain file directly inside a managed directory.
    fn ensure_managed(&self, path: &Path) -> StorageResult<()> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StorageError::InvalidPath(path.display().to_string()))?;

        if file_name.contains("..") {
            return Err(StorageError::InvalidPath(path.display().to_string()));
        }

        match path.parent() {
            Some(parent) if parent == self.uploads_dir || parent == self.processed_dir => Ok(()),
            _ => Err(StorageError::InvalidPath(format!(
                "{} is outside the managed directories",
                path.display()
            ))),
        }
    }

    fn public_url(filename: &str) -> String {
        format!("{}/{}", UPLOADS_URL_PREFIX, filename)
    }

    fn random_suffix() -> u32 {
        rand::rng().random_range(0..1_000_000_000)
    }

    /// Create and remove a throwaway file to prove the process can write into `dir`.
    async fn check_writable(dir: &Path) -> StorageResult<()> {
        let marker = dir.join(format!(".health-{}", Self::random_suffix()));
        let result: std::io::Result<()> = async {
            let mut file = fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&marker)
                .await?;
            file.write_all(b"ok").await?;
            file.flush().await
        }
        .await;
        let _ = fs::remove_file(&marker).await;

        result.map_err(|e| {
            StorageError::ConfigError(format!("{} is not writable: {}", dir.display(), e))
        })
    }

    async fn write_staged(
        &self,
        mut file: fs::File,
        path: &Path,
        reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> std::io::Result<u64> {
        let bytes_copied = tokio::io::copy(reader, &mut file).await?;
        file.flush().await?;
        file.sync_all().await?;
        tracing::trace!(path = %path.display(), "Staged file synced");
        Ok(bytes_copied)
    }
}

#[async_trait]
impl ArtifactStore for LocalArtifactStore {
    async fn stage(
        &self,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        original_filename: &str,
    ) -> StorageResult<UploadedFile> {
        let extension = naming::extension_of(original_filename);
        let start = std::time::Instant::now();

        for _ in 0..MAX_NAME_ATTEMPTS {
            let filename = naming::staged_filename(
                Utc::now().timestamp_millis(),
                Self::random_suffix(),
                &extension,
            );
            let path = self.uploads_dir.join(&filename);

            let file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    tracing::debug!(filename = %filename, "Staged file name taken, retrying");
                    continue;
                }
                Err(e) => {
                    return Err(StorageError::StageFailed(format!(
                        "Failed to create file {}: {}",
                        path.display(),
                        e
                    )))
                }
            };

            let mut guard = StagedFileGuard::new(&path);
            let size_bytes = self
                .write_staged(file, &path, reader)
                .await
                .map_err(|e| {
                    StorageError::StageFailed(format!(
                        "Failed to write file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
            guard.disarm();

            tracing::info!(
                path = %path.display(),
                original_filename = %original_filename,
                size_bytes,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Upload staged"
            );

            return Ok(UploadedFile {
                url: Self::public_url(&filename),
                filename,
                path,
                original_filename: original_filename.to_string(),
                size_bytes,
            });
        }

        Err(StorageError::StageFailed(
            "Could not allocate a unique staged file name".to_string(),
        ))
    }

    fn output_path(&self, timestamp_ms: i64) -> PathBuf {
        self.processed_dir
            .join(naming::protected_output_filename(timestamp_ms))
    }

    fn public_path(&self, role: ArtifactRole, timestamp_ms: i64) -> PathBuf {
        self.uploads_dir
            .join(naming::public_filename(role, timestamp_ms))
    }

    async fn publish(
        &self,
        source: &Path,
        role: ArtifactRole,
        timestamp_ms: i64,
    ) -> StorageResult<PublishedArtifact> {
        self.ensure_managed(source)?;

        if !fs::try_exists(source).await.unwrap_or(false) {
            return Err(StorageError::NotFound(source.display().to_string()));
        }

        let filename = naming::public_filename(role, timestamp_ms);
        let path = self.public_path(role, timestamp_ms);
        let partial_path = self.uploads_dir.join(format!(".{}.partial", filename));

        if let Err(e) = fs::copy(source, &partial_path).await {
            let _ = fs::remove_file(&partial_path).await;
            return Err(StorageError::PublishFailed(format!(
                "Failed to copy {} to {}: {}",
                source.display(),
                path.display(),
                e
            )));
        }

        if let Err(e) = fs::rename(&partial_path, &path).await {
            let _ = fs::remove_file(&partial_path).await;
            return Err(StorageError::PublishFailed(format!(
                "Failed to move {} into place: {}",
                path.display(),
                e
            )));
        }

        tracing::info!(
            role = %role,
            from_path = %source.display(),
            to_path = %path.display(),
            "Artifact published"
        );

        Ok(PublishedArtifact {
            role,
            url: Self::public_url(&filename),
            path,
        })
    }

    async fn exists(&self, path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }

    async fn delete(&self, path: &Path) -> StorageResult<bool> {
        self.ensure_managed(path)?;

        match fs::remove_file(path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "File deleted");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn check_health(&self) -> StorageResult<()> {
        for dir in [&self.uploads_dir, &self.processed_dir] {
            let meta = fs::metadata(dir).await.map_err(|e| {
                StorageError::NotFound(format!("{}: {}", dir.display(), e))
            })?;
            if !meta.is_dir() {
                return Err(StorageError::ConfigError(format!(
                    "{} is not a directory",
                    dir.display()
                )));
            }
            Self::check_writable(dir).await?;
        }
        Ok(())
    }
}
