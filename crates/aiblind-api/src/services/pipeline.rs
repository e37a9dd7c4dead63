//! Conversion pipeline
//!
//! One run stages the upload, invokes the protector, publishes its outputs and
//! schedules their cleanup. Everything after staging runs in its own task, so a
//! client that goes away mid-request does not leave a run half done.

use crate::error::{storage_error, transformation_error};
use aiblind_core::{
    AiRecognition, AppError, ArtifactRole, CleanupTask, PublishedArtifactSet, UploadedFile,
};
use aiblind_infra::CleanupScheduler;
use aiblind_processing::Transformer;
use aiblind_storage::{naming, ArtifactStore};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncRead;
use tracing::Instrument;

/// States of a single run. `CleanupScheduled` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Staged,
    Invoked,
    Published,
    CleanupScheduled,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Staged => "staged",
            PipelineStage::Invoked => "invoked",
            PipelineStage::Published => "published",
            PipelineStage::CleanupScheduled => "cleanup_scheduled",
            PipelineStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub artifacts: PublishedArtifactSet,
    /// Deferred deletion covering every file the run created
    pub cleanup: CleanupTask,
}

/// Every path a run may create after staging, allocated before the run starts
/// so they can be removed even when the run dies halfway.
struct RunPaths {
    output: PathBuf,
    timestamp: i64,
    public_protected: PathBuf,
    public_ai_view: PathBuf,
}

impl RunPaths {
    fn reserve(store: &dyn ArtifactStore) -> Self {
        let output = store.output_path(naming::next_timestamp_millis());
        let timestamp = naming::next_timestamp_millis();
        Self {
            public_protected: store.public_path(ArtifactRole::Protected, timestamp),
            public_ai_view: store.public_path(ArtifactRole::AiView, timestamp),
            output,
            timestamp,
        }
    }

    fn all(&self) -> Vec<PathBuf> {
        vec![
            self.output.clone(),
            naming::ai_view_path(&self.output),
            naming::report_path(&self.output),
            self.public_protected.clone(),
            self.public_ai_view.clone(),
        ]
    }
}

#[derive(Clone)]
pub struct PipelineCoordinator {
    store: Arc<dyn ArtifactStore>,
    transformer: Arc<dyn Transformer>,
    cleanup: CleanupScheduler,
}

impl PipelineCoordinator {
    pub fn new(
        store: Arc<dyn ArtifactStore>,
        transformer: Arc<dyn Transformer>,
        cleanup: CleanupScheduler,
    ) -> Self {
        Self {
            store,
            transformer,
            cleanup,
        }
    }

    /// Run one conversion for an uploaded image stream.
    ///
    /// On failure every file the run created is already gone when this returns.
    #[tracing::instrument(skip(self, reader), fields(run_id = %uuid::Uuid::new_v4()))]
    pub async fn run(
        &self,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        original_filename: &str,
    ) -> Result<PipelineOutcome, AppError> {
        let staged = match self.store.stage(reader, original_filename).await {
            Ok(staged) => staged,
            Err(e) => {
                transition(PipelineStage::Failed);
                return Err(storage_error(e));
            }
        };
        transition(PipelineStage::Staged);

        let paths = RunPaths::reserve(self.store.as_ref());
        let mut reserved = vec![staged.path.clone()];
        reserved.extend(paths.all());

        let coordinator = self.clone();
        let run = tokio::spawn(
            async move { coordinator.process(staged, paths).await }.in_current_span(),
        );

        match run.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "Pipeline task aborted");
                self.discard(&reserved).await;
                transition(PipelineStage::Failed);
                Err(AppError::Internal(format!("Pipeline task aborted: {}", e)))
            }
        }
    }

    async fn process(
        &self,
        staged: UploadedFile,
        paths: RunPaths,
    ) -> Result<PipelineOutcome, AppError> {
        let RunPaths {
            output, timestamp, ..
        } = paths;

        let result = match self.transformer.invoke(&staged.path, &output).await {
            Ok(result) => result,
            Err(e) => {
                self.discard(&[
                    staged.path.clone(),
                    naming::ai_view_path(&output),
                    naming::report_path(&output),
                    output,
                ])
                .await;
                transition(PipelineStage::Failed);
                return Err(transformation_error(e));
            }
        };
        transition(PipelineStage::Invoked);

        let mut created = vec![staged.path.clone()];
        created.extend(result.produced_files());

        let protected = match self
            .store
            .publish(&result.output_path, ArtifactRole::Protected, timestamp)
            .await
        {
            Ok(protected) => protected,
            Err(e) => {
                self.discard(&created).await;
                transition(PipelineStage::Failed);
                return Err(storage_error(e));
            }
        };

        let ai_view = match &result.ai_view_path {
            Some(path) => match self.store.publish(path, ArtifactRole::AiView, timestamp).await {
                Ok(artifact) => Some(artifact),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        path = %path.display(),
                        "AI view could not be published, omitting it"
                    );
                    None
                }
            },
            None => None,
        };
        transition(PipelineStage::Published);

        let has_person = result
            .report
            .as_ref()
            .is_some_and(|report| report.person_recognized);

        let artifacts = PublishedArtifactSet {
            original_image: staged.url,
            protected_image: protected.url,
            ai_view_image: ai_view.as_ref().map(|a| a.url.clone()),
            ai_recognition: AiRecognition::new(has_person),
        };

        created.push(protected.path);
        created.extend(ai_view.map(|a| a.path));
        let scheduled = self.cleanup.schedule(created);
        transition(PipelineStage::CleanupScheduled);

        Ok(PipelineOutcome {
            artifacts,
            cleanup: scheduled.task,
        })
    }

    /// Synchronous cleanup of a failed run.
    async fn discard(&self, paths: &[PathBuf]) {
        for path in paths {
            if let Err(e) = self.store.delete(path).await {
                tracing::error!(error = %e, path = %path.display(), "Failed to remove file of failed run");
            }
        }
    }
}

fn transition(stage: PipelineStage) {
    match stage {
        PipelineStage::Failed => tracing::warn!(stage = %stage, "Pipeline run failed"),
        _ => tracing::info!(stage = %stage, "Pipeline stage reached"),
    }
}
