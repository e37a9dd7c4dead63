//! Service wiring

use crate::services::pipeline::PipelineCoordinator;
use crate::state::AppState;
use aiblind_core::Config;
use aiblind_infra::CleanupScheduler;
use aiblind_processing::{ProtectionTool, Transformer};
use aiblind_storage::{ArtifactStore, LocalArtifactStore};
use anyhow::{Context, Result};
use std::sync::Arc;

/// Create the artifact store and protector described by `config` and wire them into `AppState`.
pub async fn initialize_services(config: &Config) -> Result<Arc<AppState>> {
    let store = LocalArtifactStore::new(config.uploads_dir.clone(), config.processed_dir.clone())
        .await
        .context("Failed to initialize artifact store")?;
    store
        .check_health()
        .await
        .context("Artifact directories are not usable")?;

    let tool = ProtectionTool::from_config(config).context("Invalid PROTECTOR_COMMAND")?;
    tracing::info!(
        program = %tool.program(),
        args = ?config.protector_args,
        "Protector configured"
    );

    Ok(build_state(config.clone(), Arc::new(store), Arc::new(tool)))
}

pub fn build_state(
    config: Config,
    store: Arc<dyn ArtifactStore>,
    transformer: Arc<dyn Transformer>,
) -> Arc<AppState> {
    let cleanup = CleanupScheduler::new(store.clone(), config.cleanup_delay);
    tracing::info!(
        delay_secs = cleanup.delay().as_secs(),
        "Cleanup scheduler ready"
    );
    let pipeline = PipelineCoordinator::new(store.clone(), transformer, cleanup.clone());

    Arc::new(AppState {
        config,
        store,
        pipeline,
        cleanup,
    })
}
