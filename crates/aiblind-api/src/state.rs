//! Application state shared by all handlers.

use crate::services::pipeline::PipelineCoordinator;
use aiblind_core::Config;
use aiblind_infra::CleanupScheduler;
use aiblind_storage::ArtifactStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn ArtifactStore>,
    pub pipeline: PipelineCoordinator,
    pub cleanup: CleanupScheduler,
}
