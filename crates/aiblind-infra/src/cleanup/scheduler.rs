use aiblind_core::CleanupTask;
use aiblind_storage::ArtifactStore;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// What one deletion pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub task_id: Uuid,
    pub deleted: usize,
    /// Paths that were already gone at fire time
    pub missing: usize,
    pub failed: usize,
}

/// A registered task and the handle of the timer driving it.
#[derive(Debug)]
pub struct ScheduledCleanup {
    pub task: CleanupTask,
    pub handle: JoinHandle<CleanupReport>,
}

/// Deletes the files of completed runs once their retention delay has passed.
///
/// Each task fires once; failures are logged and never retried.
#[derive(Clone)]
pub struct CleanupScheduler {
    store: Arc<dyn ArtifactStore>,
    delay: Duration,
    scheduled: Arc<Mutex<HashSet<PathBuf>>>,
    pending_tasks: Arc<AtomicUsize>,
}

impl CleanupScheduler {
    pub fn new(store: Arc<dyn ArtifactStore>, delay: Duration) -> Self {
        Self {
            store,
            delay,
            scheduled: Arc::new(Mutex::new(HashSet::new())),
            pending_tasks: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Register one deletion pass over `paths`, firing after the configured delay.
    ///
    /// Paths already covered by a pending task are left out of the new one.
    /// Must be called from within a Tokio runtime.
    pub fn schedule(&self, paths: Vec<PathBuf>) -> ScheduledCleanup {
        let accepted: Vec<PathBuf> = {
            let mut scheduled = self.lock_scheduled();
            paths
                .into_iter()
                .filter(|path| {
                    let fresh = scheduled.insert(path.clone());
                    if !fresh {
                        tracing::warn!(path = %path.display(), "Path already scheduled for cleanup, skipping");
                    }
                    fresh
                })
                .collect()
        };

        let task = CleanupTask::new(accepted, self.delay);
        self.pending_tasks.fetch_add(1, Ordering::SeqCst);

        tracing::info!(
            task_id = %task.id,
            paths = task.paths.len(),
            fire_at = %task.fire_at,
            "Cleanup scheduled"
        );

        let scheduler = self.clone();
        let spawned = task.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(scheduler.delay).await;
            let report = scheduler.run(&spawned).await;
            scheduler.pending_tasks.fetch_sub(1, Ordering::SeqCst);
            report
        });

        ScheduledCleanup { task, handle }
    }

    /// Number of registered tasks that have not fired yet.
    pub fn pending_count(&self) -> usize {
        self.pending_tasks.load(Ordering::SeqCst)
    }

    /// Log the tasks that will never fire because the process is going away.
    pub fn shutdown(&self) -> usize {
        let abandoned = self.pending_count();
        if abandoned > 0 {
            tracing::warn!(
                abandoned_tasks = abandoned,
                abandoned_paths = self.lock_scheduled().len(),
                "Shutting down with pending cleanup tasks"
            );
        } else {
            tracing::debug!("No pending cleanup tasks at shutdown");
        }
        abandoned
    }

    #[tracing::instrument(skip(self, task), fields(task_id = %task.id))]
    async fn run(&self, task: &CleanupTask) -> CleanupReport {
        let mut report = CleanupReport {
            task_id: task.id,
            ..Default::default()
        };

        for path in &task.paths {
            match self.store.delete(path).await {
                Ok(true) => report.deleted += 1,
                Ok(false) => report.missing += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(error = %e, path = %path.display(), "Failed to delete file");
                }
            }
            self.lock_scheduled().remove(path);
        }

        tracing::info!(
            deleted = report.deleted,
            missing = report.missing,
            failed = report.failed,
            "Cleanup task completed"
        );
        report
    }

    fn lock_scheduled(&self) -> MutexGuard<'_, HashSet<PathBuf>> {
        self.scheduled
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
