use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

/// Deferred deletion of the files one run created.
#[derive(Debug, Clone, Serialize)]
pub struct CleanupTask {
    pub id: Uuid,
    pub paths: Vec<PathBuf>,
    pub created_at: DateTime<Utc>,
    pub fire_at: DateTime<Utc>,
}

impl CleanupTask {
    pub fn new(paths: Vec<PathBuf>, delay: Duration) -> Self {
        let created_at = Utc::now();
        let fire_at = chrono::Duration::from_std(delay)
            .ok()
            .and_then(|delay| created_at.checked_add_signed(delay))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            id: Uuid::new_v4(),
            paths,
            created_at,
            fire_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fire_time_is_creation_plus_delay() {
        let task = CleanupTask::new(vec!["uploads/a.png".into()], Duration::from_secs(1800));
        assert_eq!((task.fire_at - task.created_at).num_seconds(), 1800);
        assert_eq!(task.paths.len(), 1);
    }
}
