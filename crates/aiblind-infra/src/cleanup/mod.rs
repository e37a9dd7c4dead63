//! Deferred deletion of conversion artifacts

mod scheduler;

pub use scheduler::{CleanupReport, CleanupScheduler, ScheduledCleanup};
