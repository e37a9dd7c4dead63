//! AI Blind Infrastructure Library
//!
//! Shared infrastructure used by the server:
//! - Telemetry initialization (tracing subscriber)
//! - Deferred cleanup of conversion artifacts

pub mod cleanup;
pub mod telemetry;

pub use cleanup::{CleanupReport, CleanupScheduler, ScheduledCleanup};
pub use telemetry::{init_telemetry, shutdown_telemetry};
