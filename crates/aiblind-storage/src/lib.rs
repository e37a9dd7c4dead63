//! AI Blind Storage Library
//!
//! This crate owns the on-disk layout of a conversion run: the staging
//! directory for uploads (which also holds the public copies) and the output
//! directory the protection tool writes into.
//!
//! # File naming
//!
//! - Staged upload: `<epochMillis>-<random><.ext>`
//! - Tool output: `protected_<epochMillis>.png`, with the optional
//!   `protected_<epochMillis>_ai_view.png` and `protected_<epochMillis>_report.json`
//!   beside it
//! - Public copies: `ai_protected_<epochMillis>.png`, `ai_view_<epochMillis>.png`
//!
//! Name generation is centralized in the `naming` module.

pub mod local;
pub mod naming;
pub mod traits;

// Re-export commonly used types
pub use local::LocalArtifactStore;
pub use traits::{ArtifactStore, StorageError, StorageResult};

/// URL prefix the staging directory is served under
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// URL prefix the tool output directory is served under
pub const PROCESSED_URL_PREFIX: &str = "/processed";
