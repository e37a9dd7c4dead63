//! AI Blind Core Library
//!
//! This crate provides the domain model, error types and configuration
//! shared by every AI Blind component.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{Config, LogFormat};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    AiRecognition, ArtifactRole, CleanupTask, ProtectionReport, PublishedArtifact,
    PublishedArtifactSet, ToolDiagnostics, TransformationResult, UploadedFile,
};
