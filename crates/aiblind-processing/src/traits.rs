//! Core traits for image protection
//!
//! This module defines the interface the pipeline uses to run a transformation.

use aiblind_core::{ToolDiagnostics, TransformationResult};
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Transformation errors
#[derive(Debug, Error)]
pub enum TransformationError {
    #[error("Invalid protector program: {0}")]
    InvalidProgram(String),

    #[error("Failed to start protector: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Failed to protect image: {}", .diagnostics.stderr.trim())]
    NonZeroExit {
        code: Option<i32>,
        diagnostics: ToolDiagnostics,
    },

    #[error("Protected image not found")]
    MissingOutput { diagnostics: ToolDiagnostics },
}

impl TransformationError {
    /// Captured tool output, when the tool ran at all.
    pub fn diagnostics(&self) -> Option<&ToolDiagnostics> {
        match self {
            TransformationError::NonZeroExit { diagnostics, .. }
            | TransformationError::MissingOutput { diagnostics } => Some(diagnostics),
            _ => None,
        }
    }
}

/// Image transformer trait - runs one protection pass
#[async_trait]
pub trait Transformer: Send + Sync {
    /// Transform `input` and write the primary artifact to exactly `output`.
    ///
    /// Resolves once the transformation has finished; returns an error for any
    /// failure signalled by the tool or a missing primary artifact.
    async fn invoke(
        &self,
        input: &Path,
        output: &Path,
    ) -> Result<TransformationResult, TransformationError>;
}
