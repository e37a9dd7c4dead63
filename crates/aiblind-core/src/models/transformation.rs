use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything the external tool wrote to stdout and stderr.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ToolDiagnostics {
    pub stdout: String,
    pub stderr: String,
}

/// Structured report the protection tool may leave next to its output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectionReport {
    /// Whether a person is still recognizable in the AI view
    pub person_recognized: bool,
    #[serde(default)]
    pub faces_detected: Option<u32>,
}

/// Outcome of one successful tool invocation. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct TransformationResult {
    pub output_path: PathBuf,
    /// Secondary "how AI sees it" artifact, when the tool produced one
    pub ai_view_path: Option<PathBuf>,
    pub report_path: Option<PathBuf>,
    pub report: Option<ProtectionReport>,
    pub exit_code: i32,
    pub diagnostics: ToolDiagnostics,
}

impl TransformationResult {
    /// Files the tool left on disk for this run.
    pub fn produced_files(&self) -> Vec<PathBuf> {
        let mut files = vec![self.output_path.clone()];
        files.extend(self.ai_view_path.iter().cloned());
        files.extend(self.report_path.iter().cloned());
        files
    }
}
