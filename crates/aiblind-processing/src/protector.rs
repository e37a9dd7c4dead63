//! External protection tool runner
//!
//! Invokes `<program> [args...] <input> <output>` and waits for it to exit.
//! Exit status is the only success signal; stdout and stderr are kept verbatim.

use crate::report::read_report;
use crate::traits::{TransformationError, Transformer};
use aiblind_core::{Config, ToolDiagnostics, TransformationResult};
use aiblind_storage::naming;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;

const DANGEROUS_CHARS: [char; 11] = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];

#[derive(Debug, Clone)]
pub struct ProtectionTool {
    program: String,
    args: Vec<String>,
}

impl ProtectionTool {
    pub fn new(program: String, args: Vec<String>) -> Result<Self, TransformationError> {
        if program.trim().is_empty() {
            return Err(TransformationError::InvalidProgram(
                "program must not be empty".to_string(),
            ));
        }
        if program.chars().any(|c| DANGEROUS_CHARS.contains(&c)) {
            return Err(TransformationError::InvalidProgram(format!(
                "{} contains dangerous characters",
                program
            )));
        }

        Ok(Self { program, args })
    }

    pub fn from_config(config: &Config) -> Result<Self, TransformationError> {
        Self::new(
            config.protector_program.clone(),
            config.protector_args.clone(),
        )
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl Transformer for ProtectionTool {
    #[tracing::instrument(skip(self), fields(program = %self.program))]
    async fn invoke(
        &self,
        input: &Path,
        output: &Path,
    ) -> Result<TransformationResult, TransformationError> {
        let start = Instant::now();

        let result = Command::new(&self.program)
            .args(&self.args)
            .arg(input)
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to spawn protector");
                TransformationError::Spawn(e)
            })?;

        let diagnostics = ToolDiagnostics {
            stdout: String::from_utf8_lossy(&result.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&result.stderr).into_owned(),
        };
        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

        tracing::debug!(
            stdout = %diagnostics.stdout,
            stderr = %diagnostics.stderr,
            "Protector output"
        );

        if !result.status.success() {
            tracing::warn!(
                exit_code = ?result.status.code(),
                stderr = %diagnostics.stderr,
                duration_ms = duration_ms,
                "Protector exited with failure"
            );
            return Err(TransformationError::NonZeroExit {
                code: result.status.code(),
                diagnostics,
            });
        }

        if !tokio::fs::try_exists(output).await.unwrap_or(false) {
            tracing::warn!(
                output = %output.display(),
                duration_ms = duration_ms,
                "Protector succeeded but wrote no output"
            );
            return Err(TransformationError::MissingOutput { diagnostics });
        }

        let ai_view = naming::ai_view_path(output);
        let ai_view_path = tokio::fs::try_exists(&ai_view)
            .await
            .unwrap_or(false)
            .then_some(ai_view);

        let report_file = naming::report_path(output);
        let (report_path, report) = if tokio::fs::try_exists(&report_file).await.unwrap_or(false) {
            let report = read_report(&report_file).await;
            (Some(report_file), report)
        } else {
            (None, None)
        };

        tracing::info!(
            output = %output.display(),
            has_ai_view = ai_view_path.is_some(),
            has_report = report.is_some(),
            duration_ms = duration_ms,
            "Protection completed"
        );

        Ok(TransformationResult {
            output_path: output.to_path_buf(),
            ai_view_path,
            report_path,
            report,
            exit_code: result.status.code().unwrap_or(0),
            diagnostics,
        })
    }
}
