//! Protection report reader

use aiblind_core::ProtectionReport;
use std::path::Path;

/// Load the JSON report the tool may leave next to its output.
///
/// Returns `None` when there is no report or it cannot be parsed.
pub async fn read_report(path: &Path) -> Option<ProtectionReport> {
    let raw = match tokio::fs::read(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "Failed to read protection report");
            return None;
        }
    };

    match serde_json::from_slice::<ProtectionReport>(&raw) {
        Ok(report) => Some(report),
        Err(e) => {
            tracing::warn!(
                error = %e,
                path = %path.display(),
                "Ignoring invalid protection report"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_reads_valid_report() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("protected_1_report.json");
        std::fs::write(&path, br#"{"person_recognized": true, "faces_detected": 2}"#).unwrap();

        let report = read_report(&path).await.unwrap();
        assert!(report.person_recognized);
        assert_eq!(report.faces_detected, Some(2));
    }

    #[tokio::test]
    async fn test_faces_detected_is_optional() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("r.json");
        std::fs::write(&path, br#"{"person_recognized": false}"#).unwrap();

        let report = read_report(&path).await.unwrap();
        assert!(!report.person_recognized);
        assert_eq!(report.faces_detected, None);
    }

    #[tokio::test]
    async fn test_missing_or_invalid_report_is_none() {
        let dir = tempdir().unwrap();
        assert!(read_report(&dir.path().join("absent.json")).await.is_none());

        let path = dir.path().join("broken.json");
        std::fs::write(&path, b"person: yes").unwrap();
        assert!(read_report(&path).await.is_none());
    }
}
