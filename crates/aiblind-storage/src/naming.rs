//! File naming conventions shared by the store and the protection tool contract.

use aiblind_core::ArtifactRole;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};

const AI_VIEW_SUFFIX: &str = "_ai_view";
const REPORT_SUFFIX: &str = "_report";
const MAX_EXTENSION_LEN: usize = 10;

static LAST_TIMESTAMP_MS: AtomicI64 = AtomicI64::new(0);

/// Epoch milliseconds for a generated file name.
///
/// Strictly increasing within the process: when two callers land in the same
/// millisecond the later one gets the next millisecond.
pub fn next_timestamp_millis() -> i64 {
    let now = Utc::now().timestamp_millis();
    let mut last = LAST_TIMESTAMP_MS.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST_TIMESTAMP_MS.compare_exchange_weak(
            last,
            next,
            Ordering::AcqRel,
            Ordering::Relaxed,
        ) {
            Ok(_) => return next,
            Err(actual) => last = actual,
        }
    }
}

/// Lower-cased extension of a client file name including the dot, or an empty string.
pub fn extension_of(original_filename: &str) -> String {
    Path::new(original_filename)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| {
            !e.is_empty()
                && e.len() <= MAX_EXTENSION_LEN
                && e.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}

/// `<epochMillis>-<suffix><extension>`
pub fn staged_filename(timestamp_ms: i64, suffix: u32, extension: &str) -> String {
    format!("{}-{}{}", timestamp_ms, suffix, extension)
}

/// `protected_<epochMillis>.png`
pub fn protected_output_filename(timestamp_ms: i64) -> String {
    format!("protected_{}.png", timestamp_ms)
}

/// `ai_protected_<epochMillis>.png` / `ai_view_<epochMillis>.png`
pub fn public_filename(role: ArtifactRole, timestamp_ms: i64) -> String {
    format!("{}_{}.png", role.public_prefix(), timestamp_ms)
}

/// Where the tool writes its "how AI sees it" image for a given primary output.
///
/// `_ai_view` goes in front of the last extension of the file name; the
/// directory part is never touched.
pub fn ai_view_path(output_path: &Path) -> PathBuf {
    sibling_with_suffix(output_path, AI_VIEW_SUFFIX, None)
}

/// Where the tool writes its JSON protection report for a given primary output.
pub fn report_path(output_path: &Path) -> PathBuf {
    sibling_with_suffix(output_path, REPORT_SUFFIX, Some("json"))
}

fn sibling_with_suffix(path: &Path, suffix: &str, extension: Option<&str>) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = extension
        .map(str::to_string)
        .or_else(|| path.extension().map(|e| e.to_string_lossy().into_owned()));

    let filename = match extension {
        Some(ext) => format!("{}{}.{}", stem, suffix, ext),
        None => format!("{}{}", stem, suffix),
    };
    path.with_file_name(filename)
}
