//! Test fixtures: image bytes and stand-in protector scripts.

/// Minimal valid 1x1 PNG bytes.
pub fn create_minimal_png() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00, 0x00, 0x90,
        0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, 0x54, 0x08, 0xD7, 0x63, 0xF8,
        0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x18, 0xDD, 0x8D, 0x89, 0x00, 0x00, 0x00,
        0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ]
}

/// JPEG-looking bytes large enough to span several multipart chunks.
pub fn create_test_jpeg(size: usize) -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0];
    data.extend((0..size.saturating_sub(6)).map(|i| (i % 251) as u8));
    data.extend([0xFF, 0xD9]);
    data
}

/// Writes the primary output only.
pub const PRIMARY_ONLY: &str = r#"cp "$1" "$2"
"#;

/// Writes primary output, AI view and a report saying a person is still recognized.
pub const WITH_AI_VIEW_AND_REPORT: &str = r#"cp "$1" "$2"
cp "$1" "${2%.png}_ai_view.png"
printf '{"person_recognized": true, "faces_detected": 1}' > "${2%.png}_report.json"
"#;

/// Fails the way the protector does on an image without faces.
pub const NO_FACE_DETECTED: &str = r#"echo 'no face detected' >&2
exit 1
"#;

/// Claims success without writing anything.
pub const EXIT_ZERO_WITHOUT_OUTPUT: &str = "exit 0\n";
