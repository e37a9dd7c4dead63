//! Conversion endpoint integration tests.
//!
//! Run with: `cargo test -p aiblind-api --test convert_test`
//! The protector is replaced by POSIX shell scripts.

#![cfg(unix)]

mod helpers;

use axum_test::multipart::{MultipartForm, Part};
use helpers::fixtures;
use helpers::{setup_test_app, setup_test_app_with};
use serde_json::Value;
use std::collections::HashSet;
use std::future::IntoFuture;

fn image_form(data: Vec<u8>, filename: &str, mime: &str) -> MultipartForm {
    MultipartForm::new().add_part("image", Part::bytes(data).file_name(filename).mime_type(mime))
}

#[tokio::test]
async fn test_convert_primary_output_only() {
    let app = setup_test_app(fixtures::PRIMARY_ONLY).await;
    let client = app.client();
    let jpeg = fixtures::create_test_jpeg(2 * 1024 * 1024);

    let response = client
        .post("/api/convert")
        .multipart(image_form(jpeg.clone(), "cat.jpg", "image/jpeg"))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert!(body.get("aiViewImage").is_none());
    assert_eq!(body["aiRecognition"]["hasPerson"], false);
    assert_eq!(body["aiRecognition"]["message"], "사람이 인식되지 않음");

    let original = body["originalImage"].as_str().unwrap();
    let protected = body["protectedImage"].as_str().unwrap();
    assert!(original.starts_with("/uploads/") && original.ends_with(".jpg"));
    assert!(protected.starts_with("/uploads/ai_protected_") && protected.ends_with(".png"));

    // The stand-in protector copies its input, so every artifact has the upload's bytes.
    assert_eq!(client.get(original).await.as_bytes().to_vec(), jpeg);
    assert_eq!(client.get(protected).await.as_bytes().to_vec(), jpeg);

    assert_eq!(app.files_in(app.uploads_dir()).len(), 2);
    let processed = app.files_in(app.processed_dir());
    assert_eq!(processed.len(), 1);
    assert!(processed[0].starts_with("protected_"));
    assert_eq!(app.state.cleanup.pending_count(), 1);
}

#[tokio::test]
async fn test_convert_publishes_ai_view_and_reads_report() {
    let app = setup_test_app(fixtures::WITH_AI_VIEW_AND_REPORT).await;
    let png = fixtures::create_minimal_png();

    let response = app
        .client()
        .post("/api/convert")
        .multipart(image_form(png.clone(), "me.png", "image/png"))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["aiRecognition"]["hasPerson"], true);
    assert_eq!(body["aiRecognition"]["message"], "사람이 인식됨");

    let ai_view = body["aiViewImage"].as_str().unwrap();
    assert!(ai_view.starts_with("/uploads/ai_view_"));
    assert_eq!(app.client().get(ai_view).await.as_bytes().to_vec(), png);

    let processed = app.files_in(app.processed_dir());
    assert_eq!(processed.len(), 3);
    let tool_output = processed
        .iter()
        .find(|name| !name.contains("_ai_view") && !name.contains("_report"))
        .unwrap();
    let served = app.client().get(&format!("/processed/{}", tool_output)).await;
    assert_eq!(served.status_code(), 200);
}

#[tokio::test]
async fn test_convert_tool_failure_returns_stderr_and_removes_upload() {
    let app = setup_test_app(fixtures::NO_FACE_DETECTED).await;

    let response = app
        .client()
        .post("/api/convert")
        .multipart(image_form(fixtures::create_minimal_png(), "cat.png", "image/png"))
        .await;

    assert_eq!(response.status_code(), 500);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "TRANSFORMATION_FAILED");
    assert!(body["error"].as_str().unwrap().contains("no face detected"));

    assert!(app.files_in(app.uploads_dir()).is_empty());
    assert!(app.files_in(app.processed_dir()).is_empty());
    assert_eq!(app.state.cleanup.pending_count(), 0);
}

#[tokio::test]
async fn test_convert_exit_zero_without_output_fails() {
    let app = setup_test_app(fixtures::EXIT_ZERO_WITHOUT_OUTPUT).await;

    let response = app
        .client()
        .post("/api/convert")
        .multipart(image_form(fixtures::create_minimal_png(), "cat.png", "image/png"))
        .await;

    assert_eq!(response.status_code(), 500);
    let body: Value = response.json();
    assert_eq!(body["error"], "Protected image not found");
    assert!(app.files_in(app.uploads_dir()).is_empty());
}

#[tokio::test]
async fn test_convert_without_file_is_bad_request() {
    let app = setup_test_app(fixtures::PRIMARY_ONLY).await;

    let response = app
        .client()
        .post("/api/convert")
        .multipart(MultipartForm::new().add_text("image", "not a file"))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "No file uploaded");
    assert!(app.files_in(app.uploads_dir()).is_empty());
    assert!(app.files_in(app.processed_dir()).is_empty());
}

#[tokio::test]
async fn test_convert_ignores_file_under_other_field() {
    let app = setup_test_app(fixtures::PRIMARY_ONLY).await;

    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(fixtures::create_minimal_png()).file_name("cat.png"),
    );
    let response = app.client().post("/api/convert").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    assert!(app.files_in(app.uploads_dir()).is_empty());
}

#[tokio::test]
async fn test_convert_non_multipart_body_is_bad_request() {
    let app = setup_test_app(fixtures::PRIMARY_ONLY).await;

    let response = app
        .client()
        .post("/api/convert")
        .json(&serde_json::json!({ "image": "cat.png" }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"], "No file uploaded");
}

#[tokio::test]
async fn test_concurrent_uploads_never_collide() {
    let app = setup_test_app(fixtures::WITH_AI_VIEW_AND_REPORT).await;
    let client = app.client();

    let requests = (0..10).map(|i| {
        client
            .post("/api/convert")
            .multipart(image_form(vec![i as u8; 64], "same.png", "image/png"))
            .into_future()
    });
    let responses = futures::future::join_all(requests).await;

    let mut urls = HashSet::new();
    for response in responses {
        assert_eq!(response.status_code(), 200);
        let body: Value = response.json();
        for key in ["originalImage", "protectedImage", "aiViewImage"] {
            let url = body[key].as_str().unwrap().to_string();
            assert!(urls.insert(url), "duplicate {}", key);
        }
    }

    assert_eq!(app.files_in(app.uploads_dir()).len(), 30);
    assert_eq!(app.files_in(app.processed_dir()).len(), 30);
    assert_eq!(app.state.cleanup.pending_count(), 10);
}

#[tokio::test]
async fn test_declared_oversized_upload_is_rejected() {
    let app = setup_test_app_with(fixtures::PRIMARY_ONLY, |config| {
        config.max_upload_size_bytes = 1024 * 1024;
    })
    .await;

    let response = app
        .client()
        .post("/api/convert")
        .add_header(
            http::header::CONTENT_LENGTH,
            http::HeaderValue::from_static("4194304"),
        )
        .bytes(vec![0u8; 4 * 1024 * 1024].into())
        .await;

    assert_eq!(response.status_code(), 413);
    let body: Value = response.json();
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
    assert!(app.files_in(app.uploads_dir()).is_empty());
}
