//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p aiblind-api`.

pub mod fixtures;

use aiblind_api::setup::{routes, services};
use aiblind_api::AppState;
use aiblind_core::{Config, LogFormat};
use aiblind_processing::Transformer;
use aiblind_storage::{ArtifactStore, LocalArtifactStore};
use axum_test::TestServer;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Test application: server, state, and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.state.config.uploads_dir
    }

    pub fn processed_dir(&self) -> &Path {
        &self.state.config.processed_dir
    }

    /// Names of the files currently in a directory, sorted.
    pub fn files_in(&self, dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

pub fn create_test_config(root: &Path) -> Config {
    Config {
        server_port: 0,
        environment: "development".to_string(),
        cors_origins: vec!["*".to_string()],
        uploads_dir: root.join("uploads"),
        processed_dir: root.join("processed"),
        protector_program: "/bin/sh".to_string(),
        protector_args: vec![],
        cleanup_delay: Duration::from_secs(30 * 60),
        max_upload_size_bytes: 20 * 1024 * 1024,
        client_build_dir: None,
        log_format: LogFormat::Text,
    }
}

/// Write a protector stand-in script and return its path.
pub fn write_script(root: &Path, body: &str) -> PathBuf {
    let path = root.join("protector.sh");
    std::fs::write(&path, body).expect("Failed to write protector script");
    path
}

/// App whose protector runs `script` through `/bin/sh`.
pub async fn setup_test_app(script: &str) -> TestApp {
    setup_test_app_with(script, |_| {}).await
}

/// Same as `setup_test_app`, with a chance to adjust the config first.
pub async fn setup_test_app_with(script: &str, configure: impl FnOnce(&mut Config)) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let script_path = write_script(temp_dir.path(), script);

    let mut config = create_test_config(temp_dir.path());
    config.protector_args = vec![script_path.to_string_lossy().into_owned()];
    configure(&mut config);

    let state = services::initialize_services(&config)
        .await
        .expect("Failed to initialize services");
    build_test_app(config, state, temp_dir)
}

/// App with an in-process transformer instead of an external tool.
pub async fn setup_test_app_with_transformer(transformer: Arc<dyn Transformer>) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let config = create_test_config(temp_dir.path());

    let store: Arc<dyn ArtifactStore> = Arc::new(
        LocalArtifactStore::new(config.uploads_dir.clone(), config.processed_dir.clone())
            .await
            .expect("Failed to create artifact store"),
    );
    let state = services::build_state(config.clone(), store, transformer);
    build_test_app(config, state, temp_dir)
}

fn build_test_app(config: Config, state: Arc<AppState>, temp_dir: TempDir) -> TestApp {
    let router = routes::setup_routes(&config, state.clone()).expect("Failed to setup routes");
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        state,
        _temp_dir: temp_dir,
    }
}
