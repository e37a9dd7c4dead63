//! Route configuration and setup

use crate::constants::API_PREFIX;
use crate::error::ErrorResponse;
use crate::handlers;
use crate::middleware::upload_limit_middleware;
use crate::state::AppState;
use aiblind_core::Config;
use aiblind_storage::{PROCESSED_URL_PREFIX, UPLOADS_URL_PREFIX};
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let api_routes = Router::new()
        .route("/convert", post(handlers::convert::convert_image))
        .route("/health", get(handlers::health::health_check))
        .fallback(api_not_found);

    let router = Router::new()
        .nest(API_PREFIX, api_routes)
        .nest_service(UPLOADS_URL_PREFIX, ServeDir::new(&config.uploads_dir))
        .nest_service(PROCESSED_URL_PREFIX, ServeDir::new(&config.processed_dir));

    let router = match (&config.client_build_dir, config.is_production()) {
        (Some(client_dir), true) => {
            tracing::info!(client_dir = %client_dir.display(), "Serving client build");
            router.fallback_service(
                ServeDir::new(client_dir).fallback(ServeFile::new(client_dir.join("index.html"))),
            )
        }
        (_, true) => router.fallback(not_found),
        (_, false) => router.fallback(development_fallback),
    };

    let app = router
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.max_upload_size_bytes))
        .layer(axum::middleware::from_fn_with_state(
            config.max_upload_size_bytes,
            upload_limit_middleware,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state);

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        if config.is_production() {
            return Err(anyhow::anyhow!("CORS_ORIGINS cannot be '*' in production"));
        }
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(AnyOrigin)
            .allow_methods(methods)
            .allow_headers(AnyOrigin)
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(AnyOrigin)
    };
    Ok(cors)
}

async fn api_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("Not found", "NOT_FOUND")),
    )
}

async fn not_found() -> impl IntoResponse {
    StatusCode::NOT_FOUND
}

/// Outside production only the API and the artifact directories are served.
async fn development_fallback() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Invalid API request in development mode" })),
    )
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(panic = %details, "Request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("Server error", "INTERNAL_ERROR")),
    )
        .into_response()
}
