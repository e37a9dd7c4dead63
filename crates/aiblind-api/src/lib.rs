//! AI Blind API Library
//!
//! This crate provides the HTTP handlers, the conversion pipeline and
//! application setup.

pub mod constants;
mod handlers;
mod middleware;
mod utils;

// Public modules
pub mod error;
pub mod services;
pub mod setup;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use services::pipeline::{PipelineCoordinator, PipelineOutcome, PipelineStage};
pub use state::AppState;
