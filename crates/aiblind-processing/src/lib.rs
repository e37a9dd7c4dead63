//! AI Blind Processing Library
//!
//! Runs the external image-protection tool as a child process and turns its
//! exit status and files into a `TransformationResult`.

pub mod protector;
pub mod report;
pub mod traits;

// Re-export commonly used types
pub use protector::ProtectionTool;
pub use traits::{TransformationError, Transformer};
