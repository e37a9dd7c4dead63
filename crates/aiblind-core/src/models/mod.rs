//! Data models for the application
//!
//! Each sub-module covers one stage of a conversion run: the staged upload,
//! the tool's result, the published artifacts and the deferred cleanup.

mod artifact;
mod cleanup;
mod transformation;
mod upload;

pub use artifact::*;
pub use cleanup::*;
pub use transformation::*;
pub use upload::*;
