//! Route prefixes and form field names shared by handlers and route setup.

pub const API_PREFIX: &str = "/api";

/// Multipart field carrying the image to protect
pub const IMAGE_FIELD: &str = "image";
