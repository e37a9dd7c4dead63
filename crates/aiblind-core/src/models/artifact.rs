use serde::Serialize;
use std::path::PathBuf;

/// Role of a file copied into the public directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactRole {
    Protected,
    AiView,
}

impl ArtifactRole {
    /// File name prefix of the public copy (`<prefix>_<epochMillis>.png`)
    pub fn public_prefix(&self) -> &'static str {
        match self {
            ArtifactRole::Protected => "ai_protected",
            ArtifactRole::AiView => "ai_view",
        }
    }
}

impl std::fmt::Display for ArtifactRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactRole::Protected => write!(f, "protected"),
            ArtifactRole::AiView => write!(f, "ai_view"),
        }
    }
}

/// A file copied into the public directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedArtifact {
    pub role: ArtifactRole,
    pub path: PathBuf,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiRecognition {
    pub has_person: bool,
    pub message: String,
}

impl AiRecognition {
    pub const PERSON_RECOGNIZED: &'static str = "사람이 인식됨";
    pub const NO_PERSON_RECOGNIZED: &'static str = "사람이 인식되지 않음";

    pub fn new(has_person: bool) -> Self {
        let message = if has_person {
            Self::PERSON_RECOGNIZED
        } else {
            Self::NO_PERSON_RECOGNIZED
        };
        Self {
            has_person,
            message: message.to_string(),
        }
    }
}

/// URLs handed back to the client for one completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedArtifactSet {
    pub original_image: String,
    pub protected_image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_view_image: Option<String>,
    pub ai_recognition: AiRecognition,
}
