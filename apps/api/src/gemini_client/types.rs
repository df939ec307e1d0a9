//! Wire types for the Gemini v1beta REST API (files + generateContent).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Processing state of a file held by the Gemini file store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileState {
    #[default]
    StateUnspecified,
    Processing,
    Active,
    Failed,
    #[serde(other)]
    Unknown,
}

impl FileState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileState::StateUnspecified => "STATE_UNSPECIFIED",
            FileState::Processing => "PROCESSING",
            FileState::Active => "ACTIVE",
            FileState::Failed => "FAILED",
            FileState::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for FileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file descriptor as returned by the upload and status endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    /// Resource name, e.g. `files/abc-123`. Used for status lookups.
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub state: FileState,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadFileResponse {
    pub file: RemoteFile,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: "user".to_string(),
            parts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    FileData {
        #[serde(rename = "fileData")]
        file_data: FileData,
    },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    pub fn file(file: &RemoteFile) -> Self {
        Part::FileData {
            file_data: FileData {
                mime_type: file.mime_type.clone(),
                file_uri: file.uri.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
    pub mime_type: String,
    pub file_uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
    pub response_mime_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest<'a> {
    pub contents: &'a [Content],
    pub generation_config: &'a GenerationConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

/// Finish reasons for which the candidate carries no usable answer.
const BLOCKED_FINISH_REASONS: &[&str] = &["SAFETY", "RECITATION"];

impl GenerateContentResponse {
    /// The finish reason of the first candidate, if the model refused to answer.
    pub fn blocked_reason(&self) -> Option<&str> {
        self.candidates
            .first()?
            .finish_reason
            .as_deref()
            .filter(|reason| BLOCKED_FINISH_REASONS.contains(reason))
    }

    /// Concatenates the text parts of the first candidate.
    /// Returns `None` when the model produced no candidate at all.
    pub fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        Some(
            candidate
                .content
                .iter()
                .flat_map(|c| c.parts.iter())
                .filter_map(|p| p.text.as_deref())
                .collect(),
        )
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiErrorEnvelope {
    pub error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiErrorBody {
    pub message: String,
}
