//! Gemini client — the single point of entry for all calls to the Google Generative AI API.
//!
//! ARCHITECTURAL RULE: No other module may call the Gemini API directly.
//! Handlers reach it through the `GenAiService` trait carried in `AppState`.
//!
//! Model: gemini-1.5-pro (hardcoded — do not make configurable to prevent drift)
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};

pub mod types;

pub use types::{Content, FileState, GenerationConfig, Part, RemoteFile};

use types::{GenerateContentRequest, GenerateContentResponse, GeminiErrorEnvelope, UploadFileResponse};

/// The model used for every generation call.
pub const MODEL: &str = "gemini-1.5-pro";
const API_KEY_HEADER: &str = "x-goog-api-key";
const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to read upload source: {0}")]
    Io(#[from] std::io::Error),

    #[error("Upload session was not opened: response had no upload URL")]
    MissingUploadUrl,

    #[error("Gemini returned no candidates")]
    EmptyContent,

    #[error("Gemini withheld the response (finish reason: {reason})")]
    Blocked { reason: String },
}

/// The remote operations the estimate workflow depends on.
///
/// Carried in `AppState` as `Arc<dyn GenAiService>`; `GeminiClient` is the
/// production implementation.
#[async_trait]
pub trait GenAiService: Send + Sync {
    /// Uploads the file at `path` to the remote file store.
    async fn upload_file(
        &self,
        path: &Path,
        mime_type: &str,
        display_name: &str,
    ) -> Result<RemoteFile, GeminiError>;

    /// Looks up the current descriptor (and processing state) of an uploaded file.
    async fn get_file(&self, name: &str) -> Result<RemoteFile, GeminiError>;

    /// Runs a single generateContent call and returns the response text verbatim.
    async fn generate(
        &self,
        contents: &[Content],
        config: &GenerationConfig,
    ) -> Result<String, GeminiError>;
}

/// Thin wrapper over the Gemini REST API. Built once at startup and shared.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String, base_url: &str) -> Result<Self, GeminiError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl GenAiService for GeminiClient {
    /// Two-step resumable upload: open a session, then send the bytes and finalize.
    async fn upload_file(
        &self,
        path: &Path,
        mime_type: &str,
        display_name: &str,
    ) -> Result<RemoteFile, GeminiError> {
        let bytes = tokio::fs::read(path).await?;

        let start = self
            .client
            .post(format!("{}/upload/v1beta/files", self.base_url))
            .header(API_KEY_HEADER, &self.api_key)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", bytes.len().to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&json!({ "file": { "display_name": display_name } }))
            .send()
            .await?;
        let start = ensure_success(start).await?;

        let upload_url = start
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(GeminiError::MissingUploadUrl)?
            .to_string();

        let finish = self
            .client
            .post(upload_url)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(bytes)
            .send()
            .await?;
        let uploaded: UploadFileResponse = ensure_success(finish).await?.json().await?;

        info!(
            "Uploaded file {} as: {}",
            uploaded.file.display_name, uploaded.file.name
        );
        Ok(uploaded.file)
    }

    async fn get_file(&self, name: &str) -> Result<RemoteFile, GeminiError> {
        let response = self
            .client
            .get(format!("{}/v1beta/{}", self.base_url, name))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        Ok(ensure_success(response).await?.json().await?)
    }

    async fn generate(
        &self,
        contents: &[Content],
        config: &GenerationConfig,
    ) -> Result<String, GeminiError> {
        let request_body = GenerateContentRequest {
            contents,
            generation_config: config,
        };

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, MODEL
            ))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let response: GenerateContentResponse = ensure_success(response).await?.json().await?;

        if let Some(usage) = &response.usage_metadata {
            debug!(
                "Gemini call succeeded: prompt_tokens={}, candidate_tokens={}, finish_reason={:?}",
                usage.prompt_token_count,
                usage.candidates_token_count,
                response
                    .candidates
                    .first()
                    .and_then(|c| c.finish_reason.as_deref())
            );
        }

        if let Some(reason) = response.blocked_reason() {
            return Err(GeminiError::Blocked {
                reason: reason.to_string(),
            });
        }

        response.text().ok_or(GeminiError::EmptyContent)
    }
}

/// Turns a non-2xx response into `GeminiError::Api`, preferring the message
/// from Gemini's JSON error envelope over the raw body.
async fn ensure_success(response: Response) -> Result<Response, GeminiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<GeminiErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    Err(GeminiError::Api {
        status: status.as_u16(),
        message,
    })
}
