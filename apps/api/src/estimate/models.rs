use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The resume part of an upload request, as received from the browser.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

/// One validated submission flowing through the estimate pipeline.
#[derive(Debug, Clone)]
pub struct EstimateRequest {
    /// Keys the scratch file and tags log lines for this submission.
    pub request_id: Uuid,
    pub resume: ResumeUpload,
    pub city: String,
}

/// Response body for both success and failure of `POST /api/upload`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateResponse {
    pub message: String,
}
