//! Axum route handler for the upload endpoint.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::estimate::models::{EstimateRequest, EstimateResponse, ResumeUpload};
use crate::estimate::pipeline::estimate_salary;
use crate::state::AppState;

pub const MISSING_FIELDS_MESSAGE: &str = "File or city is missing.";
const DEFAULT_MIME_TYPE: &str = "application/octet-stream";
const FALLBACK_FILE_NAME: &str = "resume";

#[derive(Default)]
struct UploadForm {
    resume: Option<ResumeUpload>,
    city: Option<String>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            let name = field.name().map(str::to_owned);
            match name.as_deref() {
                Some("resume") => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let mime_type = field
                        .content_type()
                        .unwrap_or(DEFAULT_MIME_TYPE)
                        .to_string();
                    let bytes = field.bytes().await.map_err(malformed)?;

                    // Browsers send an empty, unnamed part when no file was chosen.
                    if file_name.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    form.resume = Some(ResumeUpload {
                        file_name: if file_name.is_empty() {
                            FALLBACK_FILE_NAME.to_string()
                        } else {
                            file_name
                        },
                        mime_type,
                        bytes,
                    });
                }
                Some("city") => form.city = Some(field.text().await.map_err(malformed)?),
                _ => {}
            }
        }

        Ok(form)
    }

    /// Both fields must be present; a whitespace-only city counts as missing.
    fn into_parts(self) -> Result<(ResumeUpload, String), AppError> {
        match (self.resume, self.city) {
            (Some(resume), Some(city)) if !city.trim().is_empty() => {
                Ok((resume, city.trim().to_string()))
            }
            _ => Err(AppError::Validation(MISSING_FIELDS_MESSAGE.to_string())),
        }
    }
}

fn malformed(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge;
    }
    AppError::Validation(format!("Malformed upload: {}", e.body_text()))
}

/// POST /api/upload
///
/// Multipart form with a `resume` file and a `city` text field. Responds with
/// the model's estimate as `{ "message": ... }`.
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<EstimateResponse>, AppError> {
    let multipart = multipart.map_err(|e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::PayloadTooLarge;
        }
        AppError::Validation(format!("Expected a multipart form: {}", e.body_text()))
    })?;
    let (resume, city) = UploadForm::read(multipart).await?.into_parts()?;

    let request_id = Uuid::new_v4();
    info!(
        "Request {request_id}: estimating salary in {city} from {} ({}, {} bytes)",
        resume.file_name,
        resume.mime_type,
        resume.bytes.len()
    );

    let message = estimate_salary(
        state.gemini.as_ref(),
        &state.config.scratch_dir,
        state.poll_policy,
        EstimateRequest {
            request_id,
            resume,
            city,
        },
    )
    .await?;

    Ok(Json(EstimateResponse { message }))
}
