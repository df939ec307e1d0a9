use std::path::Path;

use tracing::info;

use crate::estimate::models::EstimateRequest;
use crate::estimate::poller::{wait_for_active, PollPolicy};
use crate::estimate::prompts::{build_history, salary_generation_config};
use crate::estimate::scratch::ScratchFile;
use crate::estimate::EstimateError;
use crate::gemini_client::GenAiService;

/// Runs one submission end to end and returns the model's text verbatim.
///
/// 1. Stage the resume in a request-scoped scratch file
/// 2. Upload it to the Gemini file store
/// 3. Poll until the file is ACTIVE
/// 4. Ask the model for an estimate referencing the file and the city
///
/// The scratch file is removed when this function returns, whichever way it returns.
pub async fn estimate_salary(
    service: &dyn GenAiService,
    scratch_dir: &Path,
    poll_policy: PollPolicy,
    request: EstimateRequest,
) -> Result<String, EstimateError> {
    let EstimateRequest {
        request_id,
        resume,
        city,
    } = request;

    let scratch = ScratchFile::persist(scratch_dir, request_id, &resume.file_name, resume.bytes)
        .await
        .map_err(EstimateError::Scratch)?;

    let uploaded = service
        .upload_file(scratch.path(), &resume.mime_type, &resume.file_name)
        .await?;

    wait_for_active(service, &uploaded.name, poll_policy).await?;

    let history = build_history(&city, &uploaded);
    let message = service
        .generate(&history, &salary_generation_config())
        .await?;

    info!(
        "Estimate for request {request_id} complete ({} chars)",
        message.len()
    );
    Ok(message)
}
