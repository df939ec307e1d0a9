//! Salary estimate workflow: stage the resume, hand it to Gemini, wait for it to
//! become ACTIVE, ask for an estimate.

pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod poller;
pub mod prompts;
pub mod scratch;

#[cfg(test)]
pub(crate) mod testing;

use std::time::Duration;

use thiserror::Error;

use crate::gemini_client::{FileState, GeminiError};

#[derive(Debug, Error)]
pub enum EstimateError {
    #[error("Failed to stage upload in scratch storage: {0}")]
    Scratch(#[source] std::io::Error),

    #[error("Gemini request failed: {0}")]
    Gemini(#[from] GeminiError),

    #[error("File {name} failed to process (state: {state})")]
    ProcessingFailed { name: String, state: FileState },

    #[error("File {name} still processing after {attempts} status checks ({elapsed:?})")]
    PollTimeout {
        name: String,
        attempts: u32,
        elapsed: Duration,
    },
}
