use crate::gemini_client::{Content, GenerationConfig, Part, RemoteFile};

/// Opening instruction. `{city}` is substituted with the user's city.
pub const SALARY_ESTIMATE_PROMPT: &str = "I will provide my resume. \
    Can you estimate my potential salary based on my skill set for jobs in {city}?";

/// Caption sent alongside the uploaded resume.
pub const RESUME_CAPTION: &str = "Here is my resume.";

/// Builds the conversation sent to the model: the instruction turn, the resume
/// turn, then an empty follow-up that asks the model to reply.
pub fn build_history(city: &str, resume: &RemoteFile) -> Vec<Content> {
    vec![
        Content::user(vec![Part::text(
            SALARY_ESTIMATE_PROMPT.replace("{city}", city),
        )]),
        Content::user(vec![Part::file(resume), Part::text(RESUME_CAPTION)]),
        Content::user(vec![Part::text("")]),
    ]
}

pub fn salary_generation_config() -> GenerationConfig {
    GenerationConfig {
        temperature: 1.0,
        top_p: 0.95,
        top_k: 40,
        max_output_tokens: 8192,
        response_mime_type: "text/plain".to_string(),
    }
}
