use std::sync::Arc;

use crate::config::Config;
use crate::estimate::poller::PollPolicy;
use crate::gemini_client::GenAiService;

/// Shared application state injected into all route handlers via Axum extractors.
/// Built once in `main`; nothing in it changes per request.
#[derive(Clone)]
pub struct AppState {
    /// Remote model client. `GeminiClient` in production.
    pub gemini: Arc<dyn GenAiService>,
    pub config: Config,
    pub poll_policy: PollPolicy,
}
