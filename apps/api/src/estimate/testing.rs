//! In-memory `GenAiService` used by the estimate and handler tests.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::config::Config;
use crate::estimate::poller::PollPolicy;
use crate::gemini_client::{
    Content, FileState, GeminiError, GenAiService, GenerationConfig, RemoteFile,
};
use crate::state::AppState;

/// What the fake saw when `upload_file` was called.
#[derive(Debug, Clone)]
pub struct SeenUpload {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub display_name: String,
}

#[derive(Default)]
struct Recorded {
    calls: Vec<&'static str>,
    uploads: Vec<SeenUpload>,
    histories: Vec<Vec<Content>>,
}

pub struct FakeGenAi {
    reply: String,
    states: Mutex<VecDeque<FileState>>,
    fail_upload: bool,
    fail_generate: bool,
    status_delay: Option<Duration>,
    recorded: Mutex<Recorded>,
}

impl FakeGenAi {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            states: Mutex::new(VecDeque::new()),
            fail_upload: false,
            fail_generate: false,
            status_delay: None,
            recorded: Mutex::new(Recorded::default()),
        }
    }

    /// States returned by successive status lookups; ACTIVE once exhausted.
    pub fn with_states(self, states: impl IntoIterator<Item = FileState>) -> Self {
        *self.states.lock().unwrap() = states.into_iter().collect();
        self
    }

    pub fn with_status_delay(mut self, delay: Duration) -> Self {
        self.status_delay = Some(delay);
        self
    }

    pub fn failing_upload(mut self) -> Self {
        self.fail_upload = true;
        self
    }

    pub fn failing_generate(mut self) -> Self {
        self.fail_generate = true;
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.recorded.lock().unwrap().calls.clone()
    }

    pub fn status_checks(&self) -> usize {
        self.calls().iter().filter(|c| **c == "get_file").count()
    }

    pub fn uploads(&self) -> Vec<SeenUpload> {
        self.recorded.lock().unwrap().uploads.clone()
    }

    pub fn histories(&self) -> Vec<Vec<Content>> {
        self.recorded.lock().unwrap().histories.clone()
    }

    fn record(&self, call: &'static str) {
        self.recorded.lock().unwrap().calls.push(call);
    }

    fn remote_file(state: FileState) -> RemoteFile {
        RemoteFile {
            name: "files/fake-123".to_string(),
            display_name: "resume.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            uri: "https://example.test/v1beta/files/fake-123".to_string(),
            state,
        }
    }
}

fn api_error(message: &str) -> GeminiError {
    GeminiError::Api {
        status: 500,
        message: message.to_string(),
    }
}

#[async_trait]
impl GenAiService for FakeGenAi {
    async fn upload_file(
        &self,
        path: &Path,
        mime_type: &str,
        display_name: &str,
    ) -> Result<RemoteFile, GeminiError> {
        self.record("upload");
        let bytes = tokio::fs::read(path).await?;
        self.recorded.lock().unwrap().uploads.push(SeenUpload {
            path: path.to_path_buf(),
            bytes,
            mime_type: mime_type.to_string(),
            display_name: display_name.to_string(),
        });

        if self.fail_upload {
            return Err(api_error("upload rejected"));
        }
        let mut file = Self::remote_file(FileState::Processing);
        file.mime_type = mime_type.to_string();
        file.display_name = display_name.to_string();
        Ok(file)
    }

    async fn get_file(&self, _name: &str) -> Result<RemoteFile, GeminiError> {
        self.record("get_file");
        if let Some(delay) = self.status_delay {
            tokio::time::sleep(delay).await;
        }
        let state = self
            .states
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(FileState::Active);
        Ok(Self::remote_file(state))
    }

    async fn generate(
        &self,
        contents: &[Content],
        _config: &GenerationConfig,
    ) -> Result<String, GeminiError> {
        self.record("generate");
        self.recorded
            .lock()
            .unwrap()
            .histories
            .push(contents.to_vec());

        if self.fail_generate {
            return Err(api_error("model overloaded"));
        }
        Ok(self.reply.clone())
    }
}

pub fn test_config(scratch_dir: &Path) -> Config {
    Config {
        gemini_api_key: "test-key".to_string(),
        gemini_api_base: "http://127.0.0.1:0".to_string(),
        port: 0,
        rust_log: "debug".to_string(),
        scratch_dir: scratch_dir.to_path_buf(),
        poll_interval_secs: 10,
        poll_max_attempts: 60,
        poll_timeout_secs: 600,
        max_upload_bytes: 1024 * 1024,
    }
}

/// Fast poll policy so tests driven by real time stay quick.
pub fn fast_poll_policy() -> PollPolicy {
    PollPolicy {
        interval: Duration::from_millis(5),
        max_attempts: 5,
        timeout: Duration::from_secs(5),
    }
}

pub fn test_state(fake: Arc<FakeGenAi>, scratch_dir: &Path) -> AppState {
    AppState {
        gemini: fake,
        config: test_config(scratch_dir),
        poll_policy: fast_poll_policy(),
    }
}
