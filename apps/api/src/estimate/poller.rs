//! Readiness poll: wait for an uploaded file to leave PROCESSING.
//!
//! Gemini processes uploads asynchronously. We look the file up at a fixed
//! interval until it becomes ACTIVE, fails, or the poll runs out of attempts or
//! time. The deadline also bounds each individual status lookup.

use std::time::Duration;

use tokio::time::{sleep, timeout_at, Instant};
use tracing::{debug, info};

use crate::config::Config;
use crate::estimate::EstimateError;
use crate::gemini_client::{FileState, GenAiService, RemoteFile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_attempts: 60,
            timeout: Duration::from_secs(600),
        }
    }
}

impl PollPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            interval: Duration::from_secs(config.poll_interval_secs),
            max_attempts: config.poll_max_attempts.max(1),
            timeout: Duration::from_secs(config.poll_timeout_secs),
        }
    }
}

pub async fn wait_for_active(
    service: &dyn GenAiService,
    name: &str,
    policy: PollPolicy,
) -> Result<RemoteFile, EstimateError> {
    let started = Instant::now();
    // A timeout too large to represent means the poll has no deadline.
    let deadline = started.checked_add(policy.timeout);
    let max_attempts = policy.max_attempts.max(1);
    let mut attempts = 0;

    info!("Waiting for file {name} to finish processing...");

    loop {
        let timed_out = |attempts| EstimateError::PollTimeout {
            name: name.to_string(),
            attempts,
            elapsed: started.elapsed(),
        };

        let lookup = service.get_file(name);
        let file = match deadline {
            Some(deadline) => timeout_at(deadline, lookup)
                .await
                .map_err(|_| timed_out(attempts))??,
            None => lookup.await?,
        };
        attempts += 1;

        match file.state {
            FileState::Active => {
                info!("File {name} ready after {attempts} status check(s)");
                return Ok(file);
            }
            FileState::Processing => {}
            state => {
                return Err(EstimateError::ProcessingFailed {
                    name: name.to_string(),
                    state,
                })
            }
        }

        let next_check_overruns = deadline.is_some_and(|deadline| {
            Instant::now()
                .checked_add(policy.interval)
                .map_or(true, |next| next > deadline)
        });
        if attempts >= max_attempts || next_check_overruns {
            return Err(timed_out(attempts));
        }

        debug!("File {name} still processing (check {attempts}/{max_attempts})");
        sleep(policy.interval).await;
    }
}
