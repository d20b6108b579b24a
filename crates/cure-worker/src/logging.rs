//! Tracing setup and structured job logging.

use tracing::{error, info, warn, Span};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

use cure_models::DownloadJob;

use crate::pipeline::JobState;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the default `cure=info` filter. JSON output is meant
/// for production, coloured text for development.
pub fn init_tracing(json: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cure=info,async_nats=warn"));

    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

/// Job logger for structured logging with consistent formatting.
///
/// Every delivered job gets a fresh id so its log lines can be correlated even
/// when the same chat message is delivered twice.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: String,
    chat_id: i64,
    message_id: i64,
    url_count: usize,
}

impl JobLogger {
    pub fn new(job: &DownloadJob) -> Self {
        Self {
            job_id: Uuid::new_v4().to_string(),
            chat_id: job.chat_id,
            message_id: job.reply_to_message_id,
            url_count: job.urls.len(),
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Span carrying the job's identifying fields.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "job",
            job_id = %self.job_id,
            chat_id = self.chat_id,
            message_id = self.message_id,
            urls = self.url_count,
        )
    }

    pub fn log_state(&self, state: JobState) {
        info!(job_id = %self.job_id, state = state.as_str(), "Job state: {}", state);
    }

    pub fn log_warning(&self, message: &str) {
        warn!(job_id = %self.job_id, "Job warning: {}", message);
    }

    pub fn log_error(&self, message: &str) {
        error!(job_id = %self.job_id, "Job error: {}", message);
    }

    pub fn log_completion(&self, handles: usize) {
        info!(
            job_id = %self.job_id,
            state = JobState::Completed.as_str(),
            "Job completed: {} videos for {} URLs",
            handles,
            self.url_count
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_ids_are_unique_per_delivery() {
        let job = DownloadJob::new(1, 2, vec!["https://a".into()]);
        let a = JobLogger::new(&job);
        let b = JobLogger::new(&job);
        assert_ne!(a.job_id(), b.job_id());
    }
}
