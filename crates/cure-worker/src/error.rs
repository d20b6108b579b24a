//! Worker error types.

use std::path::PathBuf;

use thiserror::Error;

use cure_media::MediaError;
use cure_telegram::TelegramError;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Workspace error: {0}")]
    Workspace(#[source] std::io::Error),

    /// Recoverable: the pipeline skips the URL and carries on.
    #[error("Fetching {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: MediaError,
    },

    #[error("Converting {} failed: {source}", path.display())]
    Conversion {
        path: PathBuf,
        #[source]
        source: MediaError,
    },

    #[error("Uploading {} failed: {source}", path.display())]
    Upload {
        path: PathBuf,
        #[source]
        source: TelegramError,
    },

    #[error("Replying to message {reply_to_message_id} in chat {chat_id} failed: {source}")]
    Send {
        chat_id: i64,
        reply_to_message_id: i64,
        #[source]
        source: TelegramError,
    },

    #[error("Metrics exporter error: {0}")]
    Metrics(String),
}

impl WorkerError {
    /// Only fetch failures are recovered inside a job; everything else fails it.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, WorkerError::Fetch { .. })
    }

    /// Short label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            WorkerError::Workspace(_) => "workspace",
            WorkerError::Fetch { .. } => "fetch",
            WorkerError::Conversion { .. } => "conversion",
            WorkerError::Upload { .. } => "upload",
            WorkerError::Send { .. } => "send",
            WorkerError::Metrics(_) => "metrics",
        }
    }
}
