//! Download worker.
//!
//! Receives download jobs from the broker, fetches each URL with yt-dlp,
//! converts non-mp4 results with FFmpeg, uploads them to Telegram and replies
//! to the triggering message with the uploaded videos.

pub mod collaborators;
pub mod config;
pub mod error;
pub mod handler;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod workspace;

pub use collaborators::{Converter, Fetcher, MediaUploader, ReplyEmitter};
pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use handler::DownloadHandler;
pub use logging::JobLogger;
pub use pipeline::{JobState, Pipeline, PipelineResult};
pub use workspace::CureWorkspace;
