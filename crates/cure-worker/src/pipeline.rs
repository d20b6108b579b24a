//! Job pipeline: fetch, normalize, upload, reply.
//!
//! One job runs start to finish inside its own [`CureWorkspace`]:
//!
//! ```text
//! Received -> Fetching -> Normalizing -> Uploading -> Replying -> Completed
//!                                                              \-> Failed
//! ```
//!
//! A URL that fails to fetch contributes no files and the job carries on.
//! Any other failure aborts the job. The reply is sent even when no URL
//! produced anything.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, Instrument};

use cure_media::{delivery_sibling, is_delivery_format};
use cure_models::DownloadJob;
use cure_telegram::FileId;

use crate::collaborators::{Converter, Fetcher, MediaUploader, ReplyEmitter};
use crate::error::{WorkerError, WorkerResult};
use crate::logging::JobLogger;
use crate::metrics;
use crate::workspace::CureWorkspace;

/// Where a job is in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Received,
    Fetching,
    Normalizing,
    Uploading,
    Replying,
    Completed,
    Failed,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Received => "received",
            JobState::Fetching => "fetching",
            JobState::Normalizing => "normalizing",
            JobState::Uploading => "uploading",
            JobState::Replying => "replying",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a job that reached the reply step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineResult {
    /// Handles sent in the reply, in URL order then file order.
    Delivered(Vec<FileId>),
    /// No URL produced a file; the reply carried an empty group.
    NothingProduced,
}

impl PipelineResult {
    pub fn handles(&self) -> &[FileId] {
        match self {
            PipelineResult::Delivered(handles) => handles,
            PipelineResult::NothingProduced => &[],
        }
    }
}

impl From<Vec<FileId>> for PipelineResult {
    fn from(handles: Vec<FileId>) -> Self {
        if handles.is_empty() {
            PipelineResult::NothingProduced
        } else {
            PipelineResult::Delivered(handles)
        }
    }
}

/// Runs download jobs against a set of collaborators.
pub struct Pipeline {
    storage_root: PathBuf,
    upload_chat_id: i64,
    fetcher: Arc<dyn Fetcher>,
    converter: Arc<dyn Converter>,
    uploader: Arc<dyn MediaUploader>,
    replier: Arc<dyn ReplyEmitter>,
}

impl Pipeline {
    /// `upload_chat_id` is the chat files are uploaded to before the reply
    /// references them.
    pub fn new(
        storage_root: impl Into<PathBuf>,
        upload_chat_id: i64,
        fetcher: Arc<dyn Fetcher>,
        converter: Arc<dyn Converter>,
        uploader: Arc<dyn MediaUploader>,
        replier: Arc<dyn ReplyEmitter>,
    ) -> Self {
        Self {
            storage_root: storage_root.into(),
            upload_chat_id,
            fetcher,
            converter,
            uploader,
            replier,
        }
    }

    /// Run one job. The job's workspace is gone when this returns.
    pub async fn run(&self, job: &DownloadJob) -> WorkerResult<PipelineResult> {
        let logger = JobLogger::new(job);
        let span = logger.create_span();
        self.run_logged(job, &logger).instrument(span).await
    }

    async fn run_logged(&self, job: &DownloadJob, logger: &JobLogger) -> WorkerResult<PipelineResult> {
        logger.log_state(JobState::Received);
        let workspace = CureWorkspace::create(&self.storage_root)?;

        let outcome = self.process(job, &workspace, logger).await;

        if let Err(e) = workspace.close() {
            logger.log_warning(&format!("Failed to remove workspace: {}", e));
        }

        match outcome {
            Ok(result) => {
                logger.log_completion(result.handles().len());
                Ok(result)
            }
            Err(e) => {
                logger.log_state(JobState::Failed);
                logger.log_error(&e.to_string());
                Err(e)
            }
        }
    }

    async fn process(
        &self,
        job: &DownloadJob,
        workspace: &CureWorkspace,
        logger: &JobLogger,
    ) -> WorkerResult<PipelineResult> {
        logger.log_state(JobState::Fetching);
        let mut fetched = Vec::new();
        for url in &job.urls {
            match self.fetch_one(url, workspace).await {
                Ok(files) => fetched.extend(files),
                Err(e) if e.is_recoverable() => {
                    metrics::record_fetch_failure();
                    logger.log_warning(&e.to_string());
                }
                Err(e) => return Err(e),
            }
        }

        logger.log_state(JobState::Normalizing);
        let mut normalized = Vec::with_capacity(fetched.len());
        for file in fetched {
            normalized.push(self.normalize(file).await?);
        }

        logger.log_state(JobState::Uploading);
        let mut handles = Vec::with_capacity(normalized.len());
        for path in &normalized {
            let handle = self
                .uploader
                .upload(self.upload_chat_id, path)
                .await
                .map_err(|source| WorkerError::Upload {
                    path: path.clone(),
                    source,
                })?;
            metrics::record_upload();
            handles.push(handle);
        }

        logger.log_state(JobState::Replying);
        if handles.is_empty() {
            logger.log_warning("No media collected, replying with an empty group");
        }
        self.replier
            .send_group(job.chat_id, job.reply_to_message_id, &handles)
            .await
            .map_err(|source| WorkerError::Send {
                chat_id: job.chat_id,
                reply_to_message_id: job.reply_to_message_id,
                source,
            })?;

        Ok(PipelineResult::from(handles))
    }

    async fn fetch_one(&self, url: &str, workspace: &CureWorkspace) -> WorkerResult<Vec<PathBuf>> {
        let dest = workspace.url_dir()?;
        let files = self
            .fetcher
            .fetch(url, &dest)
            .await
            .map_err(|source| WorkerError::Fetch {
                url: url.to_string(),
                source,
            })?;
        debug!("Fetched {} files from {}", files.len(), url);
        Ok(files)
    }

    /// Pass delivery-format files through, convert everything else to a sibling.
    async fn normalize(&self, file: PathBuf) -> WorkerResult<PathBuf> {
        if is_delivery_format(&file) {
            return Ok(file);
        }

        let output = delivery_sibling(&file);
        self.converter
            .convert(&file, &output)
            .await
            .map_err(|source| WorkerError::Conversion {
                path: file.clone(),
                source,
            })?;
        metrics::record_conversion();
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_handles_mean_nothing_produced() {
        assert_eq!(PipelineResult::from(vec![]), PipelineResult::NothingProduced);
        assert!(PipelineResult::NothingProduced.handles().is_empty());

        let result = PipelineResult::from(vec![FileId::new("a")]);
        assert_eq!(result.handles(), &[FileId::new("a")]);
    }

    #[test]
    fn test_state_names() {
        assert_eq!(JobState::Normalizing.to_string(), "normalizing");
        assert_eq!(JobState::Failed.as_str(), "failed");
    }
}
