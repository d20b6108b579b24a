//! Broker handler for download jobs.

use std::time::Instant;

use anyhow::Context;
use async_trait::async_trait;

use cure_models::DownloadJob;
use cure_queue::{Disposition, Handler, FAULT_DISPOSITION};

use crate::metrics;
use crate::pipeline::Pipeline;

/// Runs every delivered [`DownloadJob`] through the pipeline.
///
/// A completed job is acked. A failed job is returned as an error, which the
/// broker adapter settles with its fault disposition.
pub struct DownloadHandler {
    pipeline: Pipeline,
}

impl DownloadHandler {
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }
}

#[async_trait]
impl Handler for DownloadHandler {
    type Message = DownloadJob;

    async fn handle(&self, job: DownloadJob) -> anyhow::Result<Disposition> {
        let started = Instant::now();
        let result = self.pipeline.run(&job).await;

        match result {
            Ok(_) => {
                metrics::record_job(Disposition::Ack, started.elapsed());
                Ok(Disposition::Ack)
            }
            Err(e) => {
                metrics::record_job(FAULT_DISPOSITION, started.elapsed());
                metrics::record_job_failure(e.kind());
                Err(e).with_context(|| {
                    format!(
                        "download job for message {} in chat {}",
                        job.reply_to_message_id, job.chat_id
                    )
                })
            }
        }
    }
}
