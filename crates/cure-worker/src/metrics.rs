//! Prometheus metrics for the worker.

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::info;

use cure_queue::Disposition;

use crate::error::{WorkerError, WorkerResult};

/// Metric names as constants for consistency.
pub mod names {
    pub const JOBS_TOTAL: &str = "cure_jobs_total";
    pub const JOB_DURATION_SECONDS: &str = "cure_job_duration_seconds";
    pub const JOB_FAILURES_TOTAL: &str = "cure_job_failures_total";
    pub const FETCH_FAILURES_TOTAL: &str = "cure_fetch_failures_total";
    pub const CONVERSIONS_TOTAL: &str = "cure_conversions_total";
    pub const UPLOADS_TOTAL: &str = "cure_uploads_total";
}

/// Serve `/metrics` on `0.0.0.0:port`.
pub fn install_exporter(port: u16) -> WorkerResult<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| WorkerError::Metrics(e.to_string()))?;
    info!("Prometheus exporter listening on {}", addr);
    Ok(())
}

/// Record a finished job.
pub fn record_job(disposition: Disposition, duration: Duration) {
    let labels = [("disposition", disposition.as_str())];
    counter!(names::JOBS_TOTAL, &labels).increment(1);
    histogram!(names::JOB_DURATION_SECONDS, &labels).record(duration.as_secs_f64());
}

/// Record a failed job by the stage that failed it.
pub fn record_job_failure(kind: &'static str) {
    counter!(names::JOB_FAILURES_TOTAL, "kind" => kind).increment(1);
}

pub fn record_fetch_failure() {
    counter!(names::FETCH_FAILURES_TOTAL).increment(1);
}

pub fn record_conversion() {
    counter!(names::CONVERSIONS_TOTAL).increment(1);
}

pub fn record_upload() {
    counter!(names::UPLOADS_TOTAL).increment(1);
}
