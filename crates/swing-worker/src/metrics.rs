//! Prometheus metrics for the worker.

use std::path::Path;

use chrono::Utc;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use swing_models::JobStatus;

use crate::error::{WorkerError, WorkerResult};

/// Metric names as constants for consistency.
pub mod names {
    pub const JOBS_TOTAL: &str = "swing_jobs_total";
    pub const JOB_DURATION_SECONDS: &str = "swing_job_duration_seconds";
}

/// Install the Prometheus recorder.
///
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> WorkerResult<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| WorkerError::Metrics(format!("failed to install Prometheus recorder: {e}")))
}

/// Record a finished job.
pub fn record_job(status: JobStatus, duration_secs: f64) {
    let status = match status {
        JobStatus::Completed => "completed",
        JobStatus::Failed => "failed",
        JobStatus::Cancelled => "cancelled",
    };
    counter!(names::JOBS_TOTAL, "status" => status).increment(1);
    histogram!(names::JOB_DURATION_SECONDS, "status" => status).record(duration_secs);
}

/// Write the current metrics in Prometheus text format.
pub async fn dump_metrics(handle: &PrometheusHandle, path: &Path) -> WorkerResult<()> {
    let snapshot = format!("# snapshot {}\n{}", Utc::now().to_rfc3339(), handle.render());
    tokio::fs::write(path, snapshot).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names() {
        assert!(names::JOBS_TOTAL.starts_with("swing_"));
        assert!(names::JOB_DURATION_SECONDS.ends_with("_seconds"));
    }

    #[test]
    fn test_record_without_recorder() {
        record_job(JobStatus::Completed, 0.5);
        record_job(JobStatus::Cancelled, 0.1);
    }
}
