//! Swing job processing.
//!
//! Each job runs on the blocking pool under a wall-clock budget. Shutdown
//! and timeout both flip the analysis cancel flag, which the pipeline
//! checks between stages.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use swing_analysis::AnalysisContext;
use swing_models::{JointSeries, SwingJob, SwingJobOutput};
use tokio::sync::watch;
use tracing::{info, Instrument};
use uuid::Uuid;

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::SwingLogger;
use crate::metrics;

/// Runs swing jobs against a shared analysis context.
pub struct SwingProcessor {
    config: WorkerConfig,
    ctx: Arc<AnalysisContext>,
    worker_id: String,
}

impl SwingProcessor {
    pub fn new(config: WorkerConfig) -> Self {
        let ctx = AnalysisContext::new(config.analysis_config());
        Self::with_context(config, ctx)
    }

    /// Use a prepared context, e.g. one carrying a pose detector.
    pub fn with_context(config: WorkerConfig, ctx: AnalysisContext) -> Self {
        Self {
            config,
            ctx: Arc::new(ctx),
            worker_id: format!("worker-{}", Uuid::new_v4()),
        }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    /// Process one job. Failures are reported in the output, never raised.
    pub async fn process(&self, job: SwingJob, mut shutdown: watch::Receiver<bool>) -> SwingJobOutput {
        let job_id = job.job_id.clone();
        let operation = if job.compare_with.is_some() { "compare" } else { "analyze" };
        let logger = SwingLogger::new(&job_id, operation, &self.worker_id);
        logger.started(job.series.len(), job.series.fps);

        let started = Instant::now();
        let (cancel_tx, cancel_rx) = watch::channel(*shutdown.borrow());
        let ctx = Arc::clone(&self.ctx);
        let include_legacy = self.config.include_legacy;
        let job_span = logger.span().clone();
        let mut task = tokio::task::spawn_blocking(move || {
            let _entered = job_span.enter();
            run_job(&ctx, &job, &cancel_rx, include_legacy)
        });

        let deadline = tokio::time::sleep(self.config.job_timeout);
        tokio::pin!(deadline);

        let outcome = async {
            let mut watching = true;
            loop {
                tokio::select! {
                    joined = &mut task => {
                        break joined
                            .map_err(|e| WorkerError::task_failed(e.to_string()))
                            .and_then(|result| result);
                    }
                    _ = &mut deadline => {
                        logger.cancelling("job timeout");
                        let _ = cancel_tx.send(true);
                        break Err(WorkerError::Timeout(self.config.job_timeout));
                    }
                    changed = shutdown.changed(), if watching => {
                        match changed {
                            Ok(()) if *shutdown.borrow() => {
                                logger.cancelling("shutdown requested");
                                let _ = cancel_tx.send(true);
                            }
                            Ok(()) => {}
                            // Sender gone; nobody can ask for shutdown any more
                            Err(_) => watching = false,
                        }
                    }
                }
            }
        }
        .instrument(logger.span().clone())
        .await;

        let output = outcome.unwrap_or_else(|e| SwingJobOutput::failed(job_id, e.failure_kind(), e.reason()));

        let elapsed = started.elapsed().as_secs_f64();
        logger.finished(&output, elapsed);
        metrics::record_job(output.status, elapsed);
        output
    }

    /// Read a job file, process it and write the output file.
    pub async fn process_file(
        &self,
        input: &Path,
        output: &Path,
        shutdown: watch::Receiver<bool>,
    ) -> WorkerResult<SwingJobOutput> {
        let raw = tokio::fs::read(input).await?;
        let job: SwingJob = serde_json::from_slice(&raw)?;

        let result = self.process(job, shutdown).await;

        tokio::fs::write(output, serde_json::to_vec_pretty(&result)?).await?;
        info!(
            path = %output.display(),
            job_id = %result.job_id,
            status = ?result.status,
            "Wrote job output"
        );
        Ok(result)
    }
}

/// Frames carrying no confident joint at all, i.e. failed detections.
fn missing_frames(series: &JointSeries) -> usize {
    series
        .frames
        .iter()
        .filter(|f| f.confident_count() == 0)
        .count()
}

fn run_job(
    ctx: &AnalysisContext,
    job: &SwingJob,
    cancel: &watch::Receiver<bool>,
    include_legacy: bool,
) -> WorkerResult<SwingJobOutput> {
    let output = match &job.compare_with {
        Some(reference) => {
            let comparison = ctx.compare(reference, &job.series, &job.options, cancel)?;
            SwingJobOutput::compared(job.job_id.clone(), comparison)
        }
        None => {
            let analysis = ctx.analyze(&job.series, &job.options, cancel)?;
            SwingJobOutput::completed(job.job_id.clone(), analysis.result)
        }
    }
    .with_skipped_frames(missing_frames(&job.series));

    Ok(if include_legacy {
        output.with_legacy_scores()
    } else {
        output
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use swing_analysis::synthetic::SyntheticSwing;
    use swing_models::{CameraAngle, FailureKind, JobStatus};

    fn idle() -> watch::Receiver<bool> {
        let (_tx, rx) = watch::channel(false);
        rx
    }

    #[tokio::test]
    async fn test_process_completes_with_legacy_scores() {
        let processor = SwingProcessor::new(WorkerConfig::default());
        let job = SwingJob::new(SyntheticSwing::default().build());

        let output = processor.process(job, idle()).await;
        assert_eq!(output.status, JobStatus::Completed);
        assert!(output.error.is_none());
        assert_eq!(output.skipped_frames, 0);

        let result = output.result.unwrap();
        assert_eq!(output.legacy_scores, Some(result.legacy_scores()));
    }

    #[tokio::test]
    async fn test_legacy_scores_can_be_disabled() {
        let config = WorkerConfig {
            include_legacy: false,
            ..WorkerConfig::default()
        };
        let output = SwingProcessor::new(config)
            .process(SwingJob::new(SyntheticSwing::default().build()), idle())
            .await;
        assert_eq!(output.status, JobStatus::Completed);
        assert!(output.legacy_scores.is_none());
    }

    #[tokio::test]
    async fn test_compare_job_with_mismatched_angles_fails() {
        let job = SwingJob::new(SyntheticSwing::default().build()).with_reference(
            SyntheticSwing::default()
                .with_camera_angle(CameraAngle::Front)
                .build(),
        );
        let output = SwingProcessor::new(WorkerConfig::default())
            .process(job, idle())
            .await;

        assert_eq!(output.status, JobStatus::Failed);
        assert_eq!(output.error.unwrap().kind, FailureKind::CameraAngleMismatch);
        assert!(output.result.is_none());
    }

    #[tokio::test]
    async fn test_compare_job_reports_deltas() {
        let job = SwingJob::new(SyntheticSwing::default().build())
            .with_reference(SyntheticSwing::default().build());
        let output = SwingProcessor::new(WorkerConfig::default())
            .process(job, idle())
            .await;

        assert_eq!(output.status, JobStatus::Completed);
        let comparison = output.comparison.unwrap();
        assert_eq!(comparison.composite_delta, 0.0);
        assert_eq!(output.result, Some(comparison.candidate));
    }

    #[tokio::test]
    async fn test_unusable_series_fails_with_insufficient_data() {
        let job = SwingJob::new(SyntheticSwing::default().with_unusable_range(0..90).build());
        let output = SwingProcessor::new(WorkerConfig::default())
            .process(job, idle())
            .await;

        assert_eq!(output.status, JobStatus::Failed);
        let failure = output.error.unwrap();
        assert_eq!(failure.kind, FailureKind::InsufficientData);
        assert!(!failure.reason.is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_cancels_job() {
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();

        let output = SwingProcessor::new(WorkerConfig::default())
            .process(SwingJob::new(SyntheticSwing::default().build()), rx)
            .await;
        assert_eq!(output.status, JobStatus::Cancelled);
        assert_eq!(output.error.unwrap().kind, FailureKind::Cancelled);
    }

    #[tokio::test]
    async fn test_process_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("job.json");
        let output = dir.path().join("output.json");

        let job = SwingJob::new(SyntheticSwing::default().build());
        let job_id = job.job_id.clone();
        tokio::fs::write(&input, serde_json::to_vec(&job).unwrap())
            .await
            .unwrap();

        let processor = SwingProcessor::new(WorkerConfig::default());
        processor.process_file(&input, &output, idle()).await.unwrap();

        let written: SwingJobOutput =
            serde_json::from_slice(&tokio::fs::read(&output).await.unwrap()).unwrap();
        assert_eq!(written.job_id, job_id);
        assert_eq!(written.status, JobStatus::Completed);
        assert!(written.result.is_some());
    }

    #[test]
    fn test_process_file_rejects_malformed_job() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("job.json");
        std::fs::write(&input, b"{\"series\": 42}").unwrap();

        let processor = SwingProcessor::new(WorkerConfig::default());
        let result = tokio_test::block_on(processor.process_file(
            &input,
            &dir.path().join("output.json"),
            idle(),
        ));
        assert!(matches!(result, Err(WorkerError::Json(_))));
    }

    #[test]
    fn test_missing_frames_counts_lost_detections() {
        let series = SyntheticSwing::default().with_unusable_range(10..14).build();
        assert_eq!(missing_frames(&series), 4);
    }
}
