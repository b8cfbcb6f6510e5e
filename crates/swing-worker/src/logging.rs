//! Structured job logging utilities.
//!
//! Tracing initialisation for the worker binaries and the per-job span.

use swing_models::{JobStatus, SwingJobId, SwingJobOutput};
use tracing::{error, field, info, info_span, warn, Span};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{WorkerError, WorkerResult};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` is honoured; `swing=info` is added on top. JSON output for
/// production, ANSI text otherwise.
pub fn init_tracing(json: bool) -> WorkerResult<()> {
    let directive = "swing=info"
        .parse()
        .map_err(|e| WorkerError::config_error(format!("invalid log directive: {e}")))?;
    let env_filter = EnvFilter::from_default_env().add_directive(directive);

    let installed = if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .try_init()
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
            .try_init()
    };
    installed.map_err(|e| WorkerError::config_error(format!("tracing already initialised: {e}")))
}

/// Lifecycle logging for one swing job.
///
/// Owns the `swing_job` span. The processor instruments its wait loop with
/// it and enters it on the blocking pool, so analysis events nest under
/// the job that caused them.
#[derive(Debug, Clone)]
pub struct SwingLogger {
    span: Span,
}

impl SwingLogger {
    pub fn new(job_id: &SwingJobId, operation: &'static str, worker_id: &str) -> Self {
        Self {
            span: info_span!(
                "swing_job",
                job_id = %job_id,
                operation,
                worker_id,
                status = field::Empty
            ),
        }
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn started(&self, frames: usize, fps: f64) {
        self.span.in_scope(|| info!(frames, fps, "Swing job started"));
    }

    pub fn cancelling(&self, cause: &str) {
        self.span.in_scope(|| warn!(cause, "Cancelling swing analysis"));
    }

    /// Log the final output and record its status on the span.
    pub fn finished(&self, output: &SwingJobOutput, elapsed_secs: f64) {
        let status = match output.status {
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        };
        self.span.record("status", status);
        let elapsed_ms = (elapsed_secs * 1000.0) as u64;

        self.span.in_scope(|| match (&output.result, &output.error) {
            (Some(result), _) => info!(
                composite = result.composite_score,
                band = result.band,
                main_leak = result.main_leak.as_str(),
                skipped_frames = output.skipped_frames,
                elapsed_ms,
                "Swing job completed"
            ),
            (None, Some(failure)) => error!(
                kind = failure.kind.as_str(),
                reason = %failure.reason,
                elapsed_ms,
                "Swing job {}", status
            ),
            (None, None) => warn!(elapsed_ms, "Swing job finished without a result"),
        });
    }
}
