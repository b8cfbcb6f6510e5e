//! Worker error types.

use std::time::Duration;

use swing_analysis::AnalysisError;
use swing_models::FailureKind;
use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Job timed out after {0:?}")]
    Timeout(Duration),

    #[error("Analysis task failed: {0}")]
    TaskFailed(String),

    #[error("Metrics error: {0}")]
    Metrics(String),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn task_failed(msg: impl Into<String>) -> Self {
        Self::TaskFailed(msg.into())
    }

    /// Machine-readable kind recorded in the job output.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            WorkerError::Analysis(e) => e.kind(),
            WorkerError::Timeout(_) => FailureKind::Timeout,
            WorkerError::Json(_) => FailureKind::InvalidInput,
            WorkerError::ConfigError(_)
            | WorkerError::TaskFailed(_)
            | WorkerError::Metrics(_)
            | WorkerError::Io(_) => FailureKind::Internal,
        }
    }

    /// Human-readable reason recorded in the job output.
    pub fn reason(&self) -> String {
        match self {
            WorkerError::Analysis(e) => e.to_string(),
            other => other.to_string(),
        }
    }
}
