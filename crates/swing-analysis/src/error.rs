//! Error types for swing analysis.

use std::time::Duration;

use swing_models::{CameraAngle, FailureKind, SeriesError};
use thiserror::Error;

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Per-frame detector failures. Recovered locally by skipping the frame.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameProcessingError {
    #[error("Pose detection timed out after {0:?}")]
    Timeout(Duration),

    #[error("Pose detector failed: {0}")]
    DetectorFailed(String),

    #[error("Pose detector returned no landmarks")]
    EmptyDetection,
}

impl FrameProcessingError {
    /// Create a detector failure error.
    pub fn detector_failed(message: impl Into<String>) -> Self {
        Self::DetectorFailed(message.into())
    }

    /// Label used for the skipped-frame metric.
    pub fn reason(&self) -> &'static str {
        match self {
            FrameProcessingError::Timeout(_) => "timeout",
            FrameProcessingError::DetectorFailed(_) => "detector_failed",
            FrameProcessingError::EmptyDetection => "empty_detection",
        }
    }
}

/// Errors that abort an analysis.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Camera angle mismatch: {baseline} vs {candidate}")]
    CameraAngleMismatch {
        baseline: CameraAngle,
        candidate: CameraAngle,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Analysis cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Frame processing failed: {0}")]
    Frame(#[from] FrameProcessingError),
}

impl AnalysisError {
    /// Create an insufficient data error.
    pub fn insufficient_data(message: impl Into<String>) -> Self {
        Self::InsufficientData(message.into())
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Machine-readable category of this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            AnalysisError::InsufficientData(_) => FailureKind::InsufficientData,
            AnalysisError::CameraAngleMismatch { .. } => FailureKind::CameraAngleMismatch,
            AnalysisError::InvalidInput(_) => FailureKind::InvalidInput,
            AnalysisError::Cancelled => FailureKind::Cancelled,
            AnalysisError::Internal(_) => FailureKind::Internal,
            AnalysisError::Frame(_) => FailureKind::FrameProcessing,
        }
    }
}

impl From<SeriesError> for AnalysisError {
    fn from(err: SeriesError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AnalysisError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            AnalysisError::insufficient_data("no frames").kind(),
            FailureKind::InsufficientData
        );
        assert_eq!(AnalysisError::Cancelled.kind(), FailureKind::Cancelled);
        assert_eq!(
            AnalysisError::from(FrameProcessingError::EmptyDetection).kind(),
            FailureKind::FrameProcessing
        );
        assert_eq!(
            AnalysisError::from(SeriesError::Empty).kind(),
            FailureKind::InvalidInput
        );
    }

    #[test]
    fn test_mismatch_message_names_both_angles() {
        let err = AnalysisError::CameraAngleMismatch {
            baseline: CameraAngle::Side,
            candidate: CameraAngle::Front,
        };
        assert_eq!(err.to_string(), "Camera angle mismatch: side vs front");
    }
}
