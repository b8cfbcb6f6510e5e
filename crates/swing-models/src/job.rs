//! Batch job envelope for swing analysis.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::{JointSeries, LegacyScores, MomentumTransferResult, ScoringOptions, SwingComparison};

/// Unique identifier for a swing job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct SwingJobId(pub String);

impl SwingJobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SwingJobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SwingJobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One swing to score, optionally against a reference swing.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SwingJob {
    #[serde(default)]
    pub job_id: SwingJobId,
    pub series: JointSeries,
    #[serde(default)]
    pub options: ScoringOptions,
    /// Reference swing; must share the camera angle of `series`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_with: Option<JointSeries>,
}

impl SwingJob {
    pub fn new(series: JointSeries) -> Self {
        Self {
            job_id: SwingJobId::new(),
            series,
            options: ScoringOptions::default(),
            compare_with: None,
        }
    }

    pub fn with_options(mut self, options: ScoringOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_reference(mut self, reference: JointSeries) -> Self {
        self.compare_with = Some(reference);
        self
    }
}

/// Final state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Completed,
    Failed,
    Cancelled,
}

/// Machine-readable failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InsufficientData,
    CameraAngleMismatch,
    InvalidInput,
    FrameProcessing,
    Cancelled,
    Timeout,
    Internal,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::InsufficientData => "insufficient_data",
            FailureKind::CameraAngleMismatch => "camera_angle_mismatch",
            FailureKind::InvalidInput => "invalid_input",
            FailureKind::FrameProcessing => "frame_processing",
            FailureKind::Cancelled => "cancelled",
            FailureKind::Timeout => "timeout",
            FailureKind::Internal => "internal",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured failure: a kind for machines, a reason for people.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct JobFailure {
    pub kind: FailureKind,
    pub reason: String,
}

/// What a job run produced.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SwingJobOutput {
    pub job_id: SwingJobId,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<MomentumTransferResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison: Option<SwingComparison>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_scores: Option<LegacyScores>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JobFailure>,
    /// Frames whose pose detection failed during extraction.
    #[serde(default)]
    pub skipped_frames: usize,
    pub completed_at: DateTime<Utc>,
}

impl SwingJobOutput {
    pub fn completed(job_id: SwingJobId, result: MomentumTransferResult) -> Self {
        Self {
            job_id,
            status: JobStatus::Completed,
            result: Some(result),
            comparison: None,
            legacy_scores: None,
            error: None,
            skipped_frames: 0,
            completed_at: Utc::now(),
        }
    }

    pub fn compared(job_id: SwingJobId, comparison: SwingComparison) -> Self {
        Self {
            job_id,
            status: JobStatus::Completed,
            result: Some(comparison.candidate.clone()),
            comparison: Some(comparison),
            legacy_scores: None,
            error: None,
            skipped_frames: 0,
            completed_at: Utc::now(),
        }
    }

    pub fn failed(job_id: SwingJobId, kind: FailureKind, reason: impl Into<String>) -> Self {
        let status = if kind == FailureKind::Cancelled {
            JobStatus::Cancelled
        } else {
            JobStatus::Failed
        };
        Self {
            job_id,
            status,
            result: None,
            comparison: None,
            legacy_scores: None,
            error: Some(JobFailure {
                kind,
                reason: reason.into(),
            }),
            skipped_frames: 0,
            completed_at: Utc::now(),
        }
    }

    pub fn with_skipped_frames(mut self, skipped: usize) -> Self {
        self.skipped_frames = skipped;
        self
    }

    /// Attach the legacy score projection of the result, if any.
    pub fn with_legacy_scores(mut self) -> Self {
        self.legacy_scores = self.result.as_ref().map(|r| r.legacy_scores());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_id_unique() {
        assert_ne!(SwingJobId::new(), SwingJobId::new());
        assert_eq!(SwingJobId::from_string("abc").to_string(), "abc");
    }

    #[test]
    fn test_failed_output_shape() {
        let out = SwingJobOutput::failed(
            SwingJobId::from_string("j1"),
            FailureKind::InsufficientData,
            "no usable frames",
        );
        assert_eq!(out.status, JobStatus::Failed);
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["error"]["kind"], "insufficient_data");
        assert!(json.get("result").is_none());

        let cancelled = SwingJobOutput::failed(SwingJobId::new(), FailureKind::Cancelled, "stop");
        assert_eq!(cancelled.status, JobStatus::Cancelled);
    }
}
