//! Shared data models for swing analysis.
//!
//! This crate provides Serde-serializable types for:
//! - Body landmarks, frames and joint series
//! - Call-time scoring options
//! - Swing events, chain timing and flow scores
//! - The momentum transfer result and its legacy projection
//! - Batch job envelopes

pub mod job;
pub mod joint;
pub mod options;
pub mod result;
pub mod series;

// Re-export common types
pub use job::{FailureKind, JobFailure, JobStatus, SwingJob, SwingJobId, SwingJobOutput};
pub use joint::{Joint, JointId, CONFIDENCE_FLOOR, LANDMARK_COUNT};
pub use options::{PlayerLevel, PlayerLevelParseError, ScoringOptions};
pub use result::{
    AnalysisFlags, BandLabel, ChainLink, ContactSource, DataQuality, FlowScore, LeakSeverity,
    LegacyScores, MainLeak, MomentumTransferResult, SegmentGaps, SubScores, SwingComparison,
    SwingEvents, Timing,
};
pub use series::{
    CameraAngle, CameraAngleParseError, Frame, JointSeries, SeriesError, MAX_DURATION_SECS, MAX_FPS,
    MIN_CONFIDENT_JOINTS, MIN_FPS,
};
