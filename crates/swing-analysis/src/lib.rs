//! Swing biomechanics analysis.
//!
//! This crate provides:
//! - Athlete segmentation by region growing from torso seeds
//! - Joint series normalization and per-frame kinematics
//! - Swing event detection (trigger, fire, contact)
//! - Kinetic chain timing and inversion detection
//! - Deterministic flow scoring with bands, leaks and coaching text
//! - A pipeline context with a serialized pose detector, progress and cancellation

pub mod config;
pub mod error;
pub mod events;
pub mod kinematics;
pub mod metrics;
pub mod normalize;
pub mod pipeline;
pub mod pose;
pub mod progress;
pub mod quality;
pub mod scoring;
pub mod segmentation;
pub mod sequence;
pub mod stats;
pub mod synthetic;

pub use config::{AnalysisConfig, EventConfig, SegmentationConfig, SequenceConfig};
pub use error::{AnalysisError, AnalysisResult, FrameProcessingError};
pub use events::{detect_events, EventDetection, EventDetector};
pub use kinematics::KinematicProfile;
pub use normalize::{measure_body_height, normalize, validate_comparable};
pub use pipeline::{AnalysisContext, ExtractedSeries, SwingAnalysis};
pub use pose::{PoseDetector, PoseDetectorHandle};
pub use progress::{AnalysisStage, ProgressCallback, ProgressEvent};
pub use quality::{assess, quality_for, QualityAssessment};
pub use scoring::{band_for, leak_severity, score, MomentumScorer};
pub use segmentation::{segment, BoundingBox, FrameBuffer, SegmentationMask, Segmenter};
pub use sequence::{compute_gaps, verify_order, Inversion, OrderingReport, SequenceAnalyzer};
