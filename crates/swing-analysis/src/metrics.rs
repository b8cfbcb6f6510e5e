//! Swing analysis metrics.
//!
//! Provides standardized metrics for monitoring the pipeline:
//! - Analysis outcomes by failure kind
//! - Skipped frames by detector failure reason
//! - Segmentation fallbacks and sequence anomalies
//! - Analysis latency

use metrics::{counter, histogram};

// =============================================================================
// Metric Names
// =============================================================================

/// Metric name constants for consistency.
pub mod names {
    /// Completed analyses by outcome (`ok` or a failure kind).
    pub const ANALYSES_TOTAL: &str = "swing_analyses_total";

    /// Frames dropped during extraction by reason.
    pub const FRAMES_SKIPPED_TOTAL: &str = "swing_frames_skipped_total";

    /// Frames that fell back to a full-frame mask.
    pub const SEGMENTATION_FALLBACK_TOTAL: &str = "swing_segmentation_fallback_total";

    /// Results carrying a sequence anomaly.
    pub const SEQUENCE_ANOMALIES_TOTAL: &str = "swing_sequence_anomalies_total";

    /// End-to-end analysis latency in seconds.
    pub const ANALYSIS_DURATION_SECONDS: &str = "swing_analysis_duration_seconds";
}

// =============================================================================
// Recording Functions
// =============================================================================

/// Record a finished analysis.
pub fn record_analysis(outcome: &str, duration_secs: f64) {
    counter!(
        names::ANALYSES_TOTAL,
        "outcome" => outcome.to_string()
    )
    .increment(1);

    histogram!(
        names::ANALYSIS_DURATION_SECONDS,
        "outcome" => outcome.to_string()
    )
    .record(duration_secs);
}

/// Record a frame dropped during extraction.
pub fn record_frame_skipped(reason: &'static str) {
    counter!(
        names::FRAMES_SKIPPED_TOTAL,
        "reason" => reason
    )
    .increment(1);
}

pub fn record_segmentation_fallback() {
    counter!(names::SEGMENTATION_FALLBACK_TOTAL).increment(1);
}

pub fn record_sequence_anomaly() {
    counter!(names::SEQUENCE_ANOMALIES_TOTAL).increment(1);
}

// =============================================================================
// Tests
// =============================================================================
