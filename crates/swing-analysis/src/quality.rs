//! Data quality assessment.
//!
//! Quality describes how much of the series carries usable pose data. It
//! never alters scores, only the confidence reported alongside them.

use serde::{Deserialize, Serialize};
use swing_models::{DataQuality, JointSeries};

const LOW_BELOW: f64 = 0.5;
const MEDIUM_BELOW: f64 = 0.85;

/// Usable-frame coverage of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityAssessment {
    /// Usable frames over total frames
    pub confidence: f64,
    pub data_quality: DataQuality,
    pub usable_frames: usize,
    pub total_frames: usize,
}

/// Quality bucket for a confidence value.
pub fn quality_for(confidence: f64) -> DataQuality {
    if confidence < LOW_BELOW {
        DataQuality::Low
    } else if confidence < MEDIUM_BELOW {
        DataQuality::Medium
    } else {
        DataQuality::High
    }
}

/// Assess how much of a series is usable.
pub fn assess(series: &JointSeries) -> QualityAssessment {
    let total_frames = series.len();
    let usable_frames = series.usable_count();
    let confidence = if total_frames == 0 {
        0.0
    } else {
        usable_frames as f64 / total_frames as f64
    };
    QualityAssessment {
        confidence,
        data_quality: quality_for(confidence),
        usable_frames,
        total_frames,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::SyntheticSwing;

    #[test]
    fn test_quality_buckets() {
        assert_eq!(quality_for(0.0), DataQuality::Low);
        assert_eq!(quality_for(0.49), DataQuality::Low);
        assert_eq!(quality_for(0.5), DataQuality::Medium);
        assert_eq!(quality_for(0.84), DataQuality::Medium);
        assert_eq!(quality_for(0.85), DataQuality::High);
        assert_eq!(quality_for(1.0), DataQuality::High);
    }

    #[test]
    fn test_half_usable_is_medium() {
        let series = SyntheticSwing::default().with_unusable_range(0..45).build();
        let assessment = assess(&series);
        assert_eq!(assessment.usable_frames, 45);
        assert_eq!(assessment.total_frames, 90);
        assert_eq!(assessment.confidence, 0.5);
        assert_eq!(assessment.data_quality, DataQuality::Medium);
    }

    #[test]
    fn test_empty_series_is_low() {
        let mut series = SyntheticSwing::default().build();
        series.frames.clear();
        let assessment = assess(&series);
        assert_eq!(assessment.confidence, 0.0);
        assert_eq!(assessment.data_quality, DataQuality::Low);
    }
}
