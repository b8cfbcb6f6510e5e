//! Configuration for the swing analysis pipeline.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Region-growing thresholds for the frame segmenter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationConfig {
    /// Max sum of absolute RGB differences between neighbours (default: 67)
    pub color_threshold: u32,

    /// Max Sobel magnitude a pixel may have to be annexed (default: 120.0)
    pub edge_threshold: f32,

    /// Cap on grown pixels as a fraction of the frame (default: 0.10)
    pub max_region_fraction: f64,

    /// Absolute cap on grown pixels (default: 20000)
    pub max_region_pixels: usize,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            color_threshold: 67,
            edge_threshold: 120.0,
            max_region_fraction: 0.10,
            max_region_pixels: 20_000,
        }
    }
}

impl SegmentationConfig {
    /// Pixel budget for a frame of the given area.
    pub fn region_cap(&self, area: usize) -> usize {
        let fractional = (area as f64 * self.max_region_fraction) as usize;
        fractional.min(self.max_region_pixels).max(1)
    }
}

/// Event detection tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventConfig {
    /// Velocity at or below this fraction of the peak counts as quiet (default: 0.2)
    pub quiet_fraction: f64,

    /// Minimum size of a coil bump relative to the forward peak (default: 0.1)
    pub coil_fraction: f64,

    /// Half-width of the window checked for usable frames around each event (default: 3)
    pub event_window_frames: usize,

    /// Usable frames a window needs before it counts as sparse (default: 2)
    pub min_event_window_usable: usize,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            quiet_fraction: 0.2,
            coil_fraction: 0.1,
            event_window_frames: 3,
            min_event_window_usable: 2,
        }
    }
}

/// Kinematic sequence tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceConfig {
    /// Fraction of a link's peak velocity that marks its onset (default: 0.3)
    pub onset_fraction: f64,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            onset_fraction: 0.3,
        }
    }
}

/// Configuration for a full analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub segmentation: SegmentationConfig,
    pub events: EventConfig,
    pub sequence: SequenceConfig,

    /// Per-frame budget for a pose detector call (default: 500ms)
    pub detector_timeout: Duration,

    /// Body height after normalization (default: 1.0)
    pub canonical_height: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            segmentation: SegmentationConfig::default(),
            events: EventConfig::default(),
            sequence: SequenceConfig::default(),
            detector_timeout: Duration::from_millis(500),
            canonical_height: 1.0,
        }
    }
}

impl AnalysisConfig {
    pub fn with_detector_timeout(mut self, timeout: Duration) -> Self {
        self.detector_timeout = timeout;
        self
    }

    pub fn with_canonical_height(mut self, height: f64) -> Self {
        self.canonical_height = height;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_cap() {
        let config = SegmentationConfig::default();
        assert_eq!(config.region_cap(100 * 100), 1_000);
        assert_eq!(config.region_cap(1920 * 1080), 20_000);
        assert_eq!(config.region_cap(0), 1);
    }

    #[test]
    fn test_config_roundtrips_through_json() {
        let config = AnalysisConfig::default().with_canonical_height(2.0);
        let json = serde_json::to_string(&config).unwrap();
        let back: AnalysisConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
