//! Per-frame joint sequences.
//!
//! A `JointSeries` is produced once per recorded swing by the upstream
//! detector and is read-only input to the analysis pipeline.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::joint::{Joint, JointId, LANDMARK_COUNT};

/// Minimum confidently tracked joints for a frame to be usable.
pub const MIN_CONFIDENT_JOINTS: usize = 11;

/// Accepted capture frame rate range.
pub const MIN_FPS: f64 = 24.0;
pub const MAX_FPS: f64 = 120.0;

/// Longest accepted series, in seconds of source video.
pub const MAX_DURATION_SECS: f64 = 60.0;

/// Camera position relative to the athlete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum CameraAngle {
    #[default]
    Side,
    Front,
    Back,
    Overhead,
}

impl CameraAngle {
    pub fn as_str(&self) -> &'static str {
        match self {
            CameraAngle::Side => "side",
            CameraAngle::Front => "front",
            CameraAngle::Back => "back",
            CameraAngle::Overhead => "overhead",
        }
    }
}

impl fmt::Display for CameraAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CameraAngle {
    type Err = CameraAngleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "side" => Ok(CameraAngle::Side),
            "front" => Ok(CameraAngle::Front),
            "back" | "rear" => Ok(CameraAngle::Back),
            "overhead" | "top" => Ok(CameraAngle::Overhead),
            _ => Err(CameraAngleParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown camera angle: {0}")]
pub struct CameraAngleParseError(String);

/// One captured frame of landmarks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    /// Source frame number
    pub index: u32,
    /// Presentation timestamp in milliseconds
    pub timestamp_ms: f64,
    /// Landmarks in topology order, `LANDMARK_COUNT` entries
    pub joints: Vec<Joint>,
}

impl Frame {
    pub fn new(index: u32, timestamp_ms: f64, joints: Vec<Joint>) -> Self {
        Self {
            index,
            timestamp_ms,
            joints,
        }
    }

    /// A frame whose pose could not be detected.
    ///
    /// Keeps the timeline intact; it counts toward totals but is never usable.
    pub fn missing(index: u32, timestamp_ms: f64) -> Self {
        Self::new(
            index,
            timestamp_ms,
            JointId::ALL.iter().map(|id| Joint::missing(*id)).collect(),
        )
    }

    /// Landmark lookup by id.
    pub fn joint(&self, id: JointId) -> Option<&Joint> {
        self.joints.get(id.index()).filter(|j| j.id == id)
    }

    /// Landmark lookup that only returns confidently tracked joints.
    pub fn confident_joint(&self, id: JointId) -> Option<&Joint> {
        self.joint(id).filter(|j| j.is_confident())
    }

    /// Number of confidently tracked joints.
    pub fn confident_count(&self) -> usize {
        self.joints.iter().filter(|j| j.is_confident()).count()
    }

    /// Whether this frame carries usable pose data.
    pub fn is_usable(&self) -> bool {
        self.confident_count() >= MIN_CONFIDENT_JOINTS
            && JointId::CHAIN
                .iter()
                .all(|id| self.confident_joint(*id).is_some())
    }
}

/// Errors raised when a series breaks its structural invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("Series has no frames")]
    Empty,

    #[error("Frame rate {0} outside supported range 24-120")]
    FpsOutOfRange(f64),

    #[error("Series lasts {0:.1}s, longer than 60s")]
    TooLong(f64),

    #[error("Frame at position {position} is not after its predecessor")]
    NotMonotonic { position: usize },

    #[error("Frame at position {position} has {found} joints, expected 33")]
    JointCount { position: usize, found: usize },

    #[error("Frame at position {position} has joint {found} where {expected} belongs")]
    JointOrder {
        position: usize,
        expected: JointId,
        found: JointId,
    },

    #[error("Impact frame {index} is outside a series of {len} frames")]
    ImpactOutOfRange { index: usize, len: usize },
}

/// Ordered landmark sequence for one swing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JointSeries {
    pub frames: Vec<Frame>,
    pub fps: f64,
    #[serde(default)]
    pub camera_angle: CameraAngle,
    /// Position in `frames` of ball contact, when the capture already knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact_frame_index: Option<usize>,
}

impl JointSeries {
    pub fn new(frames: Vec<Frame>, fps: f64, camera_angle: CameraAngle) -> Self {
        Self {
            frames,
            fps,
            camera_angle,
            impact_frame_index: None,
        }
    }

    /// Set the known impact frame.
    pub fn with_impact_frame(mut self, index: usize) -> Self {
        self.impact_frame_index = Some(index);
        self
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Duration implied by frame count and rate.
    pub fn duration_secs(&self) -> f64 {
        if self.fps > 0.0 {
            self.frames.len() as f64 / self.fps
        } else {
            0.0
        }
    }

    /// Convert a span of frames to milliseconds.
    pub fn frames_to_ms(&self, frames: f64) -> f64 {
        frames / self.fps * 1000.0
    }

    /// Number of frames with usable pose data.
    pub fn usable_count(&self) -> usize {
        self.frames.iter().filter(|f| f.is_usable()).count()
    }

    /// Check the structural invariants of the series.
    pub fn validate(&self) -> Result<(), SeriesError> {
        if self.frames.is_empty() {
            return Err(SeriesError::Empty);
        }
        if !(MIN_FPS..=MAX_FPS).contains(&self.fps) {
            return Err(SeriesError::FpsOutOfRange(self.fps));
        }
        let duration = self.duration_secs();
        if duration > MAX_DURATION_SECS {
            return Err(SeriesError::TooLong(duration));
        }

        for (position, frame) in self.frames.iter().enumerate() {
            if frame.joints.len() != LANDMARK_COUNT {
                return Err(SeriesError::JointCount {
                    position,
                    found: frame.joints.len(),
                });
            }
            for (slot, joint) in frame.joints.iter().enumerate() {
                let expected = JointId::ALL[slot];
                if joint.id != expected {
                    return Err(SeriesError::JointOrder {
                        position,
                        expected,
                        found: joint.id,
                    });
                }
            }
            if position > 0 {
                let prev = &self.frames[position - 1];
                if frame.index <= prev.index || frame.timestamp_ms <= prev.timestamp_ms {
                    return Err(SeriesError::NotMonotonic { position });
                }
            }
        }

        if let Some(index) = self.impact_frame_index {
            if index >= self.frames.len() {
                return Err(SeriesError::ImpactOutOfRange {
                    index,
                    len: self.frames.len(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_frame(index: u32, confidence: f32) -> Frame {
        let joints = JointId::ALL
            .iter()
            .map(|id| Joint::new(*id, id.index() as f64, 10.0, confidence))
            .collect();
        Frame::new(index, index as f64 * 1000.0 / 30.0, joints)
    }

    fn series(frames: Vec<Frame>) -> JointSeries {
        JointSeries::new(frames, 30.0, CameraAngle::Side)
    }

    #[test]
    fn test_frame_usability() {
        assert!(full_frame(0, 0.9).is_usable());
        assert!(!full_frame(0, 0.3).is_usable());
        assert!(!Frame::missing(0, 0.0).is_usable());

        let mut frame = full_frame(0, 0.9);
        frame.joints[JointId::LeftWrist.index()].confidence = 0.1;
        assert!(!frame.is_usable(), "chain joint below floor");
    }

    #[test]
    fn test_validate_accepts_well_formed_series() {
        let s = series((0..10).map(|i| full_frame(i, 0.9)).collect()).with_impact_frame(9);
        assert_eq!(s.validate(), Ok(()));
        assert_eq!(s.usable_count(), 10);
    }

    #[test]
    fn test_validate_rejects_bad_series() {
        assert_eq!(series(Vec::new()).validate(), Err(SeriesError::Empty));

        let mut s = series((0..3).map(|i| full_frame(i, 0.9)).collect());
        s.fps = 10.0;
        assert!(matches!(s.validate(), Err(SeriesError::FpsOutOfRange(_))));

        let s = series(vec![full_frame(1, 0.9), full_frame(1, 0.9)]);
        assert_eq!(s.validate(), Err(SeriesError::NotMonotonic { position: 1 }));

        let s = series((0..3).map(|i| full_frame(i, 0.9)).collect()).with_impact_frame(3);
        assert!(matches!(s.validate(), Err(SeriesError::ImpactOutOfRange { .. })));

        let mut frame = full_frame(0, 0.9);
        frame.joints.swap(0, 1);
        assert!(matches!(
            series(vec![frame]).validate(),
            Err(SeriesError::JointOrder { .. })
        ));

        let long = series((0..1900).map(|i| full_frame(i, 0.9)).collect());
        assert!(matches!(long.validate(), Err(SeriesError::TooLong(_))));
    }

    #[test]
    fn test_camera_angle_parse() {
        assert_eq!("side".parse::<CameraAngle>().unwrap(), CameraAngle::Side);
        assert_eq!("REAR".parse::<CameraAngle>().unwrap(), CameraAngle::Back);
        assert!("diagonal".parse::<CameraAngle>().is_err());
    }

    #[test]
    fn test_frames_to_ms() {
        let s = series(vec![full_frame(0, 0.9)]);
        assert_eq!(s.frames_to_ms(60.0), 2000.0);
    }
}
