//! Body landmark definitions.
//!
//! The pose detector reports a fixed 33-landmark topology per frame. Each
//! landmark carries a position and a per-joint confidence.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of landmarks reported per frame.
pub const LANDMARK_COUNT: usize = 33;

/// Confidence a joint must exceed to count as tracked.
pub const CONFIDENCE_FLOOR: f32 = 0.5;

/// Anatomical landmark identifier.
///
/// Discriminants are the landmark's position in a frame's joint array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum JointId {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl JointId {
    /// All landmarks in topology order.
    pub const ALL: [JointId; LANDMARK_COUNT] = [
        JointId::Nose,
        JointId::LeftEyeInner,
        JointId::LeftEye,
        JointId::LeftEyeOuter,
        JointId::RightEyeInner,
        JointId::RightEye,
        JointId::RightEyeOuter,
        JointId::LeftEar,
        JointId::RightEar,
        JointId::MouthLeft,
        JointId::MouthRight,
        JointId::LeftShoulder,
        JointId::RightShoulder,
        JointId::LeftElbow,
        JointId::RightElbow,
        JointId::LeftWrist,
        JointId::RightWrist,
        JointId::LeftPinky,
        JointId::RightPinky,
        JointId::LeftIndex,
        JointId::RightIndex,
        JointId::LeftThumb,
        JointId::RightThumb,
        JointId::LeftHip,
        JointId::RightHip,
        JointId::LeftKnee,
        JointId::RightKnee,
        JointId::LeftAnkle,
        JointId::RightAnkle,
        JointId::LeftHeel,
        JointId::RightHeel,
        JointId::LeftFootIndex,
        JointId::RightFootIndex,
    ];

    /// Joints the kinetic chain cannot be measured without.
    pub const CHAIN: [JointId; 6] = [
        JointId::LeftShoulder,
        JointId::RightShoulder,
        JointId::LeftHip,
        JointId::RightHip,
        JointId::LeftWrist,
        JointId::RightWrist,
    ];

    /// Torso landmarks used as segmentation seeds.
    pub const TORSO: [JointId; 4] = [
        JointId::LeftShoulder,
        JointId::RightShoulder,
        JointId::LeftHip,
        JointId::RightHip,
    ];

    /// Position of this landmark in a frame's joint array.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Look up a landmark by array position.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Returns the landmark name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            JointId::Nose => "nose",
            JointId::LeftEyeInner => "left_eye_inner",
            JointId::LeftEye => "left_eye",
            JointId::LeftEyeOuter => "left_eye_outer",
            JointId::RightEyeInner => "right_eye_inner",
            JointId::RightEye => "right_eye",
            JointId::RightEyeOuter => "right_eye_outer",
            JointId::LeftEar => "left_ear",
            JointId::RightEar => "right_ear",
            JointId::MouthLeft => "mouth_left",
            JointId::MouthRight => "mouth_right",
            JointId::LeftShoulder => "left_shoulder",
            JointId::RightShoulder => "right_shoulder",
            JointId::LeftElbow => "left_elbow",
            JointId::RightElbow => "right_elbow",
            JointId::LeftWrist => "left_wrist",
            JointId::RightWrist => "right_wrist",
            JointId::LeftPinky => "left_pinky",
            JointId::RightPinky => "right_pinky",
            JointId::LeftIndex => "left_index",
            JointId::RightIndex => "right_index",
            JointId::LeftThumb => "left_thumb",
            JointId::RightThumb => "right_thumb",
            JointId::LeftHip => "left_hip",
            JointId::RightHip => "right_hip",
            JointId::LeftKnee => "left_knee",
            JointId::RightKnee => "right_knee",
            JointId::LeftAnkle => "left_ankle",
            JointId::RightAnkle => "right_ankle",
            JointId::LeftHeel => "left_heel",
            JointId::RightHeel => "right_heel",
            JointId::LeftFootIndex => "left_foot_index",
            JointId::RightFootIndex => "right_foot_index",
        }
    }
}

impl fmt::Display for JointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One tracked landmark.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Joint {
    pub id: JointId,
    pub x: f64,
    pub y: f64,
    /// Depth in the same unit as x/y, when the detector provides it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    /// Detection confidence (0.0-1.0)
    pub confidence: f32,
}

impl Joint {
    /// Create a 2D joint.
    pub fn new(id: JointId, x: f64, y: f64, confidence: f32) -> Self {
        Self {
            id,
            x,
            y,
            z: None,
            confidence,
        }
    }

    /// Create a joint with depth.
    pub fn with_depth(id: JointId, x: f64, y: f64, z: f64, confidence: f32) -> Self {
        Self {
            id,
            x,
            y,
            z: Some(z),
            confidence,
        }
    }

    /// Placeholder for a landmark the detector did not report.
    pub fn missing(id: JointId) -> Self {
        Self::new(id, 0.0, 0.0, 0.0)
    }

    /// Whether the joint is confidently tracked.
    pub fn is_confident(&self) -> bool {
        self.confidence > CONFIDENCE_FLOOR
    }
}
