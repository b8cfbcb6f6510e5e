//! Deterministic synthetic swings.
//!
//! Generates a full 33-joint series for an idealized swing: a short
//! backward coil of the pelvis, then forward rotation of pelvis, torso,
//! arms and bat, each with a smooth bell-shaped velocity pulse. Every
//! timing parameter is explicit so tests can reason about the expected
//! events and chain gaps.

use std::f64::consts::PI;
use std::ops::Range;

use swing_models::{CameraAngle, ChainLink, Frame, Joint, JointId, JointSeries};

const TRACKED: f32 = 0.95;
const LOST: f32 = 0.1;

/// Builder for a synthetic swing series.
#[derive(Debug, Clone)]
pub struct SyntheticSwing {
    frames: usize,
    fps: f64,
    contact: usize,
    load_start: usize,
    load_frames: usize,
    coil_degrees: f64,
    /// Forward rotation onsets for pelvis, torso, arm, bat
    onsets: [usize; 4],
    pulse_frames: usize,
    /// Total forward rotation for pelvis, torso, arm, bat
    rotation: [f64; 4],
    head_drift: f64,
    scale: f64,
    origin: (f64, f64),
    depth: bool,
    camera_angle: CameraAngle,
    impact_index: bool,
    unusable: Vec<Range<usize>>,
}

impl Default for SyntheticSwing {
    fn default() -> Self {
        Self {
            frames: 90,
            fps: 30.0,
            contact: 60,
            load_start: 26,
            load_frames: 10,
            coil_degrees: 20.0,
            onsets: [44, 46, 48, 49],
            pulse_frames: 12,
            rotation: [130.0, 170.0, 200.0, 260.0],
            head_drift: 0.02,
            scale: 200.0,
            origin: (320.0, 40.0),
            depth: true,
            camera_angle: CameraAngle::Side,
            impact_index: true,
            unusable: Vec::new(),
        }
    }
}

fn link_slot(link: ChainLink) -> usize {
    match link {
        ChainLink::Pelvis => 0,
        ChainLink::Torso => 1,
        ChainLink::Arm => 2,
        ChainLink::Bat => 3,
    }
}

/// Fraction of a raised-cosine velocity pulse completed at frame `t`.
fn ramp(t: usize, onset: usize, duration: usize) -> f64 {
    if duration == 0 {
        return if t >= onset { 1.0 } else { 0.0 };
    }
    let u = ((t as f64 - onset as f64) / duration as f64).clamp(0.0, 1.0);
    u - (2.0 * PI * u).sin() / (2.0 * PI)
}

impl SyntheticSwing {
    pub fn with_frames(mut self, frames: usize) -> Self {
        self.frames = frames;
        self
    }

    pub fn with_fps(mut self, fps: f64) -> Self {
        self.fps = fps;
        self
    }

    pub fn with_contact(mut self, contact: usize) -> Self {
        self.contact = contact;
        self
    }

    /// Start of the backward coil and its length in frames.
    pub fn with_load(mut self, start: usize, frames: usize) -> Self {
        self.load_start = start;
        self.load_frames = frames;
        self
    }

    pub fn with_coil_degrees(mut self, degrees: f64) -> Self {
        self.coil_degrees = degrees;
        self
    }

    pub fn with_onset(mut self, link: ChainLink, frame: usize) -> Self {
        self.onsets[link_slot(link)] = frame;
        self
    }

    pub fn with_rotation(mut self, link: ChainLink, degrees: f64) -> Self {
        self.rotation[link_slot(link)] = degrees;
        self
    }

    /// Head travel between load and contact, in body heights.
    pub fn with_head_drift(mut self, drift: f64) -> Self {
        self.head_drift = drift;
        self
    }

    /// Body height in output units.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_camera_angle(mut self, angle: CameraAngle) -> Self {
        self.camera_angle = angle;
        self
    }

    /// Drop depth from every joint.
    pub fn planar(mut self) -> Self {
        self.depth = false;
        self
    }

    /// Leave `impact_frame_index` unset so contact must be detected.
    pub fn without_impact_index(mut self) -> Self {
        self.impact_index = false;
        self
    }

    /// Mark frames in `range` as poorly tracked.
    pub fn with_unusable_range(mut self, range: Range<usize>) -> Self {
        self.unusable.push(range);
        self
    }

    pub fn contact(&self) -> usize {
        self.contact
    }

    pub fn onset(&self, link: ChainLink) -> usize {
        self.onsets[link_slot(link)]
    }

    pub fn load_start(&self) -> usize {
        self.load_start
    }

    fn segment_angle(&self, link: ChainLink, t: usize) -> f64 {
        let slot = link_slot(link);
        let forward = self.rotation[slot] * ramp(t, self.onsets[slot], self.pulse_frames);
        match link {
            ChainLink::Pelvis => {
                forward - self.coil_degrees * ramp(t, self.load_start, self.load_frames)
            }
            ChainLink::Arm => 10.0 + forward,
            _ => forward,
        }
    }

    /// Landmarks for frame `t` in body units (height 1.0, y down).
    fn pose(&self, t: usize) -> Vec<(JointId, f64, f64, f64)> {
        let torso = self.segment_angle(ChainLink::Torso, t).to_radians();
        let pelvis = self.segment_angle(ChainLink::Pelvis, t).to_radians();
        let arm = self.segment_angle(ChainLink::Arm, t).to_radians();
        let bat = self.segment_angle(ChainLink::Bat, t).to_radians();
        let hx = self.head_drift
            * ramp(t, self.load_start, self.contact.saturating_sub(self.load_start));

        let shoulder = (0.13 * torso.cos(), 0.13 * torso.sin());
        let hip = (0.10 * pelvis.cos(), 0.10 * pelvis.sin());
        let wrist = (0.3 * arm.cos(), 0.2 + 0.3 * arm.sin());
        let index = (wrist.0 + 0.05 * bat.cos(), wrist.1 + 0.05 * bat.sin());

        use JointId::*;
        vec![
            (Nose, hx, 0.02, 0.0),
            (LeftEyeInner, hx + 0.01, 0.0, 0.0),
            (LeftEye, hx + 0.02, 0.0, 0.0),
            (LeftEyeOuter, hx + 0.03, 0.005, 0.0),
            (RightEyeInner, hx - 0.01, 0.0, 0.0),
            (RightEye, hx - 0.02, 0.0, 0.0),
            (RightEyeOuter, hx - 0.03, 0.005, 0.0),
            (LeftEar, hx + 0.05, 0.02, 0.0),
            (RightEar, hx - 0.05, 0.02, 0.0),
            (MouthLeft, hx + 0.015, 0.04, 0.0),
            (MouthRight, hx - 0.015, 0.04, 0.0),
            (LeftShoulder, shoulder.0, 0.2, shoulder.1),
            (RightShoulder, -shoulder.0, 0.2, -shoulder.1),
            (LeftElbow, (shoulder.0 + wrist.0 + 0.01) / 2.0, (0.2 + wrist.1) / 2.0, 0.0),
            (RightElbow, (-shoulder.0 + wrist.0 - 0.01) / 2.0, (0.2 + wrist.1) / 2.0, 0.0),
            (LeftWrist, wrist.0 + 0.01, wrist.1, 0.0),
            (RightWrist, wrist.0 - 0.01, wrist.1, 0.0),
            (LeftPinky, index.0 + 0.01, index.1, 0.0),
            (RightPinky, index.0 - 0.01, index.1, 0.0),
            (LeftIndex, index.0 + 0.01, index.1, 0.0),
            (RightIndex, index.0 - 0.01, index.1, 0.0),
            (LeftThumb, wrist.0 + 0.01, wrist.1, 0.0),
            (RightThumb, wrist.0 - 0.01, wrist.1, 0.0),
            (LeftHip, hip.0, 0.5, hip.1),
            (RightHip, -hip.0, 0.5, -hip.1),
            (LeftKnee, 0.08, 0.75, 0.0),
            (RightKnee, -0.08, 0.75, 0.0),
            (LeftAnkle, 0.10, 0.95, 0.0),
            (RightAnkle, -0.10, 0.95, 0.0),
            (LeftHeel, 0.11, 0.97, 0.0),
            (RightHeel, -0.11, 0.97, 0.0),
            (LeftFootIndex, 0.14, 1.0, 0.0),
            (RightFootIndex, -0.14, 1.0, 0.0),
        ]
    }

    fn frame(&self, t: usize) -> Frame {
        let confidence = if self.unusable.iter().any(|r| r.contains(&t)) {
            LOST
        } else {
            TRACKED
        };
        let (ox, oy) = self.origin;
        let joints = self
            .pose(t)
            .into_iter()
            .map(|(id, x, y, z)| {
                let (px, py) = (ox + x * self.scale, oy + y * self.scale);
                if self.depth {
                    Joint::with_depth(id, px, py, z * self.scale, confidence)
                } else {
                    Joint::new(id, px, py, confidence)
                }
            })
            .collect();
        Frame::new(t as u32, t as f64 * 1000.0 / self.fps, joints)
    }

    /// Render the series.
    pub fn build(&self) -> JointSeries {
        let frames = (0..self.frames).map(|t| self.frame(t)).collect();
        let series = JointSeries::new(frames, self.fps, self.camera_angle);
        if self.impact_index && self.contact < self.frames {
            series.with_impact_frame(self.contact)
        } else {
            series
        }
    }
}
