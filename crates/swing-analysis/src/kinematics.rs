//! Per-frame kinematic signals.
//!
//! Extracts segment angles from every frame in parallel, then conditions
//! them sequentially into speed curves: gap filling over unusable frames,
//! angle unwrapping, central-difference velocity and light smoothing.

use rayon::prelude::*;
use swing_models::{ChainLink, Frame, JointId, JointSeries};
use tracing::debug;

use crate::error::{AnalysisError, AnalysisResult};
use crate::normalize::measure_body_height;
use crate::stats::{central_difference, fill_gaps, moving_average, unwrap_degrees};

/// Moving-average window applied to every velocity curve.
const SMOOTHING_WINDOW: usize = 3;

/// Raw geometry of one usable frame.
#[derive(Debug, Clone, Copy)]
struct FrameFeatures {
    hip_dx: f64,
    hip_dz: Option<f64>,
    shoulder_dx: f64,
    shoulder_dz: Option<f64>,
    /// Mid-shoulder to mid-wrist direction, degrees
    arm_angle: f64,
    /// Bat proxy direction, degrees
    bat_angle: f64,
    hand: (f64, f64),
    head: (f64, f64),
}

fn midpoint(frame: &Frame, a: JointId, b: JointId) -> Option<(f64, f64)> {
    let ja = frame.confident_joint(a)?;
    let jb = frame.confident_joint(b)?;
    Some(((ja.x + jb.x) / 2.0, (ja.y + jb.y) / 2.0))
}

fn direction_deg(from: (f64, f64), to: (f64, f64)) -> f64 {
    (to.1 - from.1).atan2(to.0 - from.0).to_degrees()
}

/// Left-minus-right horizontal and depth offsets of a joint pair.
fn line_offsets(frame: &Frame, left: JointId, right: JointId) -> Option<(f64, Option<f64>)> {
    let l = frame.confident_joint(left)?;
    let r = frame.confident_joint(right)?;
    let dz = match (l.z, r.z) {
        (Some(lz), Some(rz)) => Some(lz - rz),
        _ => None,
    };
    Some((l.x - r.x, dz))
}

fn extract(frame: &Frame) -> Option<FrameFeatures> {
    if !frame.is_usable() {
        return None;
    }
    let (hip_dx, hip_dz) = line_offsets(frame, JointId::LeftHip, JointId::RightHip)?;
    let (shoulder_dx, shoulder_dz) =
        line_offsets(frame, JointId::LeftShoulder, JointId::RightShoulder)?;
    let shoulders = midpoint(frame, JointId::LeftShoulder, JointId::RightShoulder)?;
    let wrists = midpoint(frame, JointId::LeftWrist, JointId::RightWrist)?;

    let arm_angle = direction_deg(shoulders, wrists);
    let bat_angle = match midpoint(frame, JointId::LeftIndex, JointId::RightIndex) {
        Some(fingers) => direction_deg(wrists, fingers),
        None => match midpoint(frame, JointId::LeftElbow, JointId::RightElbow) {
            Some(elbows) => direction_deg(elbows, wrists),
            None => arm_angle,
        },
    };
    let head = frame
        .confident_joint(JointId::Nose)
        .map(|n| (n.x, n.y))
        .unwrap_or(shoulders);

    Some(FrameFeatures {
        hip_dx,
        hip_dz,
        shoulder_dx,
        shoulder_dz,
        arm_angle,
        bat_angle,
        hand: wrists,
        head,
    })
}

/// Segment yaw per frame from a joint line.
///
/// Uses `atan2(dz, dx)` when every usable frame has depth, otherwise
/// recovers the out-of-plane rotation from foreshortening of `dx`.
fn yaw_series(features: &[Option<FrameFeatures>], pick: fn(&FrameFeatures) -> (f64, Option<f64>)) -> Vec<Option<f64>> {
    let has_depth = features.iter().flatten().all(|f| pick(f).1.is_some());
    if has_depth {
        return features
            .iter()
            .map(|f| {
                f.as_ref().and_then(|f| {
                    let (dx, dz) = pick(f);
                    dz.map(|dz| dz.atan2(dx).to_degrees())
                })
            })
            .collect();
    }

    let max_dx = features
        .iter()
        .flatten()
        .map(|f| pick(f).0.abs())
        .fold(0.0_f64, f64::max);
    features
        .iter()
        .map(|f| {
            f.as_ref().map(|f| {
                if max_dx <= f64::EPSILON {
                    0.0
                } else {
                    (pick(f).0.abs() / max_dx).clamp(0.0, 1.0).acos().to_degrees()
                }
            })
        })
        .collect()
}

fn channel(features: &[Option<FrameFeatures>], pick: impl Fn(&FrameFeatures) -> f64) -> Vec<Option<f64>> {
    features.iter().map(|f| f.as_ref().map(&pick)).collect()
}

/// Unwrap the known samples of an angle channel, leaving gaps in place.
fn unwrap_known(samples: Vec<Option<f64>>) -> Vec<Option<f64>> {
    let known: Vec<f64> = samples.iter().flatten().copied().collect();
    let mut unwrapped = unwrap_degrees(&known).into_iter();
    samples
        .into_iter()
        .map(|s| s.and_then(|_| unwrapped.next()))
        .collect()
}

fn filled(samples: &[Option<f64>], name: &str) -> AnalysisResult<Vec<f64>> {
    fill_gaps(samples)
        .ok_or_else(|| AnalysisError::insufficient_data(format!("no usable samples for {name}")))
}

/// Unwrapped angle samples to smoothed absolute angular speed in deg/s.
fn angular_speed(angles: &[f64], fps: f64) -> Vec<f64> {
    let velocity = central_difference(angles, fps);
    moving_average(&velocity, SMOOTHING_WINDOW)
        .into_iter()
        .map(f64::abs)
        .collect()
}

/// Conditioned kinematic curves for one swing.
#[derive(Debug, Clone, PartialEq)]
pub struct KinematicProfile {
    pub fps: f64,
    /// Body height in series units
    pub body_height: f64,
    /// Per-frame usability of the source data
    pub usable: Vec<bool>,
    /// Angular speeds in deg/s
    pub pelvis_speed: Vec<f64>,
    pub torso_speed: Vec<f64>,
    pub arm_speed: Vec<f64>,
    pub bat_speed: Vec<f64>,
    /// Mid-wrist speed in series units per second
    pub hand_speed: Vec<f64>,
    /// Head position (nose, or mid-shoulder when the nose is lost)
    pub head: Vec<(f64, f64)>,
}

impl KinematicProfile {
    /// Build the profile for a series.
    pub fn build(series: &JointSeries) -> AnalysisResult<Self> {
        if series.is_empty() {
            return Err(AnalysisError::insufficient_data("series has no frames"));
        }
        let body_height = measure_body_height(series)
            .filter(|h| *h > f64::EPSILON)
            .ok_or_else(|| AnalysisError::insufficient_data("no usable frames to measure body height"))?;

        let features: Vec<Option<FrameFeatures>> = series.frames.par_iter().map(extract).collect();
        let usable: Vec<bool> = features.iter().map(Option::is_some).collect();

        let fps = series.fps;
        let pelvis = filled(
            &unwrap_known(yaw_series(&features, |f| (f.hip_dx, f.hip_dz))),
            "pelvis yaw",
        )?;
        let torso = filled(
            &unwrap_known(yaw_series(&features, |f| (f.shoulder_dx, f.shoulder_dz))),
            "torso yaw",
        )?;
        let arm = filled(&unwrap_known(channel(&features, |f| f.arm_angle)), "arm angle")?;
        let bat = filled(&unwrap_known(channel(&features, |f| f.bat_angle)), "bat angle")?;
        let hand_x = filled(&channel(&features, |f| f.hand.0), "hand position")?;
        let hand_y = filled(&channel(&features, |f| f.hand.1), "hand position")?;
        let head_x = filled(&channel(&features, |f| f.head.0), "head position")?;
        let head_y = filled(&channel(&features, |f| f.head.1), "head position")?;

        let vx = central_difference(&hand_x, fps);
        let vy = central_difference(&hand_y, fps);
        let hand_speed: Vec<f64> = vx.iter().zip(&vy).map(|(x, y)| x.hypot(*y)).collect();

        let profile = Self {
            fps,
            body_height,
            pelvis_speed: angular_speed(&pelvis, fps),
            torso_speed: angular_speed(&torso, fps),
            arm_speed: angular_speed(&arm, fps),
            bat_speed: angular_speed(&bat, fps),
            hand_speed: moving_average(&hand_speed, SMOOTHING_WINDOW),
            head: head_x.into_iter().zip(head_y).collect(),
            usable,
        };

        debug!(
            frames = profile.len(),
            usable = profile.usable_count(),
            body_height,
            "Built kinematic profile"
        );
        Ok(profile)
    }

    pub fn len(&self) -> usize {
        self.usable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.usable.is_empty()
    }

    pub fn usable_count(&self) -> usize {
        self.usable.iter().filter(|u| **u).count()
    }

    /// Angular speed curve of a chain link.
    pub fn link_speed(&self, link: ChainLink) -> &[f64] {
        match link {
            ChainLink::Pelvis => &self.pelvis_speed,
            ChainLink::Torso => &self.torso_speed,
            ChainLink::Arm => &self.arm_speed,
            ChainLink::Bat => &self.bat_speed,
        }
    }

    /// Usable frames within `half_width` of `center`.
    pub fn usable_near(&self, center: usize, half_width: usize) -> usize {
        let start = center.saturating_sub(half_width);
        let end = (center + half_width + 1).min(self.len());
        self.usable[start.min(end)..end].iter().filter(|u| **u).count()
    }

    /// Largest head excursion from its position at `from`, over `[from, to]`,
    /// in body heights.
    pub fn head_displacement(&self, from: usize, to: usize) -> f64 {
        let Some(&(x0, y0)) = self.head.get(from) else {
            return 0.0;
        };
        let end = (to + 1).min(self.head.len());
        self.head[from..end.max(from)]
            .iter()
            .map(|(x, y)| (x - x0).hypot(y - y0))
            .fold(0.0, f64::max)
            / self.body_height
    }

    /// Peak of a curve over `[from, to]`.
    pub fn peak(curve: &[f64], from: usize, to: usize) -> f64 {
        let end = (to + 1).min(curve.len());
        curve[from.min(end)..end].iter().copied().fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::argmax_in;
    use crate::synthetic::SyntheticSwing;

    #[test]
    fn test_link_peaks_follow_chain_order() {
        let swing = SyntheticSwing::default();
        let profile = KinematicProfile::build(&swing.build()).unwrap();
        let peaks: Vec<usize> = ChainLink::ORDER
            .iter()
            .map(|l| argmax_in(profile.link_speed(*l), 0..profile.len()).unwrap())
            .collect();
        assert!(peaks.windows(2).all(|w| w[0] < w[1]), "peaks {peaks:?}");
    }

    #[test]
    fn test_profile_is_scale_invariant() {
        let small = KinematicProfile::build(&SyntheticSwing::default().with_scale(120.0).build()).unwrap();
        let large = KinematicProfile::build(&SyntheticSwing::default().with_scale(480.0).build()).unwrap();
        for (a, b) in small.pelvis_speed.iter().zip(&large.pelvis_speed) {
            assert!((a - b).abs() < 1e-6);
        }
        let hand = |p: &KinematicProfile| p.hand_speed[50] / p.body_height;
        assert!((hand(&small) - hand(&large)).abs() < 1e-6);
    }

    #[test]
    fn test_planar_series_uses_foreshortening() {
        let profile = KinematicProfile::build(&SyntheticSwing::default().planar().build()).unwrap();
        assert!(profile.pelvis_speed.iter().all(|v| v.is_finite()));
        assert!(KinematicProfile::peak(&profile.pelvis_speed, 0, profile.len()) > 100.0);
    }

    #[test]
    fn test_unusable_frames_are_gap_filled() {
        let series = SyntheticSwing::default().with_unusable_range(10..20).build();
        let profile = KinematicProfile::build(&series).unwrap();
        assert_eq!(profile.len(), series.len());
        assert_eq!(profile.usable_count(), series.len() - 10);
        assert_eq!(profile.usable_near(15, 3), 0);
        assert_eq!(profile.usable_near(21, 3), 5);
    }

    #[test]
    fn test_no_usable_frames_is_insufficient() {
        let series = SyntheticSwing::default().with_unusable_range(0..90).build();
        assert!(matches!(
            KinematicProfile::build(&series),
            Err(AnalysisError::InsufficientData(_))
        ));
    }
}
