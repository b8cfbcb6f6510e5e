//! Body-size and position normalization.
//!
//! Rescales a series so body height is a canonical unit and translates it
//! so the athlete's pelvis starts at the origin. Scores computed on
//! normalized series are comparable across camera distances and athletes.

use swing_models::{Frame, JointId, JointSeries};
use tracing::debug;

use crate::error::{AnalysisError, AnalysisResult};
use crate::stats::median;

/// Vertical extent spanned by the confident joints of a frame.
fn vertical_extent(frame: &Frame) -> Option<f64> {
    let mut ys = frame.joints.iter().filter(|j| j.is_confident()).map(|j| j.y);
    let first = ys.next()?;
    let (lo, hi) = ys.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y)));
    Some(hi - lo)
}

/// Midpoint of the hips as `(x, y, z)`; z only when both hips carry depth.
pub(crate) fn mid_hip(frame: &Frame) -> Option<(f64, f64, Option<f64>)> {
    let left = frame.confident_joint(JointId::LeftHip)?;
    let right = frame.confident_joint(JointId::RightHip)?;
    let z = match (left.z, right.z) {
        (Some(a), Some(b)) => Some((a + b) / 2.0),
        _ => None,
    };
    Some(((left.x + right.x) / 2.0, (left.y + right.y) / 2.0, z))
}

/// Median body height over usable frames, in the series' units.
pub fn measure_body_height(series: &JointSeries) -> Option<f64> {
    let extents: Vec<f64> = series
        .frames
        .iter()
        .filter(|f| f.is_usable())
        .filter_map(vertical_extent)
        .collect();
    if extents.is_empty() {
        return None;
    }
    Some(median(&extents))
}

/// Normalize a series to `canonical_height` body units with the first
/// usable frame's mid-hip at the origin.
pub fn normalize(series: &JointSeries, canonical_height: f64) -> AnalysisResult<JointSeries> {
    if !(canonical_height.is_finite() && canonical_height > 0.0) {
        return Err(AnalysisError::invalid_input(format!(
            "canonical height must be positive, got {canonical_height}"
        )));
    }

    let measured = measure_body_height(series)
        .ok_or_else(|| AnalysisError::insufficient_data("no usable frames to measure body height"))?;
    if measured <= f64::EPSILON {
        return Err(AnalysisError::insufficient_data("measured body height is zero"));
    }

    let (ox, oy, oz) = series
        .frames
        .iter()
        .filter(|f| f.is_usable())
        .find_map(mid_hip)
        .ok_or_else(|| AnalysisError::insufficient_data("no usable frame with both hips"))?;
    let scale = canonical_height / measured;

    debug!(measured, scale, "Normalizing joint series");

    let mut normalized = series.clone();
    for frame in &mut normalized.frames {
        for joint in &mut frame.joints {
            joint.x = (joint.x - ox) * scale;
            joint.y = (joint.y - oy) * scale;
            joint.z = joint.z.map(|z| (z - oz.unwrap_or(0.0)) * scale);
        }
    }
    Ok(normalized)
}

/// Two series can only be compared when shot from the same camera angle.
pub fn validate_comparable(a: &JointSeries, b: &JointSeries) -> AnalysisResult<()> {
    if a.camera_angle != b.camera_angle {
        return Err(AnalysisError::CameraAngleMismatch {
            baseline: a.camera_angle,
            candidate: b.camera_angle,
        });
    }
    Ok(())
}
