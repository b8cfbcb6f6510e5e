//! Sub-score formulas.
//!
//! Each helper maps one measured quantity to 0..=100. The weighted blends
//! for ground, power, barrel and momentum flow live here too.

use swing_models::SegmentGaps;

/// Points lost per millisecond a chain gap falls outside its window.
const WINDOW_PENALTY_PER_MS: f64 = 1.5;

/// Points lost per inverted link pair.
const INVERSION_PENALTY: f64 = 25.0;

/// Ideal trigger-to-fire over fire-to-contact ratio.
const TEMPO_IDEAL: (f64, f64) = (1.2, 3.0);
const TEMPO_PENALTY_PER_UNIT: f64 = 40.0;

/// Head travel, in body heights, that zeroes head stability.
const HEAD_DISPLACEMENT_LIMIT: f64 = 0.15;

/// Chain gap windows in ms.
pub const PELVIS_TO_TORSO_MS: (f64, f64) = (20.0, 70.0);
pub const TORSO_TO_ARM_MS: (f64, f64) = (15.0, 70.0);
pub const ARM_TO_BAT_MS: (f64, f64) = (10.0, 60.0);

/// Speed gain targets between successive links.
const TORSO_GAIN_TARGET: f64 = 1.3;
const ARM_GAIN_TARGET: f64 = 1.2;

pub fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

/// 100 at or above target, proportionally less below it.
pub fn ratio_score(actual: f64, target: f64) -> f64 {
    if target <= 0.0 {
        return 0.0;
    }
    clamp_score(100.0 * actual / target)
}

/// 100 inside `[lo, hi]`, minus a fixed penalty per unit outside.
pub fn window_score(value: f64, (lo, hi): (f64, f64)) -> f64 {
    let outside = if value < lo {
        lo - value
    } else if value > hi {
        value - hi
    } else {
        0.0
    };
    clamp_score(100.0 - WINDOW_PENALTY_PER_MS * outside)
}

pub fn tempo_score(ab_ratio: f64) -> f64 {
    let (lo, hi) = TEMPO_IDEAL;
    let outside = if ab_ratio < lo {
        lo - ab_ratio
    } else if ab_ratio > hi {
        ab_ratio - hi
    } else {
        0.0
    };
    clamp_score(100.0 - TEMPO_PENALTY_PER_UNIT * outside)
}

pub fn sequence_score(inversions: usize) -> f64 {
    clamp_score(100.0 - INVERSION_PENALTY * inversions as f64)
}

pub fn head_stability(displacement: f64) -> f64 {
    clamp_score(100.0 * (1.0 - displacement / HEAD_DISPLACEMENT_LIMIT))
}

/// Peak speed ratio between a link and the one feeding it.
fn gain(distal: f64, proximal: f64) -> f64 {
    if proximal <= f64::EPSILON {
        0.0
    } else {
        distal / proximal
    }
}

/// Measured peaks over the swing window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingPeaks {
    /// deg/s
    pub pelvis: f64,
    pub torso: f64,
    pub arm: f64,
    pub hand_mph: f64,
    /// Body heights
    pub head_displacement: f64,
}

/// Scoring targets for one player level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowTargets {
    pub pelvis_dps: f64,
    pub torso_dps: f64,
    pub hand_mph: f64,
}

pub fn ground_flow(peaks: &SwingPeaks, targets: &FlowTargets) -> f64 {
    clamp_score(
        0.6 * ratio_score(peaks.pelvis, targets.pelvis_dps)
            + 0.4 * head_stability(peaks.head_displacement),
    )
}

pub fn power_flow(peaks: &SwingPeaks, targets: &FlowTargets, gaps: &SegmentGaps) -> f64 {
    clamp_score(
        0.4 * ratio_score(peaks.torso, targets.torso_dps)
            + 0.3 * ratio_score(gain(peaks.torso, peaks.pelvis), TORSO_GAIN_TARGET)
            + 0.3 * window_score(gaps.pelvis_to_torso, PELVIS_TO_TORSO_MS),
    )
}

pub fn barrel_flow(peaks: &SwingPeaks, targets: &FlowTargets, gaps: &SegmentGaps) -> f64 {
    let windows = (window_score(gaps.torso_to_arm, TORSO_TO_ARM_MS)
        + window_score(gaps.arm_to_bat, ARM_TO_BAT_MS))
        / 2.0;
    clamp_score(
        0.5 * ratio_score(peaks.hand_mph, targets.hand_mph)
            + 0.2 * ratio_score(gain(peaks.arm, peaks.torso), ARM_GAIN_TARGET)
            + 0.3 * windows,
    )
}

pub fn momentum_flow(inversions: usize, ab_ratio: f64, gaps: &SegmentGaps) -> f64 {
    let windows = (window_score(gaps.pelvis_to_torso, PELVIS_TO_TORSO_MS)
        + window_score(gaps.torso_to_arm, TORSO_TO_ARM_MS)
        + window_score(gaps.arm_to_bat, ARM_TO_BAT_MS))
        / 3.0;
    clamp_score(0.4 * sequence_score(inversions) + 0.3 * tempo_score(ab_ratio) + 0.3 * windows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_score() {
        assert_eq!(window_score(40.0, PELVIS_TO_TORSO_MS), 100.0);
        assert_eq!(window_score(80.0, PELVIS_TO_TORSO_MS), 85.0);
        assert_eq!(window_score(0.0, PELVIS_TO_TORSO_MS), 70.0);
        assert_eq!(window_score(500.0, PELVIS_TO_TORSO_MS), 0.0);
    }

    #[test]
    fn test_tempo_and_sequence() {
        assert_eq!(tempo_score(2.0), 100.0);
        assert!((tempo_score(0.7) - 80.0).abs() < 1e-9);
        assert_eq!(tempo_score(4.0), 60.0);
        assert_eq!(sequence_score(0), 100.0);
        assert_eq!(sequence_score(1), 75.0);
        assert_eq!(sequence_score(5), 0.0);
    }

    #[test]
    fn test_ratio_and_head() {
        assert_eq!(ratio_score(600.0, 550.0), 100.0);
        assert_eq!(ratio_score(275.0, 550.0), 50.0);
        assert_eq!(ratio_score(1.0, 0.0), 0.0);
        assert_eq!(head_stability(0.0), 100.0);
        assert_eq!(head_stability(0.3), 0.0);
    }

    #[test]
    fn test_perfect_inputs_score_full() {
        let peaks = SwingPeaks {
            pelvis: 700.0,
            torso: 950.0,
            arm: 1200.0,
            hand_mph: 25.0,
            head_displacement: 0.0,
        };
        let targets = FlowTargets {
            pelvis_dps: 550.0,
            torso_dps: 750.0,
            hand_mph: 20.0,
        };
        let gaps = SegmentGaps {
            pelvis_to_torso: 40.0,
            torso_to_arm: 40.0,
            arm_to_bat: 30.0,
        };
        assert!((ground_flow(&peaks, &targets) - 100.0).abs() < 1e-9);
        assert!((power_flow(&peaks, &targets, &gaps) - 100.0).abs() < 1e-9);
        assert!((barrel_flow(&peaks, &targets, &gaps) - 100.0).abs() < 1e-9);
        assert!((momentum_flow(0, 2.0, &gaps) - 100.0).abs() < 1e-9);
    }
}
