//! Composite banding and leak classification.

use swing_models::{LeakSeverity, MainLeak};

/// Lower composite bound of each band, best first.
const BAND_FLOORS: [(f64, i8); 6] = [(90.0, 3), (80.0, 2), (70.0, 1), (60.0, 0), (50.0, -1), (40.0, -2)];

/// Band in `[-3, 3]` for a composite score. Non-decreasing in the score.
pub fn band_for(composite: f64) -> i8 {
    BAND_FLOORS
        .iter()
        .find(|(floor, _)| composite >= *floor)
        .map(|(_, band)| *band)
        .unwrap_or(-3)
}

/// How far a sub-score trails the composite or the level floor.
pub fn leak_deficit(sub_score: f64, composite: f64, level_floor: f64) -> f64 {
    (composite - sub_score).max(level_floor - sub_score).max(0.0)
}

/// Severity for a deficit. Non-decreasing in the deficit.
pub fn leak_severity(deficit: f64) -> LeakSeverity {
    if deficit < 5.0 {
        LeakSeverity::None
    } else if deficit < 15.0 {
        LeakSeverity::Mild
    } else if deficit < 25.0 {
        LeakSeverity::Moderate
    } else {
        LeakSeverity::Severe
    }
}

/// Weakest of the three flows; ties go to the more proximal link.
///
/// Reports `MainLeak::None` when the weakest flow does not leak at all.
pub fn main_leak(scores: [(MainLeak, f64, LeakSeverity); 3]) -> MainLeak {
    let mut weakest = scores[0];
    for candidate in &scores[1..] {
        if candidate.1 < weakest.1 {
            weakest = *candidate;
        }
    }
    if weakest.2 == LeakSeverity::None {
        MainLeak::None
    } else {
        weakest.0
    }
}
