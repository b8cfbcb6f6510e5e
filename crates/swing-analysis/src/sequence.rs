//! Kinematic sequence analysis.
//!
//! Finds when each chain link starts firing and measures the gaps between
//! successive links. A distal link firing before its proximal neighbour is
//! an inversion: the result still stands but the sequence is flagged.

use serde::{Deserialize, Serialize};
use swing_models::{ChainLink, JointSeries, SegmentGaps, SwingEvents, Timing};
use tracing::warn;

use crate::config::SequenceConfig;
use crate::error::{AnalysisError, AnalysisResult};
use crate::kinematics::KinematicProfile;
use crate::stats::argmax_in;

/// A link that fired before the link it should follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inversion {
    /// Link expected to fire first
    pub expected_first: ChainLink,
    /// Link that actually fired first
    pub fired_first: ChainLink,
}

/// Onsets and signed gaps of the four chain links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderingReport {
    /// Onset frame per link, in chain order
    pub onsets: [(ChainLink, usize); 4],
    /// Signed gaps pelvis-torso, torso-arm, arm-bat in ms
    pub raw_gaps_ms: [f64; 3],
    pub inversions: Vec<Inversion>,
    pub broken: bool,
}

impl OrderingReport {
    /// Gaps clamped to be non-negative.
    pub fn gaps(&self) -> SegmentGaps {
        SegmentGaps {
            pelvis_to_torso: self.raw_gaps_ms[0].max(0.0),
            torso_to_arm: self.raw_gaps_ms[1].max(0.0),
            arm_to_bat: self.raw_gaps_ms[2].max(0.0),
        }
    }

    pub fn onset(&self, link: ChainLink) -> usize {
        self.onsets
            .iter()
            .find(|(l, _)| *l == link)
            .map(|(_, f)| *f)
            .unwrap_or_default()
    }
}

/// Chain timing analyzer.
#[derive(Debug, Clone, Default)]
pub struct SequenceAnalyzer {
    config: SequenceConfig,
}

impl SequenceAnalyzer {
    pub fn new(config: SequenceConfig) -> Self {
        Self { config }
    }

    /// Analysis window `[trigger, contact]`, widened to `[0, contact]` when empty.
    fn window(events: &SwingEvents) -> (usize, usize) {
        if events.trigger_frame < events.contact_frame {
            (events.trigger_frame, events.contact_frame)
        } else {
            (0, events.contact_frame)
        }
    }

    /// Onset of a link: the earliest frame before its in-window peak that
    /// is still above `onset_fraction` of that peak.
    fn onset(&self, curve: &[f64], start: usize, end: usize) -> usize {
        let Some(peak) = argmax_in(curve, start..end + 1) else {
            return start;
        };
        let threshold = self.config.onset_fraction * curve[peak];
        let mut i = peak;
        while i > start && curve[i - 1] >= threshold {
            i -= 1;
        }
        i
    }

    /// Locate onsets and classify the firing order.
    pub fn ordering(
        &self,
        profile: &KinematicProfile,
        events: &SwingEvents,
    ) -> AnalysisResult<OrderingReport> {
        if !events.is_ordered() {
            return Err(AnalysisError::invalid_input(format!(
                "events out of order: trigger {}, fire {}, contact {}",
                events.trigger_frame, events.fire_frame, events.contact_frame
            )));
        }
        if events.contact_frame >= profile.len() {
            return Err(AnalysisError::invalid_input(format!(
                "contact frame {} is outside a series of {} frames",
                events.contact_frame,
                profile.len()
            )));
        }
        let (start, end) = Self::window(events);
        let onsets = ChainLink::ORDER.map(|link| (link, self.onset(profile.link_speed(link), start, end)));

        let to_ms = |frames: f64| frames / profile.fps * 1000.0;
        let mut raw_gaps_ms = [0.0; 3];
        let mut inversions = Vec::new();
        for (slot, pair) in onsets.windows(2).enumerate() {
            let ((first, a), (second, b)) = (pair[0], pair[1]);
            raw_gaps_ms[slot] = to_ms(b as f64 - a as f64);
            if b < a {
                inversions.push(Inversion {
                    expected_first: first,
                    fired_first: second,
                });
            }
        }

        let broken = !inversions.is_empty();
        if broken {
            warn!(
                inversions = inversions.len(),
                ?raw_gaps_ms,
                "Kinetic chain fired out of order"
            );
        }

        Ok(OrderingReport {
            onsets,
            raw_gaps_ms,
            inversions,
            broken,
        })
    }

    /// Tempo and gap timing for a swing.
    pub fn timing(events: &SwingEvents, gaps: SegmentGaps, fps: f64) -> Timing {
        let load = events.load_frames() as f64;
        let swing = events.swing_frames().max(1) as f64;
        Timing {
            ab_ratio: load / swing,
            load_duration_ms: load / fps * 1000.0,
            swing_duration_ms: events.contact_frame as f64 / fps * 1000.0,
            segment_gaps: gaps,
        }
    }
}

/// Non-negative chain gaps for a series and its events.
pub fn compute_gaps(series: &JointSeries, events: &SwingEvents) -> AnalysisResult<SegmentGaps> {
    Ok(verify_order(series, events)?.gaps())
}

/// Ordering report for a series and its events.
pub fn verify_order(series: &JointSeries, events: &SwingEvents) -> AnalysisResult<OrderingReport> {
    let profile = KinematicProfile::build(series)?;
    SequenceAnalyzer::default().ordering(&profile, events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::detect_events;
    use crate::synthetic::SyntheticSwing;

    #[test]
    fn test_clean_swing_gaps() {
        let series = SyntheticSwing::default().build();
        let events = detect_events(&series, None).unwrap().events;
        let report = verify_order(&series, &events).unwrap();

        assert!(!report.broken);
        assert!(report.inversions.is_empty());
        // Onsets 2, 2 and 1 frames apart at 30 fps
        let gaps = report.gaps();
        assert!((gaps.pelvis_to_torso - 66.7).abs() < 0.1, "{gaps:?}");
        assert!((gaps.torso_to_arm - 66.7).abs() < 0.1, "{gaps:?}");
        assert!((gaps.arm_to_bat - 33.3).abs() < 0.1, "{gaps:?}");
    }

    #[test]
    fn test_arm_before_torso_is_inversion() {
        let series = SyntheticSwing::default()
            .with_onset(ChainLink::Torso, 48)
            .with_onset(ChainLink::Arm, 46)
            .build();
        let events = detect_events(&series, None).unwrap().events;
        let report = verify_order(&series, &events).unwrap();

        assert!(report.broken);
        assert_eq!(
            report.inversions,
            vec![Inversion {
                expected_first: ChainLink::Torso,
                fired_first: ChainLink::Arm,
            }]
        );
        assert!(report.raw_gaps_ms[1] < 0.0);
        assert_eq!(compute_gaps(&series, &events).unwrap().torso_to_arm, 0.0);
    }

    #[test]
    fn test_timing() {
        let (events, _) = SwingEvents::ordered(20, 40, 60);
        let timing = SequenceAnalyzer::timing(&events, SegmentGaps::default(), 30.0);
        assert_eq!(timing.ab_ratio, 1.0);
        assert!((timing.load_duration_ms - 666.666).abs() < 0.01);
        assert_eq!(timing.swing_duration_ms, 2000.0);

        let (events, _) = SwingEvents::ordered(10, 10, 10);
        let timing = SequenceAnalyzer::timing(&events, SegmentGaps::default(), 30.0);
        assert_eq!(timing.ab_ratio, 0.0);
    }

    #[test]
    fn test_contact_outside_series_is_rejected() {
        let series = SyntheticSwing::default().build();
        let (events, _) = SwingEvents::ordered(0, 0, 900);
        assert!(matches!(
            verify_order(&series, &events),
            Err(AnalysisError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_unordered_events_are_rejected() {
        let series = SyntheticSwing::default().build();
        let events = SwingEvents {
            trigger_frame: 50,
            fire_frame: 40,
            contact_frame: 60,
        };
        assert!(matches!(
            compute_gaps(&series, &events),
            Err(AnalysisError::InvalidInput(_))
        ));
    }
}
