//! Momentum transfer scoring.
//!
//! Turns measured peaks, chain gaps and tempo into the three flow
//! sub-scores, the momentum component and a weighted composite. All
//! classification (band, leaks) happens on unrounded values; rounding for
//! presentation is the last step.
//!
//! # Composite
//! `0.60 * momentum + 0.15 * ground + 0.15 * power + 0.10 * barrel`

pub mod band;
pub mod coaching;
pub mod flow;

use swing_models::{
    AnalysisFlags, BandLabel, DataQuality, FlowScore, JointSeries, LeakSeverity, MainLeak,
    MomentumTransferResult, PlayerLevel, ScoringOptions, SegmentGaps, SubScores, SwingEvents,
    Timing,
};
use tracing::{debug, warn};
use validator::Validate;

use crate::config::EventConfig;
use crate::error::{AnalysisError, AnalysisResult};
use crate::kinematics::KinematicProfile;
use crate::quality::{assess, QualityAssessment};
use crate::sequence::{OrderingReport, SequenceAnalyzer};
use crate::stats::{round1, round2};

pub use band::{band_for, leak_deficit, leak_severity, main_leak};
pub use flow::{FlowTargets, SwingPeaks};

/// Player height assumed when none is given.
pub const DEFAULT_PLAYER_HEIGHT_IN: f64 = 70.0;

/// Inches per second in one mile per hour.
const INCHES_PER_SEC_PER_MPH: f64 = 17.6;

const MOMENTUM_WEIGHT: f64 = 0.60;
const GROUND_WEIGHT: f64 = 0.15;
const POWER_WEIGHT: f64 = 0.15;
const BARREL_WEIGHT: f64 = 0.10;

/// Per-level targets and the score below which a flow always leaks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelTargets {
    pub flow: FlowTargets,
    pub leak_floor: f64,
}

impl LevelTargets {
    pub fn for_level(level: PlayerLevel) -> Self {
        let (pelvis_dps, torso_dps, hand_mph, leak_floor) = match level {
            PlayerLevel::Youth => (450.0, 600.0, 16.0, 40.0),
            PlayerLevel::HighSchool => (550.0, 750.0, 20.0, 50.0),
            PlayerLevel::College => (620.0, 850.0, 22.0, 55.0),
            PlayerLevel::Pro => (700.0, 950.0, 24.0, 60.0),
        };
        Self {
            flow: FlowTargets {
                pelvis_dps,
                torso_dps,
                hand_mph,
            },
            leak_floor,
        }
    }
}

/// Everything the scorer reads for one swing.
#[derive(Debug, Clone, Copy)]
pub struct ScoreInputs<'a> {
    pub profile: &'a KinematicProfile,
    pub events: &'a SwingEvents,
    pub order_clamped: bool,
    pub ordering: &'a OrderingReport,
    pub gaps: SegmentGaps,
    pub quality: &'a QualityAssessment,
}

/// Deterministic flow scorer.
#[derive(Debug, Clone)]
pub struct MomentumScorer {
    window_half_width: usize,
    min_window_usable: usize,
}

impl Default for MomentumScorer {
    fn default() -> Self {
        Self::new(&EventConfig::default())
    }
}

impl MomentumScorer {
    pub fn new(config: &EventConfig) -> Self {
        Self {
            window_half_width: config.event_window_frames,
            min_window_usable: config.min_event_window_usable,
        }
    }

    /// Check usable coverage around each event.
    ///
    /// Returns whether any window is sparse. A window with no usable frame
    /// at all cannot support a score.
    pub fn event_coverage(
        &self,
        profile: &KinematicProfile,
        events: &SwingEvents,
    ) -> AnalysisResult<bool> {
        let mut sparse = false;
        for (name, frame) in [
            ("trigger", events.trigger_frame),
            ("fire", events.fire_frame),
            ("contact", events.contact_frame),
        ] {
            let usable = profile.usable_near(frame, self.window_half_width);
            if usable == 0 {
                return Err(AnalysisError::insufficient_data(format!(
                    "no usable frames around {name} frame {frame}"
                )));
            }
            if usable < self.min_window_usable {
                warn!(event = name, frame, usable, "Sparse pose data around swing event");
                sparse = true;
            }
        }
        Ok(sparse)
    }

    /// Peak speeds and head travel over the swing window.
    pub fn peaks(profile: &KinematicProfile, events: &SwingEvents, height_in: f64) -> SwingPeaks {
        let (from, to) = if events.trigger_frame < events.contact_frame {
            (events.trigger_frame, events.contact_frame)
        } else {
            (0, events.contact_frame)
        };
        let hand_units = KinematicProfile::peak(&profile.hand_speed, from, to);
        let hand_mph = hand_units / profile.body_height * height_in / INCHES_PER_SEC_PER_MPH;

        SwingPeaks {
            pelvis: KinematicProfile::peak(&profile.pelvis_speed, from, to),
            torso: KinematicProfile::peak(&profile.torso_speed, from, to),
            arm: KinematicProfile::peak(&profile.arm_speed, from, to),
            hand_mph,
            head_displacement: profile.head_displacement(from, to),
        }
    }

    /// Score one swing.
    pub fn score(
        &self,
        inputs: ScoreInputs<'_>,
        options: &ScoringOptions,
    ) -> AnalysisResult<MomentumTransferResult> {
        let ScoreInputs {
            profile,
            events,
            order_clamped,
            ordering,
            gaps,
            quality,
        } = inputs;
        if !events.is_ordered() {
            return Err(AnalysisError::invalid_input(format!(
                "events out of order: trigger {}, fire {}, contact {}",
                events.trigger_frame, events.fire_frame, events.contact_frame
            )));
        }

        let sparse = self.event_coverage(profile, events)?;
        let targets = LevelTargets::for_level(options.level());
        let height_in = options.player_height_inches.unwrap_or(DEFAULT_PLAYER_HEIGHT_IN);

        let peaks = Self::peaks(profile, events, height_in);
        let timing = SequenceAnalyzer::timing(events, gaps, profile.fps);

        let ground = flow::ground_flow(&peaks, &targets.flow);
        let power = flow::power_flow(&peaks, &targets.flow, &gaps);
        let barrel = flow::barrel_flow(&peaks, &targets.flow, &gaps);
        let momentum = flow::momentum_flow(ordering.inversions.len(), timing.ab_ratio, &gaps);

        let composite = flow::clamp_score(
            MOMENTUM_WEIGHT * momentum
                + GROUND_WEIGHT * ground
                + POWER_WEIGHT * power
                + BARREL_WEIGHT * barrel,
        );
        let band = band_for(composite);
        let band_label = BandLabel::from_band(band);

        let severity = |sub: f64| leak_severity(leak_deficit(sub, composite, targets.leak_floor));
        let (ground_leak, power_leak, barrel_leak) = (severity(ground), severity(power), severity(barrel));
        let leak = main_leak([
            (MainLeak::Ground, ground, ground_leak),
            (MainLeak::Power, power, power_leak),
            (MainLeak::Barrel, barrel, barrel_leak),
        ]);
        let leak_level = match leak {
            MainLeak::Ground => ground_leak,
            MainLeak::Power => power_leak,
            MainLeak::Barrel => barrel_leak,
            MainLeak::None => LeakSeverity::None,
        };

        let (confidence, data_quality) = if sparse {
            (quality.confidence * 0.5, DataQuality::Low)
        } else {
            (quality.confidence, quality.data_quality)
        };
        let flags = AnalysisFlags {
            sequence_anomaly: ordering.broken || order_clamped,
            broken_sequence: ordering.broken,
            event_order_clamped: order_clamped,
            sparse_event_window: sparse,
        };

        debug!(
            composite,
            momentum,
            ground,
            power,
            barrel,
            band,
            main_leak = leak.as_str(),
            "Scored swing"
        );

        let flow_score = |score: f64, level: LeakSeverity| FlowScore {
            score: round1(score),
            leak_severity: level,
        };
        Ok(MomentumTransferResult {
            composite_score: round1(composite),
            band,
            band_label,
            sub_scores: SubScores {
                ground: flow_score(ground, ground_leak),
                power: flow_score(power, power_leak),
                barrel: flow_score(barrel, barrel_leak),
            },
            momentum_score: round1(momentum),
            timing: Timing {
                ab_ratio: round2(timing.ab_ratio),
                load_duration_ms: round1(timing.load_duration_ms),
                swing_duration_ms: round1(timing.swing_duration_ms),
                segment_gaps: SegmentGaps {
                    pelvis_to_torso: round1(gaps.pelvis_to_torso),
                    torso_to_arm: round1(gaps.torso_to_arm),
                    arm_to_bat: round1(gaps.arm_to_bat),
                },
            },
            events: *events,
            main_leak: leak,
            confidence: round2(confidence),
            data_quality,
            flags,
            coaching_summary: coaching::summary(band_label, leak, leak_level, ordering),
        })
    }
}

/// Score a series from already-detected events and chain gaps.
///
/// Events that break `trigger <= fire <= contact` are clamped into order
/// and reported through `eventOrderClamped`. Clamping already applied by
/// [`detect_events`](crate::events::detect_events) is not visible here, so
/// callers that need that flag should score through
/// [`AnalysisContext::analyze`](crate::AnalysisContext::analyze).
pub fn score(
    series: &JointSeries,
    events: &SwingEvents,
    gaps: &SegmentGaps,
    player_height_inches: Option<f64>,
    player_level: Option<PlayerLevel>,
) -> AnalysisResult<MomentumTransferResult> {
    let options = ScoringOptions {
        player_height_inches,
        player_level,
        manual_contact_frame_index: None,
    };
    options.validate()?;

    let (events, order_clamped) =
        SwingEvents::ordered(events.trigger_frame, events.fire_frame, events.contact_frame);
    let profile = KinematicProfile::build(series)?;
    let ordering = SequenceAnalyzer::default().ordering(&profile, &events)?;
    let quality = assess(series);
    MomentumScorer::default().score(
        ScoreInputs {
            profile: &profile,
            events: &events,
            order_clamped,
            ordering: &ordering,
            gaps: *gaps,
            quality: &quality,
        },
        &options,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::detect_events;
    use crate::sequence::compute_gaps;
    use crate::synthetic::SyntheticSwing;
    use swing_models::ChainLink;

    fn scored(swing: SyntheticSwing, level: Option<PlayerLevel>) -> MomentumTransferResult {
        let series = swing.build();
        let events = detect_events(&series, None).unwrap().events;
        let gaps = compute_gaps(&series, &events).unwrap();
        score(&series, &events, &gaps, None, level).unwrap()
    }

    #[test]
    fn test_clean_swing_scores_well() {
        let result = scored(SyntheticSwing::default(), None);
        assert!(result.composite_score >= 80.0, "{result:?}");
        assert!(result.band >= 2);
        assert_eq!(result.momentum_score, 100.0);
        assert!(!result.flags.sequence_anomaly);
        assert_eq!(result.data_quality, DataQuality::High);
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_higher_level_scores_lower() {
        let youth = scored(SyntheticSwing::default(), Some(PlayerLevel::Youth));
        let pro = scored(SyntheticSwing::default(), Some(PlayerLevel::Pro));
        assert!(pro.composite_score <= youth.composite_score);
        assert!(pro.sub_scores.ground.score <= youth.sub_scores.ground.score);
    }

    #[test]
    fn test_slow_pelvis_leaks_ground() {
        let result = scored(
            SyntheticSwing::default()
                .with_rotation(ChainLink::Pelvis, 40.0)
                .with_head_drift(0.12),
            None,
        );
        assert_eq!(result.main_leak, MainLeak::Ground);
        assert!(result.sub_scores.ground.leak_severity >= LeakSeverity::Moderate);
    }

    #[test]
    fn test_rejects_unrealistic_height() {
        let series = SyntheticSwing::default().build();
        let events = detect_events(&series, None).unwrap().events;
        let gaps = compute_gaps(&series, &events).unwrap();
        assert!(matches!(
            score(&series, &events, &gaps, Some(200.0), None),
            Err(AnalysisError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_unordered_events_are_clamped_and_flagged() {
        let series = SyntheticSwing::default().build();
        let events = SwingEvents {
            trigger_frame: 50,
            fire_frame: 40,
            contact_frame: 60,
        };
        let result = score(&series, &events, &SegmentGaps::default(), None, None).unwrap();

        assert_eq!(result.events.trigger_frame, 40);
        assert_eq!(result.events.fire_frame, 40);
        assert_eq!(result.events.contact_frame, 60);
        assert!(result.flags.event_order_clamped);
        assert!(result.flags.sequence_anomaly);
    }

    #[test]
    fn test_level_targets() {
        let hs = LevelTargets::for_level(PlayerLevel::default());
        assert_eq!(hs.flow.pelvis_dps, 550.0);
        assert_eq!(hs.leak_floor, 50.0);
        assert_eq!(LevelTargets::for_level(PlayerLevel::Pro).flow.hand_mph, 24.0);
    }
}
