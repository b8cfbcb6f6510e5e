//! Swing assessment output.
//!
//! Everything here is derived data, computed fresh per swing and never
//! mutated afterwards. Serialises to a flat JSON structure with no cycles.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key frames of a swing, as positions into the series' frames.
///
/// Always ordered `trigger_frame <= fire_frame <= contact_frame`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SwingEvents {
    /// Load/trigger onset (A)
    pub trigger_frame: usize,
    /// Rotation initiation (B)
    pub fire_frame: usize,
    /// Ball contact (C)
    pub contact_frame: usize,
}

impl SwingEvents {
    /// Build events, clamping into order. Returns whether clamping was needed.
    pub fn ordered(trigger: usize, fire: usize, contact: usize) -> (Self, bool) {
        let fire_clamped = fire.min(contact);
        let trigger_clamped = trigger.min(fire_clamped);
        let clamped = fire_clamped != fire || trigger_clamped != trigger;
        (
            Self {
                trigger_frame: trigger_clamped,
                fire_frame: fire_clamped,
                contact_frame: contact,
            },
            clamped,
        )
    }

    /// Whether `trigger_frame <= fire_frame <= contact_frame` holds.
    ///
    /// Fields are public and deserializable, so hand-built events may not.
    pub fn is_ordered(&self) -> bool {
        self.trigger_frame <= self.fire_frame && self.fire_frame <= self.contact_frame
    }

    /// Frames from trigger to fire (A to B), zero when out of order.
    pub fn load_frames(&self) -> usize {
        self.fire_frame.saturating_sub(self.trigger_frame)
    }

    /// Frames from fire to contact (B to C), zero when out of order.
    pub fn swing_frames(&self) -> usize {
        self.contact_frame.saturating_sub(self.fire_frame)
    }
}

/// Where the contact frame came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ContactSource {
    /// Reviewer-supplied override
    Manual,
    /// Impact frame recorded on the series
    ImpactIndex,
    /// Peak hand speed heuristic
    VelocityPeak,
}

/// Segment of the kinetic chain, proximal to distal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChainLink {
    Pelvis,
    Torso,
    Arm,
    Bat,
}

impl ChainLink {
    /// Expected firing order.
    pub const ORDER: [ChainLink; 4] = [ChainLink::Pelvis, ChainLink::Torso, ChainLink::Arm, ChainLink::Bat];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChainLink::Pelvis => "pelvis",
            ChainLink::Torso => "torso",
            ChainLink::Arm => "arm",
            ChainLink::Bat => "bat",
        }
    }
}

impl fmt::Display for ChainLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Time between successive chain links firing, clamped non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SegmentGaps {
    pub pelvis_to_torso: f64,
    pub torso_to_arm: f64,
    pub arm_to_bat: f64,
}

impl SegmentGaps {
    /// Gaps in chain order, paired with the link that fires second.
    pub fn ordered(&self) -> [(ChainLink, f64); 3] {
        [
            (ChainLink::Torso, self.pelvis_to_torso),
            (ChainLink::Arm, self.torso_to_arm),
            (ChainLink::Bat, self.arm_to_bat),
        ]
    }
}

/// Tempo and chain timing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Timing {
    /// Duration(trigger to fire) / duration(fire to contact)
    pub ab_ratio: f64,
    pub load_duration_ms: f64,
    /// Time from the start of the series to contact
    pub swing_duration_ms: f64,
    pub segment_gaps: SegmentGaps,
}

/// How badly a chain link leaks energy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum LeakSeverity {
    #[default]
    None,
    Mild,
    Moderate,
    Severe,
}

impl LeakSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeakSeverity::None => "none",
            LeakSeverity::Mild => "mild",
            LeakSeverity::Moderate => "moderate",
            LeakSeverity::Severe => "severe",
        }
    }
}

/// One sub-component score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlowScore {
    /// 0-100
    pub score: f64,
    pub leak_severity: LeakSeverity,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SubScores {
    pub ground: FlowScore,
    pub power: FlowScore,
    pub barrel: FlowScore,
}

/// Human label for a composite band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BandLabel {
    Elite,
    Advanced,
    AboveAverage,
    Average,
    BelowAverage,
    Developing,
    NeedsWork,
}

impl BandLabel {
    /// Label for a band in `[-3, 3]`; out-of-range values saturate.
    pub fn from_band(band: i8) -> Self {
        match band {
            b if b >= 3 => BandLabel::Elite,
            2 => BandLabel::Advanced,
            1 => BandLabel::AboveAverage,
            0 => BandLabel::Average,
            -1 => BandLabel::BelowAverage,
            -2 => BandLabel::Developing,
            _ => BandLabel::NeedsWork,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BandLabel::Elite => "Elite",
            BandLabel::Advanced => "Advanced",
            BandLabel::AboveAverage => "Above Average",
            BandLabel::Average => "Average",
            BandLabel::BelowAverage => "Below Average",
            BandLabel::Developing => "Developing",
            BandLabel::NeedsWork => "Needs Work",
        }
    }
}

impl fmt::Display for BandLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// The weakest link in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MainLeak {
    Ground,
    Power,
    Barrel,
    None,
}

impl MainLeak {
    pub fn as_str(&self) -> &'static str {
        match self {
            MainLeak::Ground => "ground",
            MainLeak::Power => "power",
            MainLeak::Barrel => "barrel",
            MainLeak::None => "none",
        }
    }
}

/// Coarse trust level of the pose data behind a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DataQuality {
    Low,
    Medium,
    High,
}

/// Non-fatal diagnostics attached to a successful result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisFlags {
    /// Any ordering problem: broken chain or clamped events
    pub sequence_anomaly: bool,
    /// A distal link fired before a proximal one
    pub broken_sequence: bool,
    /// Event detection produced out-of-order frames that were clamped
    pub event_order_clamped: bool,
    /// Too few usable frames around an event; confidence was reduced
    pub sparse_event_window: bool,
}

/// Terminal artifact of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MomentumTransferResult {
    /// 0-100
    pub composite_score: f64,
    /// -3..=3
    pub band: i8,
    pub band_label: BandLabel,
    pub sub_scores: SubScores,
    /// Momentum-transfer component of the composite (0-100)
    pub momentum_score: f64,
    pub timing: Timing,
    pub events: SwingEvents,
    pub main_leak: MainLeak,
    /// 0-1
    pub confidence: f64,
    pub data_quality: DataQuality,
    pub flags: AnalysisFlags,
    pub coaching_summary: String,
}

impl MomentumTransferResult {
    /// Score shape expected by older consumers.
    pub fn legacy_scores(&self) -> LegacyScores {
        LegacyScores {
            anchor: to_legacy(self.sub_scores.ground.score),
            engine: to_legacy(self.sub_scores.power.score),
            whip: to_legacy(self.sub_scores.barrel.score),
        }
    }
}

fn to_legacy(score: f64) -> u8 {
    score.round().clamp(0.0, 100.0) as u8
}

/// Legacy three-score projection (ground, power, barrel flow).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LegacyScores {
    pub anchor: u8,
    pub engine: u8,
    pub whip: u8,
}

/// Two swings from the same camera angle, scored side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SwingComparison {
    pub baseline: MomentumTransferResult,
    pub candidate: MomentumTransferResult,
    /// Candidate minus baseline
    pub composite_delta: f64,
    pub ground_delta: f64,
    pub power_delta: f64,
    pub barrel_delta: f64,
}

impl SwingComparison {
    pub fn new(baseline: MomentumTransferResult, candidate: MomentumTransferResult) -> Self {
        let delta = |a: f64, b: f64| ((b - a) * 10.0).round() / 10.0;
        Self {
            composite_delta: delta(baseline.composite_score, candidate.composite_score),
            ground_delta: delta(baseline.sub_scores.ground.score, candidate.sub_scores.ground.score),
            power_delta: delta(baseline.sub_scores.power.score, candidate.sub_scores.power.score),
            barrel_delta: delta(baseline.sub_scores.barrel.score, candidate.sub_scores.barrel.score),
            baseline,
            candidate,
        }
    }
}
