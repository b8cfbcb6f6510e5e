//! Swing event detection.
//!
//! Locates the three key frames of a swing:
//! - Contact (C): manual override, recorded impact frame, or peak hand speed
//! - Fire (B): torso rotation onset before contact
//! - Trigger (A): pelvis load onset, including the backward coil when present
//!
//! Results are always returned in order; out-of-order detections are
//! clamped and flagged rather than rejected.

use serde::{Deserialize, Serialize};
use swing_models::{ContactSource, JointSeries, SwingEvents};
use tracing::{debug, warn};

use crate::config::EventConfig;
use crate::error::{AnalysisError, AnalysisResult};
use crate::kinematics::KinematicProfile;
use crate::stats::argmax_in;

/// Detected events plus how they were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetection {
    pub events: SwingEvents,
    pub contact_source: ContactSource,
    /// Raw detections were out of order and had to be clamped
    pub order_clamped: bool,
}

/// Walk backward from `from` up to the nearest local maximum.
fn climb_back(curve: &[f64], from: usize) -> usize {
    let mut i = from;
    while i > 0 && curve[i - 1] >= curve[i] {
        i -= 1;
    }
    i
}

/// Walk backward from a peak until the curve goes quiet or turns upward.
fn descend_back(curve: &[f64], peak: usize, quiet: f64) -> usize {
    let mut i = peak;
    while i > 0 && curve[i] > quiet && curve[i - 1] <= curve[i] {
        i -= 1;
    }
    i
}

/// Walk backward to the bottom of a valley, across flat stretches.
fn valley_back(curve: &[f64], from: usize) -> usize {
    let mut i = from;
    while i > 0 && curve[i - 1] <= curve[i] {
        i -= 1;
    }
    i
}

/// Event detector over a kinematic profile.
#[derive(Debug, Clone, Default)]
pub struct EventDetector {
    config: EventConfig,
}

impl EventDetector {
    pub fn new(config: EventConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EventConfig {
        &self.config
    }

    /// Pick the contact frame by priority: manual, impact index, hand speed peak.
    pub fn contact(
        &self,
        profile: &KinematicProfile,
        impact_index: Option<usize>,
        manual: Option<usize>,
    ) -> AnalysisResult<(usize, ContactSource)> {
        let len = profile.len();
        if let Some(frame) = manual {
            if frame >= len {
                return Err(AnalysisError::invalid_input(format!(
                    "manual contact frame {frame} is outside a series of {len} frames"
                )));
            }
            return Ok((frame, ContactSource::Manual));
        }
        if let Some(frame) = impact_index.filter(|f| *f < len) {
            return Ok((frame, ContactSource::ImpactIndex));
        }

        // Endpoint speeds come from one-sided differences; skip them when possible
        let range = if len >= 3 { 1..len - 1 } else { 0..len };
        let frame = argmax_in(&profile.hand_speed, range)
            .ok_or_else(|| AnalysisError::insufficient_data("no frames to locate contact"))?;
        Ok((frame, ContactSource::VelocityPeak))
    }

    /// Rotation onset of a segment before `contact`.
    fn onset_before(&self, curve: &[f64], contact: usize) -> (usize, f64) {
        let peak = climb_back(curve, contact);
        let peak_value = curve[peak];
        (descend_back(curve, peak, self.config.quiet_fraction * peak_value), peak_value)
    }

    /// Load onset of the pelvis, continuing over a preceding coil bump.
    fn trigger_before(&self, curve: &[f64], contact: usize) -> usize {
        let (quiet_point, forward_peak) = self.onset_before(curve, contact);
        if forward_peak <= 0.0 {
            return quiet_point;
        }

        let turnaround = valley_back(curve, quiet_point);
        let coil_peak = climb_back(curve, turnaround);
        let coil_value = curve[coil_peak];
        if coil_peak < turnaround && coil_value >= self.config.coil_fraction * forward_peak {
            let load_onset = descend_back(curve, coil_peak, self.config.quiet_fraction * coil_value);
            debug!(coil_peak, load_onset, "Pelvis coil found before forward rotation");
            load_onset
        } else {
            quiet_point
        }
    }

    /// Detect trigger, fire and contact.
    pub fn detect(
        &self,
        profile: &KinematicProfile,
        impact_index: Option<usize>,
        manual: Option<usize>,
    ) -> AnalysisResult<EventDetection> {
        let (contact, contact_source) = self.contact(profile, impact_index, manual)?;
        let (fire, _) = self.onset_before(&profile.torso_speed, contact);
        let trigger = self.trigger_before(&profile.pelvis_speed, contact);

        let (events, order_clamped) = SwingEvents::ordered(trigger, fire, contact);
        if order_clamped {
            warn!(
                trigger,
                fire,
                contact,
                "Swing events out of order, clamped"
            );
        }
        debug!(
            trigger = events.trigger_frame,
            fire = events.fire_frame,
            contact = events.contact_frame,
            source = ?contact_source,
            "Detected swing events"
        );

        Ok(EventDetection {
            events,
            contact_source,
            order_clamped,
        })
    }
}

/// Detect swing events in a series with default tuning.
pub fn detect_events(
    series: &JointSeries,
    manual_contact: Option<usize>,
) -> AnalysisResult<EventDetection> {
    let profile = KinematicProfile::build(series)?;
    EventDetector::default().detect(&profile, series.impact_frame_index, manual_contact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::SyntheticSwing;
    use swing_models::ChainLink;

    #[test]
    fn test_events_bracket_the_swing() {
        let swing = SyntheticSwing::default();
        let detection = detect_events(&swing.build(), None).unwrap();
        let events = detection.events;

        assert_eq!(detection.contact_source, ContactSource::ImpactIndex);
        assert_eq!(events.contact_frame, swing.contact());
        assert!(!detection.order_clamped);

        let torso_onset = swing.onset(ChainLink::Torso);
        assert!(
            (torso_onset..torso_onset + 4).contains(&events.fire_frame),
            "fire {}",
            events.fire_frame
        );
        // Trigger sits at the start of the coil, well before forward rotation
        let load = swing.load_start();
        assert!(
            (load..load + 4).contains(&events.trigger_frame),
            "trigger {}",
            events.trigger_frame
        );
    }

    #[test]
    fn test_trigger_without_coil_is_pelvis_onset() {
        let swing = SyntheticSwing::default().with_coil_degrees(0.0);
        let events = detect_events(&swing.build(), None).unwrap().events;
        let pelvis_onset = swing.onset(ChainLink::Pelvis);
        assert!(
            (pelvis_onset..pelvis_onset + 4).contains(&events.trigger_frame),
            "trigger {}",
            events.trigger_frame
        );
    }

    #[test]
    fn test_manual_contact_wins() {
        let series = SyntheticSwing::default().build();
        let detection = detect_events(&series, Some(58)).unwrap();
        assert_eq!(detection.contact_source, ContactSource::Manual);
        assert_eq!(detection.events.contact_frame, 58);

        assert!(matches!(
            detect_events(&series, Some(500)),
            Err(AnalysisError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_contact_from_hand_speed_peak() {
        let swing = SyntheticSwing::default().without_impact_index();
        let detection = detect_events(&swing.build(), None).unwrap();
        assert_eq!(detection.contact_source, ContactSource::VelocityPeak);
        let arm_onset = swing.onset(ChainLink::Arm);
        assert!((arm_onset..arm_onset + 12).contains(&detection.events.contact_frame));
    }

    #[test]
    fn test_early_contact_clamps_order() {
        let series = SyntheticSwing::default().build();
        let detection = detect_events(&series, Some(5)).unwrap();
        let events = detection.events;
        assert!(events.trigger_frame <= events.fire_frame);
        assert!(events.fire_frame <= events.contact_frame);
    }

    #[test]
    fn test_valley_helpers() {
        let curve = [0.0, 1.0, 3.0, 1.0, 0.0, 0.0, 2.0, 5.0, 2.0];
        assert_eq!(climb_back(&curve, 8), 7);
        assert_eq!(descend_back(&curve, 7, 1.0), 5);
        assert_eq!(valley_back(&curve, 5), 4);
        assert_eq!(climb_back(&curve, 4), 2);
    }
}
