//! Coaching summary text.

use swing_models::{BandLabel, LeakSeverity, MainLeak};

use crate::sequence::OrderingReport;

fn leak_advice(leak: MainLeak, severity: LeakSeverity) -> &'static str {
    match (leak, severity) {
        (MainLeak::None, _) | (_, LeakSeverity::None) => {
            "Energy moves cleanly from the ground through the barrel. Keep repeating this move."
        }
        (MainLeak::Ground, LeakSeverity::Mild) => {
            "Ground flow is slightly behind. Push harder into the back leg before the hips open."
        }
        (MainLeak::Ground, LeakSeverity::Moderate) => {
            "The lower half is leaking energy. Load into the back hip and keep the head quiet through the turn."
        }
        (MainLeak::Ground, LeakSeverity::Severe) => {
            "The swing starts without a base. Rebuild the load with a firm front side and a still head."
        }
        (MainLeak::Power, LeakSeverity::Mild) => {
            "Power flow trails a little. Let the hips lead and feel the torso stretch before it turns."
        }
        (MainLeak::Power, LeakSeverity::Moderate) => {
            "The torso is not gaining speed from the hips. Delay shoulder rotation until the pelvis has fired."
        }
        (MainLeak::Power, LeakSeverity::Severe) => {
            "Hips and shoulders are turning together. Separate them with a hip-lead drill before adding speed."
        }
        (MainLeak::Barrel, LeakSeverity::Mild) => {
            "Barrel flow is close. Keep the hands inside the ball a beat longer."
        }
        (MainLeak::Barrel, LeakSeverity::Moderate) => {
            "Speed is lost between the arms and the bat. Let the barrel release after the arms extend."
        }
        (MainLeak::Barrel, LeakSeverity::Severe) => {
            "The hands are casting the barrel. Work on a connected path so the bat whips through contact."
        }
    }
}

/// One paragraph for the athlete, fixed per leak and severity.
pub fn summary(
    band_label: BandLabel,
    leak: MainLeak,
    severity: LeakSeverity,
    ordering: &OrderingReport,
) -> String {
    let mut text = format!("{}. {}", band_label, leak_advice(leak, severity));
    if let Some(inversion) = ordering.inversions.first() {
        text.push_str(&format!(
            " The {} fired before the {}; sequence proximal to distal.",
            inversion.fired_first, inversion.expected_first
        ));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::Inversion;
    use swing_models::ChainLink;

    fn report(inversions: Vec<Inversion>) -> OrderingReport {
        OrderingReport {
            onsets: ChainLink::ORDER.map(|l| (l, 0)),
            raw_gaps_ms: [0.0; 3],
            broken: !inversions.is_empty(),
            inversions,
        }
    }

    #[test]
    fn test_summary_is_keyed_by_leak() {
        let clean = summary(BandLabel::Elite, MainLeak::None, LeakSeverity::None, &report(vec![]));
        assert!(clean.starts_with("Elite."));

        let barrel = summary(
            BandLabel::Average,
            MainLeak::Barrel,
            LeakSeverity::Severe,
            &report(vec![]),
        );
        assert!(barrel.contains("casting"));
    }

    #[test]
    fn test_summary_mentions_inversion() {
        let text = summary(
            BandLabel::Developing,
            MainLeak::Power,
            LeakSeverity::Moderate,
            &report(vec![Inversion {
                expected_first: ChainLink::Torso,
                fired_first: ChainLink::Arm,
            }]),
        );
        assert!(text.contains("The arm fired before the torso"));
    }
}
