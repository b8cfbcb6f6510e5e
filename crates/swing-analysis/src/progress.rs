//! Analysis progress reporting.

use serde::{Deserialize, Serialize};

/// Pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStage {
    Extraction,
    Validation,
    Normalization,
    Kinematics,
    Events,
    Sequence,
    Scoring,
}

impl AnalysisStage {
    pub const ALL: [AnalysisStage; 7] = [
        AnalysisStage::Extraction,
        AnalysisStage::Validation,
        AnalysisStage::Normalization,
        AnalysisStage::Kinematics,
        AnalysisStage::Events,
        AnalysisStage::Sequence,
        AnalysisStage::Scoring,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStage::Extraction => "extraction",
            AnalysisStage::Validation => "validation",
            AnalysisStage::Normalization => "normalization",
            AnalysisStage::Kinematics => "kinematics",
            AnalysisStage::Events => "events",
            AnalysisStage::Sequence => "sequence",
            AnalysisStage::Scoring => "scoring",
        }
    }
}

/// Progress update emitted by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// A frame finished pose extraction
    FrameProcessed {
        processed: usize,
        total: usize,
        skipped: usize,
    },
    /// A pipeline stage finished
    StageCompleted { stage: AnalysisStage },
    /// Scoring finished
    Completed { composite_score: f64 },
}

impl ProgressEvent {
    /// Extraction progress as a percentage, when applicable.
    pub fn percentage(&self) -> Option<f64> {
        match self {
            ProgressEvent::FrameProcessed { processed, total, .. } if *total > 0 => {
                Some((*processed as f64 / *total as f64 * 100.0).min(100.0))
            }
            _ => None,
        }
    }
}

/// Callback type for progress updates.
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync + 'static>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_percentage() {
        let event = ProgressEvent::FrameProcessed {
            processed: 45,
            total: 90,
            skipped: 0,
        };
        assert!((event.percentage().unwrap() - 50.0).abs() < 0.01);

        let done = ProgressEvent::StageCompleted {
            stage: AnalysisStage::Scoring,
        };
        assert_eq!(done.percentage(), None);
    }

    #[test]
    fn test_event_json_is_tagged() {
        let json = serde_json::to_string(&ProgressEvent::StageCompleted {
            stage: AnalysisStage::Events,
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"stage_completed","stage":"events"}"#);
    }
}
