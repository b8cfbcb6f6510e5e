//! Analysis pipeline context.
//!
//! An [`AnalysisContext`] is built once by the caller and passed to every
//! call. It owns the tuning, the segmenter, the optional pose detector and
//! the optional progress callback; nothing here is process-wide.
//!
//! Pipeline: validate → assess → normalize → profile → events → sequence → score.

use std::time::Instant;

use image::RgbImage;
use serde::{Deserialize, Serialize};
use swing_models::{
    CameraAngle, ContactSource, Frame, Joint, JointSeries, MomentumTransferResult, ScoringOptions,
    SwingComparison,
};
use tokio::sync::watch;
use tracing::{debug, info, info_span, warn};
use validator::Validate;

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, AnalysisResult};
use crate::events::EventDetector;
use crate::kinematics::KinematicProfile;
use crate::metrics;
use crate::normalize::{normalize, validate_comparable};
use crate::pose::PoseDetectorHandle;
use crate::progress::{AnalysisStage, ProgressCallback, ProgressEvent};
use crate::quality::{assess, QualityAssessment};
use crate::scoring::{MomentumScorer, ScoreInputs};
use crate::segmentation::{FrameBuffer, Segmenter};
use crate::sequence::{OrderingReport, SequenceAnalyzer};

/// A joint series recovered from raw frames.
#[derive(Debug, Clone)]
pub struct ExtractedSeries {
    pub series: JointSeries,
    /// Frames whose pose detection failed
    pub skipped_frames: usize,
    /// Frames segmented with the full-frame fallback mask
    pub fallback_frames: usize,
}

/// Result of analyzing one swing, with the intermediate reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwingAnalysis {
    pub result: MomentumTransferResult,
    pub quality: QualityAssessment,
    pub ordering: OrderingReport,
    pub contact_source: ContactSource,
}

/// Shared state for analysis calls.
pub struct AnalysisContext {
    config: AnalysisConfig,
    segmenter: Segmenter,
    detector: Option<PoseDetectorHandle>,
    progress: Option<ProgressCallback>,
}

impl AnalysisContext {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            segmenter: Segmenter::new(config.segmentation.clone()),
            config,
            detector: None,
            progress: None,
        }
    }

    /// Attach a pose detector for frame extraction.
    pub fn with_detector(mut self, detector: PoseDetectorHandle) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(callback) = &self.progress {
            callback(event);
        }
    }

    fn stage_done(&self, stage: AnalysisStage) {
        self.emit(ProgressEvent::StageCompleted { stage });
    }

    fn check_cancelled(cancel: &watch::Receiver<bool>) -> AnalysisResult<()> {
        if *cancel.borrow() {
            return Err(AnalysisError::Cancelled);
        }
        Ok(())
    }

    /// Recover a joint series from decoded frames.
    ///
    /// Frames are segmented and detected in order. Each frame's mask is
    /// seeded from the torso joints detected on the previous frame; the
    /// first frame and any frame after a miss fall back to the centre seed.
    /// A frame that fails detection is kept as a missing frame so the
    /// timeline stays intact.
    pub fn extract_series(
        &self,
        frames: &[RgbImage],
        fps: f64,
        camera_angle: CameraAngle,
        cancel: &watch::Receiver<bool>,
    ) -> AnalysisResult<ExtractedSeries> {
        let detector = self
            .detector
            .as_ref()
            .ok_or_else(|| AnalysisError::invalid_input("no pose detector configured"))?;
        if !(fps.is_finite() && fps > 0.0) {
            return Err(AnalysisError::invalid_input(format!("invalid frame rate {fps}")));
        }

        let total = frames.len();
        let mut extracted = Vec::with_capacity(total);
        let mut skipped_frames = 0;
        let mut fallback_frames = 0;
        let mut previous: Option<Vec<Joint>> = None;

        for (index, image) in frames.iter().enumerate() {
            Self::check_cancelled(cancel)?;

            let timestamp_ms = index as f64 / fps * 1000.0;
            let buffer = FrameBuffer::from_rgb(image);
            let mask = self.segmenter.segment(&buffer, previous.as_deref());
            if mask.fallback {
                fallback_frames += 1;
                metrics::record_segmentation_fallback();
                warn!(frame = index, "Segmentation fell back to full frame");
            }
            let roi = mask.detector_roi();
            debug!(
                frame = index,
                seeded = mask.seeded,
                capped = mask.capped,
                roi = ?roi,
                "Segmented frame"
            );

            let frame = match detector.detect(&buffer, roi) {
                Ok(joints) => {
                    previous = Some(joints.clone());
                    Frame::new(index as u32, timestamp_ms, joints)
                }
                Err(e) => {
                    previous = None;
                    skipped_frames += 1;
                    metrics::record_frame_skipped(e.reason());
                    warn!(frame = index, reason = e.reason(), error = %e, "Skipping frame");
                    Frame::missing(index as u32, timestamp_ms)
                }
            };
            extracted.push(frame);

            self.emit(ProgressEvent::FrameProcessed {
                processed: index + 1,
                total,
                skipped: skipped_frames,
            });
        }
        self.stage_done(AnalysisStage::Extraction);

        info!(
            frames = total,
            skipped = skipped_frames,
            fallback = fallback_frames,
            "Extracted joint series"
        );

        Ok(ExtractedSeries {
            series: JointSeries::new(extracted, fps, camera_angle),
            skipped_frames,
            fallback_frames,
        })
    }

    /// Analyze one swing.
    pub fn analyze(
        &self,
        series: &JointSeries,
        options: &ScoringOptions,
        cancel: &watch::Receiver<bool>,
    ) -> AnalysisResult<SwingAnalysis> {
        let span = info_span!(
            "swing_analysis",
            frames = series.len(),
            fps = series.fps,
            camera_angle = series.camera_angle.as_str()
        );
        let _guard = span.enter();

        let started = Instant::now();
        let outcome = self.run(series, options, cancel);
        let elapsed = started.elapsed().as_secs_f64();

        match &outcome {
            Ok(analysis) => {
                metrics::record_analysis("ok", elapsed);
                if analysis.result.flags.sequence_anomaly {
                    metrics::record_sequence_anomaly();
                }
                info!(
                    composite = analysis.result.composite_score,
                    band = analysis.result.band,
                    main_leak = analysis.result.main_leak.as_str(),
                    elapsed_ms = (elapsed * 1000.0) as u64,
                    "Swing analysis complete"
                );
                self.emit(ProgressEvent::Completed {
                    composite_score: analysis.result.composite_score,
                });
            }
            Err(e) => {
                metrics::record_analysis(e.kind().as_str(), elapsed);
                warn!(kind = e.kind().as_str(), error = %e, "Swing analysis failed");
            }
        }
        outcome
    }

    fn run(
        &self,
        series: &JointSeries,
        options: &ScoringOptions,
        cancel: &watch::Receiver<bool>,
    ) -> AnalysisResult<SwingAnalysis> {
        options.validate()?;
        series.validate()?;
        let quality = assess(series);
        if quality.usable_frames == 0 {
            return Err(AnalysisError::insufficient_data(format!(
                "none of {} frames has usable pose data",
                quality.total_frames
            )));
        }
        self.stage_done(AnalysisStage::Validation);
        Self::check_cancelled(cancel)?;

        let normalized = normalize(series, self.config.canonical_height)?;
        self.stage_done(AnalysisStage::Normalization);
        Self::check_cancelled(cancel)?;

        let profile = KinematicProfile::build(&normalized)?;
        self.stage_done(AnalysisStage::Kinematics);
        Self::check_cancelled(cancel)?;

        let detection = EventDetector::new(self.config.events.clone()).detect(
            &profile,
            normalized.impact_frame_index,
            options.manual_contact_frame_index,
        )?;
        self.stage_done(AnalysisStage::Events);

        let ordering =
            SequenceAnalyzer::new(self.config.sequence.clone()).ordering(&profile, &detection.events)?;
        self.stage_done(AnalysisStage::Sequence);
        Self::check_cancelled(cancel)?;

        let result = MomentumScorer::new(&self.config.events).score(
            ScoreInputs {
                profile: &profile,
                events: &detection.events,
                order_clamped: detection.order_clamped,
                ordering: &ordering,
                gaps: ordering.gaps(),
                quality: &quality,
            },
            options,
        )?;
        self.stage_done(AnalysisStage::Scoring);

        debug!(
            usable = quality.usable_frames,
            total = quality.total_frames,
            source = ?detection.contact_source,
            "Scored swing from series"
        );

        Ok(SwingAnalysis {
            result,
            quality,
            ordering,
            contact_source: detection.contact_source,
        })
    }

    /// Score two swings from the same camera angle side by side.
    pub fn compare(
        &self,
        baseline: &JointSeries,
        candidate: &JointSeries,
        options: &ScoringOptions,
        cancel: &watch::Receiver<bool>,
    ) -> AnalysisResult<SwingComparison> {
        validate_comparable(baseline, candidate)?;

        // Manual contact refers to a single swing's timeline
        let shared = ScoringOptions {
            manual_contact_frame_index: None,
            ..options.clone()
        };
        let baseline = self.analyze(baseline, &shared, cancel)?;
        let candidate = self.analyze(candidate, &shared, cancel)?;
        Ok(SwingComparison::new(baseline.result, candidate.result))
    }
}

impl Default for AnalysisContext {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl std::fmt::Debug for AnalysisContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisContext")
            .field("config", &self.config)
            .field("detector", &self.detector)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}
