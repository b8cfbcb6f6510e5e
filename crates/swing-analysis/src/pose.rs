//! Pose detector seam.
//!
//! The landmark model itself lives outside this crate. Callers plug it in
//! through [`PoseDetector`] and the pipeline talks to it only via a
//! [`PoseDetectorHandle`], which serializes calls and enforces the
//! per-frame time budget.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use swing_models::{Joint, LANDMARK_COUNT};
use tracing::{debug, warn};

use crate::error::FrameProcessingError;
use crate::segmentation::{BoundingBox, FrameBuffer};

/// A landmark detector producing the 33-joint topology for one frame.
pub trait PoseDetector: Send {
    /// Detect landmarks in `frame`, optionally restricted to `roi`.
    ///
    /// Implementations should give up once `timeout` has elapsed.
    fn detect(
        &mut self,
        frame: &FrameBuffer<'_>,
        roi: Option<BoundingBox>,
        timeout: Duration,
    ) -> Result<Vec<Joint>, FrameProcessingError>;
}

/// Owns a detector and allows one in-flight request at a time.
pub struct PoseDetectorHandle {
    detector: Mutex<Box<dyn PoseDetector>>,
    timeout: Duration,
}

impl PoseDetectorHandle {
    pub fn new(detector: Box<dyn PoseDetector>, timeout: Duration) -> Self {
        Self {
            detector: Mutex::new(detector),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run the detector on one frame.
    ///
    /// Results arriving after the budget are discarded as a timeout, and a
    /// detection without the full topology counts as empty.
    pub fn detect(
        &self,
        frame: &FrameBuffer<'_>,
        roi: Option<BoundingBox>,
    ) -> Result<Vec<Joint>, FrameProcessingError> {
        let mut detector = self.detector.lock().map_err(|_| {
            FrameProcessingError::detector_failed("detector lock poisoned by an earlier panic")
        })?;

        let started = Instant::now();
        let result = detector.detect(frame, roi, self.timeout);
        let elapsed = started.elapsed();

        if elapsed > self.timeout {
            warn!(
                elapsed_ms = elapsed.as_millis() as u64,
                budget_ms = self.timeout.as_millis() as u64,
                "Discarding late pose detection"
            );
            return Err(FrameProcessingError::Timeout(self.timeout));
        }

        let joints = result?;
        if joints.len() != LANDMARK_COUNT {
            debug!(found = joints.len(), "Pose detection returned partial topology");
            return Err(FrameProcessingError::EmptyDetection);
        }
        Ok(joints)
    }
}

impl std::fmt::Debug for PoseDetectorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoseDetectorHandle")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swing_models::JointId;

    struct FixedDetector {
        joints: usize,
        delay: Duration,
    }

    impl PoseDetector for FixedDetector {
        fn detect(
            &mut self,
            _frame: &FrameBuffer<'_>,
            _roi: Option<BoundingBox>,
            _timeout: Duration,
        ) -> Result<Vec<Joint>, FrameProcessingError> {
            std::thread::sleep(self.delay);
            Ok(JointId::ALL
                .iter()
                .take(self.joints)
                .map(|id| Joint::new(*id, 1.0, 1.0, 0.9))
                .collect())
        }
    }

    fn frame_bytes() -> Vec<u8> {
        vec![0; 4 * 4 * 3]
    }

    #[test]
    fn test_full_detection_passes() {
        let handle = PoseDetectorHandle::new(
            Box::new(FixedDetector { joints: 33, delay: Duration::ZERO }),
            Duration::from_secs(1),
        );
        let data = frame_bytes();
        let joints = handle.detect(&FrameBuffer::new(4, 4, &data), None).unwrap();
        assert_eq!(joints.len(), 33);
    }

    #[test]
    fn test_partial_detection_is_empty() {
        let handle = PoseDetectorHandle::new(
            Box::new(FixedDetector { joints: 5, delay: Duration::ZERO }),
            Duration::from_secs(1),
        );
        let data = frame_bytes();
        assert_eq!(
            handle.detect(&FrameBuffer::new(4, 4, &data), None),
            Err(FrameProcessingError::EmptyDetection)
        );
    }

    #[test]
    fn test_late_result_is_timeout() {
        let handle = PoseDetectorHandle::new(
            Box::new(FixedDetector { joints: 33, delay: Duration::from_millis(30) }),
            Duration::from_millis(5),
        );
        let data = frame_bytes();
        assert!(matches!(
            handle.detect(&FrameBuffer::new(4, 4, &data), None),
            Err(FrameProcessingError::Timeout(_))
        ));
    }
}
