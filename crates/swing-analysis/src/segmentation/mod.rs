//! Athlete foreground segmentation.
//!
//! Produces a binary mask isolating the athlete from the background so the
//! pose detector can focus on a region of interest. Segmentation never
//! fails: any internal problem yields a full-frame mask flagged as a
//! fallback.
//!
//! # Algorithm
//! 1. Seeds from confident torso joints, or the frame centre
//! 2. Sobel edge magnitude on luminance
//! 3. 4-connected region growing bounded by colour similarity, edges and a
//!    pixel budget

mod edges;
mod region;

pub use edges::sobel_magnitude;
pub use region::grow_region;

use image::RgbImage;
use serde::{Deserialize, Serialize};
use swing_models::{Joint, JointId};
use tracing::debug;

use crate::config::SegmentationConfig;

/// Borrowed packed RGB8 frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameBuffer<'a> {
    pub width: u32,
    pub height: u32,
    /// Row-major RGB triples, `width * height * 3` bytes
    pub data: &'a [u8],
}

impl<'a> FrameBuffer<'a> {
    pub fn new(width: u32, height: u32, data: &'a [u8]) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    /// View an `image` RGB buffer without copying.
    pub fn from_rgb(image: &'a RgbImage) -> Self {
        Self::new(image.width(), image.height(), image.as_raw())
    }

    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Whether the buffer length matches the declared dimensions.
    pub fn is_well_formed(&self) -> bool {
        self.area() > 0 && self.data.len() == self.area() * 3
    }

    /// RGB triple at a pixel offset. Caller guarantees the frame is well formed.
    #[inline]
    pub(crate) fn rgb(&self, pixel: usize) -> [u8; 3] {
        let o = pixel * 3;
        [self.data[o], self.data[o + 1], self.data[o + 2]]
    }
}

/// Axis-aligned pixel rectangle, inclusive of both corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x_min: u32,
    pub y_min: u32,
    pub x_max: u32,
    pub y_max: u32,
}

impl BoundingBox {
    pub fn width(&self) -> u32 {
        self.x_max - self.x_min + 1
    }

    pub fn height(&self) -> u32 {
        self.y_max - self.y_min + 1
    }
}

/// Binary foreground mask with the same dimensions as its source frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationMask {
    pub width: u32,
    pub height: u32,
    /// One byte per pixel, 0 or 255
    pub bitmap: Vec<u8>,
    pub confidence: f32,
    /// Set when segmentation could not run and the whole frame was kept
    pub fallback: bool,
    /// Grown from torso joints rather than the frame centre
    pub seeded: bool,
    /// Growth stopped at the pixel budget
    pub capped: bool,
}

impl SegmentationMask {
    /// Mask covering every pixel.
    pub fn full_frame(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bitmap: vec![255; width as usize * height as usize],
            confidence: 1.0,
            fallback: true,
            seeded: false,
            capped: false,
        }
    }

    /// Bounding box worth handing to a pose detector.
    ///
    /// Only a torso-seeded region that grew to its natural edge is trusted;
    /// a centre blob or a capped region can sit beside the athlete.
    pub fn detector_roi(&self) -> Option<BoundingBox> {
        if self.fallback || !self.seeded || self.capped {
            return None;
        }
        self.bounding_box()
    }

    pub fn is_set(&self, x: u32, y: u32) -> bool {
        x < self.width
            && y < self.height
            && self.bitmap[(y * self.width + x) as usize] == 255
    }

    /// Number of foreground pixels.
    pub fn coverage(&self) -> usize {
        self.bitmap.iter().filter(|&&b| b == 255).count()
    }

    /// Smallest rectangle enclosing every set pixel.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut bbox: Option<BoundingBox> = None;
        for y in 0..self.height {
            for x in 0..self.width {
                if self.bitmap[(y * self.width + x) as usize] != 255 {
                    continue;
                }
                bbox = Some(match bbox {
                    None => BoundingBox {
                        x_min: x,
                        y_min: y,
                        x_max: x,
                        y_max: y,
                    },
                    Some(b) => BoundingBox {
                        x_min: b.x_min.min(x),
                        y_min: b.y_min.min(y),
                        x_max: b.x_max.max(x),
                        y_max: b.y_max.max(y),
                    },
                });
            }
        }
        bbox
    }
}

/// Region-growing segmenter.
#[derive(Debug, Clone, Default)]
pub struct Segmenter {
    config: SegmentationConfig,
}

impl Segmenter {
    pub fn new(config: SegmentationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SegmentationConfig {
        &self.config
    }

    /// Segment the athlete from a frame, seeding from torso joints when given.
    pub fn segment(&self, frame: &FrameBuffer<'_>, seeds: Option<&[Joint]>) -> SegmentationMask {
        if !frame.is_well_formed() {
            debug!(
                width = frame.width,
                height = frame.height,
                bytes = frame.data.len(),
                "Malformed frame buffer, using full-frame mask"
            );
            return SegmentationMask::full_frame(frame.width, frame.height);
        }

        let torso_seeds = seed_pixels(frame, seeds);
        let seeded = !torso_seeds.is_empty();
        let (seed_list, confidence) = if !seeded {
            let centre = (frame.height / 2) as usize * frame.width as usize + (frame.width / 2) as usize;
            (vec![centre], 0.25)
        } else {
            let confidence = torso_seeds.len() as f32 / JointId::TORSO.len() as f32;
            (torso_seeds, confidence)
        };

        let edges = sobel_magnitude(frame);
        let cap = self.config.region_cap(frame.area());
        let bitmap = grow_region(frame, &edges, &seed_list, &self.config, cap);
        let capped = bitmap.iter().filter(|&&b| b == 255).count() >= cap;

        SegmentationMask {
            width: frame.width,
            height: frame.height,
            bitmap,
            confidence,
            fallback: false,
            seeded,
            capped,
        }
    }
}

/// Segment with default thresholds.
pub fn segment(frame: &FrameBuffer<'_>, seeds: Option<&[Joint]>) -> SegmentationMask {
    Segmenter::default().segment(frame, seeds)
}

/// Pixel offsets of confident torso joints that land inside the frame.
fn seed_pixels(frame: &FrameBuffer<'_>, seeds: Option<&[Joint]>) -> Vec<usize> {
    let Some(joints) = seeds else {
        return Vec::new();
    };
    let mut pixels = Vec::with_capacity(JointId::TORSO.len());
    for joint in joints {
        if !JointId::TORSO.contains(&joint.id) || !joint.is_confident() {
            continue;
        }
        if !joint.x.is_finite() || !joint.y.is_finite() || joint.x < 0.0 || joint.y < 0.0 {
            continue;
        }
        let (x, y) = (joint.x as u32, joint.y as u32);
        if x >= frame.width || y >= frame.height {
            continue;
        }
        let pixel = y as usize * frame.width as usize + x as usize;
        if !pixels.contains(&pixel) {
            pixels.push(pixel);
        }
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    /// Grey background with a red block in the middle.
    fn block_frame(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            if (20..40).contains(&x) && (20..40).contains(&y) {
                Rgb([200, 30, 30])
            } else {
                Rgb([90, 90, 90])
            }
        })
    }

    #[test]
    fn test_mask_matches_frame_dimensions() {
        let image = block_frame(64, 48);
        let mask = segment(&FrameBuffer::from_rgb(&image), None);
        assert_eq!((mask.width, mask.height), (64, 48));
        assert_eq!(mask.bitmap.len(), 64 * 48);
        assert!(!mask.fallback);
        assert!(!mask.seeded);
        assert_eq!(mask.confidence, 0.25);
        assert_eq!(mask.detector_roi(), None);
    }

    #[test]
    fn test_malformed_buffer_falls_back() {
        let data = vec![0u8; 10];
        let mask = segment(&FrameBuffer::new(8, 8, &data), None);
        assert!(mask.fallback);
        assert_eq!(mask.confidence, 1.0);
        assert_eq!(mask.coverage(), 64);
        assert!(mask.bitmap.iter().all(|&b| b == 255));
    }

    #[test]
    fn test_zero_area_falls_back() {
        let mask = segment(&FrameBuffer::new(0, 0, &[]), None);
        assert!(mask.fallback);
        assert!(mask.bitmap.is_empty());
        assert_eq!(mask.bounding_box(), None);
    }

    #[test]
    fn test_torso_seeds_stay_inside_block() {
        let image = block_frame(64, 64);
        let seeds = [
            Joint::new(JointId::LeftShoulder, 25.0, 25.0, 0.9),
            Joint::new(JointId::RightShoulder, 34.0, 25.0, 0.9),
            Joint::new(JointId::LeftHip, 25.0, 34.0, 0.3),
            Joint::new(JointId::Nose, 30.0, 10.0, 0.9),
        ];
        let mask = segment(&FrameBuffer::from_rgb(&image), Some(&seeds));
        assert_eq!(mask.confidence, 0.5);
        let bbox = mask.bounding_box().unwrap();
        assert!(bbox.x_min >= 20 && bbox.x_max < 40);
        assert!(bbox.y_min >= 20 && bbox.y_max < 40);
        assert!(mask.is_set(25, 25));
        assert!(!mask.is_set(5, 5));
        assert!(mask.seeded && !mask.capped);
        assert_eq!(mask.detector_roi(), Some(bbox));
    }

    #[test]
    fn test_growth_respects_pixel_cap() {
        let image = RgbImage::from_pixel(100, 100, Rgb([128, 128, 128]));
        let mask = segment(&FrameBuffer::from_rgb(&image), None);
        assert_eq!(mask.coverage(), 1_000);
        assert!(mask.capped);
    }
}
