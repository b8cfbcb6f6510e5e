//! Breadth-first region growing.

use std::collections::VecDeque;

use super::FrameBuffer;
use crate::config::SegmentationConfig;

#[inline]
fn color_distance(a: [u8; 3], b: [u8; 3]) -> u32 {
    a.iter()
        .zip(b.iter())
        .map(|(&p, &q)| (p as i32 - q as i32).unsigned_abs())
        .sum()
}

/// Grow a 4-connected region from `seeds` and return a 0/255 bitmap.
///
/// A neighbour joins when its colour is within `color_threshold` of the
/// pixel it was reached from and its edge magnitude is below
/// `edge_threshold`. Growth stops once `cap` pixels (seeds included) are set.
pub fn grow_region(
    frame: &FrameBuffer<'_>,
    edges: &[f32],
    seeds: &[usize],
    config: &SegmentationConfig,
    cap: usize,
) -> Vec<u8> {
    let (w, h) = (frame.width as usize, frame.height as usize);
    let mut bitmap = vec![0u8; w * h];
    if edges.len() != w * h {
        return bitmap;
    }

    let mut queue = VecDeque::new();
    let mut grown = 0usize;
    for &seed in seeds {
        if seed >= w * h || bitmap[seed] == 255 || grown >= cap {
            continue;
        }
        bitmap[seed] = 255;
        grown += 1;
        queue.push_back(seed);
    }

    while let Some(pixel) = queue.pop_front() {
        let (x, y) = (pixel % w, pixel / w);
        let current = frame.rgb(pixel);

        let neighbours = [
            (x > 0).then(|| pixel - 1),
            (x + 1 < w).then(|| pixel + 1),
            (y > 0).then(|| pixel - w),
            (y + 1 < h).then(|| pixel + w),
        ];
        for next in neighbours.into_iter().flatten() {
            if grown >= cap {
                return bitmap;
            }
            if bitmap[next] == 255 {
                continue;
            }
            if color_distance(current, frame.rgb(next)) < config.color_threshold
                && edges[next] < config.edge_threshold
            {
                bitmap[next] = 255;
                grown += 1;
                queue.push_back(next);
            }
        }
    }

    bitmap
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_color_distance() {
        assert_eq!(color_distance([10, 20, 30], [10, 20, 30]), 0);
        assert_eq!(color_distance([0, 0, 0], [20, 30, 40]), 90);
    }

    #[test]
    fn test_growth_stops_at_colour_boundary() {
        let image = RgbImage::from_fn(10, 4, |x, _| if x < 5 { Rgb([10, 10, 10]) } else { Rgb([200, 10, 10]) });
        let frame = FrameBuffer::from_rgb(&image);
        let edges = vec![0.0; 40];
        let bitmap = grow_region(&frame, &edges, &[0], &SegmentationConfig::default(), 1_000);
        let grown: Vec<usize> = (0..40).filter(|&p| bitmap[p] == 255).collect();
        assert_eq!(grown.len(), 20);
        assert!(grown.iter().all(|p| p % 10 < 5));
    }

    #[test]
    fn test_strong_edges_block_growth() {
        let image = RgbImage::from_pixel(5, 1, Rgb([10, 10, 10]));
        let frame = FrameBuffer::from_rgb(&image);
        let edges = vec![0.0, 0.0, 500.0, 0.0, 0.0];
        let bitmap = grow_region(&frame, &edges, &[0], &SegmentationConfig::default(), 100);
        assert_eq!(bitmap, vec![255, 255, 0, 0, 0]);
    }
}
