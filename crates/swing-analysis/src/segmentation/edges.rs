//! Sobel edge magnitude.

use super::FrameBuffer;

/// Rec. 601 luma of an RGB triple.
#[inline]
fn luma([r, g, b]: [u8; 3]) -> f32 {
    0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32
}

/// Per-pixel gradient magnitude `sqrt(gx^2 + gy^2)` from a 3x3 Sobel kernel.
///
/// Borders are replicated. Returns an empty vector for malformed frames.
pub fn sobel_magnitude(frame: &FrameBuffer<'_>) -> Vec<f32> {
    if !frame.is_well_formed() {
        return Vec::new();
    }
    let (w, h) = (frame.width as usize, frame.height as usize);
    let lum: Vec<f32> = (0..w * h).map(|p| luma(frame.rgb(p))).collect();

    let at = |x: isize, y: isize| -> f32 {
        let cx = x.clamp(0, w as isize - 1) as usize;
        let cy = y.clamp(0, h as isize - 1) as usize;
        lum[cy * w + cx]
    };

    let mut out = Vec::with_capacity(w * h);
    for y in 0..h as isize {
        for x in 0..w as isize {
            let gx = (at(x + 1, y - 1) + 2.0 * at(x + 1, y) + at(x + 1, y + 1))
                - (at(x - 1, y - 1) + 2.0 * at(x - 1, y) + at(x - 1, y + 1));
            let gy = (at(x - 1, y + 1) + 2.0 * at(x, y + 1) + at(x + 1, y + 1))
                - (at(x - 1, y - 1) + 2.0 * at(x, y - 1) + at(x + 1, y - 1));
            out.push((gx * gx + gy * gy).sqrt());
        }
    }
    out
}
