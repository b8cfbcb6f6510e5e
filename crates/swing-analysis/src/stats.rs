//! Signal helpers for per-frame kinematic series.
//!
//! This module contains the numeric building blocks used by the kinematic
//! profile and the event detector, including:
//! - Basic statistics (mean, median)
//! - Gap filling, angle unwrapping and moving average
//! - Central-difference derivatives and peak lookup

// === Statistical Functions ===

/// Calculate the arithmetic mean of a slice of values.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Calculate the median of a slice of values.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

// === Conditioning Functions ===

/// Fill `None` samples by linear interpolation between known neighbours.
///
/// Leading and trailing gaps hold the nearest known value. Returns `None`
/// when no sample is known.
pub fn fill_gaps(samples: &[Option<f64>]) -> Option<Vec<f64>> {
    let known: Vec<(usize, f64)> = samples
        .iter()
        .enumerate()
        .filter_map(|(i, s)| s.map(|v| (i, v)))
        .collect();
    let (&(first_i, first_v), &(last_i, last_v)) = (known.first()?, known.last()?);

    let mut out = vec![0.0; samples.len()];
    for slot in out.iter_mut().take(first_i + 1) {
        *slot = first_v;
    }
    for slot in out.iter_mut().skip(last_i) {
        *slot = last_v;
    }
    for pair in known.windows(2) {
        let (i0, v0) = pair[0];
        let (i1, v1) = pair[1];
        let span = (i1 - i0) as f64;
        for (step, slot) in out[i0..=i1].iter_mut().enumerate() {
            *slot = v0 + (v1 - v0) * step as f64 / span;
        }
    }
    Some(out)
}

/// Remove 360 degree jumps so consecutive samples differ by at most 180.
pub fn unwrap_degrees(angles: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(angles.len());
    let mut offset = 0.0;
    let mut prev: Option<f64> = None;
    for &angle in angles {
        if let Some(p) = prev {
            let delta = angle - p;
            if delta > 180.0 {
                offset -= 360.0;
            } else if delta < -180.0 {
                offset += 360.0;
            }
        }
        prev = Some(angle);
        out.push(angle + offset);
    }
    out
}

/// Apply a centred moving average filter to a data series.
///
/// The window shrinks at the boundaries to maintain array length.
pub fn moving_average(data: &[f64], window: usize) -> Vec<f64> {
    if window <= 1 || data.len() < window {
        return data.to_vec();
    }

    let pad = window / 2;
    let mut result = Vec::with_capacity(data.len());

    for i in 0..data.len() {
        let start = i.saturating_sub(pad);
        let end = (i + pad + 1).min(data.len());
        let slice = &data[start..end];
        result.push(slice.iter().sum::<f64>() / slice.len() as f64);
    }

    result
}

/// First derivative per second by central difference.
///
/// Endpoints use one-sided differences.
pub fn central_difference(data: &[f64], fps: f64) -> Vec<f64> {
    let n = data.len();
    if n < 2 {
        return vec![0.0; n];
    }
    (0..n)
        .map(|i| {
            let (lo, hi) = (i.saturating_sub(1), (i + 1).min(n - 1));
            (data[hi] - data[lo]) * fps / (hi - lo) as f64
        })
        .collect()
}

// === Peak Functions ===

/// Position of the largest value in `data[range]`, earliest on ties.
pub fn argmax_in(data: &[f64], range: std::ops::Range<usize>) -> Option<usize> {
    let end = range.end.min(data.len());
    let mut best: Option<usize> = None;
    for i in range.start..end {
        match best {
            Some(b) if data[i] <= data[b] => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_median() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn test_fill_gaps_interpolates_and_holds_edges() {
        let filled = fill_gaps(&[None, Some(1.0), None, Some(3.0), None]).unwrap();
        assert_eq!(filled, vec![1.0, 1.0, 2.0, 3.0, 3.0]);
        assert!(fill_gaps(&[None, None]).is_none());
    }

    #[test]
    fn test_unwrap_degrees() {
        let unwrapped = unwrap_degrees(&[170.0, -175.0, -160.0]);
        assert_eq!(unwrapped, vec![170.0, 185.0, 200.0]);
    }

    #[test]
    fn test_moving_average() {
        let smoothed = moving_average(&[0.0, 3.0, 6.0, 3.0, 0.0], 3);
        assert_eq!(smoothed, vec![1.5, 3.0, 4.0, 3.0, 1.5]);
    }

    #[test]
    fn test_central_difference() {
        let velocity = central_difference(&[0.0, 1.0, 2.0, 3.0], 30.0);
        assert!(velocity.iter().all(|v| (v - 30.0).abs() < 1e-9));
    }

    #[test]
    fn test_argmax_earliest_on_ties() {
        assert_eq!(argmax_in(&[1.0, 5.0, 5.0, 2.0], 0..4), Some(1));
        assert_eq!(argmax_in(&[1.0, 5.0, 5.0, 2.0], 2..4), Some(2));
        assert_eq!(argmax_in(&[1.0], 3..4), None);
    }
}
