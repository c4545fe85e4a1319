//! Elevation gain from noisy GPS-derived elevation profiles.
//!
//! Summing every positive step of a raw profile badly overestimates gain, so
//! the estimator works in two stages:
//! 1. A centered moving average (window of 5 samples) flattens sample noise.
//! 2. A hysteresis walk ignores changes below [`NOISE_THRESHOLD_M`] and only
//!    counts climbs that reach [`MIN_CLIMB_M`] before the next real descent.
//!
//! ## Example
//! ```rust
//! use route_metrics::{TrackPoint, elevation::elevation_gain};
//!
//! let profile: Vec<TrackPoint> = [0.0, 0.0, 0.0, 0.0, 0.0, 50.0, 50.0, 50.0, 50.0, 50.0]
//!     .iter()
//!     .enumerate()
//!     .map(|(i, &ele)| TrackPoint::new(0.0, i as f64 * 0.001, ele))
//!     .collect();
//!
//! assert!((elevation_gain(&profile) - 50.0).abs() < 1e-9);
//! ```

use crate::TrackPoint;

/// Samples on each side of the smoothing window.
pub const SMOOTHING_HALF_WINDOW: usize = 2;

/// Elevation changes smaller than this (meters) are treated as noise.
pub const NOISE_THRESHOLD_M: f64 = 5.0;

/// Contiguous climbs smaller than this (meters) are discarded.
pub const MIN_CLIMB_M: f64 = 10.0;

/// Centered moving average of the elevation profile.
///
/// For sample `i` the window is `[i-2, i+2]`, clipped to the ends of the
/// sequence, so the output has the same length as the input.
pub fn smooth_elevations(points: &[TrackPoint]) -> Vec<f64> {
    let n = points.len();
    (0..n)
        .map(|i| {
            let start = i.saturating_sub(SMOOTHING_HALF_WINDOW);
            let end = (i + SMOOTHING_HALF_WINDOW + 1).min(n);
            let window = &points[start..end];
            window.iter().map(|p| p.elevation).sum::<f64>() / window.len() as f64
        })
        .collect()
}

/// Total sustained ascent in meters.
///
/// Returns 0.0 for fewer than two points.
pub fn elevation_gain(points: &[TrackPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    let smoothed = smooth_elevations(points);

    let mut total_ascent = 0.0;
    let mut current_climb = 0.0;
    let mut last_valid_elevation = smoothed[0];

    for &elevation in &smoothed[1..] {
        let diff = elevation - last_valid_elevation;

        // Noise: neither accumulates nor moves the reference
        if diff.abs() < NOISE_THRESHOLD_M {
            continue;
        }

        if diff > 0.0 {
            current_climb += diff;
        } else {
            if current_climb >= MIN_CLIMB_M {
                total_ascent += current_climb;
            }
            current_climb = 0.0;
        }

        last_valid_elevation = elevation;
    }

    if current_climb >= MIN_CLIMB_M {
        total_ascent += current_climb;
    }

    total_ascent
}
