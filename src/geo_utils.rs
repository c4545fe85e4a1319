//! # Geographic Utilities
//!
//! Distance computations shared by every route metric.
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`geodesic_distance_km`] | Ellipsoidal distance between two points, in km |
//! | [`point_distance_km`] | Same, for two [`TrackPoint`]s |
//! | [`route_length_km`] | Total length of a track, in km |
//!
//! ## Example
//!
//! ```rust
//! use route_metrics::{TrackPoint, geo_utils};
//!
//! let track = vec![
//!     TrackPoint::new(116.3913, 39.9075, 44.0),
//!     TrackPoint::new(116.3975, 39.9087, 45.0),
//!     TrackPoint::new(116.4040, 39.9150, 51.0),
//! ];
//!
//! let length = geo_utils::route_length_km(&track);
//! println!("Track length: {:.2} km", length);
//! ```
//!
//! ## Algorithm Notes
//!
//! Distances are measured on the WGS84 ellipsoid with Karney's geodesic
//! algorithm (geo's [`Geodesic`] metric). The route-shape classifier compares
//! ratios of these distances, so nothing else in the crate may use a different
//! distance model.

use crate::TrackPoint;
use geo::{Distance, Geodesic, Point};

// =============================================================================
// Distance Functions
// =============================================================================

/// Geodesic distance in kilometers between two `(latitude, longitude)` pairs.
///
/// Handles antimeridian crossings and points near the poles. The result is
/// never negative; non-finite input yields 0.0 rather than NaN.
///
/// # Example
///
/// ```rust
/// use route_metrics::geo_utils::geodesic_distance_km;
///
/// // One hundredth of a degree of latitude at the equator is ~1.1 km
/// let d = geodesic_distance_km((0.0, 0.0), (0.01, 0.0));
/// assert!((d - 1.1057).abs() < 0.001);
/// ```
#[inline]
pub fn geodesic_distance_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let origin = Point::new(from.1, from.0);
    let destination = Point::new(to.1, to.0);
    let meters = Geodesic::distance(origin, destination);
    // f64::max discards NaN
    (meters / 1000.0).max(0.0)
}

/// Geodesic distance in kilometers between two track points.
#[inline]
pub fn point_distance_km(a: &TrackPoint, b: &TrackPoint) -> f64 {
    geodesic_distance_km((a.latitude, a.longitude), (b.latitude, b.longitude))
}

/// Total length of a track in kilometers.
///
/// Sums the geodesic distance between consecutive points. Empty or single-point
/// tracks return 0.0.
pub fn route_length_km(points: &[TrackPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .windows(2)
        .map(|w| point_distance_km(&w[0], &w[1]))
        .sum()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn test_same_point_is_zero() {
        let p = (39.9075, 116.3913);
        assert_eq!(geodesic_distance_km(p, p), 0.0);
    }

    #[test]
    fn test_known_value() {
        // London to Paris is approximately 344 km
        let dist = geodesic_distance_km((51.5074, -0.1278), (48.8566, 2.3522));
        assert!(approx_eq(dist, 343.9, 2.0));
    }

    #[test]
    fn test_symmetric() {
        let a = (30.25, 120.16);
        let b = (30.27, 120.11);
        assert!(approx_eq(
            geodesic_distance_km(a, b),
            geodesic_distance_km(b, a),
            1e-9
        ));
    }

    #[test]
    fn test_antimeridian() {
        // 0.2 degrees of longitude across the antimeridian, not 359.8
        let dist = geodesic_distance_km((0.0, 179.9), (0.0, -179.9));
        assert!(dist > 0.0);
        assert!(approx_eq(dist, 22.26, 0.1));
    }

    #[test]
    fn test_near_pole() {
        let dist = geodesic_distance_km((89.999, 0.0), (89.999, 180.0));
        assert!(dist.is_finite());
        assert!(dist >= 0.0);
        assert!(dist < 1.0);
    }

    #[test]
    fn test_nan_input_is_zero() {
        let dist = geodesic_distance_km((f64::NAN, 0.0), (0.0, 0.0));
        assert_eq!(dist, 0.0);
    }

    #[test]
    fn test_route_length_empty() {
        let empty: Vec<TrackPoint> = vec![];
        assert_eq!(route_length_km(&empty), 0.0);
    }

    #[test]
    fn test_route_length_single_point() {
        let single = vec![TrackPoint::new(116.39, 39.90, 50.0)];
        assert_eq!(route_length_km(&single), 0.0);
    }

    #[test]
    fn test_route_length_sums_segments() {
        let track = vec![
            TrackPoint::new(0.0, 0.0, 0.0),
            TrackPoint::new(0.0, 0.01, 0.0),
            TrackPoint::new(0.0, 0.02, 0.0),
        ];
        let leg = point_distance_km(&track[0], &track[1]);
        let length = route_length_km(&track);
        assert!(length > 0.0);
        assert!(approx_eq(length, leg * 2.0, 1e-6));
    }
}
