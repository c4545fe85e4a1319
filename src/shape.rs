//! Route shape classification: loop, out-and-back or point-to-point.
//!
//! Classification runs in two tiers:
//! - The route name is matched against a bilingual keyword table.
//! - When the name says nothing, the geometry decides from the start, end and
//!   middle samples (see [`classify_by_geometry`]).

use crate::geo_utils::{point_distance_km, route_length_km};
use crate::TrackPoint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Start and end closer than this fraction of the route length coincide.
pub const CLOSED_ROUTE_RATIO: f64 = 0.1;

/// Tolerance, as a fraction of route length, for the midpoint of a
/// closed route to sit at half the route length.
pub const TURNAROUND_TOLERANCE_RATIO: f64 = 0.3;

/// Overall shape of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RouteShape {
    Loop,
    OutAndBack,
    PointToPoint,
    Other,
}

impl RouteShape {
    /// Wire name used in exported records.
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteShape::Loop => "loop",
            RouteShape::OutAndBack => "outAndBack",
            RouteShape::PointToPoint => "pointToPoint",
            RouteShape::Other => "other",
        }
    }
}

impl fmt::Display for RouteShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name keywords per shape, checked in this order.
const SHAPE_KEYWORDS: &[(&[&str], RouteShape)] = &[
    (&["loop", "环线"], RouteShape::Loop),
    (&["out and back", "折返", "outback"], RouteShape::OutAndBack),
    (&["point to point", "穿越", "pointtopoint"], RouteShape::PointToPoint),
];

/// Classify a route from its name alone.
///
/// Returns [`RouteShape::Other`] when no keyword matches.
///
/// # Example
/// ```
/// use route_metrics::shape::{classify_by_name, RouteShape};
///
/// assert_eq!(classify_by_name("Lakeside LOOP"), RouteShape::Loop);
/// assert_eq!(classify_by_name("鳌太穿越"), RouteShape::PointToPoint);
/// assert_eq!(classify_by_name("Morning hike"), RouteShape::Other);
/// ```
pub fn classify_by_name(name: &str) -> RouteShape {
    let lowered = name.to_lowercase();
    SHAPE_KEYWORDS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|&(_, shape)| shape)
        .unwrap_or(RouteShape::Other)
}

/// Classify a route from its geometry.
///
/// - Start and end far apart → point-to-point.
/// - Start and end together, with the middle sample about half the route
///   length away → out-and-back.
/// - Start and end together otherwise → loop.
///
/// Fewer than two points, or a route of zero length, is [`RouteShape::Other`].
pub fn classify_by_geometry(points: &[TrackPoint]) -> RouteShape {
    if points.len() < 2 {
        return RouteShape::Other;
    }

    let total_length = route_length_km(points);
    if total_length <= 0.0 {
        return RouteShape::Other;
    }

    let start = &points[0];
    let end = &points[points.len() - 1];
    let start_end_distance = point_distance_km(start, end);

    if start_end_distance < total_length * CLOSED_ROUTE_RATIO {
        let middle = &points[points.len() / 2];
        let mid_distance = point_distance_km(start, middle);

        if (2.0 * mid_distance - total_length).abs() < total_length * TURNAROUND_TOLERANCE_RATIO {
            RouteShape::OutAndBack
        } else {
            RouteShape::Loop
        }
    } else {
        RouteShape::PointToPoint
    }
}

/// Classify by name, falling back to geometry when the name is neutral.
pub fn classify_route_shape(name: &str, points: &[TrackPoint]) -> RouteShape {
    match classify_by_name(name) {
        RouteShape::Other => classify_by_geometry(points),
        shape => shape,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(coords: &[(f64, f64)]) -> Vec<TrackPoint> {
        coords
            .iter()
            .map(|&(lon, lat)| TrackPoint::new(lon, lat, 0.0))
            .collect()
    }

    /// Octagon of ~1.1 km radius; the middle sample sits opposite the start.
    fn octagon_loop() -> Vec<TrackPoint> {
        line(&[
            (0.01, 0.0),
            (0.00707, 0.00707),
            (0.0, 0.01),
            (-0.00707, 0.00707),
            (-0.01, 0.0),
            (-0.00707, -0.00707),
            (0.0, -0.01),
            (0.00707, -0.00707),
            (0.01, 0.0),
        ])
    }

    #[test]
    fn test_name_keywords() {
        assert_eq!(classify_by_name("西湖环线"), RouteShape::Loop);
        assert_eq!(classify_by_name("Test Out and Back"), RouteShape::OutAndBack);
        assert_eq!(classify_by_name("香山折返"), RouteShape::OutAndBack);
        assert_eq!(classify_by_name("OutBack Trail"), RouteShape::OutAndBack);
        assert_eq!(classify_by_name("Point To Point Ridge"), RouteShape::PointToPoint);
        assert_eq!(classify_by_name("Summit Day"), RouteShape::Other);
    }

    #[test]
    fn test_loop_keyword_wins() {
        // Checked in table order: loop before out-and-back
        assert_eq!(classify_by_name("Loop or out and back"), RouteShape::Loop);
    }

    #[test]
    fn test_geometry_loop() {
        assert_eq!(classify_by_geometry(&octagon_loop()), RouteShape::Loop);
    }

    #[test]
    fn test_geometry_out_and_back() {
        let points = line(&[(0.0, 0.0), (0.0, 0.005), (0.0, 0.01), (0.0, 0.005), (0.0, 0.0)]);
        assert_eq!(classify_by_geometry(&points), RouteShape::OutAndBack);
    }

    #[test]
    fn test_geometry_point_to_point() {
        let points = line(&[(0.0, 0.0), (0.0, 0.01), (0.0, 0.02), (0.0, 0.03)]);
        assert_eq!(classify_by_geometry(&points), RouteShape::PointToPoint);
    }

    #[test]
    fn test_geometry_degenerate() {
        assert_eq!(classify_by_geometry(&[]), RouteShape::Other);
        assert_eq!(classify_by_geometry(&line(&[(1.0, 1.0)])), RouteShape::Other);
        assert_eq!(
            classify_by_geometry(&line(&[(1.0, 1.0), (1.0, 1.0)])),
            RouteShape::Other
        );
    }

    #[test]
    fn test_neutral_name_uses_geometry() {
        let points = line(&[(0.0, 0.0), (0.0, 0.01), (0.0, 0.02), (0.0, 0.03)]);
        assert_eq!(
            classify_route_shape("Sunday walk", &points),
            RouteShape::PointToPoint
        );
        // A name keyword overrides geometry
        assert_eq!(classify_route_shape("Ridge Loop", &points), RouteShape::Loop);
    }
}
