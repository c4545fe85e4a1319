//! # Algorithm Toolbox
//!
//! Direct access to the route metrics without the KML pipeline.
//! Use these to rate tracks that come from somewhere else (GPX, a database,
//! a device) as long as they can be expressed as [`TrackPoint`]s.
//!
//! ## Metrics
//!
//! - **Geodesic Distance**: WGS84 ellipsoidal distance between two points
//! - **Route Length**: Sum of segment distances along a track
//! - **Elevation Gain**: Smoothed, noise-filtered cumulative climb
//! - **Estimated Time**: Flat-speed plus climb-rate duration estimate
//!
//! ## Classifiers
//!
//! - **Difficulty**: Heart-rate-reserve load model, four levels
//! - **Route Shape**: Name keywords with a geometric fallback
//! - **Features**: Keyword tags from the route name
//!
//! # Example
//!
//! ```rust
//! use route_metrics::algorithms::{
//!     classify_difficulty, classify_route_shape, elevation_gain, estimated_hours,
//!     route_length_km, TrackPoint,
//! };
//!
//! let track: Vec<TrackPoint> = (0..20)
//!     .map(|i| TrackPoint::new(7.65, 45.90 + i as f64 * 0.001, 1200.0 + i as f64 * 15.0))
//!     .collect();
//!
//! let length = route_length_km(&track);
//! let gain = elevation_gain(&track);
//! let hours = estimated_hours(length, gain);
//! let difficulty = classify_difficulty(length, gain, hours).unwrap();
//! let shape = classify_route_shape("Col climb", &track);
//! println!("{:.1} km, {:.0} m, {:.1} h: {} {}", length, gain, hours, difficulty, shape);
//! ```

// =============================================================================
// Core Types (re-exported from lib)
// =============================================================================

pub use crate::{Difficulty, FeatureTag, HeartRateModel, RouteShape, TrackPoint};

// =============================================================================
// Geographic Utilities
// =============================================================================

pub use crate::geo_utils::{geodesic_distance_km, point_distance_km, route_length_km};

// =============================================================================
// Elevation
// =============================================================================

pub use crate::elevation::{
    elevation_gain, smooth_elevations, MIN_CLIMB_M, NOISE_THRESHOLD_M, SMOOTHING_HALF_WINDOW,
};

// =============================================================================
// Classifiers
// =============================================================================

pub use crate::difficulty::{classify_difficulty, estimated_hours};

pub use crate::shape::{
    classify_by_geometry, classify_by_name, classify_route_shape, CLOSED_ROUTE_RATIO,
    TURNAROUND_TOLERANCE_RATIO,
};

pub use crate::features::tag_features;
