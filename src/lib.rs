//! # Route Metrics
//!
//! Hiking route metrics and classification from KML documents.
//!
//! This library provides:
//! - Geodesic route length and noise-tolerant elevation gain
//! - Heart-rate-reserve difficulty rating
//! - Route shape (loop / out-and-back / point-to-point) and feature tagging
//! - KML reading, record assembly and CSV/JSON export
//!
//! ## Features
//!
//! - **`parallel`** - Convert the documents of a batch concurrently with rayon
//! - **`cli`** - Build the `kml2routes` converter (on by default)
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use route_metrics::{convert_kml_str, RecordDefaults};
//! use std::path::Path;
//!
//! let kml = r#"<kml><Document><Placemark>
//!   <name>Lakeside Loop</name>
//!   <LineString><coordinates>
//!     120.10,30.20,10 120.11,30.21,40 120.12,30.20,20 120.10,30.20,10
//!   </coordinates></LineString>
//! </Placemark></Document></kml>"#;
//!
//! let converted = convert_kml_str(
//!     Path::new("lakeside.kml"),
//!     kml,
//!     &RecordDefaults::default(),
//!     chrono::Utc::now(),
//! )
//! .unwrap();
//!
//! let route = converted.record;
//! println!("{}: {:.1} km, {} ({})", route.name, route.length, route.difficulty, route.route_type);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

// Unified error handling
pub mod error;
pub use error::{Diagnostic, Result, RouteMetricsError};

// Geographic utilities (geodesic distance, route length)
pub mod geo_utils;

// Smoothed, noise-filtered elevation gain
pub mod elevation;
pub use elevation::elevation_gain;

// Heart-rate-reserve difficulty model
pub mod difficulty;
pub use difficulty::{classify_difficulty, estimated_hours, Difficulty, HeartRateModel};

// Route shape classification
pub mod shape;
pub use shape::{classify_route_shape, RouteShape};

// Keyword feature tags
pub mod features;
pub use features::{tag_features, FeatureTag};

// KML reading
pub mod kml;
pub use kml::{decode_document, parse_kml, parse_kml_bytes, KmlDocument, KmlFeature};

// Feature-tree walk collecting metadata and points
pub mod extract;
pub use extract::{extract_route, Extraction, RouteMetadata};

// Record assembly
pub mod record;
pub use record::{build_route, ConvertedRoute, RouteRecord};

// Converter configuration
pub mod config;
pub use config::{ConverterConfig, RecordDefaults};

// CSV and JSON output
pub mod export;
pub use export::{write_csv, write_json};

// Directory batch conversion
pub mod batch;
pub use batch::{convert_directory, convert_file, convert_paths, BatchReport};
#[cfg(feature = "parallel")]
pub use batch::convert_paths_parallel;

// Algorithm toolbox - standalone access to the metric functions
pub mod algorithms;

// ============================================================================
// Core Types
// ============================================================================

/// A track vertex: position in degrees and elevation in meters.
///
/// # Example
/// ```
/// use route_metrics::TrackPoint;
/// let point = TrackPoint::new(116.3913, 39.9075, 44.0); // Beijing, KML order
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
}

impl TrackPoint {
    /// Create a track point. Arguments follow KML order: longitude, latitude, altitude.
    pub fn new(longitude: f64, latitude: f64, elevation: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation,
        }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.elevation.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

// ============================================================================
// Core Functions
// ============================================================================

/// Convert one KML document held in memory.
///
/// `source` names the document; its base name becomes the route name when
/// the document carries none.
pub fn convert_kml_str(
    source: &Path,
    xml: &str,
    defaults: &RecordDefaults,
    now: DateTime<Utc>,
) -> Result<ConvertedRoute> {
    let document = parse_kml(xml)?;
    let extraction = extract_route(&document);
    build_route(source, extraction, defaults, now)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_point_validation() {
        assert!(TrackPoint::new(-0.1278, 51.5074, 11.0).is_valid());
        assert!(!TrackPoint::new(0.0, 91.0, 0.0).is_valid());
        assert!(!TrackPoint::new(181.0, 0.0, 0.0).is_valid());
        assert!(!TrackPoint::new(f64::NAN, 0.0, 0.0).is_valid());
        assert!(!TrackPoint::new(0.0, 0.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn test_track_point_argument_order() {
        let point = TrackPoint::new(116.4, 39.9, 50.0);
        assert_eq!(point.longitude, 116.4);
        assert_eq!(point.latitude, 39.9);
        assert_eq!(point.elevation, 50.0);
    }

    #[test]
    fn test_convert_out_and_back() {
        let kml = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2"><Document><Placemark>
  <name>Test Out and Back</name>
  <LineString><coordinates>0,0,0 0,0.01,0 0,0,0</coordinates></LineString>
</Placemark></Document></kml>"#;

        let converted = convert_kml_str(
            Path::new("test.kml"),
            kml,
            &RecordDefaults::default(),
            Utc::now(),
        )
        .unwrap();
        let record = converted.record;

        assert_eq!(record.route_type, RouteShape::OutAndBack);
        assert_eq!(record.elevation, 0.0);
        assert!((record.length - 2.2114).abs() < 0.01);
        assert_eq!(record.difficulty, Difficulty::Easy);
        assert_eq!(record.coordinates.len(), 3);
    }

    #[test]
    fn test_convert_malformed() {
        let result = convert_kml_str(
            Path::new("bad.kml"),
            "<kml><Document><Placemark>",
            &RecordDefaults::default(),
            Utc::now(),
        );
        assert!(matches!(result, Err(RouteMetricsError::KmlParse { .. })));
    }
}
