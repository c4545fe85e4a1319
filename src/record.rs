//! Route record assembly.
//!
//! Combines what the extractor found in a document with the computed metrics
//! into the final [`RouteRecord`]. Author-supplied distance, ascent and
//! difficulty take precedence when plausible; everything else is computed.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::RecordDefaults;
use crate::difficulty::{estimated_hours, Difficulty, HeartRateModel};
use crate::elevation::elevation_gain;
use crate::error::{Diagnostic, Result, RouteMetricsError};
use crate::extract::{Extraction, RouteMetadata};
use crate::features::{tag_features, FeatureTag};
use crate::geo_utils::route_length_km;
use crate::shape::{classify_route_shape, RouteShape};
use crate::TrackPoint;

/// Markers of a coordinate table pasted into a description by export tools.
const COORDINATE_DUMP_MARKERS: &[&str] = &[
    ">经度<",
    ">纬度<",
    ">longitude<",
    ">latitude<",
    "<longitude>",
    "<latitude>",
];

/// One converted route, ready for export.
///
/// Field order is the column order of the tabular output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRecord {
    pub description: String,
    pub features: Vec<FeatureTag>,
    pub updated_at: DateTime<Utc>,
    pub coordinates: Vec<TrackPoint>,
    /// Elevation gain in meters
    pub elevation: f64,
    pub difficulty: Difficulty,
    pub name: String,
    /// Assigned by the downstream store; always empty here
    pub object_id: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub route_type: RouteShape,
    pub review_count: u32,
    pub status: String,
    pub thumbnail_image: String,
    /// Length in kilometers
    pub length: f64,
    /// Estimated duration in seconds
    pub estimated_time: f64,
    pub rating: f64,
}

impl RouteRecord {
    /// Estimated duration in hours.
    pub fn estimated_hours(&self) -> f64 {
        self.estimated_time / 3600.0
    }
}

/// A record together with the diagnostics raised while producing it.
#[derive(Debug, Clone)]
pub struct ConvertedRoute {
    /// Document the record came from
    pub source: PathBuf,
    pub record: RouteRecord,
    pub diagnostics: Vec<Diagnostic>,
}

/// Base name of a document: its file name up to the first `.`.
pub fn document_base_name(source: &Path) -> String {
    source
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.split('.').next())
        .unwrap_or_default()
        .to_string()
}

/// True when a description carries an embedded coordinate table.
pub fn is_coordinate_dump(description: &str) -> bool {
    let lowered = description.to_lowercase();
    COORDINATE_DUMP_MARKERS.iter().any(|m| lowered.contains(m))
}

/// Description synthesized from the route metrics.
pub fn template_description(
    length_km: f64,
    difficulty: Difficulty,
    elevation_m: f64,
    hours: f64,
) -> String {
    format!(
        "这是一条长度为{:.1}km的{}徒步路线，累计爬升{:.0}米，预计用时{:.1}小时。",
        length_km,
        difficulty.label_zh(),
        elevation_m,
        hours
    )
}

fn plausible_distance(metadata: &RouteMetadata) -> Option<f64> {
    metadata.distance.filter(|d| d.is_finite() && *d > 0.0)
}

fn plausible_ascent(metadata: &RouteMetadata) -> Option<f64> {
    metadata.total_ascent.filter(|a| a.is_finite() && *a > 0.0)
}

/// Assemble the record for one document.
///
/// `source` names the document and supplies the route name when the document
/// has none. `now` stamps both timestamps.
///
/// Fails with [`RouteMetricsError::DegenerateRoute`] when the difficulty must
/// be computed but the route has no length, no climb and no author-supplied
/// duration to fall back on.
pub fn build_route(
    source: &Path,
    extraction: Extraction,
    defaults: &RecordDefaults,
    now: DateTime<Utc>,
) -> Result<ConvertedRoute> {
    let Extraction {
        metadata,
        points,
        mut diagnostics,
    } = extraction;

    let name = metadata
        .name
        .clone()
        .unwrap_or_else(|| document_base_name(source));

    let length = match plausible_distance(&metadata) {
        Some(d) => d,
        None => route_length_km(&points),
    };
    let elevation = match plausible_ascent(&metadata) {
        Some(a) => a,
        None => elevation_gain(&points),
    };
    let hours = estimated_hours(length, elevation);

    let difficulty = match metadata.difficulty.as_deref().map(str::parse::<Difficulty>) {
        Some(Ok(level)) => level,
        Some(Err(value)) => {
            let diagnostic = Diagnostic::UnknownDifficulty { value };
            warn!("[Build] {}", diagnostic);
            diagnostics.push(diagnostic);
            compute_difficulty(&name, length, elevation, hours, &metadata)?
        }
        None => compute_difficulty(&name, length, elevation, hours, &metadata)?,
    };

    let description = match metadata.description.as_deref() {
        Some(text) if !is_coordinate_dump(text) => text.to_string(),
        Some(_) => {
            debug!("[Build] '{}' description is a coordinate dump, replacing", name);
            template_description(length, difficulty, elevation, hours)
        }
        None => template_description(length, difficulty, elevation, hours),
    };

    let route_type = classify_route_shape(&name, &points);
    let features = tag_features(&name);

    info!(
        "[Build] '{}': {:.2} km, {:.0} m, {:.1} h, {}, {}",
        name, length, elevation, hours, difficulty, route_type
    );

    Ok(ConvertedRoute {
        source: source.to_path_buf(),
        record: RouteRecord {
            description,
            features,
            updated_at: now,
            coordinates: points,
            elevation,
            difficulty,
            name,
            object_id: None,
            created_at: now,
            route_type,
            review_count: defaults.review_count,
            status: defaults.status.clone(),
            thumbnail_image: defaults.thumbnail_image.clone(),
            length,
            estimated_time: hours * 3600.0,
            rating: defaults.rating,
        },
        diagnostics,
    })
}

/// Run the classifier, substituting the author's duration for a zero estimate.
fn compute_difficulty(
    name: &str,
    length: f64,
    elevation: f64,
    hours: f64,
    metadata: &RouteMetadata,
) -> Result<Difficulty> {
    let model = HeartRateModel::default();
    if hours > 0.0 {
        return model.classify(length, elevation, hours).map_err(|e| named(e, name));
    }

    match metadata.estimated_time.filter(|t| t.is_finite() && *t > 0.0) {
        Some(author_hours) => {
            debug!(
                "[Build] '{}' has no extent, rating over author time {} h",
                name, author_hours
            );
            model
                .classify(length, elevation, author_hours)
                .map_err(|e| named(e, name))
        }
        None => Err(RouteMetricsError::DegenerateRoute {
            name: name.to_string(),
            message: "zero length and zero elevation gain".to_string(),
        }),
    }
}

fn named(error: RouteMetricsError, name: &str) -> RouteMetricsError {
    match error {
        RouteMetricsError::DegenerateRoute { message, .. } => RouteMetricsError::DegenerateRoute {
            name: name.to_string(),
            message,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
    }

    fn out_and_back() -> Vec<TrackPoint> {
        vec![
            TrackPoint::new(0.0, 0.0, 0.0),
            TrackPoint::new(0.0, 0.01, 0.0),
            TrackPoint::new(0.0, 0.0, 0.0),
        ]
    }

    fn extraction(metadata: RouteMetadata, points: Vec<TrackPoint>) -> Extraction {
        Extraction {
            metadata,
            points,
            diagnostics: Vec::new(),
        }
    }

    fn build(metadata: RouteMetadata, points: Vec<TrackPoint>) -> Result<ConvertedRoute> {
        build_route(
            Path::new("kml/fallback.name.kml"),
            extraction(metadata, points),
            &RecordDefaults::default(),
            now(),
        )
    }

    #[test]
    fn test_computed_record() {
        let metadata = RouteMetadata {
            name: Some("Test Out and Back".to_string()),
            ..RouteMetadata::default()
        };
        let converted = build(metadata, out_and_back()).unwrap();
        let record = converted.record;

        assert_eq!(record.name, "Test Out and Back");
        assert_eq!(record.route_type, RouteShape::OutAndBack);
        assert_eq!(record.elevation, 0.0);
        assert!((record.length - 2.0 * 1.1057).abs() < 0.01);
        assert_eq!(record.difficulty, Difficulty::Easy);
        assert!((record.estimated_time - record.length / 4.0 * 3600.0).abs() < 1e-6);
        assert_eq!(record.coordinates, out_and_back());
        assert!(record.features.is_empty());
        assert!(converted.diagnostics.is_empty());
    }

    #[test]
    fn test_metadata_overrides() {
        let metadata = RouteMetadata {
            name: Some("Test".to_string()),
            distance: Some(5.0),
            total_ascent: Some(250.0),
            difficulty: Some("hard".to_string()),
            estimated_time: Some(10.0),
            ..RouteMetadata::default()
        };
        let record = build(metadata, out_and_back()).unwrap().record;

        assert_eq!(record.length, 5.0);
        assert_eq!(record.elevation, 250.0);
        assert_eq!(record.difficulty, Difficulty::Hard);
        // Duration is always recomputed: 5/4 + 250/250 = 2.25 h
        assert!((record.estimated_time - 2.25 * 3600.0).abs() < 1e-6);
    }

    #[test]
    fn test_implausible_metadata_ignored() {
        let metadata = RouteMetadata {
            distance: Some(0.0),
            total_ascent: Some(-30.0),
            ..RouteMetadata::default()
        };
        let record = build(metadata, out_and_back()).unwrap().record;
        assert!(record.length > 2.0);
        assert_eq!(record.elevation, 0.0);
    }

    #[test]
    fn test_unknown_difficulty_falls_back() {
        let metadata = RouteMetadata {
            difficulty: Some("brutal".to_string()),
            ..RouteMetadata::default()
        };
        let converted = build(metadata, out_and_back()).unwrap();
        assert_eq!(converted.record.difficulty, Difficulty::Easy);
        assert_eq!(
            converted.diagnostics,
            vec![Diagnostic::UnknownDifficulty {
                value: "brutal".to_string()
            }]
        );
    }

    #[test]
    fn test_name_from_file() {
        let record = build(RouteMetadata::default(), out_and_back()).unwrap().record;
        assert_eq!(record.name, "fallback");
    }

    #[test]
    fn test_degenerate_route_rejected() {
        let result = build(RouteMetadata::default(), vec![TrackPoint::new(1.0, 1.0, 0.0)]);
        match result {
            Err(RouteMetricsError::DegenerateRoute { name, .. }) => assert_eq!(name, "fallback"),
            other => panic!("expected degenerate route, got {:?}", other),
        }
    }

    #[test]
    fn test_degenerate_route_with_author_difficulty() {
        let metadata = RouteMetadata {
            difficulty: Some("easy".to_string()),
            ..RouteMetadata::default()
        };
        let record = build(metadata, Vec::new()).unwrap().record;
        assert_eq!(record.difficulty, Difficulty::Easy);
        assert_eq!(record.estimated_time, 0.0);
        assert_eq!(record.route_type, RouteShape::Other);
    }

    #[test]
    fn test_degenerate_route_with_author_time() {
        let metadata = RouteMetadata {
            estimated_time: Some(1.5),
            ..RouteMetadata::default()
        };
        let record = build(metadata, Vec::new()).unwrap().record;
        assert_eq!(record.difficulty, Difficulty::Easy);
    }

    #[test]
    fn test_description_kept() {
        let metadata = RouteMetadata {
            description: Some("Quiet forest path".to_string()),
            ..RouteMetadata::default()
        };
        let record = build(metadata, out_and_back()).unwrap().record;
        assert_eq!(record.description, "Quiet forest path");
    }

    #[test]
    fn test_coordinate_dump_replaced() {
        let metadata = RouteMetadata {
            description: Some("<table><tr><td>经度</td><td>116.3</td></tr></table>".to_string()),
            ..RouteMetadata::default()
        };
        let record = build(metadata, out_and_back()).unwrap().record;
        assert!(record.description.starts_with("这是一条长度为2.2km的简单徒步路线"));
    }

    #[test]
    fn test_coordinate_dump_detection() {
        assert!(is_coordinate_dump("<td>Longitude</td>"));
        assert!(is_coordinate_dump("<span>纬度</span>"));
        assert!(!is_coordinate_dump("Longitude and latitude are listed below"));
    }

    #[test]
    fn test_defaults_and_timestamps() {
        let record = build(RouteMetadata::default(), out_and_back()).unwrap().record;
        assert_eq!(record.review_count, 0);
        assert_eq!(record.status, "open");
        assert_eq!(record.rating, 5.0);
        assert_eq!(record.thumbnail_image, "https://example.com/default.jpg");
        assert_eq!(record.object_id, None);
        assert_eq!(record.created_at, now());
        assert_eq!(record.updated_at, now());
    }

    #[test]
    fn test_serialized_field_names() {
        let record = build(RouteMetadata::default(), out_and_back()).unwrap().record;
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "outAndBack");
        assert_eq!(value["difficulty"], "easy");
        assert!(value["objectId"].is_null());
        assert!(value.get("estimatedTime").is_some());
        assert!(value.get("thumbnailImage").is_some());
    }

    #[test]
    fn test_base_name() {
        assert_eq!(document_base_name(Path::new("a/b/route.v2.kml")), "route");
        assert_eq!(document_base_name(Path::new("西山.kml")), "西山");
    }
}
