//! Metadata and geometry extraction from a KML feature tree.
//!
//! The tree is walked depth-first once. A single [`Extraction`] accumulator is
//! threaded through the walk by `&mut`, so every document gets its own and
//! nothing is shared between documents.
//!
//! Metadata fields are first-match-wins: the first usable value seen in
//! document order is kept and later duplicates are ignored.

use log::{debug, warn};

use crate::error::Diagnostic;
use crate::kml::{DataEntry, GeometryKind, KmlDocument, KmlFeature};
use crate::TrackPoint;

/// Author-supplied values that override computed ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteMetadata {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Total ascent in meters
    pub total_ascent: Option<f64>,
    /// Total descent in meters
    pub total_descent: Option<f64>,
    /// Estimated time in hours
    pub estimated_time: Option<f64>,
    /// Distance in kilometers
    pub distance: Option<f64>,
    /// Raw difficulty text
    pub difficulty: Option<String>,
}

/// Extended-data keys the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetadataKey {
    Ascent,
    Descent,
    Duration,
    Mileage,
    Difficulty,
}

impl MetadataKey {
    /// Match a key by substring, in priority order.
    fn from_key(key: &str) -> Option<Self> {
        let key = key.to_lowercase();
        if key.contains("ascent") {
            Some(MetadataKey::Ascent)
        } else if key.contains("descent") {
            Some(MetadataKey::Descent)
        } else if key.contains("time") || key.contains("duration") {
            Some(MetadataKey::Duration)
        } else if key.contains("mileage") {
            Some(MetadataKey::Mileage)
        } else if key.contains("difficulty") {
            Some(MetadataKey::Difficulty)
        } else {
            None
        }
    }
}

/// Everything collected from one document.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub metadata: RouteMetadata,
    /// Vertices of every line geometry, in document order
    pub points: Vec<TrackPoint>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Extraction {
    fn report(&mut self, diagnostic: Diagnostic) {
        warn!("[Extract] {}", diagnostic);
        self.diagnostics.push(diagnostic);
    }
}

/// Set `slot` unless it already holds a value.
fn set_first<T>(slot: &mut Option<T>, value: T) {
    if slot.is_none() {
        *slot = Some(value);
    }
}

/// Walk a parsed document and collect its metadata, points and diagnostics.
pub fn extract_route(document: &KmlDocument) -> Extraction {
    let mut extraction = Extraction::default();
    for feature in &document.features {
        visit_feature(feature, &mut extraction);
    }

    debug!(
        "[Extract] {} points, {} diagnostics",
        extraction.points.len(),
        extraction.diagnostics.len()
    );

    extraction
}

/// Visit one node: its own fields, its extended data, its children, then its geometry.
fn visit_feature(feature: &KmlFeature, acc: &mut Extraction) {
    if let Some(name) = non_empty(feature.name.as_deref()) {
        set_first(&mut acc.metadata.name, name.to_string());
    }
    if let Some(description) = non_empty(feature.description.as_deref()) {
        set_first(&mut acc.metadata.description, description.to_string());
    }

    if let Some(entries) = &feature.extended_data {
        if entries.is_empty() {
            acc.report(Diagnostic::EmptyExtendedData {
                feature: feature.name.clone(),
            });
        }
        for entry in entries {
            apply_entry(entry, acc);
        }
    }

    for child in &feature.children {
        visit_feature(child, acc);
    }

    if let Some(geometry) = &feature.geometry {
        match geometry.kind {
            GeometryKind::LineString => collect_line(&geometry.coordinates, acc),
            ref other => debug!(
                "[Extract] Ignoring {:?} geometry on '{}'",
                other,
                feature.name.as_deref().unwrap_or("")
            ),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Apply one extended-data entry to the metadata.
fn apply_entry(entry: &DataEntry, acc: &mut Extraction) {
    let Some(key) = MetadataKey::from_key(&entry.name) else {
        return;
    };

    if key == MetadataKey::Difficulty {
        if let Some(value) = non_empty(Some(entry.value.as_str())) {
            set_first(&mut acc.metadata.difficulty, value.to_string());
        }
        return;
    }

    let value = match entry.value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => {
            acc.report(Diagnostic::InvalidExtendedValue {
                key: entry.name.clone(),
                value: entry.value.clone(),
            });
            return;
        }
    };

    let metadata = &mut acc.metadata;
    match key {
        MetadataKey::Ascent => set_first(&mut metadata.total_ascent, value),
        MetadataKey::Descent => set_first(&mut metadata.total_descent, value),
        MetadataKey::Duration => set_first(&mut metadata.estimated_time, value),
        // Mileage is recorded in meters
        MetadataKey::Mileage => set_first(&mut metadata.distance, value / 1000.0),
        MetadataKey::Difficulty => {}
    }
}

/// Turn line vertices into track points, reporting unusable ones.
fn collect_line(coordinates: &[Vec<f64>], acc: &mut Extraction) {
    for (vertex, coord) in coordinates.iter().enumerate() {
        if coord.len() < 2 {
            acc.report(Diagnostic::MissingCoordinateDimension {
                vertex,
                dimensions: coord.len(),
            });
            continue;
        }

        let point = TrackPoint::new(coord[0], coord[1], coord.get(2).copied().unwrap_or(0.0));
        if !point.is_valid() {
            acc.report(Diagnostic::InvalidCoordinate {
                vertex,
                longitude: point.longitude,
                latitude: point.latitude,
            });
            continue;
        }

        acc.points.push(point);
    }
}
