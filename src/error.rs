//! Error and diagnostic types for the route-metrics library.
//!
//! Two channels are kept apart:
//! - [`RouteMetricsError`] is fatal for the document (or the run) it came from.
//! - [`Diagnostic`] is a recoverable problem found while walking a document.
//!   The affected field stays unset and falls back to a computed value.

use std::fmt;
use std::path::PathBuf;

/// Unified error type for route-metrics operations.
#[derive(Debug, Clone)]
pub enum RouteMetricsError {
    /// Document could not be read from disk
    Io {
        path: Option<PathBuf>,
        message: String,
    },
    /// Document is not well-formed KML
    KmlParse { message: String },
    /// Route has no usable extent (zero length and zero gain)
    DegenerateRoute { name: String, message: String },
    /// Configuration could not be loaded or is inconsistent
    ConfigError { message: String },
    /// Tabular or JSON output could not be written or read back
    ExportError { message: String },
}

impl RouteMetricsError {
    /// Attach the offending path to an IO error.
    pub fn with_path(self, path: impl Into<PathBuf>) -> Self {
        match self {
            RouteMetricsError::Io { message, .. } => RouteMetricsError::Io {
                path: Some(path.into()),
                message,
            },
            other => other,
        }
    }
}

impl fmt::Display for RouteMetricsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteMetricsError::Io { path, message } => match path {
                Some(path) => write!(f, "IO error on '{}': {}", path.display(), message),
                None => write!(f, "IO error: {}", message),
            },
            RouteMetricsError::KmlParse { message } => {
                write!(f, "KML parse error: {}", message)
            }
            RouteMetricsError::DegenerateRoute { name, message } => {
                write!(f, "Route '{}' is degenerate: {}", name, message)
            }
            RouteMetricsError::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            RouteMetricsError::ExportError { message } => {
                write!(f, "Export error: {}", message)
            }
        }
    }
}

impl std::error::Error for RouteMetricsError {}

impl From<std::io::Error> for RouteMetricsError {
    fn from(e: std::io::Error) -> Self {
        RouteMetricsError::Io {
            path: None,
            message: e.to_string(),
        }
    }
}

impl From<quick_xml::Error> for RouteMetricsError {
    fn from(e: quick_xml::Error) -> Self {
        RouteMetricsError::KmlParse {
            message: e.to_string(),
        }
    }
}

impl From<csv::Error> for RouteMetricsError {
    fn from(e: csv::Error) -> Self {
        RouteMetricsError::ExportError {
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for RouteMetricsError {
    fn from(e: serde_json::Error) -> Self {
        RouteMetricsError::ExportError {
            message: e.to_string(),
        }
    }
}

/// Result type alias for route-metrics operations.
pub type Result<T> = std::result::Result<T, RouteMetricsError>;

/// A recoverable problem found in one node of a document.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// Extended-attribute value could not be read as a number
    InvalidExtendedValue { key: String, value: String },
    /// ExtendedData container carried no readable entries
    EmptyExtendedData { feature: Option<String> },
    /// Line vertex had fewer than two numeric components
    MissingCoordinateDimension { vertex: usize, dimensions: usize },
    /// Line vertex was outside the valid latitude/longitude range
    InvalidCoordinate {
        vertex: usize,
        longitude: f64,
        latitude: f64,
    },
    /// Author-supplied difficulty did not name a known level
    UnknownDifficulty { value: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::InvalidExtendedValue { key, value } => {
                write!(f, "extended data '{}' has non-numeric value '{}'", key, value)
            }
            Diagnostic::EmptyExtendedData { feature } => match feature {
                Some(name) => write!(f, "extended data on '{}' has no entries", name),
                None => write!(f, "extended data has no entries"),
            },
            Diagnostic::MissingCoordinateDimension { vertex, dimensions } => write!(
                f,
                "vertex {} has {} coordinate(s), at least 2 required",
                vertex, dimensions
            ),
            Diagnostic::InvalidCoordinate {
                vertex,
                longitude,
                latitude,
            } => write!(
                f,
                "vertex {} is out of range (lon={}, lat={})",
                vertex, longitude, latitude
            ),
            Diagnostic::UnknownDifficulty { value } => {
                write!(f, "unknown difficulty '{}', computing instead", value)
            }
        }
    }
}
