//! Converter configuration.
//!
//! Every field has a default, so a config file only needs the keys it changes:
//!
//! ```json
//! { "input_dir": "tracks", "recursive": true, "defaults": { "rating": 4.5 } }
//! ```

use crate::error::{Result, RouteMetricsError};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Values written to every record that the document cannot supply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordDefaults {
    /// Thumbnail URL
    pub thumbnail_image: String,
    /// Publication status
    pub status: String,
    /// Initial rating (0-5)
    pub rating: f64,
    /// Initial review count
    pub review_count: u32,
}

impl Default for RecordDefaults {
    fn default() -> Self {
        Self {
            thumbnail_image: "https://example.com/default.jpg".to_string(),
            status: "open".to_string(),
            rating: 5.0,
            review_count: 0,
        }
    }
}

/// Configuration for a batch conversion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Directory scanned for documents.
    /// Default: "kml"
    pub input_dir: PathBuf,

    /// Tabular output.
    /// Default: "routes.csv"
    pub csv_path: PathBuf,

    /// JSON output.
    /// Default: "routes.json"
    pub json_path: PathBuf,

    /// File extension of input documents, without the dot, matched case-insensitively.
    /// Default: "kml"
    pub extension: String,

    /// Descend into subdirectories of `input_dir`.
    /// Default: false
    pub recursive: bool,

    pub defaults: RecordDefaults,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("kml"),
            csv_path: PathBuf::from("routes.csv"),
            json_path: PathBuf::from("routes.json"),
            extension: "kml".to_string(),
            recursive: false,
            defaults: RecordDefaults::default(),
        }
    }
}

impl ConverterConfig {
    /// Load a config from a JSON file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| RouteMetricsError::ConfigError {
            message: format!("cannot read '{}': {}", path.display(), e),
        })?;
        let config = Self::from_json(&text)?;
        debug!("[Config] Loaded {}", path.display());
        Ok(config)
    }

    /// Parse a config from JSON text and validate it.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| RouteMetricsError::ConfigError {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no run could succeed with.
    pub fn validate(&self) -> Result<()> {
        if self.extension.trim_start_matches('.').is_empty() {
            return Err(RouteMetricsError::ConfigError {
                message: "file extension must not be empty".to_string(),
            });
        }
        if !(0.0..=5.0).contains(&self.defaults.rating) {
            return Err(RouteMetricsError::ConfigError {
                message: format!("default rating {} is outside 0-5", self.defaults.rating),
            });
        }
        Ok(())
    }
}
