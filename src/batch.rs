//! Batch conversion of a directory of KML documents.
//!
//! Documents are independent: a failure in one is logged, recorded in the
//! [`BatchReport`] and does not stop the others.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::{ConverterConfig, RecordDefaults};
use crate::convert_kml_str;
use crate::error::{Result, RouteMetricsError};
use crate::kml::decode_document;
use crate::record::{ConvertedRoute, RouteRecord};

/// A document that could not be converted.
#[derive(Debug, Clone)]
pub struct BatchFailure {
    pub path: PathBuf,
    pub error: RouteMetricsError,
}

/// Outcome of a batch, in input order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub routes: Vec<ConvertedRoute>,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    fn push(&mut self, path: &Path, outcome: Result<ConvertedRoute>) {
        match outcome {
            Ok(route) => self.routes.push(route),
            Err(error) => {
                warn!("[Batch] Skipping {}: {}", path.display(), error);
                self.failures.push(BatchFailure {
                    path: path.to_path_buf(),
                    error,
                });
            }
        }
    }

    /// Number of documents attempted.
    pub fn total(&self) -> usize {
        self.routes.len() + self.failures.len()
    }

    /// Diagnostics raised across all converted documents.
    pub fn diagnostic_count(&self) -> usize {
        self.routes.iter().map(|r| r.diagnostics.len()).sum()
    }

    /// Records of the converted documents, in input order.
    pub fn records(&self) -> Vec<RouteRecord> {
        self.routes.iter().map(|r| r.record.clone()).collect()
    }
}

/// True when `path` has the given extension, ignoring case and a leading dot.
fn has_extension(path: &Path, extension: &str) -> bool {
    let wanted = extension.trim_start_matches('.');
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(wanted))
        .unwrap_or(false)
}

/// List the documents in `dir`, sorted by path.
///
/// A missing directory is created and yields an empty list.
pub fn find_documents(dir: &Path, extension: &str, recursive: bool) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| RouteMetricsError::from(e).with_path(dir))?;
        info!("[Batch] Created input directory {}", dir.display());
        return Ok(Vec::new());
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("[Batch] Cannot read directory entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && has_extension(entry.path(), extension))
        .map(|entry| entry.into_path())
        .collect();

    paths.sort();
    debug!("[Batch] Found {} documents in {}", paths.len(), dir.display());
    Ok(paths)
}

/// Read and convert one document from disk, honouring its declared encoding.
pub fn convert_file(
    path: &Path,
    defaults: &RecordDefaults,
    now: DateTime<Utc>,
) -> Result<ConvertedRoute> {
    let bytes = fs::read(path).map_err(|e| RouteMetricsError::from(e).with_path(path))?;
    let xml = decode_document(&bytes)?;
    convert_kml_str(path, &xml, defaults, now)
}

/// Convert documents one after another.
pub fn convert_paths(paths: &[PathBuf], defaults: &RecordDefaults) -> BatchReport {
    let now = Utc::now();
    let mut report = BatchReport::default();

    for path in paths {
        let outcome = convert_file(path, defaults, now);
        report.push(path, outcome);
    }

    info!(
        "[Batch] Converted {}/{} documents ({} diagnostics)",
        report.routes.len(),
        report.total(),
        report.diagnostic_count()
    );
    report
}

/// Convert documents concurrently. The report keeps input order.
#[cfg(feature = "parallel")]
pub fn convert_paths_parallel(paths: &[PathBuf], defaults: &RecordDefaults) -> BatchReport {
    let now = Utc::now();
    let outcomes: Vec<Result<ConvertedRoute>> = paths
        .par_iter()
        .map(|path| convert_file(path, defaults, now))
        .collect();

    let mut report = BatchReport::default();
    for (path, outcome) in paths.iter().zip(outcomes) {
        report.push(path, outcome);
    }

    info!(
        "[Batch] Converted {}/{} documents in parallel ({} diagnostics)",
        report.routes.len(),
        report.total(),
        report.diagnostic_count()
    );
    report
}

/// Convert every document under the configured input directory.
pub fn convert_directory(config: &ConverterConfig) -> Result<BatchReport> {
    let paths = find_documents(&config.input_dir, &config.extension, config.recursive)?;

    #[cfg(feature = "parallel")]
    let report = convert_paths_parallel(&paths, &config.defaults);

    #[cfg(not(feature = "parallel"))]
    let report = convert_paths(&paths, &config.defaults);

    Ok(report)
}
