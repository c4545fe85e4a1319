//! CSV and JSON output of converted routes.
//!
//! The CSV starts with two header rows: the coarse type of each column, then
//! the column names. Array-valued cells (`features`, `coordinates`) hold JSON
//! text so the full point sequence survives a round trip.
//!
//! The JSON output is an array of records without the fields a downstream
//! store assigns (`objectId`, `createdAt`, `updatedAt`).

use log::info;
use serde_json::Value;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use crate::error::{Result, RouteMetricsError};
use crate::record::RouteRecord;
use crate::TrackPoint;

/// CSV columns and their coarse types, in output order.
pub const CSV_COLUMNS: &[(&str, &str)] = &[
    ("description", "string"),
    ("features", "array"),
    ("updatedAt", "date"),
    ("coordinates", "array"),
    ("elevation", "number"),
    ("difficulty", "string"),
    ("name", "string"),
    ("objectId", "string"),
    ("createdAt", "date"),
    ("type", "string"),
    ("reviewCount", "int"),
    ("status", "string"),
    ("thumbnailImage", "string"),
    ("length", "number"),
    ("estimatedTime", "number"),
    ("rating", "number"),
];

/// Fields left out of the JSON output.
const JSON_STRIPPED_FIELDS: &[&str] = &["objectId", "createdAt", "updatedAt"];

fn create_output(path: &Path) -> Result<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| RouteMetricsError::ExportError {
            message: format!("cannot create '{}': {}", path.display(), e),
        })
}

/// Cells of one CSV row, in [`CSV_COLUMNS`] order.
fn csv_row(record: &RouteRecord) -> Result<Vec<String>> {
    Ok(vec![
        record.description.clone(),
        serde_json::to_string(&record.features)?,
        record.updated_at.to_rfc3339(),
        serde_json::to_string(&record.coordinates)?,
        record.elevation.to_string(),
        record.difficulty.as_str().to_string(),
        record.name.clone(),
        record.object_id.clone().unwrap_or_default(),
        record.created_at.to_rfc3339(),
        record.route_type.as_str().to_string(),
        record.review_count.to_string(),
        record.status.clone(),
        record.thumbnail_image.clone(),
        record.length.to_string(),
        record.estimated_time.to_string(),
        record.rating.to_string(),
    ])
}

/// Write routes as CSV with the type and name header rows.
pub fn write_csv<W: Write>(writer: W, records: &[RouteRecord]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record(CSV_COLUMNS.iter().map(|(_, kind)| *kind))?;
    wtr.write_record(CSV_COLUMNS.iter().map(|(name, _)| *name))?;
    for record in records {
        wtr.write_record(csv_row(record)?)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write routes as CSV to a file.
pub fn write_csv_file(path: &Path, records: &[RouteRecord]) -> Result<()> {
    write_csv(create_output(path)?, records)?;
    info!("[Export] Wrote {} routes to {}", records.len(), path.display());
    Ok(())
}

/// Read the coordinates column back from CSV written by [`write_csv`].
///
/// Returns one point sequence per data row, in row order.
pub fn read_coordinates_column<R: Read>(reader: R) -> Result<Vec<Vec<TrackPoint>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(reader);
    let mut rows = rdr.records();

    // Type row, then column names
    rows.next().transpose()?;
    let header = rows.next().transpose()?.ok_or_else(|| RouteMetricsError::ExportError {
        message: "missing CSV header rows".to_string(),
    })?;
    let column = header
        .iter()
        .position(|name| name == "coordinates")
        .ok_or_else(|| RouteMetricsError::ExportError {
            message: "no coordinates column".to_string(),
        })?;

    let mut sequences = Vec::new();
    for row in rows {
        let row = row?;
        let cell = row.get(column).unwrap_or("[]");
        sequences.push(serde_json::from_str(cell)?);
    }
    Ok(sequences)
}

/// JSON value of a record with store-assigned fields removed.
fn json_entry(record: &RouteRecord) -> Result<Value> {
    let mut value = serde_json::to_value(record)?;
    if let Value::Object(map) = &mut value {
        for field in JSON_STRIPPED_FIELDS {
            map.remove(*field);
        }
    }
    Ok(value)
}

/// Write routes as a pretty-printed JSON array.
pub fn write_json<W: Write>(mut writer: W, records: &[RouteRecord]) -> Result<()> {
    let entries = records.iter().map(json_entry).collect::<Result<Vec<_>>>()?;
    serde_json::to_writer_pretty(&mut writer, &entries)?;
    writer.write_all(b"\n").map_err(|e| RouteMetricsError::ExportError {
        message: e.to_string(),
    })?;
    writer.flush().map_err(|e| RouteMetricsError::ExportError {
        message: e.to_string(),
    })
}

/// Write routes as JSON to a file.
pub fn write_json_file(path: &Path, records: &[RouteRecord]) -> Result<()> {
    write_json(create_output(path)?, records)?;
    info!("[Export] Wrote {} routes to {}", records.len(), path.display());
    Ok(())
}
