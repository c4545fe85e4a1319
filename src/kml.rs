//! Minimal KML reader producing the feature tree walked by [`crate::extract`].
//!
//! Only what route extraction needs is kept: container features (`Document`,
//! `Folder`, `Placemark`), their `name` and `description`, `ExtendedData`
//! entries and a single geometry with its coordinate tuples. Everything else
//! (styles, camera views, time spans, ...) is skipped.

use encoding_rs::{Encoding, UTF_8};
use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;

use crate::error::{Result, RouteMetricsError};

/// Kind of a geometry element.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryKind {
    LineString,
    Point,
    Polygon,
    MultiGeometry,
    /// Any other geometry element, by local name
    Other(String),
}

impl GeometryKind {
    fn from_local_name(name: &[u8]) -> Option<Self> {
        match name {
            b"LineString" => Some(GeometryKind::LineString),
            b"Point" => Some(GeometryKind::Point),
            b"Polygon" => Some(GeometryKind::Polygon),
            b"MultiGeometry" => Some(GeometryKind::MultiGeometry),
            b"LinearRing" | b"Track" | b"MultiTrack" | b"Model" => Some(GeometryKind::Other(
                String::from_utf8_lossy(name).into_owned(),
            )),
            _ => None,
        }
    }
}

/// A geometry and its coordinate tuples as written in the document.
///
/// Tuples normally hold 2 (lon, lat) or 3 (lon, lat, alt) numbers. A tuple is
/// cut at its first non-numeric component, so a malformed tuple shows up as
/// one with too few dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub kind: GeometryKind,
    pub coordinates: Vec<Vec<f64>>,
}

/// One `Data` or `SimpleData` entry of an `ExtendedData` block.
#[derive(Debug, Clone, PartialEq)]
pub struct DataEntry {
    pub name: String,
    pub value: String,
}

/// A node of the feature tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KmlFeature {
    /// Element local name (`Document`, `Folder`, `Placemark`)
    pub element: String,
    pub name: Option<String>,
    pub description: Option<String>,
    /// `None` when the feature has no `ExtendedData` element at all
    pub extended_data: Option<Vec<DataEntry>>,
    pub children: Vec<KmlFeature>,
    pub geometry: Option<Geometry>,
}

/// Parsed KML document: its top-level features in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KmlDocument {
    pub features: Vec<KmlFeature>,
}

fn is_feature_element(name: &[u8]) -> bool {
    matches!(name, b"Document" | b"Folder" | b"Placemark")
}

/// Parse a KML string into its feature tree.
///
/// Malformed XML is a fatal [`RouteMetricsError::KmlParse`].
pub fn parse_kml(xml: &str) -> Result<KmlDocument> {
    let mut reader = Reader::from_str(xml);
    let mut document = KmlDocument::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if is_feature_element(e.local_name().as_ref()) {
                    document.features.push(parse_feature(&e, &mut reader)?);
                }
                // Any other element (the `kml` root) is descended into
            }
            Ok(Event::Empty(e)) => {
                if is_feature_element(e.local_name().as_ref()) {
                    document.features.push(empty_feature(&e));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(RouteMetricsError::from(e)),
            _ => {}
        }
    }

    Ok(document)
}

/// Decode raw document bytes to text.
///
/// A byte order mark wins, then the `encoding` of the XML declaration, then
/// UTF-8. Bytes invalid in the chosen encoding are a [`RouteMetricsError::KmlParse`].
pub fn decode_document(bytes: &[u8]) -> Result<Cow<'_, str>> {
    let (encoding, body) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => (encoding, &bytes[bom_len..]),
        None => (declared_encoding(bytes).unwrap_or(UTF_8), bytes),
    };

    let (text, had_errors) = encoding.decode_without_bom_handling(body);
    if had_errors {
        return Err(RouteMetricsError::KmlParse {
            message: format!("document is not valid {}", encoding.name()),
        });
    }
    if encoding != UTF_8 {
        debug!("[Kml] Decoded document from {}", encoding.name());
    }
    Ok(text)
}

/// Encoding named by the XML declaration, if any and known.
fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let mut reader = Reader::from_reader(bytes);
    match reader.read_event() {
        Ok(Event::Decl(decl)) => {
            let label = decl.encoding()?.ok()?;
            Encoding::for_label(&label)
        }
        _ => None,
    }
}

/// Parse KML from raw bytes in any declared encoding.
pub fn parse_kml_bytes(bytes: &[u8]) -> Result<KmlDocument> {
    parse_kml(&decode_document(bytes)?)
}

fn empty_feature(start: &BytesStart<'_>) -> KmlFeature {
    KmlFeature {
        element: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
        ..KmlFeature::default()
    }
}

fn unexpected_eof(element: &[u8]) -> RouteMetricsError {
    RouteMetricsError::KmlParse {
        message: format!(
            "unexpected end of document inside <{}>",
            String::from_utf8_lossy(element)
        ),
    }
}

/// Parse a container feature and everything below it.
/// Called after receiving Event::Start for the feature element.
fn parse_feature<'a>(start: &BytesStart<'a>, reader: &mut Reader<&'a [u8]>) -> Result<KmlFeature> {
    let mut feature = empty_feature(start);
    let end_name = start.name().0.to_vec();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let local = e.local_name();
                let local = local.as_ref();
                if is_feature_element(local) {
                    feature.children.push(parse_feature(&e, reader)?);
                } else if let Some(kind) = GeometryKind::from_local_name(local) {
                    let geometry = parse_geometry(kind, &e, reader)?;
                    if feature.geometry.is_none() {
                        feature.geometry = Some(geometry);
                    }
                } else {
                    match local {
                        b"name" => feature.name = Some(read_text_owned(reader, &e)?),
                        b"description" => {
                            feature.description = Some(read_text_owned(reader, &e)?)
                        }
                        b"ExtendedData" => {
                            let entries = parse_extended_data(&e, reader)?;
                            feature
                                .extended_data
                                .get_or_insert_with(Vec::new)
                                .extend(entries);
                        }
                        _ => {
                            reader.read_to_end(e.name())?;
                        }
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                let local = e.local_name();
                let local = local.as_ref();
                if is_feature_element(local) {
                    feature.children.push(empty_feature(&e));
                } else if local == b"ExtendedData" {
                    feature.extended_data.get_or_insert_with(Vec::new);
                }
            }
            Ok(Event::End(e)) if e.name().0 == end_name.as_slice() => break,
            Ok(Event::Eof) => return Err(unexpected_eof(&end_name)),
            Err(e) => return Err(RouteMetricsError::from(e)),
            _ => {}
        }
    }

    Ok(feature)
}

/// Parse a geometry element, keeping the first `coordinates` block found in it.
fn parse_geometry<'a>(
    kind: GeometryKind,
    start: &BytesStart<'a>,
    reader: &mut Reader<&'a [u8]>,
) -> Result<Geometry> {
    let mut geometry = Geometry {
        kind,
        coordinates: Vec::new(),
    };

    // Nested geometries are not routes; only the kind is recorded
    if !matches!(
        geometry.kind,
        GeometryKind::LineString | GeometryKind::Point | GeometryKind::Polygon
    ) {
        reader.read_to_end(start.name())?;
        return Ok(geometry);
    }

    let end_name = start.name().0.to_vec();
    let mut seen_coordinates = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"coordinates" {
                    let text = read_text_owned(reader, &e)?;
                    // Polygon: the outer ring comes first
                    if !seen_coordinates {
                        geometry.coordinates = parse_coordinates(&text);
                        seen_coordinates = true;
                    }
                }
                // Ring wrappers and scalar fields (tessellate, altitudeMode) are walked through
            }
            Ok(Event::End(e)) if e.name().0 == end_name.as_slice() => break,
            Ok(Event::Eof) => return Err(unexpected_eof(&end_name)),
            Err(e) => return Err(RouteMetricsError::from(e)),
            _ => {}
        }
    }

    Ok(geometry)
}

/// Split a KML `coordinates` text into numeric tuples.
///
/// Tuples are whitespace separated, components comma separated. Components
/// are read up to the first one that is not a number.
pub fn parse_coordinates(text: &str) -> Vec<Vec<f64>> {
    text.split_whitespace()
        .map(|tuple| {
            tuple
                .split(',')
                .map(|c| c.trim().parse::<f64>())
                .take_while(|c| c.is_ok())
                .filter_map(|c| c.ok())
                .collect()
        })
        .collect()
}

/// Read the `name` attribute of a `Data`/`SimpleData` element.
fn name_attribute(start: &BytesStart<'_>) -> Result<Option<String>> {
    for attr_result in start.attributes() {
        let attr = attr_result.map_err(|e| RouteMetricsError::from(quick_xml::Error::from(e)))?;
        if attr.key.local_name().as_ref() == b"name" {
            let value = std::str::from_utf8(&attr.value).unwrap_or_default();
            return Ok(Some(value.to_string()));
        }
    }
    Ok(None)
}

/// Parse an `<ExtendedData>` block into its entries.
///
/// Accepts both `<Data name=".."><value>..</value></Data>` and
/// `<SchemaData><SimpleData name="..">..</SimpleData></SchemaData>`.
fn parse_extended_data<'a>(
    start: &BytesStart<'a>,
    reader: &mut Reader<&'a [u8]>,
) -> Result<Vec<DataEntry>> {
    let mut entries = Vec::new();
    let end_name = start.name().0.to_vec();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"Data" => {
                    let name = name_attribute(&e)?;
                    let value = parse_data_value(&e, reader)?;
                    if let (Some(name), Some(value)) = (name, value) {
                        entries.push(DataEntry { name, value });
                    }
                }
                b"SimpleData" => {
                    let name = name_attribute(&e)?;
                    let value = read_text_owned(reader, &e)?;
                    if let Some(name) = name {
                        entries.push(DataEntry { name, value });
                    }
                }
                b"SchemaData" => {}
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Ok(Event::End(e)) if e.name().0 == end_name.as_slice() => break,
            Ok(Event::Eof) => return Err(unexpected_eof(&end_name)),
            Err(e) => return Err(RouteMetricsError::from(e)),
            _ => {}
        }
    }

    Ok(entries)
}

/// Read the `<value>` child of a `<Data>` element.
fn parse_data_value<'a>(
    start: &BytesStart<'a>,
    reader: &mut Reader<&'a [u8]>,
) -> Result<Option<String>> {
    let mut value = None;
    let end_name = start.name().0.to_vec();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"value" {
                    value = Some(read_text_owned(reader, &e)?);
                } else {
                    reader.read_to_end(e.name())?;
                }
            }
            Ok(Event::End(e)) if e.name().0 == end_name.as_slice() => break,
            Ok(Event::Eof) => return Err(unexpected_eof(&end_name)),
            Err(e) => return Err(RouteMetricsError::from(e)),
            _ => {}
        }
    }

    Ok(value)
}

/// Read the text content of an element as a trimmed, owned String.
/// Handles regular text, CDATA sections and entity references.
fn read_text_owned<'a>(reader: &mut Reader<&'a [u8]>, start: &BytesStart<'_>) -> Result<String> {
    let end_name = start.name().0.to_vec();
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Text(e)) => {
                text.push_str(std::str::from_utf8(e.as_ref()).unwrap_or_default());
            }
            Ok(Event::CData(e)) => {
                text.push_str(std::str::from_utf8(e.as_ref()).unwrap_or_default());
            }
            Ok(Event::GeneralRef(e)) => {
                if let Ok(Some(ch)) = e.resolve_char_ref() {
                    text.push(ch);
                } else {
                    match std::str::from_utf8(e.as_ref()).unwrap_or_default() {
                        "amp" => text.push('&'),
                        "lt" => text.push('<'),
                        "gt" => text.push('>'),
                        "quot" => text.push('"'),
                        "apos" => text.push('\''),
                        _ => {}
                    }
                }
            }
            Ok(Event::End(e)) if e.name().0 == end_name.as_slice() => break,
            Ok(Event::Eof) => return Err(unexpected_eof(&end_name)),
            Err(e) => return Err(RouteMetricsError::from(e)),
            _ => {}
        }
    }

    Ok(text.trim().to_string())
}
