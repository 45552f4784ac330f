//! GeoJSON link loading
//!
//! Only the parts of GeoJSON a link network needs are modelled: a FeatureCollection
//! whose features carry `LineString` geometries in `[lon, lat]` order and an optional
//! `ID` property. Other geometry types are skipped with a warning.

use crate::error::CliError;
use findlink_lib::Polyline;
use geo::Coord;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
    #[serde(default)]
    properties: Option<Properties>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    /// Shape depends on `kind`, so it is only decoded for LineStrings
    #[serde(default)]
    coordinates: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
struct Properties {
    #[serde(rename = "ID", alias = "id", alias = "Id")]
    id: Option<serde_json::Value>,
}

impl Properties {
    /// Feature id as text; numeric ids are formatted as-is
    fn feature_id(&self) -> Option<String> {
        match self.id.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

/// Read a links file from disk
pub fn load_links(path: &Path) -> Result<Vec<Polyline>, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_links(&text)
}

/// Parse a GeoJSON FeatureCollection into polylines, one per LineString feature
///
/// Polylines keep the feature order of the file, minus skipped features.
pub fn parse_links(text: &str) -> Result<Vec<Polyline>, CliError> {
    let collection: FeatureCollection = serde_json::from_str(text)?;

    let mut polylines = Vec::with_capacity(collection.features.len());
    for (index, feature) in collection.features.into_iter().enumerate() {
        let Some(geometry) = feature.geometry else {
            tracing::warn!("Skipping feature {}: no geometry", index);
            continue;
        };
        if geometry.kind != "LineString" {
            tracing::warn!(
                "Skipping feature {}: unsupported geometry type {}",
                index,
                geometry.kind
            );
            continue;
        }

        let coords = line_string_coords(index, geometry.coordinates)?;
        let mut polyline = Polyline::from_lon_lat(coords)?;
        if let Some(id) = feature.properties.as_ref().and_then(Properties::feature_id) {
            polyline = polyline.with_feature_id(id);
        }
        polylines.push(polyline);
    }

    tracing::info!("Loaded {} links", polylines.len());
    Ok(polylines)
}

/// Decode `[[lon, lat, ...], ...]` into a fresh coordinate buffer
fn line_string_coords(index: usize, value: serde_json::Value) -> Result<Vec<Coord<f64>>, CliError> {
    let positions: Vec<Vec<f64>> =
        serde_json::from_value(value).map_err(|e| CliError::InvalidFeature {
            index,
            reason: e.to_string(),
        })?;

    positions
        .into_iter()
        .map(|position| match position.as_slice() {
            // Extra members (altitude) are ignored
            [lon, lat, ..] => Ok(Coord { x: *lon, y: *lat }),
            _ => Err(CliError::InvalidFeature {
                index,
                reason: format!("position with {} members", position.len()),
            }),
        })
        .collect()
}
