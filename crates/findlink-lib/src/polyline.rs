//! Polyline storage
//!
//! A `Polyline` owns its point buffer outright. Building polylines from a shared,
//! growing buffer would make every polyline alias the same points, so all
//! constructors take or build a fresh `Vec`.

use crate::edge::GeodesicEdge;
use crate::sphere::SpherePoint;
use crate::{NetworkError, Result};
use geo::{Coord, LineString};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An ordered chain of points joined by geodesic edges
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Polyline {
    /// Identifier supplied by the data source (e.g. a GeoJSON feature `ID`)
    feature_id: Option<String>,
    /// Points in traversal order
    points: Vec<SpherePoint>,
}

impl Polyline {
    /// Create a polyline from already converted points
    pub fn new(points: Vec<SpherePoint>) -> Self {
        Self {
            feature_id: None,
            points,
        }
    }

    /// Create a polyline from longitude-first coordinates (x = lon, y = lat)
    ///
    /// # Errors
    /// `InvalidCoordinate` for the first coordinate outside the valid range.
    pub fn from_lon_lat<I>(coords: I) -> Result<Self>
    where
        I: IntoIterator<Item = Coord<f64>>,
    {
        let points = coords
            .into_iter()
            .map(SpherePoint::from_lon_lat)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(points))
    }

    /// Create a polyline from a `geo` line string in lon/lat degrees
    pub fn from_line_string(line: &LineString<f64>) -> Result<Self> {
        Self::from_lon_lat(line.coords().copied())
    }

    /// Create a polyline from (lat, lon) pairs in degrees
    pub fn from_lat_lon_degrees(pairs: &[(f64, f64)]) -> Result<Self> {
        let points = pairs
            .iter()
            .map(|&(lat, lon)| SpherePoint::from_lat_lon_degrees(lat, lon))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(points))
    }

    /// Attach an external feature identifier
    pub fn with_feature_id(mut self, feature_id: impl Into<String>) -> Self {
        self.feature_id = Some(feature_id.into());
        self
    }

    #[inline]
    pub fn feature_id(&self) -> Option<&str> {
        self.feature_id.as_deref()
    }

    #[inline]
    pub fn points(&self) -> &[SpherePoint] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of edges (consecutive point pairs), including degenerate ones
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    /// Edge joining point `offset` and point `offset + 1`
    #[inline]
    pub fn edge(&self, offset: usize) -> Option<GeodesicEdge> {
        let v0 = *self.points.get(offset)?;
        let v1 = *self.points.get(offset + 1)?;
        Some(GeodesicEdge::new_unchecked(v0, v1))
    }

    /// All edges in order; the position in the iterator is the edge offset
    pub fn edges(&self) -> impl Iterator<Item = GeodesicEdge> + '_ {
        self.points
            .windows(2)
            .map(|pair| GeodesicEdge::new_unchecked(pair[0], pair[1]))
    }

    /// Check that the polyline has at least two distinct points
    pub fn validate(&self) -> Result<()> {
        let Some(first) = self.points.first() else {
            return Err(NetworkError::DegenerateGeometry(
                "polyline has no points".to_string(),
            ));
        };
        if self.points.len() < 2 {
            return Err(NetworkError::DegenerateGeometry(
                "polyline has a single point".to_string(),
            ));
        }
        if self.points.iter().all(|p| p == first) {
            return Err(NetworkError::DegenerateGeometry(format!(
                "polyline has {} points but all are identical",
                self.points.len()
            )));
        }
        Ok(())
    }
}
