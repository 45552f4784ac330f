//! Findlink Library - Nearest-Link Search over Geodesic Polyline Networks
//!
//! This library answers a single geometric query efficiently: given a target point on the
//! Earth's surface and a network of polylines (roads, paths), find the edge nearest to the
//! target, the great-circle distance to it, and the closest point on that edge.
//!
//! # Architecture
//!
//! - **[`SpherePoint`]**: Immutable unit vector for a surface location
//! - **[`GeodesicEdge`]**: One great-circle segment of a polyline, with point projection
//! - **[`Polyline`]**: Independently owned point sequence with an opaque identifier
//! - **[`SpatialIndex`]**: Bulk-built bounding-cap tree over every usable edge
//! - **[`NearestEdgeQuery`]**: Branch-and-bound k-nearest-edge search over the index
//!
//! # Performance Characteristics
//!
//! - **Build Time**: O(E log E) for E edges, edge preparation parallelized per polyline
//! - **Query Time**: sub-linear in practice, pruning subtrees by cap lower bounds
//! - **Memory**: O(N) for raw points + O(E) for edge caps and tree nodes

mod cap;
mod config;
mod edge;
mod index;
mod polyline;
mod query;
mod sphere;

// Public API exports
pub use cap::Cap;
pub use config::{IndexConfig, QueryOptions};
pub use edge::{GeodesicEdge, project_onto_edge};
pub use index::{EdgeId, IndexStats, SpatialIndex};
pub use polyline::Polyline;
pub use query::{MAX_BRUTE_FORCE_EDGES, NearestEdgeQuery, QueryResult};
pub use sphere::{SpherePoint, angular_distance};

/// Mean Earth radius in meters, used to turn angular distances into arc lengths
pub const EARTH_MEAN_RADIUS_METERS: f64 = 6_371_010.0;

/// Convert an angular distance in radians to meters on the Earth's surface
#[inline]
pub fn radians_to_meters(radians: f64) -> f64 {
    radians * EARTH_MEAN_RADIUS_METERS
}

/// Convert a surface distance in meters to an angular distance in radians
#[inline]
pub fn meters_to_radians(meters: f64) -> f64 {
    meters / EARTH_MEAN_RADIUS_METERS
}

/// Error types for the network geometry and search
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NetworkError {
    #[error("Invalid coordinate: lat={lat}, lon={lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },

    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("Network contains no usable edges")]
    EmptyNetwork,

    #[error("Query returned no result")]
    NoResult,
}

pub type Result<T> = std::result::Result<T, NetworkError>;
