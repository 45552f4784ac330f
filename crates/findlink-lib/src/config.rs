//! Index construction and query configuration

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for building a [`SpatialIndex`](crate::SpatialIndex)
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IndexConfig {
    /// Maximum number of edges stored in a leaf node before it is split.
    /// Default: 8
    pub leaf_capacity: usize,
    /// Maximum depth of the tree; nodes at this depth become leaves regardless of size.
    /// Default: 32
    pub max_depth: u32,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            leaf_capacity: 8,
            max_depth: 32,
        }
    }
}

/// Options for a [`NearestEdgeQuery`](crate::NearestEdgeQuery)
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QueryOptions {
    /// Number of edges to return (k). Default: 1
    pub max_results: usize,
    /// Only return edges closer than this angular distance in radians
    pub max_distance: Option<f64>,
    /// Skip the tree and compare every edge
    pub use_brute_force: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            max_results: 1,
            max_distance: None,
            use_brute_force: false,
        }
    }
}

impl QueryOptions {
    /// Set the number of results
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Limit results to edges within `radians` of the target
    pub fn with_max_distance(mut self, radians: f64) -> Self {
        self.max_distance = Some(radians);
        self
    }

    /// Limit results to edges within `meters` of the target
    pub fn with_max_distance_meters(self, meters: f64) -> Self {
        self.with_max_distance(crate::meters_to_radians(meters))
    }

    /// Force a linear scan over all edges
    pub fn with_brute_force(mut self, use_brute_force: bool) -> Self {
        self.use_brute_force = use_brute_force;
        self
    }
}
