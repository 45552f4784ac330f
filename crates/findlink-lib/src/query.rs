//! Nearest-edge search over a [`SpatialIndex`]
//!
//! The search is a best-first branch-and-bound traversal: tree nodes and edges are
//! visited in order of increasing lower-bound distance, exact distances are computed
//! only for edges that reach the front of the queue, and anything whose lower bound
//! already exceeds the current k-th best distance is dropped.

use crate::config::QueryOptions;
use crate::edge::project_onto_edge;
use crate::index::{CapTreeNode, EdgeId, SpatialIndex};
use crate::sphere::SpherePoint;
use crate::{NetworkError, Result, radians_to_meters};
use geo::Coord;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Networks with at most this many edges are scanned linearly
pub const MAX_BRUTE_FORCE_EDGES: usize = 8;

/// One edge found by a query
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QueryResult {
    /// The edge (polyline position + edge offset)
    pub edge: EdgeId,
    /// Minimum angular distance from the target to the edge, in radians
    pub distance: f64,
    /// Point on the edge closest to the target
    pub closest_point: SpherePoint,
}

impl QueryResult {
    /// Distance in meters on the Earth's surface
    #[inline]
    pub fn distance_meters(&self) -> f64 {
        radians_to_meters(self.distance)
    }

    /// Closest point as a longitude-first coordinate (x = lon, y = lat)
    #[inline]
    pub fn closest_lon_lat(&self) -> Coord<f64> {
        self.closest_point.to_lon_lat()
    }

    /// Closest point as (lat, lon) in degrees
    #[inline]
    pub fn closest_lat_lon(&self) -> (f64, f64) {
        self.closest_point.to_lat_lon_degrees()
    }

    /// Ranking order: distance first, then input order
    #[inline]
    fn rank(&self, other: &QueryResult) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.edge.cmp(&other.edge))
    }
}

/// A k-nearest-edge query bound to an index
#[derive(Debug, Clone)]
pub struct NearestEdgeQuery<'a> {
    index: &'a SpatialIndex,
    options: QueryOptions,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl<'a> NearestEdgeQuery<'a> {
    /// Create a query over `index`
    pub fn new(index: &'a SpatialIndex, options: QueryOptions) -> Self {
        Self { index, options }
    }

    #[inline]
    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    /// Find up to `max_results` edges nearest to `target`, ranked by distance
    ///
    /// Equidistant edges are ranked by input order. Returns every edge when
    /// `max_results` exceeds the number of edges, and nothing when it is 0.
    pub fn find_edges(&self, target: &SpherePoint) -> Vec<QueryResult> {
        self.search(target, self.options.max_results)
    }

    /// Find the single nearest edge
    ///
    /// # Errors
    /// `NoResult` if no edge qualifies, which only happens when `max_distance`
    /// excludes every edge.
    pub fn find_closest_edge(&self, target: &SpherePoint) -> Result<QueryResult> {
        self.search(target, 1)
            .into_iter()
            .next()
            .ok_or(NetworkError::NoResult)
    }

    /// Find the nearest edge to a (lat, lon) target in degrees
    pub fn find_closest_edge_lat_lon(&self, lat: f64, lon: f64) -> Result<QueryResult> {
        let target = SpherePoint::from_lat_lon_degrees(lat, lon)?;
        self.find_closest_edge(&target)
    }

    /// Run `find_edges` for many targets in parallel
    pub fn find_edges_batch(&self, targets: &[SpherePoint]) -> Vec<Vec<QueryResult>> {
        // Profile batch queries separately from single-target searches
        #[cfg(feature = "profiling")]
        profiling::scope!("query::find_edges_batch");

        targets
            .par_iter()
            .map(|target| self.find_edges(target))
            .collect()
    }

    fn search(&self, target: &SpherePoint, max_results: usize) -> Vec<QueryResult> {
        if max_results == 0 {
            return Vec::new();
        }

        let mut results = ResultSet::new(
            max_results,
            self.options.max_distance.unwrap_or(f64::INFINITY),
        );

        if self.options.use_brute_force || self.index.num_edges() <= MAX_BRUTE_FORCE_EDGES {
            self.search_brute_force(target, &mut results);
        } else {
            self.search_tree(target, &mut results);
        }

        results.into_vec()
    }

    /// Exact distance to every indexed edge
    fn search_brute_force(&self, target: &SpherePoint, results: &mut ResultSet) {
        for indexed in self.index.indexed_edges() {
            self.visit_edge(indexed.id, target, results);
        }
    }

    /// Best-first traversal of the cap tree
    fn search_tree(&self, target: &SpherePoint, results: &mut ResultSet) {
        let edges = self.index.indexed_edges();
        let mut queue = BinaryHeap::new();
        let mut sequence = 0usize;
        let mut push = |queue: &mut BinaryHeap<QueueEntry<'a>>, bound: f64, item: QueueItem<'a>| {
            queue.push(QueueEntry {
                bound,
                sequence,
                item,
            });
            sequence += 1;
        };

        let root = self.index.root();
        push(&mut queue, root.cap.min_distance(target), QueueItem::Node(root));

        while let Some(entry) = queue.pop() {
            // Everything left in the queue is at least this far away
            if results.can_prune(entry.bound) {
                break;
            }

            match entry.item {
                QueueItem::Node(node) => match &node.children {
                    Some(children) => {
                        for child in children.iter() {
                            let bound = child.cap.min_distance(target);
                            if !results.can_prune(bound) {
                                push(&mut queue, bound, QueueItem::Node(child));
                            }
                        }
                    }
                    None => {
                        for indexed in &edges[node.edges.clone()] {
                            let bound = indexed.cap.min_distance(target);
                            if !results.can_prune(bound) {
                                push(&mut queue, bound, QueueItem::Edge(indexed.id));
                            }
                        }
                    }
                },
                QueueItem::Edge(id) => self.visit_edge(id, target, results),
            }
        }
    }

    #[inline]
    fn visit_edge(&self, id: EdgeId, target: &SpherePoint, results: &mut ResultSet) {
        let Some(edge) = self.index.edge(id) else {
            tracing::error!("Indexed edge {:?} has no geometry", id);
            return;
        };
        let (closest_point, distance) = project_onto_edge(target, &edge);
        results.insert(QueryResult {
            edge: id,
            distance,
            closest_point,
        });
    }
}

/// Ranked results capped at k entries
struct ResultSet {
    max_results: usize,
    /// Exclusive distance limit
    max_distance: f64,
    /// Sorted by distance, then input order
    results: Vec<QueryResult>,
}

impl ResultSet {
    fn new(max_results: usize, max_distance: f64) -> Self {
        Self {
            max_results,
            max_distance,
            results: Vec::with_capacity(max_results.min(64)),
        }
    }

    #[inline]
    fn is_full(&self) -> bool {
        self.results.len() >= self.max_results
    }

    /// Whether a region with this lower bound cannot improve the results
    ///
    /// Once full, only regions strictly farther than the k-th best are dropped, so an
    /// equidistant edge earlier in input order still gets a chance to win the tie.
    #[inline]
    fn can_prune(&self, bound: f64) -> bool {
        if bound >= self.max_distance {
            return true;
        }
        match self.results.last() {
            Some(worst) if self.is_full() => bound > worst.distance,
            _ => false,
        }
    }

    fn insert(&mut self, candidate: QueryResult) {
        if candidate.distance >= self.max_distance {
            return;
        }
        if let Some(worst) = self.results.last() {
            if self.is_full() && candidate.rank(worst) != Ordering::Less {
                return;
            }
        }

        let position = self
            .results
            .partition_point(|existing| existing.rank(&candidate) == Ordering::Less);
        self.results.insert(position, candidate);
        self.results.truncate(self.max_results);
    }

    fn into_vec(self) -> Vec<QueryResult> {
        self.results
    }
}

/// Something waiting to be examined by the tree search
#[derive(Debug, Clone, Copy)]
enum QueueItem<'a> {
    Node(&'a CapTreeNode),
    Edge(EdgeId),
}

/// Priority queue entry; `BinaryHeap` is a max-heap, so the ordering is reversed
#[derive(Debug, Clone, Copy)]
struct QueueEntry<'a> {
    bound: f64,
    sequence: usize,
    item: QueueItem<'a>,
}

impl PartialEq for QueueEntry<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry<'_> {}

impl PartialOrd for QueueEntry<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .bound
            .total_cmp(&self.bound)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}
