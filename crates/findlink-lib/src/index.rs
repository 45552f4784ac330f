//! Bounding-cap tree spatial index for nearest-edge search
//!
//! This module provides a read-only hierarchical index over every usable edge of a
//! polyline network. Each node stores a spherical cap covering all edges below it, so
//! a search can discard a whole subtree once the cap's lower-bound distance exceeds
//! the best distance found so far. Nodes split into up to four children, quadtree
//! style, by quartiles of edge position along the axis of greatest spread.

use crate::cap::Cap;
use crate::config::IndexConfig;
use crate::edge::GeodesicEdge;
use crate::polyline::Polyline;
use crate::{NetworkError, Result};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::ops::Range;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum number of children per node
const FANOUT: usize = 4;

/// Reference to one edge of the network: polyline position plus edge offset
///
/// Ordering follows input order (polyline first, then edge), which is the tie-break
/// used for equidistant results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EdgeId {
    /// Position of the polyline in the collection passed to the build
    pub polyline: usize,
    /// Offset of the edge in the polyline (edge `i` joins points `i` and `i + 1`)
    pub edge: usize,
}

impl EdgeId {
    pub fn new(polyline: usize, edge: usize) -> Self {
        Self { polyline, edge }
    }
}

/// An edge reference with its bounding cap (no geometry is duplicated)
#[derive(Debug, Clone, Copy)]
pub(crate) struct IndexedEdge {
    pub id: EdgeId,
    pub cap: Cap,
}

/// A single node in the cap tree
#[derive(Debug, Clone)]
pub(crate) struct CapTreeNode {
    /// Cap covering every edge below this node
    pub cap: Cap,
    /// Depth level in the tree (0 = root)
    pub level: u32,
    /// Range into the index's edge list covered by this node
    pub edges: Range<usize>,
    /// Child nodes if subdivided
    pub children: Option<Box<[CapTreeNode]>>,
}

/// Summary of an index build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IndexStats {
    /// Polylines passed to the build
    pub polylines: usize,
    /// Polylines skipped for having fewer than two distinct points
    pub skipped_polylines: usize,
    /// Edges stored in the index
    pub edges: usize,
    /// Zero-length or antipodal edges left out of the index
    pub skipped_edges: usize,
    /// Total number of tree nodes
    pub nodes: usize,
    /// Number of leaf nodes
    pub leaves: usize,
    /// Maximum node level
    pub depth: u32,
}

/// Read-only spatial index over a static polyline network
///
/// Built once, then safe to query from any number of threads at the same time.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    /// All polylines, in input order (including skipped ones, so positions stay stable)
    polylines: Vec<Polyline>,
    /// Indexed edges, permuted so every node covers a contiguous range
    edges: Vec<IndexedEdge>,
    /// Root of the cap tree
    root: CapTreeNode,
    /// Build summary
    stats: IndexStats,
}

/// Edges prepared from one polyline during the build
struct PreparedPolyline {
    edges: Vec<IndexedEdge>,
    skipped: bool,
    skipped_edges: usize,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl SpatialIndex {
    /// Build an index with the default configuration
    pub fn build(polylines: Vec<Polyline>) -> Result<Self> {
        Self::build_with_config(polylines, IndexConfig::default())
    }

    /// Build an index over every usable edge of `polylines`
    ///
    /// Polylines with fewer than two distinct points and degenerate edges are skipped
    /// with a warning. Edge preparation runs in parallel; the result is deterministic.
    ///
    /// # Errors
    /// `EmptyNetwork` if no usable edge remains after filtering.
    pub fn build_with_config(polylines: Vec<Polyline>, config: IndexConfig) -> Result<Self> {
        // High-level profiling scope for index construction.
        #[cfg(feature = "profiling")]
        profiling::scope!("index::build");

        let prepared: Vec<PreparedPolyline> = polylines
            .par_iter()
            .enumerate()
            .map(|(position, polyline)| prepare_polyline(position, polyline))
            .collect();

        let mut stats = IndexStats {
            polylines: polylines.len(),
            ..IndexStats::default()
        };
        let mut edges = Vec::with_capacity(prepared.iter().map(|p| p.edges.len()).sum());
        for polyline in prepared {
            if polyline.skipped {
                stats.skipped_polylines += 1;
            }
            stats.skipped_edges += polyline.skipped_edges;
            edges.extend(polyline.edges);
        }

        if edges.is_empty() {
            return Err(NetworkError::EmptyNetwork);
        }

        let leaf_capacity = config.leaf_capacity.max(1);
        let root = CapTreeNode::build(&mut edges, 0, 0, leaf_capacity, config.max_depth)
            .ok_or(NetworkError::EmptyNetwork)?;

        stats.edges = edges.len();
        root.collect_stats(&mut stats);

        tracing::debug!(
            "Built spatial index: {} edges from {} polylines ({} polylines and {} edges skipped), {} nodes, depth {}",
            stats.edges,
            stats.polylines,
            stats.skipped_polylines,
            stats.skipped_edges,
            stats.nodes,
            stats.depth
        );

        Ok(Self {
            polylines,
            edges,
            root,
            stats,
        })
    }

    /// Number of indexed (usable) edges
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Number of polylines passed to the build, including skipped ones
    #[inline]
    pub fn num_polylines(&self) -> usize {
        self.polylines.len()
    }

    /// Get a polyline by its input position
    #[inline]
    pub fn polyline(&self, position: usize) -> Option<&Polyline> {
        self.polylines.get(position)
    }

    /// All polylines in input order
    #[inline]
    pub fn polylines(&self) -> &[Polyline] {
        &self.polylines
    }

    /// Resolve an edge reference to its geometry
    #[inline]
    pub fn edge(&self, id: EdgeId) -> Option<GeodesicEdge> {
        self.polylines.get(id.polyline)?.edge(id.edge)
    }

    /// References to every indexed edge (order unspecified)
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges.iter().map(|e| e.id)
    }

    /// Build summary
    #[inline]
    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }

    #[inline]
    pub(crate) fn root(&self) -> &CapTreeNode {
        &self.root
    }

    #[inline]
    pub(crate) fn indexed_edges(&self) -> &[IndexedEdge] {
        &self.edges
    }
}

/// Validate a polyline and compute caps for its usable edges
fn prepare_polyline(position: usize, polyline: &Polyline) -> PreparedPolyline {
    if let Err(err) = polyline.validate() {
        tracing::warn!(
            "Skipping polyline {} (feature id {:?}): {}",
            position,
            polyline.feature_id(),
            err
        );
        return PreparedPolyline {
            edges: Vec::new(),
            skipped: true,
            skipped_edges: 0,
        };
    }

    let mut edges = Vec::with_capacity(polyline.num_edges());
    let mut skipped_edges = 0;
    for (offset, edge) in polyline.edges().enumerate() {
        if let Err(err) = edge.validate() {
            tracing::warn!(
                "Skipping edge {} of polyline {} (feature id {:?}): {}",
                offset,
                position,
                polyline.feature_id(),
                err
            );
            skipped_edges += 1;
            continue;
        }
        edges.push(IndexedEdge {
            id: EdgeId::new(position, offset),
            cap: Cap::from_arc(&edge.v0(), &edge.v1()),
        });
    }

    PreparedPolyline {
        edges,
        skipped: false,
        skipped_edges,
    }
}

impl CapTreeNode {
    /// Recursively build the subtree over `edges`, which start at `offset` in the full list
    ///
    /// Returns `None` for an empty slice.
    fn build(
        edges: &mut [IndexedEdge],
        offset: usize,
        level: u32,
        leaf_capacity: usize,
        max_depth: u32,
    ) -> Option<Self> {
        let caps: Vec<Cap> = edges.iter().map(|e| e.cap).collect();
        let cap = Cap::covering(&caps)?;
        let range = offset..offset + edges.len();

        if edges.len() <= leaf_capacity || level >= max_depth {
            return Some(Self {
                cap,
                level,
                edges: range,
                children: None,
            });
        }

        let bounds = partition_quartiles(edges);

        let children: Vec<CapTreeNode> = bounds
            .windows(2)
            .filter_map(|window| {
                let (start, end) = (window[0], window[1]);
                Self::build(
                    &mut edges[start..end],
                    offset + start,
                    level + 1,
                    leaf_capacity,
                    max_depth,
                )
            })
            .collect();

        Some(Self {
            cap,
            level,
            edges: range,
            children: Some(children.into_boxed_slice()),
        })
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    fn collect_stats(&self, stats: &mut IndexStats) {
        stats.nodes += 1;
        stats.depth = stats.depth.max(self.level);
        match &self.children {
            Some(children) => {
                for child in children.iter() {
                    child.collect_stats(stats);
                }
            }
            None => stats.leaves += 1,
        }
    }
}

/// Reorder `edges` into four quartiles along the axis of greatest spread
///
/// Returns the five chunk boundaries. Ties on the coordinate are broken by
/// `EdgeId`, so the layout only depends on the input.
fn partition_quartiles(edges: &mut [IndexedEdge]) -> [usize; FANOUT + 1] {
    let axis = split_axis(edges);
    let compare = |a: &IndexedEdge, b: &IndexedEdge| -> Ordering {
        a.cap
            .center()
            .axis(axis)
            .total_cmp(&b.cap.center().axis(axis))
            .then_with(|| a.id.cmp(&b.id))
    };

    let n = edges.len();
    let mid = n / 2;
    select_nth(edges, mid, compare);
    let (lower, upper) = edges.split_at_mut(mid);
    select_nth(lower, n / 4, compare);
    select_nth(upper, (3 * n / 4) - mid, compare);

    [0, n / 4, mid, 3 * n / 4, n]
}

/// Partial sort placing the `index`-th element in order; no-op when out of range
fn select_nth<F>(edges: &mut [IndexedEdge], index: usize, compare: F)
where
    F: FnMut(&IndexedEdge, &IndexedEdge) -> Ordering,
{
    if index < edges.len() {
        edges.select_nth_unstable_by(index, compare);
    }
}

/// Cartesian axis along which the cap centers are most spread out
fn split_axis(edges: &[IndexedEdge]) -> usize {
    let mut min = [f64::INFINITY; 3];
    let mut max = [f64::NEG_INFINITY; 3];
    for edge in edges {
        let center = edge.cap.center();
        for axis in 0..3 {
            let value = center.axis(axis);
            min[axis] = min[axis].min(value);
            max[axis] = max[axis].max(value);
        }
    }

    (0..3)
        .max_by(|&a, &b| (max[a] - min[a]).total_cmp(&(max[b] - min[b])))
        .unwrap_or(0)
}
