//! Geodesic edges and point-to-edge projection

use crate::sphere::{SpherePoint, Vector3, angular_distance};
use crate::{NetworkError, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Edges whose great-circle normal is shorter than this have no usable direction
const MIN_NORMAL_NORM: f64 = 1e-15;

/// The minor great-circle arc between two points
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeodesicEdge {
    v0: SpherePoint,
    v1: SpherePoint,
}

impl GeodesicEdge {
    /// Create an edge, rejecting zero-length and antipodal endpoint pairs
    pub fn new(v0: SpherePoint, v1: SpherePoint) -> Result<Self> {
        let edge = Self::new_unchecked(v0, v1);
        edge.validate()?;
        Ok(edge)
    }

    /// Create an edge without validation (polylines may contain repeated points)
    #[inline]
    pub(crate) fn new_unchecked(v0: SpherePoint, v1: SpherePoint) -> Self {
        Self { v0, v1 }
    }

    #[inline]
    pub fn v0(&self) -> SpherePoint {
        self.v0
    }

    #[inline]
    pub fn v1(&self) -> SpherePoint {
        self.v1
    }

    /// Check that the edge defines a unique great circle
    pub fn validate(&self) -> Result<()> {
        if self.v0 == self.v1 {
            return Err(NetworkError::DegenerateGeometry(
                "zero-length edge".to_string(),
            ));
        }
        if self.normal().norm() < MIN_NORMAL_NORM {
            let reason = if self.v0.dot(&self.v1) > 0.0 {
                "edge endpoints are numerically identical"
            } else {
                "edge endpoints are antipodal"
            };
            return Err(NetworkError::DegenerateGeometry(reason.to_string()));
        }
        Ok(())
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.validate().is_err()
    }

    /// Arc length in radians
    #[inline]
    pub fn length(&self) -> f64 {
        angular_distance(&self.v0, &self.v1)
    }

    /// Point halfway along the arc, `None` for antipodal endpoints
    #[inline]
    pub fn midpoint(&self) -> Option<SpherePoint> {
        SpherePoint::from_vector(self.v0.vector() + self.v1.vector())
    }

    /// Closest point on the arc to `target` and the angular distance to it
    #[inline]
    pub fn project(&self, target: &SpherePoint) -> (SpherePoint, f64) {
        project_onto_edge(target, self)
    }

    /// Angular distance from `target` to the nearest point on the arc
    #[inline]
    pub fn distance_to(&self, target: &SpherePoint) -> f64 {
        self.project(target).1
    }

    /// Normal of the great circle through both endpoints (not normalized)
    ///
    /// `(v1 + v0) × (v1 - v0)` equals `2 (v0 × v1)` but keeps more significant
    /// digits when the endpoints are close together.
    #[inline]
    fn normal(&self) -> Vector3 {
        let a = self.v1.vector() + self.v0.vector();
        let b = self.v1.vector() - self.v0.vector();
        a.cross(&b)
    }
}

/// Find the point on the edge closest to `target`
///
/// The target is projected onto the great circle through the endpoints. When that
/// projection falls inside the arc it is the answer; otherwise the nearer endpoint is.
/// Endpoints are always evaluated and the interior point only replaces them when it
/// is strictly nearer, so a target sitting on an endpoint returns that endpoint at
/// distance exactly 0. Equidistant endpoints resolve to `v0`.
///
/// # Returns
/// `(closest_point, distance_in_radians)`
pub fn project_onto_edge(target: &SpherePoint, edge: &GeodesicEdge) -> (SpherePoint, f64) {
    let d0 = angular_distance(target, &edge.v0);
    let d1 = angular_distance(target, &edge.v1);
    let (mut closest, mut distance) = if d1 < d0 {
        (edge.v1, d1)
    } else {
        (edge.v0, d0)
    };

    let normal = edge.normal();
    let normal_norm = normal.norm();
    if normal_norm < MIN_NORMAL_NORM {
        return (closest, distance);
    }

    // Drop the component along the unit normal to land on the great circle
    let unit_normal = normal.scale(1.0 / normal_norm);
    let t = target.vector();
    let in_plane = t - unit_normal.scale(t.dot(&unit_normal));

    // A target at the pole of the great circle is equidistant from every point on it
    let Some(foot) = SpherePoint::from_vector(in_plane) else {
        return (closest, distance);
    };

    // The foot is inside the arc when it is ahead of v0 and behind v1
    let after_v0 = edge.v0.cross(&foot).dot(&normal) >= 0.0;
    let before_v1 = foot.cross(&edge.v1).dot(&normal) >= 0.0;
    if after_v0 && before_v1 {
        let d = angular_distance(target, &foot);
        if d < distance {
            closest = foot;
            distance = d;
        }
    }

    (closest, distance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn point(lat: f64, lon: f64) -> SpherePoint {
        SpherePoint::from_lat_lon_degrees(lat, lon).unwrap()
    }

    fn edge(a: (f64, f64), b: (f64, f64)) -> GeodesicEdge {
        GeodesicEdge::new(point(a.0, a.1), point(b.0, b.1)).unwrap()
    }

    #[test]
    fn test_new_rejects_zero_length() {
        let p = point(37.0, 127.0);
        assert!(matches!(
            GeodesicEdge::new(p, p),
            Err(NetworkError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn test_new_rejects_antipodal() {
        let result = GeodesicEdge::new(point(0.0, 0.0), point(0.0, 180.0));
        assert!(matches!(result, Err(NetworkError::DegenerateGeometry(_))));
    }

    #[test]
    fn test_length_and_midpoint() {
        let e = edge((0.0, 0.0), (0.0, 10.0));
        assert!((e.length() - 10.0_f64.to_radians()).abs() < 1e-12);

        let (lat, lon) = e.midpoint().unwrap().to_lat_lon_degrees();
        assert!(lat.abs() < 1e-9);
        assert!((lon - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_project_clamps_to_v0_west_of_segment() {
        let e = edge((0.0, 0.0), (0.0, 10.0));
        let target = point(5.0, -5.0);

        let (closest, distance) = project_onto_edge(&target, &e);
        assert_eq!(closest, e.v0());
        assert_eq!(distance, angular_distance(&target, &e.v0()));
    }

    #[test]
    fn test_project_clamps_to_v1_east_of_segment() {
        let e = edge((0.0, 0.0), (0.0, 10.0));
        let target = point(-3.0, 14.0);

        let (closest, _) = project_onto_edge(&target, &e);
        assert_eq!(closest, e.v1());
    }

    #[test]
    fn test_project_interior_on_equator() {
        let e = edge((0.0, 0.0), (0.0, 10.0));
        let target = point(2.0, 4.0);

        let (closest, distance) = project_onto_edge(&target, &e);
        let (lat, lon) = closest.to_lat_lon_degrees();
        assert!(lat.abs() < 1e-9);
        assert!((lon - 4.0).abs() < 1e-9);
        assert!((distance - 2.0_f64.to_radians()).abs() < 1e-12);
    }

    #[test]
    fn test_project_target_on_endpoint() {
        let e = edge((37.0, 127.0), (37.01, 127.01));
        let target = point(37.0, 127.0);

        let (closest, distance) = project_onto_edge(&target, &e);
        assert_eq!(distance, 0.0);
        assert_eq!(closest, e.v0());

        let target = point(37.01, 127.01);
        let (closest, distance) = project_onto_edge(&target, &e);
        assert_eq!(distance, 0.0);
        assert_eq!(closest, e.v1());
    }

    #[test]
    fn test_project_equidistant_endpoints_prefers_v0() {
        // Target at the pole of the equator: every point on the edge is 90 degrees away
        let e = edge((0.0, -10.0), (0.0, 10.0));
        let pole = point(90.0, 0.0);

        let (closest, distance) = project_onto_edge(&pole, &e);
        assert_eq!(closest, e.v0());
        assert!((distance - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_project_on_degenerate_edge_returns_v0() {
        let p = point(10.0, 10.0);
        let e = GeodesicEdge::new_unchecked(p, p);
        assert!(e.is_degenerate());

        let target = point(11.0, 10.0);
        let (closest, distance) = project_onto_edge(&target, &e);
        assert_eq!(closest, p);
        assert_eq!(distance, angular_distance(&target, &p));
    }

    #[test]
    fn test_projection_never_beats_dense_sampling() {
        // The projected distance must not exceed the distance to any sampled arc point
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let a = point(rng.random_range(-60.0..60.0), rng.random_range(-170.0..170.0));
            let b = point(
                rng.random_range(-60.0..60.0),
                rng.random_range(-170.0..170.0),
            );
            let Ok(e) = GeodesicEdge::new(a, b) else {
                continue;
            };
            if e.length() > 3.0 {
                continue;
            }
            let target = point(rng.random_range(-80.0..80.0), rng.random_range(-180.0..180.0));
            let (closest, distance) = e.project(&target);

            // The returned point lies on the edge
            let on_edge = angular_distance(&e.v0(), &closest) + angular_distance(&closest, &e.v1());
            assert!((on_edge - e.length()).abs() < 1e-9);

            for i in 0..=100 {
                let t = i as f64 / 100.0;
                let v = a.vector().scale(1.0 - t) + b.vector().scale(t);
                let sample = SpherePoint::from_vector(v).unwrap();
                assert!(distance <= angular_distance(&target, &sample) + 1e-12);
            }
        }
    }
}
