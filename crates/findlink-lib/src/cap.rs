//! Spherical caps used as bounding regions in the spatial index

use crate::sphere::{SpherePoint, Vector3, angular_distance};
use std::f64::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Extra radius added to every cap so rounding in the bound never exceeds the true distance
pub(crate) const CAP_RADIUS_PADDING: f64 = 1e-12;

/// All points within `radius` radians of `center`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cap {
    center: SpherePoint,
    radius: f64,
}

impl Cap {
    /// Create a cap, clamping the radius to [0, π]
    pub fn new(center: SpherePoint, radius: f64) -> Self {
        Self {
            center,
            radius: radius.clamp(0.0, PI),
        }
    }

    /// Cap covering the whole sphere
    pub fn full(center: SpherePoint) -> Self {
        Self::new(center, PI)
    }

    /// Smallest cap around the arc midpoint containing the whole arc from `v0` to `v1`
    ///
    /// Every point of a minor arc lies within half the arc length of its midpoint.
    /// Falls back to a full cap when the endpoints are antipodal.
    pub(crate) fn from_arc(v0: &SpherePoint, v1: &SpherePoint) -> Self {
        match SpherePoint::from_vector(v0.vector() + v1.vector()) {
            Some(mid) => {
                let radius = angular_distance(&mid, v0).max(angular_distance(&mid, v1));
                Self::new(mid, radius + CAP_RADIUS_PADDING)
            }
            None => Self::full(*v0),
        }
    }

    /// Cap containing every cap in `caps`
    ///
    /// The center is the normalized sum of the member centers. Returns `None` for an
    /// empty slice.
    pub(crate) fn covering(caps: &[Cap]) -> Option<Self> {
        let first = caps.first()?;
        let sum = caps.iter().fold(
            Vector3 {
                x: 0.0,
                y: 0.0,
                z: 0.0,
            },
            |acc, cap| acc + cap.center.vector(),
        );

        let Some(center) = SpherePoint::from_vector(sum) else {
            return Some(Self::full(first.center));
        };

        let radius = caps
            .iter()
            .map(|cap| angular_distance(&center, &cap.center) + cap.radius)
            .fold(0.0_f64, f64::max);

        Some(Self::new(center, radius + CAP_RADIUS_PADDING))
    }

    #[inline]
    pub fn center(&self) -> SpherePoint {
        self.center
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Whether the point lies inside the cap
    #[inline]
    pub fn contains(&self, point: &SpherePoint) -> bool {
        angular_distance(&self.center, point) <= self.radius
    }

    /// Lower bound on the angular distance from `target` to anything inside the cap
    #[inline]
    pub fn min_distance(&self, target: &SpherePoint) -> f64 {
        (angular_distance(&self.center, target) - self.radius).max(0.0)
    }
}
