//! Unit-sphere points and great-circle distance
//!
//! Every location is stored as a 3D unit vector. All distances are angles in radians
//! measured along great circles, never planar approximations.

use crate::{NetworkError, Result};
use geo::Coord;
use std::ops::{Add, Neg, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A location on the unit sphere, stored as a Cartesian unit vector
///
/// The norm is 1 by construction; there is no way to obtain a non-normalized
/// `SpherePoint` from outside this module.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpherePoint {
    x: f64,
    y: f64,
    z: f64,
}

/// Plain 3D vector used for intermediate (non-unit) results
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl SpherePoint {
    /// Convert WGS84 (lat, lon) in degrees to a unit vector
    ///
    /// # Arguments
    /// * `lat` - Latitude in degrees (-90 to 90)
    /// * `lon` - Longitude in degrees (-180 to 180)
    ///
    /// # Errors
    /// `InvalidCoordinate` if either value is out of range or not finite.
    pub fn from_lat_lon_degrees(lat: f64, lon: f64) -> Result<Self> {
        if !lat.is_finite()
            || !lon.is_finite()
            || !(-90.0..=90.0).contains(&lat)
            || !(-180.0..=180.0).contains(&lon)
        {
            return Err(NetworkError::InvalidCoordinate { lat, lon });
        }

        let lat_rad = lat.to_radians();
        let lon_rad = lon.to_radians();
        let cos_lat = lat_rad.cos();

        Ok(Self {
            x: cos_lat * lon_rad.cos(),
            y: cos_lat * lon_rad.sin(),
            z: lat_rad.sin(),
        })
    }

    /// Convert a longitude-first `geo` coordinate (x = lon, y = lat) to a unit vector
    #[inline]
    pub fn from_lon_lat(coord: Coord<f64>) -> Result<Self> {
        Self::from_lat_lon_degrees(coord.y, coord.x)
    }

    /// Convert back to (lat, lon) in degrees
    #[inline]
    pub fn to_lat_lon_degrees(&self) -> (f64, f64) {
        let lat = self.z.atan2(self.x.hypot(self.y)).to_degrees();
        let lon = self.y.atan2(self.x).to_degrees();
        (lat, lon)
    }

    /// Convert back to a longitude-first `geo` coordinate
    #[inline]
    pub fn to_lon_lat(&self) -> Coord<f64> {
        let (lat, lon) = self.to_lat_lon_degrees();
        Coord { x: lon, y: lat }
    }

    /// Normalize an arbitrary vector onto the sphere
    ///
    /// Returns `None` for vectors too short to have a meaningful direction.
    pub(crate) fn from_vector(v: Vector3) -> Option<Self> {
        let norm = v.norm();
        if !norm.is_finite() || norm <= f64::MIN_POSITIVE {
            return None;
        }
        Some(Self {
            x: v.x / norm,
            y: v.y / norm,
            z: v.z / norm,
        })
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.y
    }

    #[inline]
    pub fn z(&self) -> f64 {
        self.z
    }

    #[inline]
    pub(crate) fn vector(&self) -> Vector3 {
        Vector3 {
            x: self.x,
            y: self.y,
            z: self.z,
        }
    }

    /// Cartesian coordinate along an axis (0 = x, 1 = y, 2 = z)
    #[inline]
    pub(crate) fn axis(&self, axis: usize) -> f64 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    #[inline]
    pub(crate) fn dot(&self, other: &SpherePoint) -> f64 {
        self.vector().dot(&other.vector())
    }

    #[inline]
    pub(crate) fn cross(&self, other: &SpherePoint) -> Vector3 {
        self.vector().cross(&other.vector())
    }
}

impl Vector3 {
    #[inline]
    pub fn dot(&self, other: &Vector3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[inline]
    pub fn cross(&self, other: &Vector3) -> Vector3 {
        Vector3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    #[inline]
    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    #[inline]
    pub fn scale(&self, factor: f64) -> Vector3 {
        Vector3 {
            x: self.x * factor,
            y: self.y * factor,
            z: self.z * factor,
        }
    }
}

impl Add for Vector3 {
    type Output = Vector3;

    fn add(self, rhs: Vector3) -> Vector3 {
        Vector3 {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

impl Sub for Vector3 {
    type Output = Vector3;

    fn sub(self, rhs: Vector3) -> Vector3 {
        Vector3 {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
        }
    }
}

impl Neg for Vector3 {
    type Output = Vector3;

    fn neg(self) -> Vector3 {
        Vector3 {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

/// Great-circle angle between two points in radians
///
/// Uses `atan2(|a × b|, a · b)`, which stays accurate for nearly identical and
/// nearly antipodal points where `acos(a · b)` loses most of its precision.
/// The result is exactly symmetric and exactly zero for identical points.
#[inline]
pub fn angular_distance(a: &SpherePoint, b: &SpherePoint) -> f64 {
    a.cross(b).norm().atan2(a.dot(b))
}
