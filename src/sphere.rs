// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Unit-sphere primitives: great-circle intersection, spherical caps and
// equatorial coordinate conversion.

use glam::DVec3;

use crate::constants::{CAP_MARGIN, GREAT_CIRCLE_EPSILON};

/// Intersection of the great-circle arc `p1 -> p2` with the plane through the
/// origin whose normal is `plane_normal`.
///
/// Returns `None` when the arc is too short (or its endpoints are antipodal)
/// to define a great circle, or when that circle lies in the plane. The
/// returned unit vector is the one of the two candidates lying on the arc side.
pub fn great_circle_intersection(p1: DVec3, p2: DVec3, plane_normal: DVec3) -> Option<DVec3> {
    let arc_normal = p1.cross(p2);
    if arc_normal.length() < GREAT_CIRCLE_EPSILON {
        return None;
    }
    let dir = plane_normal.cross(arc_normal);
    let len = dir.length();
    if len < GREAT_CIRCLE_EPSILON {
        return None;
    }
    let dir = dir / len;
    if dir.dot(p1 + p2) < 0.0 {
        Some(-dir)
    } else {
        Some(dir)
    }
}

/// Angle between two vectors in radians, accurate for small and large angles.
#[inline]
pub fn angle_between(a: DVec3, b: DVec3) -> f64 {
    a.cross(b).length().atan2(a.dot(b))
}

/// Right ascension in [0, 360) and declination in [-90, 90], both in degrees.
pub fn ra_dec_from_vector(v: DVec3) -> (f64, f64) {
    let v = v.normalize();
    let mut ra = v.y.atan2(v.x).to_degrees();
    if ra < 0.0 {
        ra += 360.0;
    }
    if ra >= 360.0 {
        ra -= 360.0;
    }
    let dec = v.z.clamp(-1.0, 1.0).asin().to_degrees();
    (ra, dec)
}

pub fn vector_from_ra_dec(ra_deg: f64, dec_deg: f64) -> DVec3 {
    let (ra, dec) = (ra_deg.to_radians(), dec_deg.to_radians());
    DVec3::new(dec.cos() * ra.cos(), dec.cos() * ra.sin(), dec.sin())
}

/// The set of unit vectors `v` with `v . n >= d`: a disk of angular radius
/// `acos(d)` around `n`. `d > 1` is the empty cap, `d <= -1` the whole sphere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphericalCap {
    pub n: DVec3,
    pub d: f64,
}

impl Default for SphericalCap {
    fn default() -> Self {
        Self::empty()
    }
}

impl SphericalCap {
    pub fn new(n: DVec3, d: f64) -> Self {
        SphericalCap { n, d }
    }

    pub fn empty() -> Self {
        SphericalCap { n: DVec3::X, d: 2.0 }
    }

    pub fn full() -> Self {
        SphericalCap { n: DVec3::X, d: -1.0 }
    }

    pub fn is_empty(&self) -> bool {
        self.d > 1.0
    }

    pub fn is_full(&self) -> bool {
        self.d <= -1.0
    }

    /// Cap around the normalized sum of the two most separated vertices,
    /// just wide enough to hold every vertex. Caps wider than a hemisphere are
    /// not convex and become the full sphere.
    pub fn bounding(vertices: &[DVec3]) -> Self {
        if vertices.is_empty() {
            return Self::empty();
        }
        let mut best = (vertices[0], vertices[0]);
        let mut min_dot = f64::INFINITY;
        for (i, &a) in vertices.iter().enumerate() {
            for &b in &vertices[i + 1..] {
                let dot = a.dot(b);
                if dot < min_dot {
                    min_dot = dot;
                    best = (a, b);
                }
            }
        }
        let sum = best.0 + best.1;
        if sum.length() < GREAT_CIRCLE_EPSILON {
            return Self::full();
        }
        let n = sum.normalize();
        let d = vertices.iter().map(|v| n.dot(*v)).fold(f64::INFINITY, f64::min);
        let d = if d > 0.0 { d * (1.0 - CAP_MARGIN) } else { d * (1.0 + CAP_MARGIN) };
        if d < 0.0 {
            return Self::full();
        }
        SphericalCap { n, d: d.min(1.0) }
    }

    #[inline]
    pub fn contains_point(&self, v: DVec3) -> bool {
        v.dot(self.n) >= self.d
    }

    pub fn intersects(&self, other: &SphericalCap) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        let a = self.d * other.d - self.n.dot(other.n);
        self.d + other.d <= 0.0
            || a <= 0.0
            || (a <= 1.0 && a * a <= (1.0 - self.d * self.d) * (1.0 - other.d * other.d))
    }

    pub fn contains_cap(&self, other: &SphericalCap) -> bool {
        if other.is_empty() {
            return true;
        }
        if self.is_empty() {
            return false;
        }
        if self.is_full() {
            return true;
        }
        let a = self.n.dot(other.n) - self.d * other.d;
        self.d <= other.d
            && (a >= 1.0 || (a >= 0.0 && a * a >= (1.0 - self.d * self.d) * (1.0 - other.d * other.d)))
    }
}
