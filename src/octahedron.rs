// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Spherical polygons stored as triangles on the eight faces of an octahedron.
//
// A contour of unit vectors is cut along the three coordinate planes so that
// every piece lies in one octant, and each piece is projected centrally onto
// the octahedron face |x| + |y| + |z| = 1 of that octant. Great-circle arcs
// map to straight segments under this projection, so each face can be handed
// to the planar tessellator. After every operation a face holds only
// non-overlapping triangles that are counter-clockwise seen from outside.

use std::f64::consts::PI;

use glam::{DVec2, DVec3};

use crate::constants::{POINT_ON_EDGE_DISTANCE, SQUARE_DEGREES_PER_STERADIAN, UNIT_LENGTH_TOLERANCE};
use crate::contour::{EdgeVertex, SubContour};
use crate::geom::twice_signed_area;
use crate::sphere::{angle_between, SphericalCap};
use crate::tess::{Orientation, WindingRule};

mod boolean;
mod serialize;
pub mod split;
mod tessellate;

pub use serialize::SerializeError;
pub(crate) use tessellate::{face_triangle_area, tessellate_side};

pub const SIDE_COUNT: usize = 8;

/// Outward direction `(+-1, +-1, +-1)` of face `side`.
/// Bit 2 set means x <= 0, bit 1 means y <= 0, bit 0 means z > 0.
#[inline]
pub fn side_direction(side: usize) -> DVec3 {
    debug_assert!(side < SIDE_COUNT);
    DVec3::new(
        if side & 4 == 0 { 1.0 } else { -1.0 },
        if side & 2 == 0 { 1.0 } else { -1.0 },
        if side & 1 == 1 { 1.0 } else { -1.0 },
    )
}

/// First face whose direction maximises `dot(direction, v)`.
pub fn side_of(v: DVec3) -> usize {
    let mut best = 0;
    let mut best_dot = f64::NEG_INFINITY;
    for side in 0..SIDE_COUNT {
        let dot = side_direction(side).dot(v);
        if dot > best_dot {
            best_dot = dot;
            best = side;
        }
    }
    best
}

/// Northern faces are viewed from +z, so triangles that are counter-clockwise
/// from outside are counter-clockwise in (x, y); southern faces are mirrored.
#[inline]
pub(crate) fn side_orientation(side: usize) -> Orientation {
    if side % 2 == 1 {
        Orientation::CounterClockwise
    } else {
        Orientation::Clockwise
    }
}

#[derive(Clone, Debug, Default)]
pub struct OctahedronPolygon {
    sides: [Vec<SubContour>; SIDE_COUNT],
    fill_vertices: Vec<DVec3>,
    edge_flags: Vec<bool>,
    outline_vertices: Vec<DVec3>,
    cap: SphericalCap,
}

impl OctahedronPolygon {
    /// Polygon bounded by closed contours of unit vectors, each running
    /// counter-clockwise seen from outside the sphere. Overlaps are merged.
    pub fn new<C: AsRef<[DVec3]>>(contours: &[C]) -> Self {
        Self::with_winding_rule(contours, WindingRule::Positive)
    }

    pub fn with_winding_rule<C: AsRef<[DVec3]>>(contours: &[C], rule: WindingRule) -> Self {
        let subs = contours
            .iter()
            .map(|c| SubContour::from_vertices(c.as_ref(), true))
            .collect();
        Self::from_sub_contours(subs, rule)
    }

    pub fn from_contour(contour: SubContour) -> Self {
        Self::from_sub_contours(vec![contour], WindingRule::Positive)
    }

    pub fn from_sub_contours(contours: Vec<SubContour>, rule: WindingRule) -> Self {
        let mut poly = Self::empty();
        for contour in &contours {
            debug_assert!(!contour.is_empty(), "empty contour");
            debug_assert!(
                contour
                    .iter()
                    .all(|v| (v.vertex.length() - 1.0).abs() < UNIT_LENGTH_TOLERANCE),
                "contour vertices must be unit vectors"
            );
            let pieces = split::split_contour(contour);
            for (side, mut fragments) in pieces.into_iter().enumerate() {
                poly.sides[side].append(&mut fragments);
            }
        }
        poly.tessellate(rule);
        poly
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// The whole sphere: one triangle per face spanning its three axis points.
    pub fn all_sky() -> Self {
        let mut poly = Self::empty();
        for side in 0..SIDE_COUNT {
            let d = side_direction(side);
            let mut corners = [DVec3::new(d.x, 0.0, 0.0), DVec3::new(0.0, d.y, 0.0), DVec3::new(0.0, 0.0, d.z)];
            if tessellate::face_triangle_area(side, corners[0], corners[1], corners[2]) < 0.0 {
                corners.swap(1, 2);
            }
            let tri: Vec<EdgeVertex> = corners.iter().map(|&c| EdgeVertex::new(c, false)).collect();
            poly.sides[side].push(SubContour::from(tri));
        }
        poly.update_caches();
        poly
    }

    /// Concatenates `other`'s faces onto this polygon without tessellating.
    /// Call `tessellate` afterwards unless the two are known to be disjoint.
    pub fn append(&mut self, other: &OctahedronPolygon) {
        for (mine, theirs) in self.sides.iter_mut().zip(other.sides.iter()) {
            mine.extend(theirs.iter().cloned());
        }
        self.update_caches();
    }

    /// Like `append`, with `other`'s contours reversed so they wind negatively.
    pub fn append_reversed(&mut self, other: &OctahedronPolygon) {
        for (mine, theirs) in self.sides.iter_mut().zip(other.sides.iter()) {
            mine.extend(theirs.iter().map(SubContour::reversed));
        }
        self.update_caches();
    }

    /// Re-triangulates every face, keeping the area filled under `rule`.
    pub fn tessellate(&mut self, rule: WindingRule) {
        for side in 0..SIDE_COUNT {
            self.tessellate_side(side, rule);
        }
        self.update_caches();
    }

    fn tessellate_side(&mut self, side: usize, rule: WindingRule) {
        let triangles = tessellate::tessellate_side(side, &self.sides[side], rule);
        self.sides[side] = triangles;
    }

    /// Replaces the contents of one face. Used for polygons assembled from
    /// already tessellated triangles.
    pub(crate) fn set_side(&mut self, side: usize, contours: Vec<SubContour>) {
        self.sides[side] = contours;
        self.update_caches();
    }

    fn update_caches(&mut self) {
        self.fill_vertices.clear();
        self.edge_flags.clear();
        self.outline_vertices.clear();
        for side in &self.sides {
            for tri in side {
                if tri.len() != 3 {
                    continue;
                }
                for i in 0..3 {
                    let v = tri[i].vertex.normalize();
                    self.fill_vertices.push(v);
                    self.edge_flags.push(tri[i].edge_flag);
                    if tri[i].edge_flag {
                        self.outline_vertices.push(v);
                        self.outline_vertices.push(tri[(i + 1) % 3].vertex.normalize());
                    }
                }
            }
        }
        self.cap = SphericalCap::bounding(&self.fill_vertices);
    }

    pub fn is_empty(&self) -> bool {
        self.sides.iter().all(Vec::is_empty)
    }

    pub fn sides(&self) -> &[Vec<SubContour>; SIDE_COUNT] {
        &self.sides
    }

    /// Triangle corners as unit vectors, three per triangle.
    pub fn fill_vertices(&self) -> &[DVec3] {
        &self.fill_vertices
    }

    /// Parallel to `fill_vertices`: whether the segment leaving each corner is
    /// part of the polygon outline.
    pub fn edge_flags(&self) -> &[bool] {
        &self.edge_flags
    }

    /// Outline segments as consecutive pairs of unit vectors.
    pub fn outline_vertices(&self) -> &[DVec3] {
        &self.outline_vertices
    }

    pub fn bounding_cap(&self) -> &SphericalCap {
        &self.cap
    }

    pub fn triangle_count(&self) -> usize {
        self.fill_vertices.len() / 3
    }

    /// Area in steradians.
    pub fn area(&self) -> f64 {
        self.fill_vertices
            .chunks_exact(3)
            .map(|t| spherical_triangle_area(t[0], t[1], t[2]))
            .sum()
    }

    pub fn area_square_degrees(&self) -> f64 {
        self.area() * SQUARE_DEGREES_PER_STERADIAN
    }

    /// A point strictly inside the polygon: the centroid of its largest
    /// triangle.
    pub fn point_inside(&self) -> Option<DVec3> {
        self.fill_vertices
            .chunks_exact(3)
            .map(|t| (spherical_triangle_area(t[0], t[1], t[2]), t))
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, t)| (t[0] + t[1] + t[2]).normalize())
    }

    /// Boundary-inclusive containment test for a unit vector.
    pub fn contains_point(&self, p: DVec3) -> bool {
        if !self.cap.contains_point(p) {
            return false;
        }
        let home = side_of(p);
        if self.side_contains_point(home, p) {
            return true;
        }
        // Points on a coordinate plane also belong to the faces across it.
        (0..SIDE_COUNT).filter(|&s| s != home).any(|side| {
            let diff = side ^ home;
            (diff & 4 == 0 || p.x == 0.0)
                && (diff & 2 == 0 || p.y == 0.0)
                && (diff & 1 == 0 || p.z == 0.0)
                && self.side_contains_point(side, p)
        })
    }

    fn side_contains_point(&self, side: usize, p: DVec3) -> bool {
        let dot = side_direction(side).dot(p);
        if dot <= 0.0 {
            return false;
        }
        let o = side_orientation(side);
        let q = o.to_sweep((p / dot).truncate());
        self.sides[side].iter().filter(|t| t.len() == 3).any(|t| {
            let [a, b, c] = [0, 1, 2].map(|i| o.to_sweep(t[i].vertex.truncate()));
            // Exact signs: a sliver's edges nearly share one line, and a
            // tolerance on the signs would let that whole line in.
            let inside = twice_signed_area(a, b, c) > 0.0
                && twice_signed_area(a, b, q) >= 0.0
                && twice_signed_area(b, c, q) >= 0.0
                && twice_signed_area(c, a, q) >= 0.0;
            inside
                || [(a, b), (b, c), (c, a)]
                    .iter()
                    .any(|&(from, to)| segment_distance(from, to, q) <= POINT_ON_EDGE_DISTANCE)
        })
    }
}

/// Distance from `q` to the segment `a -> b`.
fn segment_distance(a: DVec2, b: DVec2, q: DVec2) -> f64 {
    let d = b - a;
    let len2 = d.length_squared();
    let t = if len2 > 0.0 { ((q - a).dot(d) / len2).clamp(0.0, 1.0) } else { 0.0 };
    (q - (a + d * t)).length()
}

/// Spherical excess of the triangle (a, b, c) via the dihedral angles between
/// its edge planes.
pub fn spherical_triangle_area(a: DVec3, b: DVec3, c: DVec3) -> f64 {
    let ab = a.cross(b);
    let bc = b.cross(c);
    let ca = c.cross(a);
    2.0 * PI - angle_between(ab, bc) - angle_between(bc, ca) - angle_between(ca, ab)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sphere::vector_from_ra_dec;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn side_directions_match_index_bits() {
        assert_eq!(side_direction(0), DVec3::new(1.0, 1.0, -1.0));
        assert_eq!(side_direction(1), DVec3::new(1.0, 1.0, 1.0));
        assert_eq!(side_direction(6), DVec3::new(-1.0, -1.0, -1.0));
        for side in 0..SIDE_COUNT {
            assert_eq!(side_of(side_direction(side)), side);
        }
    }

    #[test]
    fn side_of_prefers_first_on_ties() {
        assert_eq!(side_of(DVec3::X), 0);
        assert_eq!(side_of(DVec3::Z), 1);
        assert_eq!(side_of(DVec3::NEG_Z), 0);
    }

    #[test]
    fn octant_triangle_area() {
        let a = spherical_triangle_area(DVec3::X, DVec3::Y, DVec3::Z);
        assert!((a - FRAC_PI_2).abs() < 1e-14);
        // Orientation does not matter.
        let b = spherical_triangle_area(DVec3::X, DVec3::Z, DVec3::Y);
        assert!((b - FRAC_PI_2).abs() < 1e-14);
    }

    #[test]
    fn all_sky_covers_the_sphere() {
        let sky = OctahedronPolygon::all_sky();
        assert_eq!(sky.triangle_count(), 8);
        assert!((sky.area() - 4.0 * PI).abs() < 1e-12);
        assert!(sky.bounding_cap().is_full());
        assert!(sky.outline_vertices().is_empty());
        for p in [DVec3::X, DVec3::NEG_Y, DVec3::new(0.3, -0.4, 0.5).normalize()] {
            assert!(sky.contains_point(p));
        }
    }

    #[test]
    fn empty_polygon() {
        let e = OctahedronPolygon::empty();
        assert!(e.is_empty());
        assert_eq!(e.area(), 0.0);
        assert!(e.bounding_cap().is_empty());
        assert!(!e.contains_point(DVec3::X));
        assert!(e.point_inside().is_none());
    }

    #[test]
    fn triangle_in_one_octant() {
        let tri = [
            vector_from_ra_dec(10.0, 10.0),
            vector_from_ra_dec(30.0, 10.0),
            vector_from_ra_dec(20.0, 30.0),
        ];
        let poly = OctahedronPolygon::new(&[tri]);
        assert_eq!(poly.triangle_count(), 1);
        assert_eq!(poly.sides()[1].len(), 1);
        let expected = spherical_triangle_area(tri[0], tri[1], tri[2]);
        assert!((poly.area() - expected).abs() < 1e-12);
        assert_eq!(poly.outline_vertices().len(), 6);
        assert!(poly.edge_flags().iter().all(|&f| f));
        assert!(poly.contains_point(poly.point_inside().unwrap()));
        for v in tri {
            assert!(poly.contains_point(v), "corner {:?}", v);
        }
    }

    #[test]
    fn sliver_does_not_contain_its_extension() {
        // A positive sliver on face 7 along x = 0. The pole lies on the line
        // of its edges, 0.73 away from the sliver itself.
        let on_face = |x: f64, y: f64| DVec3::new(x, y, 1.0 + x + y);
        let sliver = SubContour::from(vec![
            EdgeVertex::new(on_face(0.0, -1.0), true),
            EdgeVertex::new(on_face(-1.3e-16, -0.7331538290774993), true),
            EdgeVertex::new(on_face(-1.8e-16, -1.0), true),
        ]);
        let mut poly = OctahedronPolygon::empty();
        poly.set_side(7, vec![sliver]);
        assert!(!poly.side_contains_point(7, DVec3::Z));
        assert!(poly.side_contains_point(7, on_face(0.0, -0.9).normalize()));
    }

    #[test]
    fn points_just_off_an_edge() {
        let tri = [
            vector_from_ra_dec(10.0, 10.0),
            vector_from_ra_dec(30.0, 10.0),
            vector_from_ra_dec(20.0, 30.0),
        ];
        let poly = OctahedronPolygon::new(&[tri]);
        let mid = (tri[0] + tri[1]).normalize();
        let normal = tri[0].cross(tri[1]).normalize();
        assert!(poly.contains_point(mid));
        assert!(poly.contains_point((mid + normal * 1e-9).normalize()));
        assert!(!poly.contains_point((mid - normal * 1e-9).normalize()));
    }

    #[test]
    fn clockwise_contour_is_empty() {
        let tri = [
            vector_from_ra_dec(10.0, 10.0),
            vector_from_ra_dec(20.0, 30.0),
            vector_from_ra_dec(30.0, 10.0),
        ];
        assert!(OctahedronPolygon::new(&[tri]).is_empty());
    }

    #[test]
    fn append_and_reverse_cancel() {
        let tri = [
            vector_from_ra_dec(10.0, -10.0),
            vector_from_ra_dec(30.0, -10.0),
            vector_from_ra_dec(20.0, 10.0),
        ];
        let poly = OctahedronPolygon::new(&[tri]);
        let mut both = poly.clone();
        both.append_reversed(&poly);
        both.tessellate(WindingRule::NonZero);
        assert!(both.is_empty());
    }

    #[test]
    fn caches_are_consistent() {
        let quad = [
            vector_from_ra_dec(-20.0, -20.0),
            vector_from_ra_dec(20.0, -20.0),
            vector_from_ra_dec(20.0, 20.0),
            vector_from_ra_dec(-20.0, 20.0),
        ];
        let poly = OctahedronPolygon::new(&[quad]);
        assert_eq!(poly.fill_vertices().len(), poly.edge_flags().len());
        assert_eq!(poly.fill_vertices().len() % 3, 0);
        let flagged = poly.edge_flags().iter().filter(|&&f| f).count();
        assert_eq!(poly.outline_vertices().len(), 2 * flagged);
        for v in poly.fill_vertices() {
            assert!((v.length() - 1.0).abs() < 1e-12);
            assert!(poly.bounding_cap().contains_point(*v));
        }
    }
}
