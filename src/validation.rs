// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Invariant checks for tessellated polygons. Boolean operations run them under
// debug_assert!; tests call them directly.

use glam::DVec3;

use crate::octahedron::{face_triangle_area, side_direction, tessellate_side, OctahedronPolygon, SIDE_COUNT};
use crate::tess::WindingRule;

/// Face plane tolerance for `dot(side_direction, v) = 1`.
const FACE_PLANE_TOLERANCE: f64 = 1e-9;

/// Whether `v` lies on the plane of face `side`.
pub(crate) fn on_face(side: usize, v: DVec3) -> bool {
    (side_direction(side).dot(v) - 1.0).abs() <= FACE_PLANE_TOLERANCE
}

/// Counts of triangle-level defects in a polygon.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub triangles: usize,
    /// Stored sub-contours with other than three vertices.
    pub non_triangles: usize,
    /// Triangles whose twice-signed area for their face is not positive.
    pub non_positive: usize,
    /// Vertices not on the plane of their face.
    pub off_face: usize,
    pub non_finite: usize,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.non_triangles == 0 && self.non_positive == 0 && self.off_face == 0 && self.non_finite == 0
    }
}

pub fn check_triangles(poly: &OctahedronPolygon) -> ValidationReport {
    let mut report = ValidationReport::default();
    for (side, contours) in poly.sides().iter().enumerate() {
        for c in contours {
            if c.len() != 3 {
                report.non_triangles += 1;
                continue;
            }
            report.triangles += 1;
            if c.iter().any(|v| !v.vertex.is_finite()) {
                report.non_finite += 1;
                continue;
            }
            report.off_face += c.iter().filter(|v| !on_face(side, v.vertex)).count();
            if face_triangle_area(side, c[0].vertex, c[1].vertex, c[2].vertex) <= 0.0 {
                report.non_positive += 1;
            }
        }
    }
    report
}

/// Area (steradians) covered at least twice by the polygon's own triangles.
/// Zero up to rounding for any properly tessellated polygon.
pub fn overlap_area(poly: &OctahedronPolygon) -> f64 {
    let mut layered = OctahedronPolygon::empty();
    for side in 0..SIDE_COUNT {
        if poly.sides()[side].is_empty() {
            continue;
        }
        let overlaps = tessellate_side(side, &poly.sides()[side], WindingRule::AbsGeqTwo);
        if overlaps.is_empty() {
            continue;
        }
        log::debug!("side {}: {} overlapping triangles", side, overlaps.len());
        layered.set_side(side, overlaps);
    }
    layered.area()
}
