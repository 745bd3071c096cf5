// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Runs the planar tessellator over the fragments stored on one octahedron face.

use glam::{DVec2, DVec3};

use super::side_orientation;
use crate::contour::{EdgeVertex, SubContour};
use crate::geom::twice_signed_area;
use crate::tess::{Tessellator, VertexCombiner, VertexId, WindingRule};

/// Vertex table for one tessellation call. Handles are indices.
struct FaceVertices {
    vertices: Vec<EdgeVertex>,
    /// +1 on the northern faces, -1 on the southern ones.
    z_sign: f64,
}

impl VertexCombiner for FaceVertices {
    fn combine(&mut self, position: DVec2, sources: &[(VertexId, f64)]) -> VertexId {
        let edge_flag = sources
            .iter()
            .filter_map(|&(id, _)| self.vertices.get(id as usize))
            .all(|v| v.edge_flag);
        let z = self.z_sign * (1.0 - position.x.abs() - position.y.abs()).max(0.0);
        self.vertices.push(EdgeVertex::new(position.extend(z), edge_flag));
        (self.vertices.len() - 1) as VertexId
    }

    fn merge(&mut self, kept: VertexId, absorbed: VertexId) {
        let absorbed_flag = match self.vertices.get(absorbed as usize) {
            Some(v) => v.edge_flag,
            None => return,
        };
        if let Some(v) = self.vertices.get_mut(kept as usize) {
            v.edge_flag |= absorbed_flag;
        }
    }
}

/// Twice the signed area of a face triangle in the sweep plane of its face.
pub(crate) fn face_triangle_area(side: usize, a: DVec3, b: DVec3, c: DVec3) -> f64 {
    let o = side_orientation(side);
    twice_signed_area(o.to_sweep(a.truncate()), o.to_sweep(b.truncate()), o.to_sweep(c.truncate()))
}

/// Replaces the fragments of face `side` by positive triangles covering the
/// region filled under `rule`.
pub(crate) fn tessellate_side(side: usize, contours: &[SubContour], rule: WindingRule) -> Vec<SubContour> {
    if contours.is_empty() {
        return Vec::new();
    }

    let mut table = FaceVertices {
        vertices: Vec::new(),
        z_sign: if side % 2 == 1 { 1.0 } else { -1.0 },
    };
    let mut tess = Tessellator::new(side_orientation(side));
    for contour in contours {
        let start = table.vertices.len();
        table.vertices.extend(contour.iter().copied());
        tess.add_contour(
            contour
                .iter()
                .enumerate()
                .map(|(i, v)| (v.vertex.truncate(), (start + i) as VertexId)),
        );
    }

    let triangles = match tess.tessellate(rule, &mut table) {
        Ok(t) => t,
        Err(err) => {
            log::error!("side {}: tessellation failed: {}", side, err);
            debug_assert!(false, "side {}: tessellation failed: {}", side, err);
            return Vec::new();
        }
    };

    let mut out = Vec::with_capacity(triangles.len());
    let mut discarded = 0usize;
    for tri in &triangles {
        let corners = tri.vertices.map(|id| table.vertices[id as usize]);
        let area = face_triangle_area(side, corners[0].vertex, corners[1].vertex, corners[2].vertex);
        if area <= 0.0 {
            discarded += 1;
            if area == 0.0 {
                log::debug!("side {}: dropping degenerate triangle {:?}", side, corners);
            } else {
                log::warn!("side {}: dropping misoriented triangle (area {:e})", side, area);
            }
            continue;
        }
        let mut sub = SubContour::with_capacity(3);
        for (corner, boundary) in corners.iter().zip(tri.boundary) {
            sub.push(EdgeVertex::new(corner.vertex, corner.edge_flag && boundary));
        }
        out.push(sub);
    }
    if discarded > 0 {
        log::debug!(
            "side {}: kept {} of {} triangles under {:?}",
            side,
            out.len(),
            triangles.len(),
            rule
        );
    }
    out
}
