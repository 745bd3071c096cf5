// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Cutting contours along the coordinate planes so that every piece lies in a
// single octant, then projecting the pieces onto the octahedron faces.

use glam::DVec3;

use super::{side_direction, SIDE_COUNT};
use crate::constants::{PLANE_SNAP_TOLERANCE, POLE_THRESHOLD};
use crate::contour::{EdgeVertex, SubContour};
use crate::sphere::great_circle_intersection;

/// Bucket 0 holds `coord > 0`, bucket 1 everything else.
#[inline]
fn bucket(v: DVec3, axis: usize) -> usize {
    if v[axis] > 0.0 {
        0
    } else {
        1
    }
}

/// Splits `contour` along the plane `coord[axis] = 0`.
///
/// Crossing points get the plane coordinate forced to zero. The run that ends
/// at a crossing closes with an unflagged segment; the run that starts there
/// inherits the flag of the segment it continues.
pub fn split_contour_by_plane(axis: usize, contour: &SubContour) -> [Vec<SubContour>; 2] {
    let mut result: [Vec<SubContour>; 2] = [Vec::new(), Vec::new()];
    let first = match contour.first() {
        Some(v) => *v,
        None => return result,
    };
    let mut plane = DVec3::ZERO;
    plane[axis] = 1.0;

    let mut current = SubContour::new();
    let mut unfinished: Option<SubContour> = None;
    let mut previous = first;
    let mut previous_side = bucket(first.vertex, axis);
    current.push(first);

    // A vertex lying on the plane is its own crossing.
    let crossing = |from: &EdgeVertex, to: DVec3| -> Option<DVec3> {
        if from.vertex[axis] == 0.0 {
            return Some(from.vertex);
        }
        if to[axis] == 0.0 {
            return Some(to);
        }
        let mut p = match great_circle_intersection(from.vertex, to, plane) {
            Some(p) => p,
            // Too close to define an arc: cut at the endpoint nearer the plane.
            None if from.vertex.dot(to) > 0.0 => {
                if from.vertex[axis].abs() <= to[axis].abs() {
                    from.vertex
                } else {
                    to
                }
            }
            None => return None,
        };
        p[axis] = 0.0;
        Some(p)
    };

    for v in contour.iter().skip(1) {
        let side = bucket(v.vertex, axis);
        if side != previous_side {
            match crossing(&previous, v.vertex) {
                Some(p) => {
                    current.push(EdgeVertex::new(p, false));
                    let done = std::mem::replace(&mut current, SubContour::new());
                    if unfinished.is_none() {
                        unfinished = Some(done);
                    } else {
                        result[previous_side].push(done);
                    }
                    current.push(EdgeVertex::new(p, previous.edge_flag));
                    previous_side = side;
                }
                None => {
                    log::debug!("axis {} crossing unresolved, keeping {:?}", axis, v.vertex);
                    previous_side = side;
                }
            }
        }
        current.push(*v);
        previous = *v;
    }

    // Segment last -> first.
    let first_side = bucket(first.vertex, axis);
    if first_side != previous_side {
        match crossing(&previous, first.vertex) {
            Some(p) => {
                current.push(EdgeVertex::new(p, false));
                let done = std::mem::replace(&mut current, SubContour::new());
                result[previous_side].push(done);
                current.push(EdgeVertex::new(p, previous.edge_flag));
            }
            None => {
                log::debug!("axis {} closing crossing unresolved", axis);
            }
        }
    }
    if let Some(prefix) = unfinished {
        current.extend_from(&prefix);
    }
    result[first_side].push(current);
    result
}

/// A quadrant piece that touches the pole needs the pole vertex to close it.
fn patch_pole(piece: &mut SubContour) {
    let (first, last) = match (piece.first(), piece.last()) {
        (Some(f), Some(l)) => (f.vertex, l.vertex),
        _ => return,
    };
    let z = first.cross(last).z;
    if z > POLE_THRESHOLD {
        piece.push(EdgeVertex::new(DVec3::Z, false));
    } else if z < -POLE_THRESHOLD {
        piece.push(EdgeVertex::new(DVec3::NEG_Z, false));
    } else {
        debug_assert!(
            first.x.abs() < POLE_THRESHOLD && last.x.abs() < POLE_THRESHOLD
                || first.y.abs() < POLE_THRESHOLD && last.y.abs() < POLE_THRESHOLD
                || (first - last).length() < POLE_THRESHOLD,
            "piece ends {:?} and {:?} share no meridian plane",
            first,
            last
        );
    }
}

/// Point on the face plane `dot(side_direction, p) = 1`.
#[inline]
pub fn project_on_side(side: usize, v: DVec3) -> DVec3 {
    let dot = side_direction(side).dot(v);
    debug_assert!(dot > 0.0, "{:?} does not project onto side {}", v, side);
    v / dot
}

/// Moves coordinates within rounding noise of zero onto their plane, so that
/// a vertex such as `vector_from_ra_dec(90.0, dec)` is not split off into a
/// sliver on the far side.
fn snap_to_planes(contour: &SubContour) -> SubContour {
    let mut snapped = contour.clone();
    for v in snapped.iter_mut() {
        for axis in 0..3 {
            if v.vertex[axis].abs() < PLANE_SNAP_TOLERANCE {
                v.vertex[axis] = 0.0;
            }
        }
    }
    snapped
}

/// Cuts a contour of unit vectors into per-face fragments, projected onto the
/// face planes.
pub fn split_contour(contour: &SubContour) -> [Vec<SubContour>; SIDE_COUNT] {
    let mut sides: [Vec<SubContour>; SIDE_COUNT] = Default::default();
    if contour.is_empty() {
        return sides;
    }

    let contour = snap_to_planes(contour);
    let by_y = split_contour_by_plane(1, &contour);
    let cut_y = by_y[0].len() + by_y[1].len() > 1;
    for (y_bucket, pieces) in by_y.iter().enumerate() {
        for piece in pieces {
            let by_x = split_contour_by_plane(0, piece);
            let cut = cut_y || by_x[0].len() + by_x[1].len() > 1;
            for (x_bucket, quadrant_pieces) in by_x.into_iter().enumerate() {
                for mut quadrant_piece in quadrant_pieces {
                    if cut {
                        patch_pole(&mut quadrant_piece);
                    }
                    let by_z = split_contour_by_plane(2, &quadrant_piece);
                    for (z_bucket, face_pieces) in by_z.into_iter().enumerate() {
                        let side = (x_bucket << 2) | (y_bucket << 1) | (1 - z_bucket);
                        for mut face_piece in face_pieces {
                            for v in face_piece.iter_mut() {
                                v.vertex = project_on_side(side, v.vertex);
                            }
                            sides[side].push(face_piece);
                        }
                    }
                }
            }
        }
    }
    sides
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sphere::vector_from_ra_dec;

    fn ring(ras: &[f64], dec: f64) -> SubContour {
        let vs: Vec<DVec3> = ras.iter().map(|&ra| vector_from_ra_dec(ra, dec)).collect();
        SubContour::from_vertices(&vs, true)
    }

    #[test]
    fn contour_on_one_side_is_untouched() {
        let c = ring(&[10.0, 20.0, 15.0], 10.0);
        let [pos, neg] = split_contour_by_plane(1, &c);
        assert_eq!(pos, vec![c]);
        assert!(neg.is_empty());
    }

    #[test]
    fn crossing_contour_splits_in_two() {
        // Straddles y = 0 around ra = 0.
        let c = ring(&[-10.0, 10.0, 0.0], 10.0);
        let [pos, neg] = split_contour_by_plane(1, &c);
        assert_eq!(pos.len(), 1);
        assert_eq!(neg.len(), 1);
        for piece in pos.iter().chain(neg.iter()) {
            let on_plane = piece.iter().filter(|v| v.vertex.y == 0.0).count();
            assert!(on_plane >= 2, "piece {:?}", piece);
        }
        // Closing segments at the cut are synthetic.
        let unflagged: usize = pos.iter().chain(neg.iter()).flat_map(|p| p.iter()).filter(|v| !v.edge_flag).count();
        assert!(unflagged >= 2);
    }

    #[test]
    fn split_points_inherit_flags() {
        let c = SubContour::from(vec![
            EdgeVertex::new(vector_from_ra_dec(-10.0, 5.0), false),
            EdgeVertex::new(vector_from_ra_dec(10.0, 5.0), true),
            EdgeVertex::new(vector_from_ra_dec(0.0, 20.0), true),
        ]);
        let [pos, _] = split_contour_by_plane(1, &c);
        // The positive run starts at the crossing of the unflagged first segment.
        let start = pos[0][0];
        assert_eq!(start.vertex.y, 0.0);
        assert!(!start.edge_flag);
    }

    #[test]
    fn nearly_coincident_vertices_across_the_plane() {
        // a and b straddle y = 0 but are too close to define an arc.
        let a = DVec3::new(0.8, 3e-16, 0.6);
        let b = DVec3::new(0.8, -3e-16, 0.6);
        assert!(great_circle_intersection(a, b, DVec3::Y).is_none());
        let c = SubContour::from_vertices(&[a, b, vector_from_ra_dec(-20.0, 30.0), vector_from_ra_dec(20.0, 30.0)], true);
        let [pos, neg] = split_contour_by_plane(1, &c);
        assert_eq!(pos.len(), 1);
        assert_eq!(neg.len(), 1);
        assert!(pos[0].iter().all(|v| v.vertex.y >= 0.0), "{:?}", pos[0]);
        assert!(neg[0].iter().all(|v| v.vertex.y <= 0.0), "{:?}", neg[0]);
    }

    #[test]
    fn near_plane_input_is_snapped() {
        // cos(90 deg) leaves x = 6e-17 rather than 0.
        let c = SubContour::from_vertices(
            &[
                vector_from_ra_dec(90.0, 10.0),
                vector_from_ra_dec(100.0, 10.0),
                vector_from_ra_dec(95.0, 20.0),
            ],
            true,
        );
        assert!(c[0].vertex.x != 0.0);
        let sides = split_contour(&c);
        // Everything lies in x <= 0, y > 0, z > 0.
        for (side, pieces) in sides.iter().enumerate() {
            assert_eq!(pieces.is_empty(), side != 5, "side {}", side);
        }
    }

    #[test]
    fn every_fragment_lies_on_its_face() {
        let c = ring(&[0.0, 60.0, 120.0, 180.0, 240.0, 300.0], 30.0);
        let sides = split_contour(&c);
        let mut used = 0;
        for (side, pieces) in sides.iter().enumerate() {
            let dir = side_direction(side);
            for piece in pieces {
                used += 1;
                for v in piece.iter() {
                    assert!((dir.dot(v.vertex) - 1.0).abs() < 1e-12, "side {} {:?}", side, v.vertex);
                }
            }
        }
        // A ring at dec 30 touches the four northern faces only.
        assert_eq!(used, 4);
        assert!(sides.iter().enumerate().all(|(s, p)| p.is_empty() == (s % 2 == 0)));
    }

    #[test]
    fn pole_ring_gets_pole_vertices() {
        let c = ring(&[45.0, 135.0, 225.0, 315.0], 60.0);
        let sides = split_contour(&c);
        for side in [1, 3, 5, 7] {
            assert_eq!(sides[side].len(), 1);
            assert!(sides[side][0].iter().any(|v| v.vertex == DVec3::Z), "side {}", side);
        }
    }
}
