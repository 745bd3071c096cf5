// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Boolean operations. Both operands are already single-layer positive
// triangle sets, so each operation is a choice of which faces to merge and of
// the winding rule to re-tessellate them with.

use super::{OctahedronPolygon, SIDE_COUNT};
use crate::constants::{CONTAINMENT_AREA_TOLERANCE, OVERLAP_AREA_TOLERANCE};
use crate::tess::WindingRule;
use crate::validation;

impl OctahedronPolygon {
    pub fn union_in_place(&mut self, other: &OctahedronPolygon) {
        if !self.cap.intersects(&other.cap) {
            self.append(other);
            return;
        }
        for side in 0..SIDE_COUNT {
            if other.sides[side].is_empty() {
                continue;
            }
            if self.sides[side].is_empty() {
                self.sides[side] = other.sides[side].clone();
                continue;
            }
            self.sides[side].extend(other.sides[side].iter().cloned());
            self.tessellate_side(side, WindingRule::Positive);
        }
        self.update_caches();
    }

    pub fn intersection_in_place(&mut self, other: &OctahedronPolygon) {
        if !self.cap.intersects(&other.cap) {
            *self = OctahedronPolygon::empty();
            return;
        }
        for side in 0..SIDE_COUNT {
            if self.sides[side].is_empty() || other.sides[side].is_empty() {
                self.sides[side].clear();
                continue;
            }
            self.sides[side].extend(other.sides[side].iter().cloned());
            self.tessellate_side(side, WindingRule::AbsGeqTwo);
            self.tessellate_side(side, WindingRule::Positive);
        }
        self.update_caches();

        debug_assert!(validation::check_triangles(self).is_valid(), "intersection left misoriented triangles");
        debug_assert!(
            validation::overlap_area(self) < OVERLAP_AREA_TOLERANCE,
            "intersection left overlapping triangles"
        );
    }

    pub fn subtraction_in_place(&mut self, other: &OctahedronPolygon) {
        if !self.cap.intersects(&other.cap) {
            return;
        }
        for side in 0..SIDE_COUNT {
            if self.sides[side].is_empty() || other.sides[side].is_empty() {
                continue;
            }
            self.sides[side].extend(other.sides[side].iter().map(|c| c.reversed()));
            self.tessellate_side(side, WindingRule::Positive);
        }
        self.update_caches();
    }

    pub fn union(&self, other: &OctahedronPolygon) -> OctahedronPolygon {
        let mut out = self.clone();
        out.union_in_place(other);
        out
    }

    pub fn intersection(&self, other: &OctahedronPolygon) -> OctahedronPolygon {
        let mut out = self.clone();
        out.intersection_in_place(other);
        out
    }

    pub fn subtraction(&self, other: &OctahedronPolygon) -> OctahedronPolygon {
        let mut out = self.clone();
        out.subtraction_in_place(other);
        out
    }

    /// Whether `other` lies entirely inside this polygon (boundaries may touch).
    pub fn contains(&self, other: &OctahedronPolygon) -> bool {
        if other.is_empty() {
            return true;
        }
        if self.is_empty() || !self.cap.intersects(&other.cap) {
            return false;
        }
        if other.fill_vertices.iter().any(|&v| !self.cap.contains_point(v)) {
            return false;
        }
        self.union(other).area() - self.area() < CONTAINMENT_AREA_TOLERANCE
    }

    pub fn intersects(&self, other: &OctahedronPolygon) -> bool {
        if !self.cap.intersects(&other.cap) {
            return false;
        }
        !self.intersection(other).is_empty()
    }
}
