// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Numeric tolerances shared by the sphere and octahedron code.

/// Cross products shorter than this make a great-circle intersection undefined.
pub const GREAT_CIRCLE_EPSILON: f64 = 1e-15;

/// |(first x last).z| below this means a quadrant piece closes along a meridian
/// and needs no pole vertex.
pub const POLE_THRESHOLD: f64 = 1e-8;

/// Relative margin applied to the cosine of a bounding cap.
pub const CAP_MARGIN: f64 = 1e-7;

/// `area(A | B) - area(A)` below this (steradians) means B is inside A.
pub const CONTAINMENT_AREA_TOLERANCE: f64 = 1e-11;

/// A point within this distance (face-plane units) of a triangle edge counts
/// as inside the triangle.
pub const POINT_ON_EDGE_DISTANCE: f64 = 1e-12;

/// Input coordinates smaller than this in magnitude are snapped onto their
/// coordinate plane before a contour is split.
pub const PLANE_SNAP_TOLERANCE: f64 = 1e-15;

/// Area (steradians) a second AbsGeqTwo pass may leave over an intersection
/// result before the overlap check fails.
pub const OVERLAP_AREA_TOLERANCE: f64 = 1e-10;

/// Unit vectors are accepted when their length is within this of 1.
pub const UNIT_LENGTH_TOLERANCE: f64 = 1e-6;

/// Sweep s coordinates closer than this, relative to the largest |s|, are
/// treated as one column.
pub const SWEEP_COLUMN_TOLERANCE: f64 = 1e-14;

/// Largest magnitude the planar tessellator accepts for a coordinate.
pub const MAX_TESS_COORD: f64 = (1u64 << 52) as f64;

/// Steradians to square degrees.
pub const SQUARE_DEGREES_PER_STERADIAN: f64 = (180.0 / std::f64::consts::PI) * (180.0 / std::f64::consts::PI);
