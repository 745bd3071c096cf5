// spherical-polygon: boolean operations on spherical polygons, tessellated
// per octahedron face with a pure Rust port of the libtess2 sweep.
// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)

pub mod bucketalloc;
pub mod constants;
pub mod contour;
pub mod dict;
pub mod geom;
pub mod mesh;
pub mod octahedron;
pub mod priorityq;
pub mod sphere;
pub mod sweep;
pub mod tess;
pub mod validation;

pub use contour::{EdgeVertex, SubContour};
pub use octahedron::{OctahedronPolygon, SerializeError};
pub use sphere::SphericalCap;
pub use tess::{Orientation, TessError, Tessellator, Triangle, VertexCombiner, VertexId, WindingRule};
