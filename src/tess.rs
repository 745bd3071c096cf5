// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Port of libtess2 tess.c/h + tesselator.h
//
// Public tessellator session: contours go in with caller vertex handles,
// triangles come out referring to the same handles. Vertices the sweep has to
// create (edge intersections) are requested from a VertexCombiner, which
// replaces libtess2's combine callback and its user-data pointer.

use glam::DVec2;
use thiserror::Error;

use crate::constants::MAX_TESS_COORD;
use crate::mesh::{sym, EdgeIdx, Mesh, INVALID};
use crate::sweep::Sweep;

mod output;

// ─────────────────────────────── Public types ──────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WindingRule {
    Odd,
    NonZero,
    Positive,
    Negative,
    AbsGeqTwo,
}

impl WindingRule {
    /// Whether a region with winding number `n` is filled.
    pub fn is_inside(self, n: i32) -> bool {
        match self {
            WindingRule::Odd => n & 1 != 0,
            WindingRule::NonZero => n != 0,
            WindingRule::Positive => n > 0,
            WindingRule::Negative => n < 0,
            WindingRule::AbsGeqTwo => n >= 2 || n <= -2,
        }
    }
}

/// Which way the plane is viewed. The sweep works in (s, t) coordinates and
/// emits triangles counter-clockwise there; `Clockwise` mirrors t so that
/// contours running clockwise in (x, y) wind positively.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Orientation {
    CounterClockwise,
    Clockwise,
}

impl Orientation {
    #[inline]
    pub fn to_sweep(self, p: DVec2) -> DVec2 {
        match self {
            Orientation::CounterClockwise => p,
            Orientation::Clockwise => DVec2::new(p.x, -p.y),
        }
    }

    /// Inverse of `to_sweep` (the mapping is an involution).
    #[inline]
    pub fn to_plane(self, p: DVec2) -> DVec2 {
        self.to_sweep(p)
    }
}

/// Caller handle attached to every contour vertex. `u32::MAX` is reserved.
pub type VertexId = u32;

/// Supplies handles for the vertices the sweep creates.
pub trait VertexCombiner {
    /// A new vertex at `position` (caller plane coordinates) where two edges
    /// cross. `sources` lists the four edge endpoints with their interpolation
    /// weights, which sum to one.
    fn combine(&mut self, position: DVec2, sources: &[(VertexId, f64)]) -> VertexId;

    /// Two input vertices at the same position were unified; `kept` survives.
    fn merge(&mut self, _kept: VertexId, _absorbed: VertexId) {}
}

impl<F> VertexCombiner for F
where
    F: FnMut(DVec2, &[(VertexId, f64)]) -> VertexId,
{
    fn combine(&mut self, position: DVec2, sources: &[(VertexId, f64)]) -> VertexId {
        self(position, sources)
    }
}

/// One output triangle, counter-clockwise in sweep coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Triangle {
    pub vertices: [VertexId; 3],
    /// `boundary[i]` is set when the edge from corner i to corner i+1
    /// separates the filled region from an unfilled one.
    pub boundary: [bool; 3],
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TessError {
    #[error("contour vertex {index} has an invalid coordinate ({x}, {y})")]
    InvalidCoordinate { index: usize, x: f64, y: f64 },
    #[error("sweep lost track of its active regions")]
    InconsistentSweep,
}

// ─────────────────────────── Tessellator ──────────────────────────────────────

pub struct Tessellator {
    mesh: Mesh,
    orientation: Orientation,
    bmin: DVec2,
    bmax: DVec2,
    vertex_count: usize,
    error: Option<TessError>,
}

impl Tessellator {
    pub fn new(orientation: Orientation) -> Self {
        Tessellator {
            mesh: Mesh::new(),
            orientation,
            bmin: DVec2::splat(f64::INFINITY),
            bmax: DVec2::splat(f64::NEG_INFINITY),
            vertex_count: 0,
            error: None,
        }
    }

    /// Adds a closed contour. Each edge winds +1 in the traversal direction.
    /// An invalid coordinate is remembered and reported by `tessellate`.
    pub fn add_contour<I>(&mut self, points: I)
    where
        I: IntoIterator<Item = (DVec2, VertexId)>,
    {
        if self.error.is_some() {
            return;
        }
        let mut e: EdgeIdx = INVALID;
        for (p, id) in points {
            let index = self.vertex_count;
            self.vertex_count += 1;
            if !is_valid_coord(p.x) || !is_valid_coord(p.y) {
                self.error = Some(TessError::InvalidCoordinate { index, x: p.x, y: p.y });
                return;
            }

            if e == INVALID {
                // A single self-loop edge.
                e = self.mesh.make_edge();
                self.mesh.splice(e, sym(e));
            } else {
                // Insert a vertex after e->Org, so e->Lnext is the new edge.
                self.mesh.split_edge(e);
                e = self.mesh.lnext(e);
            }

            let s = self.orientation.to_sweep(p);
            let org = self.mesh.org(e);
            self.mesh.verts[org as usize].pos = s;
            self.mesh.verts[org as usize].data = id;
            self.bmin = self.bmin.min(s);
            self.bmax = self.bmax.max(s);

            self.mesh.edges[e as usize].winding = 1;
            self.mesh.edges[sym(e) as usize].winding = -1;
        }
    }

    /// Runs the sweep and triangulates every region filled under `rule`.
    pub fn tessellate<C>(self, rule: WindingRule, combiner: &mut C) -> Result<Vec<Triangle>, TessError>
    where
        C: VertexCombiner,
    {
        if let Some(err) = self.error {
            return Err(err);
        }
        if self.vertex_count == 0 {
            return Ok(Vec::new());
        }

        let sweep = Sweep::new(self.mesh, rule, self.orientation, combiner);
        let mut mesh = sweep.compute_interior(self.bmin, self.bmax)?;
        mesh.tessellate_interior();
        Ok(output::collect_triangles(&mesh))
    }
}

fn is_valid_coord(c: f64) -> bool {
    c.is_finite() && c.abs() <= MAX_TESS_COORD
}
