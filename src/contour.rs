// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Contours whose vertices remember whether the segment leaving them is part of
// the original boundary.

use std::ops::{Index, IndexMut};

use glam::DVec3;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EdgeVertex {
    pub vertex: DVec3,
    /// Set when the segment from this vertex to the next one in its contour
    /// belongs to the input boundary.
    pub edge_flag: bool,
}

impl EdgeVertex {
    #[inline]
    pub fn new(vertex: DVec3, edge_flag: bool) -> Self {
        EdgeVertex { vertex, edge_flag }
    }
}

/// An implicitly closed loop of edge-tagged vertices.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubContour {
    vertices: Vec<EdgeVertex>,
}

impl SubContour {
    pub fn new() -> Self {
        SubContour { vertices: Vec::new() }
    }

    pub fn with_capacity(n: usize) -> Self {
        SubContour { vertices: Vec::with_capacity(n) }
    }

    /// Flags every segment as boundary. An open contour leaves its closing
    /// segment (last -> first) unflagged.
    pub fn from_vertices(vertices: &[DVec3], closed: bool) -> Self {
        let mut vs: Vec<EdgeVertex> = vertices.iter().map(|&v| EdgeVertex::new(v, true)).collect();
        if !closed {
            if let Some(last) = vs.last_mut() {
                last.edge_flag = false;
            }
        }
        SubContour { vertices: vs }
    }

    /// Same loop traversed backwards; flags move with their segments.
    pub fn reversed(&self) -> Self {
        let n = self.vertices.len();
        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            let vertex = self.vertices[n - 1 - i].vertex;
            let edge_flag = if i + 1 < n {
                self.vertices[n - 2 - i].edge_flag
            } else {
                self.vertices[n - 1].edge_flag
            };
            out.push(EdgeVertex { vertex, edge_flag });
        }
        SubContour { vertices: out }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn push(&mut self, v: EdgeVertex) {
        self.vertices.push(v);
    }

    pub fn extend_from(&mut self, other: &SubContour) {
        self.vertices.extend_from_slice(&other.vertices);
    }

    pub fn first(&self) -> Option<&EdgeVertex> {
        self.vertices.first()
    }

    pub fn last(&self) -> Option<&EdgeVertex> {
        self.vertices.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EdgeVertex> {
        self.vertices.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, EdgeVertex> {
        self.vertices.iter_mut()
    }

    pub fn vertices(&self) -> &[EdgeVertex] {
        &self.vertices
    }
}

impl From<Vec<EdgeVertex>> for SubContour {
    fn from(vertices: Vec<EdgeVertex>) -> Self {
        SubContour { vertices }
    }
}

impl Index<usize> for SubContour {
    type Output = EdgeVertex;
    fn index(&self, i: usize) -> &EdgeVertex {
        &self.vertices[i]
    }
}

impl IndexMut<usize> for SubContour {
    fn index_mut(&mut self, i: usize) -> &mut EdgeVertex {
        &mut self.vertices[i]
    }
}

impl<'a> IntoIterator for &'a SubContour {
    type Item = &'a EdgeVertex;
    type IntoIter = std::slice::Iter<'a, EdgeVertex>;
    fn into_iter(self) -> Self::IntoIter {
        self.vertices.iter()
    }
}
