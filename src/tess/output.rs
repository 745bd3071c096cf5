// Copyright 2025 Lars Brubaker
// Triangle extraction from the classified mesh.

use super::Triangle;
use crate::mesh::{EdgeIdx, Mesh, INVALID};

fn is_boundary(mesh: &Mesh, e: EdgeIdx) -> bool {
    let rf = mesh.rface(e);
    rf == INVALID || !mesh.faces[rf as usize].inside
}

/// Emits every inside face as triangles. After `tessellate_interior` each
/// inside face is a triangle; anything larger is fanned out from its first
/// corner with the fan diagonals marked interior.
pub(crate) fn collect_triangles(mesh: &Mesh) -> Vec<Triangle> {
    let mut out = Vec::new();
    for f in mesh.face_list() {
        if !mesh.faces[f as usize].inside {
            continue;
        }
        let edges: Vec<EdgeIdx> = mesh.face_loop(mesh.faces[f as usize].an_edge).collect();
        debug_assert_eq!(edges.len(), 3, "face {} is not a triangle", f);
        if edges.len() < 3 {
            continue;
        }
        let data = |e: EdgeIdx| mesh.verts[mesh.org(e) as usize].data;

        let last = edges.len() - 1;
        for i in 1..last {
            out.push(Triangle {
                vertices: [data(edges[0]), data(edges[i]), data(edges[i + 1])],
                boundary: [
                    i == 1 && is_boundary(mesh, edges[0]),
                    is_boundary(mesh, edges[i]),
                    i + 1 == last && is_boundary(mesh, edges[last]),
                ],
            });
        }
    }
    out
}
