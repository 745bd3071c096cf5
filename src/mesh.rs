// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Port of libtess2 mesh.c/h
//
// Half-edge mesh (Guibas/Stolfi quad-edge restricted to one orientation).
// Pointers become u32 indices into Vec arenas:
//   - half-edges live in pairs, sym(e) = e ^ 1, and the even index is the one
//     threaded through the global edge list;
//   - verts[0], faces[0] and edges[0..2] are the list sentinels;
//   - INVALID stands for a null pointer.
// Deleted elements keep their slot; only the lists forget them.

use glam::DVec2;

use crate::geom::{edge_sign, vert_leq};
use crate::priorityq::INVALID_HANDLE;

pub const INVALID: u32 = u32::MAX;

pub type VertIdx = u32;
pub type FaceIdx = u32;
pub type EdgeIdx = u32;

pub const V_HEAD: VertIdx = 0;
pub const F_HEAD: FaceIdx = 0;
pub const E_HEAD: EdgeIdx = 0;

#[inline(always)]
pub fn sym(e: EdgeIdx) -> EdgeIdx {
    e ^ 1
}

#[derive(Clone, Debug)]
pub struct Vertex {
    pub next: VertIdx,
    pub prev: VertIdx,
    pub an_edge: EdgeIdx,
    /// Sweep coordinates (s, t).
    pub pos: DVec2,
    /// Caller handle carried through to the output, INVALID for vertices the
    /// mesh created itself.
    pub data: u32,
    pub pq_handle: i32,
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            next: INVALID,
            prev: INVALID,
            an_edge: INVALID,
            pos: DVec2::ZERO,
            data: INVALID,
            pq_handle: INVALID_HANDLE,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Face {
    pub next: FaceIdx,
    pub prev: FaceIdx,
    pub an_edge: EdgeIdx,
    /// Set by the sweep from the winding rule.
    pub inside: bool,
}

impl Default for Face {
    fn default() -> Self {
        Self {
            next: INVALID,
            prev: INVALID,
            an_edge: INVALID,
            inside: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct HalfEdge {
    /// Next pair in the global edge list. For odd (sym) halves this stores the
    /// previous pair's sym instead.
    pub next: EdgeIdx,
    /// Next edge counter-clockwise around the origin.
    pub onext: EdgeIdx,
    /// Next edge counter-clockwise around the left face.
    pub lnext: EdgeIdx,
    pub org: VertIdx,
    pub lface: FaceIdx,
    /// Region of the edge dictionary this edge bounds from below, if any.
    pub active_region: u32,
    /// Change in winding number when crossing from the right face to the left.
    pub winding: i32,
}

impl Default for HalfEdge {
    fn default() -> Self {
        Self {
            next: INVALID,
            onext: INVALID,
            lnext: INVALID,
            org: INVALID,
            lface: INVALID,
            active_region: INVALID,
            winding: 0,
        }
    }
}

pub struct Mesh {
    pub verts: Vec<Vertex>,
    pub faces: Vec<Face>,
    pub edges: Vec<HalfEdge>,
}

impl Mesh {
    pub fn new() -> Self {
        let v_head = Vertex {
            next: V_HEAD,
            prev: V_HEAD,
            ..Vertex::default()
        };
        let f_head = Face {
            next: F_HEAD,
            prev: F_HEAD,
            ..Face::default()
        };
        let e_head = HalfEdge {
            next: E_HEAD,
            ..HalfEdge::default()
        };
        let e_head_sym = HalfEdge {
            next: sym(E_HEAD),
            ..HalfEdge::default()
        };
        Mesh {
            verts: vec![v_head],
            faces: vec![f_head],
            edges: vec![e_head, e_head_sym],
        }
    }

    // ───────────────────────────── Navigation ─────────────────────────────

    #[inline]
    pub fn org(&self, e: EdgeIdx) -> VertIdx {
        self.edges[e as usize].org
    }

    #[inline]
    pub fn dst(&self, e: EdgeIdx) -> VertIdx {
        self.edges[sym(e) as usize].org
    }

    #[inline]
    pub fn onext(&self, e: EdgeIdx) -> EdgeIdx {
        self.edges[e as usize].onext
    }

    #[inline]
    pub fn lnext(&self, e: EdgeIdx) -> EdgeIdx {
        self.edges[e as usize].lnext
    }

    #[inline]
    pub fn lface(&self, e: EdgeIdx) -> FaceIdx {
        self.edges[e as usize].lface
    }

    #[inline]
    pub fn rface(&self, e: EdgeIdx) -> FaceIdx {
        self.edges[sym(e) as usize].lface
    }

    /// Sym->Lnext
    #[inline]
    pub fn oprev(&self, e: EdgeIdx) -> EdgeIdx {
        self.edges[sym(e) as usize].lnext
    }

    /// Onext->Sym
    #[inline]
    pub fn lprev(&self, e: EdgeIdx) -> EdgeIdx {
        sym(self.edges[e as usize].onext)
    }

    /// Sym->Onext
    #[inline]
    pub fn rprev(&self, e: EdgeIdx) -> EdgeIdx {
        self.edges[sym(e) as usize].onext
    }

    /// Rprev->Sym
    #[inline]
    pub fn dnext(&self, e: EdgeIdx) -> EdgeIdx {
        sym(self.rprev(e))
    }

    #[inline]
    pub fn pos(&self, v: VertIdx) -> DVec2 {
        self.verts[v as usize].pos
    }

    #[inline]
    pub fn org_pos(&self, e: EdgeIdx) -> DVec2 {
        self.pos(self.org(e))
    }

    #[inline]
    pub fn dst_pos(&self, e: EdgeIdx) -> DVec2 {
        self.pos(self.dst(e))
    }

    #[inline]
    pub fn edge_goes_left(&self, e: EdgeIdx) -> bool {
        vert_leq(self.dst_pos(e), self.org_pos(e))
    }

    #[inline]
    pub fn edge_goes_right(&self, e: EdgeIdx) -> bool {
        vert_leq(self.org_pos(e), self.dst_pos(e))
    }

    /// Iterator over live vertices (sentinel excluded).
    pub fn vertices(&self) -> impl Iterator<Item = VertIdx> + '_ {
        let mut v = self.verts[V_HEAD as usize].next;
        std::iter::from_fn(move || {
            if v == V_HEAD {
                return None;
            }
            let cur = v;
            v = self.verts[v as usize].next;
            Some(cur)
        })
    }

    /// Iterator over live faces (sentinel excluded).
    pub fn face_list(&self) -> impl Iterator<Item = FaceIdx> + '_ {
        let mut f = self.faces[F_HEAD as usize].next;
        std::iter::from_fn(move || {
            if f == F_HEAD {
                return None;
            }
            let cur = f;
            f = self.faces[f as usize].next;
            Some(cur)
        })
    }

    /// Half-edges around the left face of `start`, beginning with `start`.
    pub fn face_loop(&self, start: EdgeIdx) -> impl Iterator<Item = EdgeIdx> + '_ {
        let mut e = start;
        let mut done = false;
        std::iter::from_fn(move || {
            if done {
                return None;
            }
            let cur = e;
            e = self.lnext(e);
            done = e == start;
            Some(cur)
        })
    }

    // ───────────────────────── Allocation helpers ─────────────────────────

    /// New edge pair inserted before `e_next` in the global edge list.
    fn make_edge_pair(&mut self, e_next: EdgeIdx) -> EdgeIdx {
        let e_next = e_next & !1;
        let e_new = self.edges.len() as EdgeIdx;
        let e_sym = sym(e_new);
        let e_prev = self.edges[sym(e_next) as usize].next;

        self.edges.push(HalfEdge {
            next: e_next,
            onext: e_new,
            lnext: e_sym,
            ..HalfEdge::default()
        });
        self.edges.push(HalfEdge {
            next: e_prev,
            onext: e_sym,
            lnext: e_new,
            ..HalfEdge::default()
        });
        self.edges[sym(e_prev) as usize].next = e_new;
        self.edges[sym(e_next) as usize].next = e_sym;
        e_new
    }

    /// New vertex inserted before `v_next`, becoming the origin of the whole
    /// ring around `e_orig`.
    fn make_vertex(&mut self, e_orig: EdgeIdx, v_next: VertIdx) -> VertIdx {
        let v_new = self.verts.len() as VertIdx;
        let v_prev = self.verts[v_next as usize].prev;
        self.verts.push(Vertex {
            next: v_next,
            prev: v_prev,
            an_edge: e_orig,
            ..Vertex::default()
        });
        self.verts[v_prev as usize].next = v_new;
        self.verts[v_next as usize].prev = v_new;

        let mut e = e_orig;
        loop {
            self.edges[e as usize].org = v_new;
            e = self.onext(e);
            if e == e_orig {
                break;
            }
        }
        v_new
    }

    /// New face inserted before `f_next`, becoming the left face of the loop
    /// around `e_orig`. Inherits `inside` from `f_next`.
    fn make_face(&mut self, e_orig: EdgeIdx, f_next: FaceIdx) -> FaceIdx {
        let f_new = self.faces.len() as FaceIdx;
        let f_prev = self.faces[f_next as usize].prev;
        let inside = self.faces[f_next as usize].inside;
        self.faces.push(Face {
            next: f_next,
            prev: f_prev,
            an_edge: e_orig,
            inside,
        });
        self.faces[f_prev as usize].next = f_new;
        self.faces[f_next as usize].prev = f_new;

        let mut e = e_orig;
        loop {
            self.edges[e as usize].lface = f_new;
            e = self.lnext(e);
            if e == e_orig {
                break;
            }
        }
        f_new
    }

    fn kill_vertex(&mut self, v_del: VertIdx, new_org: VertIdx) {
        let e_start = self.verts[v_del as usize].an_edge;
        let mut e = e_start;
        loop {
            self.edges[e as usize].org = new_org;
            e = self.onext(e);
            if e == e_start {
                break;
            }
        }
        let Vertex { next, prev, .. } = self.verts[v_del as usize];
        self.verts[next as usize].prev = prev;
        self.verts[prev as usize].next = next;
        let dead = &mut self.verts[v_del as usize];
        dead.next = INVALID;
        dead.prev = INVALID;
        dead.an_edge = INVALID;
    }

    fn kill_face(&mut self, f_del: FaceIdx, new_lface: FaceIdx) {
        let e_start = self.faces[f_del as usize].an_edge;
        let mut e = e_start;
        loop {
            self.edges[e as usize].lface = new_lface;
            e = self.lnext(e);
            if e == e_start {
                break;
            }
        }
        let Face { next, prev, .. } = self.faces[f_del as usize];
        self.faces[next as usize].prev = prev;
        self.faces[prev as usize].next = next;
        let dead = &mut self.faces[f_del as usize];
        dead.next = INVALID;
        dead.prev = INVALID;
        dead.an_edge = INVALID;
    }

    fn kill_edge(&mut self, e_del: EdgeIdx) {
        let e_del = e_del & !1;
        let e_next = self.edges[e_del as usize].next;
        let e_prev = self.edges[sym(e_del) as usize].next;
        self.edges[sym(e_next) as usize].next = e_prev;
        self.edges[sym(e_prev) as usize].next = e_next;
        self.edges[e_del as usize].next = INVALID;
        self.edges[sym(e_del) as usize].next = INVALID;
    }

    /// Exchanges a->Onext and b->Onext, fixing the Lnext links.
    fn raw_splice(&mut self, a: EdgeIdx, b: EdgeIdx) {
        let a_onext = self.onext(a);
        let b_onext = self.onext(b);
        self.edges[sym(a_onext) as usize].lnext = b;
        self.edges[sym(b_onext) as usize].lnext = a;
        self.edges[a as usize].onext = b_onext;
        self.edges[b as usize].onext = a_onext;
    }

    // ─────────────────────────── Mesh operations ───────────────────────────

    /// One edge, two vertices and a single loop face.
    pub fn make_edge(&mut self) -> EdgeIdx {
        let e = self.make_edge_pair(E_HEAD);
        self.make_vertex(e, V_HEAD);
        self.make_vertex(sym(e), V_HEAD);
        self.make_face(e, F_HEAD);
        e
    }

    /// The basic connectivity operation: exchanges e_org->Onext and
    /// e_dst->Onext. Joins or splits the origin vertices and the left faces as
    /// needed. When two vertices are joined, `e_org`'s origin survives.
    pub fn splice(&mut self, e_org: EdgeIdx, e_dst: EdgeIdx) {
        if e_org == e_dst {
            return;
        }
        let org_org = self.org(e_org);
        let dst_org = self.org(e_dst);
        let org_lface = self.lface(e_org);
        let dst_lface = self.lface(e_dst);

        let joining_vertices = dst_org != org_org;
        if joining_vertices {
            self.kill_vertex(dst_org, org_org);
        }
        let joining_loops = dst_lface != org_lface;
        if joining_loops {
            self.kill_face(dst_lface, org_lface);
        }

        self.raw_splice(e_dst, e_org);

        if !joining_vertices {
            // The ring was split in two: give e_dst's half a vertex of its own.
            let v_new = self.make_vertex(e_dst, org_org);
            self.verts[v_new as usize].pos = self.verts[org_org as usize].pos;
            self.verts[org_org as usize].an_edge = e_org;
        }
        if !joining_loops {
            self.make_face(e_dst, org_lface);
            self.faces[org_lface as usize].an_edge = e_org;
        }
    }

    /// Removes the edge `e_del`, joining its two faces or splitting a face in
    /// two. Vertices left without edges are deleted.
    pub fn delete_edge(&mut self, e_del: EdgeIdx) {
        let e_del_sym = sym(e_del);

        let joining_loops = self.lface(e_del) != self.rface(e_del);
        if joining_loops {
            let (l, r) = (self.lface(e_del), self.rface(e_del));
            self.kill_face(l, r);
        }

        if self.onext(e_del) == e_del {
            let org = self.org(e_del);
            self.kill_vertex(org, INVALID);
        } else {
            let rface = self.rface(e_del);
            self.faces[rface as usize].an_edge = self.oprev(e_del);
            let org = self.org(e_del);
            self.verts[org as usize].an_edge = self.onext(e_del);
            let oprev = self.oprev(e_del);
            self.raw_splice(e_del, oprev);
            if !joining_loops {
                let lface = self.lface(e_del);
                self.make_face(e_del, lface);
            }
        }

        if self.onext(e_del_sym) == e_del_sym {
            let org = self.org(e_del_sym);
            self.kill_vertex(org, INVALID);
            let lface = self.lface(e_del_sym);
            self.kill_face(lface, INVALID);
        } else {
            let lface = self.lface(e_del);
            self.faces[lface as usize].an_edge = self.oprev(e_del_sym);
            let org = self.org(e_del_sym);
            self.verts[org as usize].an_edge = self.onext(e_del_sym);
            let oprev = self.oprev(e_del_sym);
            self.raw_splice(e_del_sym, oprev);
        }

        self.kill_edge(e_del);
    }

    /// New edge e_new = e_org->Lnext whose destination is a new vertex.
    pub fn add_edge_vertex(&mut self, e_org: EdgeIdx) -> EdgeIdx {
        let e_new = self.make_edge_pair(e_org);
        let e_new_sym = sym(e_new);

        let lnext = self.lnext(e_org);
        self.raw_splice(e_new, lnext);

        let dst = self.dst(e_org);
        self.edges[e_new as usize].org = dst;
        self.make_vertex(e_new_sym, dst);

        let lface = self.lface(e_org);
        self.edges[e_new as usize].lface = lface;
        self.edges[e_new_sym as usize].lface = lface;
        e_new
    }

    /// Splits e_org into e_org and e_new = e_org->Lnext, joined at a new
    /// vertex (position and data left for the caller to set).
    pub fn split_edge(&mut self, e_org: EdgeIdx) -> EdgeIdx {
        let e_new = sym(self.add_edge_vertex(e_org));
        let e_org_sym = sym(e_org);

        let oprev = self.oprev(e_org_sym);
        self.raw_splice(e_org_sym, oprev);
        self.raw_splice(e_org_sym, e_new);

        let new_org = self.org(e_new);
        self.edges[e_org_sym as usize].org = new_org;
        let new_dst = self.dst(e_new);
        self.verts[new_dst as usize].an_edge = sym(e_new);
        let rface = self.rface(e_org);
        self.edges[sym(e_new) as usize].lface = rface;
        self.edges[e_new as usize].winding = self.edges[e_org as usize].winding;
        self.edges[sym(e_new) as usize].winding = self.edges[e_org_sym as usize].winding;
        e_new
    }

    /// New edge from e_org->Dst to e_dst->Org, returned. If the two edges
    /// share a left face the face is split in two.
    pub fn connect(&mut self, e_org: EdgeIdx, e_dst: EdgeIdx) -> EdgeIdx {
        let e_new = self.make_edge_pair(e_org);
        let e_new_sym = sym(e_new);

        let org_lface = self.lface(e_org);
        let dst_lface = self.lface(e_dst);
        let joining_loops = dst_lface != org_lface;
        if joining_loops {
            self.kill_face(dst_lface, org_lface);
        }

        let lnext = self.lnext(e_org);
        self.raw_splice(e_new, lnext);
        self.raw_splice(e_new_sym, e_dst);

        self.edges[e_new as usize].org = self.dst(e_org);
        self.edges[e_new_sym as usize].org = self.org(e_dst);
        self.edges[e_new as usize].lface = org_lface;
        self.edges[e_new_sym as usize].lface = org_lface;
        self.faces[org_lface as usize].an_edge = e_new_sym;

        if !joining_loops {
            self.make_face(e_new, org_lface);
        }
        e_new
    }

    /// Number of edges around a face.
    pub fn face_size(&self, f: FaceIdx) -> usize {
        self.face_loop(self.faces[f as usize].an_edge).count()
    }

    // ───────────────────────── Monotone triangulation ─────────────────────────

    /// Triangulates a face that is monotone in s. The face must be
    /// counter-clockwise with at least three edges.
    pub fn tessellate_mono_region(&mut self, face: FaceIdx) {
        let mut up = self.faces[face as usize].an_edge;
        debug_assert!(self.lnext(up) != up && self.lnext(self.lnext(up)) != up);

        // Find the half-edge whose origin is the leftmost vertex and whose
        // destination goes right: the lower chain ends there.
        while vert_leq(self.dst_pos(up), self.org_pos(up)) {
            up = self.lprev(up);
        }
        while vert_leq(self.org_pos(up), self.dst_pos(up)) {
            up = self.lnext(up);
        }
        let mut lo = self.lprev(up);

        while self.lnext(up) != lo {
            if vert_leq(self.dst_pos(up), self.org_pos(lo)) {
                // up->Dst is on the left: fan triangles out of lo->Org.
                while self.lnext(lo) != up {
                    let next = self.lnext(lo);
                    let convex = self.edge_goes_left(next)
                        || edge_sign(self.org_pos(lo), self.dst_pos(lo), self.dst_pos(next)) <= 0.0;
                    if !convex {
                        break;
                    }
                    lo = sym(self.connect(next, lo));
                }
                lo = self.lprev(lo);
            } else {
                // lo->Org is on the left: fan triangles out of up->Dst.
                while self.lnext(lo) != up {
                    let prev = self.lprev(up);
                    let convex = self.edge_goes_right(prev)
                        || edge_sign(self.dst_pos(up), self.org_pos(up), self.org_pos(prev)) >= 0.0;
                    if !convex {
                        break;
                    }
                    up = sym(self.connect(up, prev));
                }
                up = self.lnext(up);
            }
        }

        // The remaining region is a fan around the leftmost vertex.
        debug_assert!(self.lnext(lo) != up);
        while self.lnext(self.lnext(lo)) != up {
            let next = self.lnext(lo);
            lo = sym(self.connect(next, lo));
        }
    }

    /// Triangulates every face marked inside. Faces created while doing so are
    /// inserted before the current one and are never revisited.
    pub fn tessellate_interior(&mut self) {
        let mut f = self.faces[F_HEAD as usize].next;
        while f != F_HEAD {
            let next = self.faces[f as usize].next;
            if self.faces[f as usize].inside {
                self.tessellate_mono_region(f);
            }
            f = next;
        }
    }

    /// Walks every live element and checks the pointer invariants. Returns a
    /// description of the first inconsistency found.
    pub fn check(&self) -> Result<(), String> {
        for f in self.face_list() {
            let start = self.faces[f as usize].an_edge;
            for e in self.face_loop(start) {
                if sym(sym(e)) != e {
                    return Err(format!("edge {} has a broken sym", e));
                }
                if self.onext(self.lnext(e)) != sym(e) || self.lnext(sym(self.onext(e))) != e {
                    return Err(format!("edge {} has inconsistent lnext/onext", e));
                }
                if self.lface(e) != f {
                    return Err(format!("edge {} is not attached to face {}", e, f));
                }
            }
        }
        for v in self.vertices() {
            let start = self.verts[v as usize].an_edge;
            let mut e = start;
            loop {
                if self.org(e) != v {
                    return Err(format!("edge {} is not attached to vertex {}", e, v));
                }
                e = self.onext(e);
                if e == start {
                    break;
                }
            }
        }
        let mut e = self.edges[E_HEAD as usize].next;
        while e != E_HEAD {
            if self.org(e) == INVALID || self.dst(e) == INVALID {
                return Err(format!("edge {} lost an endpoint", e));
            }
            if self.lnext(sym(self.onext(e))) != e {
                return Err(format!("edge {} has a broken ring", e));
            }
            e = self.edges[e as usize].next;
        }
        Ok(())
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}
