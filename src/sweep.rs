// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Port of libtess2 sweep.c/h
//
// Bentley-Ottmann style sweep over the planar mesh. Vertices are processed in
// `vert_leq` order; the edge dictionary holds the edges crossing the sweep
// line, and every pair of adjacent edges bounds an ActiveRegion carrying the
// winding number of the area between them. When the sweep finishes, every face
// of the mesh is monotone and flagged inside or outside by the winding rule.
// Driven by `Tessellator::tessellate` in tess.rs.

use glam::DVec2;

use crate::bucketalloc::BucketAlloc;
use crate::constants::SWEEP_COLUMN_TOLERANCE;
use crate::dict::{Dict, NodeIdx, DICT_HEAD};
use crate::geom::{edge_eval, edge_intersect, edge_sign, vert_eq, vert_l1_dist, vert_leq};
use crate::mesh::{sym, EdgeIdx, Mesh, VertIdx, E_HEAD, F_HEAD, INVALID};
use crate::priorityq::PriorityQ;
use crate::tess::{Orientation, TessError, VertexCombiner, VertexId, WindingRule};

pub type RegionIdx = u32;

pub const INVALID_REGION: RegionIdx = INVALID;

/// An active region: the area between two adjacent edges crossing the sweep line.
#[derive(Clone, Debug)]
pub struct ActiveRegion {
    /// Upper edge (directed right to left).
    pub e_up: EdgeIdx,
    /// Node in the edge dictionary for this region.
    pub node_up: NodeIdx,
    /// Running winding number for the region.
    pub winding_number: i32,
    /// Is this region inside the polygon?
    pub inside: bool,
    /// Sentinel: marks fake edges beyond the bounding box.
    pub sentinel: bool,
    /// Dirty: upper or lower edge changed, need to check for intersection.
    pub dirty: bool,
    /// Temporary edge introduced for a right vertex (will be fixed later).
    pub fix_upper_edge: bool,
}

impl ActiveRegion {
    fn new(e_up: EdgeIdx) -> Self {
        ActiveRegion {
            e_up,
            node_up: INVALID,
            winding_number: 0,
            inside: false,
            sentinel: false,
            dirty: false,
            fix_upper_edge: false,
        }
    }
}

/// Ordering of dictionary edges at the current event: true if `e1` lies at or
/// below `e2` on the sweep line. Both edges are directed right to left.
fn edge_leq(mesh: &Mesh, event: VertIdx, e1: EdgeIdx, e2: EdgeIdx) -> bool {
    let ev = mesh.pos(event);
    let (d1, d2) = (mesh.dst(e1), mesh.dst(e2));
    let (o1, o2) = (mesh.org_pos(e1), mesh.org_pos(e2));

    if d1 == event {
        if d2 == event {
            // Two edges right of the sweep line meeting at the event: sort by slope.
            if vert_leq(o1, o2) {
                return edge_sign(mesh.pos(d2), o1, o2) <= 0.0;
            }
            return edge_sign(mesh.pos(d1), o2, o1) >= 0.0;
        }
        return edge_sign(mesh.pos(d2), ev, o2) <= 0.0;
    }
    if d2 == event {
        return edge_sign(mesh.pos(d1), ev, o1) >= 0.0;
    }
    let t1 = edge_eval(mesh.pos(d1), ev, o1);
    let t2 = edge_eval(mesh.pos(d2), ev, o2);
    t1 >= t2
}

/// Interpolation weights of an intersection point along edge (org, dst).
fn vertex_weights(isect: DVec2, org: DVec2, dst: DVec2) -> (f64, f64) {
    let t1 = vert_l1_dist(org, isect);
    let t2 = vert_l1_dist(dst, isect);
    if t1 + t2 == 0.0 {
        return (0.25, 0.25);
    }
    (0.5 * t2 / (t1 + t2), 0.5 * t1 / (t1 + t2))
}

pub(crate) struct Sweep<'a> {
    mesh: Mesh,
    dict: Dict,
    pq: PriorityQ,
    regions: BucketAlloc<ActiveRegion>,
    event: VertIdx,
    rule: WindingRule,
    orientation: Orientation,
    combiner: &'a mut dyn VertexCombiner,
}

impl<'a> Sweep<'a> {
    pub(crate) fn new(
        mesh: Mesh,
        rule: WindingRule,
        orientation: Orientation,
        combiner: &'a mut dyn VertexCombiner,
    ) -> Self {
        Sweep {
            mesh,
            dict: Dict::new(),
            pq: PriorityQ::new(),
            regions: BucketAlloc::new(),
            event: INVALID,
            rule,
            orientation,
            combiner,
        }
    }

    /// Runs the sweep and returns the mesh with every face classified.
    /// `bmin`/`bmax` bound all input vertices in sweep coordinates.
    pub(crate) fn compute_interior(mut self, bmin: DVec2, bmax: DVec2) -> Result<Mesh, TessError> {
        self.snap_sweep_columns(bmin, bmax);
        self.remove_degenerate_edges();
        self.init_priority_queue();
        self.init_edge_dict(bmin, bmax);

        while let Some(v) = self.pq.extract_min() {
            // Merge all vertices at exactly the same location before handling
            // the event, so coincident edges from different contours are
            // processed together.
            while let Some(next) = self.pq.minimum() {
                if !vert_eq(self.mesh.pos(next), self.mesh.pos(v)) {
                    break;
                }
                self.pq.extract_min();
                let kept = self.mesh.verts[v as usize].an_edge;
                let absorbed = self.mesh.verts[next as usize].an_edge;
                self.splice_merge_vertices(kept, absorbed);
            }
            self.sweep_event(v)?;
        }

        self.done_edge_dict();
        self.remove_degenerate_faces();
        debug_assert!(self.mesh.check().is_ok(), "{:?}", self.mesh.check());
        Ok(self.mesh)
    }

    // ───────────────────────────── Setup ─────────────────────────────

    /// Gives vertices whose s coordinates differ only by rounding noise the
    /// same s. An edge spanning such a gap is nearly vertical, and a crossing
    /// on it can round to the left of the event that starts it, where the
    /// sweep would clamp it onto the event vertex. Exactly vertical edges
    /// are ordered by t and need no clamping.
    fn snap_sweep_columns(&mut self, bmin: DVec2, bmax: DVec2) {
        let tol = SWEEP_COLUMN_TOLERANCE * bmin.x.abs().max(bmax.x.abs());
        let mut verts: Vec<VertIdx> = self.mesh.vertices().collect();
        verts.sort_by(|&a, &b| self.mesh.pos(a).x.total_cmp(&self.mesh.pos(b).x));
        let mut column: Option<f64> = None;
        for v in verts {
            let pos = &mut self.mesh.verts[v as usize].pos;
            match column {
                Some(s) if pos.x - s <= tol => pos.x = s,
                _ => column = Some(pos.x),
            }
        }
    }

    /// Removes zero-length edges and contours with fewer than three edges.
    fn remove_degenerate_edges(&mut self) {
        let mut e = self.mesh.edges[E_HEAD as usize].next;
        while e != E_HEAD {
            let mut e_next = self.mesh.edges[e as usize].next;
            let mut e_lnext = self.mesh.lnext(e);

            if vert_eq(self.mesh.org_pos(e), self.mesh.dst_pos(e)) && self.mesh.lnext(e_lnext) != e {
                // Zero-length edge on a contour with at least three edges.
                self.splice_merge_vertices(e_lnext, e);
                self.mesh.delete_edge(e);
                e = e_lnext;
                e_lnext = self.mesh.lnext(e);
            }
            if self.mesh.lnext(e_lnext) == e {
                // Contour of one or two edges.
                if e_lnext != e {
                    if e_lnext == e_next || e_lnext == sym(e_next) {
                        e_next = self.mesh.edges[e_next as usize].next;
                    }
                    self.mesh.delete_edge(e_lnext);
                }
                if e == e_next || e == sym(e_next) {
                    e_next = self.mesh.edges[e_next as usize].next;
                }
                self.mesh.delete_edge(e);
            }
            e = e_next;
        }
    }

    fn init_priority_queue(&mut self) {
        let verts: Vec<VertIdx> = self.mesh.vertices().collect();
        self.pq = PriorityQ::with_capacity(verts.len());
        for v in verts {
            let pos = self.mesh.pos(v);
            self.mesh.verts[v as usize].pq_handle = self.pq.insert(pos, v);
        }
        self.pq.init();
    }

    fn init_edge_dict(&mut self, bmin: DVec2, bmax: DVec2) {
        let w = (bmax.x - bmin.x) + 0.01;
        let h = (bmax.y - bmin.y) + 0.01;
        let smin = bmin.x - w;
        let smax = bmax.x + w;
        self.add_sentinel(smin, smax, bmin.y - h);
        self.add_sentinel(smin, smax, bmax.y + h);
    }

    /// Horizontal edge at height `t` from (smax, t) to (smin, t).
    fn add_sentinel(&mut self, smin: f64, smax: f64, t: f64) {
        let e = self.mesh.make_edge();
        let org = self.mesh.org(e);
        let dst = self.mesh.dst(e);
        self.mesh.verts[org as usize].pos = DVec2::new(smax, t);
        self.mesh.verts[dst as usize].pos = DVec2::new(smin, t);
        self.event = dst;

        let reg = self.regions.alloc(ActiveRegion {
            sentinel: true,
            ..ActiveRegion::new(e)
        });
        let node = self.dict_insert_before(DICT_HEAD, reg);
        self.regions[reg].node_up = node;
    }

    /// At the end only the sentinels and at most one fixable edge remain.
    fn done_edge_dict(&mut self) {
        let mut fixed_edges = 0;
        loop {
            let reg = self.dict.key(self.dict.min());
            if reg == INVALID_REGION {
                break;
            }
            if !self.regions[reg].sentinel {
                debug_assert!(self.regions[reg].fix_upper_edge);
                fixed_edges += 1;
                debug_assert!(fixed_edges == 1);
            }
            debug_assert_eq!(self.regions[reg].winding_number, 0);
            self.delete_region(reg);
        }
    }

    /// Deletes faces bounded by only two edges, folding their winding into
    /// the surviving neighbour.
    fn remove_degenerate_faces(&mut self) {
        let mut f = self.mesh.faces[F_HEAD as usize].next;
        while f != F_HEAD {
            let f_next = self.mesh.faces[f as usize].next;
            let e = self.mesh.faces[f as usize].an_edge;
            debug_assert!(self.mesh.lnext(e) != e);
            if self.mesh.lnext(self.mesh.lnext(e)) == e {
                let onext = self.mesh.onext(e);
                self.add_winding(onext, e);
                self.mesh.delete_edge(e);
            }
            f = f_next;
        }
    }

    // ─────────────────────────── Region bookkeeping ───────────────────────────

    fn dict_insert_before(&mut self, node: NodeIdx, reg: RegionIdx) -> NodeIdx {
        let mesh = &self.mesh;
        let regions = &self.regions;
        let event = self.event;
        self.dict.insert_before(node, reg, |a, b| {
            edge_leq(mesh, event, regions[a].e_up, regions[b].e_up)
        })
    }

    #[inline]
    fn region_above(&self, reg: RegionIdx) -> RegionIdx {
        self.dict.key(self.dict.succ(self.regions[reg].node_up))
    }

    #[inline]
    fn region_below(&self, reg: RegionIdx) -> RegionIdx {
        self.dict.key(self.dict.pred(self.regions[reg].node_up))
    }

    fn mark_dirty(&mut self, reg: RegionIdx) {
        if let Some(r) = self.regions.get_mut(reg) {
            r.dirty = true;
        }
    }

    fn add_winding(&mut self, e_dst: EdgeIdx, e_src: EdgeIdx) {
        let w = self.mesh.edges[e_src as usize].winding;
        let w_sym = self.mesh.edges[sym(e_src) as usize].winding;
        self.mesh.edges[e_dst as usize].winding += w;
        self.mesh.edges[sym(e_dst) as usize].winding += w_sym;
    }

    /// Two vertices with identical coordinates become one: `e1`'s origin is
    /// kept and `e2`'s origin is absorbed.
    fn splice_merge_vertices(&mut self, e1: EdgeIdx, e2: EdgeIdx) {
        let kept = self.mesh.org(e1);
        let absorbed = self.mesh.org(e2);
        if kept != absorbed {
            let kept_data = self.mesh.verts[kept as usize].data;
            let absorbed_data = self.mesh.verts[absorbed as usize].data;
            if kept_data == INVALID {
                self.mesh.verts[kept as usize].data = absorbed_data;
            } else if absorbed_data != INVALID {
                self.combiner.merge(kept_data, absorbed_data);
            }
        }
        self.mesh.splice(e1, e2);
    }

    fn add_region_below(&mut self, reg_above: RegionIdx, e_new_up: EdgeIdx) -> RegionIdx {
        let reg_new = self.regions.alloc(ActiveRegion::new(e_new_up));
        let node_above = self.regions[reg_above].node_up;
        let node = self.dict_insert_before(node_above, reg_new);
        self.regions[reg_new].node_up = node;
        self.mesh.edges[e_new_up as usize].active_region = reg_new;
        reg_new
    }

    fn delete_region(&mut self, reg: RegionIdx) {
        let e_up = self.regions[reg].e_up;
        if self.regions[reg].fix_upper_edge {
            // Fixable edges are created with zero winding.
            debug_assert_eq!(self.mesh.edges[e_up as usize].winding, 0);
        }
        self.mesh.edges[e_up as usize].active_region = INVALID_REGION;
        self.dict.delete(self.regions[reg].node_up);
        self.regions.free(reg);
    }

    /// Replaces a temporary upper edge by a real one.
    fn fix_upper_edge(&mut self, reg: RegionIdx, new_edge: EdgeIdx) {
        debug_assert!(self.regions[reg].fix_upper_edge);
        let old = self.regions[reg].e_up;
        self.mesh.delete_edge(old);
        let r = &mut self.regions[reg];
        r.fix_upper_edge = false;
        r.e_up = new_edge;
        self.mesh.edges[new_edge as usize].active_region = reg;
    }

    fn compute_winding(&mut self, reg: RegionIdx) {
        let above = self.region_above(reg);
        let e_up = self.regions[reg].e_up;
        let winding = self.regions[above].winding_number + self.mesh.edges[e_up as usize].winding;
        let inside = self.rule.is_inside(winding);
        let r = &mut self.regions[reg];
        r.winding_number = winding;
        r.inside = inside;
    }

    /// Deletes a region whose upper and lower edges both end at the event,
    /// labelling its face.
    fn finish_region(&mut self, reg: RegionIdx) {
        let e = self.regions[reg].e_up;
        let f = self.mesh.lface(e);
        self.mesh.faces[f as usize].inside = self.regions[reg].inside;
        self.mesh.faces[f as usize].an_edge = e;
        self.delete_region(reg);
    }

    /// Region above the uppermost edge sharing `reg`'s upper origin. A
    /// temporary edge found there is fixed on the way.
    fn top_left_region(&mut self, reg: RegionIdx) -> Result<RegionIdx, TessError> {
        let org = self.mesh.org(self.regions[reg].e_up);
        let mut reg = reg;
        loop {
            reg = self.region_above(reg);
            if reg == INVALID_REGION {
                return Err(TessError::InconsistentSweep);
            }
            if self.mesh.org(self.regions[reg].e_up) != org {
                break;
            }
        }
        if self.regions[reg].fix_upper_edge {
            let below = self.region_below(reg);
            let e_org = sym(self.regions[below].e_up);
            let e_dst = self.mesh.lnext(self.regions[reg].e_up);
            let e = self.mesh.connect(e_org, e_dst);
            self.fix_upper_edge(reg, e);
            reg = self.region_above(reg);
        }
        Ok(reg)
    }

    fn top_right_region(&self, reg: RegionIdx) -> Result<RegionIdx, TessError> {
        let dst = self.mesh.dst(self.regions[reg].e_up);
        let mut reg = reg;
        loop {
            reg = self.region_above(reg);
            if reg == INVALID_REGION {
                return Err(TessError::InconsistentSweep);
            }
            if self.mesh.dst(self.regions[reg].e_up) != dst {
                return Ok(reg);
            }
        }
    }

    /// Finishes the regions from `reg_first` down to `reg_last` (exclusive,
    /// INVALID_REGION for "until the origin changes"), relinking the mesh so
    /// the left-going edges match the dictionary order. Returns the lowest
    /// left-going edge.
    fn finish_left_regions(&mut self, reg_first: RegionIdx, reg_last: RegionIdx) -> EdgeIdx {
        let mut reg_prev = reg_first;
        let mut e_prev = self.regions[reg_first].e_up;

        while reg_prev != reg_last {
            self.regions[reg_prev].fix_upper_edge = false;
            let reg = self.region_below(reg_prev);
            if reg == INVALID_REGION {
                self.finish_region(reg_prev);
                break;
            }
            let mut e = self.regions[reg].e_up;
            if self.mesh.org(e) != self.mesh.org(e_prev) {
                if !self.regions[reg].fix_upper_edge {
                    // No more left-going edges in the dictionary, though the
                    // mesh may still have some, so the face must be labelled.
                    self.finish_region(reg_prev);
                    break;
                }
                // Temporary edge below: replace it now.
                let lprev = self.mesh.lprev(e_prev);
                e = self.mesh.connect(lprev, sym(e));
                self.fix_upper_edge(reg, e);
            }

            if self.mesh.onext(e_prev) != e {
                let oprev = self.mesh.oprev(e);
                self.mesh.splice(oprev, e);
                self.mesh.splice(e_prev, e);
            }
            self.finish_region(reg_prev);
            e_prev = self.regions[reg].e_up;
            reg_prev = reg;
        }
        e_prev
    }

    /// Inserts the right-going edges `e_first..e_last` (an onext range around
    /// the event) below `reg_up`, then walks every right-going edge from the
    /// event fixing windings and mesh order. `e_top_left` is the edge just
    /// above them, or INVALID when there are no left-going edges.
    fn add_right_edges(
        &mut self,
        reg_up: RegionIdx,
        e_first: EdgeIdx,
        e_last: EdgeIdx,
        e_top_left: EdgeIdx,
        clean_up: bool,
    ) -> Result<(), TessError> {
        let mut e = e_first;
        loop {
            debug_assert!(self.mesh.edge_goes_right(e));
            self.add_region_below(reg_up, sym(e));
            e = self.mesh.onext(e);
            if e == e_last {
                break;
            }
        }

        let e_top_left = if e_top_left == INVALID {
            let below = self.region_below(reg_up);
            self.mesh.rprev(self.regions[below].e_up)
        } else {
            e_top_left
        };

        let mut reg_prev = reg_up;
        let mut e_prev = e_top_left;
        let mut first_time = true;
        loop {
            let reg = self.region_below(reg_prev);
            if reg == INVALID_REGION {
                break;
            }
            let e = sym(self.regions[reg].e_up);
            if self.mesh.org(e) != self.mesh.org(e_prev) {
                break;
            }

            if self.mesh.onext(e) != e_prev {
                // Unlink e and relink it below e_prev.
                let oprev = self.mesh.oprev(e);
                self.mesh.splice(oprev, e);
                let prev_oprev = self.mesh.oprev(e_prev);
                self.mesh.splice(prev_oprev, e);
            }

            let winding = self.regions[reg_prev].winding_number - self.mesh.edges[e as usize].winding;
            let inside = self.rule.is_inside(winding);
            self.regions[reg].winding_number = winding;
            self.regions[reg].inside = inside;

            // Two outgoing edges with the same slope are merged before any
            // intersection test.
            self.regions[reg_prev].dirty = true;
            if !first_time && self.check_for_right_splice(reg_prev) {
                self.add_winding(e, e_prev);
                self.delete_region(reg_prev);
                self.mesh.delete_edge(e_prev);
            }
            first_time = false;
            reg_prev = reg;
            e_prev = e;
        }
        self.regions[reg_prev].dirty = true;

        if clean_up {
            self.walk_dirty_regions(reg_prev)?;
        }
        Ok(())
    }

    // ─────────────────────────── Ordering repairs ───────────────────────────

    /// Checks the upper and lower edges of `reg_up` at their origins (right
    /// endpoints) and splices one origin into the other edge if they are out
    /// of order. Returns true if the mesh changed.
    fn check_for_right_splice(&mut self, reg_up: RegionIdx) -> bool {
        let reg_lo = self.region_below(reg_up);
        let e_up = self.regions[reg_up].e_up;
        let e_lo = self.regions[reg_lo].e_up;
        let org_up = self.mesh.org_pos(e_up);
        let org_lo = self.mesh.org_pos(e_lo);

        if vert_leq(org_up, org_lo) {
            if edge_sign(self.mesh.dst_pos(e_lo), org_up, org_lo) > 0.0 {
                return false;
            }
            if !vert_eq(org_up, org_lo) {
                // e_up's origin lies below e_lo: splice it into e_lo.
                self.mesh.split_edge(sym(e_lo));
                let oprev = self.mesh.oprev(e_lo);
                self.mesh.splice(e_up, oprev);
                self.regions[reg_up].dirty = true;
                self.regions[reg_lo].dirty = true;
            } else if self.mesh.org(e_up) != self.mesh.org(e_lo) {
                let handle = self.mesh.verts[self.mesh.org(e_up) as usize].pq_handle;
                self.pq.delete(handle);
                let oprev = self.mesh.oprev(e_lo);
                self.splice_merge_vertices(oprev, e_up);
            }
        } else {
            if edge_sign(self.mesh.dst_pos(e_up), org_lo, org_up) < 0.0 {
                return false;
            }
            // e_lo's origin lies above e_up: splice it into e_up.
            let above = self.region_above(reg_up);
            self.mark_dirty(above);
            self.regions[reg_up].dirty = true;
            self.mesh.split_edge(sym(e_up));
            let oprev = self.mesh.oprev(e_lo);
            self.mesh.splice(oprev, e_up);
        }
        true
    }

    /// Same as `check_for_right_splice` at the destinations (left endpoints).
    fn check_for_left_splice(&mut self, reg_up: RegionIdx) -> bool {
        let reg_lo = self.region_below(reg_up);
        let e_up = self.regions[reg_up].e_up;
        let e_lo = self.regions[reg_lo].e_up;
        let dst_up = self.mesh.dst_pos(e_up);
        let dst_lo = self.mesh.dst_pos(e_lo);
        debug_assert!(!vert_eq(dst_up, dst_lo));

        if vert_leq(dst_up, dst_lo) {
            if edge_sign(dst_up, dst_lo, self.mesh.org_pos(e_up)) < 0.0 {
                return false;
            }
            // e_lo's destination is above e_up: splice it into e_up.
            let above = self.region_above(reg_up);
            self.mark_dirty(above);
            self.regions[reg_up].dirty = true;
            let e = self.mesh.split_edge(e_up);
            self.mesh.splice(sym(e_lo), e);
            let f = self.mesh.lface(e);
            self.mesh.faces[f as usize].inside = self.regions[reg_up].inside;
        } else {
            if edge_sign(dst_lo, dst_up, self.mesh.org_pos(e_lo)) > 0.0 {
                return false;
            }
            // e_up's destination is below e_lo: splice it into e_lo.
            self.regions[reg_up].dirty = true;
            self.regions[reg_lo].dirty = true;
            let e = self.mesh.split_edge(e_lo);
            let lnext = self.mesh.lnext(e_up);
            self.mesh.splice(lnext, sym(e_lo));
            let f = self.mesh.rface(e);
            self.mesh.faces[f as usize].inside = self.regions[reg_up].inside;
        }
        true
    }

    /// Checks whether the upper and lower edges of `reg_up` cross, and if so
    /// splits both at the intersection, which becomes a new event. Returns
    /// true if `walk_dirty_regions` was called recursively.
    fn check_for_intersect(&mut self, reg_up: RegionIdx) -> Result<bool, TessError> {
        let mut reg_up = reg_up;
        let mut reg_lo = self.region_below(reg_up);
        let e_up = self.regions[reg_up].e_up;
        let e_lo = self.regions[reg_lo].e_up;
        let org_up = self.mesh.org(e_up);
        let org_lo = self.mesh.org(e_lo);
        let dst_up = self.mesh.dst(e_up);
        let dst_lo = self.mesh.dst(e_lo);
        let p_org_up = self.mesh.pos(org_up);
        let p_org_lo = self.mesh.pos(org_lo);
        let p_dst_up = self.mesh.pos(dst_up);
        let p_dst_lo = self.mesh.pos(dst_lo);
        let event = self.event;
        let ev = self.mesh.pos(event);

        debug_assert!(!vert_eq(p_dst_lo, p_dst_up));
        debug_assert!(!self.regions[reg_up].fix_upper_edge && !self.regions[reg_lo].fix_upper_edge);

        if org_up == org_lo {
            return Ok(false);
        }
        let t_min_up = p_org_up.y.min(p_dst_up.y);
        let t_max_lo = p_org_lo.y.max(p_dst_lo.y);
        if t_min_up > t_max_lo {
            return Ok(false);
        }
        if vert_leq(p_org_up, p_org_lo) {
            if edge_sign(p_dst_lo, p_org_up, p_org_lo) > 0.0 {
                return Ok(false);
            }
        } else if edge_sign(p_dst_up, p_org_lo, p_org_up) < 0.0 {
            return Ok(false);
        }

        // The edges intersect, at least marginally.
        let mut isect = edge_intersect(p_dst_up, p_org_up, p_dst_lo, p_org_lo);
        if vert_leq(isect, ev) {
            // Slightly left of the sweep line: pull it onto the event.
            isect = ev;
        }
        let org_min = if vert_leq(p_org_up, p_org_lo) { p_org_up } else { p_org_lo };
        if vert_leq(org_min, isect) {
            isect = org_min;
        }

        if vert_eq(isect, p_org_up) || vert_eq(isect, p_org_lo) {
            // Intersection at one of the right endpoints.
            self.check_for_right_splice(reg_up);
            return Ok(false);
        }

        if (!vert_eq(p_dst_up, ev) && edge_sign(p_dst_up, ev, isect) >= 0.0)
            || (!vert_eq(p_dst_lo, ev) && edge_sign(p_dst_lo, ev, isect) <= 0.0)
        {
            // Rounding put the new upper or lower edge on the wrong side of
            // the event, or through it.
            if dst_lo == event {
                // Splice dst_lo into e_up and process the new regions.
                self.mesh.split_edge(sym(e_up));
                self.mesh.splice(sym(e_lo), e_up);
                reg_up = self.top_left_region(reg_up)?;
                let below = self.region_below(reg_up);
                let e_up = self.regions[below].e_up;
                self.finish_left_regions(below, reg_lo);
                let oprev = self.mesh.oprev(e_up);
                self.add_right_edges(reg_up, oprev, e_up, e_up, true)?;
                return Ok(true);
            }
            if dst_up == event {
                // Splice dst_up into e_lo and process the new regions.
                self.mesh.split_edge(sym(e_lo));
                let lnext = self.mesh.lnext(e_up);
                let oprev = self.mesh.oprev(e_lo);
                self.mesh.splice(lnext, oprev);
                reg_lo = reg_up;
                reg_up = self.top_right_region(reg_up)?;
                let below = self.region_below(reg_up);
                let e = self.mesh.rprev(self.regions[below].e_up);
                self.regions[reg_lo].e_up = self.mesh.oprev(e_lo);
                let e_lo = self.finish_left_regions(reg_lo, INVALID_REGION);
                let first = self.mesh.onext(e_lo);
                let last = self.mesh.rprev(e_up);
                self.add_right_edges(reg_up, first, last, e, true)?;
                return Ok(true);
            }
            // Called from connect_right_vertex: split whichever edge passes on
            // the wrong side of the event and leave the splicing to it.
            if edge_sign(p_dst_up, ev, isect) >= 0.0 {
                let above = self.region_above(reg_up);
                self.mark_dirty(above);
                self.regions[reg_up].dirty = true;
                self.mesh.split_edge(sym(e_up));
                self.move_to_event(self.mesh.org(e_up));
            }
            if edge_sign(p_dst_lo, ev, isect) <= 0.0 {
                self.regions[reg_up].dirty = true;
                self.regions[reg_lo].dirty = true;
                self.mesh.split_edge(sym(e_lo));
                self.move_to_event(self.mesh.org(e_lo));
            }
            return Ok(false);
        }

        // General case: split both edges and splice them into a new vertex.
        // The processed faces (e_up's side) are expected to be the smaller
        // ones, hence the argument order.
        self.mesh.split_edge(sym(e_up));
        self.mesh.split_edge(sym(e_lo));
        let oprev = self.mesh.oprev(e_lo);
        self.mesh.splice(oprev, e_up);
        let v = self.mesh.org(e_up);
        self.mesh.verts[v as usize].pos = isect;
        self.mesh.verts[v as usize].pq_handle = self.pq.insert(isect, v);

        let (w0, w1) = vertex_weights(isect, p_org_up, p_dst_up);
        let (w2, w3) = vertex_weights(isect, p_org_lo, p_dst_lo);
        let sources: [(VertexId, f64); 4] = [
            (self.mesh.verts[org_up as usize].data, w0),
            (self.mesh.verts[dst_up as usize].data, w1),
            (self.mesh.verts[org_lo as usize].data, w2),
            (self.mesh.verts[dst_lo as usize].data, w3),
        ];
        let position = self.orientation.to_plane(isect);
        self.mesh.verts[v as usize].data = self.combiner.combine(position, &sources);

        let above = self.region_above(reg_up);
        self.mark_dirty(above);
        self.regions[reg_up].dirty = true;
        self.regions[reg_lo].dirty = true;
        Ok(false)
    }

    fn move_to_event(&mut self, v: VertIdx) {
        let event = self.event as usize;
        self.mesh.verts[v as usize].pos = self.mesh.verts[event].pos;
        self.mesh.verts[v as usize].data = self.mesh.verts[event].data;
    }

    /// Restores the dictionary invariants for every dirty region, walking
    /// from the bottom up. Checking a region may dirty its neighbours.
    fn walk_dirty_regions(&mut self, reg_up: RegionIdx) -> Result<(), TessError> {
        let mut reg_up = reg_up;
        let mut reg_lo = self.region_below(reg_up);

        loop {
            // Find the lowest dirty region.
            while reg_lo != INVALID_REGION && self.regions[reg_lo].dirty {
                reg_up = reg_lo;
                reg_lo = self.region_below(reg_lo);
            }
            if !self.regions[reg_up].dirty {
                reg_lo = reg_up;
                reg_up = self.region_above(reg_up);
                if reg_up == INVALID_REGION || !self.regions[reg_up].dirty {
                    return Ok(());
                }
            }
            self.regions[reg_up].dirty = false;
            let mut e_up = self.regions[reg_up].e_up;
            let mut e_lo = self.regions[reg_lo].e_up;

            if self.mesh.dst(e_up) != self.mesh.dst(e_lo) && self.check_for_left_splice(reg_up) {
                // Temporary edges are only needed by vertices with no other
                // right-going edge; drop one that just lost that role.
                if self.regions[reg_lo].fix_upper_edge {
                    self.delete_region(reg_lo);
                    self.mesh.delete_edge(e_lo);
                    reg_lo = self.region_below(reg_up);
                    e_lo = self.regions[reg_lo].e_up;
                } else if self.regions[reg_up].fix_upper_edge {
                    self.delete_region(reg_up);
                    self.mesh.delete_edge(e_up);
                    reg_up = self.region_above(reg_lo);
                    e_up = self.regions[reg_up].e_up;
                }
            }

            if self.mesh.org(e_up) != self.mesh.org(e_lo) {
                let dst_up = self.mesh.dst(e_up);
                let dst_lo = self.mesh.dst(e_lo);
                if dst_up != dst_lo
                    && !self.regions[reg_up].fix_upper_edge
                    && !self.regions[reg_lo].fix_upper_edge
                    && (dst_up == self.event || dst_lo == self.event)
                {
                    // check_for_intersect may fall back to the event as the
                    // intersection, which needs the event between the edges.
                    if self.check_for_intersect(reg_up)? {
                        return Ok(());
                    }
                } else {
                    self.check_for_right_splice(reg_up);
                }
            }

            if self.mesh.org(e_up) == self.mesh.org(e_lo) && self.mesh.dst(e_up) == self.mesh.dst(e_lo) {
                // Degenerate loop of two edges.
                self.add_winding(e_lo, e_up);
                self.delete_region(reg_up);
                self.mesh.delete_edge(e_up);
                reg_up = self.region_above(reg_lo);
            }
        }
    }

    // ───────────────────────────── Events ─────────────────────────────

    /// The event has left-going edges but no right-going ones. Unless a
    /// degeneracy resolves it, a temporary edge is added so the vertex keeps
    /// a right-going edge until the next event fixes it.
    fn connect_right_vertex(&mut self, reg_up: RegionIdx, e_bottom_left: EdgeIdx) -> Result<(), TessError> {
        let mut reg_up = reg_up;
        let mut e_bottom_left = e_bottom_left;
        let mut e_top_left = self.mesh.onext(e_bottom_left);
        let reg_lo = self.region_below(reg_up);
        let e_up = self.regions[reg_up].e_up;
        let e_lo = self.regions[reg_lo].e_up;
        let mut degenerate = false;

        if self.mesh.dst(e_up) != self.mesh.dst(e_lo) {
            self.check_for_intersect(reg_up)?;
        }

        // The upper or lower edge may now pass through the event, or meet
        // the new intersection vertex.
        let ev = self.mesh.pos(self.event);
        if vert_eq(self.mesh.org_pos(e_up), ev) {
            let oprev = self.mesh.oprev(e_top_left);
            self.mesh.splice(oprev, e_up);
            reg_up = self.top_left_region(reg_up)?;
            let below = self.region_below(reg_up);
            e_top_left = self.regions[below].e_up;
            self.finish_left_regions(below, reg_lo);
            degenerate = true;
        }
        if vert_eq(self.mesh.org_pos(e_lo), ev) {
            let oprev = self.mesh.oprev(e_lo);
            self.mesh.splice(e_bottom_left, oprev);
            e_bottom_left = self.finish_left_regions(reg_lo, INVALID_REGION);
            degenerate = true;
        }
        if degenerate {
            let first = self.mesh.onext(e_bottom_left);
            return self.add_right_edges(reg_up, first, e_top_left, e_top_left, true);
        }

        // Connect to the closer of the two origins.
        let target = if vert_leq(self.mesh.org_pos(e_lo), self.mesh.org_pos(e_up)) {
            self.mesh.oprev(e_lo)
        } else {
            e_up
        };
        let lprev = self.mesh.lprev(e_bottom_left);
        let e_new = self.mesh.connect(lprev, target);

        // No cleanup yet: e_new must be marked before a walk could remove it.
        let onext = self.mesh.onext(e_new);
        self.add_right_edges(reg_up, e_new, onext, onext, false)?;
        let reg_new = self.mesh.edges[sym(e_new) as usize].active_region;
        self.regions[reg_new].fix_upper_edge = true;
        self.walk_dirty_regions(reg_up)
    }

    /// The event lies on the upper edge of `reg_up` (or on one of its
    /// endpoints).
    fn connect_left_degenerate(&mut self, reg_up: RegionIdx, v_event: VertIdx) -> Result<(), TessError> {
        let e = self.regions[reg_up].e_up;
        let p_event = self.mesh.pos(v_event);

        if vert_eq(self.mesh.org_pos(e), p_event) {
            // e's origin is unprocessed: merge and wait for it to come out
            // of the queue.
            let an_edge = self.mesh.verts[v_event as usize].an_edge;
            self.splice_merge_vertices(e, an_edge);
            return Ok(());
        }

        if !vert_eq(self.mesh.dst_pos(e), p_event) {
            // The event splits e.
            self.mesh.split_edge(sym(e));
            if self.regions[reg_up].fix_upper_edge {
                // Drop the unused part of the temporary edge.
                let onext = self.mesh.onext(e);
                self.mesh.delete_edge(onext);
                self.regions[reg_up].fix_upper_edge = false;
            }
            let an_edge = self.mesh.verts[v_event as usize].an_edge;
            self.mesh.splice(an_edge, e);
            return self.sweep_event(v_event);
        }

        // The event coincides with e's processed destination: splice in the
        // additional right-going edges.
        let reg_up = self.top_right_region(reg_up)?;
        let reg = self.region_below(reg_up);
        let mut e_top_right = sym(self.regions[reg].e_up);
        let mut e_top_left = self.mesh.onext(e_top_right);
        let e_last = e_top_left;
        if self.regions[reg].fix_upper_edge {
            // The destination only had a temporary right-going edge.
            debug_assert!(e_top_left != e_top_right);
            self.delete_region(reg);
            self.mesh.delete_edge(e_top_right);
            e_top_right = self.mesh.oprev(e_top_left);
        }
        let an_edge = self.mesh.verts[v_event as usize].an_edge;
        self.mesh.splice(an_edge, e_top_right);
        if !self.mesh.edge_goes_left(e_top_left) {
            e_top_left = INVALID;
        }
        let first = self.mesh.onext(e_top_right);
        self.add_right_edges(reg_up, first, e_last, e_top_left, true)
    }

    /// The event has no left-going edges: find the region containing it and
    /// connect it to the processed part of the mesh if that region is inside.
    fn connect_left_vertex(&mut self, v_event: VertIdx) -> Result<(), TessError> {
        let probe = sym(self.mesh.verts[v_event as usize].an_edge);
        let node = {
            let mesh = &self.mesh;
            let regions = &self.regions;
            let event = self.event;
            self.dict.search(probe, |e, reg| edge_leq(mesh, event, e, regions[reg].e_up))
        };
        let reg_up = self.dict.key(node);
        if reg_up == INVALID_REGION {
            return Err(TessError::InconsistentSweep);
        }
        let reg_lo = self.region_below(reg_up);
        if reg_lo == INVALID_REGION {
            return Ok(());
        }
        let e_up = self.regions[reg_up].e_up;
        let e_lo = self.regions[reg_lo].e_up;

        if edge_sign(self.mesh.dst_pos(e_up), self.mesh.pos(v_event), self.mesh.org_pos(e_up)) == 0.0 {
            return self.connect_left_degenerate(reg_up, v_event);
        }

        // Connect to the closer of the two destinations.
        let reg = if vert_leq(self.mesh.dst_pos(e_lo), self.mesh.dst_pos(e_up)) {
            reg_up
        } else {
            reg_lo
        };

        if self.regions[reg_up].inside || self.regions[reg].fix_upper_edge {
            let an_edge = self.mesh.verts[v_event as usize].an_edge;
            let e_new = if reg == reg_up {
                let lnext = self.mesh.lnext(e_up);
                self.mesh.connect(sym(an_edge), lnext)
            } else {
                let dnext = self.mesh.dnext(e_lo);
                sym(self.mesh.connect(dnext, an_edge))
            };
            if self.regions[reg].fix_upper_edge {
                self.fix_upper_edge(reg, e_new);
            } else {
                let reg_new = self.add_region_below(reg_up, e_new);
                self.compute_winding(reg_new);
            }
            self.sweep_event(v_event)
        } else {
            // Outside the polygon: no connection needed.
            let an_edge = self.mesh.verts[v_event as usize].an_edge;
            self.add_right_edges(reg_up, an_edge, an_edge, INVALID, true)
        }
    }

    /// Processes one vertex: finishes the regions closed by its left-going
    /// edges, then inserts its right-going edges.
    fn sweep_event(&mut self, v_event: VertIdx) -> Result<(), TessError> {
        self.event = v_event;

        // Is the event the right endpoint of an edge already in the dictionary?
        let start = self.mesh.verts[v_event as usize].an_edge;
        let mut e = start;
        while self.mesh.edges[e as usize].active_region == INVALID_REGION {
            e = self.mesh.onext(e);
            if e == start {
                return self.connect_left_vertex(v_event);
            }
        }

        let active = self.mesh.edges[e as usize].active_region;
        let reg_up = self.top_left_region(active)?;
        let reg = self.region_below(reg_up);
        let e_top_left = self.regions[reg].e_up;
        let e_bottom_left = self.finish_left_regions(reg, INVALID_REGION);

        if self.mesh.onext(e_bottom_left) == e_top_left {
            self.connect_right_vertex(reg_up, e_bottom_left)
        } else {
            let first = self.mesh.onext(e_bottom_left);
            self.add_right_edges(reg_up, first, e_top_left, e_top_left, true)
        }
    }
}
