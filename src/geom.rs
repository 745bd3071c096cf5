// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Port of libtess2 geom.c/h
//
// Planar predicates on sweep coordinates. A sweep point is a `DVec2` whose
// `x` is the sweep coordinate `s` and whose `y` is the ordinate `t`.

use glam::DVec2;

/// Returns true if u is lexicographically <= v (s first, then t).
#[inline]
pub fn vert_leq(u: DVec2, v: DVec2) -> bool {
    u.x < v.x || (u.x == v.x && u.y <= v.y)
}

/// Exact coordinate equality.
#[inline]
pub fn vert_eq(u: DVec2, v: DVec2) -> bool {
    u.x == v.x && u.y == v.y
}

/// Like `vert_leq` with s and t transposed.
#[inline]
pub fn trans_leq(u: DVec2, v: DVec2) -> bool {
    u.y < v.y || (u.y == v.y && u.x <= v.x)
}

/// Given u <= v <= w (in `vert_leq` order), evaluates the t-coordinate of edge
/// uw at the s-coordinate of v and returns `v.t - uw(v.s)`: the signed distance
/// from uw to v. Returns zero when uw is vertical.
pub fn edge_eval(u: DVec2, v: DVec2, w: DVec2) -> f64 {
    let gap_l = v.x - u.x;
    let gap_r = w.x - v.x;
    if gap_l + gap_r > 0.0 {
        if gap_l < gap_r {
            (v.y - u.y) + (u.y - w.y) * (gap_l / (gap_l + gap_r))
        } else {
            (v.y - w.y) + (w.y - u.y) * (gap_r / (gap_l + gap_r))
        }
    } else {
        0.0
    }
}

/// Same sign as `edge_eval(u, v, w)`. libtess2 routes EdgeSign through the
/// full evaluation to keep nearly-vertical edges accurate; so do we.
#[inline]
pub fn edge_sign(u: DVec2, v: DVec2, w: DVec2) -> f64 {
    edge_eval(u, v, w)
}

/// `edge_eval` with s and t transposed.
pub fn trans_eval(u: DVec2, v: DVec2, w: DVec2) -> f64 {
    let gap_l = v.y - u.y;
    let gap_r = w.y - v.y;
    if gap_l + gap_r > 0.0 {
        if gap_l < gap_r {
            (v.x - u.x) + (u.x - w.x) * (gap_l / (gap_l + gap_r))
        } else {
            (v.x - w.x) + (w.x - u.x) * (gap_r / (gap_l + gap_r))
        }
    } else {
        0.0
    }
}

/// Same sign as `trans_eval(u, v, w)`, cheaper.
pub fn trans_sign(u: DVec2, v: DVec2, w: DVec2) -> f64 {
    let gap_l = v.y - u.y;
    let gap_r = w.y - v.y;
    if gap_l + gap_r > 0.0 {
        (v.x - w.x) * gap_l + (v.x - u.x) * gap_r
    } else {
        0.0
    }
}

/// L1 distance between two sweep points.
#[inline]
pub fn vert_l1_dist(u: DVec2, v: DVec2) -> f64 {
    (u.x - v.x).abs() + (u.y - v.y).abs()
}

/// Twice the signed area of triangle (a, b, c); positive when counter-clockwise.
#[inline]
pub fn twice_signed_area(a: DVec2, b: DVec2, c: DVec2) -> f64 {
    (b - a).perp_dot(c - a)
}

/// Returns `(b*x + a*y) / (a + b)`, or the midpoint when `a == b == 0`.
/// Negative weights are clamped to zero, so the result stays within [x, y].
#[inline]
pub fn real_interpolate(a: f64, x: f64, b: f64, y: f64) -> f64 {
    let a = a.max(0.0);
    let b = b.max(0.0);
    if a <= b {
        if b == 0.0 {
            x / 2.0 + y / 2.0
        } else {
            x + (y - x) * (a / (a + b))
        }
    } else {
        y + (x - y) * (b / (a + b))
    }
}

/// Sorts the endpoints of two edges so that `a <= b`, `c <= d` and `a <= c`
/// under the given ordering.
fn order_edges(
    leq: fn(DVec2, DVec2) -> bool,
    o1: DVec2,
    d1: DVec2,
    o2: DVec2,
    d2: DVec2,
) -> (DVec2, DVec2, DVec2, DVec2) {
    let (mut a, mut b) = if leq(o1, d1) { (o1, d1) } else { (d1, o1) };
    let (mut c, mut d) = if leq(o2, d2) { (o2, d2) } else { (d2, o2) };
    if !leq(a, c) {
        std::mem::swap(&mut a, &mut c);
        std::mem::swap(&mut b, &mut d);
    }
    (a, b, c, d)
}

/// Intersection of edges (o1, d1) and (o2, d2). The result always lies inside
/// the bounding rectangle of both edges, even when they barely touch.
pub fn edge_intersect(o1: DVec2, d1: DVec2, o2: DVec2, d2: DVec2) -> DVec2 {
    let s = {
        let (a, b, c, d) = order_edges(vert_leq, o1, d1, o2, d2);
        if !vert_leq(c, b) {
            // No overlap in s: pick the midpoint of the gap.
            c.x / 2.0 + b.x / 2.0
        } else if vert_leq(b, d) {
            // Interpolate between c and b.
            let mut z1 = edge_eval(a, c, b);
            let mut z2 = edge_eval(c, b, d);
            if z1 + z2 < 0.0 {
                z1 = -z1;
                z2 = -z2;
            }
            real_interpolate(z1, c.x, z2, b.x)
        } else {
            // Interpolate between c and d.
            let mut z1 = edge_sign(a, c, b);
            let mut z2 = -edge_sign(a, d, b);
            if z1 + z2 < 0.0 {
                z1 = -z1;
                z2 = -z2;
            }
            real_interpolate(z1, c.x, z2, d.x)
        }
    };

    let t = {
        let (a, b, c, d) = order_edges(trans_leq, o1, d1, o2, d2);
        if !trans_leq(c, b) {
            c.y / 2.0 + b.y / 2.0
        } else if trans_leq(b, d) {
            let mut z1 = trans_eval(a, c, b);
            let mut z2 = trans_eval(c, b, d);
            if z1 + z2 < 0.0 {
                z1 = -z1;
                z2 = -z2;
            }
            real_interpolate(z1, c.y, z2, b.y)
        } else {
            let mut z1 = trans_sign(a, c, b);
            let mut z2 = -trans_sign(a, d, b);
            if z1 + z2 < 0.0 {
                z1 = -z1;
                z2 = -z2;
            }
            real_interpolate(z1, c.y, z2, d.y)
        }
    };

    DVec2::new(s, t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: f64, t: f64) -> DVec2 {
        DVec2::new(s, t)
    }

    #[test]
    fn vert_leq_orders_by_s_then_t() {
        assert!(vert_leq(p(0.0, 0.0), p(1.0, 0.0)));
        assert!(vert_leq(p(0.0, 0.0), p(0.0, 1.0)));
        assert!(vert_leq(p(0.0, 0.0), p(0.0, 0.0)));
        assert!(!vert_leq(p(1.0, 0.0), p(0.0, 0.0)));
    }

    #[test]
    fn trans_leq_orders_by_t_then_s() {
        assert!(trans_leq(p(0.0, 0.0), p(0.0, 1.0)));
        assert!(trans_leq(p(0.0, 0.0), p(1.0, 0.0)));
        assert!(!trans_leq(p(0.0, 1.0), p(0.0, 0.0)));
    }

    #[test]
    fn edge_eval_measures_distance_above_edge() {
        let r = edge_eval(p(0.0, 0.0), p(0.5, 1.0), p(1.0, 0.0));
        assert!((r - 1.0).abs() < 1e-12, "got {}", r);
    }

    #[test]
    fn edge_eval_vertical_is_zero() {
        assert_eq!(edge_eval(p(0.0, 0.0), p(0.0, 0.5), p(0.0, 1.0)), 0.0);
    }

    #[test]
    fn twice_signed_area_sign() {
        assert!(twice_signed_area(p(0.0, 0.0), p(1.0, 0.0), p(0.5, 1.0)) > 0.0);
        assert!(twice_signed_area(p(0.0, 0.0), p(0.5, 1.0), p(1.0, 0.0)) < 0.0);
    }

    #[test]
    fn real_interpolate_handles_zero_weights() {
        assert!((real_interpolate(0.0, 0.0, 0.0, 1.0) - 0.5).abs() < 1e-12);
        assert!((real_interpolate(1.0, 0.0, 1.0, 2.0) - 1.0).abs() < 1e-12);
        assert_eq!(real_interpolate(-3.0, 4.0, 1.0, 8.0), 4.0);
    }

    #[test]
    fn edge_intersect_crossing() {
        let v = edge_intersect(p(0.0, 0.0), p(1.0, 1.0), p(0.0, 1.0), p(1.0, 0.0));
        assert!((v.x - 0.5).abs() < 1e-12, "s={}", v.x);
        assert!((v.y - 0.5).abs() < 1e-12, "t={}", v.y);
    }

    #[test]
    fn edge_intersect_stays_in_bounds_for_near_parallel_edges() {
        let v = edge_intersect(p(0.0, 0.0), p(1.0, 1e-12), p(0.0, 1e-12), p(1.0, 0.0));
        assert!(v.x >= 0.0 && v.x <= 1.0);
        assert!(v.y >= 0.0 && v.y <= 1e-12);
    }
}
