// Copyright 2025 Lars Brubaker
// Seeded random polygons: boolean identities, serialization and containment.

mod helpers;

use helpers::{assert_area_approx, random_convex_polygons, random_unit_vector};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use spherical_polygon::{validation, OctahedronPolygon};

const SEED: u64 = 0x5eed_cafe;

#[test]
fn random_polygons_are_valid() {
    for (i, p) in random_convex_polygons(40, SEED).iter().enumerate() {
        assert!(!p.is_empty(), "polygon {} is empty", i);
        let report = validation::check_triangles(p);
        assert!(report.is_valid(), "polygon {}: {:?}", i, report);
        assert!(validation::overlap_area(p) < 1e-10, "polygon {} overlaps itself", i);
        let inside = p.point_inside().unwrap();
        assert!(p.contains_point(inside), "polygon {}", i);
        assert!(p.contains(p), "polygon {}", i);
    }
}

#[test]
fn random_inclusion_exclusion() {
    let polys = random_convex_polygons(16, SEED + 1);
    for pair in polys.chunks_exact(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let u = a.union(b);
        let i = a.intersection(b);
        assert_area_approx(u.area(), a.area() + b.area() - i.area(), 1e-9, "inclusion-exclusion");
        assert_eq!(a.intersects(b), !i.is_empty());
        let d = a.subtraction(b);
        assert_area_approx(d.area(), a.area() - i.area(), 1e-9, "subtraction");
        assert!(validation::check_triangles(&u).is_valid());
        assert!(validation::check_triangles(&d).is_valid());
    }
}

#[test]
fn random_union_order_does_not_matter() {
    let polys = random_convex_polygons(6, SEED + 2);
    let mut forward = OctahedronPolygon::empty();
    for p in &polys {
        forward.union_in_place(p);
    }
    let mut backward = OctahedronPolygon::empty();
    for p in polys.iter().rev() {
        backward.union_in_place(p);
    }
    assert_area_approx(forward.area(), backward.area(), 1e-9, "union order");
    for p in &polys {
        assert!(forward.contains(p));
    }
}

#[test]
fn random_binary_round_trip() {
    for p in random_convex_polygons(20, SEED + 3) {
        let bytes = p.to_bytes();
        let back = OctahedronPolygon::from_bytes(&bytes).unwrap();
        assert_eq!(back.triangle_count(), p.triangle_count());
        assert_eq!(back.fill_vertices(), p.fill_vertices());
        assert_eq!(back.edge_flags(), p.edge_flags());
        assert_eq!(back.area(), p.area());

        let mut streamed = Vec::new();
        p.write_to(&mut streamed).unwrap();
        let back = OctahedronPolygon::read_from(&mut streamed.as_slice()).unwrap();
        assert_eq!(back.sides(), p.sides());
    }
}

#[test]
fn random_points_agree_with_boolean_results() {
    let polys = random_convex_polygons(8, SEED + 4);
    let mut rng = ChaCha8Rng::seed_from_u64(SEED + 5);
    let points: Vec<_> = (0..400).map(|_| random_unit_vector(&mut rng)).collect();
    for pair in polys.chunks_exact(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let u = a.union(b);
        let i = a.intersection(b);
        for &p in &points {
            let (in_a, in_b) = (a.contains_point(p), b.contains_point(p));
            // Points near a boundary may go either way after re-tessellation.
            let near_boundary = [a, b].iter().any(|poly| {
                poly.outline_vertices()
                    .chunks_exact(2)
                    .any(|s| arc_distance(p, s[0], s[1]) < 1e-9)
            });
            if near_boundary {
                continue;
            }
            assert_eq!(u.contains_point(p), in_a || in_b, "union at {:?}", p);
            assert_eq!(i.contains_point(p), in_a && in_b, "intersection at {:?}", p);
        }
    }
}

/// Angular distance from `p` to the great-circle arc `a -> b`.
fn arc_distance(p: glam::DVec3, a: glam::DVec3, b: glam::DVec3) -> f64 {
    let n = a.cross(b);
    if n.length() < 1e-15 {
        return spherical_polygon::sphere::angle_between(p, a);
    }
    let n = n.normalize();
    let projected = p - n * p.dot(n);
    let on_arc = a.cross(projected).dot(n) >= 0.0 && projected.cross(b).dot(n) >= 0.0;
    if on_arc {
        p.dot(n).abs().asin()
    } else {
        spherical_polygon::sphere::angle_between(p, a).min(spherical_polygon::sphere::angle_between(p, b))
    }
}
