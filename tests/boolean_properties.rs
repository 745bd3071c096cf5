// Copyright 2025 Lars Brubaker
// Properties of the polygon boolean operations on concrete shapes.

mod helpers;

use glam::DVec3;
use helpers::{assert_area_approx, circle_contour, quad_polygon};
use spherical_polygon::octahedron::spherical_triangle_area;
use spherical_polygon::sphere::vector_from_ra_dec;
use spherical_polygon::{validation, OctahedronPolygon, SphericalCap, SubContour, WindingRule};
use std::f64::consts::PI;

fn three_overlapping() -> [OctahedronPolygon; 3] {
    [
        quad_polygon(0.0, 20.0, 0.0, 20.0),
        quad_polygon(10.0, 30.0, 5.0, 25.0),
        OctahedronPolygon::new(&[circle_contour(vector_from_ra_dec(15.0, 15.0), 12.0, 9)]),
    ]
}

#[test]
fn union_with_itself_is_idempotent() {
    for a in three_overlapping() {
        let u = a.union(&a);
        assert_area_approx(u.area(), a.area(), 1e-9, "A | A");
        assert!(a.contains(&a));
        let i = a.intersection(&a);
        assert_area_approx(i.area(), a.area(), 1e-9, "A & A");
    }
}

#[test]
fn disjoint_caps_never_intersect() {
    let a = quad_polygon(0.0, 10.0, 0.0, 10.0);
    let b = quad_polygon(100.0, 110.0, -40.0, -30.0);
    assert!(!a.bounding_cap().intersects(b.bounding_cap()));
    assert!(a.intersection(&b).is_empty());
    assert!(!a.intersects(&b));
    assert!(!b.intersects(&a));
}

#[test]
fn union_is_associative_and_commutative() {
    let [a, b, c] = three_overlapping();
    let left = a.union(&b).union(&c);
    let right = a.union(&b.union(&c));
    let swapped = a.union(&c).union(&b);
    assert_area_approx(left.area(), right.area(), 1e-9, "(A|B)|C vs A|(B|C)");
    assert_area_approx(left.area(), swapped.area(), 1e-9, "(A|B)|C vs (A|C)|B");
    assert_area_approx(a.union(&b).area(), b.union(&a).area(), 1e-9, "A|B vs B|A");
}

#[test]
fn inclusion_exclusion() {
    let polys = three_overlapping();
    for a in &polys {
        for b in &polys {
            let u = a.union(b);
            let i = a.intersection(b);
            assert_area_approx(u.area(), a.area() + b.area() - i.area(), 1e-9, "|A|B| = |A|+|B|-|A&B|");
        }
    }
}

#[test]
fn subtraction_area_identity() {
    let [a, b, c] = three_overlapping();
    for (x, y) in [(&a, &b), (&b, &c), (&c, &a)] {
        let d = x.subtraction(y);
        let i = x.intersection(y);
        assert_area_approx(d.area(), x.area() - i.area(), 1e-9, "|A-B| = |A|-|A&B|");
        assert!(d.intersection(y).area() < 1e-9);
    }
}

#[test]
fn point_on_input_contour_is_contained() {
    let corners = helpers::radec_quad(5.0, 25.0, -10.0, 10.0);
    let poly = OctahedronPolygon::new(&[corners]);
    for i in 0..4 {
        let a = corners[i];
        let b = corners[(i + 1) % 4];
        assert!(poly.contains_point(a), "corner {}", i);
        assert!(poly.contains_point((a + b).normalize()), "edge midpoint {}", i);
    }
}

#[test]
fn small_triangle_near_x_axis() {
    let v0 = DVec3::new(1.0, 0.01, 0.01).normalize();
    let v1 = DVec3::new(1.0, 0.04, 0.01).normalize();
    let v2 = DVec3::new(1.0, 0.02, 0.04).normalize();
    let tri = OctahedronPolygon::new(&[[v0, v1, v2]]);

    let expected = spherical_triangle_area(v0, v1, v2);
    assert!(expected > 0.0);
    assert_area_approx(tri.area(), expected, 1e-6, "small triangle");
    // A few square degrees at most.
    assert!(tri.area_square_degrees() > 0.5 && tri.area_square_degrees() < 5.0);

    let centroid = (v0 + v1 + v2).normalize();
    assert!(tri.contains_point(centroid));

    let opposite = -centroid;
    assert!(!tri.contains_point(opposite));
    let far = OctahedronPolygon::new(&[[-v0, -v2, -v1]]);
    assert!(!far.is_empty());
    assert!(!tri.intersects(&far));
}

#[test]
fn overlapping_caps_union_and_intersection_bounds() {
    let a = OctahedronPolygon::new(&[circle_contour(vector_from_ra_dec(40.0, 40.0), 5.0, 4)]);
    let b = OctahedronPolygon::new(&[circle_contour(vector_from_ra_dec(43.0, 41.0), 5.0, 4)]);
    let u = a.union(&b);
    let i = a.intersection(&b);
    assert!(!i.is_empty());
    assert!(u.area() >= a.area().max(b.area()));
    assert!(i.area() <= a.area().min(b.area()));
}

#[test]
fn near_tangent_caps() {
    let d = 10f64.to_radians().cos();
    let centre = vector_from_ra_dec(0.0, 0.0);
    let a = OctahedronPolygon::new(&[circle_contour(centre, 10.0, 6)]);

    // Caps 20.001 degrees apart do not meet: the union is a plain
    // concatenation and must still hold both areas.
    let apart = OctahedronPolygon::new(&[circle_contour(vector_from_ra_dec(20.001, 0.0), 10.0, 6)]);
    assert!((a.bounding_cap().d - d).abs() < 1e-6);
    assert!(!a.bounding_cap().intersects(apart.bounding_cap()));
    let u = a.union(&apart);
    assert_eq!(u.triangle_count(), a.triangle_count() + apart.triangle_count());
    assert_area_approx(u.area(), a.area() + apart.area(), 1e-12, "fast path union");
    assert!(!a.intersects(&apart));

    // Caps that overlap slightly while the inscribed hexagons do not.
    let close = OctahedronPolygon::new(&[circle_contour(vector_from_ra_dec(19.99, 0.0), 10.0, 6)]);
    assert!(a.bounding_cap().intersects(close.bounding_cap()));
    let u = a.union(&close);
    assert_area_approx(u.area(), a.area() + close.area(), 1e-9, "full path union");
    assert!(!a.intersects(&close));
}

#[test]
fn sliver_gap_keeps_polygons_disjoint() {
    // Two squares sharing no point but separated by a sliver of 1e-4 degrees.
    let a = quad_polygon(10.0, 20.0, -5.0, 5.0);
    let b = quad_polygon(20.0001, 30.0, -5.0, 5.0);
    let u = a.union(&b);
    assert_area_approx(u.area(), a.area() + b.area(), 1e-9, "sliver union");
    assert!(a.intersection(&b).area() < 1e-12);
}

#[test]
fn touching_polygons_union_fills_both() {
    let a = quad_polygon(10.0, 20.0, -5.0, 5.0);
    let b = quad_polygon(20.0, 30.0, -5.0, 5.0);
    assert!(a.bounding_cap().intersects(b.bounding_cap()));
    let u = a.union(&b);
    assert_area_approx(u.area(), a.area() + b.area(), 1e-9, "touching union");
    assert!(u.contains_point(vector_from_ra_dec(20.0, 0.0)));
}

#[test]
fn polygon_around_the_north_pole() {
    let ring: Vec<DVec3> = (0..12).map(|i| vector_from_ra_dec(i as f64 * 30.0 + 7.0, 70.0)).collect();
    let poly = OctahedronPolygon::new(&[ring.clone()]);
    assert!(poly.contains_point(DVec3::Z));
    assert!(!poly.contains_point(DVec3::NEG_Z));
    assert!(!poly.contains_point(DVec3::X));
    // Only the northern faces are used.
    for (side, contours) in poly.sides().iter().enumerate() {
        assert_eq!(contours.is_empty(), side % 2 == 0, "side {}", side);
    }
    // Fan of triangles from the pole.
    let fan: f64 = (0..12)
        .map(|i| spherical_triangle_area(DVec3::Z, ring[i], ring[(i + 1) % 12]))
        .sum();
    assert_area_approx(poly.area(), fan, 1e-9, "polar cap");
    assert!(validation::check_triangles(&poly).is_valid());
}

#[test]
fn polygon_around_the_south_pole() {
    let ring: Vec<DVec3> = (0..8).map(|i| vector_from_ra_dec(360.0 - i as f64 * 45.0, -60.0)).collect();
    let poly = OctahedronPolygon::new(&[ring.clone()]);
    assert!(poly.contains_point(DVec3::NEG_Z));
    assert!(!poly.contains_point(DVec3::Z));
    let fan: f64 = (0..8)
        .map(|i| spherical_triangle_area(DVec3::NEG_Z, ring[i], ring[(i + 1) % 8]))
        .sum();
    assert_area_approx(poly.area(), fan, 1e-9, "south polar cap");
}

#[test]
fn equatorial_band_touches_all_eight_faces() {
    let quarters: Vec<OctahedronPolygon> = (0..4)
        .map(|q| quad_polygon(q as f64 * 90.0, (q + 1) as f64 * 90.0, -20.0, 20.0))
        .collect();
    let mut band = OctahedronPolygon::empty();
    for q in &quarters {
        band.union_in_place(q);
    }

    for (side, contours) in band.sides().iter().enumerate() {
        assert!(!contours.is_empty(), "side {} unused", side);
    }
    assert!(band.bounding_cap().is_full());
    assert!(band.contains_point(DVec3::X));
    assert!(band.contains_point(DVec3::NEG_Y));
    assert!(band.contains_point(vector_from_ra_dec(135.0, 10.0)));
    assert!(!band.contains_point(DVec3::Z));
    assert!(!band.contains_point(DVec3::NEG_Z));

    let expected: f64 = quarters.iter().map(OctahedronPolygon::area).sum();
    assert_area_approx(band.area(), expected, 1e-9, "band");
    assert!(validation::check_triangles(&band).is_valid());
}

#[test]
fn all_sky_minus_polygon_is_complement() {
    let a = quad_polygon(-20.0, 20.0, -20.0, 20.0);
    let rest = OctahedronPolygon::all_sky().subtraction(&a);
    assert_area_approx(rest.area(), 4.0 * PI - a.area(), 1e-9, "complement");
    assert!(!rest.contains_point(vector_from_ra_dec(0.0, 0.0)));
    assert!(rest.contains_point(vector_from_ra_dec(180.0, 0.0)));
    assert!(rest.intersection(&a).area() < 1e-9);
    assert_area_approx(rest.union(&a).area(), 4.0 * PI, 1e-9, "complement union");
}

#[test]
fn winding_rule_constructor() {
    let square = helpers::radec_quad(0.0, 10.0, 0.0, 10.0);
    let doubled = [square, square];
    let positive = OctahedronPolygon::with_winding_rule(&doubled, WindingRule::Positive);
    let twice = OctahedronPolygon::with_winding_rule(&doubled, WindingRule::AbsGeqTwo);
    let odd = OctahedronPolygon::with_winding_rule(&doubled, WindingRule::Odd);
    assert_area_approx(positive.area(), twice.area(), 1e-12, "positive vs abs>=2");
    assert!(odd.is_empty());
}

#[test]
fn open_contour_has_no_closing_outline() {
    let corners = helpers::radec_quad(5.0, 15.0, 2.0, 12.0);
    let closed = OctahedronPolygon::from_contour(SubContour::from_vertices(&corners, true));
    let open = OctahedronPolygon::from_contour(SubContour::from_vertices(&corners, false));
    assert_area_approx(open.area(), closed.area(), 1e-15, "same fill");
    let closed_flags = closed.edge_flags().iter().filter(|&&f| f).count();
    let open_flags = open.edge_flags().iter().filter(|&&f| f).count();
    assert!(open_flags < closed_flags);
}

#[test]
fn bounding_cap_holds_every_vertex() {
    let [a, b, c] = three_overlapping();
    let u = a.union(&b).union(&c);
    let cap: &SphericalCap = u.bounding_cap();
    for v in u.fill_vertices() {
        assert!(cap.contains_point(*v));
    }
    for v in u.outline_vertices() {
        assert!(cap.contains_point(*v));
    }
}
