// Copyright 2025 Lars Brubaker
// Shared test utilities for spherical-polygon tests.

#![allow(dead_code)]

use glam::{DVec2, DVec3};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use spherical_polygon::sphere::vector_from_ra_dec;
use spherical_polygon::{OctahedronPolygon, Orientation, Tessellator, Triangle, VertexId, WindingRule};

/// Runs the planar tessellator over flat `[x0, y0, x1, y1, ...]` contours.
/// Returns the triangles together with every vertex position, including
/// the ones created at edge crossings.
pub fn tessellate_flat(contours: &[&[f64]], rule: WindingRule) -> (Vec<Triangle>, Vec<DVec2>) {
    let mut positions: Vec<DVec2> = Vec::new();
    let mut tess = Tessellator::new(Orientation::CounterClockwise);
    for c in contours {
        let start = positions.len();
        positions.extend(c.chunks_exact(2).map(|p| DVec2::new(p[0], p[1])));
        let pts: Vec<(DVec2, VertexId)> = positions[start..]
            .iter()
            .enumerate()
            .map(|(i, &p)| (p, (start + i) as VertexId))
            .collect();
        tess.add_contour(pts);
    }
    let mut combine = |p: DVec2, _sources: &[(VertexId, f64)]| -> VertexId {
        positions.push(p);
        (positions.len() - 1) as VertexId
    };
    let triangles = tess.tessellate(rule, &mut combine).expect("tessellation failed");
    (triangles, positions)
}

/// Signed area of a planar triangle.
pub fn triangle_area(a: DVec2, b: DVec2, c: DVec2) -> f64 {
    0.5 * (b - a).perp_dot(c - a)
}

pub fn total_signed_area(triangles: &[Triangle], positions: &[DVec2]) -> f64 {
    triangles
        .iter()
        .map(|t| {
            let [a, b, c] = t.vertices.map(|v| positions[v as usize]);
            triangle_area(a, b, c)
        })
        .sum()
}

/// Every triangle references a known vertex and none is clockwise. Collinear
/// input can legitimately produce zero-area triangles.
pub fn verify_valid_output(triangles: &[Triangle], positions: &[DVec2]) {
    for (i, t) in triangles.iter().enumerate() {
        for &v in &t.vertices {
            assert!((v as usize) < positions.len(), "triangle {} references vertex {}", i, v);
        }
        let [a, b, c] = t.vertices.map(|v| positions[v as usize]);
        assert!(triangle_area(a, b, c) >= 0.0, "triangle {} is clockwise", i);
    }
}

pub fn assert_area_approx(actual: f64, expected: f64, tolerance: f64, label: &str) {
    assert!(
        (actual - expected).abs() < tolerance,
        "{}: expected area ~{}, got {} (diff={})",
        label,
        expected,
        actual,
        (actual - expected).abs()
    );
}

/// Counter-clockwise (seen from outside) quadrilateral spanning the given
/// ra/dec box corners, edges being great circles.
pub fn radec_quad(ra0: f64, ra1: f64, dec0: f64, dec1: f64) -> [DVec3; 4] {
    [
        vector_from_ra_dec(ra0, dec0),
        vector_from_ra_dec(ra1, dec0),
        vector_from_ra_dec(ra1, dec1),
        vector_from_ra_dec(ra0, dec1),
    ]
}

pub fn quad_polygon(ra0: f64, ra1: f64, dec0: f64, dec1: f64) -> OctahedronPolygon {
    OctahedronPolygon::new(&[radec_quad(ra0, ra1, dec0, dec1)])
}

/// Regular polygon of `n` vertices at angular radius `radius_deg` around
/// `center`, counter-clockwise seen from outside.
pub fn circle_contour(center: DVec3, radius_deg: f64, n: usize) -> Vec<DVec3> {
    let center = center.normalize();
    let helper = if center.x.abs() < 0.9 { DVec3::X } else { DVec3::Y };
    let u = center.cross(helper).normalize();
    let v = center.cross(u);
    let (s, c) = radius_deg.to_radians().sin_cos();
    (0..n)
        .map(|i| {
            let t = std::f64::consts::TAU * i as f64 / n as f64;
            (center * c + (u * t.cos() + v * t.sin()) * s).normalize()
        })
        .collect()
}

/// Uniformly distributed unit vector.
pub fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> DVec3 {
    let z: f64 = rng.gen_range(-1.0..1.0);
    let theta: f64 = rng.gen_range(0.0..std::f64::consts::TAU);
    let r = (1.0 - z * z).sqrt();
    DVec3::new(r * theta.cos(), r * theta.sin(), z)
}

/// Random convex spherical polygons: circles of random centre, radius and
/// vertex count.
pub fn random_convex_polygons(n: usize, seed: u64) -> Vec<OctahedronPolygon> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let center = random_unit_vector(&mut rng);
            let radius: f64 = rng.gen_range(2.0..40.0);
            let sides: usize = rng.gen_range(3..12);
            OctahedronPolygon::new(&[circle_contour(center, radius, sides)])
        })
        .collect()
}
