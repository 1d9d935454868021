//! Platonic seed solids.
//!
//! Each solid is centred on the origin with circumradius 1, faces wound
//! counter-clockwise seen from outside, every face and vertex `Existing`.

use nalgebra::{Point3, Vector3};

use crate::mesh::{ConwayPoly, Seed, SeedFace, SeedPolicy};

/// Golden ratio.
const PHI: f64 = 1.618_033_988_749_895;

/// Seed geometry for a tetrahedron.
pub fn tetrahedron_seed() -> Seed {
    let positions = [
        [1.0, 1.0, 1.0],
        [1.0, -1.0, -1.0],
        [-1.0, 1.0, -1.0],
        [-1.0, -1.0, 1.0],
    ];
    let faces = [[0, 1, 2], [0, 3, 1], [0, 2, 3], [1, 3, 2]];
    seed(&positions, faces.iter().map(|f| f.to_vec()).collect(), (3, 3))
}

/// Seed geometry for a cube.
pub fn cube_seed() -> Seed {
    let positions = [
        [-1.0, -1.0, -1.0],
        [1.0, -1.0, -1.0],
        [1.0, 1.0, -1.0],
        [-1.0, 1.0, -1.0],
        [-1.0, -1.0, 1.0],
        [1.0, -1.0, 1.0],
        [1.0, 1.0, 1.0],
        [-1.0, 1.0, 1.0],
    ];
    let faces = [
        [0, 3, 2, 1],
        [4, 5, 6, 7],
        [0, 1, 5, 4],
        [2, 3, 7, 6],
        [1, 2, 6, 5],
        [0, 4, 7, 3],
    ];
    seed(&positions, faces.iter().map(|f| f.to_vec()).collect(), (4, 3))
}

/// Seed geometry for an octahedron.
pub fn octahedron_seed() -> Seed {
    let positions = [
        [1.0, 0.0, 0.0],
        [-1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
    ];
    let mut faces = Vec::with_capacity(8);
    for sx in [1.0, -1.0] {
        for sy in [1.0, -1.0] {
            for sz in [1.0, -1.0] {
                let x = if sx > 0.0 { 0 } else { 1 };
                let y = if sy > 0.0 { 2 } else { 3 };
                let z = if sz > 0.0 { 4 } else { 5 };
                if sx * sy * sz > 0.0 {
                    faces.push(vec![x, y, z]);
                } else {
                    faces.push(vec![x, z, y]);
                }
            }
        }
    }
    seed(&positions, faces, (3, 4))
}

/// Seed geometry for an icosahedron.
pub fn icosahedron_seed() -> Seed {
    let positions = icosahedron_points();
    let normals = dodecahedron_points();
    let faces = hull_faces(&positions, &normals);
    seed(&positions, faces, (3, 5))
}

/// Seed geometry for a dodecahedron.
pub fn dodecahedron_seed() -> Seed {
    let positions = dodecahedron_points();
    let normals = icosahedron_points();
    let faces = hull_faces(&positions, &normals);
    seed(&positions, faces, (5, 3))
}

/// A tetrahedron.
pub fn tetrahedron() -> ConwayPoly {
    build(&tetrahedron_seed())
}

/// A cube.
pub fn cube() -> ConwayPoly {
    build(&cube_seed())
}

/// An octahedron.
pub fn octahedron() -> ConwayPoly {
    build(&octahedron_seed())
}

/// An icosahedron.
pub fn icosahedron() -> ConwayPoly {
    build(&icosahedron_seed())
}

/// A dodecahedron.
pub fn dodecahedron() -> ConwayPoly {
    build(&dodecahedron_seed())
}

/// Look up a solid by name.
pub fn by_name(name: &str) -> Option<ConwayPoly> {
    match name.to_ascii_lowercase().as_str() {
        "tetrahedron" | "t" => Some(tetrahedron()),
        "cube" | "c" => Some(cube()),
        "octahedron" | "o" => Some(octahedron()),
        "dodecahedron" | "d" => Some(dodecahedron()),
        "icosahedron" | "i" => Some(icosahedron()),
        _ => None,
    }
}

fn build(seed: &Seed) -> ConwayPoly {
    // Fixed, consistently wound data: lenient construction never skips here.
    ConwayPoly::from_seed(seed, SeedPolicy::Lenient).unwrap_or_default()
}

fn seed(positions: &[[f64; 3]], faces: Vec<Vec<usize>>, pq: (usize, usize)) -> Seed {
    Seed {
        positions: positions
            .iter()
            .map(|p| Point3::from(Vector3::new(p[0], p[1], p[2]).normalize()))
            .collect(),
        faces: faces
            .into_iter()
            .map(|indices| SeedFace {
                indices,
                configuration: 1,
            })
            .collect(),
        pq,
    }
}

fn icosahedron_points() -> Vec<[f64; 3]> {
    let mut pts = Vec::with_capacity(12);
    for a in [1.0, -1.0] {
        for b in [PHI, -PHI] {
            pts.push([0.0, a, b]);
            pts.push([a, b, 0.0]);
            pts.push([b, 0.0, a]);
        }
    }
    pts
}

fn dodecahedron_points() -> Vec<[f64; 3]> {
    let mut pts = Vec::with_capacity(20);
    for x in [1.0, -1.0] {
        for y in [1.0, -1.0] {
            for z in [1.0, -1.0] {
                pts.push([x, y, z]);
            }
        }
    }
    let inv = 1.0 / PHI;
    for a in [PHI, -PHI] {
        for b in [inv, -inv] {
            pts.push([0.0, a, b]);
            pts.push([a, b, 0.0]);
            pts.push([b, 0.0, a]);
        }
    }
    pts
}

/// Faces of a convex solid whose face normals are known: each face is the set
/// of points furthest along its normal, sorted counter-clockwise about it.
fn hull_faces(points: &[[f64; 3]], normals: &[[f64; 3]]) -> Vec<Vec<usize>> {
    let pts: Vec<Vector3<f64>> = points
        .iter()
        .map(|p| Vector3::new(p[0], p[1], p[2]).normalize())
        .collect();
    normals
        .iter()
        .map(|n| {
            let n = Vector3::new(n[0], n[1], n[2]).normalize();
            let best = pts.iter().map(|p| p.dot(&n)).fold(f64::MIN, f64::max);
            let mut face: Vec<usize> = (0..pts.len())
                .filter(|&i| (pts[i].dot(&n) - best).abs() < 1e-9)
                .collect();
            let c: Vector3<f64> = face.iter().map(|&i| pts[i]).sum::<Vector3<f64>>() / face.len() as f64;
            let u = (pts[face[0]] - c).normalize();
            let w = n.cross(&u);
            let angle = |i: usize| {
                let d = pts[i] - c;
                d.dot(&w).atan2(d.dot(&u))
            };
            face.sort_by(|&a, &b| angle(a).total_cmp(&angle(b)));
            face
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platonic_counts() {
        let cases = [
            (tetrahedron(), 4, 6, 4, 3),
            (cube(), 8, 12, 6, 4),
            (octahedron(), 6, 12, 8, 3),
            (dodecahedron(), 20, 30, 12, 5),
            (icosahedron(), 12, 30, 20, 3),
        ];
        for (poly, v, e, f, sides) in cases {
            assert_eq!(poly.num_vertices(), v);
            assert_eq!(poly.num_edges(), e);
            assert_eq!(poly.num_faces(), f);
            assert!(poly.face_ids().all(|id| poly.face_sides(id) == sides));
            assert!(poly.halfedge_ids().all(|h| !poly.is_naked(h)));
            assert!(poly.is_valid());
        }
    }

    #[test]
    fn test_outward_winding() {
        for poly in [tetrahedron(), cube(), octahedron(), dodecahedron(), icosahedron()] {
            for f in poly.face_ids() {
                let c = poly.face_centroid(f);
                assert!(poly.face_normal(f).dot(&c.coords) > 0.0);
            }
            for (_, v) in poly.vertices() {
                assert!((v.position.coords.norm() - 1.0).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_by_name() {
        assert_eq!(by_name("Cube").map(|p| p.num_faces()), Some(6));
        assert!(by_name("teapot").is_none());
    }
}
