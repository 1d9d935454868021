//! Medial family: fan each face from its centre through edges divided
//! into `n + 1` equal parts.

use crate::error::Result;
use crate::mesh::{ConwayPoly, HalfEdgeId, PointKey, PolyBuilder, Role};

/// Medial: per face edge, a triangle to each original endpoint and a strip
/// of `n - 1` triangles through the edge points.
///
/// Faces per edge, with `q1` the edge point nearest the head:
/// `[c, q1, head]` (Existing), `[c, tail, qn]` (ExistingAlt) and the strip
/// `[c, q(j+1), q(j)]`.
pub fn medial(poly: &ConwayPoly, n: usize, offset: f64) -> Result<ConwayPoly> {
    medial_with(poly, n, offset, false)
}

/// Edge-medial: like [`medial`], but each original corner becomes a quad
/// `[c, q1(h), head, qn(next)]` spanning two adjacent edges.
pub fn edge_medial(poly: &ConwayPoly, n: usize, offset: f64) -> Result<ConwayPoly> {
    medial_with(poly, n, offset, true)
}

fn medial_with(poly: &ConwayPoly, n: usize, offset: f64, edge: bool) -> Result<ConwayPoly> {
    let n = n.max(1);
    let mut b = PolyBuilder::new();

    for v in poly.vertex_ids() {
        b.vertex(PointKey::Vertex(v), *poly.position(v), Role::Existing);
    }
    for f in poly.face_ids() {
        let c = poly.face_centroid(f) + poly.face_normal(f) * offset;
        b.vertex(PointKey::Face(f), c, Role::New);
    }
    for h in poly.halfedge_ids() {
        let key = poly.undirected_key(h);
        let (lo, hi) = (poly.position(key.0), poly.position(key.1));
        for k in 0..n {
            let t = (k + 1) as f64 / (n + 1) as f64;
            b.vertex(PointKey::EdgePoint(key, k), lo + (hi - lo) * t, Role::NewAlt);
        }
    }

    for f in poly.face_ids() {
        let c = b.at(PointKey::Face(f));
        let tags = poly.face_tags(f);
        for h in poly.face_halfedges(f) {
            let q = edge_points(poly, &b, h, n);
            let head = b.at(PointKey::Vertex(poly.head(h)));
            if edge {
                let next = edge_points(poly, &b, poly.next(h), n);
                b.face(vec![c, q[0], head, next[n - 1]], Role::Existing, tags.clone());
            } else {
                let tail = b.at(PointKey::Vertex(poly.tail(h)));
                b.face(vec![c, q[0], head], Role::Existing, tags.clone());
                b.face(vec![c, tail, q[n - 1]], Role::ExistingAlt, tags.clone());
            }
            for j in 0..n - 1 {
                let role = if j % 2 == 0 { Role::New } else { Role::NewAlt };
                b.face(vec![c, q[j + 1], q[j]], role, tags.clone());
            }
        }
    }

    b.build(poly.pq())
}

/// The `n` interior points of `h`, ordered from its head to its tail.
fn edge_points(poly: &ConwayPoly, b: &PolyBuilder, h: HalfEdgeId, n: usize) -> Vec<usize> {
    let key = poly.undirected_key(h);
    let from_head = poly.head(h) == key.0;
    (0..n)
        .map(|j| {
            let k = if from_head { j } else { n - 1 - j };
            b.at(PointKey::EdgePoint(key, k))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::conway::fixtures::{assert_closed, open_quad};
    use crate::mesh::FaceId;
    use crate::shapes;

    #[test]
    fn test_medial_cube_counts() {
        let m = medial(&shapes::cube(), 2, 0.0).unwrap();
        assert_eq!(m.num_vertices(), 8 + 6 + 24);
        assert_eq!(m.num_faces(), 72);
        assert_closed(&m);

        let single = medial(&shapes::cube(), 1, 0.0).unwrap();
        assert_eq!(single.num_faces(), 48);
        assert_closed(&single);
    }

    #[test]
    fn test_medial_clamps_divisions() {
        let zero = medial(&shapes::cube(), 0, 0.0).unwrap();
        let one = medial(&shapes::cube(), 1, 0.0).unwrap();
        assert_eq!(zero.num_faces(), one.num_faces());
        assert_eq!(zero.positions(), one.positions());
    }

    #[test]
    fn test_medial_face_order() {
        let cube = shapes::cube();
        let m = medial(&cube, 3, 0.0).unwrap();
        let h = cube.face_halfedges(FaceId::new(0)).next().unwrap();
        let head = cube.position(cube.head(h));
        let tail = cube.position(cube.tail(h));

        // [c, q1, head]: q1 sits a quarter of the way from the head.
        let first: Vec<_> = m.face_vertices(FaceId::new(0)).collect();
        assert_eq!(m.face_role(FaceId::new(0)), Role::Existing);
        let q1 = m.position(first[1]);
        assert!((q1 - (head + (tail - head) * 0.25)).norm() < 1e-12);
        assert!((m.position(first[2]) - head).norm() < 1e-12);

        // [c, tail, q3], then the strip from the head side.
        let second: Vec<_> = m.face_vertices(FaceId::new(1)).collect();
        assert_eq!(m.face_role(FaceId::new(1)), Role::ExistingAlt);
        assert!((m.position(second[1]) - tail).norm() < 1e-12);
        assert_eq!(m.face_role(FaceId::new(2)), Role::New);
        assert_eq!(m.face_role(FaceId::new(3)), Role::NewAlt);
        let strip: Vec<_> = m.face_vertices(FaceId::new(2)).collect();
        assert_eq!(strip[2], first[1]);
    }

    #[test]
    fn test_edge_points_shared_across_edge() {
        let cube = shapes::cube();
        let m = medial(&cube, 2, 0.0).unwrap();
        // Each edge contributes two points, each used by faces on both sides.
        let new_alt = m.vertices().filter(|(_, v)| v.role == Role::NewAlt).count();
        assert_eq!(new_alt, 24);
    }

    #[test]
    fn test_edge_medial_cube() {
        let e = edge_medial(&shapes::cube(), 2, 0.0).unwrap();
        assert_eq!(e.num_faces(), 48);
        assert_eq!(e.side_histogram().get(&4), Some(&24));
        assert_closed(&e);
    }

    #[test]
    fn test_medial_open_quad() {
        let m = medial(&open_quad(), 1, 0.0).unwrap();
        assert_eq!(m.num_faces(), 8);
        assert!(m.is_valid());
    }
}
