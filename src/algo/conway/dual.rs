//! Dual, ambo and zip: operators that trade faces for vertices.

use crate::error::Result;
use crate::mesh::{ConwayPoly, PointKey, PolyBuilder, Role};

use super::vertex_tags;

/// The dual: one vertex per face centroid, one face per vertex.
///
/// On an open mesh each boundary half-edge also contributes its midpoint,
/// and a boundary vertex's face is closed through those midpoints and a
/// copy of the vertex itself. The Schläfli pair is swapped.
pub fn dual(poly: &ConwayPoly) -> Result<ConwayPoly> {
    let mut b = PolyBuilder::new();

    for f in poly.face_ids() {
        b.vertex(PointKey::Face(f), poly.face_centroid(f), Role::New);
    }
    for h in poly.halfedge_ids().filter(|&h| poly.is_naked(h)) {
        b.vertex(PointKey::Edge(poly.undirected_key(h)), poly.midpoint(h), Role::New);
    }

    for v in poly.vertex_ids() {
        let ring = poly.vertex_halfedges(v);
        let (Some(&first), Some(&last)) = (ring.first(), ring.last()) else {
            continue;
        };
        let mut loop_: Vec<usize> = ring
            .iter()
            .map(|&h| b.at(PointKey::Face(poly.face_of(h))))
            .collect();

        let open = poly.next(first);
        if poly.is_naked(last) && poly.is_naked(open) {
            loop_.push(b.at(PointKey::Edge(poly.undirected_key(last))));
            loop_.push(b.add_vertex(*poly.position(v), Role::New));
            loop_.push(b.at(PointKey::Edge(poly.undirected_key(open))));
        }
        b.face(loop_, poly.vertex_role(v), vertex_tags(poly, v));
    }

    let (p, q) = poly.pq();
    b.build((q, p))
}

/// The polyhedron and its dual in one mesh.
///
/// Both are rescaled about the origin: the original to unit radius, the
/// dual to radius `scale`.
pub fn add_dual(poly: &ConwayPoly, scale: f64) -> Result<ConwayPoly> {
    let mut out = poly.duplicate();
    let mut d = dual(poly)?;
    out.scale_polyhedra(1.0);
    d.scale_polyhedra(scale);
    out.append(&d);
    Ok(out)
}

/// Zip: truncate the dual.
///
/// Each face keeps a shrunken copy of itself, with corners at the edge
/// midpoints pulled toward the centroid by `amount`. Each vertex of degree
/// three or more becomes a face joining the copies around it.
pub fn zip(poly: &ConwayPoly, amount: f64) -> Result<ConwayPoly> {
    let mut b = PolyBuilder::new();

    for f in poly.face_ids() {
        let c = poly.face_centroid(f);
        let loop_: Vec<usize> = poly
            .face_halfedges(f)
            .map(|h| {
                let p = poly.midpoint(h) + (c - poly.midpoint(h)) * amount;
                b.vertex(PointKey::HalfEdge(h), p, Role::New)
            })
            .collect();
        b.face(loop_, Role::Existing, poly.face_tags(f).clone());
    }

    for v in poly.vertex_ids() {
        let ring = poly.vertex_halfedges(v);
        if ring.len() < 3 {
            continue;
        }
        let mut loop_ = Vec::with_capacity(ring.len() * 2);
        for &h in &ring {
            loop_.push(b.at(PointKey::HalfEdge(h)));
            match poly.pair(h) {
                Some(p) => loop_.push(b.at(PointKey::HalfEdge(p))),
                None => loop_.push(b.vertex(
                    PointKey::Edge(poly.undirected_key(h)),
                    poly.midpoint(h),
                    Role::NewAlt,
                )),
            }
        }
        b.face(loop_, Role::New, vertex_tags(poly, v));
    }

    b.build(poly.pq())
}

/// Ambo (rectify): one vertex per edge midpoint.
///
/// Each face becomes the polygon of its edge midpoints; each vertex the
/// polygon of the midpoints around it. A boundary vertex's polygon is
/// closed through the vertex itself.
pub fn ambo(poly: &ConwayPoly) -> Result<ConwayPoly> {
    let mut b = PolyBuilder::new();

    for h in poly.halfedge_ids() {
        b.vertex(PointKey::Edge(poly.undirected_key(h)), poly.midpoint(h), Role::New);
    }
    let mid = |b: &PolyBuilder, h| b.at(PointKey::Edge(poly.undirected_key(h)));

    for f in poly.face_ids() {
        let loop_: Vec<usize> = poly.face_halfedges(f).map(|h| mid(&b, h)).collect();
        b.face(loop_, Role::Existing, poly.face_tags(f).clone());
    }

    for v in poly.vertex_ids() {
        let ring = poly.vertex_halfedges(v);
        let Some(&first) = ring.first() else {
            continue;
        };
        let mut loop_: Vec<usize> = ring.iter().map(|&h| mid(&b, h)).collect();
        let open = poly.next(first);
        if poly.is_naked(open) {
            loop_.push(b.add_vertex(*poly.position(v), Role::NewAlt));
            loop_.push(mid(&b, open));
        }
        b.face(loop_, Role::New, vertex_tags(poly, v));
    }

    b.build(poly.pq())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::conway::fixtures::{assert_closed, open_quad};
    use crate::mesh::{parse_tags, FaceId};
    use crate::shapes;

    #[test]
    fn test_dual_tetrahedron() {
        let d = dual(&shapes::tetrahedron()).unwrap();
        assert_eq!(d.num_vertices(), 4);
        assert_eq!(d.num_faces(), 4);
        assert_closed(&d);
    }

    #[test]
    fn test_dual_cube_is_octahedron() {
        let d = dual(&shapes::cube()).unwrap();
        assert_eq!(d.num_vertices(), 6);
        assert_eq!(d.num_faces(), 8);
        assert_eq!(d.side_histogram().get(&3), Some(&8));
        assert_eq!(d.pq(), (3, 4));
        assert_closed(&d);
        // Outward winding survives.
        for f in d.face_ids() {
            assert!(d.face_normal(f).dot(&d.face_centroid(f).coords) > 0.0);
        }
    }

    #[test]
    fn test_dual_dual_restores_counts() {
        for poly in [shapes::cube(), shapes::dodecahedron(), shapes::icosahedron()] {
            let dd = dual(&dual(&poly).unwrap()).unwrap();
            assert_eq!(dd.num_vertices(), poly.num_vertices());
            assert_eq!(dd.num_faces(), poly.num_faces());
            assert_eq!(dd.side_histogram(), poly.side_histogram());
        }
    }

    #[test]
    fn test_dual_roles_and_tags() {
        let mut cube = shapes::cube();
        cube.face_tags_mut(FaceId::new(1)).extend(parse_tags("top"));
        let d = dual(&cube).unwrap();
        assert!(d.vertices().all(|(_, v)| v.role == Role::New));
        assert!(d.faces().all(|(_, f)| f.role == Role::Existing));
        // Four cube vertices touch the top face.
        let tagged = d.faces().filter(|(_, f)| !f.tags.is_empty()).count();
        assert_eq!(tagged, 4);
    }

    #[test]
    fn test_dual_open_quad() {
        let d = dual(&open_quad()).unwrap();
        // One centroid, four boundary midpoints, four vertex copies.
        assert_eq!(d.num_vertices(), 9);
        assert_eq!(d.num_faces(), 4);
        assert!(d.is_valid());
        assert!(d.face_ids().all(|f| d.face_sides(f) == 4));
    }

    #[test]
    fn test_add_dual_appends_scaled() {
        let cube = shapes::cube();
        let both = add_dual(&cube, 0.5).unwrap();
        assert_eq!(both.num_vertices(), 8 + 6);
        assert_eq!(both.num_faces(), 6 + 8);
        let max = both
            .vertices()
            .map(|(_, v)| v.position.coords.norm())
            .fold(0.0, f64::max);
        assert!((max - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_ambo_cube_is_cuboctahedron() {
        let a = ambo(&shapes::cube()).unwrap();
        assert_eq!(a.num_vertices(), 12);
        assert_eq!(a.num_faces(), 14);
        assert_eq!(a.num_edges(), 24);
        assert_eq!(a.side_histogram().get(&4), Some(&6));
        assert_eq!(a.side_histogram().get(&3), Some(&8));
        assert_closed(&a);
    }

    #[test]
    fn test_ambo_open_quad() {
        let a = ambo(&open_quad()).unwrap();
        assert_eq!(a.num_faces(), 5);
        assert!(a.is_valid());
        let roles: Vec<Role> = a.faces().map(|(_, f)| f.role).collect();
        assert_eq!(roles[0], Role::Existing);
        assert!(roles[1..].iter().all(|&r| r == Role::New));
    }

    #[test]
    fn test_zip_cube() {
        let z = zip(&shapes::cube(), 0.3).unwrap();
        // Truncated octahedron: 6 squares and 8 hexagons.
        assert_eq!(z.num_vertices(), 24);
        assert_eq!(z.side_histogram().get(&4), Some(&6));
        assert_eq!(z.side_histogram().get(&6), Some(&8));
        assert_closed(&z);
    }
}
