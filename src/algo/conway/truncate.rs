//! Truncation family: operators that cut corners or edges.

use nalgebra::Point3;

use crate::algo::{Jitter, Selector};
use crate::error::Result;
use crate::mesh::{ConwayPoly, FaceId, HalfEdgeId, PointKey, PolyBuilder, Role};

use super::{dual, edge_tags, paired_edges, ring_role, vertex_tags};

/// Cut the selected vertices off at `amount` along each incident edge.
///
/// An amount of 0 cuts at the vertex itself and 0.5 at the edge midpoint.
/// Each selected vertex draws its own jitter factor. Faces keep their
/// unselected corners; each selected interior vertex becomes a new face.
pub fn truncate(
    poly: &ConwayPoly,
    amount: f64,
    selector: Selector,
    jitter: &mut Jitter<'_>,
) -> Result<ConwayPoly> {
    let mut b = PolyBuilder::new();
    let mut amounts: Vec<Option<f64>> = vec![None; poly.num_vertices()];

    for v in poly.vertex_ids() {
        if poly.include_vertex(v, selector) {
            let amt = amount * jitter.factor();
            amounts[v.index()] = Some(amt);
            for h in poly.vertex_halfedges(v) {
                b.vertex(PointKey::HalfEdge(h), poly.point_along(h, amt), Role::New);
            }
        } else {
            b.vertex(PointKey::Vertex(v), *poly.position(v), Role::Ignored);
        }
    }

    for f in poly.face_ids() {
        let mut loop_ = Vec::new();
        for h in poly.face_halfedges(f) {
            let v = poly.head(h);
            let Some(amt) = amounts[v.index()] else {
                loop_.push(b.at(PointKey::Vertex(v)));
                continue;
            };
            loop_.push(b.at(PointKey::HalfEdge(h)));
            let next = poly.next(h);
            match poly.pair(next) {
                Some(p) => loop_.push(b.at(PointKey::HalfEdge(p))),
                None => loop_.push(b.vertex(
                    PointKey::Far(next),
                    poly.point_along(next, 1.0 - amt),
                    Role::New,
                )),
            }
        }
        if loop_.len() >= 3 {
            b.face(loop_, Role::Existing, poly.face_tags(f).clone());
        }
    }

    for v in poly.vertex_ids() {
        if amounts[v.index()].is_none() {
            continue;
        }
        let ring = poly.vertex_halfedges(v);
        if ring.len() < 3 || ring.iter().any(|&h| poly.is_naked(h)) {
            continue;
        }
        let loop_ = ring.iter().map(|&h| b.at(PointKey::HalfEdge(h))).collect();
        b.face(loop_, Role::New, vertex_tags(poly, v));
    }

    b.build(poly.pq())
}

/// Bevel with the usual proportions: `bevel_with(amount, amount / 2, 0)`.
pub fn bevel(poly: &ConwayPoly, amount: f64, jitter: &mut Jitter<'_>) -> Result<ConwayPoly> {
    bevel_with(poly, amount, amount * 0.5, 0.0, jitter)
}

/// Bevel (truncated ambo): cut both corners and edges.
///
/// Each face edge gets two points, at `p` and `1 - p` from its head, pulled
/// toward the centroid by `q` and lifted by `offset`. With a random source
/// both proportions are redrawn per edge from `[0.5, 1]`.
pub fn bevel_with(
    poly: &ConwayPoly,
    p: f64,
    q: f64,
    offset: f64,
    jitter: &mut Jitter<'_>,
) -> Result<ConwayPoly> {
    let mut b = PolyBuilder::new();

    for f in poly.face_ids() {
        let c = poly.face_centroid(f);
        let lift = poly.face_normal(f) * offset;
        let mut loop_ = Vec::new();
        for h in poly.face_halfedges(f) {
            let (p, q) = if jitter.is_random() {
                (1.0 - jitter.factor() / 2.0, 1.0 - jitter.factor() / 2.0)
            } else {
                (p, q)
            };
            let l = lerp(&poly.point_along(h, p), &c, q) + lift;
            let r = lerp(&poly.point_along(h, 1.0 - p), &c, q) + lift;
            let li = b.vertex(PointKey::HalfEdge(h), l, Role::New);
            let ri = b.vertex(PointKey::Far(h), r, Role::New);
            loop_.push(ri);
            loop_.push(li);
        }
        b.face(loop_, Role::Existing, poly.face_tags(f).clone());
    }

    let left = |b: &PolyBuilder, h| b.at(PointKey::HalfEdge(h));
    let right = |b: &PolyBuilder, h| b.at(PointKey::Far(h));

    for v in poly.vertex_ids() {
        let ring = poly.vertex_halfedges(v);
        let mut loop_ = Vec::with_capacity(ring.len() * 2);
        let mut closed = !ring.is_empty();
        for &h in &ring {
            let Some(p) = poly.pair(h) else {
                closed = false;
                break;
            };
            loop_.push(left(&b, h));
            loop_.push(right(&b, p));
        }
        if closed {
            b.face(loop_, Role::New, vertex_tags(poly, v));
        }
    }

    for (h, p) in paired_edges(poly) {
        let loop_ = vec![left(&b, h), right(&b, h), left(&b, p), right(&b, p)];
        b.face(loop_, Role::NewAlt, edge_tags(poly, h));
    }

    b.build(poly.pq())
}

/// Expand (cantellate): pull every face in toward its centroid by `ratio`
/// and fill the gaps with one quad per edge and one face per vertex.
pub fn expand(poly: &ConwayPoly, ratio: f64) -> Result<ConwayPoly> {
    let mut b = PolyBuilder::new();

    for f in poly.face_ids() {
        inset_face(poly, &mut b, f, ratio, Role::Existing);
    }
    let ins = |b: &PolyBuilder, h| b.at(PointKey::HalfEdge(h));

    for (h, p) in paired_edges(poly) {
        let loop_ = vec![
            ins(&b, h),
            ins(&b, poly.prev(h)),
            ins(&b, p),
            ins(&b, poly.prev(p)),
        ];
        b.face(loop_, Role::New, edge_tags(poly, h));
    }

    for v in poly.vertex_ids() {
        let ring = poly.vertex_halfedges(v);
        if ring.len() >= 3 {
            let loop_ = ring.iter().map(|&h| ins(&b, h)).collect();
            b.face(loop_, Role::NewAlt, vertex_tags(poly, v));
        }
    }

    b.build(poly.pq())
}

/// Chamfer: shrink faces by `ratio` and replace each edge with a hexagon.
///
/// The original vertices are then pushed along their normals onto the
/// plane of the new hexagon, so each hexagon is flat.
pub fn chamfer(poly: &ConwayPoly, ratio: f64) -> Result<ConwayPoly> {
    let mut moved: Vec<Point3<f64>> = poly.positions();
    for (h, p) in paired_edges(poly) {
        let a = inset_point(poly, h, ratio);
        let plane_n = (inset_point(poly, poly.prev(h), ratio) - a)
            .cross(&(inset_point(poly, p, ratio) - a));
        for v in [poly.head(h), poly.tail(h)] {
            if let Some(hit) = ray_plane(poly.position(v), &poly.vertex_normal(v), &a, &plane_n) {
                moved[v.index()] = hit;
            }
        }
    }

    let mut b = PolyBuilder::new();
    for v in poly.vertex_ids() {
        b.vertex(PointKey::Vertex(v), moved[v.index()], Role::Existing);
    }
    for f in poly.face_ids() {
        inset_face(poly, &mut b, f, ratio, Role::New);
    }
    let ins = |b: &PolyBuilder, h| b.at(PointKey::HalfEdge(h));
    let orig = |b: &PolyBuilder, v| b.at(PointKey::Vertex(v));

    for (h, p) in paired_edges(poly) {
        let loop_ = vec![
            orig(&b, poly.head(h)),
            ins(&b, h),
            ins(&b, poly.prev(h)),
            orig(&b, poly.tail(h)),
            ins(&b, p),
            ins(&b, poly.prev(p)),
        ];
        b.face(loop_, Role::New, edge_tags(poly, h));
    }

    b.build(poly.pq())
}

/// Ortho: split each face into quads, one per corner, meeting at the
/// centroid lifted by `offset`. Original vertices sink by the same offset.
pub fn ortho(poly: &ConwayPoly, offset: f64, jitter: &mut Jitter<'_>) -> Result<ConwayPoly> {
    let mut b = PolyBuilder::new();

    for f in poly.face_ids() {
        let off = offset * jitter.factor();
        let c = b.add_vertex(poly.face_centroid(f) + poly.face_normal(f) * off, Role::New);
        let sides = poly.face_sides(f);
        let tags = poly.face_tags(f);

        for (j, h) in poly.face_halfedges(f).enumerate() {
            let v = poly.head(h);
            let seed = b.vertex(
                PointKey::Vertex(v),
                poly.position(v) - poly.vertex_normal(v) * off,
                Role::Existing,
            );
            let mid = b.vertex(PointKey::Edge(poly.undirected_key(h)), poly.midpoint(h), Role::NewAlt);
            let next = poly.next(h);
            let next_mid =
                b.vertex(PointKey::Edge(poly.undirected_key(next)), poly.midpoint(next), Role::NewAlt);
            b.face(vec![c, mid, seed, next_mid], ring_role(j, sides), tags.clone());
        }
    }

    b.build(poly.pq())
}

/// Gyro: split each face into pentagons, one per corner, spiralling out
/// from the centroid. Edge points sit at `ratio` from each end.
pub fn gyro(
    poly: &ConwayPoly,
    ratio: f64,
    offset: f64,
    jitter: &mut Jitter<'_>,
) -> Result<ConwayPoly> {
    let mut b = PolyBuilder::new();

    for f in poly.face_ids() {
        let off = offset * jitter.factor();
        let c = b.add_vertex(poly.face_centroid(f) + poly.face_normal(f) * off, Role::New);
        let sides = poly.face_sides(f);
        let tags = poly.face_tags(f);

        for (j, h) in poly.face_halfedges(f).enumerate() {
            let v = poly.head(h);
            let seed = b.vertex(
                PointKey::Vertex(v),
                poly.position(v) - poly.vertex_normal(v) * off,
                Role::Existing,
            );
            let third = b.vertex(PointKey::HalfEdge(h), poly.point_along(h, ratio), Role::NewAlt);
            let pair_third = far_third(poly, &mut b, h, ratio, Role::NewAlt);
            let prev_third = far_third(poly, &mut b, poly.next(h), ratio, Role::NewAlt);
            b.face(
                vec![c, pair_third, third, seed, prev_third],
                ring_role(j, sides),
                tags.clone(),
            );
        }
    }

    b.build(poly.pq())
}

/// Propeller: twist a ring of quads around a shrunken copy of each face.
pub fn propeller(poly: &ConwayPoly, ratio: f64) -> Result<ConwayPoly> {
    let r = 1.0 - ratio;
    let mut b = PolyBuilder::new();

    for v in poly.vertex_ids() {
        b.vertex(PointKey::Vertex(v), *poly.position(v), Role::Existing);
    }
    for h in poly.halfedge_ids() {
        b.vertex(PointKey::HalfEdge(h), poly.point_along(h, r), Role::New);
    }

    for f in poly.face_ids() {
        let sides = poly.face_sides(f);
        let tags = poly.face_tags(f);
        let mut central = Vec::with_capacity(sides);
        for (i, h) in poly.face_halfedges(f).enumerate() {
            let next = poly.next(h);
            let a = b.at(PointKey::HalfEdge(next));
            let nb = far_third(poly, &mut b, next, r, Role::New);
            let pb = far_third(poly, &mut b, h, r, Role::New);
            let v = b.at(PointKey::Vertex(poly.head(h)));
            b.face(vec![a, nb, pb, v], ring_role(i, sides), tags.clone());
            central.push(pb);
        }
        b.face(central, Role::Existing, tags.clone());
    }

    b.build(poly.pq())
}

/// Whirl: a ring of hexagons around a rotated, shrunken copy of each face.
pub fn whirl(poly: &ConwayPoly, ratio: f64) -> Result<ConwayPoly> {
    let mut b = PolyBuilder::new();

    for v in poly.vertex_ids() {
        b.vertex(PointKey::Vertex(v), *poly.position(v), Role::Existing);
    }
    for h in poly.halfedge_ids() {
        b.vertex(PointKey::HalfEdge(h), poly.point_along(h, ratio), Role::New);
    }
    for f in poly.face_ids() {
        let c = poly.face_centroid(f);
        for h in poly.face_halfedges(f) {
            let on_edge = poly.point_along(h, ratio);
            let direction = (c - poly.midpoint(h)) * 2.0;
            let inner = lerp(&on_edge, &(on_edge + direction), ratio);
            b.vertex(PointKey::Inner(h), inner, Role::NewAlt);
        }
    }

    for f in poly.face_ids() {
        let sides = poly.face_sides(f);
        let tags = poly.face_tags(f);
        let mut central = Vec::with_capacity(sides);
        for (i, h) in poly.face_halfedges(f).enumerate() {
            let next = poly.next(h);
            let corner = far_third(poly, &mut b, next, ratio, Role::New);
            let inner = b.at(PointKey::Inner(h));
            let hexagon = vec![
                b.at(PointKey::Vertex(poly.head(h))),
                corner,
                b.at(PointKey::HalfEdge(next)),
                b.at(PointKey::Inner(next)),
                inner,
                b.at(PointKey::HalfEdge(h)),
            ];
            b.face(hexagon, ring_role(i, sides), tags.clone());
            central.push(inner);
        }
        b.face(central, Role::Existing, tags.clone());
    }

    b.build(poly.pq())
}

/// Volute: the dual of [`whirl`].
pub fn volute(poly: &ConwayPoly, ratio: f64) -> Result<ConwayPoly> {
    dual(&whirl(poly, ratio)?)
}

/// Insert the inset corners of face `f`, keyed by the half-edge whose head
/// they shrink toward the centroid, and emit the inset face.
fn inset_face(poly: &ConwayPoly, b: &mut PolyBuilder, f: FaceId, ratio: f64, vertex_role: Role) {
    let loop_ = poly
        .face_halfedges(f)
        .map(|h| b.vertex(PointKey::HalfEdge(h), inset_point(poly, h, ratio), vertex_role))
        .collect();
    b.face(loop_, Role::Existing, poly.face_tags(f).clone());
}

fn inset_point(poly: &ConwayPoly, h: HalfEdgeId, ratio: f64) -> Point3<f64> {
    lerp(poly.position(poly.head(h)), &poly.face_centroid(poly.face_of(h)), ratio)
}

/// The point at `ratio` from the tail of `h`: owned by the pair when there
/// is one, otherwise by `h` itself.
fn far_third(poly: &ConwayPoly, b: &mut PolyBuilder, h: HalfEdgeId, ratio: f64, role: Role) -> usize {
    match poly.pair(h) {
        Some(p) => b.vertex(PointKey::HalfEdge(p), poly.point_along(p, ratio), role),
        None => b.vertex(PointKey::Far(h), poly.point_along(h, 1.0 - ratio), role),
    }
}

#[inline]
pub(crate) fn lerp(a: &Point3<f64>, b: &Point3<f64>, t: f64) -> Point3<f64> {
    a + (b - a) * t
}

/// Signed intersection of the ray `origin + t * dir` with the plane through
/// `point` with normal `normal`; `None` when they are parallel.
fn ray_plane(
    origin: &Point3<f64>,
    dir: &nalgebra::Vector3<f64>,
    point: &Point3<f64>,
    normal: &nalgebra::Vector3<f64>,
) -> Option<Point3<f64>> {
    let denom = dir.dot(normal);
    if denom.abs() < 1e-12 {
        return None;
    }
    let t = (point - origin).dot(normal) / denom;
    Some(origin + dir * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::conway::fixtures::{assert_closed, open_quad};
    use crate::algo::weld::weld;
    use crate::shapes;

    #[test]
    fn test_truncate_cube() {
        let t = truncate(&shapes::cube(), 0.25, Selector::All, &mut Jitter::none()).unwrap();
        assert_eq!(t.num_vertices(), 24);
        assert_eq!(t.side_histogram().get(&8), Some(&6));
        assert_eq!(t.side_histogram().get(&3), Some(&8));
        assert_closed(&t);
    }

    #[test]
    fn test_truncate_selected_only() {
        let cube = shapes::cube();
        let t = truncate(&cube, 0.25, Selector::OnlyFirst, &mut Jitter::none()).unwrap();
        assert_eq!(t.num_faces(), 7);
        assert_eq!(t.num_vertices(), 7 + 3);
        assert_eq!(t.vertices().filter(|(_, v)| v.role == Role::Ignored).count(), 7);
        assert_closed(&t);
    }

    #[test]
    fn test_truncate_zero_welds_back() {
        let cube = shapes::cube();
        let t = truncate(&cube, 0.0, Selector::All, &mut Jitter::none()).unwrap();
        let w = weld(&t, 1e-4).unwrap();
        assert_eq!(w.num_vertices(), 8);
        assert_eq!(w.num_faces(), 6);
        assert_eq!(w.side_histogram(), cube.side_histogram());
    }

    #[test]
    fn test_truncate_open_quad_keeps_cut_corners() {
        let t = truncate(&open_quad(), 0.25, Selector::All, &mut Jitter::none()).unwrap();
        assert_eq!(t.num_faces(), 1);
        assert_eq!(t.face_sides(FaceId::new(0)), 8);
    }

    #[test]
    fn test_bevel_cube() {
        let bv = bevel(&shapes::cube(), 0.3, &mut Jitter::none()).unwrap();
        // Truncated cuboctahedron: 12 squares, 8 hexagons, 6 octagons.
        assert_eq!(bv.num_vertices(), 48);
        assert_eq!(bv.side_histogram().get(&4), Some(&12));
        assert_eq!(bv.side_histogram().get(&6), Some(&8));
        assert_eq!(bv.side_histogram().get(&8), Some(&6));
        assert_closed(&bv);
    }

    #[test]
    fn test_expand_cube() {
        let e = expand(&shapes::cube(), 0.3).unwrap();
        // Rhombicuboctahedron: 18 squares, 8 triangles.
        assert_eq!(e.num_vertices(), 24);
        assert_eq!(e.side_histogram().get(&4), Some(&18));
        assert_eq!(e.side_histogram().get(&3), Some(&8));
        assert_closed(&e);
    }

    #[test]
    fn test_chamfer_cube() {
        let c = chamfer(&shapes::cube(), 0.3).unwrap();
        assert_eq!(c.num_vertices(), 8 + 24);
        assert_eq!(c.side_histogram().get(&6), Some(&12));
        assert_eq!(c.side_histogram().get(&4), Some(&6));
        assert_closed(&c);
    }

    #[test]
    fn test_ortho_cube() {
        let o = ortho(&shapes::cube(), 0.0, &mut Jitter::none()).unwrap();
        assert_eq!(o.num_faces(), 24);
        assert_eq!(o.num_vertices(), 6 + 8 + 12);
        assert_closed(&o);
        let roles: Vec<Role> = o.faces().map(|(_, f)| f.role).take(4).collect();
        assert_eq!(roles, vec![Role::New, Role::NewAlt, Role::New, Role::NewAlt]);
    }

    #[test]
    fn test_gyro_cube() {
        let g = gyro(&shapes::cube(), 1.0 / 3.0, 0.0, &mut Jitter::none()).unwrap();
        // Pentagonal icositetrahedron.
        assert_eq!(g.num_faces(), 24);
        assert_eq!(g.side_histogram().get(&5), Some(&24));
        assert_eq!(g.num_vertices(), 6 + 8 + 24);
        assert_closed(&g);
    }

    #[test]
    fn test_propeller_and_whirl_cube() {
        let p = propeller(&shapes::cube(), 1.0 / 3.0).unwrap();
        assert_eq!(p.num_faces(), 6 + 24);
        assert_closed(&p);

        let w = whirl(&shapes::cube(), 1.0 / 3.0).unwrap();
        assert_eq!(w.num_faces(), 6 + 24);
        assert_eq!(w.side_histogram().get(&6), Some(&24));
        assert_closed(&w);
    }

    #[test]
    fn test_volute_is_dual_of_whirl() {
        let v = volute(&shapes::tetrahedron(), 1.0 / 3.0).unwrap();
        let w = whirl(&shapes::tetrahedron(), 1.0 / 3.0).unwrap();
        assert_eq!(v.num_faces(), w.num_vertices());
        assert_closed(&v);
    }

    #[test]
    fn test_ray_plane_signed() {
        let hit = ray_plane(
            &Point3::new(0.0, 0.0, 0.0),
            &nalgebra::Vector3::new(0.0, 1.0, 0.0),
            &Point3::new(0.0, -2.0, 0.0),
            &nalgebra::Vector3::new(0.0, 1.0, 0.0),
        )
        .unwrap();
        assert!((hit.y + 2.0).abs() < 1e-12);
        assert!(ray_plane(
            &Point3::origin(),
            &nalgebra::Vector3::x(),
            &Point3::origin(),
            &nalgebra::Vector3::y()
        )
        .is_none());
    }
}
