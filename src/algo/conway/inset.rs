//! Inset family: operators that shrink faces inward and ring the inset
//! copies with new faces.

use nalgebra::Point3;

use crate::algo::{Jitter, Selector};
use crate::error::Result;
use crate::mesh::{ConwayPoly, FaceId, HalfEdgeId, PointKey, PolyBuilder, Role, TagSet};

use super::truncate::lerp;
use super::{edge_tags, paired_edges, ring_role};

/// Loft: inset each selected face by `ratio` toward its centroid, lift the
/// copy by `offset` along the face normal, and join it to the original
/// edges with quads. Unselected faces pass through as `Ignored`.
pub fn loft(
    poly: &ConwayPoly,
    ratio: f64,
    offset: f64,
    selector: Selector,
    tags: &TagSet,
    jitter: &mut Jitter<'_>,
) -> Result<ConwayPoly> {
    let mut b = PolyBuilder::new();
    originals(poly, &mut b);

    for f in poly.face_ids() {
        let face_tags = poly.face_tags(f);
        if !poly.include_face(f, selector, tags) {
            pass_through(poly, &mut b, f);
            continue;
        }

        let centroid = poly.face_centroid(f);
        let lift = poly.face_normal(f) * (offset * jitter.factor());
        let halfedges: Vec<HalfEdgeId> = poly.face_halfedges(f).collect();
        let sides = halfedges.len();
        let inset: Vec<usize> = halfedges
            .iter()
            .map(|&h| {
                let p = lerp(poly.position(poly.head(h)), &centroid, ratio) + lift;
                b.vertex(PointKey::HalfEdge(h), p, Role::New)
            })
            .collect();

        for i in 1..sides {
            let h = halfedges[i];
            let loop_ = vec![
                inset[i],
                inset[i - 1],
                b.at(PointKey::Vertex(poly.tail(h))),
                b.at(PointKey::Vertex(poly.head(h))),
            ];
            b.face(loop_, ring_role(i, sides), face_tags.clone());
        }
        let closing = vec![
            b.at(PointKey::Vertex(poly.head(halfedges[sides - 1]))),
            b.at(PointKey::Vertex(poly.head(halfedges[0]))),
            inset[0],
            inset[sides - 1],
        ];
        b.face(closing, Role::New, face_tags.clone());
        b.face(inset, Role::Existing, face_tags.clone());
    }

    b.build(poly.pq())
}

/// Quinto: each corner becomes a pentagon through the two adjacent edge
/// midpoints and two inset points, around an inset copy of the face.
/// Original vertices sink by `offset` along their normals.
pub fn quinto(poly: &ConwayPoly, ratio: f64, offset: f64, jitter: &mut Jitter<'_>) -> Result<ConwayPoly> {
    let mut b = PolyBuilder::new();
    for v in poly.vertex_ids() {
        let pos = poly.position(v) - poly.vertex_normal(v) * (offset * jitter.factor());
        b.vertex(PointKey::Vertex(v), pos, Role::Existing);
    }

    for f in poly.face_ids() {
        let face_tags = poly.face_tags(f);
        let halfedges: Vec<HalfEdgeId> = poly.face_halfedges(f).collect();
        let sides = halfedges.len();
        let inner = inner_points(poly, &mut b, f, ratio, offset * jitter.factor(), Role::NewAlt);
        let mids: Vec<usize> = halfedges
            .iter()
            .map(|&h| b.vertex(PointKey::Edge(poly.undirected_key(h)), poly.midpoint(h), Role::New))
            .collect();

        let pentagon = |b: &PolyBuilder, i: usize, prev: usize| {
            vec![
                inner[prev],
                mids[prev],
                b.at(PointKey::Vertex(poly.tail(halfedges[i]))),
                mids[i],
                inner[i],
            ]
        };
        for i in 1..sides {
            let loop_ = pentagon(&b, i, i - 1);
            b.face(loop_, ring_role(i, sides), face_tags.clone());
        }
        b.face(inner.clone(), Role::Existing, face_tags.clone());
        let closing = pentagon(&b, 0, sides - 1);
        b.face(closing, Role::New, face_tags.clone());
    }

    b.build(poly.pq())
}

/// Options for [`lace`].
#[derive(Debug, Clone)]
pub struct LaceOptions {
    /// Inset fraction from each edge midpoint toward the centroid.
    pub ratio: f64,

    /// Lift of the inset points along the face normal.
    pub offset: f64,

    /// Faces to lace.
    pub selector: Selector,

    /// Tag filter; empty accepts every face.
    pub tags: TagSet,
}

impl Default for LaceOptions {
    fn default() -> Self {
        Self {
            ratio: 0.5,
            offset: 0.0,
            selector: Selector::All,
            tags: TagSet::new(),
        }
    }
}

impl LaceOptions {
    pub fn new(ratio: f64) -> Self {
        Self {
            ratio,
            ..Default::default()
        }
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_tags(mut self, tags: TagSet) -> Self {
        self.tags = tags;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LaceJoin {
    None,
    Joined,
    Opposite,
}

/// Lace: ring an inset copy of each selected face with a large triangle per
/// corner and a small triangle per edge. Unselected faces pass through as
/// `Ignored`.
pub fn lace(poly: &ConwayPoly, options: &LaceOptions, jitter: &mut Jitter<'_>) -> Result<ConwayPoly> {
    lace_with(poly, options, LaceJoin::None, jitter)
}

/// Lace every face, replacing the small triangles with one rhombus across
/// each interior edge.
pub fn joined_lace(poly: &ConwayPoly, ratio: f64, offset: f64, jitter: &mut Jitter<'_>) -> Result<ConwayPoly> {
    let options = LaceOptions::new(ratio).with_offset(offset);
    lace_with(poly, &options, LaceJoin::Joined, jitter)
}

/// Lace every face, replacing the small triangles with two triangles
/// across each interior edge, split along the line between the inset
/// points.
pub fn opposite_lace(
    poly: &ConwayPoly,
    ratio: f64,
    offset: f64,
    jitter: &mut Jitter<'_>,
) -> Result<ConwayPoly> {
    let options = LaceOptions::new(ratio).with_offset(offset);
    lace_with(poly, &options, LaceJoin::Opposite, jitter)
}

fn lace_with(
    poly: &ConwayPoly,
    options: &LaceOptions,
    mode: LaceJoin,
    jitter: &mut Jitter<'_>,
) -> Result<ConwayPoly> {
    let mut b = PolyBuilder::new();
    originals(poly, &mut b);

    for f in poly.face_ids() {
        let face_tags = poly.face_tags(f);
        if mode == LaceJoin::None && !poly.include_face(f, options.selector, &options.tags) {
            pass_through(poly, &mut b, f);
            continue;
        }

        let inner = inner_points(poly, &mut b, f, options.ratio, options.offset * jitter.factor(), Role::New);
        let halfedges: Vec<HalfEdgeId> = poly.face_halfedges(f).collect();
        let sides = halfedges.len();
        for (i, &h) in halfedges.iter().enumerate() {
            let next = (i + 1) % sides;
            let head = b.at(PointKey::Vertex(poly.head(h)));
            b.face(vec![inner[next], inner[i], head], Role::NewAlt, face_tags.clone());
            if mode == LaceJoin::None {
                let tail = b.at(PointKey::Vertex(poly.tail(h)));
                b.face(vec![tail, head, inner[i]], Role::New, face_tags.clone());
            }
        }
        b.face(inner, Role::Existing, face_tags.clone());
    }

    if mode != LaceJoin::None {
        for (h, p) in paired_edges(poly) {
            let tail = b.at(PointKey::Vertex(poly.tail(h)));
            let head = b.at(PointKey::Vertex(poly.head(h)));
            let inner = b.at(PointKey::HalfEdge(h));
            let across = b.at(PointKey::HalfEdge(p));
            let tags = edge_tags(poly, h);
            match mode {
                LaceJoin::Joined => b.face(vec![tail, across, head, inner], Role::New, tags),
                _ => {
                    b.face(vec![tail, across, inner], Role::New, tags.clone());
                    b.face(vec![across, head, inner], Role::New, tags);
                }
            }
        }
    }

    b.build(poly.pq())
}

/// Stake: split each selected face into a ring of quads around its
/// centroid, with a triangle per edge. With `join`, every face is staked
/// and the edge triangles merge pairwise into quads.
pub fn stake(
    poly: &ConwayPoly,
    ratio: f64,
    selector: Selector,
    tags: &TagSet,
    join: bool,
) -> Result<ConwayPoly> {
    let mut b = PolyBuilder::new();
    originals(poly, &mut b);

    for f in poly.face_ids() {
        let face_tags = poly.face_tags(f);
        if !join && !poly.include_face(f, selector, tags) {
            pass_through(poly, &mut b, f);
            continue;
        }

        let c = b.vertex(PointKey::Face(f), poly.face_centroid(f), Role::New);
        let inner = inner_points(poly, &mut b, f, ratio, 0.0, Role::NewAlt);
        let halfedges: Vec<HalfEdgeId> = poly.face_halfedges(f).collect();
        let sides = halfedges.len();
        for (i, &h) in halfedges.iter().enumerate() {
            let head = b.at(PointKey::Vertex(poly.head(h)));
            if !join {
                let tail = b.at(PointKey::Vertex(poly.tail(h)));
                b.face(vec![inner[i], tail, head], ring_role(i, sides), face_tags.clone());
            }
            let next = inner[(i + 1) % sides];
            b.face(
                vec![head, next, c, inner[i]],
                Role::alternate_existing(i, sides),
                face_tags.clone(),
            );
        }
    }

    if join {
        for (h, p) in paired_edges(poly) {
            let loop_ = vec![
                b.at(PointKey::Vertex(poly.head(h))),
                b.at(PointKey::HalfEdge(h)),
                b.at(PointKey::Vertex(poly.head(p))),
                b.at(PointKey::HalfEdge(p)),
            ];
            b.face(loop_, Role::New, edge_tags(poly, h));
        }
    }

    b.build(poly.pq())
}

fn originals(poly: &ConwayPoly, b: &mut PolyBuilder) {
    for v in poly.vertex_ids() {
        b.vertex(PointKey::Vertex(v), *poly.position(v), Role::Existing);
    }
}

fn pass_through(poly: &ConwayPoly, b: &mut PolyBuilder, f: FaceId) {
    let loop_ = poly
        .face_vertices(f)
        .map(|v| b.at(PointKey::Vertex(v)))
        .collect();
    b.face(loop_, Role::Ignored, poly.face_tags(f).clone());
}

/// One point per half-edge of `f`, between its midpoint and the centroid,
/// keyed by the half-edge.
fn inner_points(
    poly: &ConwayPoly,
    b: &mut PolyBuilder,
    f: FaceId,
    ratio: f64,
    offset: f64,
    role: Role,
) -> Vec<usize> {
    let centroid = poly.face_centroid(f);
    let lift = poly.face_normal(f) * offset;
    poly.face_halfedges(f)
        .map(|h| {
            let p: Point3<f64> = lerp(&poly.midpoint(h), &centroid, ratio) + lift;
            b.vertex(PointKey::HalfEdge(h), p, role)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::conway::fixtures::{assert_closed, open_quad};
    use crate::mesh::parse_tags;
    use crate::shapes;

    #[test]
    fn test_loft_cube() {
        let l = loft(&shapes::cube(), 0.3, 0.1, Selector::All, &TagSet::new(), &mut Jitter::none()).unwrap();
        assert_eq!(l.num_faces(), 6 * 5);
        assert_eq!(l.num_vertices(), 8 + 24);
        assert_closed(&l);
        let inset = l.faces().filter(|(_, f)| f.role == Role::Existing).count();
        assert_eq!(inset, 6);
    }

    #[test]
    fn test_loft_selected_only() {
        let l = loft(
            &shapes::cube(),
            0.3,
            0.0,
            Selector::OnlyFirst,
            &TagSet::new(),
            &mut Jitter::none(),
        )
        .unwrap();
        assert_eq!(l.num_faces(), 5 + 5);
        assert_eq!(l.faces().filter(|(_, f)| f.role == Role::Ignored).count(), 5);
        assert_closed(&l);
    }

    #[test]
    fn test_loft_lifts_inset_face() {
        let quad = open_quad();
        let l = loft(&quad, 0.5, 1.0, Selector::All, &TagSet::new(), &mut Jitter::none()).unwrap();
        assert!(l.is_valid());
        let top = l
            .face_ids()
            .find(|&f| l.face_role(f) == Role::Existing)
            .unwrap();
        assert!(l.face_vertices(top).all(|v| (l.position(v).y - 1.0).abs() < 1e-12));
    }

    #[test]
    fn test_quinto_cube() {
        let q = quinto(&shapes::cube(), 0.5, 0.0, &mut Jitter::none()).unwrap();
        assert_eq!(q.num_faces(), 30);
        assert_eq!(q.side_histogram().get(&5), Some(&24));
        assert_eq!(q.num_vertices(), 8 + 12 + 24);
        assert_closed(&q);
    }

    #[test]
    fn test_lace_cube() {
        let l = lace(&shapes::cube(), &LaceOptions::new(0.5), &mut Jitter::none()).unwrap();
        assert_eq!(l.num_faces(), 54);
        assert_closed(&l);
    }

    #[test]
    fn test_lace_by_tag() {
        let mut cube = shapes::cube();
        cube.face_tags_mut(FaceId::new(3)).extend(parse_tags("side"));
        let opts = LaceOptions::new(0.5).with_tags(parse_tags("side"));
        let l = lace(&cube, &opts, &mut Jitter::none()).unwrap();
        assert_eq!(l.num_faces(), 5 + 9);
        assert_closed(&l);
    }

    #[test]
    fn test_joined_and_opposite_lace() {
        let j = joined_lace(&shapes::cube(), 0.5, 0.0, &mut Jitter::none()).unwrap();
        assert_eq!(j.num_faces(), 30 + 12);
        assert_closed(&j);

        let o = opposite_lace(&shapes::cube(), 0.5, 0.0, &mut Jitter::none()).unwrap();
        assert_eq!(o.num_faces(), 30 + 24);
        assert_closed(&o);
    }

    #[test]
    fn test_stake_cube() {
        let s = stake(&shapes::cube(), 0.5, Selector::All, &TagSet::new(), false).unwrap();
        assert_eq!(s.num_faces(), 48);
        assert_eq!(s.num_vertices(), 38);
        assert_closed(&s);

        let joined = stake(&shapes::cube(), 0.5, Selector::None, &TagSet::new(), true).unwrap();
        assert_eq!(joined.num_faces(), 24 + 12);
        assert_closed(&joined);
    }
}
