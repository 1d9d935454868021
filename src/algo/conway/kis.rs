//! Kis family: operators that raise faces to apexes or split them through
//! their centres.

use crate::algo::{Jitter, Selector};
use crate::error::Result;
use crate::mesh::{ConwayPoly, PointKey, PolyBuilder, Role, TagSet};

use super::truncate::lerp;
use super::{edge_tags, paired_edges, ring_role, vertex_tags};

/// Options for [`kis`].
#[derive(Debug, Clone, Default)]
pub struct KisOptions {
    /// Apex height along the face normal.
    pub offset: f64,

    /// Faces to raise.
    pub selector: Selector,

    /// Tag filter; empty accepts every face.
    pub tags: TagSet,

    /// Multiply the offset by the face area.
    pub scale_by_area: bool,
}

impl KisOptions {
    /// Raise every face by `offset`.
    pub fn new(offset: f64) -> Self {
        Self {
            offset,
            ..Default::default()
        }
    }

    /// Restrict to the faces in `selector`.
    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selector = selector;
        self
    }

    /// Restrict to faces carrying one of `tags`.
    pub fn with_tags(mut self, tags: TagSet) -> Self {
        self.tags = tags;
        self
    }

    /// Scale apex heights by face area.
    pub fn with_scale_by_area(mut self, scale: bool) -> Self {
        self.scale_by_area = scale;
        self
    }
}

/// Kis: replace each selected face with a fan of triangles meeting at an
/// apex above its centroid. Unselected faces pass through as `Ignored`.
pub fn kis(poly: &ConwayPoly, options: &KisOptions, jitter: &mut Jitter<'_>) -> Result<ConwayPoly> {
    let mut b = PolyBuilder::new();

    for v in poly.vertex_ids() {
        b.vertex(PointKey::Vertex(v), *poly.position(v), Role::Existing);
    }

    for f in poly.face_ids() {
        let mut height = options.offset * jitter.factor();
        if options.scale_by_area {
            height *= poly.face_area(f);
        }
        let apex = poly.face_centroid(f) + poly.face_normal(f) * height;
        let apex = b.vertex(PointKey::Face(f), apex, Role::New);
        let tags = poly.face_tags(f);

        if poly.include_face(f, options.selector, &options.tags) {
            let sides = poly.face_sides(f);
            for (i, h) in poly.face_halfedges(f).enumerate() {
                let tail = b.at(PointKey::Vertex(poly.tail(h)));
                let head = b.at(PointKey::Vertex(poly.head(h)));
                b.face(vec![tail, head, apex], ring_role(i, sides), tags.clone());
            }
        } else {
            let loop_ = poly
                .face_vertices(f)
                .map(|v| b.at(PointKey::Vertex(v)))
                .collect();
            b.face(loop_, Role::Ignored, tags.clone());
        }
    }

    b.build(poly.pq())
}

/// Join: one quad per interior edge, spanning its two endpoints and the
/// centroids of the two faces beside it.
pub fn join(poly: &ConwayPoly, offset: f64) -> Result<ConwayPoly> {
    let mut b = PolyBuilder::new();
    originals(poly, &mut b, Role::New);
    centroids(poly, &mut b, offset, Role::New, &mut Jitter::none());

    for (h, p) in paired_edges(poly) {
        let loop_ = vec![
            b.at(PointKey::Face(poly.face_of(p))),
            b.at(PointKey::Vertex(poly.head(h))),
            b.at(PointKey::Face(poly.face_of(h))),
            b.at(PointKey::Vertex(poly.tail(h))),
        ];
        b.face(loop_, parity_role(h.index()), edge_tags(poly, h));
    }

    b.build(poly.pq())
}

/// Needle: the dual of truncate. One triangle per interior half-edge,
/// from its head to the centroids on either side.
pub fn needle(poly: &ConwayPoly, offset: f64, jitter: &mut Jitter<'_>) -> Result<ConwayPoly> {
    let mut b = PolyBuilder::new();
    originals(poly, &mut b, Role::Existing);
    centroids(poly, &mut b, offset, Role::New, jitter);

    for h in poly.halfedge_ids() {
        let Some(p) = poly.pair(h) else {
            continue;
        };
        let loop_ = vec![
            b.at(PointKey::Face(poly.face_of(p))),
            b.at(PointKey::Vertex(poly.head(h))),
            b.at(PointKey::Face(poly.face_of(h))),
        ];
        b.face(loop_, parity_role(h.index()), edge_tags(poly, h));
    }

    b.build(poly.pq())
}

/// Meta: split each face into two triangles per edge, through the centroid
/// and the edge midpoint. Original vertices move by `vertex_offset` along
/// their normals; centroids by `offset` along the face normal.
pub fn meta(
    poly: &ConwayPoly,
    offset: f64,
    vertex_offset: f64,
    jitter: &mut Jitter<'_>,
) -> Result<ConwayPoly> {
    let mut b = PolyBuilder::new();
    for v in poly.vertex_ids() {
        let pos = poly.position(v) + poly.vertex_normal(v) * vertex_offset;
        b.vertex(PointKey::Vertex(v), pos, Role::Existing);
    }
    centroids(poly, &mut b, offset, Role::Existing, jitter);

    for f in poly.face_ids() {
        let c = b.at(PointKey::Face(f));
        let tags = poly.face_tags(f);
        for h in poly.face_halfedges(f) {
            let mid = b.vertex(PointKey::Edge(poly.undirected_key(h)), poly.midpoint(h), Role::New);
            let head = b.at(PointKey::Vertex(poly.head(h)));
            let tail = b.at(PointKey::Vertex(poly.tail(h)));
            b.face(vec![c, mid, head], Role::New, tags.clone());
            b.face(vec![c, tail, mid], Role::NewAlt, tags.clone());
        }
    }

    b.build(poly.pq())
}

/// Join-kis-kis: two triangles per face edge around a raised centroid, plus
/// a rhombus across each interior edge.
pub fn join_kis_kis(poly: &ConwayPoly, ratio: f64, offset: f64) -> Result<ConwayPoly> {
    let mut b = PolyBuilder::new();
    originals(poly, &mut b, Role::Existing);
    centroids(poly, &mut b, offset, Role::Existing, &mut Jitter::none());

    for f in poly.face_ids() {
        let centroid = poly.face_centroid(f);
        let lift = poly.face_normal(f) * offset;
        let c = b.at(PointKey::Face(f));
        let tags = poly.face_tags(f);
        for h in poly.face_halfedges(f) {
            let inner = lerp(&poly.midpoint(h), &centroid, ratio) + lift;
            let inner = b.vertex(PointKey::HalfEdge(h), inner, Role::New);
            let head = b.at(PointKey::Vertex(poly.head(h)));
            let tail = b.at(PointKey::Vertex(poly.tail(h)));
            b.face(vec![c, inner, head], Role::New, tags.clone());
            b.face(vec![inner, c, tail], Role::NewAlt, tags.clone());
        }
    }

    for (h, p) in paired_edges(poly) {
        let loop_ = vec![
            b.at(PointKey::Vertex(poly.tail(h))),
            b.at(PointKey::HalfEdge(p)),
            b.at(PointKey::Vertex(poly.head(h))),
            b.at(PointKey::HalfEdge(h)),
        ];
        b.face(loop_, Role::Existing, edge_tags(poly, h));
    }

    b.build(poly.pq())
}

/// Subdivide: each face shrinks to the polygon of its edge midpoints and
/// each corner becomes a triangle. Original vertices move by `offset`
/// along their normals.
pub fn subdivide(poly: &ConwayPoly, offset: f64) -> Result<ConwayPoly> {
    let mut b = PolyBuilder::new();
    for v in poly.vertex_ids() {
        let pos = poly.position(v) + poly.vertex_normal(v) * offset;
        b.vertex(PointKey::Vertex(v), pos, Role::Existing);
    }
    for h in poly.halfedge_ids() {
        b.vertex(PointKey::Edge(poly.undirected_key(h)), poly.midpoint(h), Role::New);
    }
    let mid = |b: &PolyBuilder, h| b.at(PointKey::Edge(poly.undirected_key(h)));

    for f in poly.face_ids() {
        let loop_ = poly.face_halfedges(f).map(|h| mid(&b, h)).collect();
        b.face(loop_, Role::Existing, poly.face_tags(f).clone());
    }

    for v in poly.vertex_ids() {
        let tags = vertex_tags(poly, v);
        let corner = b.at(PointKey::Vertex(v));
        for h in poly.vertex_halfedges(v) {
            let loop_ = vec![corner, mid(&b, poly.next(h)), mid(&b, h)];
            b.face(loop_, Role::New, tags.clone());
        }
    }

    b.build(poly.pq())
}

/// Cross: each face becomes a ring of quads around its centroid, with two
/// triangles filling each edge. `amount` in `[-1, 1]` places the inner
/// corners between the centroid and the original corners.
pub fn cross(poly: &ConwayPoly, amount: f64) -> Result<ConwayPoly> {
    let a = amount * 0.5 + 0.5;
    let mut b = PolyBuilder::new();
    originals(poly, &mut b, Role::Existing);
    centroids(poly, &mut b, 0.0, Role::Existing, &mut Jitter::none());

    for f in poly.face_ids() {
        let centroid = poly.face_centroid(f);
        for h in poly.face_halfedges(f) {
            let head = poly.position(poly.head(h));
            b.vertex(PointKey::HalfEdge(h), centroid - (centroid - head) * a, Role::NewAlt);
            b.vertex(PointKey::Edge(poly.undirected_key(h)), poly.midpoint(h), Role::New);
        }
    }

    for f in poly.face_ids() {
        let c = b.at(PointKey::Face(f));
        let tags = poly.face_tags(f);
        for (j, h) in poly.face_halfedges(f).enumerate() {
            let inner = b.at(PointKey::HalfEdge(h));
            let prev_inner = b.at(PointKey::HalfEdge(poly.prev(h)));
            let mid = b.at(PointKey::Edge(poly.undirected_key(h)));
            let head = b.at(PointKey::Vertex(poly.head(h)));
            let tail = b.at(PointKey::Vertex(poly.tail(h)));
            let quad_role = if j % 2 == 0 { Role::Existing } else { Role::ExistingAlt };
            b.face(vec![prev_inner, mid, inner, c], quad_role, tags.clone());
            b.face(vec![inner, mid, head], Role::New, tags.clone());
            b.face(vec![prev_inner, tail, mid], Role::NewAlt, tags.clone());
        }
    }

    b.build(poly.pq())
}

/// Squall: shrink each face toward its centroid by `amount / 2` and join
/// the copies through edge midpoints. With `join`, the faces around each
/// original vertex merge into one and the original vertices disappear.
pub fn squall(poly: &ConwayPoly, amount: f64, join: bool) -> Result<ConwayPoly> {
    let mut b = PolyBuilder::new();
    if !join {
        originals(poly, &mut b, Role::Existing);
    }

    for f in poly.face_ids() {
        let centroid = poly.face_centroid(f);
        for h in poly.face_halfedges(f) {
            let v = poly.head(h);
            b.vertex(
                PointKey::Corner(f, v),
                lerp(&centroid, poly.position(v), amount / 2.0),
                Role::NewAlt,
            );
            b.vertex(PointKey::Edge(poly.undirected_key(h)), poly.midpoint(h), Role::New);
        }
    }
    let mid = |b: &PolyBuilder, h| b.at(PointKey::Edge(poly.undirected_key(h)));

    for f in poly.face_ids() {
        let tags = poly.face_tags(f);
        let mut inner_face = Vec::new();
        for h in poly.face_halfedges(f) {
            let inner_head = b.at(PointKey::Corner(f, poly.head(h)));
            let inner_tail = b.at(PointKey::Corner(f, poly.tail(h)));
            b.face(vec![inner_tail, mid(&b, h), inner_head], Role::New, tags.clone());
            if !join {
                let loop_ = vec![
                    mid(&b, poly.next(h)),
                    inner_head,
                    mid(&b, h),
                    b.at(PointKey::Vertex(poly.head(h))),
                ];
                b.face(loop_, Role::NewAlt, tags.clone());
            }
            inner_face.push(inner_head);
        }
        b.face(inner_face, Role::Existing, tags.clone());
    }

    if join {
        for v in poly.vertex_ids() {
            let mut loop_ = Vec::new();
            for h in poly.vertex_halfedges(v) {
                loop_.push(b.at(PointKey::Corner(poly.face_of(h), v)));
                loop_.push(mid(&b, h));
            }
            if !loop_.is_empty() {
                b.face(loop_, Role::NewAlt, vertex_tags(poly, v));
            }
        }
    }

    b.build(poly.pq())
}

fn originals(poly: &ConwayPoly, b: &mut PolyBuilder, role: Role) {
    for v in poly.vertex_ids() {
        b.vertex(PointKey::Vertex(v), *poly.position(v), role);
    }
}

fn centroids(poly: &ConwayPoly, b: &mut PolyBuilder, offset: f64, role: Role, jitter: &mut Jitter<'_>) {
    for f in poly.face_ids() {
        let pos = poly.face_centroid(f) + poly.face_normal(f) * (offset * jitter.factor());
        b.vertex(PointKey::Face(f), pos, role);
    }
}

fn parity_role(i: usize) -> Role {
    if i % 2 == 0 {
        Role::New
    } else {
        Role::NewAlt
    }
}
