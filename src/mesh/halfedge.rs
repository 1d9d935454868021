//! Half-edge polyhedron arena.
//!
//! This module provides the records and the [`ConwayPoly`] aggregate that owns
//! them. Unlike a triangle-only half-edge mesh, faces here are arbitrary
//! polygons and meshes may be open.
//!
//! # Structure
//!
//! - Each face is a cycle of **half-edges** linked by `next`/`prev`
//! - A half-edge stores its **head** vertex; its tail is `prev`'s head
//! - Two half-edges with reversed endpoints are **pairs**; a half-edge with
//!   no pair lies on the boundary ("naked")
//! - Each vertex stores one **incoming** half-edge (one whose head it is)
//! - Each face stores one half-edge of its loop; the loop starts there
//!
//! Role and tag metadata live on the records themselves, so structural edits
//! cannot misalign them.

use std::collections::HashMap;

use nalgebra::{Point3, Vector3};

use super::index::{undirected, DirectedKey, FaceId, HalfEdgeId, UndirectedKey, VertexId};
use super::meta::{Role, TagSet};

/// A vertex of the polyhedron.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// One half-edge whose head is this vertex, if any face uses it.
    pub halfedge: Option<HalfEdgeId>,

    /// Lineage role.
    pub role: Role,
}

impl Vertex {
    /// Create an unconnected vertex.
    pub fn new(position: Point3<f64>, role: Role) -> Self {
        Self {
            position,
            halfedge: None,
            role,
        }
    }
}

/// A directed edge inside one face loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfEdge {
    /// The vertex this half-edge points to.
    pub vertex: VertexId,

    /// The next half-edge around the face.
    pub next: HalfEdgeId,

    /// The previous half-edge around the face.
    pub prev: HalfEdgeId,

    /// The opposite half-edge on the neighbouring face, if any.
    pub pair: Option<HalfEdgeId>,

    /// The face this half-edge belongs to.
    pub face: FaceId,
}

/// A polygonal face.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    /// First half-edge of the loop.
    pub halfedge: HalfEdgeId,

    /// Lineage role.
    pub role: Role,

    /// User tags.
    pub tags: TagSet,
}

/// A polyhedron stored as a half-edge arena.
///
/// Operators read a `ConwayPoly` and return a new one; only the helpers
/// documented as in-place mutate the receiver. Cloning is a flat copy.
#[derive(Debug, Clone, Default)]
pub struct ConwayPoly {
    /// All vertices.
    pub(crate) vertices: Vec<Vertex>,

    /// All half-edges.
    pub(crate) halfedges: Vec<HalfEdge>,

    /// All faces.
    pub(crate) faces: Vec<Face>,

    /// Directed key to half-edge.
    pub(crate) edges: HashMap<DirectedKey, HalfEdgeId>,

    /// Schläfli pair of the seed this polyhedron descends from.
    pub(crate) pq: (usize, usize),
}

impl ConwayPoly {
    /// Create an empty polyhedron.
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Accessors ====================

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of half-edges.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Get the number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Number of undirected edges: each pair counts once, each naked half-edge once.
    pub fn num_edges(&self) -> usize {
        let paired = self.halfedges.iter().filter(|h| h.pair.is_some()).count();
        let naked = self.halfedges.len() - paired;
        paired / 2 + naked
    }

    /// Get a vertex by ID.
    #[inline]
    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.index()]
    }

    /// Get a half-edge by ID.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId) -> &HalfEdge {
        &self.halfedges[id.index()]
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, id: FaceId) -> &Face {
        &self.faces[id.index()]
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId) -> &Point3<f64> {
        &self.vertex(v).position
    }

    /// Set the position of a vertex.
    #[inline]
    pub fn set_position(&mut self, v: VertexId, pos: Point3<f64>) {
        self.vertices[v.index()].position = pos;
    }

    /// Replace every vertex position, in place. Extra positions are ignored.
    pub fn set_vertex_positions(&mut self, positions: &[Point3<f64>]) {
        for (v, p) in self.vertices.iter_mut().zip(positions) {
            v.position = *p;
        }
    }

    /// Role of a face.
    #[inline]
    pub fn face_role(&self, f: FaceId) -> Role {
        self.face(f).role
    }

    /// Role of a vertex.
    #[inline]
    pub fn vertex_role(&self, v: VertexId) -> Role {
        self.vertex(v).role
    }

    /// Tags of a face.
    #[inline]
    pub fn face_tags(&self, f: FaceId) -> &TagSet {
        &self.face(f).tags
    }

    /// Overwrite the role of a face.
    pub fn set_face_role(&mut self, f: FaceId, role: Role) {
        self.faces[f.index()].role = role;
    }

    /// Overwrite the role of a vertex.
    pub fn set_vertex_role(&mut self, v: VertexId, role: Role) {
        self.vertices[v.index()].role = role;
    }

    /// Mutable access to the tags of a face.
    pub fn face_tags_mut(&mut self, f: FaceId) -> &mut TagSet {
        &mut self.faces[f.index()].tags
    }

    /// The base Schläfli pair used by the P/Q-sided selectors.
    #[inline]
    pub fn pq(&self) -> (usize, usize) {
        self.pq
    }

    /// Set the base Schläfli pair.
    pub fn set_pq(&mut self, pq: (usize, usize)) {
        self.pq = pq;
    }

    // ==================== Topology Queries ====================

    /// Get the next half-edge around the face.
    #[inline]
    pub fn next(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.halfedge(he).next
    }

    /// Get the previous half-edge around the face.
    #[inline]
    pub fn prev(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.halfedge(he).prev
    }

    /// Get the opposite half-edge, if paired.
    #[inline]
    pub fn pair(&self, he: HalfEdgeId) -> Option<HalfEdgeId> {
        self.halfedge(he).pair
    }

    /// The vertex a half-edge points to.
    #[inline]
    pub fn head(&self, he: HalfEdgeId) -> VertexId {
        self.halfedge(he).vertex
    }

    /// The vertex a half-edge starts from.
    #[inline]
    pub fn tail(&self, he: HalfEdgeId) -> VertexId {
        self.head(self.prev(he))
    }

    /// Get the face of a half-edge.
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId) -> FaceId {
        self.halfedge(he).face
    }

    /// `(tail, head)` of a half-edge.
    #[inline]
    pub fn directed_key(&self, he: HalfEdgeId) -> DirectedKey {
        (self.tail(he), self.head(he))
    }

    /// Sorted endpoints of a half-edge; shared with its pair.
    #[inline]
    pub fn undirected_key(&self, he: HalfEdgeId) -> UndirectedKey {
        undirected(self.tail(he), self.head(he))
    }

    /// Look up the half-edge running from `tail` to `head`.
    #[inline]
    pub fn find_halfedge(&self, tail: VertexId, head: VertexId) -> Option<HalfEdgeId> {
        self.edges.get(&(tail, head)).copied()
    }

    /// Check if a half-edge has no pair.
    #[inline]
    pub fn is_naked(&self, he: HalfEdgeId) -> bool {
        self.pair(he).is_none()
    }

    /// Check if any half-edge of a face is naked.
    pub fn is_boundary_face(&self, f: FaceId) -> bool {
        self.face_halfedges(f).any(|he| self.is_naked(he))
    }

    /// Check if a vertex touches the boundary (or no face at all).
    pub fn is_boundary_vertex(&self, v: VertexId) -> bool {
        let ring = self.vertex_halfedges(v);
        ring.is_empty() || ring.iter().any(|&h| self.is_naked(h) || self.is_naked(self.next(h)))
    }

    // ==================== Iteration ====================

    /// Iterate over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        (0..self.vertices.len()).map(VertexId::new)
    }

    /// Iterate over all vertices with their IDs.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (VertexId::new(i), v))
    }

    /// Iterate over all half-edge IDs.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId> + '_ {
        (0..self.halfedges.len()).map(HalfEdgeId::new)
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        (0..self.faces.len()).map(FaceId::new)
    }

    /// Iterate over all faces with their IDs.
    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &Face)> + '_ {
        self.faces
            .iter()
            .enumerate()
            .map(|(i, f)| (FaceId::new(i), f))
    }

    /// All vertex positions, in id order.
    pub fn positions(&self) -> Vec<Point3<f64>> {
        self.vertices.iter().map(|v| v.position).collect()
    }

    /// Iterate over the half-edges of a face, starting at its first half-edge.
    pub fn face_halfedges(&self, f: FaceId) -> FaceHalfEdgeIter<'_> {
        FaceHalfEdgeIter::new(self, f)
    }

    /// Iterate over the corner vertices of a face, in loop order.
    pub fn face_vertices(&self, f: FaceId) -> impl Iterator<Item = VertexId> + '_ {
        self.face_halfedges(f).map(|he| self.head(he))
    }

    /// Number of sides of a face.
    pub fn face_sides(&self, f: FaceId) -> usize {
        self.face_halfedges(f).count()
    }

    /// Incoming half-edges of a vertex in rotational order.
    ///
    /// The ring is built by stepping `h -> pair(h).prev`. If the walk hits a
    /// naked half-edge, the other side is collected with `h -> next(h).pair`
    /// from the seed, reversed, and spliced in front, so that for a boundary
    /// vertex `next(ring[0])` and `ring.last()` are both naked.
    pub fn vertex_halfedges(&self, v: VertexId) -> Vec<HalfEdgeId> {
        let Some(start) = self.vertex(v).halfedge else {
            return Vec::new();
        };
        let cap = self.halfedges.len();

        let mut ring = vec![start];
        let mut closed = false;
        let mut h = start;
        while let Some(p) = self.pair(h) {
            h = self.prev(p);
            if h == start {
                closed = true;
                break;
            }
            if ring.len() >= cap {
                break;
            }
            ring.push(h);
        }

        if !closed {
            let mut back = Vec::new();
            let mut e = start;
            while let Some(p) = self.pair(self.next(e)) {
                if p == start || back.len() >= cap {
                    break;
                }
                e = p;
                back.push(e);
            }
            back.reverse();
            back.extend(ring);
            ring = back;
        }
        ring
    }

    /// Faces around a vertex, parallel to [`vertex_halfedges`](Self::vertex_halfedges).
    pub fn vertex_faces(&self, v: VertexId) -> Vec<FaceId> {
        self.vertex_halfedges(v)
            .into_iter()
            .map(|h| self.face_of(h))
            .collect()
    }

    /// Number of half-edges in the vertex ring.
    pub fn vertex_degree(&self, v: VertexId) -> usize {
        self.vertex_halfedges(v).len()
    }

    // ==================== Geometry ====================

    /// `head - tail` of a half-edge.
    pub fn halfedge_vector(&self, he: HalfEdgeId) -> Vector3<f64> {
        self.position(self.head(he)) - self.position(self.tail(he))
    }

    /// Midpoint of a half-edge.
    pub fn midpoint(&self, he: HalfEdgeId) -> Point3<f64> {
        nalgebra::center(self.position(self.head(he)), self.position(self.tail(he)))
    }

    /// Point at fraction `t` from the head toward the tail.
    pub fn point_along(&self, he: HalfEdgeId, t: f64) -> Point3<f64> {
        let head = self.position(self.head(he));
        let tail = self.position(self.tail(he));
        head + (tail - head) * t
    }

    /// Mean of the corner positions of a face.
    pub fn face_centroid(&self, f: FaceId) -> Point3<f64> {
        let mut sum = Vector3::zeros();
        let mut n = 0usize;
        for v in self.face_vertices(f) {
            sum += self.position(v).coords;
            n += 1;
        }
        if n == 0 {
            return Point3::origin();
        }
        Point3::from(sum / n as f64)
    }

    /// Unit normal of a face, from the cross products of consecutive corners
    /// about the centroid. Zero for degenerate faces.
    pub fn face_normal(&self, f: FaceId) -> Vector3<f64> {
        let c = self.face_centroid(f);
        let pts: Vec<Point3<f64>> = self.face_vertices(f).map(|v| *self.position(v)).collect();
        let mut sum = Vector3::zeros();
        for i in 0..pts.len() {
            let a = pts[i] - c;
            let b = pts[(i + 1) % pts.len()] - c;
            sum += a.cross(&b);
        }
        sum.try_normalize(1e-12).unwrap_or_else(Vector3::zeros)
    }

    /// Area of a face: exact for triangles, a centroid fan otherwise.
    pub fn face_area(&self, f: FaceId) -> f64 {
        let pts: Vec<Point3<f64>> = self.face_vertices(f).map(|v| *self.position(v)).collect();
        if pts.len() == 3 {
            return 0.5 * (pts[1] - pts[0]).cross(&(pts[2] - pts[0])).norm();
        }
        let c = self.face_centroid(f);
        (0..pts.len())
            .map(|i| 0.5 * (pts[i] - c).cross(&(pts[(i + 1) % pts.len()] - c)).norm())
            .sum()
    }

    /// Normalised sum of the normals of the faces around a vertex.
    pub fn vertex_normal(&self, v: VertexId) -> Vector3<f64> {
        let sum: Vector3<f64> = self
            .vertex_faces(v)
            .into_iter()
            .map(|f| self.face_normal(f))
            .sum();
        sum.try_normalize(1e-12).unwrap_or_else(Vector3::zeros)
    }

    /// Mean vertex position.
    pub fn centroid(&self) -> Point3<f64> {
        if self.vertices.is_empty() {
            return Point3::origin();
        }
        let sum: Vector3<f64> = self.vertices.iter().map(|v| v.position.coords).sum();
        Point3::from(sum / self.vertices.len() as f64)
    }

    /// Compute the bounding box of the polyhedron.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.vertices.first()?.position;
        let mut min = first;
        let mut max = first;
        for v in &self.vertices {
            for i in 0..3 {
                min[i] = min[i].min(v.position[i]);
                max[i] = max[i].max(v.position[i]);
            }
        }
        Some((min, max))
    }

    /// Compute the total surface area.
    pub fn surface_area(&self) -> f64 {
        self.face_ids().map(|f| self.face_area(f)).sum()
    }

    /// Histogram of face side counts, keyed by side count.
    pub fn side_histogram(&self) -> std::collections::BTreeMap<usize, usize> {
        let mut hist = std::collections::BTreeMap::new();
        for f in self.face_ids() {
            *hist.entry(self.face_sides(f)).or_insert(0) += 1;
        }
        hist
    }

    /// `V - E + F`.
    pub fn euler_characteristic(&self) -> i64 {
        self.num_vertices() as i64 - self.num_edges() as i64 + self.num_faces() as i64
    }

    // ==================== Validation ====================

    /// Check that every link in the arena is consistent.
    pub fn is_valid(&self) -> bool {
        for (vid, v) in self.vertices() {
            if let Some(he) = v.halfedge {
                if he.index() >= self.halfedges.len() || self.head(he) != vid {
                    return false;
                }
            }
        }

        for (i, he) in self.halfedges.iter().enumerate() {
            let id = HalfEdgeId::new(i);
            if self.halfedge(he.next).prev != id || self.halfedge(he.prev).next != id {
                return false;
            }
            if self.halfedge(he.next).face != he.face {
                return false;
            }
            if let Some(p) = he.pair {
                if self.pair(p) != Some(id)
                    || self.head(p) != self.tail(id)
                    || self.tail(p) != self.head(id)
                {
                    return false;
                }
            }
            if self.edges.get(&self.directed_key(id)) != Some(&id) {
                return false;
            }
        }

        for (fid, f) in self.faces() {
            if f.halfedge.index() >= self.halfedges.len() || self.face_of(f.halfedge) != fid {
                return false;
            }
        }

        self.edges.len() == self.halfedges.len()
    }
}

/// Iterator over half-edges around a face.
pub struct FaceHalfEdgeIter<'a> {
    poly: &'a ConwayPoly,
    start: HalfEdgeId,
    current: HalfEdgeId,
    remaining: usize,
}

impl<'a> FaceHalfEdgeIter<'a> {
    fn new(poly: &'a ConwayPoly, f: FaceId) -> Self {
        let start = poly.face(f).halfedge;
        Self {
            poly,
            start,
            current: start,
            // Guard against a corrupted loop.
            remaining: poly.halfedges.len(),
        }
    }
}

impl<'a> Iterator for FaceHalfEdgeIter<'a> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let result = self.current;
        self.current = self.poly.next(self.current);
        self.remaining = if self.current == self.start {
            0
        } else {
            self.remaining - 1
        };
        Some(result)
    }
}
