//! Structural edits on the half-edge arena.
//!
//! These are the low-level primitives every operator is built from:
//! inserting a face loop, pairing half-edges, removing a face, fan
//! triangulation and culling unreferenced vertices. Bulk insertions leave
//! `pair` unset; call [`ConwayPoly::match_pairs`] before relying on it.

use std::collections::HashMap;

use nalgebra::Point3;

use super::halfedge::{ConwayPoly, Face, HalfEdge, Vertex};
use super::index::{FaceId, HalfEdgeId, VertexId};
use super::meta::{Role, TagSet};

impl ConwayPoly {
    /// Add a new vertex and return its ID.
    pub fn add_vertex(&mut self, position: Point3<f64>, role: Role) -> VertexId {
        let id = VertexId::new(self.vertices.len());
        self.vertices.push(Vertex::new(position, role));
        id
    }

    /// Add a face with role `New` and no tags. See [`add_face_with`](Self::add_face_with).
    pub fn add_face(&mut self, corners: &[VertexId]) -> Option<FaceId> {
        self.add_face_with(corners, Role::New, TagSet::new())
    }

    /// Add a face over `corners` (at least three, in winding order).
    ///
    /// Returns `None`, leaving the arena untouched, if the loop is too short,
    /// repeats a directed edge, or any of its directed edges already exists.
    /// Pairs are not updated.
    pub fn add_face_with(
        &mut self,
        corners: &[VertexId],
        role: Role,
        tags: TagSet,
    ) -> Option<FaceId> {
        let n = corners.len();
        if n < 3 {
            return None;
        }

        let keys: Vec<_> = (0..n).map(|i| (corners[(i + n - 1) % n], corners[i])).collect();
        for (i, key) in keys.iter().enumerate() {
            if key.0 == key.1 || self.edges.contains_key(key) || keys[..i].contains(key) {
                return None;
            }
        }

        let face = FaceId::new(self.faces.len());
        let base = self.halfedges.len();
        for (i, key) in keys.iter().enumerate() {
            let id = HalfEdgeId::new(base + i);
            self.halfedges.push(HalfEdge {
                vertex: key.1,
                next: HalfEdgeId::new(base + (i + 1) % n),
                prev: HalfEdgeId::new(base + (i + n - 1) % n),
                pair: None,
                face,
            });
            self.edges.insert(*key, id);
            let v = &mut self.vertices[key.1.index()];
            if v.halfedge.is_none() {
                v.halfedge = Some(id);
            }
        }
        self.faces.push(Face {
            halfedge: HalfEdgeId::new(base),
            role,
            tags,
        });
        Some(face)
    }

    /// Set every half-edge's pair to the half-edge with reversed endpoints.
    pub fn match_pairs(&mut self) {
        for i in 0..self.halfedges.len() {
            let (tail, head) = self.directed_key(HalfEdgeId::new(i));
            self.halfedges[i].pair = self.edges.get(&(head, tail)).copied();
        }
    }

    /// Remove a face and its half-edges.
    ///
    /// Neighbouring half-edges that were paired with the removed ones become
    /// naked and are returned (with ids valid after removal). Vertices left
    /// without any incident half-edge are removed.
    pub fn remove_face(&mut self, f: FaceId) -> Vec<HalfEdgeId> {
        let loop_hes: Vec<HalfEdgeId> = self.face_halfedges(f).collect();
        let mut keep_h = vec![true; self.halfedges.len()];
        for &h in &loop_hes {
            keep_h[h.index()] = false;
        }

        let mut holes = Vec::new();
        for &h in &loop_hes {
            if let Some(p) = self.pair(h) {
                self.halfedges[p.index()].pair = None;
                holes.push(p);
            }
        }

        // Repoint vertex back-references that pointed into the removed loop.
        let mut keep_v = vec![true; self.vertices.len()];
        for &h in &loop_hes {
            let v = self.head(h);
            let Some(current) = self.vertex(v).halfedge else {
                continue;
            };
            if keep_h[current.index()] {
                continue;
            }
            let replacement = self
                .pair(h)
                .map(|p| self.prev(p))
                .or_else(|| self.pair(self.next(h)))
                .filter(|r| keep_h[r.index()])
                .or_else(|| {
                    self.halfedge_ids()
                        .find(|r| keep_h[r.index()] && self.head(*r) == v)
                });
            self.vertices[v.index()].halfedge = replacement;
            if replacement.is_none() {
                keep_v[v.index()] = false;
            }
        }

        let mut keep_f = vec![true; self.faces.len()];
        keep_f[f.index()] = false;
        let (_, h_map) = self.compact(&keep_v, &keep_h, &keep_f);
        holes
            .into_iter()
            .filter_map(|h| h_map[h.index()])
            .collect()
    }

    /// Fan-triangulate a face from its first corner.
    ///
    /// Faces with three sides (or four when `protect_quads`) are left alone,
    /// as are faces whose diagonals would duplicate an existing edge. The
    /// original face id keeps the triangle containing its first half-edge;
    /// new triangles copy its role and tags. Returns the number of faces added.
    pub fn triangulate(&mut self, f: FaceId, protect_quads: bool) -> usize {
        let hs: Vec<HalfEdgeId> = self.face_halfedges(f).collect();
        let n = hs.len();
        if n <= 3 || (protect_quads && n <= 4) {
            return 0;
        }
        let vs: Vec<VertexId> = hs.iter().map(|&h| self.head(h)).collect();
        let v0 = vs[0];
        if (2..n - 1).any(|k| {
            self.edges.contains_key(&(v0, vs[k])) || self.edges.contains_key(&(vs[k], v0))
        }) {
            return 0;
        }

        let role = self.face(f).role;
        let tags = self.face(f).tags.clone();

        // a[k]: v0 -> v_k, b[k]: v_k -> v0, for k in 2..n-1.
        let mut a = vec![HalfEdgeId::new(0); n];
        let mut b = vec![HalfEdgeId::new(0); n];
        for k in 2..n - 1 {
            a[k] = self.push_halfedge(vs[k], f);
            b[k] = self.push_halfedge(v0, f);
            self.halfedges[a[k].index()].pair = Some(b[k]);
            self.halfedges[b[k].index()].pair = Some(a[k]);
            self.edges.insert((v0, vs[k]), a[k]);
            self.edges.insert((vs[k], v0), b[k]);
        }
        b[n - 1] = hs[0];

        let mut added = 0;
        for k in 1..n - 1 {
            let tri = if k == 1 {
                [hs[1], hs[2], b[2]]
            } else {
                [a[k], hs[k + 1], b[k + 1]]
            };
            let face = if k == n - 2 {
                f
            } else {
                added += 1;
                let id = FaceId::new(self.faces.len());
                self.faces.push(Face {
                    halfedge: tri[0],
                    role,
                    tags: tags.clone(),
                });
                id
            };
            for i in 0..3 {
                let h = &mut self.halfedges[tri[i].index()];
                h.next = tri[(i + 1) % 3];
                h.prev = tri[(i + 2) % 3];
                h.face = face;
            }
        }
        // The last triangle starts at hs[0] so the face keeps its first half-edge.
        self.faces[f.index()].halfedge = hs[0];
        added
    }

    /// Triangulate every face. Returns the number of faces added.
    pub fn triangulate_all(&mut self, protect_quads: bool) -> usize {
        let count = self.faces.len();
        (0..count)
            .map(|i| self.triangulate(FaceId::new(i), protect_quads))
            .sum()
    }

    /// Remove vertices that no face references. Returns how many were removed.
    pub fn cull_unused(&mut self) -> usize {
        let keep_v: Vec<bool> = self.vertices.iter().map(|v| v.halfedge.is_some()).collect();
        let removed = keep_v.iter().filter(|k| !**k).count();
        if removed > 0 {
            let keep_h = vec![true; self.halfedges.len()];
            let keep_f = vec![true; self.faces.len()];
            self.compact(&keep_v, &keep_h, &keep_f);
        }
        removed
    }

    fn push_halfedge(&mut self, vertex: VertexId, face: FaceId) -> HalfEdgeId {
        let id = HalfEdgeId::new(self.halfedges.len());
        self.halfedges.push(HalfEdge {
            vertex,
            next: id,
            prev: id,
            pair: None,
            face,
        });
        id
    }

    /// Drop unkept records and renumber the rest, preserving order.
    ///
    /// Kept half-edges must only link to kept records, except `pair`, which
    /// is cleared when its target goes. Returns the vertex and half-edge remaps.
    pub(crate) fn compact(
        &mut self,
        keep_v: &[bool],
        keep_h: &[bool],
        keep_f: &[bool],
    ) -> (Vec<Option<VertexId>>, Vec<Option<HalfEdgeId>>) {
        fn remap(keep: &[bool]) -> Vec<Option<usize>> {
            let mut next = 0;
            keep.iter()
                .map(|&k| {
                    k.then(|| {
                        next += 1;
                        next - 1
                    })
                })
                .collect()
        }
        let v_map: Vec<Option<VertexId>> =
            remap(keep_v).into_iter().map(|i| i.map(VertexId::new)).collect();
        let h_map: Vec<Option<HalfEdgeId>> =
            remap(keep_h).into_iter().map(|i| i.map(HalfEdgeId::new)).collect();
        let f_map: Vec<Option<FaceId>> =
            remap(keep_f).into_iter().map(|i| i.map(FaceId::new)).collect();

        let vertices = std::mem::take(&mut self.vertices);
        self.vertices = vertices
            .into_iter()
            .zip(keep_v)
            .filter(|(_, k)| **k)
            .map(|(mut v, _)| {
                v.halfedge = v.halfedge.and_then(|h| h_map[h.index()]);
                v
            })
            .collect();

        let halfedges = std::mem::take(&mut self.halfedges);
        let mut kept = Vec::with_capacity(halfedges.len());
        for (h, _) in halfedges.into_iter().zip(keep_h).filter(|(_, k)| **k) {
            let (Some(vertex), Some(next), Some(prev), Some(face)) = (
                v_map[h.vertex.index()],
                h_map[h.next.index()],
                h_map[h.prev.index()],
                f_map[h.face.index()],
            ) else {
                log::warn!("compaction dropped a half-edge linked to removed records");
                continue;
            };
            kept.push(HalfEdge {
                vertex,
                next,
                prev,
                pair: h.pair.and_then(|p| h_map[p.index()]),
                face,
            });
        }
        self.halfedges = kept;

        let faces = std::mem::take(&mut self.faces);
        self.faces = faces
            .into_iter()
            .zip(keep_f)
            .filter(|(_, k)| **k)
            .filter_map(|(mut f, _)| {
                f.halfedge = h_map[f.halfedge.index()]?;
                Some(f)
            })
            .collect();

        self.rebuild_edge_table();
        (v_map, h_map)
    }

    pub(crate) fn rebuild_edge_table(&mut self) {
        let mut edges = HashMap::with_capacity(self.halfedges.len());
        for i in 0..self.halfedges.len() {
            let id = HalfEdgeId::new(i);
            edges.insert(self.directed_key(id), id);
        }
        self.edges = edges;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes;

    fn square() -> (ConwayPoly, [VertexId; 4]) {
        let mut poly = ConwayPoly::new();
        let v = [
            poly.add_vertex(Point3::new(0.0, 0.0, 0.0), Role::Existing),
            poly.add_vertex(Point3::new(1.0, 0.0, 0.0), Role::Existing),
            poly.add_vertex(Point3::new(1.0, 0.0, 1.0), Role::Existing),
            poly.add_vertex(Point3::new(0.0, 0.0, 1.0), Role::Existing),
        ];
        (poly, v)
    }

    #[test]
    fn test_add_face_rejects_duplicate_directed_edge() {
        let (mut poly, v) = square();
        assert!(poly.add_face(&v).is_some());
        assert_eq!(poly.num_halfedges(), 4);

        // Same winding shares every directed key.
        assert!(poly.add_face(&v).is_none());
        assert_eq!(poly.num_halfedges(), 4);
        assert_eq!(poly.num_faces(), 1);

        // Reversed winding is fine.
        let rev: Vec<_> = v.iter().rev().copied().collect();
        assert!(poly.add_face(&rev).is_some());
        poly.match_pairs();
        assert!(poly.is_valid());
        assert!(poly.halfedge_ids().all(|h| poly.pair(h).is_some()));
    }

    #[test]
    fn test_add_face_too_short() {
        let (mut poly, v) = square();
        assert!(poly.add_face(&v[..2]).is_none());
        assert!(poly.add_face(&[v[0], v[1], v[1]]).is_none());
        assert_eq!(poly.num_halfedges(), 0);
    }

    #[test]
    fn test_face_loop_starts_at_first_corner() {
        let (mut poly, v) = square();
        let f = poly.add_face(&v).unwrap();
        let corners: Vec<_> = poly.face_vertices(f).collect();
        assert_eq!(corners, v.to_vec());
    }

    #[test]
    fn test_remove_face_opens_holes() {
        let mut cube = shapes::cube();
        let holes = cube.remove_face(FaceId::new(0));
        assert_eq!(holes.len(), 4);
        assert_eq!(cube.num_faces(), 5);
        assert_eq!(cube.num_vertices(), 8);
        assert!(holes.iter().all(|&h| cube.is_naked(h)));
        assert!(cube.is_valid());
    }

    #[test]
    fn test_remove_face_drops_orphan_vertices() {
        let (mut poly, v) = square();
        let f = poly.add_face(&v).unwrap();
        poly.match_pairs();
        let holes = poly.remove_face(f);
        assert!(holes.is_empty());
        assert_eq!(poly.num_vertices(), 0);
        assert_eq!(poly.num_halfedges(), 0);
        assert!(poly.is_valid());
    }

    #[test]
    fn test_triangulate_fan() {
        let mut poly = ConwayPoly::new();
        let v: Vec<_> = (0..6)
            .map(|i| {
                let a = i as f64 * std::f64::consts::TAU / 6.0;
                poly.add_vertex(Point3::new(a.cos(), 0.0, a.sin()), Role::Existing)
            })
            .collect();
        let f = poly.add_face_with(&v, Role::NewAlt, TagSet::new()).unwrap();
        poly.match_pairs();

        assert_eq!(poly.triangulate(f, false), 3);
        assert_eq!(poly.num_faces(), 4);
        assert!(poly.face_ids().all(|f| poly.face_sides(f) == 3));
        assert!(poly.face_ids().all(|f| poly.face_role(f) == Role::NewAlt));
        assert!(poly.face_ids().all(|f| poly.face_vertices(f).any(|c| c == v[0])));
        assert!(poly.is_valid());
        assert_eq!(poly.euler_characteristic(), 1);
    }

    #[test]
    fn test_triangulate_protects_quads() {
        let mut cube = shapes::cube();
        assert_eq!(cube.triangulate(FaceId::new(0), true), 0);
        assert_eq!(cube.triangulate(FaceId::new(0), false), 1);
        assert_eq!(cube.triangulate_all(false), 5);
        assert_eq!(cube.num_faces(), 12);
        assert!(cube.is_valid());
        assert_eq!(cube.euler_characteristic(), 2);
    }

    #[test]
    fn test_cull_unused() {
        let (mut poly, v) = square();
        poly.add_vertex(Point3::new(5.0, 5.0, 5.0), Role::New);
        poly.add_face(&v).unwrap();
        assert_eq!(poly.cull_unused(), 1);
        assert_eq!(poly.num_vertices(), 4);
        assert!(poly.is_valid());
    }
}
