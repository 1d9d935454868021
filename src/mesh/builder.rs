//! Polyhedron construction and export.
//!
//! There are two ways in: from a [`Seed`] (vertex positions plus oriented
//! face loops, as produced by a uniform-polyhedron solver) and from a
//! [`FlatPoly`] (positions, loops and metadata arrays). The flat form is the
//! universal rebuild path: every operator assembles one through
//! [`PolyBuilder`] and hands it to [`ConwayPoly::from_flat`].

use std::collections::HashMap;

use log::{debug, warn};
use nalgebra::Point3;

use super::halfedge::ConwayPoly;
use super::index::{FaceId, HalfEdgeId, UndirectedKey, VertexId};
use super::meta::{Role, TagSet};
use crate::error::{PolyError, Result};

/// One face of a seed: an oriented vertex loop and a configuration tag.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedFace {
    /// Vertex indices in winding order.
    pub indices: Vec<usize>,
    /// Configuration tag; the initial face role is `Role::from_index(configuration)`.
    pub configuration: usize,
}

/// Bootstrap geometry for a polyhedron.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Seed {
    /// Vertex positions.
    pub positions: Vec<Point3<f64>>,
    /// Face loops.
    pub faces: Vec<SeedFace>,
    /// Schläfli pair `(p, q)`.
    pub pq: (usize, usize),
}

/// What to do when a seed face cannot be added in either winding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedPolicy {
    /// Fail with [`PolyError::FaceRejected`].
    Strict,
    /// Log a warning and skip the face.
    #[default]
    Lenient,
}

/// A polyhedron as plain arrays.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlatPoly {
    /// Vertex positions.
    pub positions: Vec<Point3<f64>>,
    /// Face loops as indices into `positions`.
    pub faces: Vec<Vec<usize>>,
    /// One role per face.
    pub face_roles: Vec<Role>,
    /// One role per vertex.
    pub vertex_roles: Vec<Role>,
    /// One tag set per face, if any.
    pub face_tags: Option<Vec<TagSet>>,
}

impl ConwayPoly {
    /// Build a polyhedron from seed geometry.
    ///
    /// Vertices are copied one to one with role `Existing`. A face whose
    /// directed edges clash with earlier faces is retried reversed; if that
    /// fails too, `policy` decides between an error and a skipped face. A
    /// seed without faces is rejected.
    pub fn from_seed(seed: &Seed, policy: SeedPolicy) -> Result<Self> {
        if seed.faces.is_empty() {
            return Err(PolyError::EmptyMesh);
        }
        let mut poly = ConwayPoly::new();
        for p in &seed.positions {
            poly.add_vertex(*p, Role::Existing);
        }

        for (fi, face) in seed.faces.iter().enumerate() {
            let mut corners = Vec::with_capacity(face.indices.len());
            for &vi in &face.indices {
                if vi >= seed.positions.len() {
                    return Err(PolyError::InvalidVertexIndex { face: fi, vertex: vi });
                }
                corners.push(VertexId::new(vi));
            }
            if corners.len() < 3 {
                return Err(PolyError::TooFewVertices {
                    face: fi,
                    count: corners.len(),
                });
            }

            let role = Role::from_index(face.configuration);
            if poly.add_face_with(&corners, role, TagSet::new()).is_some() {
                continue;
            }
            corners.reverse();
            if poly.add_face_with(&corners, role, TagSet::new()).is_some() {
                continue;
            }
            match policy {
                SeedPolicy::Strict => return Err(PolyError::FaceRejected { face: fi }),
                SeedPolicy::Lenient => warn!("skipping seed face {} (duplicate directed edge)", fi),
            }
        }

        poly.match_pairs();
        poly.pq = seed.pq;
        Ok(poly)
    }

    /// Build a polyhedron from flat arrays.
    ///
    /// Array lengths are validated up front. Each loop has cyclically repeated
    /// indices collapsed; loops left with fewer than three corners, or that
    /// clash with earlier faces in both windings, are skipped. Unreferenced
    /// vertices are culled and pairs matched.
    pub fn from_flat(flat: &FlatPoly) -> Result<Self> {
        let FlatPoly {
            positions,
            faces,
            face_roles,
            vertex_roles,
            face_tags,
        } = flat;

        if face_roles.len() != faces.len() {
            return Err(PolyError::RoleCountMismatch {
                faces: faces.len(),
                roles: face_roles.len(),
            });
        }
        if vertex_roles.len() != positions.len() {
            return Err(PolyError::VertexRoleCountMismatch {
                vertices: positions.len(),
                roles: vertex_roles.len(),
            });
        }
        if let Some(tags) = face_tags {
            if tags.len() != faces.len() {
                return Err(PolyError::TagCountMismatch {
                    faces: faces.len(),
                    tags: tags.len(),
                });
            }
        }
        for (fi, face) in faces.iter().enumerate() {
            if let Some(&vi) = face.iter().find(|&&vi| vi >= positions.len()) {
                return Err(PolyError::InvalidVertexIndex { face: fi, vertex: vi });
            }
        }

        let mut poly = ConwayPoly::new();
        for (p, role) in positions.iter().zip(vertex_roles) {
            poly.add_vertex(*p, *role);
        }

        for (fi, face) in faces.iter().enumerate() {
            let mut corners = normalize_loop(face);
            if corners.len() < 3 {
                debug!("dropping face {} with {} distinct corners", fi, corners.len());
                continue;
            }
            let tags = face_tags
                .as_ref()
                .map(|t| t[fi].clone())
                .unwrap_or_default();
            let role = face_roles[fi];
            if poly.add_face_with(&corners, role, tags.clone()).is_some() {
                continue;
            }
            corners.reverse();
            if poly.add_face_with(&corners, role, tags).is_none() {
                warn!("dropping face {} (duplicate directed edge in both windings)", fi);
            }
        }

        poly.cull_unused();
        poly.match_pairs();
        Ok(poly)
    }

    /// Export positions, loops and metadata by copy.
    pub fn to_flat(&self) -> FlatPoly {
        FlatPoly {
            positions: self.positions(),
            faces: self
                .face_ids()
                .map(|f| self.face_vertices(f).map(VertexId::index).collect())
                .collect(),
            face_roles: self.faces.iter().map(|f| f.role).collect(),
            vertex_roles: self.vertices.iter().map(|v| v.role).collect(),
            face_tags: Some(self.faces.iter().map(|f| f.tags.clone()).collect()),
        }
    }

    /// A copy of this polyhedron.
    pub fn duplicate(&self) -> Self {
        self.clone()
    }
}

/// Drop cyclically consecutive repeats from a loop.
fn normalize_loop(face: &[usize]) -> Vec<VertexId> {
    let mut out: Vec<usize> = Vec::with_capacity(face.len());
    for &i in face {
        if out.last() != Some(&i) {
            out.push(i);
        }
    }
    while out.len() > 1 && out.first() == out.last() {
        out.pop();
    }
    out.into_iter().map(VertexId::new).collect()
}

/// Identity of a derived vertex, used to share it between the faces that
/// reference it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum PointKey {
    /// An original vertex carried over.
    Vertex(VertexId),
    /// A point derived from a face, usually its centroid.
    Face(FaceId),
    /// A point on an undirected edge, usually its midpoint.
    Edge(UndirectedKey),
    /// A point owned by one half-edge.
    HalfEdge(HalfEdgeId),
    /// A second point owned by one half-edge.
    Far(HalfEdgeId),
    /// A third point owned by one half-edge.
    Inner(HalfEdgeId),
    /// A point owned by one corner of one face.
    Corner(FaceId, VertexId),
    /// The `k`th interior point of an edge, counted from its smaller endpoint.
    EdgePoint(UndirectedKey, usize),
}

/// Accumulates flat arrays for one operator result.
#[derive(Debug, Default)]
pub(crate) struct PolyBuilder {
    flat: FlatPoly,
    tags: Vec<TagSet>,
    lookup: HashMap<PointKey, usize>,
}

impl PolyBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Insert the vertex for `key`, or return the existing one.
    pub(crate) fn vertex(&mut self, key: PointKey, position: Point3<f64>, role: Role) -> usize {
        if let Some(&i) = self.lookup.get(&key) {
            return i;
        }
        let i = self.add_vertex(position, role);
        self.lookup.insert(key, i);
        i
    }

    /// Insert an unkeyed vertex.
    pub(crate) fn add_vertex(&mut self, position: Point3<f64>, role: Role) -> usize {
        self.flat.positions.push(position);
        self.flat.vertex_roles.push(role);
        self.flat.positions.len() - 1
    }

    pub(crate) fn get(&self, key: &PointKey) -> Option<usize> {
        self.lookup.get(key).copied()
    }

    /// Index of a vertex inserted earlier. Panics on an unknown key.
    pub(crate) fn at(&self, key: PointKey) -> usize {
        self.lookup[&key]
    }

    pub(crate) fn face(&mut self, indices: Vec<usize>, role: Role, tags: TagSet) {
        self.flat.faces.push(indices);
        self.flat.face_roles.push(role);
        self.tags.push(tags);
    }

    pub(crate) fn num_vertices(&self) -> usize {
        self.flat.positions.len()
    }

    pub(crate) fn build(mut self, pq: (usize, usize)) -> Result<ConwayPoly> {
        self.flat.face_tags = Some(self.tags);
        let mut poly = ConwayPoly::from_flat(&self.flat)?;
        poly.pq = pq;
        Ok(poly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::meta::parse_tags;
    use crate::shapes;

    fn quad_flat() -> FlatPoly {
        FlatPoly {
            positions: vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 1.0),
                Point3::new(0.0, 0.0, 1.0),
            ],
            faces: vec![vec![0, 1, 2, 3]],
            face_roles: vec![Role::New],
            vertex_roles: vec![Role::New; 4],
            face_tags: None,
        }
    }

    #[test]
    fn test_from_flat_single_quad() {
        let poly = ConwayPoly::from_flat(&quad_flat()).unwrap();
        assert_eq!(poly.num_vertices(), 4);
        assert_eq!(poly.num_faces(), 1);
        assert_eq!(poly.num_halfedges(), 4);
        assert!(poly.halfedge_ids().all(|h| poly.is_naked(h)));
        assert!(poly.is_valid());
    }

    #[test]
    fn test_role_count_mismatch() {
        let mut flat = quad_flat();
        flat.face_roles.clear();
        assert_eq!(
            ConwayPoly::from_flat(&flat).unwrap_err(),
            PolyError::RoleCountMismatch { faces: 1, roles: 0 }
        );
    }

    #[test]
    fn test_tag_count_mismatch() {
        let mut flat = quad_flat();
        flat.face_tags = Some(vec![TagSet::new(), TagSet::new()]);
        assert!(matches!(
            ConwayPoly::from_flat(&flat),
            Err(PolyError::TagCountMismatch { faces: 1, tags: 2 })
        ));
    }

    #[test]
    fn test_invalid_vertex_index() {
        let mut flat = quad_flat();
        flat.faces[0][2] = 9;
        assert_eq!(
            ConwayPoly::from_flat(&flat).unwrap_err(),
            PolyError::InvalidVertexIndex { face: 0, vertex: 9 }
        );
    }

    #[test]
    fn test_degenerate_loops_are_normalised() {
        let mut flat = quad_flat();
        flat.faces = vec![vec![0, 0, 1, 2, 3, 0], vec![1, 1, 2]];
        flat.face_roles = vec![Role::New, Role::NewAlt];
        let poly = ConwayPoly::from_flat(&flat).unwrap();
        assert_eq!(poly.num_faces(), 1);
        assert_eq!(poly.face_sides(FaceId::new(0)), 4);
    }

    #[test]
    fn test_clashing_face_is_reversed_then_dropped() {
        let mut flat = quad_flat();
        flat.faces = vec![vec![0, 1, 2, 3], vec![0, 1, 2, 3], vec![1, 2, 3, 0]];
        flat.face_roles = vec![Role::New, Role::NewAlt, Role::Ignored];
        let poly = ConwayPoly::from_flat(&flat).unwrap();
        // The copy goes in reversed; the rotated copy clashes both ways.
        assert_eq!(poly.num_faces(), 2);
        assert_eq!(poly.face_role(FaceId::new(1)), Role::NewAlt);
        assert!(poly.halfedge_ids().all(|h| !poly.is_naked(h)));
    }

    #[test]
    fn test_unused_vertices_culled() {
        let mut flat = quad_flat();
        flat.positions.push(Point3::new(9.0, 9.0, 9.0));
        flat.vertex_roles.push(Role::Ignored);
        let poly = ConwayPoly::from_flat(&flat).unwrap();
        assert_eq!(poly.num_vertices(), 4);
    }

    #[test]
    fn test_flat_roundtrip() {
        let mut cube = shapes::cube();
        cube.face_tags_mut(FaceId::new(2)).extend(parse_tags("lid"));
        let flat = cube.to_flat();
        let rebuilt = ConwayPoly::from_flat(&flat).unwrap();
        assert_eq!(rebuilt.to_flat(), flat);
    }

    #[test]
    fn test_seed_strict_and_lenient() {
        let seed = Seed {
            positions: quad_flat().positions,
            faces: vec![
                SeedFace { indices: vec![0, 1, 2, 3], configuration: 2 },
                SeedFace { indices: vec![0, 1, 2, 3], configuration: 3 },
                SeedFace { indices: vec![2, 3, 0, 1], configuration: 1 },
            ],
            pq: (4, 2),
        };
        assert_eq!(
            ConwayPoly::from_seed(&seed, SeedPolicy::Strict).unwrap_err(),
            PolyError::FaceRejected { face: 2 }
        );

        let poly = ConwayPoly::from_seed(&seed, SeedPolicy::Lenient).unwrap();
        assert_eq!(poly.num_faces(), 2);
        assert_eq!(poly.face_role(FaceId::new(0)), Role::New);
        assert_eq!(poly.face_role(FaceId::new(1)), Role::NewAlt);
        assert_eq!(poly.pq(), (4, 2));
        assert!(poly.vertices().all(|(_, v)| v.role == Role::Existing));
    }

    #[test]
    fn test_seed_without_faces() {
        let seed = Seed {
            positions: quad_flat().positions,
            faces: Vec::new(),
            pq: (4, 4),
        };
        assert_eq!(ConwayPoly::from_seed(&seed, SeedPolicy::Lenient).unwrap_err(), PolyError::EmptyMesh);
    }

    #[test]
    fn test_duplicate_preserves_structure() {
        let cube = shapes::cube();
        let copy = cube.duplicate();
        assert_eq!(copy.num_vertices(), cube.num_vertices());
        assert_eq!(copy.side_histogram(), cube.side_histogram());
        assert!((copy.centroid() - cube.centroid()).norm() < 1e-12);
    }

    #[test]
    fn test_builder_shares_keyed_vertices() {
        let mut b = PolyBuilder::new();
        let key = PointKey::Vertex(VertexId::new(3));
        let a = b.vertex(key, Point3::origin(), Role::New);
        let c = b.vertex(key, Point3::new(1.0, 0.0, 0.0), Role::NewAlt);
        assert_eq!(a, c);
        assert_eq!(b.num_vertices(), 1);
        assert_eq!(b.get(&key), Some(a));
    }
}
