//! Core polyhedron data structures.
//!
//! This module provides the half-edge arena [`ConwayPoly`] and the types it
//! is built from.
//!
//! # Overview
//!
//! A [`ConwayPoly`] stores arbitrary polygonal faces, open or closed, as
//! loops of half-edges. Each face and vertex carries a [`Role`], and each
//! face a set of [`Tag`]s, so that operators can colour and select the
//! elements they produce.
//!
//! # Index Types
//!
//! Records are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a vertex, and is its identity in edge keys
//! - [`HalfEdgeId`] - Identifies a half-edge
//! - [`FaceId`] - Identifies a face
//!
//! # Construction
//!
//! ```
//! use conway::mesh::{ConwayPoly, FlatPoly, Role};
//! use nalgebra::Point3;
//!
//! let flat = FlatPoly {
//!     positions: vec![
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(0.5, 0.0, 1.0),
//!     ],
//!     faces: vec![vec![0, 1, 2]],
//!     face_roles: vec![Role::New],
//!     vertex_roles: vec![Role::New; 3],
//!     face_tags: None,
//! };
//!
//! let poly = ConwayPoly::from_flat(&flat).unwrap();
//! assert_eq!(poly.num_faces(), 1);
//! ```

mod builder;
mod halfedge;
mod index;
mod meta;
mod topology;

pub(crate) use builder::{PointKey, PolyBuilder};
pub use builder::{FlatPoly, Seed, SeedFace, SeedPolicy};
pub use halfedge::{ConwayPoly, Face, FaceHalfEdgeIter, HalfEdge, Vertex};
pub use index::{undirected, DirectedKey, FaceId, HalfEdgeId, UndirectedKey, VertexId};
pub use meta::{extrovert, parse_tags, tags_match, Role, Tag, TagKind, TagSet};
