//! # Conway
//!
//! Polyhedra built and transformed with Conway operators on a half-edge mesh.
//!
//! A [`ConwayPoly`](mesh::ConwayPoly) stores arbitrary polygonal faces as
//! loops of half-edges. Every face and vertex carries a
//! [`Role`](mesh::Role) recording how an operator produced it, and every
//! face a set of tags, so operators can be chained and restricted to parts
//! of the surface.
//!
//! ## Features
//!
//! - **Half-edge arena**: type-safe ids, O(1) adjacency, open or closed meshes
//! - **Conway operators**: dual, ambo, kis, truncate, gyro, loft, lace, medial and more
//! - **Selection**: role, orientation, size and side-count selectors, plus face tags
//! - **Face edits**: removal, slicing, offsets, extrusion, hole filling, welding
//! - **Canonicalization**: planarize faces and make edges tangent to the unit sphere
//! - **Tilings**: eleven Archimedean patterns wrapped onto tori, Möbius strips and more
//!
//! ## Quick Start
//!
//! ```
//! use conway::prelude::*;
//!
//! let cube = shapes::cube();
//! let ambo = conway::algo::conway::ambo(&cube).unwrap();
//!
//! // The cuboctahedron: 8 triangles and 6 squares.
//! assert_eq!(ambo.num_vertices(), 12);
//! assert_eq!(ambo.num_faces(), 14);
//! assert_eq!(ambo.euler_characteristic(), 2);
//! ```
//!
//! ## Building Polyhedra From Arrays
//!
//! ```
//! use conway::prelude::*;
//! use nalgebra::Point3;
//!
//! let flat = FlatPoly {
//!     positions: vec![
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(0.5, 1.0, 0.0),
//!         Point3::new(0.5, 0.5, 1.0),
//!     ],
//!     faces: vec![vec![0, 2, 1], vec![0, 1, 3], vec![1, 2, 3], vec![2, 0, 3]],
//!     face_roles: vec![Role::Existing; 4],
//!     vertex_roles: vec![Role::Existing; 4],
//!     face_tags: None,
//! };
//!
//! let tetra = ConwayPoly::from_flat(&flat).unwrap();
//! assert_eq!(tetra.num_faces(), 4);
//! assert!(!tetra.has_naked());
//! ```
//!
//! ## Operator Chains
//!
//! ```
//! use conway::prelude::*;
//! use conway::algo::chain::{apply_chain, OpStep};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let steps: Vec<OpStep> = ["truncate:0.3", "kis:0.2", "canonicalize"]
//!     .iter()
//!     .map(|s| s.parse().unwrap())
//!     .collect();
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(1);
//! let poly = apply_chain(&shapes::cube(), &steps, Some(&mut rng), &Progress::none()).unwrap();
//! assert_eq!(poly.num_faces(), 8 * 3 + 6 * 8);
//! ```
//!
//! ## Selecting Faces
//!
//! ```
//! use conway::prelude::*;
//! use conway::algo::conway::{kis, KisOptions};
//!
//! let cube = shapes::cube();
//! let options = KisOptions::new(0.5).with_selector(Selector::FacingUp);
//! let spiked = kis(&cube, &options, &mut Jitter::none()).unwrap();
//!
//! // Only the top face is raised to an apex.
//! assert_eq!(spiked.num_faces(), 5 + 4);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod mesh;
pub mod shapes;
pub mod tiling;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use conway::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::{Jitter, Progress, Selector};
    pub use crate::error::{PolyError, Result};
    pub use crate::mesh::{
        parse_tags, ConwayPoly, FaceId, FlatPoly, HalfEdgeId, Role, Seed, SeedFace, SeedPolicy, TagSet,
        VertexId,
    };
    pub use crate::shapes;
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_platonic_solids() {
        for (name, v, f) in [
            ("tetrahedron", 4, 4),
            ("cube", 8, 6),
            ("octahedron", 6, 8),
            ("dodecahedron", 20, 12),
            ("icosahedron", 12, 20),
        ] {
            let poly = shapes::by_name(name).unwrap();
            assert_eq!(poly.num_vertices(), v, "{}", name);
            assert_eq!(poly.num_faces(), f, "{}", name);
            assert!(poly.is_valid());
            assert!(!poly.has_naked());
            assert_eq!(poly.euler_characteristic(), 2);
        }
    }
}
