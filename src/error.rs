//! Error types for conway.
//!
//! Topological add failures (a duplicate directed edge) are not errors: they
//! are reported through `Option` by [`ConwayPoly::add_face`](crate::mesh::ConwayPoly::add_face)
//! and handled by the caller. The variants here cover construction-time
//! contract violations and bad operator parameters.

use thiserror::Error;

/// Result type alias using [`PolyError`].
pub type Result<T> = std::result::Result<T, PolyError>;

/// Errors that can occur while building or transforming a polyhedron.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PolyError {
    /// A seed or polyhedron that needs faces has none.
    #[error("polyhedron has no faces")]
    EmptyMesh,

    /// The per-face role array does not match the face array.
    #[error("{roles} face roles supplied for {faces} faces")]
    RoleCountMismatch {
        /// Number of face loops.
        faces: usize,
        /// Number of face roles.
        roles: usize,
    },

    /// The per-vertex role array does not match the position array.
    #[error("{roles} vertex roles supplied for {vertices} vertices")]
    VertexRoleCountMismatch {
        /// Number of vertex positions.
        vertices: usize,
        /// Number of vertex roles.
        roles: usize,
    },

    /// The per-face tag array does not match the face array.
    #[error("{tags} tag sets supplied for {faces} faces")]
    TagCountMismatch {
        /// Number of face loops.
        faces: usize,
        /// Number of tag sets.
        tags: usize,
    },

    /// A face references a vertex index outside the position array.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face loop has fewer than three corners.
    #[error("face {face} has only {count} vertices")]
    TooFewVertices {
        /// The face index.
        face: usize,
        /// Number of corners in the loop.
        count: usize,
    },

    /// A seed face could not be added in either winding (strict mode only).
    #[error("seed face {face} duplicates an existing directed edge in both windings")]
    FaceRejected {
        /// The seed face index.
        face: usize,
    },

    /// Unknown tiling pattern id.
    #[error("unknown tiling pattern {0}")]
    UnknownPattern(u8),

    /// Unknown tiling surface id.
    #[error("unknown grid shape {0}")]
    UnknownShape(u8),

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl PolyError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        PolyError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let e = PolyError::RoleCountMismatch { faces: 6, roles: 5 };
        assert_eq!(e.to_string(), "5 face roles supplied for 6 faces");

        let e = PolyError::invalid_param("rows", 0, "must be positive");
        assert_eq!(e.to_string(), "invalid parameter: rows = 0 (must be positive)");
        assert_eq!(PolyError::EmptyMesh.to_string(), "polyhedron has no faces");
    }
}
