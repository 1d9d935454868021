//! Index types for arena records.
//!
//! Every [`ConwayPoly`](super::ConwayPoly) is an arena: vertices, half-edges
//! and faces live in flat vectors and refer to each other by these
//! type-safe `u32` wrappers. A vertex id doubles as the vertex identity used
//! to build edge keys, so it is stable for the lifetime of an instance.

use std::fmt::{self, Debug};

/// A type-safe vertex index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexId(u32);

/// A type-safe half-edge index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct HalfEdgeId(u32);

/// A type-safe face index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FaceId(u32);

macro_rules! impl_index_type {
    ($name:ident, $display:literal) => {
        impl $name {
            /// Create a new index from a raw value.
            #[inline]
            pub fn new(index: usize) -> Self {
                debug_assert!(index < u32::MAX as usize, "index {} too large", index);
                Self(index as u32)
            }

            /// Get the raw index value.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $display, self.0)
            }
        }

        impl From<usize> for $name {
            fn from(v: usize) -> Self {
                Self::new(v)
            }
        }
    };
}

impl_index_type!(VertexId, "V");
impl_index_type!(HalfEdgeId, "HE");
impl_index_type!(FaceId, "F");

/// Directed edge key: `(tail, head)`.
pub type DirectedKey = (VertexId, VertexId);

/// Undirected edge key: the two endpoints sorted, so both half-edges of a
/// pair share it.
pub type UndirectedKey = (VertexId, VertexId);

/// Build the undirected key for an edge between `a` and `b`.
#[inline]
pub fn undirected(a: VertexId, b: VertexId) -> UndirectedKey {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
