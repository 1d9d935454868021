//! Operators and passes over [`ConwayPoly`](crate::mesh::ConwayPoly).
//!
//! - **Conway operators** ([`conway`]): dual, truncation, kis, inset and
//!   medial families
//! - **Transforms** ([`transform`]): rigid moves, per-face and per-vertex
//!   edits, mirrored and stacked copies
//! - **Face edits** ([`faces`]): removal, slicing, offsets and extrusion
//! - **Repair** ([`boundary`], [`weld`]): hole filling and vertex merging
//! - **Canonicalization** ([`canonicalize`]): planarize and edge-tangent
//!   relaxation
//! - **Chains** ([`chain`]): ordered lists of configured operators
//!
//! Elements are picked with a [`Selector`] and an optional tag filter;
//! randomizable operators draw from a [`Jitter`].

pub mod boundary;
pub mod canonicalize;
pub mod chain;
pub mod conway;
pub mod faces;
pub mod jitter;
pub mod progress;
pub mod select;
pub mod spatial_hash;
pub mod transform;
pub mod weld;

pub use jitter::Jitter;
pub use progress::Progress;
pub use select::Selector;
