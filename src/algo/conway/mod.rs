//! Conway operators.
//!
//! Every operator reads a [`ConwayPoly`] and returns a new one, rebuilt
//! through the flat constructor. New vertices are shared between the faces
//! that use them by keying them on the element they derive from (an
//! original vertex, a face, an undirected edge, a half-edge), so a vertex
//! created while walking one face is found again from its neighbour.
//!
//! # Families
//!
//! - **Dual** ([`dual`], [`add_dual`], [`zip`], [`ambo`]): swap or mix the
//!   roles of faces and vertices
//! - **Truncation** ([`truncate`], [`bevel`], [`expand`], [`chamfer`],
//!   [`ortho`], [`gyro`], [`propeller`], [`whirl`], [`volute`]): cut corners
//!   or edges
//! - **Kis** ([`kis`], [`join`], [`needle`], [`meta`], [`join_kis_kis`],
//!   [`subdivide`], [`cross`], [`squall`]): raise faces to apexes or split
//!   them through their centres
//! - **Inset** ([`loft`], [`quinto`], [`lace`], [`joined_lace`],
//!   [`opposite_lace`], [`stake`]): inset faces and ring them with new ones
//! - **Medial** ([`medial`], [`edge_medial`]): fan faces from their centre
//!   through subdivided edges
//!
//! # Metadata
//!
//! A face that stands for an old face copies its whole tag set. A face
//! built from several old faces (around a vertex or across an edge) takes
//! the union of their extrovert tags. Rings of new faces around an old face
//! alternate `New`/`NewAlt` by edge position unless the old face has an odd
//! side count (see [`Role::alternate`]).
//!
//! # Example
//!
//! ```
//! use conway::algo::conway::{ambo, dual};
//! use conway::shapes;
//!
//! let cube = shapes::cube();
//! let cuboctahedron = ambo(&cube).unwrap();
//! assert_eq!(cuboctahedron.num_vertices(), 12);
//! assert_eq!(cuboctahedron.num_faces(), 14);
//!
//! let octahedron = dual(&cube).unwrap();
//! assert_eq!(octahedron.num_faces(), 8);
//! ```

mod dual;
mod inset;
mod kis;
mod medial;
mod truncate;

pub use dual::{add_dual, ambo, dual, zip};
pub use inset::{joined_lace, lace, loft, opposite_lace, quinto, stake, LaceOptions};
pub use kis::{cross, join, join_kis_kis, kis, meta, needle, squall, subdivide, KisOptions};
pub use medial::{edge_medial, medial};
pub use truncate::{
    bevel, bevel_with, chamfer, expand, gyro, ortho, propeller, truncate, volute, whirl,
};

use crate::mesh::{extrovert, ConwayPoly, HalfEdgeId, Role, TagSet, VertexId};

/// Union of the extrovert tags of the faces around `v`.
pub(crate) fn vertex_tags(poly: &ConwayPoly, v: VertexId) -> TagSet {
    poly.vertex_faces(v)
        .into_iter()
        .flat_map(|f| extrovert(poly.face_tags(f)))
        .collect()
}

/// Union of the extrovert tags of the faces on both sides of `h`.
pub(crate) fn edge_tags(poly: &ConwayPoly, h: HalfEdgeId) -> TagSet {
    let mut tags = extrovert(poly.face_tags(poly.face_of(h)));
    if let Some(p) = poly.pair(h) {
        tags.extend(extrovert(poly.face_tags(poly.face_of(p))));
    }
    tags
}

/// Paired half-edges, one per undirected edge.
pub(crate) fn paired_edges(poly: &ConwayPoly) -> impl Iterator<Item = (HalfEdgeId, HalfEdgeId)> + '_ {
    poly.halfedge_ids().filter_map(move |h| {
        let p = poly.pair(h)?;
        (h < p).then_some((h, p))
    })
}

/// Role of the face grown from corner or edge `i` of a face with `sides` sides.
#[inline]
pub(crate) fn ring_role(i: usize, sides: usize) -> Role {
    Role::alternate(i, sides)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::mesh::{ConwayPoly, FlatPoly, Role};
    use nalgebra::Point3;

    /// A single open unit quad in the xz-plane, facing +y.
    pub(crate) fn open_quad() -> ConwayPoly {
        let flat = FlatPoly {
            positions: vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
                Point3::new(1.0, 0.0, 1.0),
                Point3::new(1.0, 0.0, 0.0),
            ],
            faces: vec![vec![0, 1, 2, 3]],
            face_roles: vec![Role::Existing],
            vertex_roles: vec![Role::Existing; 4],
            face_tags: None,
        };
        ConwayPoly::from_flat(&flat).unwrap()
    }

    /// Checks shared by every closed result.
    pub(crate) fn assert_closed(poly: &ConwayPoly) {
        assert!(poly.is_valid());
        assert!(poly.halfedge_ids().all(|h| !poly.is_naked(h)));
        assert_eq!(poly.euler_characteristic(), 2);
    }
}
