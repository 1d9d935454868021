//! Structural face and vertex edits: removal, offsets and extrusion.
//!
//! Every function here returns a new polyhedron except
//! [`ConwayPoly::tag_faces`], which edits tags in place.

use nalgebra::Point3;

use crate::error::Result;
use crate::mesh::{extrovert, tags_match, ConwayPoly, FaceId, PointKey, PolyBuilder, Role, TagSet, VertexId};

use super::transform::face_scale;
use super::{Jitter, Selector};

impl ConwayPoly {
    /// Union `tags` into every face in `selector`. In place.
    pub fn tag_faces(&mut self, tags: &TagSet, selector: Selector) {
        for f in self.selected_faces(selector, &TagSet::new()) {
            self.face_tags_mut(f).extend(tags.iter().cloned());
        }
    }
}

/// Remove the faces in `selector` that match `tags`.
///
/// Surviving faces and vertices keep their roles and tags; vertices no
/// longer used by any face are dropped.
pub fn face_remove(poly: &ConwayPoly, selector: Selector, tags: &TagSet) -> Result<ConwayPoly> {
    keep_faces(poly, |f| !poly.include_face(f, selector, tags))
}

/// Keep only the faces in `selector` that match `tags`.
pub fn face_keep(poly: &ConwayPoly, selector: Selector, tags: &TagSet) -> Result<ConwayPoly> {
    keep_faces(poly, |f| poly.include_face(f, selector, tags))
}

/// Keep the faces whose centroid lies strictly inside a horizontal band.
///
/// `lower` and `upper` are fractions of the y extent and are swapped if
/// out of order. A non-empty `tags` limits removal to faces carrying one of
/// them.
pub fn slice(poly: &ConwayPoly, lower: f64, upper: f64, tags: &TagSet) -> Result<ConwayPoly> {
    let (lower, upper) = if lower > upper { (upper, lower) } else { (lower, upper) };
    let Some((min, max)) = poly.bounding_box() else {
        return Ok(poly.duplicate());
    };
    let lo = min.y + (max.y - min.y) * lower;
    let hi = min.y + (max.y - min.y) * upper;
    keep_faces(poly, |f| {
        let y = poly.face_centroid(f).y;
        (y > lo && y < hi) || !tags_match(poly.face_tags(f), tags)
    })
}

fn keep_faces<F>(poly: &ConwayPoly, mut keep: F) -> Result<ConwayPoly>
where
    F: FnMut(FaceId) -> bool,
{
    let mut b = PolyBuilder::new();
    for f in poly.face_ids() {
        if !keep(f) {
            continue;
        }
        let loop_ = poly
            .face_vertices(f)
            .map(|v| b.vertex(PointKey::Vertex(v), *poly.position(v), poly.vertex_role(v)))
            .collect();
        b.face(loop_, poly.face_role(f), poly.face_tags(f).clone());
    }
    b.build(poly.pq())
}

/// Drop the vertices in `selector` (or outside it, with `invert`) from
/// every face loop.
///
/// Faces left with fewer than three corners disappear. Faces keep their
/// tags; every role becomes `Existing`.
pub fn vertex_remove(poly: &ConwayPoly, selector: Selector, invert: bool) -> Result<ConwayPoly> {
    let removed: Vec<bool> = poly
        .vertex_ids()
        .map(|v| poly.include_vertex(v, selector) != invert)
        .collect();
    let mut b = PolyBuilder::new();
    for f in poly.face_ids() {
        let corners: Vec<VertexId> = poly.face_vertices(f).filter(|v| !removed[v.index()]).collect();
        if corners.len() < 3 {
            continue;
        }
        let loop_ = corners
            .into_iter()
            .map(|v| b.vertex(PointKey::Vertex(v), *poly.position(v), Role::Existing))
            .collect();
        b.face(loop_, Role::Existing, poly.face_tags(f).clone());
    }
    b.build(poly.pq())
}

/// [`vertex_remove`], then cap the holes it leaves.
pub fn collapse(poly: &ConwayPoly, selector: Selector, invert: bool) -> Result<ConwayPoly> {
    let mut out = vertex_remove(poly, selector, invert)?;
    out.fill_holes();
    Ok(out)
}

/// Merge the faces in `selector` into larger ones.
///
/// The selected faces are removed, then every face left on a boundary, and
/// each resulting hole is capped by a single face. Meshes that already had
/// holes lose the faces around them too.
pub fn face_merge(poly: &ConwayPoly, selector: Selector) -> Result<ConwayPoly> {
    let out = face_remove(poly, selector, &TagSet::new())?;
    let mut out = face_remove(&out, Selector::Outer, &TagSet::new())?;
    out.fill_holes();
    Ok(out)
}

/// Append `layers + 1` successive shells, each made by scaling the selected
/// faces of the previous one by `scale` and pushing them out by `offset`.
pub fn layer(
    poly: &ConwayPoly,
    layers: usize,
    scale: f64,
    offset: f64,
    selector: Selector,
    tags: &TagSet,
) -> Result<ConwayPoly> {
    let mut out = poly.duplicate();
    let mut current = poly.duplicate();
    for _ in 0..=layers {
        let scaled = face_scale(&current, scale, selector, tags, &mut Jitter::none())?;
        let next = offset_faces(&scaled, offset, selector, tags, &mut Jitter::none());
        out.append(&next);
        current = next;
    }
    Ok(out)
}

/// Move every vertex `amount` along its normal.
///
/// With a random source, the distance is scaled by one factor per face,
/// taken from the face of each vertex's stored half-edge.
pub fn offset(poly: &ConwayPoly, amount: f64, jitter: &mut Jitter<'_>) -> ConwayPoly {
    let factors = face_factors(poly, jitter);
    offset_by(poly, |f| f.map_or(amount, |f| amount * factors[f.index()]))
}

/// Move the vertices of the selected faces `amount` along their normals.
///
/// A vertex belongs to the face of its stored half-edge. Meant for meshes
/// whose faces do not share vertices, such as the output of
/// [`face_scale`].
pub fn offset_faces(
    poly: &ConwayPoly,
    amount: f64,
    selector: Selector,
    tags: &TagSet,
    jitter: &mut Jitter<'_>,
) -> ConwayPoly {
    let factors = face_factors(poly, jitter);
    offset_by(poly, |f| match f {
        Some(f) if poly.include_face(f, selector, tags) => amount * factors[f.index()],
        _ => 0.0,
    })
}

/// The face of `v`'s stored half-edge.
fn home_face(poly: &ConwayPoly, v: VertexId) -> Option<FaceId> {
    poly.vertex(v).halfedge.map(|h| poly.face_of(h))
}

/// One jitter factor per face, drawn in face order.
fn face_factors(poly: &ConwayPoly, jitter: &mut Jitter<'_>) -> Vec<f64> {
    poly.face_ids().map(|_| jitter.factor()).collect()
}

fn offset_by<F>(poly: &ConwayPoly, mut distance: F) -> ConwayPoly
where
    F: FnMut(Option<FaceId>) -> f64,
{
    let mut out = poly.duplicate();
    for v in poly.vertex_ids() {
        let d = distance(home_face(poly, v));
        out.set_position(v, poly.position(v) + poly.vertex_normal(v) * d);
    }
    out
}

/// Thicken the whole surface into a shell.
///
/// The bottom sheet is the input (or, when `symmetric`, the input pushed
/// `distance / 2` inward) with reversed loops and role `Existing`. The top
/// sheet is pushed `distance` (or `distance / 2`) outward and is `New`. Both
/// copy the face tags. Each naked edge is bridged by a `NewAlt` quad that
/// carries the extrovert tags of its face.
pub fn extrude(poly: &ConwayPoly, distance: f64, symmetric: bool, jitter: &mut Jitter<'_>) -> Result<ConwayPoly> {
    let factors = face_factors(poly, jitter);
    let (down, up) = if symmetric { (-0.5 * distance, 0.5 * distance) } else { (0.0, distance) };
    let shift = |v: VertexId, d: f64| -> Point3<f64> {
        let k = home_face(poly, v).map_or(1.0, |f| factors[f.index()]);
        poly.position(v) + poly.vertex_normal(v) * (d * k)
    };

    let mut b = PolyBuilder::new();
    let bottom: Vec<usize> = poly
        .vertex_ids()
        .map(|v| b.add_vertex(shift(v, down), Role::Existing))
        .collect();
    let top: Vec<usize> = poly
        .vertex_ids()
        .map(|v| b.add_vertex(shift(v, up), Role::New))
        .collect();

    for f in poly.face_ids() {
        let mut loop_: Vec<usize> = poly.face_vertices(f).map(|v| bottom[v.index()]).collect();
        loop_.reverse();
        b.face(loop_, Role::Existing, poly.face_tags(f).clone());
    }
    for f in poly.face_ids() {
        let loop_ = poly.face_vertices(f).map(|v| top[v.index()]).collect();
        b.face(loop_, Role::New, poly.face_tags(f).clone());
    }
    for h in poly.halfedge_ids().filter(|&h| poly.is_naked(h)) {
        let (u, v) = (poly.tail(h), poly.head(h));
        let quad = vec![bottom[u.index()], bottom[v.index()], top[v.index()], top[u.index()]];
        b.face(quad, Role::NewAlt, extrovert(poly.face_tags(poly.face_of(h))));
    }
    b.build(poly.pq())
}

/// Lift each selected face `amount` along its normal and wall it in.
///
/// The lifted face keeps its role and tags; its corners are `New`. The
/// walls are `New` quads. Unselected faces pass through unchanged.
pub fn extrude_faces(poly: &ConwayPoly, amount: f64, selector: Selector, tags: &TagSet) -> Result<ConwayPoly> {
    let mut b = PolyBuilder::new();
    for v in poly.vertex_ids() {
        b.vertex(PointKey::Vertex(v), *poly.position(v), poly.vertex_role(v));
    }
    for f in poly.face_ids() {
        let original: Vec<usize> = poly.face_vertices(f).map(|v| b.at(PointKey::Vertex(v))).collect();
        if !poly.include_face(f, selector, tags) {
            b.face(original, poly.face_role(f), poly.face_tags(f).clone());
            continue;
        }
        let lift = poly.face_normal(f) * amount;
        let lifted: Vec<usize> = poly
            .face_vertices(f)
            .map(|v| b.vertex(PointKey::Corner(f, v), poly.position(v) + lift, Role::New))
            .collect();
        let n = original.len();
        for i in 0..n {
            let j = (i + 1) % n;
            b.face(
                vec![original[i], original[j], lifted[j], lifted[i]],
                Role::New,
                extrovert(poly.face_tags(f)),
            );
        }
        b.face(lifted, poly.face_role(f), poly.face_tags(f).clone());
    }
    b.build(poly.pq())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::conway::fixtures::{assert_closed, open_quad};
    use crate::algo::transform::face_scale;
    use crate::mesh::parse_tags;
    use crate::shapes;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    // Cube faces: 0 back (-z), 1 front (+z), 2 bottom, 3 top, 4 right, 5 left.

    /// Half the edge length of the unit-circumradius cube.
    fn half_edge() -> f64 {
        1.0 / 3f64.sqrt()
    }

    #[test]
    fn test_face_remove_and_keep() {
        let cube = shapes::cube();
        let open = face_remove(&cube, Selector::OnlyFirst, &TagSet::new()).unwrap();
        assert_eq!(open.num_faces(), 5);
        assert_eq!(open.num_vertices(), 8);
        assert_eq!(open.halfedge_ids().filter(|&h| open.is_naked(h)).count(), 4);

        let mut tagged = cube.duplicate();
        tagged.face_tags_mut(FaceId::new(3)).extend(parse_tags("lid"));
        let top = face_keep(&tagged, Selector::FacingUp, &TagSet::new()).unwrap();
        assert_eq!(top.num_faces(), 1);
        assert_eq!(top.num_vertices(), 4);
        assert_eq!(top.face_tags(FaceId::new(0)), &parse_tags("lid"));
        assert_eq!(top.face_role(FaceId::new(0)), cube.face_role(FaceId::new(3)));
    }

    #[test]
    fn test_face_remove_by_tag() {
        let mut cube = shapes::cube();
        cube.face_tags_mut(FaceId::new(1)).extend(parse_tags("a"));
        cube.face_tags_mut(FaceId::new(4)).extend(parse_tags("a"));
        let out = face_remove(&cube, Selector::All, &parse_tags("a")).unwrap();
        assert_eq!(out.num_faces(), 4);
        assert!(out.faces().all(|(_, f)| f.tags.is_empty()));
    }

    #[test]
    fn test_slice_band() {
        let cube = shapes::cube();
        let band = slice(&cube, 0.4, 0.6, &TagSet::new()).unwrap();
        assert_eq!(band.num_faces(), 4);
        let swapped = slice(&cube, 0.6, 0.4, &TagSet::new()).unwrap();
        assert_eq!(swapped.num_faces(), 4);
    }

    #[test]
    fn test_slice_limited_by_tags() {
        let mut cube = shapes::cube();
        cube.face_tags_mut(FaceId::new(3)).extend(parse_tags("cut"));
        let out = slice(&cube, 0.4, 0.6, &parse_tags("cut")).unwrap();
        // Only the tagged top face is outside the band and removable.
        assert_eq!(out.num_faces(), 5);
    }

    #[test]
    fn test_vertex_remove() {
        let cube = shapes::cube();
        let out = vertex_remove(&cube, Selector::OnlyFirst, false).unwrap();
        assert_eq!(out.num_vertices(), 7);
        assert_eq!(out.num_faces(), 6);
        assert_eq!(out.side_histogram().get(&3), Some(&3));
        assert!(out.faces().all(|(_, f)| f.role == Role::Existing));
    }

    #[test]
    fn test_collapse_caps_the_hole() {
        let out = collapse(&shapes::cube(), Selector::OnlyFirst, false).unwrap();
        assert_eq!(out.num_vertices(), 7);
        assert_eq!(out.num_faces(), 7);
        assert_closed(&out);
    }

    #[test]
    fn test_face_merge() {
        let out = face_merge(&shapes::cube(), Selector::OnlyFirst).unwrap();
        // The front face survives alone and is capped from behind.
        assert_eq!(out.num_faces(), 2);
        assert!(!out.has_naked());
    }

    #[test]
    fn test_tag_faces() {
        let mut cube = shapes::cube();
        cube.tag_faces(&parse_tags("up"), Selector::FacingUp);
        let tagged: Vec<_> = cube.faces().filter(|(_, f)| !f.tags.is_empty()).map(|(id, _)| id).collect();
        assert_eq!(tagged, vec![FaceId::new(3)]);
    }

    #[test]
    fn test_offset_along_normals() {
        let cube = shapes::cube();
        let out = offset(&cube, 1.0, &mut Jitter::none());
        for v in out.vertex_ids() {
            // Corners sit on the unit sphere and move radially.
            assert!((out.position(v).coords.norm() - 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_offset_jitter_is_reproducible() {
        let cube = shapes::cube();
        let mut a = ChaCha8Rng::seed_from_u64(3);
        let mut b = ChaCha8Rng::seed_from_u64(3);
        let first = offset(&cube, 0.5, &mut Jitter::new(&mut a));
        let second = offset(&cube, 0.5, &mut Jitter::new(&mut b));
        assert_eq!(first.positions(), second.positions());
        for v in first.vertex_ids() {
            let moved = (first.position(v) - cube.position(v)).norm();
            assert!(moved <= 0.5 + 1e-12);
        }
    }

    #[test]
    fn test_offset_faces_on_split_mesh() {
        let split = face_scale(&shapes::cube(), 0.0, Selector::All, &TagSet::new(), &mut Jitter::none()).unwrap();
        let out = offset_faces(&split, 0.5, Selector::FacingUp, &TagSet::new(), &mut Jitter::none());
        let top = FaceId::new(3);
        let s = half_edge();
        assert!(out.face_vertices(top).all(|v| (out.position(v).y - (s + 0.5)).abs() < 1e-9));
        let bottom = FaceId::new(2);
        assert!(out.face_vertices(bottom).all(|v| (out.position(v).y + s).abs() < 1e-9));
    }

    #[test]
    fn test_layer_appends_shells() {
        let out = layer(&shapes::cube(), 1, 0.0, 0.5, Selector::All, &TagSet::new()).unwrap();
        assert_eq!(out.num_faces(), 18);
        let (_, max) = out.bounding_box().unwrap();
        // Two shells, each half a unit further out.
        assert!((max.y - (half_edge() + 1.0)).abs() < 1e-9);
    }

    #[test]
    fn test_extrude_open_quad() {
        let quad = open_quad();
        let shell = extrude(&quad, 1.0, false, &mut Jitter::none()).unwrap();
        assert_eq!(shell.num_vertices(), 8);
        assert_eq!(shell.num_faces(), 6);
        assert_closed(&shell);
        assert_eq!(shell.face_role(FaceId::new(0)), Role::Existing);
        assert_eq!(shell.face_role(FaceId::new(1)), Role::New);
        assert_eq!(shell.side_histogram().get(&4), Some(&6));
        let (min, max) = shell.bounding_box().unwrap();
        assert!((min.y - 0.0).abs() < 1e-9 && (max.y - 1.0).abs() < 1e-9);

        let sym = extrude(&quad, 1.0, true, &mut Jitter::none()).unwrap();
        let (min, max) = sym.bounding_box().unwrap();
        assert!((min.y + 0.5).abs() < 1e-9 && (max.y - 0.5).abs() < 1e-9);
        assert!(sym.faces().skip(2).all(|(_, f)| f.role == Role::NewAlt));
    }

    #[test]
    fn test_extrude_sides_carry_extrovert_tags() {
        let mut quad = open_quad();
        quad.face_tags_mut(FaceId::new(0)).extend(parse_tags("rim"));
        let shell = extrude(&quad, 1.0, false, &mut Jitter::none()).unwrap();
        assert!(shell.faces().all(|(_, f)| f.tags == parse_tags("rim")));
    }

    #[test]
    fn test_extrude_closed_mesh_gives_two_sheets() {
        let shell = extrude(&shapes::cube(), 0.5, false, &mut Jitter::none()).unwrap();
        assert_eq!(shell.num_faces(), 12);
        assert_eq!(shell.euler_characteristic(), 4);
    }

    #[test]
    fn test_extrude_faces() {
        let cube = shapes::cube();
        let out = extrude_faces(&cube, 1.0, Selector::FacingUp, &TagSet::new()).unwrap();
        assert_eq!(out.num_vertices(), 12);
        assert_eq!(out.num_faces(), 10);
        assert_closed(&out);
        let lifted = FaceId::new(7);
        assert_eq!(out.face_role(lifted), cube.face_role(FaceId::new(3)));
        let top = half_edge() + 1.0;
        assert!(out.face_vertices(lifted).all(|v| (out.position(v).y - top).abs() < 1e-9));
    }
}
