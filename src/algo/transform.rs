//! Geometry helpers: rigid and non-rigid transforms, copies and appends.
//!
//! Most helpers are pure: they return a new polyhedron and leave the input
//! alone. The methods on [`ConwayPoly`] defined here (`recenter`,
//! `scale_polyhedra`, `mirror`, `hinge`, `flip`, `append`) mutate the
//! receiver in place.
//!
//! # Example
//!
//! ```
//! use conway::algo::transform::{duplicate_transformed, rotate};
//! use conway::shapes;
//! use nalgebra::{UnitQuaternion, Vector3};
//!
//! let mut cube = shapes::cube();
//! cube.scale_polyhedra(1.0);
//!
//! let turned = rotate(&cube, &Vector3::y(), 45.0);
//! assert_eq!(turned.num_faces(), 6);
//!
//! let moved = duplicate_transformed(&cube, &Vector3::new(2.0, 0.0, 0.0), &UnitQuaternion::identity(), 0.5);
//! cube.append(&moved);
//! assert_eq!(cube.num_vertices(), 16);
//! ```

use nalgebra::{Point3, Unit, UnitQuaternion, Vector3};

use crate::error::Result;
use crate::mesh::{ConwayPoly, FaceId, HalfEdge, HalfEdgeId, PointKey, PolyBuilder, Role, TagSet, VertexId};

use super::faces::face_keep;
use super::{Jitter, Selector};

/// Upper bound on the number of copies [`stack`] adds.
pub const MAX_STACK_COPIES: usize = 64;

impl ConwayPoly {
    /// Translate so the mean vertex position sits at the origin. In place.
    pub fn recenter(&mut self) {
        let c = self.centroid().coords;
        for v in &mut self.vertices {
            v.position -= c;
        }
    }

    /// Scale about the origin so the furthest vertex lies at distance
    /// `scale`. In place; a polyhedron with every vertex at the origin is
    /// left alone.
    pub fn scale_polyhedra(&mut self, scale: f64) {
        let max = self
            .vertices
            .iter()
            .map(|v| v.position.coords.norm())
            .fold(0.0, f64::max);
        if max <= f64::EPSILON {
            return;
        }
        let k = scale / max;
        for v in &mut self.vertices {
            v.position = Point3::from(v.position.coords * k);
        }
    }

    /// Shift every vertex by `-offset * axis`, then reflect it in the plane
    /// through the origin with normal `axis`. In place.
    pub fn mirror(&mut self, axis: &Vector3<f64>, offset: f64) {
        let Some(n) = Unit::try_new(*axis, 1e-12) else {
            return;
        };
        for v in &mut self.vertices {
            let p = v.position.coords - axis * offset;
            v.position = Point3::from(p - n.as_ref() * (2.0 * p.dot(&n)));
        }
    }

    /// Rotate each face that hangs on exactly one interior edge by `degrees`
    /// about that edge. In place; shared vertices move with every face
    /// that rotates them.
    pub fn hinge(&mut self, degrees: f64) {
        for f in 0..self.faces.len() {
            let f = FaceId::new(f);
            let mut hinge = None;
            for h in self.face_halfedges(f) {
                if self.pair(h).is_some() {
                    if hinge.is_some() {
                        hinge = None;
                        break;
                    }
                    hinge = Some(h);
                }
            }
            let Some(h) = hinge else {
                continue;
            };
            let Some(axis) = Unit::try_new(self.halfedge_vector(h), 1e-12) else {
                continue;
            };
            let rotation = UnitQuaternion::from_axis_angle(&axis, degrees.to_radians());
            let (head, tail) = (self.head(h), self.tail(h));
            let pivot = *self.position(head);
            let corners: Vec<VertexId> = self.face_vertices(f).collect();
            for v in corners {
                if v == head || v == tail {
                    continue;
                }
                let p = pivot + rotation * (self.position(v) - pivot);
                self.set_position(v, p);
            }
        }
    }

    /// Reverse the winding of every face. In place; pairs are kept.
    pub fn flip(&mut self) {
        let old = self.halfedges.clone();
        for (i, h) in old.iter().enumerate() {
            self.halfedges[i] = HalfEdge {
                vertex: old[h.prev.index()].vertex,
                next: h.prev,
                prev: h.next,
                pair: h.pair,
                face: h.face,
            };
        }
        for v in &mut self.vertices {
            v.halfedge = v.halfedge.map(|h| old[h.index()].next);
        }
        self.rebuild_edge_table();
    }

    /// Append a copy of `other`. In place. The two parts are not paired
    /// with each other, even where they touch.
    pub fn append(&mut self, other: &ConwayPoly) {
        let nv = self.vertices.len();
        let nh = self.halfedges.len();
        let nf = self.faces.len();
        let shift_h = |h: HalfEdgeId| HalfEdgeId::new(h.index() + nh);

        self.vertices.extend(other.vertices.iter().map(|v| {
            let mut v = v.clone();
            v.halfedge = v.halfedge.map(shift_h);
            v
        }));
        self.halfedges.extend(other.halfedges.iter().map(|h| HalfEdge {
            vertex: VertexId::new(h.vertex.index() + nv),
            next: shift_h(h.next),
            prev: shift_h(h.prev),
            pair: h.pair.map(shift_h),
            face: FaceId::new(h.face.index() + nf),
        }));
        self.faces.extend(other.faces.iter().map(|f| {
            let mut f = f.clone();
            f.halfedge = shift_h(f.halfedge);
            f
        }));
        self.rebuild_edge_table();
    }
}

/// Rotate about `axis` (through the origin) by `degrees`.
pub fn rotate(poly: &ConwayPoly, axis: &Vector3<f64>, degrees: f64) -> ConwayPoly {
    let Some(axis) = Unit::try_new(*axis, 1e-12) else {
        return poly.duplicate();
    };
    let rotation = UnitQuaternion::from_axis_angle(&axis, degrees.to_radians());
    map_positions(poly, |_, p| rotation * p)
}

/// A copy scaled by `scale`, rotated by `rotation`, then translated.
pub fn duplicate_transformed(
    poly: &ConwayPoly,
    translation: &Vector3<f64>,
    rotation: &UnitQuaternion<f64>,
    scale: f64,
) -> ConwayPoly {
    map_positions(poly, |_, p| rotation * Point3::from(p.coords * scale) + translation)
}

/// Push vertices below `y = 0.1` down by `amount` and the rest up.
pub fn stretch(poly: &ConwayPoly, amount: f64) -> ConwayPoly {
    map_positions(poly, |_, p| {
        let dy = if p.y < 0.1 { -amount } else { amount };
        Point3::new(p.x, p.y + dy, p.z)
    })
}

/// Rotate so that the face at `face_factor` of the way through the face
/// list points straight down.
pub fn sit_level(poly: &ConwayPoly, face_factor: f64) -> ConwayPoly {
    let count = poly.num_faces();
    if count == 0 {
        return poly.duplicate();
    }
    let index = ((count as f64 * face_factor).floor().max(0.0) as usize).min(count - 1);
    let normal = poly.face_normal(FaceId::new(index));
    if normal.norm() < 1e-12 {
        return poly.duplicate();
    }
    let down = -Vector3::y();
    let rotation = UnitQuaternion::rotation_between(&normal, &down)
        .unwrap_or_else(|| UnitQuaternion::from_axis_angle(&Vector3::x_axis(), std::f64::consts::PI));
    map_positions(poly, |_, p| rotation * p)
}

/// Move selected vertices toward the unit sphere by `amount`. Selected
/// vertices become `Existing`, the rest `Ignored`.
pub fn spherize(poly: &ConwayPoly, amount: f64, selector: Selector) -> ConwayPoly {
    let mut out = poly.duplicate();
    for v in poly.vertex_ids() {
        if poly.include_vertex(v, selector) {
            let p = poly.position(v);
            let target = p.coords.try_normalize(1e-12).unwrap_or(p.coords);
            out.set_position(v, Point3::from(p.coords.lerp(&target, amount)));
            out.set_vertex_role(v, Role::Existing);
        } else {
            out.set_vertex_role(v, Role::Ignored);
        }
    }
    out
}

/// Slide the corners of each selected face within its plane.
///
/// `direction` turns the slide between the face's "up" tangent (0) and its
/// "left" tangent (1). Faces are processed in order, so a vertex shared by
/// several selected faces moves once per face.
pub fn face_slide(
    poly: &ConwayPoly,
    amount: f64,
    direction: f64,
    selector: Selector,
    tags: &TagSet,
    jitter: &mut Jitter<'_>,
) -> ConwayPoly {
    let mut out = poly.duplicate();
    for f in poly.face_ids() {
        if !poly.include_face(f, selector, tags) {
            continue;
        }
        let n = out.face_normal(f);
        let tangent = slide_tangent(&n, direction);
        let corners: Vec<VertexId> = out.face_vertices(f).collect();
        for v in corners {
            let p = out.position(v) + tangent * (amount * jitter.factor());
            out.set_position(v, p);
        }
    }
    out
}

/// Scale selected vertices about the origin by `1 + scale`.
pub fn vertex_scale(
    poly: &ConwayPoly,
    scale: f64,
    selector: Selector,
    jitter: &mut Jitter<'_>,
) -> ConwayPoly {
    map_positions(poly, |v, p| {
        let k = scale * jitter.factor() + 1.0;
        if poly.include_vertex(v, selector) {
            Point3::from(p.coords * k)
        } else {
            *p
        }
    })
}

/// Push the corners of each selected face away from its centroid by
/// `scale` times their offset. Faces are processed in order.
pub fn vertex_flex(
    poly: &ConwayPoly,
    scale: f64,
    selector: Selector,
    tags: &TagSet,
    jitter: &mut Jitter<'_>,
) -> ConwayPoly {
    let mut out = poly.duplicate();
    for f in poly.face_ids() {
        if !poly.include_face(f, selector, tags) {
            continue;
        }
        let c = out.face_centroid(f);
        let corners: Vec<VertexId> = out.face_vertices(f).collect();
        for v in corners {
            let k = scale * jitter.factor() + 1.0;
            let p = *out.position(v);
            out.set_position(v, p + (p - c) * k);
        }
    }
    out
}

/// Turn the corners of each selected face about its normal by
/// `amount * 360 / sides` degrees. Faces are processed in order.
pub fn vertex_rotate(
    poly: &ConwayPoly,
    amount: f64,
    selector: Selector,
    tags: &TagSet,
    jitter: &mut Jitter<'_>,
) -> ConwayPoly {
    let mut out = poly.duplicate();
    for f in poly.face_ids() {
        if !poly.include_face(f, selector, tags) {
            continue;
        }
        let Some(axis) = Unit::try_new(out.face_normal(f), 1e-12) else {
            continue;
        };
        let degrees = 360.0 / out.face_sides(f) as f64 * amount * jitter.factor();
        let rotation = UnitQuaternion::from_axis_angle(&axis, degrees.to_radians());
        let c = out.face_centroid(f);
        let corners: Vec<VertexId> = out.face_vertices(f).collect();
        for v in corners {
            let p = c + rotation * (out.position(v) - c);
            out.set_position(v, p);
        }
    }
    out
}

/// Split every face off on its own vertices and scale the selected ones
/// about their centroids by `1 + scale`.
///
/// Selected faces keep their role and get `Existing` vertices; the rest
/// become `Ignored`.
pub fn face_scale(
    poly: &ConwayPoly,
    scale: f64,
    selector: Selector,
    tags: &TagSet,
    jitter: &mut Jitter<'_>,
) -> Result<ConwayPoly> {
    split_faces(poly, selector, tags, |f, p| {
        let k = scale * jitter.factor() + 1.0;
        let c = poly.face_centroid(f);
        c + (p - c) * k
    })
}

/// Axis a face turns about in [`face_rotate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaceRotateAxis {
    /// The face normal: the face spins in its own plane.
    Normal,
    /// `normal x up`: the face tilts.
    #[default]
    Horizontal,
    /// `normal x forward`.
    Forward,
}

/// Split every face off on its own vertices and turn the selected ones
/// about their centroids by `amount * 360 / sides` degrees.
pub fn face_rotate(
    poly: &ConwayPoly,
    amount: f64,
    selector: Selector,
    tags: &TagSet,
    axis: FaceRotateAxis,
    jitter: &mut Jitter<'_>,
) -> Result<ConwayPoly> {
    let mut rotations = Vec::with_capacity(poly.num_faces());
    for f in poly.face_ids() {
        let n = poly.face_normal(f);
        let direction = match axis {
            FaceRotateAxis::Normal => n,
            FaceRotateAxis::Horizontal => n.cross(&Vector3::y()),
            FaceRotateAxis::Forward => n.cross(&Vector3::z()),
        };
        let degrees = 360.0 / poly.face_sides(f) as f64 * amount * jitter.factor();
        let rotation = Unit::try_new(direction, 1e-12)
            .map(|d| UnitQuaternion::from_axis_angle(&d, degrees.to_radians()))
            .unwrap_or_else(UnitQuaternion::identity);
        rotations.push(rotation);
    }
    split_faces(poly, selector, tags, |f, p| {
        let c = poly.face_centroid(f);
        c + rotations[f.index()] * (p - c)
    })
}

/// Append a mirrored copy of the selected faces.
///
/// Both halves keep only the selected faces; the mirrored half is reflected
/// through the plane `axis . x = amount` (see [`ConwayPoly::mirror`]) and
/// flipped so it still faces outward.
pub fn add_mirrored(
    poly: &ConwayPoly,
    axis: &Vector3<f64>,
    amount: f64,
    selector: Selector,
    tags: &TagSet,
) -> Result<ConwayPoly> {
    let mut original = face_keep(poly, selector, tags)?;
    let mut mirrored = original.duplicate();
    mirrored.mirror(axis, amount);
    let mut mirrored = face_keep(&mirrored, selector, &TagSet::new())?;
    mirrored.flip();
    original.append(&mirrored);
    Ok(original)
}

/// Shift the polyhedron by `-amount / 2` along `axis` and append a copy of
/// its selected faces shifted by `+amount / 2`.
pub fn add_copy(
    poly: &ConwayPoly,
    axis: &Vector3<f64>,
    amount: f64,
    selector: Selector,
    tags: &TagSet,
) -> Result<ConwayPoly> {
    let half = amount / 2.0;
    let identity = UnitQuaternion::identity();
    let mut original = duplicate_transformed(poly, &(axis * -half), &identity, 1.0);
    let copy = duplicate_transformed(poly, &(axis * half), &identity, 1.0);
    let copy = face_keep(&copy, selector, tags)?;
    original.append(&copy);
    Ok(original)
}

/// Append successively smaller copies of the selected faces along `axis`.
///
/// The scale is clamped to `[1e-4, 0.99]` and squared after each copy;
/// copies stop once it falls to `limit` or after [`MAX_STACK_COPIES`].
pub fn stack(
    poly: &ConwayPoly,
    axis: &Vector3<f64>,
    offset: f64,
    scale: f64,
    limit: f64,
    selector: Selector,
    tags: &TagSet,
) -> Result<ConwayPoly> {
    let mut scale = scale.abs().clamp(1e-4, 0.99);
    let mut offset = offset;
    let mut shift = axis * offset;
    let mut out = poly.duplicate();
    let layer = face_keep(poly, selector, tags)?;
    let identity = UnitQuaternion::identity();

    let mut copies = 0;
    while scale > limit && copies < MAX_STACK_COPIES {
        out.append(&duplicate_transformed(&layer, &shift, &identity, scale));
        scale *= scale;
        shift += axis * offset;
        offset *= scale.sqrt();
        copies += 1;
    }
    Ok(out)
}

/// Append a copy of `other` at every selected face (or vertex, when
/// `to_faces` is false).
///
/// Each copy is scaled by `scale`, turned by `degrees` about the face (or
/// vertex) normal and placed `offset` above the centroid (or position).
#[allow(clippy::too_many_arguments)]
pub fn append_many(
    poly: &ConwayPoly,
    other: &ConwayPoly,
    selector: Selector,
    tags: &TagSet,
    scale: f64,
    degrees: f64,
    offset: f64,
    to_faces: bool,
) -> ConwayPoly {
    let mut out = poly.duplicate();
    let mut place = |anchor: Point3<f64>, normal: Vector3<f64>| {
        let rotation = Unit::try_new(normal, 1e-12)
            .map(|n| UnitQuaternion::from_axis_angle(&n, degrees.to_radians()))
            .unwrap_or_else(UnitQuaternion::identity);
        let translation = anchor.coords + normal * offset;
        out.append(&duplicate_transformed(other, &translation, &rotation, scale));
    };

    if to_faces {
        for f in poly.face_ids().filter(|&f| poly.include_face(f, selector, tags)) {
            place(poly.face_centroid(f), poly.face_normal(f));
        }
    } else {
        for v in poly.vertex_ids().filter(|&v| poly.include_vertex(v, selector)) {
            place(*poly.position(v), poly.vertex_normal(v));
        }
    }
    out
}

fn map_positions<F>(poly: &ConwayPoly, mut f: F) -> ConwayPoly
where
    F: FnMut(VertexId, &Point3<f64>) -> Point3<f64>,
{
    let mut out = poly.duplicate();
    for v in poly.vertex_ids() {
        out.set_position(v, f(v, poly.position(v)));
    }
    out
}

/// Rebuild with every face on its own vertices, moving the corners of the
/// selected faces through `place`.
fn split_faces<F>(poly: &ConwayPoly, selector: Selector, tags: &TagSet, mut place: F) -> Result<ConwayPoly>
where
    F: FnMut(FaceId, &Point3<f64>) -> Point3<f64>,
{
    let mut b = PolyBuilder::new();
    for f in poly.face_ids() {
        let selected = poly.include_face(f, selector, tags);
        let vertex_role = if selected { Role::Existing } else { Role::Ignored };
        let face_role = if selected { poly.face_role(f) } else { Role::Ignored };
        let mut loop_ = Vec::with_capacity(poly.face_sides(f));
        for v in poly.face_vertices(f) {
            let p = poly.position(v);
            let p = if selected { place(f, p) } else { *p };
            loop_.push(b.vertex(PointKey::Corner(f, v), p, vertex_role));
        }
        b.face(loop_, face_role, poly.face_tags(f).clone());
    }
    b.build(poly.pq())
}

/// The in-plane slide direction for a face with normal `n`.
fn slide_tangent(n: &Vector3<f64>, direction: f64) -> Vector3<f64> {
    let t1 = n.cross(&Vector3::z());
    let t2 = n.cross(&-Vector3::x());
    let up = if t1.norm() > t2.norm() { t1 } else { t2 };
    let t3 = n.cross(&Vector3::y());
    let left = if t1.norm() > t3.norm() { t1 } else { t3 };
    slerp_unclamped(&up, &left, direction)
}

/// Spherical interpolation of direction with linear interpolation of
/// length. Falls back to a straight lerp for (anti)parallel inputs.
fn slerp_unclamped(a: &Vector3<f64>, b: &Vector3<f64>, t: f64) -> Vector3<f64> {
    let (la, lb) = (a.norm(), b.norm());
    if la < 1e-12 || lb < 1e-12 {
        return a.lerp(b, t);
    }
    let (ua, ub) = (a / la, b / lb);
    let theta = ua.dot(&ub).clamp(-1.0, 1.0).acos();
    let s = theta.sin();
    if s.abs() < 1e-9 {
        return a.lerp(b, t);
    }
    let dir = ua * (((1.0 - t) * theta).sin() / s) + ub * ((t * theta).sin() / s);
    dir * (la + (lb - la) * t)
}
