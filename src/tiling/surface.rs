//! Surfaces a stamped tiling can be wrapped onto.
//!
//! A [`GridShape`] first applies its seam rule to each domain edge pair,
//! then maps the domain point `(x, y)` onto the surface in closed form.
//! A point of a polygon hanging over a glued edge is carried back into the
//! domain, with the other coordinate reflected or shifted as the seam says.

use std::f64::consts::{PI, SQRT_2};

use nalgebra::{Point2, Point3, Vector2};

use crate::error::PolyError;

/// Points within this distance of a seam count as on it.
const SEAM_EPSILON: f64 = 1e-6;

/// How one pair of opposite domain edges is glued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seam {
    /// Not glued.
    Open,
    /// Glued edge to edge.
    Join,
    /// Glued with the other coordinate negated.
    Twist,
    /// Glued with the other coordinate reflected across the domain.
    Flip,
    /// Glued with the other coordinate reflected and shifted half a domain.
    FlipShift,
}

/// Target surfaces, by id 0 to 12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum GridShape {
    /// The flat tiling in the xz plane.
    #[default]
    Plane = 0,
    /// A ring torus.
    Torus = 1,
    /// A cylinder of radius 1 and height 2.
    Cylinder = 2,
    /// A cone, apex radius near zero.
    Cone = 3,
    /// A conic frustum, radii 1 and 0.5.
    ConicFrustum = 4,
    /// A Möbius strip.
    Mobius = 5,
    /// A trefoil-knotted torus.
    TorusTrefoil = 6,
    /// The figure-eight Klein bottle immersion.
    Klein = 7,
    /// A second Klein bottle immersion.
    Klein2 = 8,
    /// Steiner's Roman surface.
    Roman = 9,
    /// The Roman surface deformed toward Boy's surface.
    RomanBoy = 10,
    /// A cross-cap.
    CrossCap = 11,
    /// A second cross-cap parameterization.
    CrossCap2 = 12,
}

impl GridShape {
    /// Every shape in id order.
    pub const ALL: [GridShape; 13] = [
        GridShape::Plane,
        GridShape::Torus,
        GridShape::Cylinder,
        GridShape::Cone,
        GridShape::ConicFrustum,
        GridShape::Mobius,
        GridShape::TorusTrefoil,
        GridShape::Klein,
        GridShape::Klein2,
        GridShape::Roman,
        GridShape::RomanBoy,
        GridShape::CrossCap,
        GridShape::CrossCap2,
    ];

    /// The numeric id, 0 to 12.
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Seam rules for the left/right and bottom/top edge pairs.
    pub fn seams(self) -> (Seam, Seam) {
        match self {
            GridShape::Plane | GridShape::Roman | GridShape::RomanBoy | GridShape::CrossCap2 => {
                (Seam::Open, Seam::Open)
            }
            GridShape::Torus | GridShape::TorusTrefoil => (Seam::Join, Seam::Join),
            GridShape::Cylinder | GridShape::Cone | GridShape::ConicFrustum => (Seam::Join, Seam::Open),
            GridShape::Mobius => (Seam::Flip, Seam::Open),
            GridShape::Klein => (Seam::FlipShift, Seam::Join),
            GridShape::Klein2 => (Seam::Twist, Seam::Join),
            GridShape::CrossCap => (Seam::Flip, Seam::Flip),
        }
    }

    /// Apply the seam rules, then map every point onto the surface.
    pub fn wrap(self, points: &[Point2<f64>], extent: Vector2<f64>) -> Vec<Point3<f64>> {
        let (lr, tb) = self.seams();
        points
            .iter()
            .map(|p| {
                let p = apply_seams(*p, extent, lr, tb);
                self.map(p, extent)
            })
            .collect()
    }

    fn map(self, p: Point2<f64>, extent: Vector2<f64>) -> Point3<f64> {
        let (u, v) = (p.x / extent.x, p.y / extent.y);
        match self {
            GridShape::Plane => Point3::new(p.x, 0.0, p.y),
            GridShape::Torus | GridShape::TorusTrefoil => torus(u, v, 1.0, 2.0),
            GridShape::Cylinder => conic_frustum(u, v, 1.0, 1.0, 2.0),
            GridShape::Cone => conic_frustum(u, v, 1e-5, 1.0, 2.0),
            GridShape::ConicFrustum => conic_frustum(u, v, 0.5, 1.0, 2.0),
            GridShape::Mobius => {
                let a0 = 2.0 * PI * u;
                let w = 0.5 * (v - 0.5);
                let r = w * (a0 / 2.0).cos() + 1.0;
                Point3::new(a0.sin() * r, w * (a0 / 2.0).sin(), a0.cos() * r)
            }
            GridShape::Klein => {
                let (a0, a1) = (2.0 * PI * u, 2.0 * PI * v);
                let tube = 4.0 * (1.0 - 0.5 * a0.cos());
                if a0 < PI {
                    Point3::new(
                        6.0 * a0.cos() * (1.0 + a0.sin()) + tube * a0.cos() * a1.cos(),
                        16.0 * a0.sin() + tube * a0.sin() * a1.cos(),
                        tube * a1.sin(),
                    )
                } else {
                    Point3::new(
                        6.0 * a0.cos() * (1.0 + a0.sin()) - tube * a1.cos(),
                        16.0 * a0.sin(),
                        tube * a1.sin(),
                    )
                }
            }
            GridShape::Klein2 => {
                let (a0, a1) = (2.0 * PI * u, 2.0 * PI * v);
                let (c, s) = ((0.5 * a0).cos(), (0.5 * a0).sin());
                let r = 1.0 + c * a1.sin() - s * (2.0 * a1).sin();
                Point3::new(r * a0.cos(), r * a0.sin(), s * a1.sin() + c * (2.0 * a1).sin())
            }
            GridShape::Roman => {
                let a0 = PI * u;
                let a1 = PI * (v - 0.5);
                Point3::new(
                    0.5 * a0.cos() * (2.0 * a1).sin(),
                    0.5 * a0.sin() * (2.0 * a1).sin(),
                    0.5 * (2.0 * a0).sin() * a1.cos() * a1.cos(),
                )
            }
            GridShape::RomanBoy => {
                let a0 = PI * (0.5 - u);
                let a1 = PI * v;
                let d = 2.0 - SQRT_2 * (3.0 * a0).sin() * (2.0 * a1).sin();
                let c2 = a1.cos() * a1.cos();
                Point3::new(
                    (SQRT_2 * (2.0 * a0).cos() * c2 + a0.cos() * (2.0 * a1).sin()) / d,
                    (SQRT_2 * (2.0 * a0).sin() * c2 - a0.sin() * (2.0 * a1).sin()) / d,
                    3.0 * c2 / d,
                )
            }
            GridShape::CrossCap => cross_cap(u, v),
            GridShape::CrossCap2 => {
                let a0 = 2.0 * PI * u;
                let a1 = 0.5 * PI * v;
                let s2 = a1.sin() * a1.sin();
                Point3::new(a0.sin() * (2.0 * a1).sin(), (2.0 * a0).sin() * s2, (2.0 * a0).cos() * s2)
            }
        }
    }
}

impl TryFrom<u8> for GridShape {
    type Error = PolyError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(id as usize)
            .copied()
            .ok_or(PolyError::UnknownShape(id))
    }
}

fn apply_seams(mut p: Point2<f64>, extent: Vector2<f64>, lr: Seam, tb: Seam) -> Point2<f64> {
    if lr != Seam::Open && (p.x < -SEAM_EPSILON || p.x > extent.x + SEAM_EPSILON) {
        p.y = glue(p.y, extent.y, lr);
        p.x = p.x.rem_euclid(extent.x);
    }
    if tb != Seam::Open && (p.y < -SEAM_EPSILON || p.y > extent.y + SEAM_EPSILON) {
        p.x = glue(p.x, extent.x, tb);
        p.y = p.y.rem_euclid(extent.y);
    }
    p
}

/// The other coordinate of a point carried across a seam.
fn glue(t: f64, extent: f64, seam: Seam) -> f64 {
    match seam {
        Seam::Open | Seam::Join => t,
        Seam::Twist => -t,
        Seam::Flip => extent - t,
        Seam::FlipShift => 1.5 * extent - t % extent,
    }
}

fn torus(u: f64, v: f64, section: f64, ring: f64) -> Point3<f64> {
    let (a0, a1) = (2.0 * PI * u, 2.0 * PI * v);
    let r = section * a0.cos() + ring;
    Point3::new(a1.sin() * r, section * a0.sin(), a1.cos() * r)
}

fn conic_frustum(u: f64, v: f64, top: f64, bottom: f64, height: f64) -> Point3<f64> {
    let a0 = 2.0 * PI * u;
    let r = (top - bottom) * v + bottom;
    Point3::new(r * a0.cos(), r * a0.sin(), height * v)
}

fn cross_cap(u: f64, v: f64) -> Point3<f64> {
    let mut x = 1.0 - 2.0 * u;
    let mut y = 1.0 - 2.0 * v;
    let a0 = y.atan2(x);
    let to_edge = if x.abs() < f64::EPSILON && y.abs() < f64::EPSILON {
        1.0
    } else if x.abs() > y.abs() {
        (1.0 + (y * y / (x * x)).abs()).sqrt()
    } else {
        (1.0 + (x * x / (y * y)).abs()).sqrt()
    };
    x /= to_edge;
    y /= to_edge;
    let r = 2.0 / 3.0 + 1.0 / (1.0 + (2.0 * (a0 - PI / 4.0)).cos() / 2.0);
    let a1 = PI * (x * x + y * y).sqrt();
    Point3::new(r * a0.cos() * a1.sin(), r * a0.sin() * a1.sin(), r * (a1.cos() - 1.0))
}
