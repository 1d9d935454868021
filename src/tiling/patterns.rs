//! Unit-edge Archimedean patterns and the stamping that lays them out.
//!
//! Each pattern is a rectangular repeat cell holding a few regular polygons.
//! Stamping copies every polygon of the cell across the domain `[0, x_end)
//! x [0, y_end)` by polygon centre, merging corners that land within
//! [`MERGE_TOLERANCE`] of an earlier one.

use std::collections::HashMap;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, FRAC_PI_6, PI};

use nalgebra::{Point2, Vector2};

use crate::error::PolyError;

/// Corners closer than this are the same vertex.
pub const MERGE_TOLERANCE: f64 = 1e-5;

const MERGE_CELL: f64 = 1e-3;
const EPSILON: f64 = 1e-9;

/// The built-in patterns, named by vertex configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum UnitilePattern {
    /// Squares.
    #[default]
    Square4444 = 1,
    /// Triangles.
    Triangle333333 = 2,
    /// Hexagons.
    Hexagon666 = 3,
    /// Trihexagonal.
    Trihexagonal3636 = 4,
    /// Elongated triangular.
    ElongatedTriangular33344 = 5,
    /// Snub square.
    SnubSquare33434 = 6,
    /// Snub hexagonal.
    SnubHexagonal33336 = 7,
    /// Truncated hexagonal.
    TruncatedHexagonal31212 = 8,
    /// Truncated square.
    TruncatedSquare488 = 9,
    /// Rhombitrihexagonal.
    Rhombitrihexagonal3464 = 10,
    /// Truncated trihexagonal.
    TruncatedTrihexagonal4612 = 11,
}

impl UnitilePattern {
    /// Every pattern in id order.
    pub const ALL: [UnitilePattern; 11] = [
        UnitilePattern::Square4444,
        UnitilePattern::Triangle333333,
        UnitilePattern::Hexagon666,
        UnitilePattern::Trihexagonal3636,
        UnitilePattern::ElongatedTriangular33344,
        UnitilePattern::SnubSquare33434,
        UnitilePattern::SnubHexagonal33336,
        UnitilePattern::TruncatedHexagonal31212,
        UnitilePattern::TruncatedSquare488,
        UnitilePattern::Rhombitrihexagonal3464,
        UnitilePattern::TruncatedTrihexagonal4612,
    ];

    /// The numeric id, 1 to 11.
    pub fn id(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for UnitilePattern {
    type Error = PolyError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        id.checked_sub(1)
            .and_then(|i| Self::ALL.get(i as usize))
            .copied()
            .ok_or(PolyError::UnknownPattern(id))
    }
}

/// A stamped pattern in the plane.
#[derive(Debug, Clone, Default)]
pub struct RawTiling {
    /// Merged corner positions.
    pub points: Vec<Point2<f64>>,
    /// Corner loops, one per stamped polygon.
    pub faces: Vec<Vec<usize>>,
    /// Domain size after rounding up to whole repeat cells.
    pub extent: Vector2<f64>,
}

/// Incremental stamper over one domain.
struct Stamper {
    extent: Vector2<f64>,
    step: Vector2<f64>,
    polygon: Vec<Vector2<f64>>,
    grid: HashMap<(i64, i64), Vec<usize>>,
    out: RawTiling,
}

impl Stamper {
    fn new(x_end: f64, y_end: f64) -> Self {
        Self {
            extent: Vector2::new(x_end, y_end),
            step: Vector2::new(1.0, 1.0),
            polygon: Vec::new(),
            grid: HashMap::new(),
            out: RawTiling::default(),
        }
    }

    /// Set the repeat cell and round the domain up to whole cells.
    fn cell(&mut self, x_step: f64, y_step: f64) {
        self.step = Vector2::new(x_step, y_step);
        self.extent.x = (self.extent.x / x_step - EPSILON).ceil() * x_step;
        self.extent.y = (self.extent.y / y_step - EPSILON).ceil() * y_step;
    }

    /// A regular unit-edge polygon, first corner at `rotation`.
    fn polygon(&mut self, sides: usize, rotation: f64) {
        let angle = 2.0 * PI / sides as f64;
        let radius = 0.5 / (angle / 2.0).sin();
        self.polygon = (0..sides)
            .rev()
            .map(|i| {
                let a = i as f64 * angle + rotation;
                Vector2::new(radius * a.cos(), radius * a.sin())
            })
            .collect();
    }

    /// Stamp the current polygon at `(x, y)` and at every cell repeat of it
    /// inside the domain.
    fn stamp(&mut self, x: f64, y: f64) {
        let start = Vector2::new(x.rem_euclid(self.step.x), y.rem_euclid(self.step.y));
        let nx = ((self.extent.x - EPSILON - start.x) / self.step.x).ceil().max(0.0) as usize;
        let ny = ((self.extent.y - EPSILON - start.y) / self.step.y).ceil().max(0.0) as usize;
        for i in 0..nx {
            for j in 0..ny {
                let centre = Point2::new(
                    start.x + i as f64 * self.step.x,
                    start.y + j as f64 * self.step.y,
                );
                let corners: Vec<Point2<f64>> = self.polygon.iter().map(|c| centre + c).collect();
                let face = corners.into_iter().map(|p| self.merge(p)).collect();
                self.out.faces.push(face);
            }
        }
    }

    fn merge(&mut self, p: Point2<f64>) -> usize {
        let cx = (p.x / MERGE_CELL).floor() as i64;
        let cy = (p.y / MERGE_CELL).floor() as i64;
        for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(bucket) = self.grid.get(&(cx + dx, cy + dy)) {
                    if let Some(&i) = bucket
                        .iter()
                        .find(|&&i| (self.out.points[i] - p).norm_squared() < MERGE_TOLERANCE * MERGE_TOLERANCE)
                    {
                        return i;
                    }
                }
            }
        }
        let i = self.out.points.len();
        self.out.points.push(p);
        self.grid.entry((cx, cy)).or_default().push(i);
        i
    }

    fn finish(mut self) -> RawTiling {
        self.out.extent = self.extent;
        self.out
    }
}

/// Stamp `pattern` over a domain of at least `x_end` by `y_end`.
pub fn stamp(pattern: UnitilePattern, x_end: f64, y_end: f64) -> RawTiling {
    let mut s = Stamper::new(x_end, y_end);
    let r3 = 3f64.sqrt();
    match pattern {
        UnitilePattern::Square4444 => {
            s.cell(1.0, 1.0);
            s.polygon(4, FRAC_PI_4);
            s.stamp(0.5, 0.5);
        }
        UnitilePattern::Triangle333333 => {
            s.cell(r3, 1.0);
            s.polygon(3, PI);
            s.stamp(0.0, 0.0);
            s.stamp(r3 / 2.0, 0.5);
            s.polygon(3, 0.0);
            s.stamp(r3 / 3.0, 0.0);
            s.stamp(r3 * 5.0 / 6.0, 0.5);
        }
        UnitilePattern::Hexagon666 => {
            s.cell(r3, 3.0);
            s.polygon(6, FRAC_PI_6);
            s.stamp(0.0, 0.0);
            s.stamp(r3 / 2.0, 1.5);
        }
        UnitilePattern::Trihexagonal3636 => {
            s.cell(r3 * 2.0, 2.0);
            s.polygon(3, 0.0);
            s.stamp(r3 * 2.0 / 3.0, 0.0);
            s.stamp(r3 * 5.0 / 3.0, 1.0);
            s.polygon(3, PI);
            s.stamp(r3 / 3.0, 1.0);
            s.stamp(r3 * 4.0 / 3.0, 0.0);
            s.polygon(6, FRAC_PI_6);
            s.stamp(0.0, 0.0);
            s.stamp(r3, 1.0);
        }
        UnitilePattern::ElongatedTriangular33344 => {
            s.cell(1.0, 2.0 + r3);
            s.polygon(3, FRAC_PI_2);
            s.stamp(0.0, 0.5 + r3 / 6.0);
            s.stamp(0.5, 1.5 + r3 * 2.0 / 3.0);
            s.polygon(3, -FRAC_PI_2);
            s.stamp(0.0, 1.5 + r3 * 5.0 / 6.0);
            s.stamp(0.5, 0.5 + r3 / 3.0);
            s.polygon(4, FRAC_PI_4);
            s.stamp(0.0, 0.0);
            s.stamp(0.5, 1.0 + r3 / 2.0);
        }
        UnitilePattern::SnubSquare33434 => {
            let l = 1.0 + r3;
            let d = 1.0 / 12f64.sqrt();
            s.cell(l, l);
            s.polygon(4, -PI / 12.0);
            s.stamp(l / 4.0, l / 4.0);
            s.stamp(3.0 * l / 4.0, 3.0 * l / 4.0);
            s.polygon(4, PI / 12.0);
            s.stamp(l / 4.0, 3.0 * l / 4.0);
            s.stamp(3.0 * l / 4.0, l / 4.0);
            s.polygon(3, 0.0);
            s.stamp(d, l / 2.0);
            s.stamp(l / 2.0 + d, 0.0);
            s.polygon(3, PI);
            s.stamp(l - d, l / 2.0);
            s.stamp(l / 2.0 - d, 0.0);
            s.polygon(3, FRAC_PI_2);
            s.stamp(0.0, d);
            s.stamp(l / 2.0, l / 2.0 + d);
            s.polygon(3, -FRAC_PI_2);
            s.stamp(0.0, l - d);
            s.stamp(l / 2.0, l / 2.0 - d);
        }
        UnitilePattern::SnubHexagonal33336 => snub_hexagonal(&mut s),
        UnitilePattern::TruncatedHexagonal31212 => {
            s.cell(2.0 + r3, 3.0 + r3 * 2.0);
            s.polygon(12, PI / 12.0);
            s.stamp(0.0, 0.0);
            s.stamp(1.0 + r3 / 2.0, 1.5 + r3);
            s.polygon(3, -FRAC_PI_6);
            s.stamp(1.0 + r3 / 2.0, 2.5 + r3 * 5.0 / 3.0);
            s.stamp(0.0, 1.0 + r3 * 2.0 / 3.0);
            s.polygon(3, FRAC_PI_6);
            s.stamp(1.0 + r3 / 2.0, 0.5 + r3 / 3.0);
            s.stamp(0.0, 2.0 + r3 * 4.0 / 3.0);
        }
        UnitilePattern::TruncatedSquare488 => {
            let l = 1.0 + 2f64.sqrt();
            s.cell(l, l);
            s.polygon(4, 0.0);
            s.stamp(l / 2.0, l / 2.0);
            s.polygon(8, PI / 8.0);
            s.stamp(0.0, 0.0);
        }
        UnitilePattern::Rhombitrihexagonal3464 => {
            let h = 0.5 + r3 / 2.0;
            s.cell(1.0 + r3, 3.0 + r3);
            s.polygon(3, FRAC_PI_6);
            s.stamp(0.0, 1.0 + r3 / 3.0);
            s.stamp(h, 2.5 + r3 * 5.0 / 6.0);
            s.polygon(3, -FRAC_PI_6);
            s.stamp(0.0, 2.0 + r3 * 2.0 / 3.0);
            s.stamp(h, 0.5 + r3 / 6.0);
            s.polygon(4, PI / 12.0);
            s.stamp(h / 2.0, 0.75 + r3 / 4.0);
            s.stamp(-h / 2.0, 2.25 + r3 * 3.0 / 4.0);
            s.polygon(4, -PI / 12.0);
            s.stamp(-h / 2.0, 0.75 + r3 / 4.0);
            s.stamp(h / 2.0, 2.25 + r3 * 3.0 / 4.0);
            s.polygon(4, FRAC_PI_4);
            s.stamp(h, 0.0);
            s.stamp(0.0, 1.5 + r3 / 2.0);
            s.polygon(6, FRAC_PI_6);
            s.stamp(0.0, 0.0);
            s.stamp(h, 1.5 + r3 / 2.0);
        }
        UnitilePattern::TruncatedTrihexagonal4612 => {
            let h = 1.5 + r3 / 2.0;
            s.cell(3.0 + r3, 3.0 + r3 * 3.0);
            s.polygon(4, PI / 12.0);
            s.stamp(h / 2.0, 0.75 + r3 * 3.0 / 4.0);
            s.stamp(h * 1.5, 2.25 + r3 * 9.0 / 4.0);
            s.polygon(4, -PI / 12.0);
            s.stamp(h * 1.5, 0.75 + r3 * 3.0 / 4.0);
            s.stamp(h / 2.0, 2.25 + r3 * 9.0 / 4.0);
            s.polygon(4, FRAC_PI_4);
            s.stamp(h, 0.0);
            s.stamp(0.0, 1.5 + r3 * 3.0 / 2.0);
            s.polygon(6, 0.0);
            s.stamp(0.0, 1.0 + r3);
            s.stamp(0.0, 2.0 + r3 * 2.0);
            s.stamp(h, 2.5 + r3 * 5.0 / 2.0);
            s.stamp(h, 0.5 + r3 / 2.0);
            s.polygon(12, PI / 12.0);
            s.stamp(0.0, 0.0);
            s.stamp(h, 1.5 + r3 * 3.0 / 2.0);
        }
    }
    s.finish()
}

/// Two hexagons per cell, each with a triangle on every edge, plus one
/// triangle in each hole of the hexagon lattice.
fn snub_hexagonal(s: &mut Stamper) {
    let r3 = 3f64.sqrt();
    let a = Vector2::new(7f64.sqrt(), 0.0);
    let b = Vector2::new(7f64.sqrt() / 2.0, 21f64.sqrt() / 2.0);
    let rotation = (5.0 / (7f64.sqrt() * 2.0)).acos();
    let hexagons = [Vector2::zeros(), b];

    s.cell(a.x, 2.0 * b.y);
    s.polygon(6, rotation);
    for c in &hexagons {
        s.stamp(c.x, c.y);
    }

    for i in 0..6 {
        let theta = rotation + FRAC_PI_6 + i as f64 * PI / 3.0;
        let offset = Vector2::new(theta.cos(), theta.sin()) * (2.0 / r3);
        s.polygon(3, theta);
        for c in &hexagons {
            s.stamp(c.x + offset.x, c.y + offset.y);
        }
    }

    // A hole triangle has one corner on each of three hexagons; aim one
    // corner at the nearest corner of the hexagon at the origin.
    let hole = (a + b) / 3.0;
    let nearest = (0..6)
        .map(|k| {
            let t = rotation + k as f64 * PI / 3.0;
            Vector2::new(t.cos(), t.sin())
        })
        .min_by(|p, q| (p - hole).norm().total_cmp(&(q - hole).norm()))
        .unwrap_or(hole);
    let aim = nearest - hole;
    let turn = aim.y.atan2(aim.x);
    for (centre, rotation) in [(hole, turn), (hole * 2.0, turn + PI)] {
        s.polygon(3, rotation);
        for c in &hexagons {
            s.stamp(centre.x + c.x, centre.y + c.y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn edge_lengths(t: &RawTiling) -> Vec<f64> {
        t.faces
            .iter()
            .flat_map(|f| (0..f.len()).map(move |i| (f[i], f[(i + 1) % f.len()])))
            .map(|(a, b)| (t.points[a] - t.points[b]).norm())
            .collect()
    }

    fn signed_area(t: &RawTiling, face: &[usize]) -> f64 {
        (0..face.len())
            .map(|i| {
                let p = t.points[face[i]];
                let q = t.points[face[(i + 1) % face.len()]];
                p.x * q.y - q.x * p.y
            })
            .sum::<f64>()
            / 2.0
    }

    #[test]
    fn test_pattern_ids() {
        for (i, p) in UnitilePattern::ALL.iter().enumerate() {
            assert_eq!(p.id() as usize, i + 1);
            assert_eq!(UnitilePattern::try_from(p.id()).unwrap(), *p);
        }
        assert_eq!(UnitilePattern::try_from(0), Err(PolyError::UnknownPattern(0)));
        assert_eq!(UnitilePattern::try_from(12), Err(PolyError::UnknownPattern(12)));
    }

    #[test]
    fn test_square_counts() {
        let t = stamp(UnitilePattern::Square4444, 6.0, 6.0);
        assert_eq!(t.points.len(), 49);
        assert_eq!(t.faces.len(), 36);
        assert_eq!(t.extent, Vector2::new(6.0, 6.0));
    }

    #[test]
    fn test_every_pattern_is_a_unit_edge_tiling() {
        for pattern in UnitilePattern::ALL {
            let t = stamp(pattern, 6.0, 6.0);
            assert!(
                edge_lengths(&t).iter().all(|l| (l - 1.0).abs() < 1e-9),
                "{:?} has a non-unit edge",
                pattern
            );

            let mut directed = HashSet::new();
            for f in &t.faces {
                for i in 0..f.len() {
                    assert!(directed.insert((f[i], f[(i + 1) % f.len()])), "{:?} overlaps", pattern);
                }
            }

            // Polygons are stamped once per cell, so they cover the domain.
            let covered: f64 = t.faces.iter().map(|f| -signed_area(&t, f)).sum();
            assert!(
                (covered - t.extent.x * t.extent.y).abs() < 1e-6,
                "{:?} covers {} of {}",
                pattern,
                covered,
                t.extent.x * t.extent.y
            );
        }
    }

    #[test]
    fn test_snub_hexagonal_cell() {
        let t = stamp(UnitilePattern::SnubHexagonal33336, 1.0, 1.0);
        // One cell: two hexagons and sixteen triangles.
        assert_eq!(t.faces.iter().filter(|f| f.len() == 6).count(), 2);
        assert_eq!(t.faces.iter().filter(|f| f.len() == 3).count(), 16);
    }
}
