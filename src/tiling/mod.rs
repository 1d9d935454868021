//! Tiling generators.
//!
//! [`unitile`] stamps one of eleven unit-edge Archimedean patterns over a
//! rectangular domain and optionally wraps it onto a surface (torus,
//! Möbius strip, Klein bottle, ...). The simple grid builders in [`grids`]
//! make quad, triangle, hexagon and polar grids directly.
//!
//! # Example
//!
//! ```
//! use conway::tiling::{unitile, GridShape, UnitileOptions, UnitilePattern};
//!
//! let options = UnitileOptions::new(UnitilePattern::Square4444, GridShape::Torus)
//!     .with_size(4, 4)
//!     .with_weld(true);
//! let torus = unitile(&options).unwrap();
//! assert_eq!(torus.num_faces(), 16);
//! assert_eq!(torus.euler_characteristic(), 0);
//! ```

pub mod grids;
mod patterns;
mod surface;

pub use grids::{make_grid, make_hex_grid, make_iso_grid, make_polar_grid};
pub use patterns::{stamp, RawTiling, UnitilePattern, MERGE_TOLERANCE};
pub use surface::{GridShape, Seam};

use log::debug;

use crate::algo::weld::weld;
use crate::error::{PolyError, Result};
use crate::mesh::{ConwayPoly, FlatPoly, Role};

/// Weld distance for wrapped tilings.
pub const TILE_WELD_DISTANCE: f64 = 0.001;

/// Options for [`unitile`].
#[derive(Debug, Clone, PartialEq)]
pub struct UnitileOptions {
    /// Which pattern to stamp.
    pub pattern: UnitilePattern,
    /// The surface to wrap onto.
    pub shape: GridShape,
    /// Domain extent along x, in unit edges.
    pub rows: usize,
    /// Domain extent along z, in unit edges.
    pub cols: usize,
    /// Merge coincident vertices after wrapping. Ignored for the plane.
    pub weld: bool,
}

impl Default for UnitileOptions {
    fn default() -> Self {
        Self {
            pattern: UnitilePattern::default(),
            shape: GridShape::default(),
            rows: 5,
            cols: 5,
            weld: false,
        }
    }
}

impl UnitileOptions {
    /// Options for `pattern` on `shape`, 5 by 5.
    pub fn new(pattern: UnitilePattern, shape: GridShape) -> Self {
        Self {
            pattern,
            shape,
            ..Default::default()
        }
    }

    /// Options from numeric ids: pattern 1 to 11, shape 0 to 12.
    pub fn from_ids(pattern: u8, shape: u8) -> Result<Self> {
        Ok(Self::new(pattern.try_into()?, shape.try_into()?))
    }

    /// Set the domain size.
    pub fn with_size(mut self, rows: usize, cols: usize) -> Self {
        self.rows = rows;
        self.cols = cols;
        self
    }

    /// Weld coincident vertices on wrapped shapes.
    pub fn with_weld(mut self, weld: bool) -> Self {
        self.weld = weld;
        self
    }
}

/// Build a tiling.
///
/// Vertex roles are `New`; face roles colour the pattern. The result is
/// recentred on the origin, then welded at [`TILE_WELD_DISTANCE`] when the
/// shape is not the plane and `weld` is set.
pub fn unitile(options: &UnitileOptions) -> Result<ConwayPoly> {
    let UnitileOptions {
        pattern,
        shape,
        rows,
        cols,
        weld: welded,
    } = *options;
    if rows == 0 {
        return Err(PolyError::invalid_param("rows", rows, "must be positive"));
    }
    if cols == 0 {
        return Err(PolyError::invalid_param("cols", cols, "must be positive"));
    }

    let raw = stamp(pattern, rows as f64, cols as f64);
    let positions = shape.wrap(&raw.points, raw.extent);
    let face_roles = colour(pattern, &raw.faces, rows, cols);

    let flat = FlatPoly {
        vertex_roles: vec![Role::New; positions.len()],
        positions,
        faces: raw.faces,
        face_roles,
        face_tags: None,
    };
    let mut poly = ConwayPoly::from_flat(&flat)?;
    poly.recenter();
    if shape != GridShape::Plane && welded {
        poly = weld(&poly, TILE_WELD_DISTANCE)?;
    }
    debug!(
        "unitile {:?} on {:?}: {} vertices, {} faces",
        pattern,
        shape,
        poly.num_vertices(),
        poly.num_faces()
    );
    Ok(poly)
}

/// Build a tiling from numeric ids.
pub fn make_unitile_grid(pattern: u8, shape: u8, rows: usize, cols: usize, weld: bool) -> Result<ConwayPoly> {
    let options = UnitileOptions::from_ids(pattern, shape)?
        .with_size(rows, cols)
        .with_weld(weld);
    unitile(&options)
}

/// Per-face roles colouring each pattern.
fn colour(pattern: UnitilePattern, faces: &[Vec<usize>], rows: usize, cols: usize) -> Vec<Role> {
    let n = faces.len();
    let by_sides = |sides: &[usize]| -> Vec<Role> {
        faces
            .iter()
            .map(|f| {
                let k = sides.iter().position(|&s| s == f.len()).unwrap_or(sides.len());
                Role::from_index(k + 2)
            })
            .collect()
    };
    let halves = || (0..n).map(|i| if i < n / 2 { Role::New } else { Role::NewAlt }).collect();

    match pattern {
        UnitilePattern::Square4444 => (0..n)
            .map(|i| {
                let shift = if cols % 2 == 0 { (i / cols) % 2 } else { 0 };
                Role::from_index((i + shift) % 2 + 2)
            })
            .collect(),
        UnitilePattern::Triangle333333 | UnitilePattern::ElongatedTriangular33344 => halves(),
        UnitilePattern::Hexagon666 => {
            let width = (rows as f64 / 3f64.sqrt()).ceil().max(1.0) as usize;
            let band = (n / width / 2).max(1);
            (0..n)
                .map(|i| {
                    let mut offset = usize::from(i >= n / 2);
                    if offset == 1 && width % 3 == 0 {
                        offset += 1;
                    }
                    if offset == 1 && width % 3 == 2 {
                        offset += 2;
                    }
                    Role::from_index((i / band + offset) % 3 + 2)
                })
                .collect()
        }
        UnitilePattern::Trihexagonal3636
        | UnitilePattern::SnubSquare33434
        | UnitilePattern::TruncatedHexagonal31212 => by_sides(&[3]),
        UnitilePattern::TruncatedSquare488 => by_sides(&[8]),
        UnitilePattern::Rhombitrihexagonal3464 => by_sides(&[3, 4, 6]),
        UnitilePattern::TruncatedTrihexagonal4612 => by_sides(&[4, 6, 12]),
        UnitilePattern::SnubHexagonal33336 => by_sides(&[3]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_square_grid() {
        let options = UnitileOptions::new(UnitilePattern::Square4444, GridShape::Plane).with_size(3, 4);
        let poly = unitile(&options).unwrap();
        assert_eq!(poly.num_faces(), 12);
        assert_eq!(poly.num_vertices(), 20);
        assert!(poly.vertices().all(|(_, v)| v.role == Role::New));
        assert!(poly.centroid().coords.norm() < 1e-9);
        // Checkerboard.
        let roles: Vec<Role> = poly.face_ids().map(|f| poly.face_role(f)).collect();
        assert_eq!(&roles[..5], &[Role::New, Role::NewAlt, Role::New, Role::NewAlt, Role::NewAlt]);
    }

    #[test]
    fn test_every_torus_is_closed() {
        for pattern in UnitilePattern::ALL {
            let options = UnitileOptions::new(pattern, GridShape::Torus)
                .with_size(6, 6)
                .with_weld(true);
            let torus = unitile(&options).unwrap();
            assert!(!torus.has_naked(), "{:?} torus has naked edges", pattern);
            assert_eq!(torus.euler_characteristic(), 0, "{:?}", pattern);
            assert!(torus.is_valid());
        }
    }

    #[test]
    fn test_weld_is_skipped_on_the_plane() {
        let plane = make_unitile_grid(3, 0, 6, 6, true).unwrap();
        let unwelded = make_unitile_grid(3, 0, 6, 6, false).unwrap();
        assert_eq!(plane.num_vertices(), unwelded.num_vertices());
        assert_eq!(plane.num_faces(), 16);
    }

    #[test]
    fn test_unwelded_torus_keeps_seam_copies() {
        let open = make_unitile_grid(1, 1, 4, 4, false).unwrap();
        assert_eq!(open.num_vertices(), 25);
        assert!(open.has_naked());
    }

    #[test]
    fn test_every_shape_builds() {
        for shape in GridShape::ALL {
            for weld in [false, true] {
                let poly = unitile(&UnitileOptions::new(UnitilePattern::Trihexagonal3636, shape).with_weld(weld)).unwrap();
                assert!(poly.num_faces() > 0, "{:?}", shape);
                assert!(poly.positions().iter().all(|p| p.coords.iter().all(|c| c.is_finite())));
            }
        }
    }

    #[test]
    fn test_side_count_colouring() {
        let poly = make_unitile_grid(10, 0, 6, 6, false).unwrap();
        for f in poly.face_ids() {
            let expected = match poly.face_sides(f) {
                3 => Role::New,
                4 => Role::NewAlt,
                _ => Role::ExistingAlt,
            };
            assert_eq!(poly.face_role(f), expected);
        }
    }

    #[test]
    fn test_bad_ids_and_sizes() {
        assert_eq!(make_unitile_grid(0, 0, 3, 3, false).err(), Some(PolyError::UnknownPattern(0)));
        assert_eq!(make_unitile_grid(1, 13, 3, 3, false).err(), Some(PolyError::UnknownShape(13)));
        assert!(make_unitile_grid(1, 0, 0, 3, false).is_err());
    }
}
