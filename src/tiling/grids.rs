//! Simple planar grids in the xz plane, faces wound to face +y.

use std::f64::consts::PI;

use nalgebra::Point3;

use crate::error::{PolyError, Result};
use crate::mesh::{ConwayPoly, FlatPoly, Role};

fn build(positions: Vec<Point3<f64>>, faces: Vec<Vec<usize>>, face_roles: Vec<Role>) -> Result<ConwayPoly> {
    let flat = FlatPoly {
        vertex_roles: vec![Role::New; positions.len()],
        positions,
        faces,
        face_roles,
        face_tags: None,
    };
    ConwayPoly::from_flat(&flat)
}

fn positive(name: &'static str, n: usize) -> Result<()> {
    if n == 0 {
        Err(PolyError::invalid_param(name, n, "must be positive"))
    } else {
        Ok(())
    }
}

/// A `rows` by `cols` grid of quads, centred on the origin, in checkerboard
/// `New`/`NewAlt`.
pub fn make_grid(rows: usize, cols: usize, row_scale: f64, col_scale: f64) -> Result<ConwayPoly> {
    positive("rows", rows)?;
    positive("cols", cols)?;
    let row_offset = rows as f64 * row_scale * 0.5;
    let col_offset = cols as f64 * col_scale * 0.5;
    let stride = cols + 1;

    let mut positions = Vec::with_capacity((rows + 1) * stride);
    for row in 0..=rows {
        for col in 0..=cols {
            positions.push(Point3::new(
                -row_offset + row as f64 * row_scale,
                0.0,
                -col_offset + col as f64 * col_scale,
            ));
        }
    }

    let mut faces = Vec::with_capacity(rows * cols);
    let mut roles = Vec::with_capacity(rows * cols);
    for row in 1..=rows {
        for col in 1..=cols {
            let corner = row * stride + col;
            faces.push(vec![corner, corner - 1, corner - stride - 1, corner - stride]);
            roles.push(if (row + col) % 2 == 0 { Role::New } else { Role::NewAlt });
        }
    }
    build(positions, faces, roles)
}

/// Lattice of unit-spaced points whose odd rows are shifted half a step.
fn iso_points(cols: usize, rows: usize) -> Vec<Point3<f64>> {
    let row_step = 3f64.sqrt() / 2.0;
    let mut positions = Vec::with_capacity((rows + 1) * (cols + 1));
    for row in 0..=rows {
        let shift = if row % 2 == 1 { -0.5 } else { 0.0 };
        for col in 0..=cols {
            positions.push(Point3::new(col as f64 + shift, 0.0, row as f64 * row_step));
        }
    }
    positions
}

/// A grid of unit equilateral triangles, two per cell, recentred.
pub fn make_iso_grid(cols: usize, rows: usize) -> Result<ConwayPoly> {
    positive("cols", cols)?;
    positive("rows", rows)?;
    let stride = cols + 1;
    let positions = iso_points(cols, rows);
    let mut faces = Vec::with_capacity(2 * rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            let c = row * stride + col;
            if row % 2 == 0 {
                faces.push(vec![c, c + stride, c + stride + 1]);
                faces.push(vec![c, c + stride + 1, c + 1]);
            } else {
                faces.push(vec![c, c + stride, c + 1]);
                faces.push(vec![c + 1, c + stride, c + stride + 1]);
            }
        }
    }
    let roles = vec![Role::New; faces.len()];
    let mut poly = build(positions, faces, roles)?;
    poly.recenter();
    Ok(poly)
}

/// A grid of unit hexagons, `cols` across and about `2 * rows` high,
/// recentred. Hexagons are cut from a triangle lattice.
pub fn make_hex_grid(cols: usize, rows: usize) -> Result<ConwayPoly> {
    positive("cols", cols)?;
    positive("rows", rows)?;
    let odd = cols % 2 == 1;
    let lattice_cols = cols * 3 / 2 + if odd { 3 } else { 1 };
    let lattice_rows = rows * 2 + 2;
    let s = lattice_cols + 1;
    let positions = iso_points(lattice_cols, lattice_rows + 2);

    let mut faces = Vec::new();
    for row in (0..lattice_rows - 3).step_by(2) {
        for col in (0..lattice_cols - 3).step_by(3) {
            let c = row * s + col;
            faces.push(vec![c, c + s, c + 2 * s, c + 2 * s + 1, c + s + 2, c + 1]);
            if odd && col == lattice_cols - 4 {
                continue;
            }
            let c = c + s + 2;
            faces.push(vec![c, c + s - 1, c + 2 * s, c + 2 * s + 1, c + s + 1, c + 1]);
        }
    }
    let roles = vec![Role::New; faces.len()];
    let mut poly = build(positions, faces, roles)?;
    poly.recenter();
    Ok(poly)
}

/// A disc of radius 1 in `divisions` rings: a fan of `sides` triangles
/// around the centre, then rings of quads. Faces cycle through `New`,
/// `NewAlt` and, for odd `sides`, `ExistingAlt`.
pub fn make_polar_grid(sides: usize, divisions: usize) -> Result<ConwayPoly> {
    if sides < 3 {
        return Err(PolyError::invalid_param("sides", sides, "must be at least 3"));
    }
    positive("divisions", divisions)?;
    let theta = 2.0 * PI / sides as f64;

    let mut positions = vec![Point3::origin()];
    for d in 1..=divisions {
        let radius = d as f64 / divisions as f64;
        for i in 0..sides {
            let angle = theta * (i + 1) as f64;
            positions.push(Point3::new(angle.cos() * radius, 0.0, angle.sin() * radius));
        }
    }

    // Odd rings use three colours; the last cell is nudged where the cycle
    // would otherwise repeat a colour across the seam.
    let cyclic = |i: usize, base: usize| -> Role {
        if sides % 2 == 0 {
            Role::from_index((i + base) % 2 + 2)
        } else {
            let nudge = usize::from(i == sides - 1 && sides % 3 == 1);
            Role::from_index((i + base + nudge) % 3 + 2)
        }
    };

    let mut faces = Vec::with_capacity(sides * divisions);
    let mut roles = Vec::with_capacity(sides * divisions);
    for i in 0..sides {
        faces.push(vec![0, (i + 1) % sides + 1, i + 1]);
        roles.push(cyclic(i, 0));
    }
    for d in 0..divisions - 1 {
        let ring = d * sides + 1;
        let next = (d + 1) * sides + 1;
        for i in 0..sides {
            let j = (i + 1) % sides;
            faces.push(vec![ring + i, ring + j, next + j, next + i]);
            roles.push(cyclic(i, d + usize::from(sides % 2 == 1)));
        }
    }
    build(positions, faces, roles)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_edges(poly: &ConwayPoly) -> bool {
        poly.halfedge_ids().all(|h| (poly.halfedge_vector(h).norm() - 1.0).abs() < 1e-9)
    }

    fn faces_up(poly: &ConwayPoly) -> bool {
        poly.face_ids().all(|f| poly.face_normal(f).y > 0.99)
    }

    #[test]
    fn test_quad_grid() {
        let grid = make_grid(3, 2, 0.5, 0.5).unwrap();
        assert_eq!(grid.num_vertices(), 12);
        assert_eq!(grid.num_faces(), 6);
        assert!(faces_up(&grid));
        assert!(grid.centroid().coords.norm() < 1e-9);
        let roles: Vec<Role> = grid.face_ids().map(|f| grid.face_role(f)).collect();
        assert_eq!(roles, vec![Role::New, Role::NewAlt, Role::NewAlt, Role::New, Role::New, Role::NewAlt]);
        assert_eq!(grid.euler_characteristic(), 1);
    }

    #[test]
    fn test_iso_grid() {
        let grid = make_iso_grid(3, 2).unwrap();
        assert_eq!(grid.num_vertices(), 12);
        assert_eq!(grid.num_faces(), 12);
        assert!(unit_edges(&grid));
        assert!(faces_up(&grid));
        assert_eq!(grid.euler_characteristic(), 1);
    }

    #[test]
    fn test_hex_grid() {
        let grid = make_hex_grid(4, 4).unwrap();
        assert_eq!(grid.num_faces(), 16);
        assert_eq!(grid.num_vertices(), 48);
        assert!(grid.face_ids().all(|f| grid.face_sides(f) == 6));
        assert!(unit_edges(&grid));
        assert!(faces_up(&grid));

        let odd = make_hex_grid(3, 2).unwrap();
        assert_eq!(odd.num_faces(), 6);
        assert_eq!(odd.num_vertices(), 22);
    }

    #[test]
    fn test_polar_grid() {
        let disc = make_polar_grid(6, 4).unwrap();
        assert_eq!(disc.num_vertices(), 25);
        assert_eq!(disc.num_faces(), 24);
        assert!(faces_up(&disc));
        assert_eq!(disc.euler_characteristic(), 1);
        assert_eq!(disc.find_boundaries().len(), 1);
        // Even sides alternate two colours around each ring.
        let fan: Vec<Role> = (0..6).map(|i| disc.face_role(crate::mesh::FaceId::new(i))).collect();
        assert_eq!(fan, vec![Role::New, Role::NewAlt, Role::New, Role::NewAlt, Role::New, Role::NewAlt]);

        let odd = make_polar_grid(5, 2).unwrap();
        assert_eq!(odd.num_faces(), 10);
        assert!(odd.faces().any(|(_, f)| f.role == Role::ExistingAlt));
    }

    #[test]
    fn test_rejects_empty_grids() {
        assert!(make_grid(0, 3, 1.0, 1.0).is_err());
        assert!(make_iso_grid(2, 0).is_err());
        assert!(make_hex_grid(0, 1).is_err());
        assert!(make_polar_grid(2, 3).is_err());
        assert!(make_polar_grid(5, 0).is_err());
    }
}
