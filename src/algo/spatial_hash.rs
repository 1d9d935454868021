//! Uniform-grid point index for proximity queries.

use std::collections::HashMap;

use nalgebra::Point3;

type Cell = (i64, i64, i64);

/// Points bucketed into cubic cells of a fixed size.
///
/// With a cell size of at least twice the query radius, every point within
/// the radius lies in the 3x3x3 block of cells around the query.
#[derive(Debug, Clone)]
pub struct SpatialHash {
    cell_size: f64,
    cells: HashMap<Cell, Vec<usize>>,
}

impl SpatialHash {
    /// Index `points` with cells of edge `cell_size`.
    pub fn new(points: &[Point3<f64>], cell_size: f64) -> Self {
        let mut hash = Self {
            cell_size,
            cells: HashMap::with_capacity(points.len()),
        };
        for (i, p) in points.iter().enumerate() {
            let cell = hash.cell(p);
            hash.cells.entry(cell).or_default().push(i);
        }
        hash
    }

    fn cell(&self, p: &Point3<f64>) -> Cell {
        (
            (p.x / self.cell_size).floor() as i64,
            (p.y / self.cell_size).floor() as i64,
            (p.z / self.cell_size).floor() as i64,
        )
    }

    /// Indices of the points within `radius` of `query`, in ascending order.
    pub fn within(&self, points: &[Point3<f64>], query: &Point3<f64>, radius: f64) -> Vec<usize> {
        let (cx, cy, cz) = self.cell(query);
        let r2 = radius * radius;
        let mut found = Vec::new();
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(bucket) = self.cells.get(&(cx + dx, cy + dy, cz + dz)) else {
                        continue;
                    };
                    found.extend(
                        bucket
                            .iter()
                            .copied()
                            .filter(|&i| (points[i] - query).norm_squared() <= r2),
                    );
                }
            }
        }
        found.sort_unstable();
        found
    }
}
