//! Merge near-coincident vertices.

use log::debug;

use crate::error::Result;
use crate::mesh::{ConwayPoly, FlatPoly, Role};

use super::spatial_hash::SpatialHash;

/// Smallest effective weld distance. A weld always merges at least exact
/// duplicates.
pub const MIN_WELD_DISTANCE: f64 = 1e-5;

/// Merge vertices closer than `distance`.
///
/// Vertices are visited in index order; each unassigned vertex starts a
/// group and claims every unassigned vertex within `distance` of it, so the
/// representative is the lowest index and a vertex never changes group.
/// Faces are rewritten through the merge. Loops that collapse below three
/// corners are dropped. All roles become `New`; face tags are kept.
pub fn weld(poly: &ConwayPoly, distance: f64) -> Result<ConwayPoly> {
    let distance = distance.max(MIN_WELD_DISTANCE);
    let points = poly.positions();
    let hash = SpatialHash::new(&points, distance * 2.0);

    let mut replacement: Vec<Option<usize>> = vec![None; points.len()];
    let mut positions = Vec::new();
    for i in 0..points.len() {
        if replacement[i].is_some() {
            continue;
        }
        let group = positions.len();
        positions.push(points[i]);
        replacement[i] = Some(group);
        for j in hash.within(&points, &points[i], distance) {
            if replacement[j].is_none() {
                replacement[j] = Some(group);
            }
        }
    }

    let faces: Vec<Vec<usize>> = poly
        .face_ids()
        .map(|f| {
            poly.face_vertices(f)
                .filter_map(|v| replacement[v.index()])
                .collect()
        })
        .collect();

    debug!(
        "weld at {}: {} vertices merged into {}",
        distance,
        points.len(),
        positions.len()
    );

    let flat = FlatPoly {
        vertex_roles: vec![Role::New; positions.len()],
        face_roles: vec![Role::New; faces.len()],
        face_tags: Some(poly.faces().map(|(_, f)| f.tags.clone()).collect()),
        positions,
        faces,
    };
    let mut out = ConwayPoly::from_flat(&flat)?;
    out.set_pq(poly.pq());
    Ok(out)
}
