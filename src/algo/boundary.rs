//! Boundary loops and hole filling.

use std::collections::{HashMap, HashSet};

use log::{debug, warn};

use crate::mesh::{ConwayPoly, HalfEdgeId, Role, TagSet, VertexId};

/// Upper bound on the steps taken while walking one boundary loop.
pub const MAX_LOOP_STEPS: usize = 1000;

impl ConwayPoly {
    /// Group the naked half-edges into closed loops.
    ///
    /// From a naked half-edge `u -> v` the walk continues with a naked
    /// half-edge whose head is `u`, so each loop runs against the winding of
    /// the faces around the hole. Loops shorter than three edges, or that
    /// do not close within [`MAX_LOOP_STEPS`], are discarded.
    pub fn find_boundaries(&self) -> Vec<Vec<HalfEdgeId>> {
        let mut by_head: HashMap<VertexId, Vec<HalfEdgeId>> = HashMap::new();
        for h in self.halfedge_ids().filter(|&h| self.is_naked(h)) {
            by_head.entry(self.head(h)).or_default().push(h);
        }

        let mut visited = HashSet::new();
        let mut loops = Vec::new();
        for start in self.halfedge_ids() {
            if !self.is_naked(start) || visited.contains(&start) {
                continue;
            }
            let mut boundary = Vec::new();
            let mut current = start;
            let mut closed = false;
            for _ in 0..MAX_LOOP_STEPS {
                boundary.push(current);
                visited.insert(current);
                let candidates = by_head.get(&self.tail(current)).map(Vec::as_slice).unwrap_or(&[]);
                let next = candidates
                    .iter()
                    .copied()
                    .find(|&c| c != current && (c == start || !visited.contains(&c)));
                match next {
                    Some(n) if n == start => {
                        closed = true;
                        break;
                    }
                    Some(n) => current = n,
                    None => break,
                }
            }
            if closed && boundary.len() >= 3 {
                loops.push(boundary);
            } else {
                debug!("discarding open boundary walk of {} edges", boundary.len());
            }
        }
        loops
    }

    /// Cap every boundary loop with one `New` face. In place.
    ///
    /// Each cap is tried in loop order, then reversed. Returns the number
    /// of faces added.
    pub fn fill_holes(&mut self) -> usize {
        let mut added = 0;
        for boundary in self.find_boundaries() {
            let mut corners: Vec<VertexId> = boundary.iter().map(|&h| self.head(h)).collect();
            if self.add_face_with(&corners, Role::New, TagSet::new()).is_none() {
                corners.reverse();
                if self.add_face_with(&corners, Role::New, TagSet::new()).is_none() {
                    warn!("could not cap a hole of {} edges", corners.len());
                    continue;
                }
            }
            added += 1;
        }
        self.match_pairs();
        added
    }

    /// Whether any half-edge lacks a pair.
    pub fn has_naked(&self) -> bool {
        self.halfedge_ids().any(|h| self.is_naked(h))
    }
}
