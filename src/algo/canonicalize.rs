//! Canonicalization by reciprocal relaxation.
//!
//! Hart's method alternates between a polyhedron and its dual. Each
//! iteration places the dual's vertices by reciprocating the primal's faces
//! about the unit sphere, then places the primal's vertices by reciprocating
//! the dual's faces. Two reciprocals are provided:
//!
//! - [`reciprocal_centers`]: face centroids reflected through the unit
//!   sphere. Used by [`adjust`], which evens out the spacing.
//! - [`reciprocal_vertices`]: the pole of each face plane, scaled by the mean
//!   edge distance. Used by [`planarize`], which flattens faces and moves
//!   edges toward tangency with the unit sphere.
//!
//! Relaxation is best effort. A step that produces a non-finite position is
//! discarded and the loop stops with [`CanonicalOutcome::Diverged`]. When
//! planarizing toward a threshold, so is a step that moves a vertex further
//! than [`MAX_VERTEX_CHANGE`]; a fixed iteration count never checks the
//! distance.
//!
//! # Example
//!
//! ```
//! use conway::algo::canonicalize::{canonicalize, CanonicalizeOptions};
//! use conway::shapes;
//!
//! let cube = shapes::cube();
//! let (canonical, report) = canonicalize(&cube, &CanonicalizeOptions::default()).unwrap();
//! assert!(report.planarize.is_converged());
//!
//! // Edges end up tangent to the unit sphere.
//! let h = canonical.halfedge_ids().next().unwrap();
//! assert!((canonical.midpoint(h).coords.norm() - 1.0).abs() < 1e-4);
//! ```

use log::{debug, info};
use nalgebra::Point3;
use rayon::prelude::*;

use crate::error::{PolyError, Result};
use crate::mesh::{ConwayPoly, FaceId};

use super::conway::dual;
use super::Progress;

/// Largest per-iteration vertex move accepted while planarizing toward a
/// threshold.
pub const MAX_VERTEX_CHANGE: f64 = 1.0;

/// Default iteration cap for [`Termination::Threshold`].
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

/// When a relaxation stops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Termination {
    /// Run exactly this many iterations, unless a position turns non-finite.
    Iterations(usize),
    /// Run until no vertex moves more than this far in one iteration.
    Threshold(f64),
}

/// Why a relaxation gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DivergenceReason {
    /// A computed position was NaN or infinite.
    NonFinite,
    /// A vertex moved further than [`MAX_VERTEX_CHANGE`].
    TooFar,
}

/// How a relaxation ended. `iterations` counts applied steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalOutcome {
    /// The threshold was met.
    Converged {
        /// Steps applied.
        iterations: usize,
    },
    /// The iteration count (or cap) ran out.
    IterationCapReached {
        /// Steps applied.
        iterations: usize,
    },
    /// A step was rejected; the positions before it were kept.
    Diverged {
        /// Steps applied before the rejected one.
        iterations: usize,
        /// What went wrong.
        reason: DivergenceReason,
    },
}

impl CanonicalOutcome {
    /// Number of steps applied.
    pub fn iterations(&self) -> usize {
        match *self {
            CanonicalOutcome::Converged { iterations }
            | CanonicalOutcome::IterationCapReached { iterations }
            | CanonicalOutcome::Diverged { iterations, .. } => iterations,
        }
    }

    /// True for [`CanonicalOutcome::Converged`].
    pub fn is_converged(&self) -> bool {
        matches!(self, CanonicalOutcome::Converged { .. })
    }
}

/// Options for [`canonicalize`].
#[derive(Debug, Clone)]
pub struct CanonicalizeOptions {
    /// Termination of the adjust pass. `Iterations(0)` or a non-positive
    /// threshold skips it.
    pub adjust: Termination,

    /// Termination of the planarize pass, skipped the same way.
    pub planarize: Termination,

    /// Iteration cap for threshold termination.
    pub max_iterations: usize,

    /// Compute reciprocals in parallel (default: false).
    pub parallel: bool,
}

impl Default for CanonicalizeOptions {
    fn default() -> Self {
        Self {
            adjust: Termination::Threshold(1e-6),
            planarize: Termination::Threshold(1e-6),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            parallel: false,
        }
    }
}

impl CanonicalizeOptions {
    /// Fixed iteration counts for both passes.
    pub fn iterations(adjust: usize, planarize: usize) -> Self {
        Self {
            adjust: Termination::Iterations(adjust),
            planarize: Termination::Iterations(planarize),
            ..Self::default()
        }
    }

    /// Thresholds for both passes.
    pub fn thresholds(adjust: f64, planarize: f64) -> Self {
        Self {
            adjust: Termination::Threshold(adjust),
            planarize: Termination::Threshold(planarize),
            ..Self::default()
        }
    }

    /// Set the iteration cap for threshold termination.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

/// Outcomes of the two passes of [`canonicalize`]. A skipped pass reports
/// zero iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalReport {
    /// The adjust pass.
    pub adjust: CanonicalOutcome,
    /// The planarize pass.
    pub planarize: CanonicalOutcome,
}

/// Adjust, then planarize, a copy of `poly`.
///
/// Only positions change: roles and tags come through untouched. Fails if
/// `poly` is not closed.
pub fn canonicalize(poly: &ConwayPoly, options: &CanonicalizeOptions) -> Result<(ConwayPoly, CanonicalReport)> {
    canonicalize_with_progress(poly, options, &Progress::none())
}

/// [`canonicalize`], reporting each iteration to `progress`.
pub fn canonicalize_with_progress(
    poly: &ConwayPoly,
    options: &CanonicalizeOptions,
    progress: &Progress,
) -> Result<(ConwayPoly, CanonicalReport)> {
    let mut out = poly.duplicate();
    let adjust = if skipped(options.adjust) {
        CanonicalOutcome::IterationCapReached { iterations: 0 }
    } else {
        relax(&mut out, options.adjust, Pass::Adjust, options, progress)?
    };
    let planarize = if skipped(options.planarize) {
        CanonicalOutcome::IterationCapReached { iterations: 0 }
    } else {
        relax(&mut out, options.planarize, Pass::Planarize, options, progress)?
    };
    progress.report(PASSES, PASSES, "canonicalized");
    info!(
        "canonicalize: adjust {:?}, planarize {:?}",
        adjust, planarize
    );
    Ok((out, CanonicalReport { adjust, planarize }))
}

/// Flatten faces in place. See the module docs.
pub fn planarize(poly: &mut ConwayPoly, termination: Termination) -> Result<CanonicalOutcome> {
    relax(poly, termination, Pass::Planarize, &CanonicalizeOptions::default(), &Progress::none())
}

/// Even out face centres in place. See the module docs.
pub fn adjust(poly: &mut ConwayPoly, termination: Termination) -> Result<CanonicalOutcome> {
    relax(poly, termination, Pass::Adjust, &CanonicalizeOptions::default(), &Progress::none())
}

/// For each face, the pole of its plane scaled by `(1 + d) / 2`, where `d` is
/// the mean distance from the origin to the lines through its edges.
pub fn reciprocal_vertices(poly: &ConwayPoly) -> Vec<Point3<f64>> {
    poly.face_ids().map(|f| reciprocal_vertex(poly, f)).collect()
}

/// For each face, its centroid reflected through the unit sphere.
pub fn reciprocal_centers(poly: &ConwayPoly) -> Vec<Point3<f64>> {
    poly.face_ids().map(|f| reciprocal_center(poly, f)).collect()
}

/// Passes run by [`canonicalize`]; each gets an equal share of the progress.
const PASSES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Adjust,
    Planarize,
}

impl Pass {
    fn name(self) -> &'static str {
        match self {
            Pass::Adjust => "adjust",
            Pass::Planarize => "planarize",
        }
    }

    fn stage(self) -> usize {
        match self {
            Pass::Adjust => 0,
            Pass::Planarize => 1,
        }
    }

    fn reciprocal(self, poly: &ConwayPoly, f: FaceId) -> Point3<f64> {
        match self {
            Pass::Adjust => reciprocal_center(poly, f),
            Pass::Planarize => reciprocal_vertex(poly, f),
        }
    }

    fn all(self, poly: &ConwayPoly, parallel: bool) -> Vec<Point3<f64>> {
        if parallel {
            (0..poly.num_faces())
                .into_par_iter()
                .map(|i| self.reciprocal(poly, FaceId::new(i)))
                .collect()
        } else {
            poly.face_ids().map(|f| self.reciprocal(poly, f)).collect()
        }
    }
}

fn skipped(termination: Termination) -> bool {
    match termination {
        Termination::Iterations(n) => n == 0,
        Termination::Threshold(t) => t <= 0.0,
    }
}

fn relax(
    poly: &mut ConwayPoly,
    termination: Termination,
    pass: Pass,
    options: &CanonicalizeOptions,
    progress: &Progress,
) -> Result<CanonicalOutcome> {
    if poly.num_faces() == 0 {
        return Err(PolyError::EmptyMesh);
    }
    let mut reciprocal = dual(poly)?;
    if reciprocal.num_vertices() != poly.num_faces() || reciprocal.num_faces() != poly.num_vertices() {
        return Err(PolyError::invalid_param(
            "poly",
            "open mesh",
            "canonicalization needs a closed polyhedron",
        ));
    }

    let (cap, threshold) = match termination {
        Termination::Iterations(n) => (n, None),
        Termination::Threshold(t) => (options.max_iterations, Some(t)),
    };

    for i in 0..cap {
        progress.report_sub(i, cap, pass.stage(), PASSES, pass.name());
        reciprocal.set_vertex_positions(&pass.all(poly, options.parallel));
        let next = pass.all(&reciprocal, options.parallel);

        if next.iter().any(|p| !p.coords.iter().all(|c| c.is_finite())) {
            debug!("{}: non-finite position after {} iterations", pass.name(), i);
            return Ok(CanonicalOutcome::Diverged {
                iterations: i,
                reason: DivergenceReason::NonFinite,
            });
        }
        let change = poly
            .vertex_ids()
            .map(|v| (next[v.index()] - poly.position(v)).norm())
            .fold(0.0, f64::max);
        if pass == Pass::Planarize && threshold.is_some() && change > MAX_VERTEX_CHANGE {
            debug!("{}: step of {} rejected after {} iterations", pass.name(), change, i);
            return Ok(CanonicalOutcome::Diverged {
                iterations: i,
                reason: DivergenceReason::TooFar,
            });
        }

        poly.set_vertex_positions(&next);
        if threshold.is_some_and(|t| change < t) {
            debug!("{}: converged after {} iterations", pass.name(), i + 1);
            return Ok(CanonicalOutcome::Converged { iterations: i + 1 });
        }
    }
    Ok(CanonicalOutcome::IterationCapReached { iterations: cap })
}

fn reciprocal_center(poly: &ConwayPoly, f: FaceId) -> Point3<f64> {
    let c = poly.face_centroid(f);
    Point3::from(c.coords / c.coords.norm_squared())
}

fn reciprocal_vertex(poly: &ConwayPoly, f: FaceId) -> Point3<f64> {
    let points: Vec<Point3<f64>> = poly.face_vertices(f).map(|v| *poly.position(v)).collect();
    let n = points.len();
    let centroid = poly.face_centroid(f);

    let mut normal = nalgebra::Vector3::zeros();
    let mut edge_distance = 0.0;
    for i in 0..n {
        let a = points[(i + n - 2) % n];
        let b = points[(i + n - 1) % n];
        let c = points[i];
        normal += (a - b).cross(&(c - b));
        edge_distance += origin_to_line(&a, &b);
    }
    let normal = normal.normalize();
    edge_distance /= n as f64;

    let pole = normal * centroid.coords.dot(&normal);
    Point3::from(pole / pole.norm_squared() * ((1.0 + edge_distance) / 2.0))
}

/// Distance from the origin to the line through `a` and `b`.
fn origin_to_line(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    let d = b - a;
    let len2 = d.norm_squared();
    if len2 < 1e-24 {
        return a.coords.norm();
    }
    let t = -a.coords.dot(&d) / len2;
    (a.coords + d * t).norm()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::conway::fixtures::open_quad;
    use crate::algo::transform::duplicate_transformed;
    use crate::mesh::Role;
    use crate::shapes;
    use nalgebra::{UnitQuaternion, Vector3};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_reciprocal_centers_of_cube() {
        let cube = shapes::cube();
        let centers = reciprocal_centers(&cube);
        assert_eq!(centers.len(), 6);
        // The top face sits at y = 1/sqrt(3); its reflection at sqrt(3).
        assert!((centers[3] - Point3::new(0.0, 3f64.sqrt(), 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_reciprocal_vertices_of_cube() {
        let cube = shapes::cube();
        let poles = reciprocal_vertices(&cube);
        // Pole at sqrt(3), scaled by (1 + d) / 2 with edge distance d = sqrt(2/3).
        let r = (3f64.sqrt() + 2f64.sqrt()) / 2.0;
        assert!((poles[0] - Point3::new(0.0, 0.0, -r)).norm() < 1e-12);
    }

    #[test]
    fn test_origin_to_line() {
        let d = origin_to_line(&Point3::new(1.0, 1.0, -5.0), &Point3::new(1.0, 1.0, 5.0));
        assert!((d - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_planarize_cube_to_edge_tangent() {
        let mut cube = shapes::cube();
        let outcome = planarize(&mut cube, Termination::Threshold(1e-9)).unwrap();
        assert!(outcome.is_converged());
        assert!(outcome.iterations() < 50);
        let s = 0.5f64.sqrt();
        for v in cube.vertex_ids() {
            assert!((cube.position(v).x.abs() - s).abs() < 1e-6);
        }
    }

    #[test]
    fn test_adjust_leaves_cube_alone() {
        let mut cube = shapes::cube();
        let before = cube.positions();
        let outcome = adjust(&mut cube, Termination::Threshold(1e-9)).unwrap();
        assert_eq!(outcome, CanonicalOutcome::Converged { iterations: 1 });
        for (a, b) in before.iter().zip(cube.positions()) {
            assert!((a - b).norm() < 1e-12);
        }
    }

    #[test]
    fn test_fixed_iterations() {
        let mut cube = shapes::cube();
        let outcome = planarize(&mut cube, Termination::Iterations(3)).unwrap();
        assert_eq!(outcome, CanonicalOutcome::IterationCapReached { iterations: 3 });
    }

    #[test]
    fn test_large_step_is_rejected_toward_threshold() {
        let big = duplicate_transformed(&shapes::cube(), &Vector3::zeros(), &UnitQuaternion::identity(), 10.0);
        let mut poly = big.duplicate();
        let outcome = planarize(&mut poly, Termination::Threshold(1e-6)).unwrap();
        assert_eq!(
            outcome,
            CanonicalOutcome::Diverged {
                iterations: 0,
                reason: DivergenceReason::TooFar
            }
        );
        assert_eq!(poly.positions(), big.positions());
    }

    #[test]
    fn test_fixed_iterations_ignore_step_size() {
        let big = duplicate_transformed(&shapes::cube(), &Vector3::zeros(), &UnitQuaternion::identity(), 10.0);
        let mut poly = big.duplicate();
        let outcome = planarize(&mut poly, Termination::Iterations(5)).unwrap();
        assert_eq!(outcome, CanonicalOutcome::IterationCapReached { iterations: 5 });
        assert_ne!(poly.positions(), big.positions());
        let (_, max) = poly.bounding_box().unwrap();
        assert!(max.x < 2.0);
    }

    #[test]
    fn test_face_through_origin_is_non_finite() {
        let cube = shapes::cube();
        // Slide the left face (x = -1/sqrt(3)) onto the origin.
        let left = cube.position(crate::mesh::VertexId::new(0)).x;
        let shifted = duplicate_transformed(
            &cube,
            &Vector3::new(-left, 0.0, 0.0),
            &UnitQuaternion::identity(),
            1.0,
        );
        let mut poly = shifted.duplicate();
        let outcome = planarize(&mut poly, Termination::Threshold(1e-6)).unwrap();
        assert_eq!(
            outcome,
            CanonicalOutcome::Diverged {
                iterations: 0,
                reason: DivergenceReason::NonFinite
            }
        );
        assert_eq!(poly.positions(), shifted.positions());
    }

    #[test]
    fn test_open_mesh_is_rejected() {
        let mut quad = open_quad();
        assert!(planarize(&mut quad, Termination::Iterations(1)).is_err());
    }

    #[test]
    fn test_empty_mesh_is_rejected() {
        let mut empty = ConwayPoly::new();
        assert_eq!(adjust(&mut empty, Termination::Iterations(1)), Err(PolyError::EmptyMesh));
        assert!(matches!(
            canonicalize(&empty, &CanonicalizeOptions::default()),
            Err(PolyError::EmptyMesh)
        ));
    }

    #[test]
    fn test_canonicalize_keeps_metadata() {
        let mut cube = shapes::cube();
        cube.set_face_role(crate::mesh::FaceId::new(2), Role::NewAlt);
        let (out, report) = canonicalize(&cube, &CanonicalizeOptions::default()).unwrap();
        assert!(report.adjust.is_converged());
        assert!(report.planarize.is_converged());
        assert_eq!(out.face_role(crate::mesh::FaceId::new(2)), Role::NewAlt);
        assert_eq!(out.num_faces(), 6);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let ico = shapes::icosahedron();
        let options = CanonicalizeOptions::iterations(5, 5);
        let (a, _) = canonicalize(&ico, &options.clone().sequential()).unwrap();
        let (b, _) = canonicalize(&ico, &options.with_parallel(true)).unwrap();
        assert_eq!(a.positions(), b.positions());
    }

    #[test]
    fn test_skipped_passes_and_progress() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        let progress = Progress::new(move |current, total, message| {
            log.lock().unwrap().push((current, total, message.to_string()));
        });
        let options = CanonicalizeOptions::iterations(0, 4);
        let (_, report) = canonicalize_with_progress(&shapes::cube(), &options, &progress).unwrap();
        assert_eq!(report.adjust.iterations(), 0);
        assert_eq!(report.planarize.iterations(), 4);

        // Planarize owns the second half of the range, then one final report.
        let seen = seen.lock().unwrap();
        let steps: Vec<(usize, usize)> = seen.iter().map(|(c, t, _)| (*c, *t)).collect();
        assert_eq!(steps, vec![(1000, 2000), (1250, 2000), (1500, 2000), (1750, 2000), (2, 2)]);
        assert_eq!(seen[0].2, "planarize");
    }

    #[test]
    fn test_both_passes_share_the_progress_range() {
        let calls = Arc::new(AtomicUsize::new(0));
        let below_half = Arc::new(AtomicUsize::new(0));
        let (count, low) = (calls.clone(), below_half.clone());
        let progress = Progress::new(move |current, total, _| {
            count.fetch_add(1, Ordering::SeqCst);
            if current * 2 < total {
                low.fetch_add(1, Ordering::SeqCst);
            }
        });
        let options = CanonicalizeOptions::iterations(3, 2);
        canonicalize_with_progress(&shapes::cube(), &options, &progress).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 6);
        assert_eq!(below_half.load(Ordering::SeqCst), 3);
    }
}
