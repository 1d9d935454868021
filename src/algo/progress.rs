//! Progress reporting for chains and iterative passes.
//!
//! [`apply_chain`](super::chain::apply_chain) reports once per step and
//! [`canonicalize_with_progress`](super::canonicalize::canonicalize_with_progress)
//! once per relaxation iteration, each pass within its own half of the range
//! through [`Progress::report_sub`].
//!
//! # Example
//!
//! ```
//! use conway::algo::chain::{apply_chain, OpStep};
//! use conway::algo::Progress;
//! use conway::shapes;
//!
//! let progress = Progress::new(|current, total, message| {
//!     println!("[{}/{}] {}", current + 1, total, message);
//! });
//!
//! let steps = ["ambo".parse::<OpStep>().unwrap(), "kis:0.2".parse().unwrap()];
//! let poly = apply_chain(&shapes::cube(), &steps, None, &progress).unwrap();
//! assert_eq!(poly.num_faces(), 48);
//! ```

/// A progress callback that receives updates during long-running operations.
///
/// The callback receives:
/// - `current`: Current step (0-based)
/// - `total`: Total number of steps
/// - `message`: Description of the current operation
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
}

impl Progress {
    /// Create a new progress reporter with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Report progress.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        (self.callback)(current, total, message);
    }

    /// Report progress within a sub-range.
    ///
    /// Maps progress from `[0, sub_total]` to `[range_current, range_current + 1]`
    /// within a total of `range_total` steps. This enables hierarchical progress
    /// where sub-operations report their progress within an allocated slice.
    ///
    /// # Example
    ///
    /// ```
    /// # use conway::algo::Progress;
    /// # let progress = Progress::none();
    /// // Second of three passes, a quarter of the way through.
    /// progress.report_sub(25, 100, 1, 3, "planarize");
    /// ```
    #[inline]
    pub fn report_sub(
        &self,
        sub_current: usize,
        sub_total: usize,
        range_current: usize,
        range_total: usize,
        message: &str,
    ) {
        if sub_total == 0 || range_total == 0 {
            return;
        }
        // Fixed point, 1000 sub-steps per range step.
        let sub_fraction = (sub_current * 1000) / sub_total;
        let effective = range_current * 1000 + sub_fraction;
        let total_scaled = range_total * 1000;
        (self.callback)(effective, total_scaled, message);
    }

    /// Create a no-op progress reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_report_sub_scales_into_range() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        let progress = Progress::new(move |c, t, _| log.lock().unwrap().push((c, t)));
        progress.report_sub(1, 4, 2, 5, "x");
        progress.report_sub(1, 0, 2, 5, "skipped");
        assert_eq!(*seen.lock().unwrap(), vec![(2250, 5000)]);
    }
}
