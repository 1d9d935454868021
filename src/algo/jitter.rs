//! Explicit randomness for randomizable operators.
//!
//! Operators that can perturb their amounts take a [`Jitter`]. Without a
//! source every factor is exactly 1.0, so results are deterministic. For
//! reproducible randomness seed a `rand_chacha::ChaCha8Rng`:
//!
//! ```
//! use conway::algo::Jitter;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(7);
//! let mut jitter = Jitter::new(&mut rng);
//! let f = jitter.factor();
//! assert!((0.0..1.0).contains(&f));
//!
//! assert_eq!(Jitter::none().factor(), 1.0);
//! ```

use rand::{Rng, RngCore};

/// An optional random source.
#[derive(Default)]
pub struct Jitter<'a> {
    rng: Option<&'a mut dyn RngCore>,
}

impl<'a> Jitter<'a> {
    /// No randomness: every factor is 1.0.
    pub fn none() -> Self {
        Self { rng: None }
    }

    /// Draw factors from `rng`.
    pub fn new(rng: &'a mut dyn RngCore) -> Self {
        Self { rng: Some(rng) }
    }

    /// Wrap an optional source.
    pub fn from_option(rng: Option<&'a mut dyn RngCore>) -> Self {
        Self { rng }
    }

    /// True when factors are random.
    pub fn is_random(&self) -> bool {
        self.rng.is_some()
    }

    /// A factor in `[0, 1)`, or exactly 1.0 without a source.
    pub fn factor(&mut self) -> f64 {
        match self.rng.as_mut() {
            Some(rng) => rng.gen::<f64>(),
            None => 1.0,
        }
    }

    /// Borrow the same source for a nested call.
    pub fn reborrow(&mut self) -> Jitter<'_> {
        Jitter {
            rng: self.rng.as_mut().map(|r| &mut **r as &mut dyn RngCore),
        }
    }
}

impl std::fmt::Debug for Jitter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Jitter")
            .field("random", &self.is_random())
            .finish()
    }
}
