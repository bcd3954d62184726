//! sdg_math — probability functions consumed (never fitted) by value
//! providers: closed-form parametric continuous distributions, and discrete
//! combined/conditional histograms loaded from the on-disk grammars defined
//! in `sdg_io`. Depends only on `sdg_core` (for `std`/`serde` feature
//! propagation; no core types are otherwise needed here).
//!
//! All distributions expose the same four operations through
//! [`ProbabilityFunction`]: `pdf`, `cdf`, `invcdf`, `sample`.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod error;
pub mod histogram;
pub mod parametric;

pub use error::{MathError, MathResult};

/// Common interface over every probability function family in this crate:
/// parametric continuous (§ [`parametric`]) and discrete histograms
/// (§ [`histogram`]).
pub trait ProbabilityFunction {
    type Domain;

    fn pdf(&self, x: Self::Domain) -> f64;
    fn cdf(&self, x: Self::Domain) -> f64;
    fn invcdf(&self, u: f64) -> Self::Domain;

    /// `sample(u) = invcdf(u)` for every implementation in this crate; kept
    /// as a separate method (rather than a blanket alias) so call sites read
    /// as "drawing a sample" rather than "inverting a CDF" — the two ideas
    /// coincide here but are conceptually distinct at call sites.
    fn sample(&self, u: f64) -> Self::Domain {
        self.invcdf(u)
    }
}

/// Tolerance used when checking that a combined histogram's declared
/// probabilities sum to 1, per the specification's `ε = 10⁻⁶`.
pub const NORMALIZATION_EPSILON: f64 = 1e-6;
