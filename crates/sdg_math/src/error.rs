//! Error type for probability-function construction. Distribution-fitting
//! and renormalisation failures surface here; callers (`sdg_io`'s histogram
//! loader, `sdg_engine`'s providers) translate these into the `InvariantViolation`
//! policy of the broader error model.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MathError {
    #[error("distribution parameter out of range: {0}")]
    InvalidParameter(&'static str),

    #[error("combined histogram has no exact values, buckets, or null mass")]
    EmptyDomain,

    #[error("combined histogram probabilities sum to {sum}, which cannot be renormalised (non-null mass is ~0)")]
    Degenerate { sum: f64 },

    #[error("histogram buckets overlap or are not sorted: bucket {index} starts before the previous bucket ends")]
    OverlappingBuckets { index: usize },

    #[error("conditional histogram condition buckets overlap or are not sorted at index {index}")]
    OverlappingConditionBuckets { index: usize },

    #[error("bounded distribution interval [{min}, {max}) is empty or inverted")]
    EmptyBoundedInterval { min: f64, max: f64 },
}

pub type MathResult<T> = Result<T, MathError>;
