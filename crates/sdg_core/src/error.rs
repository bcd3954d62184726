//! Minimal error set for core-domain validation. I/O and config errors live
//! in `sdg_io`; control-flow signals (`InvalidRecord`) live in `sdg_engine`.

use core::fmt;

/// Errors raised while constructing or validating core-domain values
/// (enum sets, dates, field values) — never raised mid-record-evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreError {
    /// An enum-set domain lookup used an index or label it does not contain.
    UnknownEnumLabel,
    /// An enum-set index was out of bounds for its domain.
    EnumIndexOutOfRange,
    /// A calendar date failed validation (month/day out of range, etc.)
    InvalidDate,
    /// A field was bound twice on an `EqualityPredicate` (also produced by
    /// `sdg_engine`, re-exported here so both layers share one variant set
    /// where useful).
    DuplicateBind,
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::UnknownEnumLabel => write!(f, "unknown enum label"),
            CoreError::EnumIndexOutOfRange => write!(f, "enum index out of range"),
            CoreError::InvalidDate => write!(f, "invalid calendar date"),
            CoreError::DuplicateBind => write!(f, "field already bound"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CoreError {}
