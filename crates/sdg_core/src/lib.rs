//! sdg_core — I/O-free fundamental types for the partitioned deterministic
//! record engine: the position type, field value domain, enumerated-set
//! domains, the `Record`/`FieldAccessor` traits that stand in for compile-time
//! field identifiers, and the hierarchical PRNG (HRNG).
//!
//! This crate defines stable types/APIs used across `sdg_math`, `sdg_io`,
//! `sdg_engine` and `sdg_cli`. Serialization derives are gated behind the
//! `serde` feature, mirroring the rest of the workspace.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod date;
pub mod enumset;
pub mod error;
pub mod record;
pub mod rng;
pub mod value;

pub use date::Date;
pub use enumset::EnumSet;
pub use error::CoreError;
pub use record::{FieldAccessor, Record};
pub use rng::{CompoundInversiveRng, HashRng, HierarchicalRng, RngKind};
pub use value::{EnumValue, FieldValue, RecordRef};

/// The 64-bit position of a record within its virtual sequence.
///
/// Every sequence `R` is indexed `gen_id in [0, cardinality(R))`; a `GenId`
/// carries no type tag of its own; callers track which sequence it belongs to.
pub type GenId = u64;
