//! Value/range/reference providers (spec §4.2–4.3, §4.7): the leaves a
//! [`crate::setter::Setter`] delegates to. Implemented as concrete structs
//! behind small traits (monomorphised generic composition), not a trait
//! object hierarchy, per the REDESIGN FLAGS guidance to prefer generics over
//! dynamic dispatch on this performance-critical path — the heterogeneity
//! that *does* need type erasure (a record type's ordered, mixed-field
//! setter list) is absorbed one level up, in `SetterChain`'s
//! `Vec<Box<dyn Setter<R, Rng> + Send + Sync>>`.

pub mod range;
pub mod reference;
pub mod value;

pub use range::{ConstRange, ContextFieldRange, RangeProvider};
pub use reference::{ClusteredReferenceProvider, RandomReferenceProvider, ReferenceOutcome, ReferenceProvider};
pub use value::{Callback, Clustered, ConditionalRandom, Constant, ContextField, ElementWise, HistogramRandom, ParametricRandom, ValueProvider};
