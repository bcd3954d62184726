//! Discrete histogram probability functions: the *combined* histogram
//! (exact-value probabilities + bucket probabilities + an explicit null
//! mass) and the *conditional combined* histogram (a partition of a
//! condition domain into buckets, each holding an independent combined
//! histogram). Grounded in
//! `examples/original_source/src/cpp/math/probability/{CombinedPrFunction,ConditionalCombinedPrFunction}.h`.

mod combined;
mod conditional;
mod value;

pub use combined::CombinedHistogram;
pub use conditional::ConditionalCombinedHistogram;
pub use value::HistogramValue;
