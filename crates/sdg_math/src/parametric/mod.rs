//! Parametric continuous probability functions with closed-form
//! `cdf`/`invcdf`, grounded in
//! `examples/original_source/src/cpp/math/probability/{UniformPrFunction,NormalPrFunction,ParetoPrFunction,BoundedNormalPrFunction,BoundedParetoPrFunction}.h`.
//! All operate over `f64` — `ValueProvider`s downcast to the record field's
//! concrete numeric type after sampling.

mod bounded;
mod normal;
mod pareto;
mod uniform;

pub use bounded::{BoundedNormal, BoundedPareto};
pub use normal::Normal;
pub use pareto::Pareto;
pub use uniform::Uniform;
