//! `ValueProvider<R, Rng>` (spec §4.2): deterministically produces a field
//! value for a given record context and PRNG. Each concrete variant below
//! mirrors one bullet of §4.2; `Clustered` and `Constant` are the only
//! variants this port treats as invertible — see the module-level note on
//! `HistogramRandom` for why "random from probability" is not, despite the
//! specification prose describing an inverse for it.

use std::marker::PhantomData;
use std::sync::Arc;

use sdg_core::{GenId, HierarchicalRng, Record};
use sdg_math::histogram::{CombinedHistogram, HistogramValue};
use sdg_math::ProbabilityFunction;

use crate::error::ChainResult;
use crate::interval::Interval;

/// A deterministic producer of one field's value, parameterised over the
/// record context `R` it reads and the PRNG `Rng` it draws from.
pub trait ValueProvider<R: Record, Rng: HierarchicalRng> {
    type Value;

    /// Number of PRNG draws `apply` consumes — constant across calls, so a
    /// disabled `Setter` can keep the stream position in sync with
    /// `rng.skip(arity())`.
    fn arity(&self) -> u16;

    /// Whether `value_range` is implemented (defaults to `false`, i.e. the
    /// field cannot be used to filter a sequence).
    fn invertible(&self) -> bool {
        false
    }

    fn apply(&self, ctx: &R, rng: &mut Rng) -> ChainResult<Self::Value>;

    /// The set of sequence positions (out of `cardinality`) for which
    /// `apply` would produce `value`. Only meaningful when `invertible()`.
    fn value_range(&self, _value: &Self::Value, _cardinality: u64) -> Option<Interval> {
        None
    }
}

/// Always returns the same value; invertible with the full sequence range
/// when the queried value equals the constant, empty otherwise.
#[derive(Clone, Debug)]
pub struct Constant<T> {
    value: T,
}

impl<T> Constant<T> {
    pub fn new(value: T) -> Self {
        Constant { value }
    }
}

impl<R, Rng, T> ValueProvider<R, Rng> for Constant<T>
where
    R: Record,
    Rng: HierarchicalRng,
    T: Clone + PartialEq,
{
    type Value = T;

    fn arity(&self) -> u16 {
        0
    }

    fn invertible(&self) -> bool {
        true
    }

    fn apply(&self, _ctx: &R, _rng: &mut Rng) -> ChainResult<T> {
        Ok(self.value.clone())
    }

    fn value_range(&self, value: &T, cardinality: u64) -> Option<Interval> {
        Some(if *value == self.value {
            Interval::full(cardinality)
        } else {
            Interval::empty()
        })
    }
}

/// Returns the current value of one of the context record's own fields.
/// Zero draws, never invertible (the value is a function of other already-
/// bound fields, not of position, so no position range is implied).
pub struct ContextField<R, F> {
    _marker: PhantomData<(R, F)>,
}

impl<R, F> ContextField<R, F> {
    pub fn new() -> Self {
        ContextField {
            _marker: PhantomData,
        }
    }
}

impl<R, F> Default for ContextField<R, F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, Rng, F> ValueProvider<R, Rng> for ContextField<R, F>
where
    R: Record,
    Rng: HierarchicalRng,
    F: sdg_core::FieldAccessor<R>,
{
    type Value = F::Value;

    fn arity(&self) -> u16 {
        0
    }

    fn apply(&self, ctx: &R, _rng: &mut Rng) -> ChainResult<F::Value> {
        Ok(F::get(ctx))
    }
}

/// One PRNG draw through a closed-form parametric continuous probability
/// function (`sdg_math::parametric`). Never invertible: the specification
/// reserves inversion for discrete, orderable combined histograms.
pub struct ParametricRandom<P> {
    probability: P,
}

impl<P> ParametricRandom<P> {
    pub fn new(probability: P) -> Self {
        ParametricRandom { probability }
    }
}

impl<R, Rng, P> ValueProvider<R, Rng> for ParametricRandom<P>
where
    R: Record,
    Rng: HierarchicalRng,
    P: ProbabilityFunction<Domain = f64>,
{
    type Value = f64;

    fn arity(&self) -> u16 {
        1
    }

    fn apply(&self, _ctx: &R, rng: &mut Rng) -> ChainResult<f64> {
        Ok(self.probability.sample(rng.next()))
    }
}

/// One PRNG draw through a discrete combined histogram (spec §4.10). The
/// histogram's null mass (if any) surfaces as `null_value` rather than an
/// `Option`, since record fields have no null wrapper in this data model.
///
/// Not invertible in this port. The specification's prose ("inverse is only
/// defined when Φ is a combined histogram on an orderable domain") describes
/// the *value*'s CDF bucket boundaries, but inverting those into a
/// *contiguous position range* is only sound when position directly encodes
/// the domain value (as `Clustered` does by construction). Here the value at
/// position `p` is a function of the PRNG draw at `p`, which is not
/// contiguous in `p` for either HRNG backend — so `value_range` would either
/// be wrong or require an O(cardinality) scan. This is recorded as an
/// explicit design decision in `DESIGN.md`; `SetterChain::filter` treats a
/// non-invertible field conservatively (it simply does not narrow the
/// range), which stays correct per spec §8's containment property.
pub struct HistogramRandom<T> {
    histogram: Arc<CombinedHistogram<T>>,
    null_value: T,
}

impl<T> HistogramRandom<T> {
    pub fn new(histogram: Arc<CombinedHistogram<T>>, null_value: T) -> Self {
        HistogramRandom {
            histogram,
            null_value,
        }
    }
}

impl<R, Rng, T> ValueProvider<R, Rng> for HistogramRandom<T>
where
    R: Record,
    Rng: HierarchicalRng,
    T: HistogramValue + Clone,
{
    type Value = T;

    fn arity(&self) -> u16 {
        1
    }

    fn apply(&self, _ctx: &R, rng: &mut Rng) -> ChainResult<T> {
        Ok(self.histogram.sample(rng.next()).unwrap_or_else(|| self.null_value.clone()))
    }
}

/// Selects a sub-histogram by the value of a fixed context field, then
/// samples from it. One PRNG draw; never invertible (the range would also
/// depend on the condition field's own distribution across positions).
pub struct ConditionalRandom<R, F, T>
where
    R: Record,
    F: sdg_core::FieldAccessor<R>,
{
    by_condition: Vec<(F::Value, Arc<CombinedHistogram<T>>)>,
    null_value: T,
    _marker: PhantomData<R>,
}

impl<R, F, T> ConditionalRandom<R, F, T>
where
    R: Record,
    F: sdg_core::FieldAccessor<R>,
{
    pub fn new(by_condition: Vec<(F::Value, Arc<CombinedHistogram<T>>)>, null_value: T) -> Self {
        ConditionalRandom {
            by_condition,
            null_value,
            _marker: PhantomData,
        }
    }
}

impl<R, Rng, F, T> ValueProvider<R, Rng> for ConditionalRandom<R, F, T>
where
    R: Record,
    Rng: HierarchicalRng,
    F: sdg_core::FieldAccessor<R>,
    F::Value: PartialEq,
    T: HistogramValue + Clone,
{
    type Value = T;

    fn arity(&self) -> u16 {
        1
    }

    fn apply(&self, ctx: &R, rng: &mut Rng) -> ChainResult<T> {
        let condition = F::get(ctx);
        let histogram = self
            .by_condition
            .iter()
            .find(|(c, _)| *c == condition)
            .map(|(_, h)| h);
        let u = rng.next();
        Ok(match histogram {
            Some(h) => h.sample(u).unwrap_or_else(|| self.null_value.clone()),
            None => self.null_value.clone(),
        })
    }
}

/// Partitions `[0, cardinality)` into contiguous blocks proportional to the
/// CDF of a probability on an orderable discrete domain; block `k` emits the
/// `k`-th domain value. Floor-rounded boundaries, with the last block
/// absorbing any rounding remainder (spec §4.2). Zero PRNG draws — the value
/// is a pure function of `gen_id`.
pub struct Clustered<T> {
    values: Vec<T>,
    bounds: Vec<(GenId, GenId)>,
}

impl<T: Clone> Clustered<T> {
    /// `weights` need not be pre-normalised to 1 (floor rounding uses
    /// cumulative share of the running total), but must be non-negative and
    /// have the same length as `values`.
    pub fn new(values: Vec<T>, weights: Vec<f64>, cardinality: GenId) -> Self {
        assert_eq!(values.len(), weights.len(), "Clustered: values/weights length mismatch");
        let total: f64 = weights.iter().sum();
        let mut bounds = Vec::with_capacity(values.len());
        let mut start = 0u64;
        let mut acc = 0.0f64;
        let n = weights.len();
        for (i, w) in weights.iter().enumerate() {
            acc += w;
            let end = if i + 1 == n {
                cardinality
            } else if total > 0.0 {
                ((acc / total) * cardinality as f64).floor() as u64
            } else {
                start
            };
            bounds.push((start, end.max(start)));
            start = end.max(start);
        }
        Clustered { values, bounds }
    }

    fn block_index(&self, pos: GenId) -> usize {
        self.bounds
            .partition_point(|&(_, end)| end <= pos)
            .min(self.values.len().saturating_sub(1))
    }
}

impl<R, Rng, T> ValueProvider<R, Rng> for Clustered<T>
where
    R: Record,
    Rng: HierarchicalRng,
    T: Clone + PartialEq,
{
    type Value = T;

    fn arity(&self) -> u16 {
        0
    }

    fn invertible(&self) -> bool {
        true
    }

    fn apply(&self, ctx: &R, _rng: &mut Rng) -> ChainResult<T> {
        let idx = self.block_index(ctx.gen_id());
        Ok(self.values[idx].clone())
    }

    fn value_range(&self, value: &T, _cardinality: u64) -> Option<Interval> {
        let idx = self.values.iter().position(|v| v == value)?;
        let (s, e) = self.bounds[idx];
        Some(Interval::new(s, e))
    }
}

/// Produces a vector whose length is drawn from `size_provider` (clamped to
/// `N`) and whose elements are each drawn from `elem_provider`. Arity is
/// constant (`size_provider.arity() + N * elem_provider.arity()`): unused
/// slots beyond the drawn length are skipped on the PRNG rather than simply
/// not drawn, so disabling this setter skips the same number of elements a
/// full draw would have.
pub struct ElementWise<SizeP, ElemP, const N: usize> {
    size_provider: SizeP,
    elem_provider: ElemP,
}

impl<SizeP, ElemP, const N: usize> ElementWise<SizeP, ElemP, N> {
    pub fn new(size_provider: SizeP, elem_provider: ElemP) -> Self {
        ElementWise {
            size_provider,
            elem_provider,
        }
    }
}

impl<R, Rng, SizeP, ElemP, const N: usize> ValueProvider<R, Rng> for ElementWise<SizeP, ElemP, N>
where
    R: Record,
    Rng: HierarchicalRng,
    SizeP: ValueProvider<R, Rng, Value = u64>,
    ElemP: ValueProvider<R, Rng>,
{
    type Value = Vec<ElemP::Value>;

    fn arity(&self) -> u16 {
        self.size_provider.arity() + self.elem_provider.arity() * N as u16
    }

    fn apply(&self, ctx: &R, rng: &mut Rng) -> ChainResult<Vec<ElemP::Value>> {
        let requested = self.size_provider.apply(ctx, rng)? as usize;
        let len = requested.min(N);
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            out.push(self.elem_provider.apply(ctx, rng)?);
        }
        let unused = N - len;
        if unused > 0 {
            rng.skip(unused as u64 * self.elem_provider.arity() as u64);
        }
        Ok(out)
    }
}

/// Delegates to a user-supplied function with a user-declared arity. Always
/// non-invertible, per spec §4.2.
pub struct Callback<R, Rng, T, F>
where
    F: Fn(&R, &mut Rng) -> ChainResult<T>,
{
    arity: u16,
    f: F,
    _marker: PhantomData<(R, Rng, T)>,
}

impl<R, Rng, T, F> Callback<R, Rng, T, F>
where
    F: Fn(&R, &mut Rng) -> ChainResult<T>,
{
    pub fn new(arity: u16, f: F) -> Self {
        Callback {
            arity,
            f,
            _marker: PhantomData,
        }
    }
}

impl<R, Rng, T, F> ValueProvider<R, Rng> for Callback<R, Rng, T, F>
where
    R: Record,
    Rng: HierarchicalRng,
    F: Fn(&R, &mut Rng) -> ChainResult<T>,
{
    type Value = T;

    fn arity(&self) -> u16 {
        self.arity
    }

    fn apply(&self, ctx: &R, rng: &mut Rng) -> ChainResult<T> {
        (self.f)(ctx, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdg_core::HashRng;

    #[derive(Clone)]
    struct Widget {
        gen_id: GenId,
    }

    impl Record for Widget {
        fn gen_id(&self) -> GenId {
            self.gen_id
        }
        fn with_gen_id(gen_id: GenId) -> Self {
            Widget { gen_id }
        }
    }

    #[test]
    fn constant_is_invertible_full_or_empty() {
        let p: Constant<&'static str> = Constant::new("low");
        let w = Widget::with_gen_id(0);
        let mut rng = HashRng::from_components(&[1]);
        assert_eq!(ValueProvider::<Widget, HashRng>::apply(&p, &w, &mut rng).unwrap(), "low");
        assert_eq!(p.value_range(&"low", 1000), Some(Interval::full(1000)));
        assert_eq!(p.value_range(&"high", 1000), Some(Interval::empty()));
    }

    #[test]
    fn scenario_one_clustered_value_provider() {
        let c: Clustered<&'static str> = Clustered::new(
            vec!["low", "mid", "high"],
            vec![1.0, 1.0, 1.0],
            1000,
        );
        let mut rng = HashRng::from_components(&[1]);
        let at = |p: u64| {
            let w = Widget::with_gen_id(p);
            ValueProvider::<Widget, HashRng>::apply(&c, &w, &mut rng).unwrap()
        };
        assert_eq!(at(0), "low");
        assert_eq!(at(332), "low");
        assert_eq!(at(333), "mid");
        assert_eq!(at(665), "mid");
        assert_eq!(at(666), "high");
        assert_eq!(at(999), "high");

        let range = c.value_range(&"mid", 1000).unwrap();
        assert_eq!(range, Interval::new(333, 666));
    }

    #[test]
    fn clustered_last_block_absorbs_remainder() {
        let c: Clustered<u32> = Clustered::new(vec![0, 1, 2], vec![1.0, 1.0, 1.0], 10);
        // 10/3 blocks of ~3.33 -> floor boundaries 3, 6, then remainder to 10.
        assert_eq!(c.value_range(&0, 10), Some(Interval::new(0, 3)));
        assert_eq!(c.value_range(&1, 10), Some(Interval::new(3, 6)));
        assert_eq!(c.value_range(&2, 10), Some(Interval::new(6, 10)));
    }

    #[test]
    fn element_wise_skips_unused_arity() {
        struct OneShotSize(u64);
        impl ValueProvider<Widget, HashRng> for OneShotSize {
            type Value = u64;
            fn arity(&self) -> u16 {
                0
            }
            fn apply(&self, _ctx: &Widget, _rng: &mut HashRng) -> ChainResult<u64> {
                Ok(self.0)
            }
        }
        struct Elem;
        impl ValueProvider<Widget, HashRng> for Elem {
            type Value = f64;
            fn arity(&self) -> u16 {
                1
            }
            fn apply(&self, _ctx: &Widget, rng: &mut HashRng) -> ChainResult<f64> {
                Ok(rng.next())
            }
        }
        let ew: ElementWise<OneShotSize, Elem, 4> = ElementWise::new(OneShotSize(2), Elem);
        assert_eq!(ValueProvider::<Widget, HashRng>::arity(&ew), 4);

        let w = Widget::with_gen_id(0);
        let mut a = HashRng::from_components(&[9]);
        let result = ValueProvider::<Widget, HashRng>::apply(&ew, &w, &mut a).unwrap();
        assert_eq!(result.len(), 2);

        // Four raw draws later, `a`'s stream position must match an
        // independent stream that was manually skipped by the same amount.
        let mut b = HashRng::from_components(&[9]);
        b.skip(4);
        assert_eq!(a.next(), b.next());
    }
}
