//! `RangeProvider<R, Rng>` (spec §4.3): produces a position interval rather
//! than a scalar value, for reference setters that pick a target position
//! within some bound (spec §4.7). Grounded in
//! `examples/original_source/src/cpp/runtime/provider/range/{RangeProvider,ConstRangeProvider,ContextFieldRangeProvider}.h`.

use std::marker::PhantomData;

use sdg_core::{FieldAccessor, HierarchicalRng, Record};

use crate::error::{ChainResult, EngineError};
use crate::interval::Interval;
use crate::provider::value::ValueProvider;

pub trait RangeProvider<R: Record, Rng: HierarchicalRng> {
    fn arity(&self) -> u16 {
        0
    }

    fn apply(&self, ctx: &R, cardinality: u64, rng: &mut Rng) -> ChainResult<Interval>;
}

/// Always the same interval, independent of the context record.
#[derive(Clone, Debug)]
pub struct ConstRange {
    range: Interval,
}

impl ConstRange {
    pub fn new(range: Interval) -> Self {
        ConstRange { range }
    }
}

impl<R, Rng> RangeProvider<R, Rng> for ConstRange
where
    R: Record,
    Rng: HierarchicalRng,
{
    fn apply(&self, _ctx: &R, _cardinality: u64, _rng: &mut Rng) -> ChainResult<Interval> {
        Ok(self.range)
    }
}

/// Inverts an invertible value provider of the *target* sequence against the
/// context record's own field `F`: the interval returned is every position
/// in the target sequence whose value provider would produce `F::get(ctx)`.
/// Construction fails if the wrapped provider is not invertible, mirroring
/// the original's constructor-time `LogicException`.
pub struct ContextFieldRange<R, F, VP, TargetR, TargetRng> {
    provider: VP,
    _marker: PhantomData<(R, F, TargetR, TargetRng)>,
}

impl<R, F, VP, TargetR, TargetRng> ContextFieldRange<R, F, VP, TargetR, TargetRng>
where
    R: Record,
    F: FieldAccessor<R>,
    TargetR: Record,
    TargetRng: HierarchicalRng,
    VP: ValueProvider<TargetR, TargetRng, Value = F::Value>,
{
    pub fn new(provider: VP) -> Result<Self, EngineError> {
        if !provider.invertible() {
            return Err(EngineError::InvariantViolation(
                "ContextFieldRange requires an invertible value provider".to_string(),
            ));
        }
        Ok(ContextFieldRange {
            provider,
            _marker: PhantomData,
        })
    }
}

impl<R, Rng, F, VP, TargetR, TargetRng> RangeProvider<R, Rng> for ContextFieldRange<R, F, VP, TargetR, TargetRng>
where
    R: Record,
    Rng: HierarchicalRng,
    F: FieldAccessor<R>,
    TargetR: Record,
    TargetRng: HierarchicalRng,
    VP: ValueProvider<TargetR, TargetRng, Value = F::Value>,
{
    fn apply(&self, ctx: &R, cardinality: u64, _rng: &mut Rng) -> ChainResult<Interval> {
        let value = F::get(ctx);
        self.provider.value_range(&value, cardinality).ok_or_else(|| {
            EngineError::InvariantViolation(
                "value provider reported invertible() but value_range returned None".to_string(),
            )
            .into()
        })
    }
}
