//! `Setter<R, Rng>` (spec §4.4): binds one field of `R` to a provider. Two
//! flavours — [`FieldSetter`] wraps a [`ValueProvider`], [`ReferenceSetter`]
//! (and its position-writing sibling) wraps a [`ReferenceProvider`]. Both
//! flavours are boxed as `Box<dyn Setter<R, Rng> + Send + Sync>` inside a
//! [`crate::chain::SetterChain`]: a record type's field list is
//! heterogeneous in value type, so this is the one place in the provider
//! stack that needs dynamic dispatch (see `provider::mod` for why the
//! providers themselves stay monomorphised). `Send + Sync` is required
//! because [`crate::stage::StageDriver`] moves a whole chain into a `rayon`
//! worker thread, and a chain backing a [`crate::inspector::SequenceInspector`]
//! is additionally reached through a shared `Arc` from other tasks' reference
//! providers, so it must tolerate concurrent `&self` access too.

use std::marker::PhantomData;

use sdg_core::{FieldAccessor, HierarchicalRng, Record, RecordRef};

use crate::error::ChainResult;
use crate::interval::Interval;
use crate::predicate::EqualityPredicate;
use crate::provider::reference::ReferenceProvider;
use crate::provider::value::ValueProvider;
use crate::value::FieldCodec;

pub trait Setter<R: Record, Rng: HierarchicalRng> {
    fn arity(&self) -> u16;

    /// Whether this setter should run for `record` as populated by earlier
    /// setters in the chain. Defaults to always-enabled; a conditional
    /// (optional-field) setter overrides this.
    fn is_enabled(&self, record: &R) -> bool {
        let _ = record;
        true
    }

    fn apply(&self, record: &mut R, rng: &mut Rng) -> ChainResult<()>;

    /// The position range of `R` whose evaluation would reproduce the value
    /// currently stored in this setter's field on `record`. `None` if the
    /// setter's provider is not invertible.
    fn value_range(&self, record: &R, cardinality: u64) -> Option<Interval>;

    /// If `predicate` binds this setter's field, narrow `current_range` to
    /// the value range implied by the bound value; otherwise pass
    /// `current_range` through unchanged (spec §4.5 reverse evaluation).
    fn filter_range(&self, predicate: &EqualityPredicate<R>, cardinality: u64, current_range: Interval) -> Interval;
}

/// Ties field `F` of `R` to a [`ValueProvider`] `VP`.
pub struct FieldSetter<R, F, VP, Rng> {
    provider: VP,
    _marker: PhantomData<(R, F, Rng)>,
}

impl<R, F, VP, Rng> FieldSetter<R, F, VP, Rng> {
    pub fn new(provider: VP) -> Self {
        FieldSetter {
            provider,
            _marker: PhantomData,
        }
    }
}

impl<R, F, VP, Rng> Setter<R, Rng> for FieldSetter<R, F, VP, Rng>
where
    R: Record,
    Rng: HierarchicalRng,
    F: FieldAccessor<R>,
    F::Value: FieldCodec + PartialEq,
    VP: ValueProvider<R, Rng, Value = F::Value>,
{
    fn arity(&self) -> u16 {
        self.provider.arity()
    }

    fn apply(&self, record: &mut R, rng: &mut Rng) -> ChainResult<()> {
        let value = self.provider.apply(record, rng)?;
        F::set(record, value);
        Ok(())
    }

    fn value_range(&self, record: &R, cardinality: u64) -> Option<Interval> {
        if !self.provider.invertible() {
            return None;
        }
        let value = F::get(record);
        self.provider.value_range(&value, cardinality)
    }

    fn filter_range(&self, predicate: &EqualityPredicate<R>, cardinality: u64, current_range: Interval) -> Interval {
        let Some(bound) = predicate.get::<F>() else {
            return current_range;
        };
        let Some(value) = F::Value::from_field_value(bound) else {
            return current_range;
        };
        match self.provider.value_range(&value, cardinality) {
            Some(range) => current_range.intersect(range),
            None => current_range,
        }
    }
}

/// Ties field `F` (typed `RecordRef`) of `R` to a [`ReferenceProvider`] `RP`.
pub struct ReferenceSetter<R, F, RP, Rng> {
    provider: RP,
    _marker: PhantomData<(R, F, Rng)>,
}

impl<R, F, RP, Rng> ReferenceSetter<R, F, RP, Rng> {
    pub fn new(provider: RP) -> Self {
        ReferenceSetter {
            provider,
            _marker: PhantomData,
        }
    }
}

impl<R, F, RP, Rng> Setter<R, Rng> for ReferenceSetter<R, F, RP, Rng>
where
    R: Record,
    Rng: HierarchicalRng,
    F: FieldAccessor<R, Value = RecordRef>,
    RP: ReferenceProvider<R, Rng>,
{
    fn arity(&self) -> u16 {
        self.provider.arity()
    }

    fn apply(&self, record: &mut R, rng: &mut Rng) -> ChainResult<()> {
        let outcome = self.provider.apply(record, rng)?;
        F::set(record, RecordRef(outcome.parent.gen_id()));
        Ok(())
    }

    fn value_range(&self, record: &R, _cardinality: u64) -> Option<Interval> {
        let current = F::get(record);
        self.provider.reference_range(current.gen_id())
    }

    fn filter_range(&self, predicate: &EqualityPredicate<R>, _cardinality: u64, current_range: Interval) -> Interval {
        let Some(bound) = predicate.get::<F>() else {
            return current_range;
        };
        let Some(reference) = RecordRef::from_field_value(bound) else {
            return current_range;
        };
        match self.provider.reference_range(reference.gen_id()) {
            Some(range) => current_range.intersect(range),
            None => current_range,
        }
    }
}

/// Like [`ReferenceSetter`], but additionally writes the reference
/// provider's local slot position (when present) into a second field `PosF`
/// — the Rust counterpart of `ClusteredReferenceHydrator`'s optional
/// `PositionSetter`.
pub struct ReferenceSetterWithPosition<R, F, PosF, RP, Rng> {
    provider: RP,
    _marker: PhantomData<(R, F, PosF, Rng)>,
}

impl<R, F, PosF, RP, Rng> ReferenceSetterWithPosition<R, F, PosF, RP, Rng> {
    pub fn new(provider: RP) -> Self {
        ReferenceSetterWithPosition {
            provider,
            _marker: PhantomData,
        }
    }
}

impl<R, F, PosF, RP, Rng> Setter<R, Rng> for ReferenceSetterWithPosition<R, F, PosF, RP, Rng>
where
    R: Record,
    Rng: HierarchicalRng,
    F: FieldAccessor<R, Value = RecordRef>,
    PosF: FieldAccessor<R, Value = u64>,
    RP: ReferenceProvider<R, Rng>,
{
    fn arity(&self) -> u16 {
        self.provider.arity()
    }

    fn apply(&self, record: &mut R, rng: &mut Rng) -> ChainResult<()> {
        let outcome = self.provider.apply(record, rng)?;
        F::set(record, RecordRef(outcome.parent.gen_id()));
        if let Some(position) = outcome.local_position {
            PosF::set(record, position);
        }
        Ok(())
    }

    fn value_range(&self, record: &R, _cardinality: u64) -> Option<Interval> {
        let current = F::get(record);
        self.provider.reference_range(current.gen_id())
    }

    fn filter_range(&self, predicate: &EqualityPredicate<R>, _cardinality: u64, current_range: Interval) -> Interval {
        let Some(bound) = predicate.get::<F>() else {
            return current_range;
        };
        let Some(reference) = RecordRef::from_field_value(bound) else {
            return current_range;
        };
        match self.provider.reference_range(reference.gen_id()) {
            Some(range) => current_range.intersect(range),
            None => current_range,
        }
    }
}
