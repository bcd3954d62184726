//! `EqualityPredicate`: a fixed-shape, per-field-bound partial record used
//! to reverse a `SetterChain` into a position range (`SetterChain::filter`)
//! and to drive `ReferenceProvider`s that look up a parent by equality on
//! selected child fields. Grounded in
//! `examples/original_source/src/cpp/record/RecordRangePredicate.h` and
//! `RecordRangePredicateBuilder.h`.
//!
//! Fields are addressed by the same zero-sized `FieldAccessor<R>` marker
//! types used everywhere else in this crate; a predicate is keyed by
//! `TypeId` of the marker rather than by a separate field-id enum, so it
//! composes with `sdg_core::record::FieldAccessor` without extra glue.

use core::any::{type_name, TypeId};
use core::marker::PhantomData;

use sdg_core::{FieldAccessor, FieldValue, Record};

use crate::error::EngineError;
use crate::value::FieldCodec;

/// A partial record for `R`: zero or more fields bound to concrete values,
/// each recorded once. Binding the same field twice is an
/// [`EngineError::DuplicateBind`] — the specification explicitly calls this
/// out as an `InvariantViolation`, never a silent overwrite.
pub struct EqualityPredicate<R: Record> {
    bound: Vec<(TypeId, FieldValue)>,
    _marker: PhantomData<R>,
}

impl<R: Record> EqualityPredicate<R> {
    pub fn new() -> Self {
        EqualityPredicate {
            bound: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Binds field `F` to `value`. Fails if `F` is already bound on this
    /// predicate instance.
    pub fn bind<F>(&mut self, value: F::Value) -> Result<(), EngineError>
    where
        F: FieldAccessor<R> + 'static,
        F::Value: FieldCodec,
    {
        let tid = TypeId::of::<F>();
        if self.bound.iter().any(|(t, _)| *t == tid) {
            return Err(EngineError::DuplicateBind(type_name::<F>().to_string()));
        }
        self.bound.push((tid, value.to_field_value()));
        Ok(())
    }

    /// The raw bound value for field `F`, or `None` if unbound.
    pub fn get<F>(&self) -> Option<&FieldValue>
    where
        F: FieldAccessor<R> + 'static,
    {
        let tid = TypeId::of::<F>();
        self.bound.iter().find(|(t, _)| *t == tid).map(|(_, v)| v)
    }

    pub fn is_bound<F>(&self) -> bool
    where
        F: FieldAccessor<R> + 'static,
    {
        self.get::<F>().is_some()
    }

    pub fn len(&self) -> usize {
        self.bound.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }
}

impl<R: Record> Default for EqualityPredicate<R> {
    fn default() -> Self {
        Self::new()
    }
}
