//! `ReferenceProvider<R, Rng>` (spec §4.7): supplies a parent record of type
//! `Parent` to a child record of type `R`. Grounded in
//! `examples/original_source/src/cpp/hydrator/{ClusteredReferenceHydrator,ReferencedRecordHydrator}.h`.

use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

use sdg_core::{GenId, HierarchicalRng, Record};

use crate::error::{ChainSignal, EngineError};
use crate::error::{ChainResult, InvalidRecord};
use crate::interval::Interval;
use crate::inspector::SequenceInspector;
use crate::predicate::EqualityPredicate;
use crate::provider::value::ValueProvider;

/// The parent a reference provider resolved, plus (for clustered references)
/// the child's position within its parent's block — the Rust analogue of
/// `ClusteredReferenceHydrator`'s optional `PositionSetter` argument.
pub struct ReferenceOutcome<P> {
    pub parent: P,
    pub local_position: Option<u64>,
}

pub trait ReferenceProvider<R: Record, Rng: HierarchicalRng> {
    type Parent: Record;

    fn arity(&self) -> u16 {
        0
    }

    fn apply(&self, record: &R, rng: &mut Rng) -> ChainResult<ReferenceOutcome<Self::Parent>>;

    /// The interval of child positions that resolve to the parent at
    /// `parent_gen_id`. `None` when this provider has no closed-form
    /// inverse (the random/predicate-driven provider).
    fn reference_range(&self, _parent_gen_id: GenId) -> Option<Interval> {
        None
    }
}

/// Splits the child sequence into fixed `max_children`-sized blocks, one per
/// parent, in parent order. `children_count` reads the parent's actual child
/// count (an arity-0 value provider over `Parent`, typically
/// [`crate::provider::value::ContextField`]); a child whose local slot falls
/// at or past that count is the block's unused tail and raises
/// [`InvalidRecord`], exactly as `ClusteredReferenceHydrator` does.
///
/// Caches the last resolved parent by parent id — children of the same
/// parent are generated consecutively, so this turns the usual access
/// pattern into one `SequenceInspector::at` call per parent rather than one
/// per child.
pub struct ClusteredReferenceProvider<R, ParentR, CC, Rng>
where
    ParentR: Record,
{
    max_children: u64,
    children_count: CC,
    parent_set: Arc<SequenceInspector<ParentR, Rng>>,
    cache: Mutex<Option<(GenId, ParentR)>>,
    _marker: PhantomData<R>,
}

impl<R, ParentR, CC, Rng> ClusteredReferenceProvider<R, ParentR, CC, Rng>
where
    R: Record,
    ParentR: Record,
    Rng: HierarchicalRng,
    CC: ValueProvider<ParentR, Rng, Value = u64>,
{
    pub fn new(max_children: u64, children_count: CC, parent_set: Arc<SequenceInspector<ParentR, Rng>>) -> Self {
        ClusteredReferenceProvider {
            max_children,
            children_count,
            parent_set,
            cache: Mutex::new(None),
            _marker: PhantomData,
        }
    }

    fn resolve_parent(&self, parent_id: GenId) -> ChainResult<ParentR> {
        {
            let cache = self.cache.lock().unwrap();
            if let Some((cached_id, parent)) = cache.as_ref() {
                if *cached_id == parent_id {
                    return Ok(parent.clone());
                }
            }
        }
        let parent = self.parent_set.at(parent_id)?;
        *self.cache.lock().unwrap() = Some((parent_id, parent.clone()));
        Ok(parent)
    }
}

impl<R, ParentR, CC, Rng> ReferenceProvider<R, Rng> for ClusteredReferenceProvider<R, ParentR, CC, Rng>
where
    R: Record,
    ParentR: Record,
    Rng: HierarchicalRng,
    CC: ValueProvider<ParentR, Rng, Value = u64>,
{
    type Parent = ParentR;

    fn arity(&self) -> u16 {
        0
    }

    fn apply(&self, record: &R, rng: &mut Rng) -> ChainResult<ReferenceOutcome<ParentR>> {
        let nested_gen_id = record.gen_id();
        let parent_id = nested_gen_id / self.max_children;
        let slot = nested_gen_id % self.max_children;

        let parent = self.resolve_parent(parent_id)?;
        let children_count = self.children_count.apply(&parent, rng)?;

        if slot < children_count {
            Ok(ReferenceOutcome {
                parent,
                local_position: Some(slot),
            })
        } else {
            Err(ChainSignal::Invalid(InvalidRecord {
                current_gen_id: nested_gen_id,
                max_children: self.max_children,
                current_period_size: children_count,
            }))
        }
    }

    fn reference_range(&self, parent_gen_id: GenId) -> Option<Interval> {
        Some(Interval::new(
            parent_gen_id * self.max_children,
            (parent_gen_id + 1) * self.max_children,
        ))
    }
}

/// Picks a parent uniformly at random from the position range satisfying an
/// `EqualityPredicate` built from the child record's own fields. If the
/// drawn position is itself an invalid clustered child, re-draws once within
/// the range `InvalidRecord` reports as that period's valid prefix; a second
/// failure is a fatal generation error rather than a second retry (spec
/// §4.7).
pub struct RandomReferenceProvider<R, ParentR, Rng, PB> {
    parent_set: Arc<SequenceInspector<ParentR, Rng>>,
    predicate_builder: PB,
    _marker: PhantomData<(R, Rng)>,
}

impl<R, ParentR, Rng, PB> RandomReferenceProvider<R, ParentR, Rng, PB>
where
    R: Record,
    ParentR: Record,
    Rng: HierarchicalRng,
    PB: Fn(&R) -> EqualityPredicate<ParentR>,
{
    pub fn new(parent_set: Arc<SequenceInspector<ParentR, Rng>>, predicate_builder: PB) -> Self {
        RandomReferenceProvider {
            parent_set,
            predicate_builder,
            _marker: PhantomData,
        }
    }

    fn uniform_position(range: Interval, rng: &mut Rng) -> GenId {
        let span = range.len();
        let offset = (rng.next() * span as f64) as u64;
        range.start + offset.min(span.saturating_sub(1))
    }
}

impl<R, ParentR, Rng, PB> ReferenceProvider<R, Rng> for RandomReferenceProvider<R, ParentR, Rng, PB>
where
    R: Record,
    ParentR: Record,
    Rng: HierarchicalRng,
    PB: Fn(&R) -> EqualityPredicate<ParentR>,
{
    type Parent = ParentR;

    fn arity(&self) -> u16 {
        1
    }

    fn apply(&self, record: &R, rng: &mut Rng) -> ChainResult<ReferenceOutcome<ParentR>> {
        let predicate = (self.predicate_builder)(record);
        let range = self.parent_set.filter(&predicate);
        if range.is_empty() {
            return Err(EngineError::GenerationAborted(
                "random reference provider found no parent matching its predicate".to_string(),
            )
            .into());
        }

        let pos = Self::uniform_position(range, rng);
        match self.parent_set.at(pos) {
            Ok(parent) => Ok(ReferenceOutcome {
                parent,
                local_position: None,
            }),
            Err(ChainSignal::Invalid(invalid)) => {
                let retry_range = Interval::new(invalid.prev_valid_gen_id_min(), invalid.prev_valid_gen_id_max());
                if retry_range.is_empty() {
                    return Err(EngineError::GenerationAborted(
                        "random reference provider's retry range was empty".to_string(),
                    )
                    .into());
                }
                let retry_pos = Self::uniform_position(retry_range, rng);
                match self.parent_set.at(retry_pos) {
                    Ok(parent) => Ok(ReferenceOutcome {
                        parent,
                        local_position: None,
                    }),
                    Err(ChainSignal::Invalid(_)) => Err(EngineError::GenerationAborted(
                        "random reference provider exhausted its single retry".to_string(),
                    )
                    .into()),
                    Err(fatal) => Err(fatal),
                }
            }
            Err(fatal) => Err(fatal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdg_core::{FieldAccessor, HashRng};

    use crate::chain::{ChainMode, SetterChain};
    use crate::provider::value::{Clustered, Constant, ContextField};
    use crate::setter::FieldSetter;

    #[derive(Clone)]
    struct Customer {
        gen_id: GenId,
        tier: &'static str,
        child_count: u64,
    }

    impl Record for Customer {
        fn gen_id(&self) -> GenId {
            self.gen_id
        }
        fn with_gen_id(gen_id: GenId) -> Self {
            Customer {
                gen_id,
                tier: "low",
                child_count: 3,
            }
        }
    }

    struct TierField;
    impl FieldAccessor<Customer> for TierField {
        type Value = &'static str;
        fn get(record: &Customer) -> &'static str {
            record.tier
        }
        fn set(record: &mut Customer, value: &'static str) {
            record.tier = value;
        }
    }

    struct ChildCountField;
    impl FieldAccessor<Customer> for ChildCountField {
        type Value = u64;
        fn get(record: &Customer) -> u64 {
            record.child_count
        }
        fn set(record: &mut Customer, value: u64) {
            record.child_count = value;
        }
    }

    #[derive(Clone)]
    struct Order {
        gen_id: GenId,
        customer: sdg_core::RecordRef,
        slot: u64,
    }

    impl Record for Order {
        fn gen_id(&self) -> GenId {
            self.gen_id
        }
        fn with_gen_id(gen_id: GenId) -> Self {
            Order {
                gen_id,
                customer: sdg_core::RecordRef(0),
                slot: 0,
            }
        }
    }

    fn build_customer_inspector(child_count: u64) -> Arc<SequenceInspector<Customer, HashRng>> {
        let mut chain = SetterChain::new(ChainMode::Random);
        chain.push(Box::new(FieldSetter::<Customer, TierField, _, HashRng>::new(
            Constant::new("low"),
        )));
        chain.push(Box::new(FieldSetter::<Customer, ChildCountField, _, HashRng>::new(
            Constant::new(child_count),
        )));
        Arc::new(SequenceInspector::new(100, HashRng::from_components(&[3]), chain))
    }

    #[test]
    fn clustered_reference_provider_emits_parent_and_slot_within_bounds() {
        let customers = build_customer_inspector(5);
        let provider: ClusteredReferenceProvider<Order, Customer, _, HashRng> =
            ClusteredReferenceProvider::new(7, ContextField::<Customer, ChildCountField>::new(), customers);

        let child = Order::with_gen_id(14); // parent 2, slot 0 (14 / 7 = 2, 14 % 7 = 0)
        let mut rng = HashRng::from_components(&[1]);
        let outcome = provider.apply(&child, &mut rng).unwrap();
        assert_eq!(outcome.parent.gen_id(), 2);
        assert_eq!(outcome.local_position, Some(0));
    }

    #[test]
    fn clustered_reference_provider_raises_invalid_record_past_child_count() {
        let customers = build_customer_inspector(3);
        let provider: ClusteredReferenceProvider<Order, Customer, _, HashRng> =
            ClusteredReferenceProvider::new(7, ContextField::<Customer, ChildCountField>::new(), customers);

        let child = Order::with_gen_id(14 + 5); // parent 2, slot 5, but only 3 valid children
        let mut rng = HashRng::from_components(&[1]);
        let err = provider.apply(&child, &mut rng).unwrap_err();
        match err {
            ChainSignal::Invalid(invalid) => {
                assert_eq!(invalid.current_gen_id, 19);
                assert_eq!(invalid.max_children, 7);
                assert_eq!(invalid.current_period_size, 3);
                assert_eq!(invalid.next_valid_gen_id(), 21);
            }
            other => panic!("expected InvalidRecord, got {other:?}"),
        }
    }

    #[test]
    fn clustered_reference_provider_reference_range_spans_one_parent_block() {
        let customers = build_customer_inspector(5);
        let provider: ClusteredReferenceProvider<Order, Customer, _, HashRng> =
            ClusteredReferenceProvider::new(7, ContextField::<Customer, ChildCountField>::new(), customers);
        assert_eq!(provider.reference_range(2), Some(Interval::new(14, 21)));
    }

    #[test]
    fn random_reference_provider_picks_within_the_predicate_range() {
        let customers = build_customer_inspector(5);
        let provider = RandomReferenceProvider::new(customers, |_child: &Order| {
            let mut predicate = EqualityPredicate::<Customer>::new();
            predicate.bind::<TierField>("low").unwrap();
            predicate
        });

        let child = Order::with_gen_id(0);
        let mut rng = HashRng::from_components(&[5]);
        let outcome = provider.apply(&child, &mut rng).unwrap();
        assert!(outcome.parent.gen_id() < 100);
        assert_eq!(outcome.parent.tier, "low");
    }

    #[test]
    fn random_reference_provider_errors_when_nothing_matches() {
        let customers = build_customer_inspector(5);
        let provider = RandomReferenceProvider::new(customers, |_child: &Order| {
            let mut predicate = EqualityPredicate::<Customer>::new();
            predicate.bind::<TierField>("nonexistent").unwrap();
            predicate
        });

        let child = Order::with_gen_id(0);
        let mut rng = HashRng::from_components(&[5]);
        let err = provider.apply(&child, &mut rng).unwrap_err();
        assert!(matches!(err, ChainSignal::Fatal(EngineError::GenerationAborted(_))));
    }
}
