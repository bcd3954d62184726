//! `SequenceInspector<R, Rng>` (spec §4.8): a random-access view into a
//! record sequence, shared (via `Arc`) between whichever reference providers
//! of other record types need to look up or filter `R`'s sequence. Each
//! inspector owns a private `HierarchicalRng` clone and a `SetterChain` in
//! [`ChainMode::Random`], so `at(p)` is a pure function of `p` regardless of
//! what other positions were looked up before it (spec.md §9's replay
//! invariant).
//!
//! `at`/`filter` take `&self`, not `&mut self` — reference providers reach
//! an inspector through a shared `Arc`, so the PRNG clone is wrapped in a
//! `Mutex`. An inspector built for one record type can be handed to another
//! type's [`crate::stage::RecordTypeTask`], and `stage::StageDriver` runs
//! every task of a stage on its own `rayon` worker thread, so the sharing is
//! genuinely cross-thread — `Arc`/`Mutex`, not `Rc`/`RefCell`.

use std::sync::Mutex;

use sdg_core::{GenId, HierarchicalRng, Record};

use crate::chain::{ChainMode, SetterChain};
use crate::error::ChainResult;
use crate::interval::Interval;
use crate::predicate::EqualityPredicate;

pub struct SequenceInspector<R: Record, Rng: HierarchicalRng> {
    cardinality: u64,
    rng: Mutex<Rng>,
    chain: SetterChain<R, Rng>,
}

impl<R: Record, Rng: HierarchicalRng> SequenceInspector<R, Rng> {
    /// `chain` must be built in [`ChainMode::Random`] — an inspector backed
    /// by a `Sequential` chain would silently read the wrong record at every
    /// position but the one the caller happened to seed the PRNG to.
    pub fn new(cardinality: u64, rng: Rng, chain: SetterChain<R, Rng>) -> Self {
        SequenceInspector {
            cardinality,
            rng: Mutex::new(rng),
            chain,
        }
    }

    pub fn cardinality(&self) -> u64 {
        self.cardinality
    }

    /// The fully-evaluated record at position `p`.
    pub fn at(&self, p: GenId) -> ChainResult<R> {
        let mut record = R::with_gen_id(p);
        let mut rng = self.rng.lock().unwrap();
        self.chain.evaluate_at(&mut record, &mut rng)?;
        Ok(record)
    }

    /// The position range satisfying `predicate` (spec §4.9's sole consumer
    /// besides `ReferenceProvider`).
    pub fn filter(&self, predicate: &EqualityPredicate<R>) -> Interval {
        self.chain.filter(predicate, self.cardinality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdg_core::{FieldAccessor, HashRng};

    use crate::provider::value::Clustered;
    use crate::setter::FieldSetter;

    #[derive(Clone)]
    struct Customer {
        gen_id: GenId,
        tier: &'static str,
    }

    impl Record for Customer {
        fn gen_id(&self) -> GenId {
            self.gen_id
        }
        fn with_gen_id(gen_id: GenId) -> Self {
            Customer { gen_id, tier: "low" }
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

    fn build_inspector() -> SequenceInspector<Customer, HashRng> {
        let tiers: Clustered<&'static str> =
            Clustered::new(vec!["low", "mid", "high"], vec![1.0, 1.0, 1.0], 1000);
        let mut chain = SetterChain::new(ChainMode::Random);
        chain.push(Box::new(FieldSetter::<Customer, TierField, _, HashRng>::new(tiers)));
        SequenceInspector::new(1000, HashRng::from_components(&[7]), chain)
    }

    #[test]
    fn at_is_independent_of_prior_lookups() {
        let inspector = build_inspector();
        let direct = inspector.at(750).unwrap();
        let _ = inspector.at(10).unwrap();
        let _ = inspector.at(500).unwrap();
        let after_other_lookups = inspector.at(750).unwrap();
        assert_eq!(direct.tier, after_other_lookups.tier);
    }

    #[test]
    fn filter_delegates_to_the_chain() {
        let inspector = build_inspector();
        let mut predicate = EqualityPredicate::<Customer>::new();
        predicate.bind::<TierField>("high").unwrap();
        assert_eq!(inspector.filter(&predicate), Interval::new(666, 1000));
    }
}
