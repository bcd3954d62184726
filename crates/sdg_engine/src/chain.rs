//! `SetterChain<R, Rng>` (spec §4.5): an ordered list of [`Setter`]s for one
//! record type, evaluated forward to populate a record and backward
//! (`filter`) to turn an [`EqualityPredicate`] into a position range.

use sdg_core::{HierarchicalRng, Record};

use crate::error::ChainResult;
use crate::interval::Interval;
use crate::predicate::EqualityPredicate;
use crate::setter::Setter;

/// Whether a chain reseeks the PRNG to the record's own position before
/// evaluating (`Random`, used by [`crate::inspector::SequenceInspector`] for
/// arbitrary-position lookups) or assumes the caller already positioned the
/// stream and simply lets each record's worth of draws advance it linearly
/// (`Sequential`, used by the main generation pass — spec.md §4.5 point 1).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChainMode {
    Sequential,
    Random,
}

pub struct SetterChain<R: Record, Rng: HierarchicalRng> {
    setters: Vec<Box<dyn Setter<R, Rng> + Send + Sync>>,
    mode: ChainMode,
}

impl<R: Record, Rng: HierarchicalRng> SetterChain<R, Rng> {
    pub fn new(mode: ChainMode) -> Self {
        SetterChain {
            setters: Vec::new(),
            mode,
        }
    }

    pub fn push(&mut self, setter: Box<dyn Setter<R, Rng> + Send + Sync>) -> &mut Self {
        self.setters.push(setter);
        self
    }

    pub fn len(&self) -> usize {
        self.setters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.setters.is_empty()
    }

    /// Forward evaluation (spec §4.5): in `Random` mode, reseek the PRNG to
    /// `record.gen_id()` first so the chain is replayable from any position;
    /// then run each setter in order, skipping arity on the stream for any
    /// that reports itself disabled.
    pub fn evaluate_at(&self, record: &mut R, rng: &mut Rng) -> ChainResult<()> {
        if self.mode == ChainMode::Random {
            rng.at_chunk(record.gen_id());
        }
        for setter in &self.setters {
            if setter.is_enabled(record) {
                setter.apply(record, rng)?;
            } else {
                rng.skip(setter.arity() as u64);
            }
        }
        Ok(())
    }

    /// Reverse evaluation (spec §4.5): start from the full sequence range
    /// and intersect with every setter's `filter_range` against `predicate`,
    /// in chain order. Non-invertible setters, and setters whose field the
    /// predicate does not bind, pass the range through unchanged.
    pub fn filter(&self, predicate: &EqualityPredicate<R>, cardinality: u64) -> Interval {
        let mut range = Interval::full(cardinality);
        for setter in &self.setters {
            if range.is_empty() {
                break;
            }
            range = setter.filter_range(predicate, cardinality, range);
        }
        range
    }
}
