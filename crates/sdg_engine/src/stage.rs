//! The stage driver (spec.md §4.11, §8): runs one [`GeneratorTask`] per
//! record type with pending work in a stage, on a bounded `rayon` thread
//! pool, and joins before the next stage begins.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use sdg_core::{HierarchicalRng, Record};
use sdg_io::output::OutputCollector;
use tracing::{debug, info, warn};

use crate::chain::SetterChain;
use crate::error::{ChainSignal, EngineError};
use crate::interval::Interval;
use crate::progress::{ProgressReporter, PROGRESS_REPORT_INTERVAL};

/// One unit of stage work — generating every record in one record type's
/// partition. Implementations own everything a worker thread needs: the
/// partition range, a private RNG, the field-setter chain, and the output
/// sink, so tasks never share mutable state with one another.
pub trait GeneratorTask: Send {
    fn name(&self) -> &str;

    /// Runs to completion, to the first fatal error, or until `abort` is
    /// observed set (checked every [`PROGRESS_REPORT_INTERVAL`] records).
    fn run(&mut self, abort: &AtomicBool, progress: &ProgressReporter) -> Result<(), EngineError>;
}

/// The iterator task for one record type's partition (spec.md §4.11 point
/// list): walks `[begin, end)` in order, seeking the RNG to each position
/// explicitly rather than relying on the chain's own reseek (the chain here
/// runs in [`crate::chain::ChainMode::Sequential`], which assumes the caller
/// already positioned the stream).
pub struct RecordTypeTask<R, Rng, Out, Enc> {
    name: String,
    range: Interval,
    rng: Rng,
    chain: SetterChain<R, Rng>,
    encode: Enc,
    output: Out,
}

impl<R, Rng, Out, Enc> RecordTypeTask<R, Rng, Out, Enc>
where
    R: Record,
    Rng: HierarchicalRng,
    Out: OutputCollector,
    Enc: Fn(&R) -> Vec<u8>,
{
    pub fn new(name: impl Into<String>, range: Interval, rng: Rng, chain: SetterChain<R, Rng>, encode: Enc, output: Out) -> Self {
        RecordTypeTask {
            name: name.into(),
            range,
            rng,
            chain,
            encode,
            output,
        }
    }
}

impl<R, Rng, Out, Enc> GeneratorTask for RecordTypeTask<R, Rng, Out, Enc>
where
    R: Record + Send,
    Rng: HierarchicalRng + Send,
    Out: OutputCollector + Send,
    Enc: Fn(&R) -> Vec<u8> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&mut self, abort: &AtomicBool, progress: &ProgressReporter) -> Result<(), EngineError> {
        info!(task = %self.name, begin = self.range.start, end = self.range.end, "stage task starting");

        let mut p = self.range.start;
        let mut since_check = 0u64;
        while p < self.range.end {
            if since_check >= PROGRESS_REPORT_INTERVAL {
                if abort.load(Ordering::Relaxed) {
                    warn!(task = %self.name, at = p, "stopping early, abort flag set");
                    return Ok(());
                }
                since_check = 0;
            }

            self.rng.at_chunk(p);
            let mut record = R::with_gen_id(p);
            match self.chain.evaluate_at(&mut record, &mut self.rng) {
                Ok(()) => {
                    let bytes = (self.encode)(&record);
                    self.output.collect(&bytes)?;
                    self.rng.next_chunk();
                    progress.add(1);
                    since_check += 1;
                    p += 1;
                }
                Err(ChainSignal::Invalid(invalid)) => {
                    debug!(task = %self.name, at = p, "invalid record, seeking to next valid gen_id");
                    p = invalid.next_valid_gen_id();
                }
                Err(ChainSignal::Fatal(e)) => return Err(e),
            }
        }

        self.output.flush()?;
        info!(task = %self.name, "stage task finished");
        Ok(())
    }
}

/// Runs the tasks of one stage to completion on a bounded thread pool,
/// joining all of them (a `rayon::Scope` barrier) before returning. The
/// first task to fail sets the shared abort flag so sibling tasks wind down
/// early rather than generating work that will be discarded; the first
/// error observed is the one returned.
pub struct StageDriver {
    pool: rayon::ThreadPool,
}

impl StageDriver {
    pub fn new(thread_count: usize) -> Result<Self, EngineError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(thread_count)
            .build()
            .map_err(|e| EngineError::InvariantViolation(format!("failed to build stage thread pool: {e}")))?;
        Ok(StageDriver { pool })
    }

    pub fn run_stage(&self, tasks: Vec<Box<dyn GeneratorTask>>) -> Result<(), EngineError> {
        let abort = AtomicBool::new(false);
        let progress = ProgressReporter::new();
        let first_error: Mutex<Option<EngineError>> = Mutex::new(None);

        self.pool.scope(|scope| {
            for mut task in tasks {
                let abort = &abort;
                let progress = &progress;
                let first_error = &first_error;
                scope.spawn(move |_| {
                    if let Err(e) = task.run(abort, progress) {
                        abort.store(true, Ordering::Relaxed);
                        let mut slot = first_error.lock().unwrap();
                        if slot.is_none() {
                            *slot = Some(e);
                        }
                    }
                });
            }
        });

        match first_error.into_inner().unwrap() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdg_core::{FieldAccessor, GenId, HashRng};
    use sdg_io::output::VoidOutputCollector;

    use crate::chain::ChainMode;
    use crate::provider::value::Clustered;
    use crate::setter::FieldSetter;

    #[derive(Clone)]
    struct Widget {
        gen_id: GenId,
        tier: &'static str,
    }

    impl Record for Widget {
        fn gen_id(&self) -> GenId {
            self.gen_id
        }
        fn with_gen_id(gen_id: GenId) -> Self {
            Widget { gen_id, tier: "low" }
        }
    }

    struct TierField;
    impl FieldAccessor<Widget> for TierField {
        type Value = &'static str;
        fn get(record: &Widget) -> &'static str {
            record.tier
        }
        fn set(record: &mut Widget, value: &'static str) {
            record.tier = value;
        }
    }

    fn build_task(range: Interval) -> RecordTypeTask<Widget, HashRng, VoidOutputCollector, fn(&Widget) -> Vec<u8>> {
        let tiers: Clustered<&'static str> = Clustered::new(vec!["low", "high"], vec![1.0, 1.0], 1000);
        let mut chain = SetterChain::new(ChainMode::Sequential);
        chain.push(Box::new(FieldSetter::<Widget, TierField, _, HashRng>::new(tiers)));
        RecordTypeTask::new(
            "Widget",
            range,
            HashRng::from_components(&[3]),
            chain,
            (|w: &Widget| format!("{}\t{}\n", w.gen_id, w.tier).into_bytes()) as fn(&Widget) -> Vec<u8>,
            VoidOutputCollector::new(),
        )
    }

    #[test]
    fn record_type_task_walks_its_whole_range_and_reports_progress() {
        let mut task = build_task(Interval::new(0, 1000));
        let abort = AtomicBool::new(false);
        let progress = ProgressReporter::new();
        task.run(&abort, &progress).unwrap();
        assert_eq!(progress.total(), 1000);
        assert_eq!(task.output.count(), 1000);
    }

    #[test]
    fn record_type_task_stops_early_when_abort_is_already_set() {
        let mut task = build_task(Interval::new(0, 5000));
        let abort = AtomicBool::new(true);
        let progress = ProgressReporter::new();
        task.run(&abort, &progress).unwrap();
        // Abort is only checked every PROGRESS_REPORT_INTERVAL records, so
        // the first batch still runs to completion before it is observed.
        assert_eq!(progress.total(), PROGRESS_REPORT_INTERVAL);
    }

    #[test]
    fn stage_driver_runs_every_task_and_joins_before_returning() {
        let driver = StageDriver::new(2).unwrap();
        let tasks: Vec<Box<dyn GeneratorTask>> = vec![
            Box::new(build_task(Interval::new(0, 200))),
            Box::new(build_task(Interval::new(200, 400))),
        ];
        driver.run_stage(tasks).unwrap();
    }
}
