//! Value/range/reference providers, setter chains, the sequence inspector,
//! partitioning, and the stage driver for the partitioned deterministic
//! record engine. Built on [`sdg_core`]'s hierarchical PRNG and
//! record/field-accessor traits, [`sdg_math`]'s probability distributions,
//! and [`sdg_io`]'s configuration and output sinks.

pub mod chain;
pub mod error;
pub mod inspector;
pub mod interval;
pub mod partition;
pub mod predicate;
pub mod progress;
pub mod provider;
pub mod setter;
pub mod stage;
pub mod value;

pub use chain::{ChainMode, SetterChain};
pub use error::{ChainResult, ChainSignal, EngineError, InvalidRecord};
pub use inspector::SequenceInspector;
pub use interval::Interval;
pub use predicate::EqualityPredicate;
pub use progress::{ProgressReporter, PROGRESS_REPORT_INTERVAL};
pub use setter::{FieldSetter, ReferenceSetter, ReferenceSetterWithPosition, Setter};
pub use stage::{GeneratorTask, RecordTypeTask, StageDriver};
pub use value::FieldCodec;
