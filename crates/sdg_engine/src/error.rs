//! Engine-level errors and the `InvalidRecord` control-flow signal.
//!
//! `InvalidRecord` is not an error in the usual sense: a clustered reference
//! provider raises it whenever a generated child position falls past its
//! parent's actual child count, and the stage driver's response is simply to
//! seek forward, never to abort. It is carried as an ordinary `Result` value
//! end to end — never a panic, never `std::process::exit` — mirroring
//! `InvalidRecordException`'s fields exactly (see
//! `examples/original_source/src/cpp/generator/InvalidRecordException.h`)
//! while dropping the "exception" framing spec.md §9 asks to replace.

use std::fmt;

use sdg_core::GenId;

/// Raised when a generated child `gen_id` lands in a parent's "dead" child
/// slots — the tail of its clustered allocation beyond the parent's actual
/// child count. Fields and formulas mirror `InvalidRecordException` exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidRecord {
    /// The child `gen_id` that triggered this signal.
    pub current_gen_id: GenId,
    /// The clustered provider's fixed slots-per-parent (`maxPeriodSize`).
    pub max_children: u64,
    /// The parent's actual child count for this period.
    pub current_period_size: u64,
}

impl InvalidRecord {
    /// The first `gen_id` of the next period — where the stage driver should
    /// resume iteration.
    pub fn next_valid_gen_id(&self) -> GenId {
        (self.current_gen_id / self.max_children + 1) * self.max_children
    }

    /// Start of the valid slice of the *previous* (i.e. this) period.
    pub fn prev_valid_gen_id_min(&self) -> GenId {
        self.next_valid_gen_id() - self.max_children
    }

    /// End (exclusive) of the valid slice of this period.
    pub fn prev_valid_gen_id_max(&self) -> GenId {
        self.prev_valid_gen_id_min() + self.current_period_size
    }

    /// Number of valid positions in this period.
    pub fn prev_valid_gen_id_size(&self) -> u64 {
        self.current_period_size
    }

    /// Number of dead positions skipped by jumping to `next_valid_gen_id()`.
    pub fn invalid_range_size(&self) -> u64 {
        self.next_valid_gen_id() - self.current_gen_id
    }
}

impl fmt::Display for InvalidRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "gen_id {} invalid (period size {} of {}); next valid gen_id is {}",
            self.current_gen_id,
            self.current_period_size,
            self.max_children,
            self.next_valid_gen_id()
        )
    }
}

/// Fatal engine errors — anything that is not recoverable by seeking forward.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("field already bound on equality predicate: {0}")]
    DuplicateBind(String),

    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("generation aborted: {0}")]
    GenerationAborted(String),

    #[error(transparent)]
    Io(#[from] sdg_io::IoError),

    #[error(transparent)]
    DataFormat(#[from] sdg_io::DataFormatError),

    #[error(transparent)]
    Config(#[from] sdg_io::ConfigError),

    #[error(transparent)]
    Math(#[from] sdg_math::MathError),
}

/// The control-flow signal threaded through `Setter`/`SetterChain` evaluation:
/// either a recoverable [`InvalidRecord`] or a fatal [`EngineError`].
#[derive(Debug)]
pub enum ChainSignal {
    Invalid(InvalidRecord),
    Fatal(EngineError),
}

impl fmt::Display for ChainSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainSignal::Invalid(i) => write!(f, "{i}"),
            ChainSignal::Fatal(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ChainSignal {}

impl From<EngineError> for ChainSignal {
    fn from(e: EngineError) -> Self {
        ChainSignal::Fatal(e)
    }
}

pub type ChainResult<T> = Result<T, ChainSignal>;
