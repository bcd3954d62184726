//! The CLI's top-level error, wrapping every lower crate's error type with
//! `#[from]` (SPEC_FULL.md §12), matching the teacher's per-crate error plus
//! one umbrella pattern. `main` maps any variant to a non-zero exit code.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Config(#[from] sdg_io::ConfigError),

    #[error(transparent)]
    DataFormat(#[from] sdg_io::DataFormatError),

    #[error(transparent)]
    Io(#[from] sdg_io::IoError),

    #[error(transparent)]
    Engine(#[from] sdg_engine::EngineError),

    #[error("record type '{0}' named by -x/--stage is not a known generator")]
    UnknownStage(String),
}
