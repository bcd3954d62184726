//! Error types for configuration loading and file-grammar parsing, plus
//! output-sink I/O failures. `ConfigError` and `DataFormatError` are raised
//! during initialisation, before any record is produced; `IoError` marks a
//! running output sink as failed (spec §7's error-kind table).

use thiserror::Error;

/// A malformed configuration: missing key, out-of-range value, duplicate
/// registration, or an unrecognized `application.output-type`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("missing required configuration key `{0}`")]
    MissingKey(String),

    #[error("configuration key `{key}` has invalid value `{value}`: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("scaling factor must be >= 1, got {0}")]
    ScalingFactorOutOfRange(f64),

    #[error("unknown output type `{0}`, expected one of file, socket, void")]
    UnknownOutputType(String),

    #[error("duplicate registration for `{0}`")]
    DuplicateRegistration(String),

    #[error("malformed configuration line {line}: {text}")]
    MalformedLine { line: u32, text: String },
}

/// A histogram or enum-set file that violates its grammar. Carries the
/// 1-based line number so the caller can point the user at the offending
/// line, mirroring `MyriadEnumSet::initialize`'s line-tracking reader.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DataFormatError {
    #[error("line {line}: expected header `{expected}`")]
    BadHeader { line: u32, expected: &'static str },

    #[error("line {line}: malformed enum value line (expected `<index>\\t<value>`)")]
    BadEnumValueLine { line: u32 },

    #[error("line {line}: malformed probability line: {text}")]
    BadProbabilityLine { line: u32, text: String },

    #[error("line {line}: malformed condition header: {text}")]
    BadConditionHeader { line: u32, text: String },

    #[error("unexpected end of file while reading {what} (expected {expected} more entries)")]
    UnexpectedEof { what: &'static str, expected: usize },

    #[error("histogram construction failed: {0}")]
    Math(#[from] sdg_math::error::MathError),
}

/// An output sink failed to open, write, or flush.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to open output sink at `{path}`: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write to output sink: {0}")]
    Write(#[source] std::io::Error),

    #[error("failed to connect output sink to `{addr}`: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
pub type DataFormatResult<T> = Result<T, DataFormatError>;
pub type IoResult<T> = Result<T, IoError>;
