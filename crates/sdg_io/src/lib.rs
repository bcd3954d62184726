//! sdg_io — the external-collaborator layer (spec.md §1): configuration
//! loading, the enumerated-set and combined-histogram file grammars, and the
//! output sinks that the stage driver writes finished records to.
//!
//! Mirrors `vm_io`'s "no inline implementations, re-export the file modules"
//! discipline: each concern owns a file, `lib.rs` only wires them together
//! and re-exports the stable surface.

#![forbid(unsafe_code)]

pub mod config;
pub mod enumset;
pub mod error;
pub mod histogram;
pub mod output;

pub use config::{Config, OutputType, Partitioning};
pub use error::{ConfigError, DataFormatError, IoError};
pub use output::{LocalFileOutputCollector, OutputCollector, SocketStreamOutputCollector, VoidOutputCollector};

pub mod prelude {
    pub use crate::config::{self, Config, OutputType, Partitioning};
    pub use crate::error::{ConfigError, ConfigResult, DataFormatError, DataFormatResult, IoError, IoResult};
    pub use crate::output::{LocalFileOutputCollector, OutputCollector, SocketStreamOutputCollector, VoidOutputCollector};
    pub use crate::{enumset, histogram};
}
