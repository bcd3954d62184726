// crates/sdg_cli/src/args.rs
//
// Offline CLI argument parsing for the record generator front-end. Flags
// mirror the enclosing application's surface exactly (spec.md §6): `-s`
// scaling, `-i` node id, `-N` node count, `-m` dataset id, `-o` output base,
// `-c` config dir, `-x` stage name (repeatable). Every path-shaped override
// is optional: a bare invocation runs entirely from `<config-dir>/sdg.properties`.

use std::fmt;
use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "sdg", about = "Partitioned deterministic record generator")]
pub struct Args {
    /// Directory holding `sdg.properties` and any enum-set/histogram files it references.
    #[arg(short = 'c', long = "config-dir")]
    pub config_dir: PathBuf,

    /// Override `application.scaling-factor`.
    #[arg(short = 's', long = "scaling")]
    pub scaling: Option<f64>,

    /// Override `application.node-id`.
    #[arg(short = 'i', long = "node-id")]
    pub node_id: Option<u32>,

    /// Override `application.node-count`.
    #[arg(short = 'N', long = "node-count")]
    pub node_count: Option<u32>,

    /// Override `application.job-id`.
    #[arg(short = 'm', long = "dataset-id")]
    pub dataset_id: Option<String>,

    /// Override `application.output-base`.
    #[arg(short = 'o', long = "output-base")]
    pub output_base: Option<PathBuf>,

    /// Restrict the run to these record type names; repeatable. Empty means all.
    #[arg(short = 'x', long = "stage")]
    pub stages: Vec<String>,

    /// Verbose logging (equivalent to `RUST_LOG=debug` unless `RUST_LOG` is set).
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[derive(Debug)]
pub enum CliError {
    NotFound(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound(p) => write!(f, "config directory not found: {p}"),
        }
    }
}

impl std::error::Error for CliError {}

/// Parses argv and checks the one thing clap itself can't: that `config_dir`
/// actually exists, so a bad `-c` fails before any stage runs rather than
/// surfacing as a generic `ConfigError` once `sdg_io::config::load_file` runs.
pub fn parse_and_validate() -> Result<Args, CliError> {
    let args = Args::parse();
    if !args.config_dir.is_dir() {
        return Err(CliError::NotFound(args.config_dir.display().to_string()));
    }
    Ok(args)
}
