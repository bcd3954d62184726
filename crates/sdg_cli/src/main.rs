// crates/sdg_cli/src/main.rs
//
// `sdg` — offline CLI front-end for the partitioned deterministic record
// engine. Loads a properties config, resolves per-type cardinalities and
// partition ranges, builds the compiled-in demo schema's setter chains, and
// drives one stage (every record type with pending work) to completion.

mod args;
mod error;
mod heartbeat;
mod output;
mod schema;

use std::process::ExitCode;
use std::sync::Arc;

use args::{parse_and_validate, Args};
use error::GenerationError;
use heartbeat::Heartbeat;
use output::AnyOutput;
use sdg_core::RngKind;
use sdg_engine::chain::ChainMode;
use sdg_engine::inspector::SequenceInspector;
use sdg_engine::stage::{GeneratorTask, RecordTypeTask, StageDriver};
use sdg_engine::{partition, EngineError};
use sdg_io::config::Config;
use tracing::info;

/// Stable substream assignment: one `next_substream()` step per record type,
/// in this fixed order, so the same config always hands each type the same
/// slice of PRNG space regardless of which stages `-x` restricts a run to.
const TYPE_ORDER: [&str; 2] = [schema::WIDGET_TYPE_NAME, schema::ORDER_TYPE_NAME];

fn main() -> ExitCode {
    let args = match parse_and_validate() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("sdg: error: {e}");
            return ExitCode::from(1);
        }
    };

    init_tracing(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::from(0),
        Err(e) => {
            eprintln!("sdg: error: {e}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(args: Args) -> Result<(), GenerationError> {
    let config_path = args.config_dir.join("sdg.properties");
    let mut config = sdg_io::config::load_file(&config_path)?;
    apply_overrides(&mut config, &args);

    for name in &args.stages {
        if !TYPE_ORDER.contains(&name.as_str()) {
            return Err(GenerationError::UnknownStage(name.clone()));
        }
    }

    let heartbeat = std::env::var("SDG_COORDINATOR_ADDR")
        .ok()
        .map(|addr| Heartbeat::spawn(addr, config.node_id));

    let result = generate(&config, &args.stages);

    if let Some(hb) = heartbeat {
        hb.stop();
    }

    result
}

fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(scaling) = args.scaling {
        config.scaling_factor = scaling;
    }
    if let Some(node_id) = args.node_id {
        config.node_id = node_id;
    }
    if let Some(node_count) = args.node_count {
        config.node_count = node_count;
    }
    if let Some(dataset_id) = &args.dataset_id {
        config.job_id = dataset_id.clone();
    }
    if let Some(output_base) = &args.output_base {
        config.output_base = output_base.clone();
    }
}

fn wants(selected_stages: &[String], name: &str) -> bool {
    selected_stages.is_empty() || selected_stages.iter().any(|s| s == name)
}

/// Builds every selected record type's generation task and runs them as one
/// stage. `Widget` and `Order` share this single stage since `Order` only
/// ever reads already-resolved `Widget` positions through a [`SequenceInspector`]
/// rather than depending on `Widget`'s generation task having already run.
fn generate(config: &Config, selected_stages: &[String]) -> Result<(), GenerationError> {
    let cardinalities = partition::resolve_all(&config.partitioning, config.scaling_factor)?;
    let widget_cardinality = *cardinalities
        .get(schema::WIDGET_TYPE_NAME)
        .ok_or_else(|| EngineError::InvariantViolation("no partitioning entry for Widget".into()))?;
    let order_cardinality = *cardinalities
        .get(schema::ORDER_TYPE_NAME)
        .ok_or_else(|| EngineError::InvariantViolation("no partitioning entry for Order".into()))?;

    let base_rng = build_rng(&config.master_seed);
    let widget_rng = substream(&base_rng, 0);
    let order_rng = substream(&base_rng, 1);

    // The inspector backs Order's clustered reference lookups; it is built
    // regardless of whether Widget's own generation task is selected, since
    // Order's positions still need a well-defined parent even in a
    // Widget-less partial run.
    let widget_inspector = Arc::new(SequenceInspector::new(
        widget_cardinality,
        widget_rng.clone(),
        schema::widget_chain(ChainMode::Random, widget_cardinality),
    ));

    let mut tasks: Vec<Box<dyn GeneratorTask>> = Vec::new();

    if wants(selected_stages, schema::WIDGET_TYPE_NAME) {
        let range = partition::node_range(
            schema::WIDGET_TYPE_NAME,
            &config.partitioning,
            widget_cardinality,
            config.node_id,
            config.node_count,
        );
        let chain = schema::widget_chain(ChainMode::Sequential, widget_cardinality);
        let out = AnyOutput::open(config, schema::WIDGET_TYPE_NAME)?;
        tasks.push(Box::new(RecordTypeTask::new(
            schema::WIDGET_TYPE_NAME,
            range,
            widget_rng.clone(),
            chain,
            schema::encode_widget as fn(&schema::Widget) -> Vec<u8>,
            out,
        )));
    }

    if wants(selected_stages, schema::ORDER_TYPE_NAME) {
        let range = partition::node_range(
            schema::ORDER_TYPE_NAME,
            &config.partitioning,
            order_cardinality,
            config.node_id,
            config.node_count,
        );
        let chain = schema::order_chain(ChainMode::Sequential, Arc::clone(&widget_inspector));
        let out = AnyOutput::open(config, schema::ORDER_TYPE_NAME)?;
        tasks.push(Box::new(RecordTypeTask::new(
            schema::ORDER_TYPE_NAME,
            range,
            order_rng,
            chain,
            schema::encode_order as fn(&schema::Order) -> Vec<u8>,
            out,
        )));
    }

    info!(node = config.node_id, tasks = tasks.len(), "stage starting");
    let thread_count = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(tasks.len().max(1));
    let driver = StageDriver::new(thread_count)?;
    driver.run_stage(tasks)?;
    info!(node = config.node_id, "stage finished");
    Ok(())
}

fn build_rng(master_seed: &[u64]) -> RngKind {
    match std::env::var("SDG_RNG_BACKEND").as_deref() {
        Ok("hash") => RngKind::hash(master_seed),
        _ => {
            let mut components = [0u64; 6];
            for (i, slot) in components.iter_mut().enumerate() {
                *slot = master_seed.get(i).copied().unwrap_or(0);
            }
            RngKind::compound_inversive(components)
        }
    }
}

fn substream(base: &RngKind, index: u64) -> RngKind {
    use sdg_core::HierarchicalRng;
    let mut rng = base.clone();
    for _ in 0..index {
        rng.next_substream();
    }
    rng
}
