//! [`AnyOutput`]: a closed sum of the three [`OutputCollector`] impls
//! `sdg_io::output` ships, selected once per run by `application.output-type`
//! — the same "generics over dynamic dispatch" shape `sdg_core::RngKind`
//! uses to pick a PRNG backend, applied here so a [`sdg_engine::stage::RecordTypeTask`]
//! stays monomorphised over one concrete `Out` type regardless of which sink
//! config selected.

use sdg_io::config::{Config, OutputType};
use sdg_io::error::IoResult;
use sdg_io::output::{LocalFileOutputCollector, OutputCollector, SocketStreamOutputCollector, VoidOutputCollector};

pub enum AnyOutput {
    File(LocalFileOutputCollector),
    Socket(SocketStreamOutputCollector),
    Void(VoidOutputCollector),
}

impl AnyOutput {
    pub fn open(config: &Config, generator_name: &str) -> IoResult<Self> {
        Ok(match config.output_type {
            OutputType::File => AnyOutput::File(LocalFileOutputCollector::open(
                &config.output_base,
                &config.job_id,
                config.node_id,
                generator_name,
            )?),
            OutputType::Socket => {
                let port = config.output_port.expect("socket output requires a port (checked at config load)");
                AnyOutput::Socket(SocketStreamOutputCollector::connect(port)?)
            }
            OutputType::Void => AnyOutput::Void(VoidOutputCollector::new()),
        })
    }
}

impl OutputCollector for AnyOutput {
    fn collect(&mut self, bytes: &[u8]) -> IoResult<()> {
        match self {
            AnyOutput::File(o) => o.collect(bytes),
            AnyOutput::Socket(o) => o.collect(bytes),
            AnyOutput::Void(o) => o.collect(bytes),
        }
    }

    fn flush(&mut self) -> IoResult<()> {
        match self {
            AnyOutput::File(o) => o.flush(),
            AnyOutput::Socket(o) => o.flush(),
            AnyOutput::Void(o) => o.flush(),
        }
    }
}
