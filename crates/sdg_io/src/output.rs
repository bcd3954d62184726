//! Output sinks ("OutputCollector" in the original): `file`, `socket`, and
//! `void`, per spec.md §6. Grounded in
//! `examples/original_source/src/cpp/io/{LocalFileOutputCollector,SocketStreamOutputCollector,VoidOutputCollector}.h`
//! for the open/collect/flush/close lifecycle, and in the teacher's
//! `canonical_json` atomic-write discipline for the file sink's
//! directory-creation path (the per-record stream itself is append-only, not
//! atomically rewritten, so only directory creation is shared with that
//! idiom).

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::net::TcpStream;
use std::path::PathBuf;

use crate::error::{IoError, IoResult};

/// Number of `collect` calls between buffer flushes, matching the `file` and
/// `socket` sinks' "flushed every 1000 records" behavior from spec.md §6.
const FLUSH_INTERVAL: u64 = 1000;

/// A sink that a stage's iterator task hands finished, serialized records to.
/// Holds no cross-thread state: one instance per `(record type, partition)`
/// task, released on drop regardless of exit path.
pub trait OutputCollector {
    fn collect(&mut self, bytes: &[u8]) -> IoResult<()>;
    fn flush(&mut self) -> IoResult<()>;
}

/// Writes to `<output-base>/<job-id>/node<NNN>/<generator-name>.tbl`,
/// truncate-on-open, binary mode, buffered and flushed every
/// [`FLUSH_INTERVAL`] records and on drop.
pub struct LocalFileOutputCollector {
    writer: BufWriter<File>,
    since_flush: u64,
}

impl LocalFileOutputCollector {
    pub fn open(output_base: &std::path::Path, job_id: &str, node_id: u32, generator_name: &str) -> IoResult<Self> {
        let dir: PathBuf = output_base.join(job_id).join(format!("node{node_id:03}"));
        fs::create_dir_all(&dir).map_err(|e| IoError::Open {
            path: dir.display().to_string(),
            source: e,
        })?;

        let path = dir.join(format!("{generator_name}.tbl"));
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| IoError::Open {
                path: path.display().to_string(),
                source: e,
            })?;

        Ok(LocalFileOutputCollector {
            writer: BufWriter::new(file),
            since_flush: 0,
        })
    }
}

impl OutputCollector for LocalFileOutputCollector {
    fn collect(&mut self, bytes: &[u8]) -> IoResult<()> {
        self.writer.write_all(bytes).map_err(IoError::Write)?;
        self.since_flush += 1;
        if self.since_flush >= FLUSH_INTERVAL {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> IoResult<()> {
        self.writer.flush().map_err(IoError::Write)?;
        self.since_flush = 0;
        Ok(())
    }
}

impl Drop for LocalFileOutputCollector {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

/// Writes to a TCP connection opened at construction time against
/// `localhost:<output-port>`, buffered and flushed every [`FLUSH_INTERVAL`]
/// records.
pub struct SocketStreamOutputCollector {
    writer: BufWriter<TcpStream>,
    since_flush: u64,
}

impl SocketStreamOutputCollector {
    pub fn connect(port: u16) -> IoResult<Self> {
        let addr = format!("localhost:{port}");
        let stream = TcpStream::connect(&addr).map_err(|e| IoError::Connect {
            addr: addr.clone(),
            source: e,
        })?;
        Ok(SocketStreamOutputCollector {
            writer: BufWriter::new(stream),
            since_flush: 0,
        })
    }
}

impl OutputCollector for SocketStreamOutputCollector {
    fn collect(&mut self, bytes: &[u8]) -> IoResult<()> {
        self.writer.write_all(bytes).map_err(IoError::Write)?;
        self.since_flush += 1;
        if self.since_flush >= FLUSH_INTERVAL {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> IoResult<()> {
        self.writer.flush().map_err(IoError::Write)?;
        self.since_flush = 0;
        Ok(())
    }
}

/// Discards every record. Still counts them, so progress reporting stays in
/// parity with a real sink (spec.md §8's "toggling output to void produces
/// identical timings... and identical PRNG state trace").
#[derive(Default)]
pub struct VoidOutputCollector {
    count: u64,
}

impl VoidOutputCollector {
    pub fn new() -> Self {
        VoidOutputCollector::default()
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

impl OutputCollector for VoidOutputCollector {
    fn collect(&mut self, _bytes: &[u8]) -> IoResult<()> {
        self.count += 1;
        Ok(())
    }

    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_sink_creates_nested_directory_and_truncates() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut sink =
                LocalFileOutputCollector::open(dir.path(), "job-1", 0, "Widget").unwrap();
            sink.collect(b"first\n").unwrap();
            sink.flush().unwrap();
        }
        let path = dir.path().join("job-1").join("node000").join("Widget.tbl");
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "first\n");

        // Reopening truncates.
        {
            let mut sink =
                LocalFileOutputCollector::open(dir.path(), "job-1", 0, "Widget").unwrap();
            sink.collect(b"second\n").unwrap();
        }
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "second\n");
    }

    #[test]
    fn void_sink_counts_without_storing() {
        let mut sink = VoidOutputCollector::new();
        for _ in 0..5 {
            sink.collect(b"anything").unwrap();
        }
        assert_eq!(sink.count(), 5);
    }
}
