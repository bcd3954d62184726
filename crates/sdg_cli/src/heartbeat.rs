//! Coordinator heartbeat (spec.md §6, SPEC_FULL.md §15): a background thread
//! that fires a periodic raw HTTP `HEAD /heartbeat?id=...` request at a
//! coordinator over a plain `TcpStream`. No HTTP client crate appears
//! anywhere in the retrieval pack, so this hand-rolls the one request it
//! needs rather than pulling one in — matching spec.md §1's framing of
//! everything outside the core engine as "thin infrastructure, external
//! collaborator".
//!
//! Never panics and never propagates a failure into the generation path: a
//! send failure is logged at `warn` and counted; after
//! [`MAX_CONSECUTIVE_FAILURES`] in a row the thread gives up and exits quietly.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, warn};

const MAX_CONSECUTIVE_FAILURES: u32 = 20;
const INTERVAL: Duration = Duration::from_secs(5);

pub struct Heartbeat {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Heartbeat {
    /// Spawns the background thread against `addr` (`host:port`), reporting
    /// as `node_id`. Stops itself early after `MAX_CONSECUTIVE_FAILURES`.
    pub fn spawn(addr: String, node_id: u32) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let handle = std::thread::spawn(move || run(&addr, node_id, &thread_stop));
        Heartbeat {
            stop,
            handle: Some(handle),
        }
    }

    /// Signals the thread to stop and joins it. Never panics even if the
    /// thread already exited on its own (e.g. failure budget exhausted).
    pub fn stop(mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

const POLL: Duration = Duration::from_millis(50);

fn run(addr: &str, node_id: u32, stop: &AtomicBool) {
    let mut consecutive_failures = 0u32;
    while !stop.load(Ordering::Relaxed) && consecutive_failures < MAX_CONSECUTIVE_FAILURES {
        match send_heartbeat(addr, node_id) {
            Ok(()) => {
                debug!(addr, node_id, "heartbeat sent");
                consecutive_failures = 0;
            }
            Err(e) => {
                consecutive_failures += 1;
                warn!(addr, node_id, consecutive_failures, error = %e, "heartbeat send failed");
            }
        }
        sleep_unless_stopped(INTERVAL, stop);
    }
    if consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
        warn!(addr, node_id, "giving up on coordinator heartbeat after too many failures");
    }
}

/// Sleeps `duration` in short increments so a `stop()` call is observed
/// within one `POLL` tick rather than blocking a full `INTERVAL`.
fn sleep_unless_stopped(duration: Duration, stop: &AtomicBool) {
    let mut remaining = duration;
    while remaining > Duration::ZERO && !stop.load(Ordering::Relaxed) {
        let step = remaining.min(POLL);
        std::thread::sleep(step);
        remaining -= step;
    }
}

fn send_heartbeat(addr: &str, node_id: u32) -> std::io::Result<()> {
    let mut stream = TcpStream::connect(addr)?;
    let request = format!(
        "HEAD /heartbeat?id={node_id} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n"
    );
    stream.write_all(request.as_bytes())?;
    let mut discard = [0u8; 256];
    let _ = stream.read(&mut discard);
    Ok(())
}
