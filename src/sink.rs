//! Echo sink for lines the engine passes through or reprints.
//!
//! Writes are append-only and unbuffered; failures are dropped because the
//! echo must never stall or abort ingestion.

use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;

/// Receives raw input lines verbatim.
pub trait Sink: Send {
    fn echo(&mut self, raw: &[u8]);
}

/// Echo to standard output, flushing after every line.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl Sink for StdoutSink {
    fn echo(&mut self, raw: &[u8]) {
        let mut out = std::io::stdout().lock();
        if out.write_all(raw).and_then(|()| out.flush()).is_err() {
            tracing::trace!("stdout echo failed, line dropped");
        }
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl Sink for NullSink {
    fn echo(&mut self, _raw: &[u8]) {}
}

/// Shared in-memory sink; clones see the same buffer.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Vec<u8> {
        self.buf.lock().clone()
    }

    pub fn contents_lossy(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock()).into_owned()
    }
}

impl Sink for MemorySink {
    fn echo(&mut self, raw: &[u8]) {
        self.buf.lock().extend_from_slice(raw);
    }
}
