//! Progress observer for the background loops.
//!
//! Mirrors the recorder-trait pattern: every method is a no-op by default so
//! observers only implement what they care about.

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Receives one tick per completed round / periodic flush.
///
/// Implementations must be thread-safe (Send + Sync).
pub trait ProgressObserver: Send + Sync {
    /// A recording round completed
    fn on_recorded(&self) {}

    /// A periodic flush completed successfully
    fn on_flushed(&self) {}
}

/// Observer that ignores every tick.
pub struct NoopProgress;

impl ProgressObserver for NoopProgress {}

impl NoopProgress {
    pub fn arc() -> Arc<dyn ProgressObserver> {
        Arc::new(Self)
    }
}

/// Writes `.` per round and `*` per flush to stdout.
pub struct ConsoleProgress;

impl ConsoleProgress {
    fn tick(symbol: &str) {
        let mut out = std::io::stdout().lock();
        // 控制台不可写时丢弃进度提示
        let _ = out.write_all(symbol.as_bytes());
        let _ = out.flush();
    }
}

impl ProgressObserver for ConsoleProgress {
    fn on_recorded(&self) {
        Self::tick(".");
    }

    fn on_flushed(&self) {
        Self::tick("*");
    }
}

/// Counts ticks; handy for tests and for callers that want to poll.
#[derive(Debug, Default)]
pub struct CountingProgress {
    recorded: AtomicU64,
    flushed: AtomicU64,
}

impl CountingProgress {
    pub fn recorded(&self) -> u64 {
        self.recorded.load(Ordering::Acquire)
    }

    pub fn flushed(&self) -> u64 {
        self.flushed.load(Ordering::Acquire)
    }
}

impl ProgressObserver for CountingProgress {
    fn on_recorded(&self) {
        self.recorded.fetch_add(1, Ordering::AcqRel);
    }

    fn on_flushed(&self) {
        self.flushed.fetch_add(1, Ordering::AcqRel);
    }
}
