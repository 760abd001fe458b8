use std::sync::atomic::{AtomicU64, Ordering};

/// Run-wide counters, bumped by the background loops and read once at shutdown.
#[derive(Debug, Default)]
pub struct RunCounters {
    record_count: AtomicU64,
    flush_count: AtomicU64,
    overrun_count: AtomicU64,
}

impl RunCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_completed(&self) -> u64 {
        self.record_count.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn flush_completed(&self) -> u64 {
        self.flush_count.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn overrun(&self) -> u64 {
        self.overrun_count.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn record_count(&self) -> u64 {
        self.record_count.load(Ordering::Acquire)
    }

    pub fn flush_count(&self) -> u64 {
        self.flush_count.load(Ordering::Acquire)
    }

    pub fn overrun_count(&self) -> u64 {
        self.overrun_count.load(Ordering::Acquire)
    }
}
