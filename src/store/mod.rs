//! Metrics store
//!
//! Thread-safe aggregation state backing every registered instrument.
//!
//! - counters and gauges are single atomics
//! - histograms, meters and timers sit behind one `parking_lot::Mutex` per slot
//!
//! Each instrument is internally consistent on its own; a snapshot makes no
//! promise about ordering *across* instruments.

mod histogram;
mod meter;
mod snapshot;
mod timer;

pub use histogram::{DEFAULT_WINDOW_SIZE, HistogramSummary};
pub use meter::{MeterItem, MeterSummary};
pub use snapshot::{MetricEntry, MetricValue, MetricsSnapshot};
pub use timer::{TimerContext, TimerSummary};

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::warn;

use crate::config::MetricsOptions;
use crate::instruments::{InstrumentId, InstrumentKind, InstrumentRegistry, MetricTags};
use histogram::HistogramState;
use meter::MeterState;

/// Write side of the store.
///
/// The recorder only sees this trait, so tests can swap in a recording double.
pub trait Measure: Send + Sync {
    fn increment_counter(&self, id: InstrumentId, amount: i64);

    fn set_gauge(&self, id: InstrumentId, value: f64);

    fn update_histogram(&self, id: InstrumentId, value: f64);

    /// Mark a meter, optionally attributing the amount to a dimension item.
    fn mark_meter(&self, id: InstrumentId, amount: u64, item: Option<&str>);

    fn record_time(&self, id: InstrumentId, elapsed: Duration);
}

enum Slot {
    Counter(AtomicI64),
    Gauge(AtomicU64),
    Histogram(Mutex<HistogramState>),
    Meter(Mutex<MeterState>),
    Timer(Mutex<HistogramState>),
}

impl Slot {
    fn for_kind(kind: InstrumentKind, window: usize) -> Self {
        match kind {
            InstrumentKind::Counter => Slot::Counter(AtomicI64::new(0)),
            InstrumentKind::Gauge => Slot::Gauge(AtomicU64::new(0f64.to_bits())),
            InstrumentKind::Histogram => Slot::Histogram(Mutex::new(HistogramState::new(window))),
            InstrumentKind::Meter => Slot::Meter(Mutex::new(MeterState::default())),
            InstrumentKind::Timer => Slot::Timer(Mutex::new(HistogramState::new(window))),
        }
    }
}

pub struct MetricsStore {
    registry: Arc<InstrumentRegistry>,
    slots: Vec<Slot>,
    enabled: bool,
    context: String,
    global_tags: MetricTags,
    started: Instant,
}

impl MetricsStore {
    pub fn new(registry: Arc<InstrumentRegistry>, options: &MetricsOptions) -> Self {
        Self::with_window(registry, options, DEFAULT_WINDOW_SIZE)
    }

    pub fn with_window(
        registry: Arc<InstrumentRegistry>,
        options: &MetricsOptions,
        window: usize,
    ) -> Self {
        let slots = registry
            .iter()
            .map(|(_, d)| Slot::for_kind(d.kind, window))
            .collect();

        Self {
            registry,
            slots,
            enabled: options.enabled,
            context: options.default_context_label.clone(),
            global_tags: MetricTags::from_pairs(options.global_tags.clone()),
            started: Instant::now(),
        }
    }

    pub fn registry(&self) -> &Arc<InstrumentRegistry> {
        &self.registry
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Start timing a unit of work against a timer instrument.
    pub fn time(&self, id: InstrumentId) -> TimerContext<'_> {
        TimerContext::start(self, id)
    }

    /// Take a point-in-time copy of every instrument.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let elapsed = self.started.elapsed();

        let entries = self
            .registry
            .iter()
            .zip(&self.slots)
            .map(|((_, descriptor), slot)| {
                let value = match slot {
                    Slot::Counter(c) => MetricValue::Counter {
                        count: c.load(Ordering::Acquire),
                    },
                    Slot::Gauge(g) => MetricValue::Gauge {
                        value: f64::from_bits(g.load(Ordering::Acquire)),
                    },
                    Slot::Histogram(h) => MetricValue::Histogram(h.lock().summary()),
                    Slot::Meter(m) => MetricValue::Meter(m.lock().summary(elapsed)),
                    Slot::Timer(t) => {
                        let state = t.lock();
                        MetricValue::Timer(TimerSummary {
                            calls: state.count(),
                            mean_rate: meter::rate(state.count(), elapsed),
                            duration_ms: state.summary(),
                        })
                    }
                };

                MetricEntry {
                    name: descriptor.name.clone(),
                    kind: descriptor.kind,
                    tags: descriptor.tags.merged(&self.global_tags),
                    value,
                }
            })
            .collect();

        MetricsSnapshot {
            timestamp: chrono::Utc::now(),
            context: self.context.clone(),
            entries,
        }
    }

    fn slot(&self, id: InstrumentId, expected: InstrumentKind) -> Option<&Slot> {
        if !self.enabled {
            return None;
        }
        match self.registry.get(id) {
            Some(d) if d.kind == expected => self.slots.get(id.index()),
            Some(d) => {
                warn!(
                    "MetricsStore: '{}' is a {}, not a {}; write ignored",
                    d.name, d.kind, expected
                );
                None
            }
            None => {
                warn!("MetricsStore: unknown instrument {:?}; write ignored", id);
                None
            }
        }
    }
}

impl Measure for MetricsStore {
    fn increment_counter(&self, id: InstrumentId, amount: i64) {
        if let Some(Slot::Counter(c)) = self.slot(id, InstrumentKind::Counter) {
            c.fetch_add(amount, Ordering::AcqRel);
        }
    }

    fn set_gauge(&self, id: InstrumentId, value: f64) {
        if let Some(Slot::Gauge(g)) = self.slot(id, InstrumentKind::Gauge) {
            g.store(value.to_bits(), Ordering::Release);
        }
    }

    fn update_histogram(&self, id: InstrumentId, value: f64) {
        if let Some(Slot::Histogram(h)) = self.slot(id, InstrumentKind::Histogram) {
            h.lock().update(value);
        }
    }

    fn mark_meter(&self, id: InstrumentId, amount: u64, item: Option<&str>) {
        if let Some(Slot::Meter(m)) = self.slot(id, InstrumentKind::Meter) {
            m.lock().mark(amount, item);
        }
    }

    fn record_time(&self, id: InstrumentId, elapsed: Duration) {
        if let Some(Slot::Timer(t)) = self.slot(id, InstrumentKind::Timer) {
            t.lock().update(elapsed.as_nanos() as f64 / 1_000_000.0);
        }
    }
}
