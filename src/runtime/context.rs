use std::sync::Arc;

use uuid::Uuid;

use crate::config::SamplerConfig;
use crate::instruments::{InstrumentRegistry, SampleInstruments};
use crate::output::SnapshotPrinter;
use crate::progress::ProgressObserver;
use crate::reporting::ReportRunner;
use crate::runtime::counters::RunCounters;
use crate::store::MetricsStore;

/// Everything built at startup, handed to the loops and the control surface.
///
/// Built once by [`prepare_startup`](crate::runtime::lifetime::startup::prepare_startup);
/// there are no process-wide singletons.
pub struct SamplerContext {
    pub sampler: SamplerConfig,
    pub instrumentation_key: Uuid,
    pub registry: Arc<InstrumentRegistry>,
    pub instruments: SampleInstruments,
    pub store: Arc<MetricsStore>,
    pub reporter: ReportRunner,
    pub printer: SnapshotPrinter,
    pub counters: Arc<RunCounters>,
    pub progress: Arc<dyn ProgressObserver>,
}
