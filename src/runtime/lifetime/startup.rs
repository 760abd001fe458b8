use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::{StaticConfig, validate_config, validate_instrumentation_key};
use crate::errors::Result;
use crate::instruments::{InstrumentRegistry, SampleInstruments};
use crate::output::SnapshotPrinter;
use crate::progress::ProgressObserver;
use crate::reporting::{ReportRunner, build_targets};
use crate::runtime::context::SamplerContext;
use crate::runtime::counters::RunCounters;
use crate::store::MetricsStore;

/// 准备采样器运行所需的上下文
///
/// Validation runs first, so a bad configuration fails before any instrument,
/// target or task exists.
pub fn prepare_startup(
    config: &StaticConfig,
    progress: Arc<dyn ProgressObserver>,
) -> Result<SamplerContext> {
    let start_time = Instant::now();
    debug!("Starting pre-startup processing...");

    validate_config(config)?;
    let instrumentation_key = validate_instrumentation_key(&config.reporting.instrumentation_key)?;

    let mut registry = InstrumentRegistry::new();
    let instruments = SampleInstruments::register(&mut registry)?;
    let registry = Arc::new(registry);
    debug!("Registered {} instruments", registry.len());

    let store = Arc::new(MetricsStore::new(registry.clone(), &config.metrics));
    if !store.is_enabled() {
        info!("Metrics disabled, recorder writes will be ignored");
    }

    let targets = build_targets(config, instrumentation_key);
    let reporter = ReportRunner::new(
        store.clone(),
        targets,
        std::time::Duration::from_secs(config.reporting.timeout_secs),
    );
    info!("Export targets: {:?}", reporter.target_names());

    let printer = SnapshotPrinter::from_kinds(store.clone(), &config.output.formatters);

    debug!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(SamplerContext {
        sampler: config.sampler.clone(),
        instrumentation_key,
        registry,
        instruments,
        store,
        reporter,
        printer,
        counters: Arc::new(RunCounters::new()),
        progress,
    })
}
