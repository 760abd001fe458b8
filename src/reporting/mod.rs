//! Reporting
//!
//! Export targets and the runner that pushes store snapshots to them.

pub mod app_insights;
pub mod runner;
pub mod target;

use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use uuid::Uuid;

use crate::config::{ExportTargetKind, StaticConfig};

pub use app_insights::AppInsightsTarget;
pub use runner::{ReportOutcome, ReportRunner, ReportTrigger};
pub use target::{ExportTarget, LogTarget};

/// Instantiate the configured export targets.
///
/// Reporting disabled in `[metrics]` yields no targets, so passes succeed
/// without sending anything.
pub fn build_targets(config: &StaticConfig, instrumentation_key: Uuid) -> Vec<Arc<dyn ExportTarget>> {
    if !config.metrics.reporting_enabled {
        info!("Metric reporting disabled, no export targets configured");
        return Vec::new();
    }

    let timeout = Duration::from_secs(config.reporting.timeout_secs);
    config
        .reporting
        .targets
        .iter()
        .map(|kind| -> Arc<dyn ExportTarget> {
            match kind {
                ExportTargetKind::AppInsights => Arc::new(AppInsightsTarget::new(
                    config.reporting.endpoint.clone(),
                    instrumentation_key,
                    timeout,
                )),
                ExportTargetKind::Log => Arc::new(LogTarget),
            }
        })
        .collect()
}
