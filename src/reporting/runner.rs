//! Report runner
//!
//! 负责把 store 的快照推送到所有导出目标：
//! - 周期上报（取消感知的等待 + 上报）
//! - 按需上报（由操作员触发，结果直接返回给调用方）
//!
//! Passes are independent: the runner keeps no per-pass mutable state, so an
//! on-demand pass may run while a periodic pass is in flight.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use strum::Display;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::target::ExportTarget;
use crate::errors::{Result, SamplerError};
use crate::progress::ProgressObserver;
use crate::runtime::cancel::wait_or_cancel;
use crate::runtime::counters::RunCounters;
use crate::store::MetricsStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ReportTrigger {
    Periodic,
    OnDemand,
}

/// Result of a pass in which every target succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOutcome {
    pub trigger: ReportTrigger,
    pub targets: usize,
    pub entries: usize,
    pub elapsed: Duration,
}

#[derive(Clone)]
pub struct ReportRunner {
    store: Arc<MetricsStore>,
    targets: Vec<Arc<dyn ExportTarget>>,
    /// 单个目标的导出超时
    timeout: Duration,
}

impl ReportRunner {
    pub fn new(
        store: Arc<MetricsStore>,
        targets: Vec<Arc<dyn ExportTarget>>,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            targets,
            timeout,
        }
    }

    pub fn target_names(&self) -> Vec<&str> {
        self.targets.iter().map(|t| t.name()).collect()
    }

    /// Snapshot once and export to every target concurrently.
    ///
    /// All targets are awaited even when some fail; the error names each
    /// failed target.
    pub async fn run_all(&self, trigger: ReportTrigger) -> Result<ReportOutcome> {
        let started = Instant::now();
        let snapshot = Arc::new(self.store.snapshot());
        let entries = snapshot.len();

        let results = join_all(self.targets.iter().map(|target| {
            let snapshot = Arc::clone(&snapshot);
            async move {
                match tokio::time::timeout(self.timeout, target.export(snapshot)).await {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(e)) => Err(format!("{}: {:#}", target.name(), e)),
                    Err(_) => Err(format!(
                        "{}: timed out after {:?}",
                        target.name(),
                        self.timeout
                    )),
                }
            }
        }))
        .await;

        let failures: Vec<String> = results.into_iter().filter_map(|r| r.err()).collect();
        if !failures.is_empty() {
            return Err(SamplerError::export(format!(
                "{} of {} export targets failed ({} pass): {}",
                failures.len(),
                self.targets.len(),
                trigger,
                failures.join("; ")
            )));
        }

        let outcome = ReportOutcome {
            trigger,
            targets: self.targets.len(),
            entries,
            elapsed: started.elapsed(),
        };
        trace!("Report pass finished: {:?}", outcome);
        Ok(outcome)
    }

    /// 按需上报：不影响 flush 计数，也不重置周期上报的节奏
    pub async fn report_now(&self) -> Result<ReportOutcome> {
        self.run_all(ReportTrigger::OnDemand).await
    }

    /// Periodic loop; returns the number of successful flushes.
    ///
    /// Cancellation is observed only while waiting, never during an export.
    pub async fn run_periodic(
        &self,
        every: Duration,
        cancel: CancellationToken,
        counters: Arc<RunCounters>,
        progress: Arc<dyn ProgressObserver>,
    ) -> u64 {
        debug!(
            "Reporter started (interval: {:?}, targets: {:?})",
            every,
            self.target_names()
        );
        let mut flushed = 0u64;

        loop {
            if wait_or_cancel(every, &cancel).await.is_cancelled() {
                trace!("Reporter wait cancelled");
                break;
            }

            match self.run_all(ReportTrigger::Periodic).await {
                Ok(outcome) => {
                    flushed += 1;
                    counters.flush_completed();
                    progress.on_flushed();
                    debug!(
                        "Periodic report #{} sent {} entries in {:?}",
                        flushed, outcome.entries, outcome.elapsed
                    );
                }
                Err(e) => warn!("Periodic report failed: {}", e),
            }
        }

        debug!("Reporter stopped after {} flushes", flushed);
        flushed
    }
}
