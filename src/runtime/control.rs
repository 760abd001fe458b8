//! Control surface
//!
//! Owns the lifecycle `Idle → Running → ShuttingDown → Terminated`, starts the
//! background loops, turns operator triggers into actions and performs the
//! bounded shutdown.

use std::fmt;
use std::io::Write;
use std::time::Duration;

use strum::Display;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::context::SamplerContext;
use super::lifetime::shutdown::{TaskExit, join_with_deadline, summary_line};
use crate::errors::{Result, SamplerError};
use crate::recorder::SampleRecorder;
use crate::reporting::ReportOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ControlState {
    Idle,
    Running,
    ShuttingDown,
    Terminated,
}

/// Operator action decoded from the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorTrigger {
    PrintNow,
    ReportNow,
    Exit,
}

#[derive(Debug)]
pub enum DispatchOutcome {
    Printed { blocks: usize },
    PrintFailed(SamplerError),
    Reported(ReportOutcome),
    /// The on-demand report failed; background loops keep running
    ReportFailed(SamplerError),
    /// The caller should proceed to [`ControlSurface::shutdown`]
    ExitRequested,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub elapsed: Duration,
    pub record_count: u64,
    pub flush_count: u64,
    /// At least one task had to be aborted at the shutdown deadline
    pub timed_out: bool,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&summary_line(
            self.elapsed,
            self.record_count,
            self.flush_count,
        ))
    }
}

pub struct ControlSurface {
    context: SamplerContext,
    state: ControlState,
    cancel: CancellationToken,
    tasks: JoinSet<TaskExit>,
    started: Option<Instant>,
}

impl ControlSurface {
    pub fn new(context: SamplerContext) -> Self {
        Self {
            context,
            state: ControlState::Idle,
            cancel: CancellationToken::new(),
            tasks: JoinSet::new(),
            started: None,
        }
    }

    pub fn state(&self) -> ControlState {
        self.state
    }

    pub fn context(&self) -> &SamplerContext {
        &self.context
    }

    fn expect_state(&self, expected: ControlState, action: &str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SamplerError::invalid_state(format!(
                "Cannot {} while {} (expected {})",
                action, self.state, expected
            )))
        }
    }

    /// Spawn the recorder and reporter loops. Must be called inside a tokio runtime.
    pub fn start(&mut self) -> Result<()> {
        self.expect_state(ControlState::Idle, "start")?;

        let ctx = &self.context;
        let recorder = SampleRecorder::new(
            ctx.store.clone(),
            ctx.instruments,
            &ctx.sampler,
            ctx.counters.clone(),
            ctx.progress.clone(),
        )?;

        let cancel = self.cancel.clone();
        self.tasks.spawn(async move {
            TaskExit::Recorder {
                rounds: recorder.run(cancel).await,
            }
        });

        let reporter = ctx.reporter.clone();
        let every = ctx.sampler.report_interval();
        let cancel = self.cancel.clone();
        let counters = ctx.counters.clone();
        let progress = ctx.progress.clone();
        self.tasks.spawn(async move {
            TaskExit::Reporter {
                flushes: reporter
                    .run_periodic(every, cancel, counters, progress)
                    .await,
            }
        });

        self.started = Some(Instant::now());
        self.state = ControlState::Running;
        info!(
            "Sampler running: recording every {:?}, reporting every {:?}",
            ctx.sampler.record_interval(),
            every
        );
        Ok(())
    }

    /// Handle one operator trigger, printing to stdout.
    pub async fn dispatch(&self, trigger: OperatorTrigger) -> Result<DispatchOutcome> {
        let mut out = std::io::stdout();
        self.dispatch_to(trigger, &mut out).await
    }

    /// Handle one operator trigger, printing to `out`.
    ///
    /// Failures of the requested action are returned as an outcome, never as
    /// an error; the error path is reserved for calls in the wrong state.
    pub async fn dispatch_to(
        &self,
        trigger: OperatorTrigger,
        out: &mut dyn Write,
    ) -> Result<DispatchOutcome> {
        self.expect_state(ControlState::Running, "dispatch an operator trigger")?;
        debug!("Dispatching {:?}", trigger);

        let outcome = match trigger {
            OperatorTrigger::PrintNow => match self.context.printer.print_to(out) {
                Ok(blocks) => DispatchOutcome::Printed { blocks },
                Err(e) => {
                    warn!("Printing the snapshot failed: {}", e);
                    DispatchOutcome::PrintFailed(e)
                }
            },
            OperatorTrigger::ReportNow => match self.context.reporter.report_now().await {
                Ok(outcome) => DispatchOutcome::Reported(outcome),
                Err(e) => {
                    warn!("On-demand report failed: {}", e);
                    DispatchOutcome::ReportFailed(e)
                }
            },
            OperatorTrigger::Exit => DispatchOutcome::ExitRequested,
        };
        Ok(outcome)
    }

    /// Cancel the loops and join them within `shutdown_timeout`.
    ///
    /// Not re-entrant: only a running surface can be shut down, once.
    pub async fn shutdown(&mut self) -> Result<RunSummary> {
        self.expect_state(ControlState::Running, "shut down")?;
        self.state = ControlState::ShuttingDown;
        info!("Shutting down background tasks...");

        self.cancel.cancel();
        let deadline = self.context.sampler.shutdown_timeout();
        let timed_out = join_with_deadline(&mut self.tasks, deadline).await;

        self.state = ControlState::Terminated;
        let summary = RunSummary {
            elapsed: self.started.map(|s| s.elapsed()).unwrap_or_default(),
            record_count: self.context.counters.record_count(),
            flush_count: self.context.counters.flush_count(),
            timed_out,
        };
        info!("{}", summary);
        Ok(summary)
    }
}

impl Drop for ControlSurface {
    fn drop(&mut self) {
        // 未正常关闭时也要停止后台循环
        if !self.cancel.is_cancelled() {
            self.cancel.cancel();
        }
    }
}
