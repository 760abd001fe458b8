//! End-to-end tests for the sampler lifecycle
//!
//! Paused tokio time keeps cadence assertions exact.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use metrics_sampler::config::{ExportTargetKind, StaticConfig};
use metrics_sampler::interfaces::console::{LineKeys, run_input_loop};
use metrics_sampler::progress::{CountingProgress, NoopProgress};
use metrics_sampler::reporting::{ExportTarget, ReportRunner};
use metrics_sampler::runtime::lifetime::startup::prepare_startup;
use metrics_sampler::runtime::{ControlState, ControlSurface, DispatchOutcome, OperatorTrigger};
use metrics_sampler::store::MetricsSnapshot;
use tokio::time::Instant;

const KEY: &str = "9a6b1c2d-3e4f-4a5b-8c7d-0e1f2a3b4c5d";

fn base_config() -> StaticConfig {
    let mut config = StaticConfig::default();
    config.reporting.instrumentation_key = KEY.to_string();
    config.reporting.targets = vec![ExportTargetKind::Log];
    config
}

/// Target that can be told to fail or to hang.
struct ScriptedTarget {
    fail: bool,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedTarget {
    fn new(fail: bool, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            fail,
            delay,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait::async_trait]
impl ExportTarget for ScriptedTarget {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn export(&self, _snapshot: Arc<MetricsSnapshot>) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        if self.fail {
            anyhow::bail!("telemetry endpoint rejected the batch");
        }
        Ok(())
    }
}

fn surface_with_target(config: &StaticConfig, target: Arc<ScriptedTarget>) -> ControlSurface {
    let mut ctx = prepare_startup(config, NoopProgress::arc()).unwrap();
    ctx.reporter = ReportRunner::new(
        ctx.store.clone(),
        vec![target as Arc<dyn ExportTarget>],
        Duration::from_secs(config.reporting.timeout_secs),
    );
    ControlSurface::new(ctx)
}

#[tokio::test(start_paused = true)]
async fn test_periodic_flushes_and_rounds_over_two_minutes() {
    let progress = Arc::new(CountingProgress::default());
    let ctx = prepare_startup(&base_config(), progress.clone()).unwrap();
    let mut surface = ControlSurface::new(ctx);
    surface.start().unwrap();

    tokio::time::sleep(Duration::from_secs(125)).await;
    let summary = surface.shutdown().await.unwrap();

    // rounds at 0, 2, ..., 124
    assert_eq!(summary.record_count, 63);
    assert_eq!(summary.flush_count, 2);
    assert_eq!(progress.recorded(), 63);
    assert_eq!(progress.flushed(), 2);
    assert!(!summary.timed_out);
}

#[tokio::test(start_paused = true)]
async fn test_failed_on_demand_report_keeps_loops_running() {
    let target = ScriptedTarget::new(true, Duration::ZERO);
    let mut surface = surface_with_target(&base_config(), target.clone());
    surface.start().unwrap();

    tokio::time::sleep(Duration::from_secs(3)).await;
    let outcome = surface
        .dispatch_to(OperatorTrigger::ReportNow, &mut Vec::<u8>::new())
        .await
        .unwrap();
    match outcome {
        DispatchOutcome::ReportFailed(e) => {
            assert!(e.message().contains("telemetry endpoint rejected the batch"))
        }
        other => panic!("expected ReportFailed, got {:?}", other),
    }
    assert_eq!(surface.state(), ControlState::Running);

    let recorded = surface.context().counters.record_count();
    tokio::time::sleep(Duration::from_secs(4)).await;
    assert!(surface.context().counters.record_count() > recorded);

    let summary = surface.shutdown().await.unwrap();
    assert_eq!(summary.flush_count, 0);
    assert_eq!(target.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_hung_export_is_aborted_at_shutdown_deadline() {
    let mut config = base_config();
    config.sampler.report_interval_ms = 1_000;
    config.reporting.timeout_secs = 3_600;
    let target = ScriptedTarget::new(false, Duration::from_secs(600));
    let mut surface = surface_with_target(&config, target.clone());
    surface.start().unwrap();

    // 周期上报在 1s 时开始，并卡在导出中
    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert_eq!(target.calls.load(Ordering::SeqCst), 1);

    let begun = Instant::now();
    let summary = surface.shutdown().await.unwrap();
    assert!(summary.timed_out);
    assert_eq!(begun.elapsed(), Duration::from_secs(5));
    assert_eq!(summary.flush_count, 0);
    assert_eq!(surface.state(), ControlState::Terminated);
}

#[tokio::test(start_paused = true)]
async fn test_on_demand_passes_overlap_with_periodic_pass() {
    let mut config = base_config();
    config.sampler.report_interval_ms = 1_000;
    let target = ScriptedTarget::new(false, Duration::from_secs(2));
    let mut surface = surface_with_target(&config, target.clone());
    surface.start().unwrap();

    // 周期上报 1s 开始、3s 结束；按需上报 1.5s 开始
    tokio::time::sleep(Duration::from_millis(1_500)).await;
    let begun = Instant::now();
    let outcome = surface
        .dispatch_to(OperatorTrigger::ReportNow, &mut Vec::<u8>::new())
        .await
        .unwrap();
    assert!(matches!(outcome, DispatchOutcome::Reported(_)));
    assert_eq!(begun.elapsed(), Duration::from_secs(2));
    assert_eq!(target.calls.load(Ordering::SeqCst), 2);

    surface.shutdown().await.unwrap();
}

#[test]
fn test_invalid_key_prevents_startup() {
    let mut config = base_config();
    config.reporting.instrumentation_key = String::new();
    let err = prepare_startup(&config, NoopProgress::arc()).err().unwrap();
    assert!(err.is_fatal());
    assert!(err.message().contains("instrumentation key"));
}

#[test]
fn test_input_loop_drives_surface_until_exit() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap();

    let mut config = base_config();
    config.sampler.record_interval_ms = 20;
    config.sampler.work_max_ms = 5;
    let ctx = prepare_startup(&config, NoopProgress::arc()).unwrap();
    let mut surface = ControlSurface::new(ctx);
    {
        let _enter = runtime.enter();
        surface.start().unwrap();
    }
    std::thread::sleep(Duration::from_millis(100));

    // 未知按键被忽略；输入结束视为 Esc
    let mut keys = LineKeys::new("x\np\nr\n".as_bytes());
    let mut out = Vec::<u8>::new();
    run_input_loop(&surface, runtime.handle(), &mut keys, &mut out).unwrap();
    assert_eq!(surface.state(), ControlState::Running);

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("[counter] counter_one"));
    assert!(printed.contains("\"entries\""));
    assert!(printed.contains("Reported 6 metrics to 1 target(s)."));

    let summary = runtime.block_on(surface.shutdown()).unwrap();
    assert!(summary.record_count >= 1);
    assert_eq!(summary.flush_count, 0);
}
