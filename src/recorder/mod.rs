//! Recording loop
//!
//! Writes one round of synthetic values into the store every
//! `record_interval`, measuring each round from its own start so the body's
//! duration never accumulates as drift.

pub mod pacing;
pub mod sampler;

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::config::SamplerConfig;
use crate::errors::Result;
use crate::instruments::SampleInstruments;
use crate::progress::ProgressObserver;
use crate::runtime::cancel::{WaitOutcome, wait_or_cancel};
use crate::runtime::counters::RunCounters;
use crate::store::{Measure, TimerContext};

pub use pacing::{Pacing, next_pacing};
pub use sampler::{RoundSampler, RoundValues};

pub struct SampleRecorder {
    measure: Arc<dyn Measure>,
    instruments: SampleInstruments,
    every: Duration,
    sampler: RoundSampler,
    counters: Arc<RunCounters>,
    progress: Arc<dyn ProgressObserver>,
}

impl SampleRecorder {
    pub fn new(
        measure: Arc<dyn Measure>,
        instruments: SampleInstruments,
        config: &SamplerConfig,
        counters: Arc<RunCounters>,
        progress: Arc<dyn ProgressObserver>,
    ) -> Result<Self> {
        let sampler = RoundSampler::new(config.work_min_ms, config.work_max_ms)?;
        Ok(Self::with_sampler(
            measure,
            instruments,
            config.record_interval(),
            sampler,
            counters,
            progress,
        ))
    }

    /// Build with an explicit sampler (fixed seed or fixed work range).
    pub fn with_sampler(
        measure: Arc<dyn Measure>,
        instruments: SampleInstruments,
        every: Duration,
        sampler: RoundSampler,
        counters: Arc<RunCounters>,
        progress: Arc<dyn ProgressObserver>,
    ) -> Self {
        Self {
            measure,
            instruments,
            every,
            sampler,
            counters,
            progress,
        }
    }

    /// Run rounds until `cancel` fires; returns the number of completed rounds.
    pub async fn run(mut self, cancel: CancellationToken) -> u64 {
        debug!("Recorder started (interval: {:?})", self.every);
        let mut rounds = 0u64;

        while !cancel.is_cancelled() {
            let started = Instant::now();

            if self.round(&cancel).await.is_cancelled() {
                trace!("Recording round interrupted by cancellation");
                break;
            }

            rounds += 1;
            self.counters.record_completed();
            self.progress.on_recorded();

            match next_pacing(self.every, started.elapsed()) {
                Pacing::Wait(remaining) => {
                    if wait_or_cancel(remaining, &cancel).await.is_cancelled() {
                        trace!("Recorder wait cancelled");
                        break;
                    }
                }
                Pacing::Overrun { elapsed } => {
                    self.counters.overrun();
                    warn!(
                        "Recording round took {:?}, longer than the {:?} interval; starting the next round immediately",
                        elapsed, self.every
                    );
                }
            }
        }

        debug!("Recorder stopped after {} rounds", rounds);
        rounds
    }

    async fn round(&mut self, cancel: &CancellationToken) -> WaitOutcome {
        let values = self.sampler.draw();
        let ids = self.instruments;
        let measure = self.measure.as_ref();

        measure.increment_counter(ids.counter_one, 1);
        measure.increment_counter(ids.counter_two, values.counter_two);
        measure.set_gauge(ids.gauge_one, values.gauge);
        measure.update_histogram(ids.histogram_one, values.histogram);
        measure.mark_meter(ids.meter_one, values.meter_amount, Some(values.meter_item));

        // 被取消时 TimerContext 在 drop 中记录已耗时间
        let timer = TimerContext::start(measure, ids.timer_one);
        let outcome = wait_or_cancel(values.work, cancel).await;
        if !outcome.is_cancelled() {
            timer.stop();
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruments::{InstrumentId, InstrumentRegistry, METER_ITEMS};
    use crate::progress::CountingProgress;
    use parking_lot::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Counter(InstrumentId, i64),
        Gauge(InstrumentId, f64),
        Histogram(InstrumentId, f64),
        Meter(InstrumentId, u64, Option<String>),
        Timer(InstrumentId, Duration),
    }

    #[derive(Default)]
    struct RecordingMeasure {
        ops: Mutex<Vec<(Instant, Op)>>,
    }

    impl RecordingMeasure {
        fn push(&self, op: Op) {
            self.ops.lock().push((Instant::now(), op));
        }

        fn ops(&self) -> Vec<(Instant, Op)> {
            self.ops.lock().clone()
        }
    }

    impl Measure for RecordingMeasure {
        fn increment_counter(&self, id: InstrumentId, amount: i64) {
            self.push(Op::Counter(id, amount));
        }
        fn set_gauge(&self, id: InstrumentId, value: f64) {
            self.push(Op::Gauge(id, value));
        }
        fn update_histogram(&self, id: InstrumentId, value: f64) {
            self.push(Op::Histogram(id, value));
        }
        fn mark_meter(&self, id: InstrumentId, amount: u64, item: Option<&str>) {
            self.push(Op::Meter(id, amount, item.map(str::to_string)));
        }
        fn record_time(&self, id: InstrumentId, elapsed: Duration) {
            self.push(Op::Timer(id, elapsed));
        }
    }

    struct Harness {
        measure: Arc<RecordingMeasure>,
        ids: SampleInstruments,
        counters: Arc<RunCounters>,
        progress: Arc<CountingProgress>,
    }

    impl Harness {
        fn new() -> Self {
            let mut registry = InstrumentRegistry::new();
            let ids = SampleInstruments::register(&mut registry).unwrap();
            Self {
                measure: Arc::new(RecordingMeasure::default()),
                ids,
                counters: Arc::new(RunCounters::new()),
                progress: Arc::new(CountingProgress::default()),
            }
        }

        fn recorder(&self, every: Duration, work_min: u64, work_max: u64) -> SampleRecorder {
            SampleRecorder::with_sampler(
                self.measure.clone(),
                self.ids,
                every,
                RoundSampler::with_seed(99, work_min, work_max).unwrap(),
                self.counters.clone(),
                self.progress.clone(),
            )
        }

        /// Start instants of each round (the `counter_one` write).
        fn round_starts(&self) -> Vec<Instant> {
            self.measure
                .ops()
                .into_iter()
                .filter(|(_, op)| matches!(op, Op::Counter(id, 1) if *id == self.ids.counter_one))
                .map(|(at, _)| at)
                .collect()
        }
    }

    async fn run_for(recorder: SampleRecorder, duration: Duration) -> u64 {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(recorder.run(cancel.clone()));
        tokio::time::sleep(duration).await;
        cancel.cancel();
        handle.await.unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_round_writes_instruments_in_order() {
        let h = Harness::new();
        let rounds = run_for(h.recorder(Duration::from_secs(2), 0, 101), Duration::from_secs(21)).await;
        assert_eq!(rounds, 11);

        let ops = h.measure.ops();
        assert_eq!(ops.len(), 11 * 6);
        for chunk in ops.chunks(6) {
            let ids = h.ids;
            match &chunk[0].1 {
                Op::Counter(id, 1) => assert_eq!(*id, ids.counter_one),
                other => panic!("unexpected first op {:?}", other),
            }
            match &chunk[1].1 {
                Op::Counter(id, n) => {
                    assert_eq!(*id, ids.counter_two);
                    assert!((1..4).contains(n));
                }
                other => panic!("unexpected op {:?}", other),
            }
            match &chunk[2].1 {
                Op::Gauge(id, v) => {
                    assert_eq!(*id, ids.gauge_one);
                    assert!((0.0..201.0).contains(v));
                }
                other => panic!("unexpected op {:?}", other),
            }
            match &chunk[3].1 {
                Op::Histogram(id, v) => {
                    assert_eq!(*id, ids.histogram_one);
                    assert!((0.0..201.0).contains(v));
                }
                other => panic!("unexpected op {:?}", other),
            }
            match &chunk[4].1 {
                Op::Meter(id, amount, Some(item)) => {
                    assert_eq!(*id, ids.meter_one);
                    assert!(*amount < 6);
                    assert!(METER_ITEMS.contains(&item.as_str()));
                }
                other => panic!("unexpected op {:?}", other),
            }
            match &chunk[5].1 {
                Op::Timer(id, d) => {
                    assert_eq!(*id, ids.timer_one);
                    assert!(*d < Duration::from_millis(101));
                }
                other => panic!("unexpected op {:?}", other),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_rounds_start_one_interval_apart() {
        let h = Harness::new();
        run_for(h.recorder(Duration::from_secs(2), 0, 101), Duration::from_secs(30)).await;

        let starts = h.round_starts();
        assert!(starts.len() >= 15);
        for pair in starts.windows(2) {
            let gap = pair[1] - pair[0];
            assert!(gap >= Duration::from_secs(2), "gap {:?}", gap);
            assert!(gap < Duration::from_millis(2_005), "gap {:?}", gap);
        }
        assert_eq!(h.counters.overrun_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overrun_starts_next_round_immediately() {
        let h = Harness::new();
        // 每轮 50ms 工作，间隔只有 10ms
        let rounds = run_for(
            h.recorder(Duration::from_millis(10), 50, 51),
            Duration::from_millis(525),
        )
        .await;
        assert_eq!(rounds, 10);

        let starts = h.round_starts();
        for pair in starts.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::from_millis(50));
        }
        assert_eq!(h.counters.overrun_count(), rounds);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_work_does_not_count_round() {
        let h = Harness::new();
        let rounds = run_for(
            h.recorder(Duration::from_secs(2), 50, 51),
            Duration::from_millis(10),
        )
        .await;

        assert_eq!(rounds, 0);
        assert_eq!(h.counters.record_count(), 0);
        assert_eq!(h.progress.recorded(), 0);

        // 部分耗时仍然被 timer 记录
        let ops = h.measure.ops();
        assert_eq!(ops.len(), 6);
        assert_eq!(ops[5].1, Op::Timer(h.ids.timer_one, Duration::from_millis(10)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_wait_stops_promptly() {
        let h = Harness::new();
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(h.recorder(Duration::from_secs(2), 0, 101).run(cancel.clone()));

        tokio::time::sleep(Duration::from_millis(1_000)).await;
        let cancelled_at = Instant::now();
        cancel.cancel();
        let rounds = handle.await.unwrap();

        assert_eq!(rounds, 1);
        assert_eq!(Instant::now(), cancelled_at);
    }

    #[tokio::test(start_paused = true)]
    async fn test_counters_and_progress_match_rounds() {
        let h = Harness::new();
        let rounds = run_for(h.recorder(Duration::from_secs(2), 0, 101), Duration::from_secs(9)).await;

        assert_eq!(rounds, 5);
        assert_eq!(h.counters.record_count(), rounds);
        assert_eq!(h.progress.recorded(), rounds);
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_cancelled_runs_no_round() {
        let h = Harness::new();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let rounds = h.recorder(Duration::from_secs(2), 0, 101).run(cancel).await;
        assert_eq!(rounds, 0);
        assert!(h.measure.ops().is_empty());
    }
}
