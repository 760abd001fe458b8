use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

use super::Measure;
use super::histogram::HistogramSummary;
use crate::instruments::InstrumentId;

/// Point-in-time summary of a timer; durations are in milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimerSummary {
    pub calls: u64,
    /// Calls per second since the store was created
    pub mean_rate: f64,
    pub duration_ms: HistogramSummary,
}

/// Times a unit of work and records it into a timer when stopped or dropped.
///
/// Dropping without `stop` still records, so work cut short by cancellation
/// shows up with its partial duration.
pub struct TimerContext<'a> {
    measure: &'a dyn Measure,
    id: InstrumentId,
    started: Instant,
    recorded: bool,
}

impl<'a> TimerContext<'a> {
    pub fn start(measure: &'a dyn Measure, id: InstrumentId) -> Self {
        Self {
            measure,
            id,
            started: Instant::now(),
            recorded: false,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Record the elapsed time now and return it.
    pub fn stop(mut self) -> Duration {
        let elapsed = self.started.elapsed();
        self.measure.record_time(self.id, elapsed);
        self.recorded = true;
        elapsed
    }
}

impl Drop for TimerContext<'_> {
    fn drop(&mut self) {
        if !self.recorded {
            self.measure.record_time(self.id, self.started.elapsed());
        }
    }
}
