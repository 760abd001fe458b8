//! Sliding-window distribution used by histograms and timers.

use std::collections::VecDeque;

use serde::Serialize;

/// 默认窗口大小（最近 1028 个样本）
pub const DEFAULT_WINDOW_SIZE: usize = 1028;

/// Point-in-time summary of a distribution.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistogramSummary {
    /// Number of samples ever recorded
    pub count: u64,
    /// Sum of samples ever recorded
    pub sum: f64,
    pub last_value: f64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub median: f64,
    pub percentile_75: f64,
    pub percentile_95: f64,
    pub percentile_99: f64,
    /// Number of samples the quantiles were computed from
    pub sample_size: usize,
}

#[derive(Debug)]
pub(crate) struct HistogramState {
    window: VecDeque<f64>,
    capacity: usize,
    count: u64,
    sum: f64,
    last: f64,
}

impl HistogramState {
    pub(crate) fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
            count: 0,
            sum: 0.0,
            last: 0.0,
        }
    }

    pub(crate) fn update(&mut self, value: f64) {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(value);
        self.count += 1;
        self.sum += value;
        self.last = value;
    }

    pub(crate) fn count(&self) -> u64 {
        self.count
    }

    pub(crate) fn summary(&self) -> HistogramSummary {
        if self.window.is_empty() {
            return HistogramSummary::default();
        }

        let mut values: Vec<f64> = self.window.iter().copied().collect();
        values.sort_by(f64::total_cmp);

        let n = values.len();
        let mean = values.iter().sum::<f64>() / n as f64;
        let std_dev = if n > 1 {
            let variance =
                values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
            variance.sqrt()
        } else {
            0.0
        };

        HistogramSummary {
            count: self.count,
            sum: self.sum,
            last_value: self.last,
            min: values[0],
            max: values[n - 1],
            mean,
            std_dev,
            median: quantile(&values, 0.5),
            percentile_75: quantile(&values, 0.75),
            percentile_95: quantile(&values, 0.95),
            percentile_99: quantile(&values, 0.99),
            sample_size: n,
        }
    }
}

/// Interpolated quantile over sorted values.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    let pos = q * (n + 1) as f64;
    if pos < 1.0 {
        return sorted[0];
    }
    if pos >= n as f64 {
        return sorted[n - 1];
    }
    let lower = sorted[pos as usize - 1];
    let upper = sorted[pos as usize];
    lower + (pos - pos.floor()) * (upper - lower)
}
