//! Immutable point-in-time copy of every instrument.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::histogram::HistogramSummary;
use super::meter::MeterSummary;
use super::timer::TimerSummary;
use crate::instruments::{InstrumentKind, MetricTags};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricValue {
    Counter { count: i64 },
    Gauge { value: f64 },
    Histogram(HistogramSummary),
    Meter(MeterSummary),
    Timer(TimerSummary),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricEntry {
    pub name: String,
    pub kind: InstrumentKind,
    /// Instrument tags followed by the global tags
    pub tags: MetricTags,
    pub value: MetricValue,
}

/// Snapshot consumed by export targets and formatters; never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub context: String,
    pub entries: Vec<MetricEntry>,
}

impl MetricsSnapshot {
    pub fn find(&self, kind: InstrumentKind, name: &str) -> Option<&MetricEntry> {
        self.entries
            .iter()
            .find(|e| e.kind == kind && e.name == name)
    }

    pub fn counter(&self, name: &str) -> Option<i64> {
        match self.find(InstrumentKind::Counter, name)?.value {
            MetricValue::Counter { count } => Some(count),
            _ => None,
        }
    }

    pub fn gauge(&self, name: &str) -> Option<f64> {
        match self.find(InstrumentKind::Gauge, name)?.value {
            MetricValue::Gauge { value } => Some(value),
            _ => None,
        }
    }

    pub fn histogram(&self, name: &str) -> Option<&HistogramSummary> {
        match &self.find(InstrumentKind::Histogram, name)?.value {
            MetricValue::Histogram(s) => Some(s),
            _ => None,
        }
    }

    pub fn meter(&self, name: &str) -> Option<&MeterSummary> {
        match &self.find(InstrumentKind::Meter, name)?.value {
            MetricValue::Meter(s) => Some(s),
            _ => None,
        }
    }

    pub fn timer(&self, name: &str) -> Option<&TimerSummary> {
        match &self.find(InstrumentKind::Timer, name)?.value {
            MetricValue::Timer(s) => Some(s),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
