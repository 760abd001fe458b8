use std::io::Write;

use super::formatter::{MetricsFormatter, write_failed};
use crate::errors::Result;
use crate::store::{HistogramSummary, MetricValue, MetricsSnapshot};

const RULE: &str = "----------------------------------------------------------------";

/// 纯文本格式：每个指标一段，字段右对齐
pub struct TextFormatter;

impl TextFormatter {
    fn render(snapshot: &MetricsSnapshot, out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(
            out,
            "# CONTEXT: {}  TIMESTAMP: {}",
            snapshot.context,
            snapshot.timestamp.to_rfc3339()
        )?;
        writeln!(out, "{}", RULE)?;

        for entry in &snapshot.entries {
            if entry.tags.is_empty() {
                writeln!(out, "[{}] {}", entry.kind, entry.name)?;
            } else {
                writeln!(out, "[{}] {} {{{}}}", entry.kind, entry.name, entry.tags)?;
            }

            match &entry.value {
                MetricValue::Counter { count } => field(out, "count", count)?,
                MetricValue::Gauge { value } => field(out, "value", format!("{:.2}", value))?,
                MetricValue::Histogram(h) => distribution(out, h)?,
                MetricValue::Meter(m) => {
                    field(out, "count", m.count)?;
                    field(out, "mean rate", format!("{:.2}/s", m.mean_rate))?;
                    for item in &m.items {
                        field(
                            out,
                            &format!("item {}", item.item),
                            format!("{} ({:.2}%)", item.count, item.percent),
                        )?;
                    }
                }
                MetricValue::Timer(t) => {
                    field(out, "calls", t.calls)?;
                    field(out, "mean rate", format!("{:.2}/s", t.mean_rate))?;
                    distribution(out, &t.duration_ms)?;
                }
            }
            writeln!(out, "{}", RULE)?;
        }
        Ok(())
    }
}

fn field(out: &mut dyn Write, name: &str, value: impl std::fmt::Display) -> std::io::Result<()> {
    writeln!(out, "{:>20} = {}", name, value)
}

fn distribution(out: &mut dyn Write, h: &HistogramSummary) -> std::io::Result<()> {
    field(out, "count", h.count)?;
    if h.sample_size == 0 {
        return Ok(());
    }
    field(out, "last", format!("{:.2}", h.last_value))?;
    field(out, "min", format!("{:.2}", h.min))?;
    field(out, "max", format!("{:.2}", h.max))?;
    field(out, "mean", format!("{:.2}", h.mean))?;
    field(out, "stddev", format!("{:.2}", h.std_dev))?;
    field(out, "median", format!("{:.2}", h.median))?;
    field(out, "p75", format!("{:.2}", h.percentile_75))?;
    field(out, "p95", format!("{:.2}", h.percentile_95))?;
    field(out, "p99", format!("{:.2}", h.percentile_99))
}

impl MetricsFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn write(&self, snapshot: &MetricsSnapshot, out: &mut dyn Write) -> Result<()> {
        Self::render(snapshot, out).map_err(write_failed)
    }
}
