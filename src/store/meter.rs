use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeterItem {
    pub item: String,
    pub count: u64,
    /// Share of the meter's total count, in percent
    pub percent: f64,
}

/// Point-in-time summary of a meter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MeterSummary {
    pub count: u64,
    /// Events per second since the store was created
    pub mean_rate: f64,
    pub items: Vec<MeterItem>,
}

impl MeterSummary {
    pub fn item(&self, item: &str) -> Option<&MeterItem> {
        self.items.iter().find(|i| i.item == item)
    }
}

#[derive(Debug, Default)]
pub(crate) struct MeterState {
    count: u64,
    items: BTreeMap<String, u64>,
}

impl MeterState {
    pub(crate) fn mark(&mut self, amount: u64, item: Option<&str>) {
        self.count += amount;
        if let Some(item) = item {
            *self.items.entry(item.to_string()).or_insert(0) += amount;
        }
    }

    pub(crate) fn summary(&self, elapsed: Duration) -> MeterSummary {
        let items = self
            .items
            .iter()
            .map(|(item, &count)| MeterItem {
                item: item.clone(),
                count,
                percent: if self.count == 0 {
                    0.0
                } else {
                    count as f64 / self.count as f64 * 100.0
                },
            })
            .collect();

        MeterSummary {
            count: self.count,
            mean_rate: rate(self.count, elapsed),
            items,
        }
    }
}

pub(crate) fn rate(count: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 { 0.0 } else { count as f64 / secs }
}
