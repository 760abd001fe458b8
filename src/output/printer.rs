use std::io::Write;
use std::sync::Arc;

use tracing::debug;

use super::formatter::{MetricsFormatter, write_failed};
use super::json::JsonFormatter;
use super::text::TextFormatter;
use crate::config::FormatterKind;
use crate::errors::Result;
use crate::store::{MetricsSnapshot, MetricsStore};

/// Prints fresh snapshots through every configured formatter, in order.
///
/// Read-only with respect to the store and the run counters.
pub struct SnapshotPrinter {
    store: Arc<MetricsStore>,
    formatters: Vec<Box<dyn MetricsFormatter>>,
}

impl SnapshotPrinter {
    pub fn new(store: Arc<MetricsStore>, formatters: Vec<Box<dyn MetricsFormatter>>) -> Self {
        Self { store, formatters }
    }

    pub fn from_kinds(store: Arc<MetricsStore>, kinds: &[FormatterKind]) -> Self {
        let formatters = kinds
            .iter()
            .map(|kind| -> Box<dyn MetricsFormatter> {
                match kind {
                    FormatterKind::Text => Box::new(TextFormatter),
                    FormatterKind::Json => Box::new(JsonFormatter),
                }
            })
            .collect();
        Self::new(store, formatters)
    }

    pub fn formatter_names(&self) -> Vec<&str> {
        self.formatters.iter().map(|f| f.name()).collect()
    }

    /// Snapshot the store now and print it; returns the number of blocks written.
    pub fn print_to(&self, out: &mut dyn Write) -> Result<usize> {
        let snapshot = self.store.snapshot();
        self.print_snapshot(&snapshot, out)
    }

    pub fn print_snapshot(&self, snapshot: &MetricsSnapshot, out: &mut dyn Write) -> Result<usize> {
        for formatter in &self.formatters {
            formatter.write(snapshot, out)?;
            writeln!(out).map_err(write_failed)?;
        }
        out.flush().map_err(write_failed)?;
        debug!(
            "Printed snapshot with {} entries through {:?}",
            snapshot.len(),
            self.formatter_names()
        );
        Ok(self.formatters.len())
    }

    pub fn print_stdout(&self) -> Result<usize> {
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        self.print_to(&mut lock)
    }
}
