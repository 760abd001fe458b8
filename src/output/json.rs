use std::io::Write;

use super::formatter::{MetricsFormatter, write_failed};
use crate::errors::Result;
use crate::store::MetricsSnapshot;

/// Pretty-printed JSON of the whole snapshot.
pub struct JsonFormatter;

impl MetricsFormatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn write(&self, snapshot: &MetricsSnapshot, out: &mut dyn Write) -> Result<()> {
        serde_json::to_writer_pretty(&mut *out, snapshot)?;
        writeln!(out).map_err(write_failed)
    }
}
