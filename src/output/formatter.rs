use std::io::Write;

use crate::errors::{Result, SamplerError};
use crate::store::MetricsSnapshot;

/// Renders a snapshot into a human- or machine-readable block.
pub trait MetricsFormatter: Send + Sync {
    fn name(&self) -> &str;

    fn write(&self, snapshot: &MetricsSnapshot, out: &mut dyn Write) -> Result<()>;
}

pub(crate) fn write_failed(err: std::io::Error) -> SamplerError {
    SamplerError::format(format!("Failed to write metrics output: {}", err))
}
