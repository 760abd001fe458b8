use std::sync::Arc;

use tracing::info;

use crate::store::MetricsSnapshot;

/// 指标导出目标
///
/// A target receives the same shared snapshot as every other target in the
/// pass and must not assume exclusive access to it.
#[async_trait::async_trait]
pub trait ExportTarget: Send + Sync {
    /// Name used in logs and failure reports
    fn name(&self) -> &str;

    async fn export(&self, snapshot: Arc<MetricsSnapshot>) -> anyhow::Result<()>;
}

/// Writes each entry to the tracing log under the `metrics` target.
pub struct LogTarget;

#[async_trait::async_trait]
impl ExportTarget for LogTarget {
    fn name(&self) -> &str {
        "log"
    }

    async fn export(&self, snapshot: Arc<MetricsSnapshot>) -> anyhow::Result<()> {
        info!(
            target: "metrics",
            "Snapshot [{}] at {}: {} entries",
            snapshot.context,
            snapshot.timestamp.to_rfc3339(),
            snapshot.len()
        );
        for entry in &snapshot.entries {
            info!(
                target: "metrics",
                "  {} {} [{}] {}",
                entry.kind,
                entry.name,
                entry.tags,
                serde_json::to_string(&entry.value)?
            );
        }
        Ok(())
    }
}
