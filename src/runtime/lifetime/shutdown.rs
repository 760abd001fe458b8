use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// What a background task reports when it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskExit {
    Recorder { rounds: u64 },
    Reporter { flushes: u64 },
}

/// Join every task, waiting at most `deadline`.
///
/// Tasks still running at the deadline are aborted. Returns `true` when the
/// deadline was hit.
pub async fn join_with_deadline(tasks: &mut JoinSet<TaskExit>, deadline: Duration) -> bool {
    let joined = timeout(deadline, async {
        while let Some(result) = tasks.join_next().await {
            match result {
                Ok(TaskExit::Recorder { rounds }) => {
                    debug!("Recorder task joined after {} rounds", rounds)
                }
                Ok(TaskExit::Reporter { flushes }) => {
                    debug!("Reporter task joined after {} flushes", flushes)
                }
                Err(e) if e.is_panic() => error!("Background task panicked: {}", e),
                Err(e) => warn!("Background task ended abnormally: {}", e),
            }
        }
    })
    .await;

    match joined {
        Ok(()) => {
            info!("All background tasks stopped");
            false
        }
        Err(_) => {
            warn!(
                "{} background task(s) still running after {:?}, aborting",
                tasks.len(),
                deadline
            );
            tasks.abort_all();
            true
        }
    }
}

/// `HH:MM:SS.mmm`
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_ms = elapsed.as_millis();
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms / 60_000) % 60;
    let seconds = (total_ms / 1_000) % 60;
    let millis = total_ms % 1_000;
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}

pub fn summary_line(elapsed: Duration, record_count: u64, flush_count: u64) -> String {
    format!(
        "In {} the metrics have been recorded {} times and the telemetry sink flushed {} times.",
        format_elapsed(elapsed),
        record_count,
        flush_count
    )
}
