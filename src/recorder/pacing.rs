//! Drift correction between recording rounds.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Suspend for the remainder of the interval
    Wait(Duration),
    /// The round body used the whole interval; start the next one now
    Overrun { elapsed: Duration },
}

/// Decide how long to wait after a round that took `elapsed` out of `every`.
///
/// The wait is measured from the round's own start, so the body's duration is
/// never added on top of the interval.
pub fn next_pacing(every: Duration, elapsed: Duration) -> Pacing {
    match every.checked_sub(elapsed) {
        Some(remaining) if !remaining.is_zero() => Pacing::Wait(remaining),
        _ => Pacing::Overrun { elapsed },
    }
}
