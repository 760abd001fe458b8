//! Runtime: startup, the control surface, cancellation and shutdown.

pub mod cancel;
pub mod context;
pub mod control;
pub mod counters;
pub mod lifetime;

pub use cancel::{WaitOutcome, wait_or_cancel};
pub use context::SamplerContext;
pub use control::{ControlState, ControlSurface, DispatchOutcome, OperatorTrigger, RunSummary};
pub use counters::RunCounters;
