//! metrics-sampler - a small metrics sampling daemon
//!
//! Records a fixed set of synthetic instruments on a steady cadence, reports
//! snapshots to telemetry sinks periodically and on demand, and lets an
//! operator print or flush metrics from the console.
//!
//! # Features
//! - **console**: raw-mode key input via crossterm (default)
//!
//! # Architecture
//! - `instruments`: instrument descriptors and the registry
//! - `store`: thread-safe metric accumulators and snapshots
//! - `recorder`: the self-correcting recording loop
//! - `reporting`: export targets and the report runner
//! - `output`: console formatters and the snapshot printer
//! - `runtime`: startup, control surface, cancellation and shutdown
//! - `interfaces`: console operator input
//! - `config`: configuration loading and validation
//! - `system`: logging and panic handling

pub mod cli;
pub mod config;
pub mod errors;
pub mod instruments;
pub mod interfaces;
pub mod output;
pub mod progress;
pub mod recorder;
pub mod reporting;
pub mod runtime;
pub mod store;
pub mod system;
