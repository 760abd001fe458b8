//! Instrument registry: identity and metadata of every named metric.

mod descriptor;
mod registry;

pub use descriptor::{InstrumentDescriptor, InstrumentKind, MetricTags};
pub use registry::{InstrumentId, InstrumentRegistry, METER_ITEMS, SampleInstruments};
