//! 指标注册表
//!
//! Descriptors are registered once at startup and addressed afterwards by a
//! `Copy` handle, so the store never hashes names on the hot path.

use super::descriptor::{InstrumentDescriptor, InstrumentKind, MetricTags};
use crate::errors::{Result, SamplerError};

/// Index of a descriptor inside its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstrumentId(usize);

impl InstrumentId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct InstrumentRegistry {
    descriptors: Vec<InstrumentDescriptor>,
}

impl InstrumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor; a second instrument with the same kind and name is rejected.
    pub fn register(&mut self, descriptor: InstrumentDescriptor) -> Result<InstrumentId> {
        if descriptor.name.trim().is_empty() {
            return Err(SamplerError::validation("Instrument name must not be empty"));
        }
        if self
            .descriptors
            .iter()
            .any(|d| d.kind == descriptor.kind && d.name == descriptor.name)
        {
            return Err(SamplerError::validation(format!(
                "{} '{}' is already registered",
                descriptor.kind, descriptor.name
            )));
        }
        self.descriptors.push(descriptor);
        Ok(InstrumentId(self.descriptors.len() - 1))
    }

    pub fn get(&self, id: InstrumentId) -> Option<&InstrumentDescriptor> {
        self.descriptors.get(id.0)
    }

    pub fn find(&self, kind: InstrumentKind, name: &str) -> Option<InstrumentId> {
        self.descriptors
            .iter()
            .position(|d| d.kind == kind && d.name == name)
            .map(InstrumentId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (InstrumentId, &InstrumentDescriptor)> {
        self.descriptors
            .iter()
            .enumerate()
            .map(|(i, d)| (InstrumentId(i), d))
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// Dimension labels a `meter_one` mark is tagged with.
pub const METER_ITEMS: [&str; 2] = ["failures", "errors"];

/// The fixed instrument set written by the recorder.
#[derive(Debug, Clone, Copy)]
pub struct SampleInstruments {
    pub counter_one: InstrumentId,
    pub counter_two: InstrumentId,
    pub gauge_one: InstrumentId,
    pub histogram_one: InstrumentId,
    pub meter_one: InstrumentId,
    pub timer_one: InstrumentId,
}

impl SampleInstruments {
    pub fn register(registry: &mut InstrumentRegistry) -> Result<Self> {
        let gauge_tags = MetricTags::from_keys_values(&["prop1", "prop2"], &["alpha", "beta"])?;

        Ok(Self {
            counter_one: registry.register(InstrumentDescriptor::counter("counter_one"))?,
            counter_two: registry.register(InstrumentDescriptor::counter("counter_two"))?,
            gauge_one: registry
                .register(InstrumentDescriptor::gauge("gauge_one").with_tags(gauge_tags))?,
            histogram_one: registry.register(InstrumentDescriptor::histogram("histogram_one"))?,
            meter_one: registry.register(InstrumentDescriptor::meter("meter_one"))?,
            timer_one: registry.register(InstrumentDescriptor::timer("timer_one"))?,
        })
    }
}
