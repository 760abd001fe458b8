//! Instrument identity: kind, name and tags.

use serde::ser::{Serialize, SerializeMap, Serializer};
use strum::{AsRefStr, Display, EnumIter};

use crate::errors::{Result, SamplerError};

/// The five instrument kinds tracked by the store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, EnumIter, AsRefStr, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InstrumentKind {
    Counter,
    Gauge,
    Histogram,
    Meter,
    Timer,
}

/// Ordered list of `(key, value)` tag pairs.
///
/// Order is preserved as given; serializes as a JSON object in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricTags(Vec<(String, String)>);

impl MetricTags {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build tags from parallel key and value arrays.
    pub fn from_keys_values(keys: &[&str], values: &[&str]) -> Result<Self> {
        if keys.len() != values.len() {
            return Err(SamplerError::validation(format!(
                "Tag keys ({}) and values ({}) must have the same length",
                keys.len(),
                values.len()
            )));
        }
        if keys.iter().any(|k| k.trim().is_empty()) {
            return Err(SamplerError::validation("Tag keys must not be empty"));
        }
        Ok(Self::from_pairs(keys.iter().copied().zip(values.iter().copied())))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append `other`'s pairs whose keys are not already present.
    #[must_use]
    pub fn merged(&self, other: &MetricTags) -> MetricTags {
        let mut pairs = self.0.clone();
        for (k, v) in &other.0 {
            if !pairs.iter().any(|(existing, _)| existing == k) {
                pairs.push((k.clone(), v.clone()));
            }
        }
        MetricTags(pairs)
    }
}

impl Serialize for MetricTags {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl std::fmt::Display for MetricTags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered: Vec<String> = self.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        write!(f, "{}", rendered.join(","))
    }
}

/// Immutable identity record of one instrument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentDescriptor {
    pub kind: InstrumentKind,
    pub name: String,
    pub tags: MetricTags,
}

impl InstrumentDescriptor {
    pub fn new(kind: InstrumentKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            tags: MetricTags::empty(),
        }
    }

    pub fn counter(name: impl Into<String>) -> Self {
        Self::new(InstrumentKind::Counter, name)
    }

    pub fn gauge(name: impl Into<String>) -> Self {
        Self::new(InstrumentKind::Gauge, name)
    }

    pub fn histogram(name: impl Into<String>) -> Self {
        Self::new(InstrumentKind::Histogram, name)
    }

    pub fn meter(name: impl Into<String>) -> Self {
        Self::new(InstrumentKind::Meter, name)
    }

    pub fn timer(name: impl Into<String>) -> Self {
        Self::new(InstrumentKind::Timer, name)
    }

    #[must_use]
    pub fn with_tags(mut self, tags: MetricTags) -> Self {
        self.tags = tags;
        self
    }
}
