//! Application Insights 导出目标
//!
//! 每个指标值生成一个 `MetricData` envelope，整批以 JSON 数组 POST 到 track 端点。
//! ureq 是同步客户端，请求放在 spawn_blocking 中执行。

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use serde::Serialize;
use tracing::{debug, trace};
use ureq::Agent;
use uuid::Uuid;

use super::target::ExportTarget;
use crate::store::{HistogramSummary, MetricEntry, MetricValue, MetricsSnapshot};

const SDK_VERSION: &str = concat!("metrics-sampler:", env!("CARGO_PKG_VERSION"));

/// DataPoint kind: single measurement
const KIND_MEASUREMENT: u8 = 0;
/// DataPoint kind: pre-aggregated value with count/min/max/stdDev
const KIND_AGGREGATION: u8 = 1;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub name: String,
    pub time: String,
    #[serde(rename = "iKey")]
    pub ikey: String,
    pub tags: BTreeMap<String, String>,
    pub data: EnvelopeData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeData {
    pub base_type: String,
    pub base_data: MetricData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricData {
    pub ver: u8,
    pub metrics: Vec<DataPoint>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPoint {
    pub name: String,
    pub kind: u8,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std_dev: Option<f64>,
}

impl DataPoint {
    fn measurement(name: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            kind: KIND_MEASUREMENT,
            value,
            count: None,
            min: None,
            max: None,
            std_dev: None,
        }
    }

    fn aggregation(name: &str, summary: &HistogramSummary) -> Self {
        Self {
            name: name.to_string(),
            kind: KIND_AGGREGATION,
            value: summary.sum,
            count: Some(summary.count),
            min: Some(summary.min),
            max: Some(summary.max),
            std_dev: Some(summary.std_dev),
        }
    }
}

/// Build the envelopes for one snapshot.
///
/// Meters produce one envelope for the total plus one per item, the item name
/// carried in the `item` property.
pub fn build_envelopes(snapshot: &MetricsSnapshot, ikey: &Uuid) -> Vec<Envelope> {
    let name = format!("Microsoft.ApplicationInsights.{}.Metric", ikey.simple());
    let time = snapshot.timestamp.to_rfc3339();

    let mut tags = BTreeMap::new();
    tags.insert("ai.cloud.role".to_string(), snapshot.context.clone());
    tags.insert("ai.internal.sdkVersion".to_string(), SDK_VERSION.to_string());

    let envelope = |point: DataPoint, properties: BTreeMap<String, String>| Envelope {
        name: name.clone(),
        time: time.clone(),
        ikey: ikey.to_string(),
        tags: tags.clone(),
        data: EnvelopeData {
            base_type: "MetricData".to_string(),
            base_data: MetricData {
                ver: 2,
                metrics: vec![point],
                properties,
            },
        },
    };

    let mut envelopes = Vec::with_capacity(snapshot.len());
    for entry in &snapshot.entries {
        let properties = entry_properties(entry);
        match &entry.value {
            MetricValue::Counter { count } => {
                envelopes.push(envelope(
                    DataPoint::measurement(&entry.name, *count as f64),
                    properties,
                ));
            }
            MetricValue::Gauge { value } => {
                envelopes.push(envelope(
                    DataPoint::measurement(&entry.name, *value),
                    properties,
                ));
            }
            MetricValue::Histogram(summary) => {
                envelopes.push(envelope(
                    DataPoint::aggregation(&entry.name, summary),
                    properties,
                ));
            }
            MetricValue::Meter(meter) => {
                envelopes.push(envelope(
                    DataPoint::measurement(&entry.name, meter.count as f64),
                    properties.clone(),
                ));
                for item in &meter.items {
                    let mut item_props = properties.clone();
                    item_props.insert("item".to_string(), item.item.clone());
                    envelopes.push(envelope(
                        DataPoint::measurement(&entry.name, item.count as f64),
                        item_props,
                    ));
                }
            }
            MetricValue::Timer(timer) => {
                envelopes.push(envelope(
                    DataPoint::aggregation(&entry.name, &timer.duration_ms),
                    properties,
                ));
            }
        }
    }
    envelopes
}

fn entry_properties(entry: &MetricEntry) -> BTreeMap<String, String> {
    entry
        .tags
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub struct AppInsightsTarget {
    endpoint: String,
    instrumentation_key: Uuid,
    agent: Agent,
}

impl AppInsightsTarget {
    pub fn new(endpoint: impl Into<String>, instrumentation_key: Uuid, timeout: Duration) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();

        Self {
            endpoint: endpoint.into(),
            instrumentation_key,
            agent,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// 同步发送（在 spawn_blocking 中调用）
    fn post_sync(agent: Agent, endpoint: String, envelopes: Vec<Envelope>) -> anyhow::Result<()> {
        let count = envelopes.len();
        agent
            .post(&endpoint)
            .send_json(&envelopes)
            .with_context(|| format!("POST {} envelopes to \"{}\" failed", count, endpoint))?;
        trace!("Application Insights accepted {} envelopes", count);
        Ok(())
    }
}

#[async_trait::async_trait]
impl ExportTarget for AppInsightsTarget {
    fn name(&self) -> &str {
        "app_insights"
    }

    async fn export(&self, snapshot: Arc<MetricsSnapshot>) -> anyhow::Result<()> {
        let envelopes = build_envelopes(&snapshot, &self.instrumentation_key);
        if envelopes.is_empty() {
            debug!("Application Insights: nothing to send");
            return Ok(());
        }

        let agent = self.agent.clone();
        let endpoint = self.endpoint.clone();
        tokio::task::spawn_blocking(move || Self::post_sync(agent, endpoint, envelopes))
            .await
            .context("Application Insights export task failed")?
    }
}
