use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, IntoEnumIterator};

/// 静态配置（从 TOML + 环境变量加载，启动时使用一次）
///
/// - sampler: 记录 / 上报节奏和关闭超时
/// - reporting: 导出目标与 instrumentation key
/// - metrics: 指标开关、默认 context、全局标签
/// - output: 控制台格式化器
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub sampler: SamplerConfig,
    #[serde(default)]
    pub reporting: ReportingConfig,
    #[serde(default)]
    pub metrics: MetricsOptions,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Export targets that can be configured under `reporting.targets`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExportTargetKind {
    AppInsights,
    Log,
}

impl std::str::FromStr for ExportTargetKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::iter()
            .find(|k| k.as_ref().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "Invalid export target: '{}'. Valid: app_insights, log",
                    s
                )
            })
    }
}

/// Console formatters that can be configured under `output.formatters`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FormatterKind {
    Text,
    Json,
}

impl std::str::FromStr for FormatterKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::iter()
            .find(|k| k.as_ref().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Invalid formatter: '{}'. Valid: text, json", s))
    }
}

/// 采样节奏配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplerConfig {
    #[serde(default = "default_record_interval_ms")]
    pub record_interval_ms: u64,
    #[serde(default = "default_report_interval_ms")]
    pub report_interval_ms: u64,
    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,
    /// 模拟工作耗时下限（含）
    #[serde(default)]
    pub work_min_ms: u64,
    /// 模拟工作耗时上限（不含）
    #[serde(default = "default_work_max_ms")]
    pub work_max_ms: u64,
}

impl SamplerConfig {
    pub fn record_interval(&self) -> Duration {
        Duration::from_millis(self.record_interval_ms)
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_millis(self.report_interval_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

/// 上报配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportingConfig {
    /// Application Insights instrumentation key (GUID)
    #[serde(default)]
    pub instrumentation_key: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_targets")]
    pub targets: Vec<ExportTargetKind>,
    /// 单个导出目标的超时时间（秒）
    #[serde(default = "default_export_timeout_secs")]
    pub timeout_secs: u64,
}

/// Metric collection options applied to every instrument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsOptions {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub reporting_enabled: bool,
    #[serde(default = "default_context_label")]
    pub default_context_label: String,
    #[serde(default)]
    pub global_tags: BTreeMap<String, String>,
}

/// 控制台输出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_formatters")]
    pub formatters: Vec<FormatterKind>,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_log_file")]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default)]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions
// ============================================================

fn default_record_interval_ms() -> u64 {
    2_000
}

fn default_report_interval_ms() -> u64 {
    60_000
}

fn default_shutdown_timeout_ms() -> u64 {
    5_000
}

fn default_work_max_ms() -> u64 {
    101
}

fn default_endpoint() -> String {
    "https://dc.services.visualstudio.com/v2/track".to_string()
}

fn default_targets() -> Vec<ExportTargetKind> {
    vec![ExportTargetKind::AppInsights]
}

fn default_export_timeout_secs() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn default_context_label() -> String {
    "Application".to_string()
}

fn default_formatters() -> Vec<FormatterKind> {
    vec![FormatterKind::Text, FormatterKind::Json]
}

fn default_log_level() -> String {
    "debug".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_file() -> Option<String> {
    Some("metrics-sampler.log".to_string())
}

fn default_max_backups() -> u32 {
    5
}

// ============================================================
// Default implementations
// ============================================================

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            record_interval_ms: default_record_interval_ms(),
            report_interval_ms: default_report_interval_ms(),
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
            work_min_ms: 0,
            work_max_ms: default_work_max_ms(),
        }
    }
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            instrumentation_key: String::new(),
            endpoint: default_endpoint(),
            targets: default_targets(),
            timeout_secs: default_export_timeout_secs(),
        }
    }
}

impl Default for MetricsOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            reporting_enabled: true,
            default_context_label: default_context_label(),
            global_tags: BTreeMap::new(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            formatters: default_formatters(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: default_log_file(),
            max_backups: default_max_backups(),
            enable_rotation: false,
        }
    }
}
