//! Config loading tests (TOML file + defaults)

use std::io::Write;

use metrics_sampler::config::{ExportTargetKind, FormatterKind, StaticConfig, validate_config};

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_overrides_from_file() {
    let file = write_config(
        r#"
[sampler]
record_interval_ms = 500
report_interval_ms = 5000

[reporting]
instrumentation_key = "0f8fad5b-d9cb-469f-a165-70867728950e"
targets = ["log", "app_insights"]

[metrics]
default_context_label = "Sampler"
global_tags = { env = "test" }

[output]
formatters = ["json"]
"#,
    );

    let config = StaticConfig::load(file.path().to_str()).unwrap();
    assert_eq!(config.sampler.record_interval_ms, 500);
    assert_eq!(config.sampler.report_interval_ms, 5000);
    // 未设置的字段保持默认值
    assert_eq!(config.sampler.shutdown_timeout_ms, 5000);
    assert_eq!(
        config.reporting.targets,
        vec![ExportTargetKind::Log, ExportTargetKind::AppInsights]
    );
    assert_eq!(config.output.formatters, vec![FormatterKind::Json]);
    assert_eq!(config.metrics.default_context_label, "Sampler");
    assert_eq!(config.metrics.global_tags.get("env").map(String::as_str), Some("test"));
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let err = StaticConfig::load(path.to_str()).unwrap_err();
    assert!(err.is_fatal());
}

#[test]
fn test_unknown_target_is_rejected() {
    let file = write_config(
        r#"
[reporting]
targets = ["kafka"]
"#,
    );
    assert!(StaticConfig::load(file.path().to_str()).is_err());
}

#[test]
fn test_generated_sample_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("generated.toml");
    StaticConfig::default().save_to_file(&path).unwrap();

    let config = StaticConfig::load(path.to_str()).unwrap();
    assert_eq!(config.sampler.record_interval_ms, 2000);
    assert_eq!(config.reporting.endpoint, "https://dc.services.visualstudio.com/v2/track");
    // 默认配置没有 key，校验必须失败
    assert!(validate_config(&config).is_err());
}
