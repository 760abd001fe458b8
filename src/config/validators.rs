//! 配置值验证模块
//!
//! 启动前检查配置；任何失败都是致命错误，后台任务不会被启动。

use uuid::Uuid;

use super::StaticConfig;
use crate::errors::{Result, SamplerError};

/// 验证 Application Insights instrumentation key
///
/// The key must be a non-empty GUID other than the nil GUID.
pub fn validate_instrumentation_key(key: &str) -> Result<Uuid> {
    let key = key.trim();
    if key.is_empty() {
        return Err(SamplerError::invalid_instrumentation_key(
            "You must set a non-empty instrumentation key in the config as reporting.instrumentation_key",
        ));
    }

    let guid = Uuid::parse_str(key).map_err(|e| {
        SamplerError::invalid_instrumentation_key(format!(
            "Instrumentation key '{}' is not a valid GUID: {}",
            key, e
        ))
    })?;

    if guid.is_nil() {
        return Err(SamplerError::invalid_instrumentation_key(
            "Instrumentation key must not be the empty GUID",
        ));
    }

    Ok(guid)
}

/// 验证整份配置
pub fn validate_config(config: &StaticConfig) -> Result<()> {
    validate_instrumentation_key(&config.reporting.instrumentation_key)?;

    let sampler = &config.sampler;
    if sampler.record_interval_ms == 0 {
        return Err(SamplerError::validation("sampler.record_interval_ms must be > 0"));
    }
    if sampler.report_interval_ms == 0 {
        return Err(SamplerError::validation("sampler.report_interval_ms must be > 0"));
    }
    if sampler.work_min_ms >= sampler.work_max_ms {
        return Err(SamplerError::validation(format!(
            "sampler.work_min_ms ({}) must be less than sampler.work_max_ms ({})",
            sampler.work_min_ms, sampler.work_max_ms
        )));
    }

    if config.reporting.timeout_secs == 0 {
        return Err(SamplerError::validation("reporting.timeout_secs must be > 0"));
    }
    if config.reporting.endpoint.trim().is_empty() {
        return Err(SamplerError::validation("reporting.endpoint must not be empty"));
    }

    if config.output.formatters.is_empty() {
        return Err(SamplerError::validation(
            "output.formatters must name at least one formatter",
        ));
    }

    Ok(())
}
