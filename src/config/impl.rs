use config::{Config, Environment, File};

use super::StaticConfig;
use crate::errors::{Result, SamplerError};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 环境变量前缀，例如 `MS__SAMPLER__RECORD_INTERVAL_MS=500`
pub const ENV_PREFIX: &str = "MS";

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > TOML 文件 > 默认值
    ///
    /// An explicitly given path must exist; the default `config.toml` is optional.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p, true),
            None => (DEFAULT_CONFIG_PATH, false),
        };

        let settings = Config::builder()
            .add_source(File::with_name(path).required(required))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("reporting.targets")
                    .with_list_parse_key("output.formatters")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| SamplerError::config(format!("Failed to build config: {}", e)))?;

        let config = settings
            .try_deserialize::<StaticConfig>()
            .map_err(|e| SamplerError::config(format!("Failed to deserialize config: {}", e)))?;

        if std::path::Path::new(path).exists() {
            tracing::debug!("Configuration loaded from: {}", path);
        }

        Ok(config)
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SamplerError::serialization(e.to_string()))?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}
