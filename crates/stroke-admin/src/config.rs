//! 配置管理
//!
//! 配置按以下顺序叠加：内置默认值 → TOML配置文件 → `STROKE__` 前缀的环境变量，
//! 例如 `STROKE__PREDICTOR__ENDPOINT=http://model:5000/predict`。

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 系统完整配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeConfig {
    /// 服务器配置
    pub server: ServerConfig,
    /// 远程预测服务配置
    pub predictor: PredictorConfig,
    /// 日志配置
    pub logging: LoggingConfig,
}

/// 服务器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听主机
    pub host: String,
    /// 监听端口
    pub port: u16,
}

/// 远程预测服务配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// 预测接口地址
    pub endpoint: String,
    /// 请求超时（秒）
    pub timeout_secs: u64,
}

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别或EnvFilter指令
    pub level: String,
    /// 输出格式
    pub format: LogFormat,
}

impl Default for StrokeConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            predictor: PredictorConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:5000/predict".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

impl PredictorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ServerConfig {
    /// 监听地址
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl StrokeConfig {
    /// 加载配置；未指定文件时只使用默认值和环境变量
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let defaults = StrokeConfig::default();
        let format = match defaults.logging.format {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
        };

        let mut builder = Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("predictor.endpoint", defaults.predictor.endpoint)?
            .set_default("predictor.timeout_secs", defaults.predictor.timeout_secs as i64)?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.format", format)?;

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix("STROKE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to load configuration")?;

        let config: StrokeConfig = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// 校验配置
    pub fn validate(&self) -> Result<()> {
        let endpoint = self.predictor.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            anyhow::bail!(
                "predictor.endpoint must be an http(s) URL, got '{}'",
                self.predictor.endpoint
            );
        }

        if self.predictor.timeout_secs == 0 {
            anyhow::bail!("predictor.timeout_secs must be greater than 0");
        }

        if self.server.port == 0 {
            anyhow::bail!("server.port must be greater than 0");
        }

        if self.server.host.trim().is_empty() {
            anyhow::bail!("server.host must not be empty");
        }

        Ok(())
    }

    /// 以TOML格式导出配置
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ENV_LOCK;

    #[test]
    fn test_default_config_is_valid() {
        let config = StrokeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.predictor.endpoint, "http://localhost:5000/predict");
        assert_eq!(config.predictor.timeout(), Duration::from_secs(10));
        assert_eq!(config.server.bind_address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = StrokeConfig::default();
        config.predictor.endpoint = "localhost:5000".to_string();
        assert!(config.validate().is_err());

        let mut config = StrokeConfig::default();
        config.predictor.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = StrokeConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let path = std::env::temp_dir().join(format!("stroke-config-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            r#"
[server]
host = "127.0.0.1"
port = 8080

[predictor]
endpoint = "https://model.internal/predict"
timeout_secs = 3

[logging]
level = "debug"
format = "json"
"#,
        )
        .unwrap();

        let config = StrokeConfig::load(path.to_str()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.predictor.endpoint, "https://model.internal/predict");
        assert_eq!(config.predictor.timeout_secs, 3);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_environment_overrides_defaults() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let keys = ["STROKE__PREDICTOR__ENDPOINT", "STROKE__PREDICTOR__TIMEOUT_SECS"];
        let saved: Vec<Option<String>> = keys.iter().map(|k| std::env::var(k).ok()).collect();

        std::env::set_var(keys[0], "http://model:5000/predict");
        std::env::set_var(keys[1], "3");
        let loaded = StrokeConfig::load(None);

        for (key, value) in keys.iter().zip(saved) {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }

        let config = loaded.unwrap();
        assert_eq!(config.predictor.endpoint, "http://model:5000/predict");
        assert_eq!(config.predictor.timeout_secs, 3);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = StrokeConfig::default();
        let text = config.to_toml().unwrap();
        assert!(text.contains("[predictor]"));
        let parsed: StrokeConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
