//! 日志初始化
//!
//! 基于 `tracing-subscriber`，级别支持完整的 EnvFilter 指令，
//! 例如 `info,stroke_integration=debug`。表单内容属于健康数据，只在debug级别输出。

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

/// 构建日志过滤器；`RUST_LOG` 优先于配置
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(&directives)
            .with_context(|| format!("Invalid RUST_LOG directives: {}", directives)),
        _ => EnvFilter::try_new(&config.level)
            .with_context(|| format!("Invalid log level: {}", config.level)),
    }
}

/// 初始化全局日志订阅者
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let result = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ENV_LOCK;

    fn logging(level: &str) -> LoggingConfig {
        LoggingConfig {
            level: level.to_string(),
            format: LogFormat::Text,
        }
    }

    /// 在给定的 `RUST_LOG` 下执行，结束后恢复原值
    fn with_rust_log<T>(value: Option<&str>, f: impl FnOnce() -> T) -> T {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let saved = std::env::var(EnvFilter::DEFAULT_ENV).ok();
        match value {
            Some(v) => std::env::set_var(EnvFilter::DEFAULT_ENV, v),
            None => std::env::remove_var(EnvFilter::DEFAULT_ENV),
        }

        let result = f();

        match saved {
            Some(v) => std::env::set_var(EnvFilter::DEFAULT_ENV, v),
            None => std::env::remove_var(EnvFilter::DEFAULT_ENV),
        }
        result
    }

    #[test]
    fn test_filter_uses_configured_directives() {
        let filter = with_rust_log(None, || build_filter(&logging("info,stroke_integration=debug")))
            .unwrap();
        let text = filter.to_string();
        assert!(text.contains("stroke_integration=debug"), "{}", text);
    }

    #[test]
    fn test_rust_log_wins_over_config() {
        let filter = with_rust_log(Some("trace"), || build_filter(&logging("warn"))).unwrap();
        assert_eq!(filter.to_string(), "trace");

        let filter = with_rust_log(Some("  "), || build_filter(&logging("warn"))).unwrap();
        assert_eq!(filter.to_string(), "warn");
    }

    #[test]
    fn test_invalid_level_is_rejected() {
        assert!(with_rust_log(None, || build_filter(&logging("info,stroke_web=verbose"))).is_err());
        assert!(with_rust_log(Some("info,stroke_web=verbose"), || build_filter(&logging("info"))).is_err());
        assert!(with_rust_log(None, || init_logging(&logging("info,stroke_web=verbose"))).is_err());
    }
}
