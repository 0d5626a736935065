//! # 运维模块
//!
//! 提供配置加载与校验、日志初始化和Prometheus指标

pub mod config;
pub mod logging;
pub mod monitoring;

pub use config::{LogFormat, LoggingConfig, PredictorConfig, ServerConfig, StrokeConfig};
pub use logging::init_logging;
pub use monitoring::{PredictionMetrics, PredictionOutcomeLabel};

/// 修改进程环境变量的测试共用此锁
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
