//! 卒中风险评估服务主程序

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use stroke_admin::{init_logging, PredictionMetrics, StrokeConfig};
use stroke_integration::{HttpPredictionClient, PredictorSettings};
use stroke_web::{AppState, WebServer};
use tracing::{error, info};

/// 服务器命令行参数
#[derive(Parser, Debug)]
#[command(name = "stroke-server")]
#[command(about = "卒中风险评估服务：表单校验、特征编码并转发到远程预测模型")]
#[command(version)]
struct Args {
    /// 配置文件路径
    #[arg(short, long)]
    config: Option<String>,

    /// 监听主机
    #[arg(long)]
    host: Option<String>,

    /// 监听端口
    #[arg(short, long)]
    port: Option<u16>,

    /// 远程预测接口地址
    #[arg(short, long)]
    endpoint: Option<String>,

    /// 日志级别
    #[arg(short, long)]
    log_level: Option<String>,

    /// 打印最终配置后退出
    #[arg(long)]
    dump_config: bool,
}

impl Args {
    /// 命令行参数覆盖配置文件和环境变量
    fn apply(&self, config: &mut StrokeConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(endpoint) = &self.endpoint {
            config.predictor.endpoint = endpoint.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = StrokeConfig::load(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;

    if args.dump_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    init_logging(&config.logging)?;

    match &args.config {
        Some(path) => info!("Configuration loaded from: {}", path),
        None => info!("Configuration loaded from defaults and environment"),
    }
    info!("Starting stroke risk server...");
    info!("  Listen address: {}", config.server.bind_address());
    info!("  Predictor endpoint: {}", config.predictor.endpoint);
    info!("  Request timeout: {}s", config.predictor.timeout_secs);

    let client = HttpPredictionClient::new(PredictorSettings {
        endpoint: config.predictor.endpoint.clone(),
        timeout: config.predictor.timeout(),
    })?;
    let metrics = PredictionMetrics::new()?;
    let state = AppState::new(Arc::new(client), metrics);

    let server = WebServer::new(config.server.host.clone(), config.server.port, state);
    if let Err(e) = server.run().await {
        error!("Server failed: {:#}", e);
        return Err(e);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let args = Args::parse_from([
            "stroke-server",
            "--port",
            "8080",
            "--endpoint",
            "http://model:5000/predict",
            "--log-level",
            "debug",
        ]);

        let mut config = StrokeConfig::default();
        args.apply(&mut config);

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.predictor.endpoint, "http://model:5000/predict");
        assert_eq!(config.logging.level, "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_dump_config_flag() {
        let args = Args::parse_from(["stroke-server", "--dump-config"]);
        assert!(args.dump_config);
        assert!(args.config.is_none());
    }
}
