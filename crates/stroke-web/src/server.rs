//! Web服务器

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use stroke_admin::PredictionMetrics;
use stroke_integration::PredictionService;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::handlers::{
    api_root, health, landing, metrics, payload_api, predict_api, prediction_page,
    prediction_submit,
};

/// 处理器共享状态
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<dyn PredictionService>,
    pub metrics: PredictionMetrics,
}

impl AppState {
    pub fn new(service: Arc<dyn PredictionService>, metrics: PredictionMetrics) -> Self {
        Self { service, metrics }
    }
}

pub struct WebServer {
    host: String,
    port: u16,
    app: Router,
}

impl WebServer {
    /// `host` 可以是IP地址，也可以是 `localhost` 这样的主机名
    pub fn new(host: impl Into<String>, port: u16, state: AppState) -> Self {
        Self {
            host: host.into(),
            port,
            app: create_app(state),
        }
    }

    /// 解析主机名并绑定监听端口
    pub async fn bind(&self) -> Result<TcpListener> {
        TcpListener::bind((self.host.as_str(), self.port))
            .await
            .with_context(|| format!("Failed to bind {}:{}", self.host, self.port))
    }

    pub async fn run(self) -> Result<()> {
        let listener = self.bind().await?;
        info!("Starting web server on {}", listener.local_addr()?);

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Failed to start web server")?;

        info!("Web server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// 创建路由
pub fn create_app(state: AppState) -> Router {
    Router::new()
        // 页面
        .route("/", get(landing))
        .route("/prediction", get(prediction_page).post(prediction_submit))

        // 健康检查和指标
        .route("/health", get(health))
        .route("/metrics", get(metrics))

        // API路由
        .nest("/api/v1", api_routes())
        .with_state(state)

        // 全局中间件
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
}

/// API v1 路由
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(api_root))
        .route("/predict", post(predict_api))
        .route("/payload", post(payload_api))
}

#[cfg(test)]
mod tests {
    use super::*;
    use stroke_integration::{HttpPredictionClient, PredictorSettings};

    fn state() -> AppState {
        let client = HttpPredictionClient::new(PredictorSettings::default()).unwrap();
        AppState::new(Arc::new(client), PredictionMetrics::new().unwrap())
    }

    #[tokio::test]
    async fn test_bind_accepts_host_names() {
        let server = WebServer::new("localhost", 0, state());
        let listener = server.bind().await.unwrap();
        assert!(listener.local_addr().unwrap().ip().is_loopback());

        let server = WebServer::new("127.0.0.1", 0, state());
        assert!(server.bind().await.is_ok());
    }

    #[tokio::test]
    async fn test_bind_reports_unresolvable_host() {
        let server = WebServer::new("no such host", 0, state());
        let err = server.bind().await.unwrap_err();
        assert!(err.to_string().contains("Failed to bind no such host:0"));
    }
}
