//! 远程预测服务客户端
//!
//! 请求体为独热编码后的表单，响应约定为 `{ "stroke_prediction": 0 | 1 }`，
//! 可选携带 `probability`。

use async_trait::async_trait;
use std::time::{Duration, Instant};
use stroke_core::{PredictionPayload, PredictionResult, RequestError, Result, StrokeError};
use tracing::{debug, error, info};

/// 默认预测服务地址
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/predict";

/// 默认请求超时
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// 预测服务接口
#[async_trait]
pub trait PredictionService: Send + Sync {
    /// 提交一次预测请求
    async fn predict(&self, payload: &PredictionPayload) -> Result<PredictionResult>;

    /// 服务地址（用于日志）
    fn endpoint(&self) -> &str;
}

/// 客户端设置
#[derive(Debug, Clone)]
pub struct PredictorSettings {
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for PredictorSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// 基于HTTP的预测服务客户端
#[derive(Debug, Clone)]
pub struct HttpPredictionClient {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpPredictionClient {
    /// 创建新的客户端
    pub fn new(settings: PredictorSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("stroke-risk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StrokeError::Config(format!("Failed to build HTTP client: {}", e)))?;

        info!(
            "Prediction client configured for {} (timeout {:?})",
            settings.endpoint, settings.timeout
        );

        Ok(Self {
            endpoint: settings.endpoint,
            client,
        })
    }
}

/// 将传输层错误归类
fn classify(err: reqwest::Error) -> RequestError {
    if err.is_timeout() {
        RequestError::Timeout
    } else if err.is_decode() {
        RequestError::InvalidResponse(err.to_string())
    } else {
        RequestError::Unreachable(err.to_string())
    }
}

#[async_trait]
impl PredictionService for HttpPredictionClient {
    async fn predict(&self, payload: &PredictionPayload) -> Result<PredictionResult> {
        let started = Instant::now();
        debug!("POST {} payload={}", self.endpoint, serde_json::to_string(payload)?);

        let response = match self.client.post(&self.endpoint).json(payload).send().await {
            Ok(response) => response,
            Err(e) => {
                let cause = classify(e);
                error!("Prediction request to {} failed: {}", self.endpoint, cause);
                return Err(cause.into());
            }
        };

        let status = response.status();
        if !status.is_success() {
            error!("Prediction service returned status {}: {}", status, self.endpoint);
            return Err(RequestError::Status(status.as_u16()).into());
        }

        let result = response.json::<PredictionResult>().await.map_err(|e| {
            let cause = classify(e);
            error!("Failed to read prediction response: {}", cause);
            StrokeError::Request(cause)
        })?;

        info!(
            "Prediction received from {} in {:?}",
            self.endpoint,
            started.elapsed()
        );
        Ok(result)
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use std::sync::{Arc, Mutex};
    use stroke_core::{encode, FormValidator, RawFormInput, RiskAssessment};

    type Received = Arc<Mutex<Vec<serde_json::Value>>>;

    async fn predict_handler(
        State(received): State<Received>,
        Json(body): Json<serde_json::Value>,
    ) -> Json<serde_json::Value> {
        let high = body["hypertension"] == 1;
        received.lock().unwrap().push(body);
        Json(serde_json::json!({ "stroke_prediction": if high { 1 } else { 0 } }))
    }

    async fn spawn_stub() -> (String, Received) {
        let received: Received = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/predict", post(predict_handler))
            .route("/fail", post(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
            .route("/garbage", post(|| async { "not json" }))
            .route(
                "/float",
                post(|| async { Json(serde_json::json!({ "stroke_prediction": 1.0, "probability": 0.82 })) }),
            )
            .route(
                "/slow",
                post(|| async {
                    tokio::time::sleep(Duration::from_secs(2)).await;
                    Json(serde_json::json!({ "stroke_prediction": 0 }))
                }),
            )
            .with_state(received.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), received)
    }

    fn client(endpoint: String, timeout: Duration) -> HttpPredictionClient {
        HttpPredictionClient::new(PredictorSettings { endpoint, timeout }).unwrap()
    }

    fn sample_payload() -> PredictionPayload {
        let raw = RawFormInput {
            age: "45".to_string(),
            hypertension: "1".to_string(),
            avg_glucose_level: "120".to_string(),
            bmi: "25".to_string(),
            ever_married: "Yes".to_string(),
            ..RawFormInput::default()
        };
        encode(&FormValidator::new().validate(&raw).unwrap())
    }

    #[tokio::test]
    async fn test_predict_posts_encoded_payload() {
        let (base, received) = spawn_stub().await;
        let client = client(format!("{}/predict", base), DEFAULT_TIMEOUT);

        let result = client.predict(&sample_payload()).await.unwrap();
        assert_eq!(result.stroke_prediction, 1);

        let bodies = received.lock().unwrap();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0]["gender_Male"], 1);
        assert_eq!(bodies[0]["smoking_status_never smoked"], 1);
        assert_eq!(bodies[0]["work_type_Self-employed"], 0);
    }

    #[tokio::test]
    async fn test_float_prediction_is_high_risk() {
        let (base, _) = spawn_stub().await;
        let client = client(format!("{}/float", base), DEFAULT_TIMEOUT);

        let result = client.predict(&sample_payload()).await.unwrap();
        assert_eq!(result.stroke_prediction, 1);

        let assessment = RiskAssessment::from_result(&result).unwrap();
        assert!(assessment.is_high_risk());
        assert_eq!(assessment.probability, Some(0.82));
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let (base, _) = spawn_stub().await;
        let client = client(format!("{}/fail", base), DEFAULT_TIMEOUT);

        let err = client.predict(&sample_payload()).await.unwrap_err();
        assert!(matches!(err, StrokeError::Request(RequestError::Status(500))));
    }

    #[tokio::test]
    async fn test_invalid_body() {
        let (base, _) = spawn_stub().await;
        let client = client(format!("{}/garbage", base), DEFAULT_TIMEOUT);

        let err = client.predict(&sample_payload()).await.unwrap_err();
        assert!(matches!(err, StrokeError::Request(RequestError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_timeout() {
        let (base, _) = spawn_stub().await;
        let client = client(format!("{}/slow", base), Duration::from_millis(200));

        let err = client.predict(&sample_payload()).await.unwrap_err();
        assert!(matches!(err, StrokeError::Request(RequestError::Timeout)));
    }

    #[tokio::test]
    async fn test_unreachable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client(format!("http://{}/predict", addr), DEFAULT_TIMEOUT);
        let err = client.predict(&sample_payload()).await.unwrap_err();
        assert!(matches!(err, StrokeError::Request(RequestError::Unreachable(_))));
    }
}
