//! HTTP处理器

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    Form,
};
use serde_json::json;
use std::time::Instant;
use stroke_admin::{PredictionMetrics, PredictionOutcomeLabel};
use stroke_core::{
    encode, FormValidator, PredictionPayload, RawFormInput, RiskAssessment, StrokeError,
    GENERIC_REQUEST_ERROR,
};
use stroke_workflow::{PredictionSession, SubmissionOutcome};
use tracing::{error, info};

use crate::pages::{render_landing, render_prediction, PredictionView};
use crate::server::AppState;

/// 落地页
pub async fn landing() -> Html<String> {
    Html(render_landing())
}

/// 表单页（默认值）
pub async fn prediction_page(State(state): State<AppState>) -> Html<String> {
    let session = PredictionSession::new(state.service.clone());
    Html(render_prediction(&PredictionView::from_session(&session)))
}

/// 表单提交
pub async fn prediction_submit(
    State(state): State<AppState>,
    Form(form): Form<RawFormInput>,
) -> Result<Html<String>, ApiError> {
    let mut session = PredictionSession::with_form(state.service.clone(), form);
    let started = Instant::now();

    let outcome = session.submit().await?;
    record_outcome(&state.metrics, &outcome, started);

    Ok(Html(render_prediction(&PredictionView::from_session(&session))))
}

/// JSON预测接口
pub async fn predict_api(
    State(state): State<AppState>,
    body: Result<Json<RawFormInput>, JsonRejection>,
) -> Result<Json<RiskAssessment>, ApiError> {
    let Json(form) = body?;
    let mut session = PredictionSession::with_form(state.service.clone(), form);
    let started = Instant::now();

    let outcome = session.submit().await?;
    record_outcome(&state.metrics, &outcome, started);

    match outcome {
        SubmissionOutcome::Assessed(assessment) => Ok(Json(assessment)),
        SubmissionOutcome::Invalid(errors) => Err(StrokeError::Validation(errors).into()),
        SubmissionOutcome::Failed(message) => Err(ApiError::upstream(message)),
    }
}

/// 只编码不提交，用于核对请求体
pub async fn payload_api(
    body: Result<Json<RawFormInput>, JsonRejection>,
) -> Result<Json<PredictionPayload>, ApiError> {
    let Json(form) = body?;
    let input = FormValidator::new().validate(&form)?;
    Ok(Json(encode(&input)))
}

/// API根路径处理器
pub async fn api_root() -> impl IntoResponse {
    Json(json!({
        "service": "Stroke Risk API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "health": "/health",
            "metrics": "/metrics",
            "predict": "/api/v1/predict",
            "payload": "/api/v1/payload"
        }
    }))
}

/// 健康检查处理器
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Prometheus指标
pub async fn metrics(State(state): State<AppState>) -> Result<Response, ApiError> {
    let body = state
        .metrics
        .gather_text()
        .map_err(|e| StrokeError::Internal(e.to_string()))?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response())
}

fn record_outcome(metrics: &PredictionMetrics, outcome: &SubmissionOutcome, started: Instant) {
    let label = match outcome {
        SubmissionOutcome::Assessed(a) if a.is_high_risk() => PredictionOutcomeLabel::HighRisk,
        SubmissionOutcome::Assessed(_) => PredictionOutcomeLabel::LowRisk,
        SubmissionOutcome::Invalid(_) => PredictionOutcomeLabel::Invalid,
        SubmissionOutcome::Failed(_) => PredictionOutcomeLabel::Failed,
    };
    metrics.record(label, started.elapsed());
}

/// 接口错误
#[derive(Debug)]
pub enum ApiError {
    Core(StrokeError),
    Upstream(String),
    /// 请求体不是合法的JSON表单
    Malformed(JsonRejection),
}

impl ApiError {
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Malformed(rejection)
    }
}

impl From<StrokeError> for ApiError {
    fn from(err: StrokeError) -> Self {
        Self::Core(err)
    }
}

/// 错误处理
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            ApiError::Upstream(message) => (StatusCode::BAD_GATEWAY, message, None),
            ApiError::Malformed(rejection) => (rejection.status(), rejection.body_text(), None),
            ApiError::Core(StrokeError::Validation(errors)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Validation failed".to_string(),
                Some(errors),
            ),
            ApiError::Core(StrokeError::Request(_)) => {
                (StatusCode::BAD_GATEWAY, GENERIC_REQUEST_ERROR.to_string(), None)
            }
            ApiError::Core(StrokeError::SubmissionInProgress) => {
                (StatusCode::CONFLICT, StrokeError::SubmissionInProgress.to_string(), None)
            }
            ApiError::Core(other) => {
                error!("Request failed: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string(), None)
            }
        };

        if status.is_client_error() {
            info!("Responding {} : {}", status, message);
        }

        let body = Json(json!({
            "error": true,
            "message": message,
            "status": status.as_u16(),
            "errors": errors.unwrap_or_default(),
        }));

        (status, body).into_response()
    }
}
