//! 预测会话
//!
//! 保存一张表单的当前值、提交状态和最近一次结果。
//! 每次提交都从当前表单重新生成请求体，会话之间不共享可变状态。

use std::sync::Arc;
use std::time::Instant;
use stroke_core::{
    encode, FieldError, FormValidator, PredictionPayload, RawFormInput, Result, RiskAssessment,
    StrokeError, GENERIC_REQUEST_ERROR,
};
use stroke_integration::PredictionService;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::state_machine::{SubmissionEvent, SubmissionState, SubmissionStateMachine};

/// 一次提交的结果
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    /// 远程服务给出了风险评估
    Assessed(RiskAssessment),
    /// 本地校验未通过，未发起请求
    Invalid(Vec<FieldError>),
    /// 请求失败，只携带统一提示
    Failed(String),
}

/// 预测会话
pub struct PredictionSession {
    form: RawFormInput,
    state: SubmissionState,
    machine: SubmissionStateMachine,
    validator: FormValidator,
    service: Arc<dyn PredictionService>,
    field_errors: Vec<FieldError>,
    request_error: Option<String>,
    assessment: Option<RiskAssessment>,
    last_payload: Option<PredictionPayload>,
}

impl PredictionSession {
    /// 以页面默认值创建会话
    pub fn new(service: Arc<dyn PredictionService>) -> Self {
        Self::with_form(service, RawFormInput::default())
    }

    /// 以给定表单创建会话
    pub fn with_form(service: Arc<dyn PredictionService>, form: RawFormInput) -> Self {
        Self {
            form,
            state: SubmissionState::Idle,
            machine: SubmissionStateMachine::new(),
            validator: FormValidator::new(),
            service,
            field_errors: Vec::new(),
            request_error: None,
            assessment: None,
            last_payload: None,
        }
    }

    pub fn form(&self) -> &RawFormInput {
        &self.form
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn field_errors(&self) -> &[FieldError] {
        &self.field_errors
    }

    /// 指定字段的错误提示
    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.field_errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn request_error(&self) -> Option<&str> {
        self.request_error.as_deref()
    }

    pub fn assessment(&self) -> Option<&RiskAssessment> {
        self.assessment.as_ref()
    }

    /// 最近一次发出的请求体
    pub fn last_payload(&self) -> Option<&PredictionPayload> {
        self.last_payload.as_ref()
    }

    /// 提交按钮是否可用
    pub fn is_submit_enabled(&self) -> bool {
        self.machine.can_transition(&self.state, &SubmissionEvent::Submit)
    }

    fn apply(&mut self, event: SubmissionEvent) -> Result<()> {
        let next = self.machine.transition(&self.state, &event)?;
        debug!("Submission state {:?} --{:?}--> {:?}", self.state, event, next);
        self.state = next;
        Ok(())
    }

    /// 修改一个字段；会清除上一次的提示和结果
    pub fn edit(&mut self, field: &str, value: impl Into<String>) -> Result<()> {
        self.apply(SubmissionEvent::Edit)?;
        if !self.form.set_field(field, value) {
            return Err(StrokeError::Internal(format!("Unknown form field: {}", field)));
        }
        self.clear_feedback();
        Ok(())
    }

    /// 整体替换表单
    pub fn replace_form(&mut self, form: RawFormInput) -> Result<()> {
        self.apply(SubmissionEvent::Edit)?;
        self.form = form;
        self.clear_feedback();
        Ok(())
    }

    fn clear_feedback(&mut self) {
        self.field_errors.clear();
        self.request_error = None;
        self.assessment = None;
        self.last_payload = None;
    }

    /// 提交表单：校验、编码、调用远程服务并解读结果
    ///
    /// 校验失败和请求失败都会回到 `Idle`，提示信息保留到下一次编辑或提交。
    pub async fn submit(&mut self) -> Result<SubmissionOutcome> {
        if matches!(self.state, SubmissionState::Validating | SubmissionState::Submitting) {
            return Err(StrokeError::SubmissionInProgress);
        }

        self.apply(SubmissionEvent::Submit)?;
        self.clear_feedback();

        let request_id = Uuid::new_v4();
        let input = match self.validator.validate(&self.form) {
            Ok(input) => input,
            Err(StrokeError::Validation(errors)) => {
                self.apply(SubmissionEvent::ValidationRejected)?;
                self.field_errors = errors.clone();
                self.apply(SubmissionEvent::Settle)?;
                info!(%request_id, "Submission blocked by {} field error(s)", errors.len());
                return Ok(SubmissionOutcome::Invalid(errors));
            }
            Err(e) => {
                self.apply(SubmissionEvent::ValidationRejected)?;
                self.apply(SubmissionEvent::Settle)?;
                return Err(e);
            }
        };

        self.apply(SubmissionEvent::ValidationPassed)?;
        let payload = encode(&input);
        self.last_payload = Some(payload.clone());

        let started = Instant::now();
        info!(%request_id, endpoint = self.service.endpoint(), "Submitting prediction request");

        let outcome = self
            .service
            .predict(&payload)
            .await
            .and_then(|result| RiskAssessment::from_result(&result).map_err(StrokeError::from));

        match outcome {
            Ok(assessment) => {
                self.apply(SubmissionEvent::ResponseReceived)?;
                info!(
                    %request_id,
                    risk = ?assessment.risk,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Prediction completed"
                );
                self.assessment = Some(assessment.clone());
                Ok(SubmissionOutcome::Assessed(assessment))
            }
            Err(e) => {
                self.apply(SubmissionEvent::RequestFailed)?;
                warn!(%request_id, error = %e, "Prediction request failed");
                let message = match &e {
                    StrokeError::Request(cause) => cause.user_message(),
                    _ => GENERIC_REQUEST_ERROR,
                };
                self.request_error = Some(message.to_string());
                self.apply(SubmissionEvent::Settle)?;
                Ok(SubmissionOutcome::Failed(message.to_string()))
            }
        }
    }
}

impl std::fmt::Debug for PredictionSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionSession")
            .field("state", &self.state)
            .field("endpoint", &self.service.endpoint())
            .field("field_errors", &self.field_errors)
            .field("request_error", &self.request_error)
            .field("assessment", &self.assessment)
            .finish()
    }
}
