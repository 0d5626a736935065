//! 错误定义模块

use serde::Serialize;
use thiserror::Error;

/// 对用户展示的统一请求失败提示，不区分具体原因
pub const GENERIC_REQUEST_ERROR: &str = "Failed to predict stroke risk. Please try again.";

/// 字段级校验错误
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// 远程预测请求失败原因（仅用于日志，用户只看到统一提示）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("预测服务不可达: {0}")]
    Unreachable(String),

    #[error("预测服务请求超时")]
    Timeout,

    #[error("预测服务返回非成功状态: {0}")]
    Status(u16),

    #[error("预测服务响应无效: {0}")]
    InvalidResponse(String),
}

impl RequestError {
    /// 用户可见的提示
    pub fn user_message(&self) -> &'static str {
        GENERIC_REQUEST_ERROR
    }
}

/// 系统统一错误类型
#[derive(Error, Debug)]
pub enum StrokeError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("表单校验失败: {} 个字段无效", .0.len())]
    Validation(Vec<FieldError>),

    #[error("预测请求失败: {0}")]
    Request(#[from] RequestError),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("网络错误: {0}")]
    Network(#[from] std::io::Error),

    #[error("已有预测请求正在进行")]
    SubmissionInProgress,

    #[error("无效状态转换: 从 {from} 到 {event}")]
    InvalidStateTransition { from: String, event: String },

    #[error("系统内部错误: {0}")]
    Internal(String),
}

/// 系统统一结果类型
pub type Result<T> = std::result::Result<T, StrokeError>;
