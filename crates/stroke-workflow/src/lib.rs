//! # 预测提交流程模块
//!
//! 表单提交的状态管理：
//! - 基于转换表的提交状态机
//! - 预测会话：校验、编码、提交、解读结果

pub mod session;
pub mod state_machine;

pub use session::{PredictionSession, SubmissionOutcome};
pub use state_machine::{SubmissionEvent, SubmissionState, SubmissionStateMachine};
