//! # 预测服务集成模块
//!
//! 与外部卒中风险预测服务的对接：
//! - `PredictionService` 接口，便于测试替换
//! - 基于reqwest的HTTP客户端，单次POST、显式超时、不重试

pub mod predictor;

pub use predictor::{HttpPredictionClient, PredictionService, PredictorSettings};
