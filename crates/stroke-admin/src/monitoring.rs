//! 预测指标
//!
//! 以Prometheus文本格式暴露预测结果计数和耗时

use anyhow::Result;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};
use std::time::Duration;
use tracing::debug;

/// 预测结果标签
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionOutcomeLabel {
    HighRisk,
    LowRisk,
    Invalid,
    Failed,
}

impl PredictionOutcomeLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HighRisk => "high_risk",
            Self::LowRisk => "low_risk",
            Self::Invalid => "invalid",
            Self::Failed => "failed",
        }
    }
}

/// 预测指标集合
#[derive(Clone)]
pub struct PredictionMetrics {
    registry: Registry,
    predictions_total: IntCounterVec,
    prediction_duration: Histogram,
}

impl PredictionMetrics {
    /// 创建并注册指标
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let predictions_total = IntCounterVec::new(
            Opts::new("stroke_predictions_total", "Total number of prediction submissions"),
            &["outcome"],
        )?;

        let prediction_duration = Histogram::with_opts(HistogramOpts::new(
            "stroke_prediction_duration_seconds",
            "Prediction submission duration in seconds",
        ))?;

        registry.register(Box::new(predictions_total.clone()))?;
        registry.register(Box::new(prediction_duration.clone()))?;

        Ok(Self {
            registry,
            predictions_total,
            prediction_duration,
        })
    }

    /// 记录一次提交
    pub fn record(&self, outcome: PredictionOutcomeLabel, duration: Duration) {
        debug!("Prediction outcome {} in {:?}", outcome.as_str(), duration);
        self.predictions_total
            .with_label_values(&[outcome.as_str()])
            .inc();
        self.prediction_duration.observe(duration.as_secs_f64());
    }

    /// 某个结果的累计次数
    pub fn count(&self, outcome: PredictionOutcomeLabel) -> u64 {
        self.predictions_total
            .with_label_values(&[outcome.as_str()])
            .get()
    }

    /// 获取Prometheus文本格式指标
    pub fn gather_text(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

impl std::fmt::Debug for PredictionMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionMetrics").finish_non_exhaustive()
    }
}
