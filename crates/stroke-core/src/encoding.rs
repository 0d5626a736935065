//! 独热编码模块
//!
//! 远程模型的列名和顺序集中在 [`ONE_HOT_TABLE`] 一张表里，
//! 任何键名或顺序偏差都会让远程服务静默地给出错误分类。

use tracing::debug;

use crate::models::{FormInput, PayloadValue, PredictionPayload};

/// 独热编码的一列
#[derive(Debug, Clone, Copy)]
pub struct OneHotColumn {
    /// 输出键名
    pub key: &'static str,
    /// 该列为1时对应的表单选项；`None` 表示恒为0的占位列
    pub category: Option<&'static str>,
}

/// 一个分类字段的编码规则
#[derive(Clone, Copy)]
pub struct PayloadGroup {
    /// 表单字段名
    pub field: &'static str,
    /// 参照类别：选中时该组所有列均为0
    pub reference: Option<&'static str>,
    /// 按远程模型期望顺序排列的输出列
    pub columns: &'static [OneHotColumn],
    /// 从表单取出该字段的选项标签
    pub select: fn(&FormInput) -> &'static str,
}

const fn column(key: &'static str, category: &'static str) -> OneHotColumn {
    OneHotColumn {
        key,
        category: Some(category),
    }
}

const fn placeholder(key: &'static str) -> OneHotColumn {
    OneHotColumn {
        key,
        category: None,
    }
}

/// 数值字段，按顺序原样输出
pub const MEASURE_KEYS: [&str; 5] = [
    "age",
    "hypertension",
    "heart_disease",
    "avg_glucose_level",
    "bmi",
];

/// 分类字段 → 有序输出列
pub static ONE_HOT_TABLE: [PayloadGroup; 5] = [
    PayloadGroup {
        field: "gender",
        reference: Some("Female"),
        columns: &[column("gender_Male", "Male"), placeholder("gender_Other")],
        select: |input| input.gender.as_str(),
    },
    PayloadGroup {
        field: "ever_married",
        reference: Some("No"),
        columns: &[column("ever_married_Yes", "Yes")],
        select: |input| input.ever_married.as_str(),
    },
    PayloadGroup {
        field: "work_type",
        reference: None,
        // 远程模型把政府工作归入 Never_worked 列
        columns: &[
            column("work_type_Never_worked", "Govt_job"),
            column("work_type_Private", "Private"),
            column("work_type_children", "children"),
            column("work_type_Self-employed", "Self-employed"),
        ],
        select: |input| input.work_type.as_str(),
    },
    PayloadGroup {
        field: "Residence_type",
        reference: Some("Rural"),
        columns: &[column("Residence_type_Urban", "Urban")],
        select: |input| input.residence_type.as_str(),
    },
    PayloadGroup {
        field: "smoking_status",
        reference: None,
        columns: &[
            column("smoking_status_formerly smoked", "Formerly_smoked"),
            column("smoking_status_never smoked", "Never_smoked"),
            column("smoking_status_smokes", "Smokes"),
        ],
        select: |input| input.smoking_status.as_str(),
    },
];

fn flag(value: bool) -> PayloadValue {
    PayloadValue::Flag(u8::from(value))
}

/// 将已校验的表单编码为远程服务的请求体（纯函数）
pub fn encode(input: &FormInput) -> PredictionPayload {
    let mut payload = PredictionPayload::default();

    payload.push(MEASURE_KEYS[0], PayloadValue::Measure(input.age));
    payload.push(MEASURE_KEYS[1], flag(input.hypertension));
    payload.push(MEASURE_KEYS[2], flag(input.heart_disease));
    payload.push(MEASURE_KEYS[3], PayloadValue::Measure(input.avg_glucose_level));
    payload.push(MEASURE_KEYS[4], PayloadValue::Measure(input.bmi));

    for group in ONE_HOT_TABLE.iter() {
        let selected = (group.select)(input);
        for col in group.columns {
            payload.push(col.key, flag(col.category == Some(selected)));
        }
    }

    debug!("Encoded prediction payload with {} keys", payload.len());
    payload
}
