//! 核心数据模型定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde::ser::SerializeMap;

use crate::error::RequestError;

/// 浏览器提交的原始表单，所有字段均为字符串
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFormInput {
    #[serde(default, deserialize_with = "lenient_string")]
    pub age: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub hypertension: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub heart_disease: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub avg_glucose_level: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub bmi: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub ever_married: String,
    #[serde(default)]
    pub work_type: String,
    #[serde(default, rename = "Residence_type", alias = "residence_type")]
    pub residence_type: String,
    #[serde(default)]
    pub smoking_status: String,
}

/// 页面加载时的默认值
impl Default for RawFormInput {
    fn default() -> Self {
        Self {
            age: "0".to_string(),
            hypertension: "0".to_string(),
            heart_disease: "0".to_string(),
            avg_glucose_level: "0".to_string(),
            bmi: "0".to_string(),
            gender: Gender::Male.as_str().to_string(),
            ever_married: EverMarried::No.as_str().to_string(),
            work_type: WorkType::Private.as_str().to_string(),
            residence_type: ResidenceType::Urban.as_str().to_string(),
            smoking_status: SmokingStatus::NeverSmoked.as_str().to_string(),
        }
    }
}

impl RawFormInput {
    /// 按字段名更新值，未知字段返回false
    pub fn set_field(&mut self, field: &str, value: impl Into<String>) -> bool {
        let slot = match field {
            "age" => &mut self.age,
            "hypertension" => &mut self.hypertension,
            "heart_disease" => &mut self.heart_disease,
            "avg_glucose_level" => &mut self.avg_glucose_level,
            "bmi" => &mut self.bmi,
            "gender" => &mut self.gender,
            "ever_married" => &mut self.ever_married,
            "work_type" => &mut self.work_type,
            "Residence_type" | "residence_type" => &mut self.residence_type,
            "smoking_status" => &mut self.smoking_status,
            _ => return false,
        };
        *slot = value.into();
        true
    }
}

/// JSON接口可能直接传数字或布尔值，统一转成字符串
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        Text(String),
        Int(i64),
        Float(f64),
        Bool(bool),
    }

    Ok(match Lenient::deserialize(deserializer)? {
        Lenient::Text(s) => s,
        Lenient::Int(i) => i.to_string(),
        Lenient::Float(f) => f.to_string(),
        Lenient::Bool(b) => flag_label(b).to_string(),
    })
}

/// 通过校验的表单
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormInput {
    pub age: f64,
    pub hypertension: bool,
    pub heart_disease: bool,
    pub avg_glucose_level: f64,
    pub bmi: f64,
    pub gender: Gender,
    pub ever_married: EverMarried,
    pub work_type: WorkType,
    pub residence_type: ResidenceType,
    pub smoking_status: SmokingStatus,
}

/// 性别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

/// 婚姻状况
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EverMarried {
    Yes,
    No,
}

/// 工作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkType {
    Private,
    #[serde(rename = "Self-employed")]
    SelfEmployed,
    #[serde(rename = "Govt_job")]
    GovtJob,
    #[serde(rename = "children")]
    Children,
}

/// 居住地类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResidenceType {
    Urban,
    Rural,
}

/// 吸烟状况
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SmokingStatus {
    #[serde(rename = "Never_smoked")]
    NeverSmoked,
    Smokes,
    #[serde(rename = "Formerly_smoked")]
    FormerlySmoked,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }
}

impl EverMarried {
    pub const ALL: [EverMarried; 2] = [EverMarried::Yes, EverMarried::No];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
        }
    }
}

impl WorkType {
    pub const ALL: [WorkType; 4] = [
        WorkType::Private,
        WorkType::SelfEmployed,
        WorkType::GovtJob,
        WorkType::Children,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "Private",
            Self::SelfEmployed => "Self-employed",
            Self::GovtJob => "Govt_job",
            Self::Children => "children",
        }
    }
}

impl ResidenceType {
    pub const ALL: [ResidenceType; 2] = [ResidenceType::Urban, ResidenceType::Rural];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Urban => "Urban",
            Self::Rural => "Rural",
        }
    }
}

impl SmokingStatus {
    pub const ALL: [SmokingStatus; 3] = [
        SmokingStatus::NeverSmoked,
        SmokingStatus::Smokes,
        SmokingStatus::FormerlySmoked,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NeverSmoked => "Never_smoked",
            Self::Smokes => "Smokes",
            Self::FormerlySmoked => "Formerly_smoked",
        }
    }
}

macro_rules! impl_try_from_label {
    ($($ty:ty),* $(,)?) => {
        $(
            impl TryFrom<&str> for $ty {
                type Error = String;

                fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
                    Self::ALL
                        .into_iter()
                        .find(|candidate| candidate.as_str() == value)
                        .ok_or_else(|| format!("Unknown {}: {}", stringify!($ty), value))
                }
            }
        )*
    };
}

impl_try_from_label!(Gender, EverMarried, WorkType, ResidenceType, SmokingStatus);

fn flag_label(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

/// 负载字段值
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PayloadValue {
    /// 数值型指标，原样传递
    Measure(f64),
    /// 0/1 标志
    Flag(u8),
}

impl Serialize for PayloadValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Measure(v) => serializer.serialize_f64(*v),
            Self::Flag(v) => serializer.serialize_u8(*v),
        }
    }
}

/// 发送给远程预测服务的独热编码请求体，键顺序固定
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PredictionPayload {
    entries: Vec<(&'static str, PayloadValue)>,
}

impl PredictionPayload {
    pub(crate) fn push(&mut self, key: &'static str, value: PayloadValue) {
        self.entries.push((key, value));
    }

    /// 按键取值
    pub fn get(&self, key: &str) -> Option<PayloadValue> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }

    /// 取0/1标志值
    pub fn flag(&self, key: &str) -> Option<u8> {
        match self.get(key)? {
            PayloadValue::Flag(v) => Some(v),
            PayloadValue::Measure(_) => None,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for PredictionPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// 远程预测服务的响应：`{ "stroke_prediction": 0 | 1 }`，可选 `probability`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    #[serde(deserialize_with = "integral_prediction")]
    pub stroke_prediction: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
}

/// 预测值可能以 `1` 或 `1.0` 的形式返回；带小数部分的值直接拒绝
fn integral_prediction<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(i64),
        Float(f64),
    }

    match Number::deserialize(deserializer)? {
        Number::Int(v) => Ok(v),
        Number::Float(v) if v.is_finite() && v.fract() == 0.0 => Ok(v as i64),
        Number::Float(v) => Err(serde::de::Error::custom(format!(
            "stroke_prediction must be an integer, got {}",
            v
        ))),
    }
}

/// 风险等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    High,
    Low,
}

/// 对预测结果的解读，供界面展示
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub risk: RiskLevel,
    pub stroke_prediction: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
    pub title: &'static str,
    pub message: &'static str,
    pub assessed_at: DateTime<Utc>,
}

impl RiskAssessment {
    /// 解读远程响应；预测值只接受0或1
    pub fn from_result(result: &PredictionResult) -> std::result::Result<Self, RequestError> {
        let risk = match result.stroke_prediction {
            1 => RiskLevel::High,
            0 => RiskLevel::Low,
            other => {
                return Err(RequestError::InvalidResponse(format!(
                    "stroke_prediction must be 0 or 1, got {}",
                    other
                )))
            }
        };

        if let Some(p) = result.probability {
            if !p.is_finite() || !(0.0..=1.0).contains(&p) {
                return Err(RequestError::InvalidResponse(format!(
                    "probability out of range: {}",
                    p
                )));
            }
        }

        let (title, message) = match risk {
            RiskLevel::High => ("Potential Stroke Risk Detected", "You have a stroke risk."),
            RiskLevel::Low => ("Low Stroke Risk", "You dont have a stroke risk."),
        };

        Ok(Self {
            risk,
            stroke_prediction: result.stroke_prediction as u8,
            probability: result.probability,
            title,
            message,
            assessed_at: Utc::now(),
        })
    }

    pub fn is_high_risk(&self) -> bool {
        self.risk == RiskLevel::High
    }
}
