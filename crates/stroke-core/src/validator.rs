//! 表单校验模块
//!
//! 校验失败时收集所有字段的错误，不会发起网络请求

use tracing::{debug, info};

use crate::error::{FieldError, Result, StrokeError};
use crate::models::*;

/// 数值字段的取值范围和越界提示
#[derive(Debug, Clone, Copy)]
pub struct NumericRule {
    pub field: &'static str,
    pub min: f64,
    pub max: f64,
    pub below_message: &'static str,
    pub above_message: &'static str,
}

pub const AGE_RULE: NumericRule = NumericRule {
    field: "age",
    min: 0.0,
    max: 120.0,
    below_message: "Age must be positive",
    above_message: "Age seems unrealistic",
};

pub const GLUCOSE_RULE: NumericRule = NumericRule {
    field: "avg_glucose_level",
    min: 50.0,
    max: 300.0,
    below_message: "Glucose level too low",
    above_message: "Glucose level too high",
};

pub const BMI_RULE: NumericRule = NumericRule {
    field: "bmi",
    min: 10.0,
    max: 60.0,
    below_message: "BMI too low",
    above_message: "BMI too high",
};

const NOT_A_NUMBER: &str = "Expected a number";

/// 表单校验器
#[derive(Debug, Default)]
pub struct FormValidator;

impl FormValidator {
    pub fn new() -> Self {
        Self
    }

    /// 校验原始表单，成功时返回强类型表单
    pub fn validate(&self, raw: &RawFormInput) -> Result<FormInput> {
        let mut errors = Vec::new();

        let age = self.check_numeric(&raw.age, &AGE_RULE, &mut errors);
        let avg_glucose_level = self.check_numeric(&raw.avg_glucose_level, &GLUCOSE_RULE, &mut errors);
        let bmi = self.check_numeric(&raw.bmi, &BMI_RULE, &mut errors);

        let hypertension = self.check_flag(
            &raw.hypertension,
            "hypertension",
            "Select hypertension status",
            &mut errors,
        );
        let heart_disease = self.check_flag(
            &raw.heart_disease,
            "heart_disease",
            "Select heart disease status",
            &mut errors,
        );

        let gender = check_choice::<Gender>(&raw.gender, "gender", "Select gender", &mut errors);
        let ever_married = check_choice::<EverMarried>(
            &raw.ever_married,
            "ever_married",
            "Select marital status",
            &mut errors,
        );
        let work_type = check_choice::<WorkType>(&raw.work_type, "work_type", "Select work type", &mut errors);
        let residence_type = check_choice::<ResidenceType>(
            &raw.residence_type,
            "Residence_type",
            "Select residence type",
            &mut errors,
        );
        let smoking_status = check_choice::<SmokingStatus>(
            &raw.smoking_status,
            "smoking_status",
            "Select smoking status",
            &mut errors,
        );

        match (
            age,
            hypertension,
            heart_disease,
            avg_glucose_level,
            bmi,
            gender,
            ever_married,
            work_type,
            residence_type,
            smoking_status,
        ) {
            (
                Some(age),
                Some(hypertension),
                Some(heart_disease),
                Some(avg_glucose_level),
                Some(bmi),
                Some(gender),
                Some(ever_married),
                Some(work_type),
                Some(residence_type),
                Some(smoking_status),
            ) if errors.is_empty() => {
                debug!("Form validation passed");
                Ok(FormInput {
                    age,
                    hypertension,
                    heart_disease,
                    avg_glucose_level,
                    bmi,
                    gender,
                    ever_married,
                    work_type,
                    residence_type,
                    smoking_status,
                })
            }
            _ => {
                info!("Form validation failed: {} field error(s)", errors.len());
                Err(StrokeError::Validation(errors))
            }
        }
    }

    /// 校验数值字段
    fn check_numeric(&self, value: &str, rule: &NumericRule, errors: &mut Vec<FieldError>) -> Option<f64> {
        let parsed = match value.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            _ => {
                errors.push(FieldError::new(rule.field, NOT_A_NUMBER));
                return None;
            }
        };

        if parsed < rule.min {
            errors.push(FieldError::new(rule.field, rule.below_message));
            None
        } else if parsed > rule.max {
            errors.push(FieldError::new(rule.field, rule.above_message));
            None
        } else {
            Some(parsed)
        }
    }

    /// 校验 "0"/"1" 标志字段
    fn check_flag(
        &self,
        value: &str,
        field: &'static str,
        message: &'static str,
        errors: &mut Vec<FieldError>,
    ) -> Option<bool> {
        match value {
            "0" => Some(false),
            "1" => Some(true),
            _ => {
                errors.push(FieldError::new(field, message));
                None
            }
        }
    }
}

/// 校验枚举字段
fn check_choice<'a, T>(
    value: &'a str,
    field: &'static str,
    message: &'static str,
    errors: &mut Vec<FieldError>,
) -> Option<T>
where
    T: TryFrom<&'a str>,
{
    match T::try_from(value) {
        Ok(choice) => Some(choice),
        Err(_) => {
            errors.push(FieldError::new(field, message));
            None
        }
    }
}
