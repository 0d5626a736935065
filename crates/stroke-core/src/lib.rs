//! # Stroke Core
//!
//! 卒中风险评估系统的核心模块，提供表单数据模型、校验、独热编码和错误定义。

pub mod encoding;
pub mod error;
pub mod models;
pub mod validator;

pub use encoding::{encode, PayloadGroup, ONE_HOT_TABLE};
pub use error::{FieldError, RequestError, Result, StrokeError, GENERIC_REQUEST_ERROR};
pub use models::*;
pub use validator::FormValidator;
