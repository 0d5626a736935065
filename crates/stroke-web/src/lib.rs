//! # Stroke Web
//!
//! 落地页、风险评估表单页和JSON接口

pub mod handlers;
pub mod pages;
pub mod server;

pub use server::{create_app, AppState, WebServer};
