//! ForkCast - 菜单扫描与附近美食推荐
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 编排器、UiState 投影、ProviderError / Outcome
//! - **llm**: 文本补全客户端抽象与实现（OpenAI 兼容 / Mock）
//! - **models**: 菜单项、推荐条目、位置与图片载荷
//! - **observability**: tracing 初始化
//! - **pipeline**: 菜单扫描、本地美食、菜品介绍三条管线与兜底数据
//! - **providers**: 外部服务适配器（视觉、配图、地点、距离、语音）
//! - **session**: 购物篮与收藏
//! - **ui**: Ratatui TUI 界面

pub mod config;
pub mod core;
pub mod llm;
pub mod models;
pub mod observability;
pub mod pipeline;
pub mod providers;
pub mod session;
pub mod ui;

pub use crate::core::{Outcome, ProviderError};
