//! 状态定义：UiState 投影
//!
//! UI 只持有可直接渲染的 UiState（阶段、当前菜单、推荐、购物篮、收藏、提示）；
//! 完整会话状态由 Orchestrator 维护并在每条命令处理后投影。

use serde::Serialize;

use crate::models::{MenuItem, RecommendationEntry};
use crate::session::BasketLine;

/// UI 看到的「投影」状态，轻量且易于渲染
#[derive(Clone, Debug, Serialize)]
pub struct UiState {
    pub phase: AppPhase,
    pub menu: Vec<MenuItem>,
    pub recommendations: Vec<RecommendationEntry>,
    pub basket: Vec<BasketLine>,
    pub basket_total: f64,
    /// 件数（各行数量之和）
    pub basket_count: u32,
    pub favorites: Vec<RecommendationEntry>,
    pub narrative: Option<String>,
    pub notice: Option<Notice>,
    pub input_locked: bool,
    pub currency: String,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            phase: AppPhase::Idle,
            menu: Vec::new(),
            recommendations: Vec::new(),
            basket: Vec::new(),
            basket_total: 0.0,
            basket_count: 0,
            favorites: Vec::new(),
            narrative: None,
            notice: None,
            input_locked: false,
            currency: "£".to_string(),
        }
    }
}

impl UiState {
    pub fn is_favorite(&self, place_id: &str) -> bool {
        self.favorites.iter().any(|f| f.place_id == place_id)
    }
}

/// 应用阶段（UI 投影用）
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum AppPhase {
    Idle,
    Scanning,
    Searching,
    Narrating,
    Speaking,
    Error,
}

/// 提示级别：降级结果用 Warning，兜底结果用 Error
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}
