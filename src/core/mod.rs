//! 核心编排层：错误与降级结果、状态投影、命令循环

pub mod error;
pub mod orchestrator;
pub mod state;

pub use error::{Outcome, ProviderError};
pub use orchestrator::{create_app, handle_command, Command, Services, Session};
pub use state::{AppPhase, Notice, NoticeLevel, UiState};
