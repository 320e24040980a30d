//! TUI 层：Ratatui + crossterm，主循环（app）、事件与命令解析（event）、渲染（render）

pub mod app;
pub mod event;
pub mod render;

pub use app::run_app;
pub use event::{parse_input, EventHandler, InputAction};
pub use render::{draw, View};
