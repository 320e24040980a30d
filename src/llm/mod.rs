//! LLM 层：文本补全客户端抽象与实现（OpenAI 兼容 / Mock）
//!
//! 用于查询改写与菜品介绍；菜单图片识别走 providers::vision（需要多模态请求体）。

pub mod message;
pub mod mock;
pub mod openai;
pub mod traits;

pub use message::{Message, Role};
pub use mock::MockLlmClient;
pub use openai::OpenAiClient;
pub use traits::LlmClient;
