//! Mock LLM 客户端（用于 mock_mode 与测试，无需 API）
//!
//! 回显最后一条 User 消息的最后一行，查询改写时即原样返回用户偏好。

use async_trait::async_trait;

use crate::core::ProviderError;
use crate::llm::{LlmClient, Message, Role};

/// Mock 客户端：回显用户最后一条消息
#[derive(Debug, Default)]
pub struct MockLlmClient;

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, ProviderError> {
        let last_user = messages
            .iter()
            .rev()
            .find(|m| matches!(m.role, Role::User))
            .map(|m| m.content.as_str())
            .unwrap_or("(no input)");

        Ok(last_user.lines().last().unwrap_or("").trim().to_string())
    }
}
