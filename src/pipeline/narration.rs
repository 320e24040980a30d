//! 菜品介绍与语音播报
//!
//! describe：把菜名列表交给 LLM 生成 100 词以内的介绍，失败时返回固定文案；
//! speak：文本转语音，失败即放弃（不返回兜底音频）。

use std::sync::Arc;

use crate::core::{Outcome, ProviderError};
use crate::llm::{LlmClient, Message};
use crate::pipeline::fallback;
use crate::providers::SpeechSynthesizer;

/// 介绍文字的词数上限（严格小于 100）
const MAX_WORDS: usize = 99;

const NARRATE_PROMPT: &str = "You are a friendly waiter. Describe the following dishes \
in one short, appetising paragraph of fewer than 100 words. Plain text only.";

pub struct NarrationService {
    llm: Option<Arc<dyn LlmClient>>,
    speech: Arc<dyn SpeechSynthesizer>,
}

impl NarrationService {
    pub fn new(llm: Arc<dyn LlmClient>, speech: Arc<dyn SpeechSynthesizer>) -> Self {
        Self {
            llm: Some(llm),
            speech,
        }
    }

    /// 未配置文本模型：describe 总是返回固定文案
    pub fn without_llm(speech: Arc<dyn SpeechSynthesizer>) -> Self {
        Self { llm: None, speech }
    }

    pub async fn describe(&self, names: &[String]) -> Outcome<String> {
        let names: Vec<&str> = names
            .iter()
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .collect();
        if names.is_empty() {
            return Outcome::failed(
                fallback::GENERIC_NARRATIVE.to_string(),
                ProviderError::InvalidInput("no dishes to describe".to_string()),
            );
        }

        let Some(llm) = &self.llm else {
            return Outcome::failed(
                fallback::GENERIC_NARRATIVE.to_string(),
                ProviderError::MissingCredentials("openai"),
            );
        };

        let messages = vec![
            Message::system(NARRATE_PROMPT),
            Message::user(format!("Dishes: {}", names.join(", "))),
        ];
        match llm.complete(&messages).await {
            Ok(text) if !text.trim().is_empty() => Outcome::Success(limit_words(&text, MAX_WORDS)),
            Ok(_) => Outcome::failed(
                fallback::GENERIC_NARRATIVE.to_string(),
                ProviderError::Empty("narrative generation"),
            ),
            Err(e) => {
                tracing::warn!(error = %e, "narrative generation failed, using generic text");
                Outcome::failed(fallback::GENERIC_NARRATIVE.to_string(), e)
            }
        }
    }

    pub async fn speak(&self, text: &str) -> Result<Vec<u8>, ProviderError> {
        self.speech.synthesize(text).await.inspect_err(|e| {
            tracing::warn!(error = %e, "speech synthesis aborted");
        })
    }
}

/// 截断到至多 max 个词，并规整空白
fn limit_words(text: &str, max: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max {
        return words.join(" ");
    }
    let mut out = words[..max].join(" ");
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;
    use crate::providers::MockSpeech;

    #[test]
    fn test_limit_words() {
        assert_eq!(limit_words("  a  b\n c ", 5), "a b c");
        let long = vec!["word"; 150].join(" ");
        let limited = limit_words(&long, MAX_WORDS);
        assert_eq!(limited.split_whitespace().count(), MAX_WORDS);
        assert!(limited.ends_with('…'));
    }

    #[tokio::test]
    async fn test_describe_empty_names_falls_back() {
        let service = NarrationService::new(Arc::new(MockLlmClient), Arc::new(MockSpeech));
        let outcome = service.describe(&["  ".to_string()]).await;
        assert!(outcome.is_failed());
        assert_eq!(outcome.value(), fallback::GENERIC_NARRATIVE);
    }

    #[tokio::test]
    async fn test_describe_success_with_mock() {
        let service = NarrationService::new(Arc::new(MockLlmClient), Arc::new(MockSpeech));
        let outcome = service
            .describe(&["Pizza".to_string(), "Tiramisu".to_string()])
            .await;
        assert!(outcome.is_success());
        assert_eq!(outcome.value(), "Dishes: Pizza, Tiramisu");
    }

    #[tokio::test]
    async fn test_describe_without_llm() {
        let service = NarrationService::without_llm(Arc::new(MockSpeech));
        let outcome = service.describe(&["Pizza".to_string()]).await;
        assert_eq!(
            outcome.causes(),
            vec![&ProviderError::MissingCredentials("openai")]
        );
        assert_eq!(outcome.value(), fallback::GENERIC_NARRATIVE);
    }

    #[tokio::test]
    async fn test_speak_empty_aborts() {
        let service = NarrationService::new(Arc::new(MockLlmClient), Arc::new(MockSpeech));
        assert!(service.speak("").await.is_err());
        assert_eq!(service.speak("hi").await.unwrap(), b"hi".to_vec());
    }
}
