//! 语音合成：OpenAI 兼容 POST /audio/speech，返回 mp3 字节
//!
//! 失败即放弃本次播报（没有兜底音频）。

use reqwest::Client;
use serde_json::json;

use crate::config::OpenAiSection;
use crate::core::ProviderError;
use crate::providers::http::{ensure_success, require_key};
use crate::providers::SpeechSynthesizer;

const PROVIDER: &str = "speech";

pub struct OpenAiSpeech {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    voice: String,
}

impl OpenAiSpeech {
    pub fn new(client: Client, section: &OpenAiSection) -> Self {
        Self {
            client,
            base_url: section.base_url.trim_end_matches('/').to_string(),
            api_key: section.api_key.clone(),
            model: section.tts_model.clone(),
            voice: section.tts_voice.clone(),
        }
    }
}

#[async_trait::async_trait]
impl SpeechSynthesizer for OpenAiSpeech {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, ProviderError> {
        let key = require_key("openai", &self.api_key)?;
        let text = text.trim();
        if text.is_empty() {
            return Err(ProviderError::InvalidInput("nothing to speak".to_string()));
        }

        tracing::info!(chars = text.chars().count(), voice = %self.voice, "speech synthesis");
        let resp = self
            .client
            .post(format!("{}/audio/speech", self.base_url))
            .bearer_auth(key)
            .json(&json!({
                "model": self.model,
                "voice": self.voice,
                "input": text,
                "response_format": "mp3",
            }))
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, e))?;
        let resp = ensure_success(PROVIDER, resp).await?;
        let audio = resp
            .bytes()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, e))?;
        if audio.is_empty() {
            return Err(ProviderError::Empty(PROVIDER));
        }
        Ok(audio.to_vec())
    }
}
