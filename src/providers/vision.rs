//! 视觉菜单识别：OpenAI 兼容 Chat Completions + image_url
//!
//! 请求体固定为：system 指令要求只输出 JSON 对象 `{items:[{id,name,description,price}]}`，
//! 未标价时 price 为 0；user 内容为 "Parse this menu." 与 data URL 形式的图片；
//! response_format 为 json_object。解析时对 id / price 做宽松归一化。

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::OpenAiSection;
use crate::core::ProviderError;
use crate::models::{synthesize_id, ImagePayload, MenuItem};
use crate::providers::http::{ensure_success, require_key};
use crate::providers::MenuExtractor;

const PROVIDER: &str = "menu extraction";

const SYSTEM_PROMPT: &str = "You are a menu parser. Output strictly valid JSON. \
Return an object with an 'items' array. Each item: id, name, description, price (number). \
If price is missing, use 0.";

const USER_PROMPT: &str = "Parse this menu.";

/// 视觉模型菜单解析器
pub struct VisionMenuExtractor {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    detail: String,
    probe_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl VisionMenuExtractor {
    pub fn new(client: Client, section: &OpenAiSection) -> Self {
        Self {
            client,
            base_url: section.base_url.trim_end_matches('/').to_string(),
            api_key: section.api_key.clone(),
            model: section.vision_model.clone(),
            detail: section.image_detail.clone(),
            probe_url: section.connectivity_probe_url.clone(),
        }
    }

    fn request_body(&self, image: &ImagePayload) -> Value {
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": USER_PROMPT },
                        {
                            "type": "image_url",
                            "image_url": { "url": image.data_url(), "detail": self.detail }
                        }
                    ]
                }
            ],
            "response_format": { "type": "json_object" }
        })
    }

    /// 发送图片前的网络探测；未配置时直接通过
    async fn probe(&self) -> Result<(), ProviderError> {
        let Some(url) = self.probe_url.as_deref() else {
            return Ok(());
        };
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::Connectivity {
                provider: PROVIDER,
                message: format!("connectivity probe failed: {}", e),
            })?;
        if !resp.status().is_success() {
            return Err(ProviderError::Connectivity {
                provider: PROVIDER,
                message: format!("connectivity probe returned HTTP {}", resp.status()),
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl MenuExtractor for VisionMenuExtractor {
    async fn extract(&self, image: &ImagePayload) -> Result<Vec<MenuItem>, ProviderError> {
        let key = require_key("openai", &self.api_key)?;
        if image.is_empty() {
            return Err(ProviderError::InvalidInput("empty image payload".to_string()));
        }
        self.probe().await?;

        tracing::info!(model = %self.model, detail = %self.detail, "sending menu image to vision model");
        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(key)
            .json(&self.request_body(image))
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, e))?;
        let resp = ensure_success(PROVIDER, resp).await?;

        let body: ChatResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::malformed(PROVIDER, e.to_string()))?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::malformed(PROVIDER, "response has no message content"))?;

        let items = parse_menu_content(&content)?;
        tracing::info!(items = items.len(), "menu parsed");
        Ok(items)
    }
}

/// 解析模型输出的 JSON 文本为菜单项；容忍 ```json 代码块包裹与顶层直接为数组
pub fn parse_menu_content(content: &str) -> Result<Vec<MenuItem>, ProviderError> {
    let value: Value = serde_json::from_str(strip_code_fence(content))
        .map_err(|e| ProviderError::malformed(PROVIDER, e.to_string()))?;

    let raw_items = match &value {
        Value::Array(items) => items,
        Value::Object(obj) => obj
            .get("items")
            .and_then(Value::as_array)
            .ok_or_else(|| ProviderError::malformed(PROVIDER, "missing 'items' array"))?,
        _ => return Err(ProviderError::malformed(PROVIDER, "expected a JSON object")),
    };

    let mut seen = HashSet::new();
    let items: Vec<MenuItem> = raw_items
        .iter()
        .enumerate()
        .filter_map(|(idx, raw)| normalize_item(idx, raw))
        .map(|mut item| {
            // 模型偶尔给出重复 id，购物篮按 id 计数，需保证唯一
            if !seen.insert(item.id.clone()) {
                item.id = synthesize_id(&[&item.id, &item.name, &item.description]);
                seen.insert(item.id.clone());
            }
            item
        })
        .collect();

    if items.is_empty() {
        return Err(ProviderError::Empty(PROVIDER));
    }
    Ok(items)
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn normalize_item(idx: usize, raw: &Value) -> Option<MenuItem> {
    let name = raw.get("name").and_then(Value::as_str)?.trim();
    if name.is_empty() {
        return None;
    }
    let description = raw
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim()
        .to_string();
    let id = match raw.get("id") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => synthesize_id(&[&idx.to_string(), name]),
    };
    let price = raw.get("price").map(parse_price).unwrap_or(0.0);

    Some(MenuItem::new(id, name, description, price))
}

static PRICE_RE: OnceLock<Regex> = OnceLock::new();

/// 价格可能是数字或 "£8.50" / "8,50 €" 之类的字符串；无法解析或为负时取 0
fn parse_price(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => parse_price_text(s).unwrap_or(0.0),
        _ => 0.0,
    };
    if parsed.is_finite() && parsed > 0.0 {
        parsed
    } else {
        0.0
    }
}

/// 取文本中的第一个数字；带负号的视为非法
fn parse_price_text(text: &str) -> Option<f64> {
    let re = PRICE_RE
        .get_or_init(|| Regex::new(r"(-)?\p{Sc}?(-)?(\d+(?:[.,]\d+)*)").unwrap());
    let caps = re.captures(text)?;
    if caps.get(1).is_some() || caps.get(2).is_some() {
        return None;
    }
    let number = caps.get(3)?.as_str();

    // 最后出现的分隔符是小数点：逗号只有后跟 1-2 位数字时才算小数点（"8,50"），否则为千分位（"1,200"）
    let normalized = match (number.rfind('.'), number.rfind(',')) {
        (Some(dot), Some(comma)) if comma > dot => number.replace('.', "").replace(',', "."),
        (Some(_), _) => number.replace(',', ""),
        (None, Some(comma))
            if number.matches(',').count() == 1 && (2..=3).contains(&(number.len() - comma)) =>
        {
            number.replace(',', ".")
        }
        _ => number.replace(',', ""),
    };
    normalized.parse::<f64>().ok()
}
