//! 领域模型：菜单项、推荐条目、位置与图片载荷
//!
//! 菜单项只存在于一次扫描会话中；推荐条目以 place_id 作为唯一键（上游缺失时合成稳定 id，
//! 避免按列表位置做 key 导致收藏在重排后串位）。

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 合成 id 的前缀，供距离矩阵判断能否以 `place_id:` 形式查询
pub const SYNTHETIC_ID_PREFIX: &str = "synth-";

/// 菜单项（菜单扫描管线产出）
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub description: String,
    /// 菜单未标价时为 0
    pub price: f64,
    pub image_url: Option<String>,
}

impl MenuItem {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            price,
            image_url: None,
        }
    }

    /// 参与计价的价格：缺失、负数或非有限值一律按 0
    pub fn effective_price(&self) -> f64 {
        sanitize_price(self.price)
    }
}

pub(crate) fn sanitize_price(price: f64) -> f64 {
    if price.is_finite() && price > 0.0 {
        price
    } else {
        0.0
    }
}

/// 推荐条目（本地美食管线产出，也是收藏条目）
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationEntry {
    pub place_id: String,
    pub name: String,
    pub rating: f64,
    pub review_count: u32,
    pub address: String,
    pub short_address: String,
    pub photo_url: Option<String>,
    pub distance_text: String,
    pub travel_time_text: String,
    pub is_open: Option<bool>,
}

impl RecommendationEntry {
    /// 以名称与地址构造条目；place_id 为合成的稳定 id，距离字段为 Unknown
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        let name = name.into();
        let address = address.into();
        Self {
            place_id: stable_place_id(&name, &address),
            short_address: short_address(&address),
            name,
            rating: 0.0,
            review_count: 0,
            address,
            photo_url: None,
            distance_text: crate::pipeline::fallback::UNKNOWN.to_string(),
            travel_time_text: crate::pipeline::fallback::UNKNOWN.to_string(),
            is_open: None,
        }
    }

    /// 上游未给 place_id 时补上基于 name+address 的稳定 id
    pub fn ensure_place_id(&mut self) {
        if self.place_id.trim().is_empty() {
            self.place_id = stable_place_id(&self.name, &self.address);
        }
    }

    pub fn has_synthetic_id(&self) -> bool {
        self.place_id.starts_with(SYNTHETIC_ID_PREFIX)
    }

    /// 地图搜索链接（名称 + 地址）
    pub fn maps_url(&self) -> String {
        let query = format!("{} {}", self.name, self.address);
        Url::parse_with_params(
            "https://www.google.com/maps/search/",
            &[("api", "1"), ("query", query.trim())],
        )
        .map(|u| u.to_string())
        .unwrap_or_default()
    }
}

/// 由 name + address 合成稳定 id（UUID v5，同输入恒得同输出）
pub fn stable_place_id(name: &str, address: &str) -> String {
    synthesize_id(&[name, address])
}

/// 对任意字段组合合成稳定 id；大小写与首尾空白不影响结果
pub fn synthesize_id(parts: &[&str]) -> String {
    let key = parts
        .iter()
        .map(|p| p.trim().to_lowercase())
        .collect::<Vec<_>>()
        .join("|");
    let uuid = Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes());
    format!("{}{}", SYNTHETIC_ID_PREFIX, uuid.simple())
}

/// 完整地址的第一段（逗号前），用于卡片副标题
pub fn short_address(address: &str) -> String {
    address
        .split(',')
        .next()
        .unwrap_or("")
        .trim()
        .to_string()
}

/// 搜索位置：设备定位得到的坐标，或用户输入的邮编/地区文本
#[derive(Clone, Debug, PartialEq)]
pub enum Location {
    Coordinates { lat: f64, lon: f64 },
    Text(String),
}

impl Location {
    /// 解析用户输入：合法的 "lat,lon" 视为坐标，其余为文本；空输入返回 None
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if let Some((a, b)) = raw.split_once(',') {
            if let (Ok(lat), Ok(lon)) = (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
                if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) {
                    return Some(Location::Coordinates { lat, lon });
                }
            }
        }
        Some(Location::Text(raw.to_string()))
    }

    /// 作为 API 参数（origins 等）的字符串形式
    pub fn as_param(&self) -> String {
        match self {
            Location::Coordinates { lat, lon } => format!("{},{}", lat, lon),
            Location::Text(text) => text.clone(),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_param())
    }
}

/// 菜单照片载荷（base64，发送给视觉模型）
#[derive(Clone, Debug)]
pub struct ImagePayload {
    base64: String,
    mime: String,
}

impl ImagePayload {
    pub fn from_bytes(bytes: &[u8], mime: impl Into<String>) -> Self {
        Self {
            base64: BASE64.encode(bytes),
            mime: mime.into(),
        }
    }

    /// 已是 base64 的图片（如相机回传），默认按 JPEG 处理
    pub fn from_base64(encoded: impl Into<String>) -> Self {
        Self {
            base64: encoded.into(),
            mime: "image/jpeg".to_string(),
        }
    }

    /// 按扩展名猜测 MIME，未知时按 JPEG
    pub fn mime_for_path(path: &std::path::Path) -> &'static str {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("png") => "image/png",
            Some("webp") => "image/webp",
            Some("gif") => "image/gif",
            _ => "image/jpeg",
        }
    }

    pub fn is_empty(&self) -> bool {
        self.base64.trim().is_empty()
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.base64)
    }
}

/// 金额显示：£8.50
pub fn format_money(symbol: &str, amount: f64) -> String {
    format!("{}{:.2}", symbol, sanitize_price(amount))
}
