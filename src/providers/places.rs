//! Google Places Text Search：按查询 + 位置返回排名后的餐厅
//!
//! 有坐标时以 location + radius 作为地理偏置；只有文本位置时把位置拼进查询（"{query} in {location}"）。
//! 上游缺少 place_id 的结果会补上由 name+address 合成的稳定 id。

use reqwest::Client;
use serde::Deserialize;

use crate::config::GoogleSection;
use crate::core::ProviderError;
use crate::models::{short_address, Location, RecommendationEntry};
use crate::pipeline::fallback::UNKNOWN;
use crate::providers::http::{ensure_success, require_key};
use crate::providers::PlaceSearch;

const PROVIDER: &str = "place search";

pub struct GooglePlaceSearch {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    radius_m: u32,
    photo_max_width: u32,
}

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    status: String,
    #[serde(default)]
    results: Vec<PlaceResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaceResult {
    place_id: Option<String>,
    #[serde(default)]
    name: String,
    rating: Option<f64>,
    user_ratings_total: Option<u32>,
    formatted_address: Option<String>,
    vicinity: Option<String>,
    #[serde(default)]
    photos: Vec<PlacePhoto>,
    opening_hours: Option<OpeningHours>,
}

#[derive(Debug, Deserialize)]
struct PlacePhoto {
    photo_reference: String,
}

#[derive(Debug, Deserialize)]
struct OpeningHours {
    open_now: Option<bool>,
}

impl GooglePlaceSearch {
    pub fn new(client: Client, section: &GoogleSection) -> Self {
        Self {
            client,
            base_url: section.base_url.trim_end_matches('/').to_string(),
            api_key: section.api_key.clone(),
            radius_m: section.search_radius_m,
            photo_max_width: section.photo_max_width,
        }
    }

    /// 组装查询参数（不含 key）
    fn query_params(&self, query: &str, location: &Location) -> Vec<(&'static str, String)> {
        match location {
            Location::Coordinates { .. } => vec![
                ("query", query.to_string()),
                ("location", location.as_param()),
                ("radius", self.radius_m.to_string()),
                ("type", "restaurant".to_string()),
            ],
            Location::Text(area) => vec![
                ("query", format!("{} in {}", query, area)),
                ("type", "restaurant".to_string()),
            ],
        }
    }

    fn photo_url(&self, reference: &str, key: &str) -> String {
        format!(
            "{}/place/photo?maxwidth={}&photo_reference={}&key={}",
            self.base_url, self.photo_max_width, reference, key
        )
    }
}

/// 将 Text Search 响应转为推荐条目；ZERO_RESULTS 视为空列表，其余非 OK 状态视为服务端拒绝
fn parse_text_search(
    body: TextSearchResponse,
    photo_url: impl Fn(&str) -> String,
) -> Result<Vec<RecommendationEntry>, ProviderError> {
    match body.status.as_str() {
        "OK" => {}
        "ZERO_RESULTS" => return Ok(Vec::new()),
        other => {
            return Err(ProviderError::Status {
                provider: PROVIDER,
                code: 200,
                detail: match body.error_message {
                    Some(msg) => format!("{}: {}", other, msg),
                    None => other.to_string(),
                },
            })
        }
    }

    Ok(body
        .results
        .into_iter()
        .filter(|r| !r.name.trim().is_empty())
        .map(|r| {
            let address = r.formatted_address.or(r.vicinity).unwrap_or_default();
            let mut entry = RecommendationEntry {
                place_id: r.place_id.unwrap_or_default(),
                short_address: short_address(&address),
                name: r.name,
                rating: r.rating.unwrap_or(0.0),
                review_count: r.user_ratings_total.unwrap_or(0),
                address,
                photo_url: r.photos.first().map(|p| photo_url(&p.photo_reference)),
                distance_text: UNKNOWN.to_string(),
                travel_time_text: UNKNOWN.to_string(),
                is_open: r.opening_hours.and_then(|h| h.open_now),
            };
            entry.ensure_place_id();
            entry
        })
        .collect())
}

#[async_trait::async_trait]
impl PlaceSearch for GooglePlaceSearch {
    async fn search(
        &self,
        query: &str,
        location: &Location,
    ) -> Result<Vec<RecommendationEntry>, ProviderError> {
        let key = require_key("google", &self.api_key)?;

        tracing::info!(query, location = %location, "place text search");
        let resp = self
            .client
            .get(format!("{}/place/textsearch/json", self.base_url))
            .query(&self.query_params(query, location))
            .query(&[("key", key)])
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, e))?;
        let resp = ensure_success(PROVIDER, resp).await?;
        let body: TextSearchResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::malformed(PROVIDER, e.to_string()))?;

        let entries = parse_text_search(body, |reference| self.photo_url(reference, key))?;
        tracing::info!(results = entries.len(), "place search returned");
        Ok(entries)
    }
}
