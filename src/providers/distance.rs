//! Google Distance Matrix：一个起点、全部目的地一次批量请求
//!
//! 目的地优先用 `place_id:<id>` 指定，合成 id 的条目退回用地址。
//! 响应的 elements 与本次请求的 destinations 同序，解析时立即按 place_id 建索引，
//! 之后的合并不再依赖位置对齐。

use std::collections::HashMap;

use reqwest::Client;
use serde::Deserialize;

use crate::config::GoogleSection;
use crate::core::ProviderError;
use crate::models::{Location, RecommendationEntry};
use crate::providers::http::{ensure_success, require_key};
use crate::providers::{DistanceMatrix, TravelLeg};

const PROVIDER: &str = "distance matrix";

pub struct GoogleDistanceMatrix {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    mode: String,
}

#[derive(Debug, Deserialize)]
struct MatrixResponse {
    status: String,
    #[serde(default)]
    rows: Vec<MatrixRow>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MatrixRow {
    #[serde(default)]
    elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
struct MatrixElement {
    status: String,
    distance: Option<TextValue>,
    duration: Option<TextValue>,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    text: String,
}

impl GoogleDistanceMatrix {
    pub fn new(client: Client, section: &GoogleSection) -> Self {
        Self {
            client,
            base_url: section.base_url.trim_end_matches('/').to_string(),
            api_key: section.api_key.clone(),
            mode: section.travel_mode.clone(),
        }
    }
}

/// destinations 参数：以 | 连接
fn destinations_param(destinations: &[RecommendationEntry]) -> String {
    destinations
        .iter()
        .map(|d| {
            if d.has_synthetic_id() {
                d.address.clone()
            } else {
                format!("place_id:{}", d.place_id)
            }
        })
        .collect::<Vec<_>>()
        .join("|")
}

/// 按请求顺序把 elements 对应回 place_id；缺失的元素记为 Unavailable
fn index_by_place_id(
    body: MatrixResponse,
    place_ids: &[&str],
) -> Result<HashMap<String, TravelLeg>, ProviderError> {
    if body.status != "OK" {
        return Err(ProviderError::Status {
            provider: PROVIDER,
            code: 200,
            detail: match body.error_message {
                Some(msg) => format!("{}: {}", body.status, msg),
                None => body.status,
            },
        });
    }
    let elements = body
        .rows
        .into_iter()
        .next()
        .map(|r| r.elements)
        .ok_or_else(|| ProviderError::malformed(PROVIDER, "response has no rows"))?;

    let mut elements = elements.into_iter();
    Ok(place_ids
        .iter()
        .map(|id| {
            let leg = match elements.next() {
                Some(MatrixElement {
                    status,
                    distance: Some(distance),
                    duration: Some(duration),
                }) if status == "OK" => TravelLeg::Known {
                    distance_text: distance.text,
                    duration_text: duration.text,
                },
                Some(el) => TravelLeg::Unavailable { status: el.status },
                None => TravelLeg::Unavailable {
                    status: "MISSING".to_string(),
                },
            };
            (id.to_string(), leg)
        })
        .collect())
}

#[async_trait::async_trait]
impl DistanceMatrix for GoogleDistanceMatrix {
    async fn legs(
        &self,
        origin: &Location,
        destinations: &[RecommendationEntry],
    ) -> Result<HashMap<String, TravelLeg>, ProviderError> {
        let key = require_key("google", &self.api_key)?;
        if destinations.is_empty() {
            return Ok(HashMap::new());
        }

        tracing::info!(origin = %origin, destinations = destinations.len(), "distance matrix request");
        let resp = self
            .client
            .get(format!("{}/distancematrix/json", self.base_url))
            .query(&[
                ("origins", origin.as_param()),
                ("destinations", destinations_param(destinations)),
                ("mode", self.mode.clone()),
                ("key", key.to_string()),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, e))?;
        let resp = ensure_success(PROVIDER, resp).await?;
        let body: MatrixResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::malformed(PROVIDER, e.to_string()))?;

        let ids: Vec<&str> = destinations.iter().map(|d| d.place_id.as_str()).collect();
        index_by_place_id(body, &ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(distance: &str, duration: &str) -> String {
        format!(
            r#"{{"status":"OK","distance":{{"text":"{}","value":1}},"duration":{{"text":"{}","value":1}}}}"#,
            distance, duration
        )
    }

    #[test]
    fn test_index_by_place_id_with_non_ok_element() {
        let json = format!(
            r#"{{"status":"OK","rows":[{{"elements":[{},{},{},{{"status":"NOT_FOUND"}},{}]}}]}}"#,
            element("1.0 km", "4 mins"),
            element("2.0 km", "7 mins"),
            element("3.0 km", "9 mins"),
            element("5.0 km", "15 mins"),
        );
        let body: MatrixResponse = serde_json::from_str(&json).unwrap();
        let legs = index_by_place_id(body, &["a", "b", "c", "d", "e"]).unwrap();

        assert_eq!(
            legs["a"],
            TravelLeg::Known {
                distance_text: "1.0 km".into(),
                duration_text: "4 mins".into()
            }
        );
        assert_eq!(
            legs["d"],
            TravelLeg::Unavailable {
                status: "NOT_FOUND".into()
            }
        );
        assert!(matches!(legs["e"], TravelLeg::Known { ref distance_text, .. } if distance_text == "5.0 km"));
    }

    #[test]
    fn test_index_by_place_id_short_response() {
        let json = format!(r#"{{"status":"OK","rows":[{{"elements":[{}]}}]}}"#, element("1 km", "2 mins"));
        let body: MatrixResponse = serde_json::from_str(&json).unwrap();
        let legs = index_by_place_id(body, &["a", "b"]).unwrap();
        assert!(matches!(legs["b"], TravelLeg::Unavailable { .. }));
    }

    #[test]
    fn test_top_level_error_status() {
        let body: MatrixResponse =
            serde_json::from_str(r#"{"status":"OVER_QUERY_LIMIT","rows":[]}"#).unwrap();
        assert!(matches!(
            index_by_place_id(body, &["a"]),
            Err(ProviderError::Status { .. })
        ));
    }

    #[test]
    fn test_destinations_param_mixes_ids_and_addresses() {
        let mut real = RecommendationEntry::new("A", "1 A St");
        real.place_id = "ChIJ1".into();
        let synthetic = RecommendationEntry::new("B", "2 B St");
        assert_eq!(
            destinations_param(&[real, synthetic]),
            "place_id:ChIJ1|2 B St"
        );
    }
}
