//! Pexels 图库搜图：GET /search?query=…&per_page=1，取首张图片的 medium 尺寸

use reqwest::Client;
use serde::Deserialize;

use crate::config::PexelsSection;
use crate::core::ProviderError;
use crate::providers::http::{ensure_success, require_key};
use crate::providers::PhotoSearch;

const PROVIDER: &str = "pexels";

pub struct PexelsPhotoSearch {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    src: PhotoSources,
}

#[derive(Debug, Deserialize)]
struct PhotoSources {
    medium: Option<String>,
    original: Option<String>,
}

impl PexelsPhotoSearch {
    pub fn new(client: Client, section: &PexelsSection) -> Self {
        Self {
            client,
            base_url: section.base_url.trim_end_matches('/').to_string(),
            api_key: section.api_key.clone(),
        }
    }
}

fn first_photo_url(body: SearchResponse) -> Option<String> {
    body.photos
        .into_iter()
        .next()
        .and_then(|p| p.src.medium.or(p.src.original))
        .filter(|url| !url.trim().is_empty())
}

#[async_trait::async_trait]
impl PhotoSearch for PexelsPhotoSearch {
    async fn find_photo(&self, query: &str) -> Result<String, ProviderError> {
        let key = require_key(PROVIDER, &self.api_key)?;
        let query = query.trim();
        if query.is_empty() {
            return Err(ProviderError::InvalidInput("empty photo query".to_string()));
        }

        tracing::debug!(query, "pexels photo lookup");
        let resp = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("query", query), ("per_page", "1")])
            .header(reqwest::header::AUTHORIZATION, key)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, e))?;
        let resp = ensure_success(PROVIDER, resp).await?;
        let body: SearchResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::malformed(PROVIDER, e.to_string()))?;

        first_photo_url(body).ok_or(ProviderError::Empty(PROVIDER))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_photo_url_prefers_medium() {
        let body: SearchResponse = serde_json::from_str(
            r#"{"photos":[{"src":{"medium":"https://img/m.jpg","original":"https://img/o.jpg"}}]}"#,
        )
        .unwrap();
        assert_eq!(first_photo_url(body).as_deref(), Some("https://img/m.jpg"));
    }

    #[test]
    fn test_first_photo_url_empty_result() {
        let body: SearchResponse = serde_json::from_str(r#"{"photos":[],"total_results":0}"#).unwrap();
        assert_eq!(first_photo_url(body), None);

        let body: SearchResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(first_photo_url(body), None);
    }
}
